//! # Investing.com 採集模組
//!
//! 從 `fr.investing.com` 的指數頁面抓取 MASI（Moroccan All Shares Index）的最新點數。
//!
//! 同一個頁面曾經有兩種版面，各自使用不同的標記元素與數字格式，
//! 以 [`QuoteLayout`] 明確指定要使用哪一種，不做自動猜測。

use std::{str::FromStr, time::Duration};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::{config, util::http::ClientOptions, util::text::NumberLocale};

/// 即時點數採集子模組
pub mod price;

/// Investing.com 法文站的主機域名
pub const HOST: &str = "fr.investing.com";

/// Which markup contract of the quote page to scrape.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuoteLayout {
    /// `<div data-test="instrument-price-last">14.523,45</div>`
    #[default]
    InstrumentPriceLast,
    /// `<div class="text-5xl/6 font-bold">14,523.45</div>`
    HeadlinePrice,
}

impl QuoteLayout {
    /// CSS selector of the element holding the displayed value.
    pub fn marker(&self) -> &'static str {
        match self {
            QuoteLayout::InstrumentPriceLast => r#"div[data-test="instrument-price-last"]"#,
            QuoteLayout::HeadlinePrice => r#"div[class~="text-5xl/6"][class~="font-bold"]"#,
        }
    }

    /// Separators the page renders the value with.
    pub fn locale(&self) -> NumberLocale {
        match self {
            QuoteLayout::InstrumentPriceLast => NumberLocale::CONTINENTAL,
            QuoteLayout::HeadlinePrice => NumberLocale::INTERNATIONAL,
        }
    }
}

impl FromStr for QuoteLayout {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instrument_price_last" => Ok(QuoteLayout::InstrumentPriceLast),
            "headline_price" => Ok(QuoteLayout::HeadlinePrice),
            other => Err(anyhow!("Unknown quote layout: {}", other)),
        }
    }
}

/// Investing.com 採集器
pub struct Investing {
    url: String,
    layout: QuoteLayout,
    options: ClientOptions,
}

impl Investing {
    pub fn new(url: impl Into<String>, layout: QuoteLayout, options: ClientOptions) -> Self {
        Investing {
            url: url.into(),
            layout,
            options,
        }
    }

    pub fn from_config(source: &config::Source) -> Self {
        Investing::new(
            source.url.clone(),
            source.layout,
            ClientOptions {
                timeout: Duration::from_secs(source.timeout_secs),
                user_agent: source.user_agent.clone(),
            },
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn layout(&self) -> QuoteLayout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_str() {
        assert_eq!(
            QuoteLayout::from_str("instrument_price_last").unwrap(),
            QuoteLayout::InstrumentPriceLast
        );
        assert_eq!(
            QuoteLayout::from_str(" Headline_Price ").unwrap(),
            QuoteLayout::HeadlinePrice
        );
        assert!(QuoteLayout::from_str("masi").is_err());
    }

    #[test]
    fn test_from_config() {
        let source = config::Source::default();
        let investing = Investing::from_config(&source);
        assert_eq!(investing.url(), "https://fr.investing.com/indices/masi");
        assert!(investing.url().contains(HOST));
        assert_eq!(investing.layout(), QuoteLayout::InstrumentPriceLast);
        assert_eq!(investing.options.timeout, Duration::from_secs(10));
    }
}
