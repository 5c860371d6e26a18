use async_trait::async_trait;
use rust_decimal::Decimal;
use scraper::Html;

use crate::{
    crawler::{
        investing::{Investing, QuoteLayout},
        FetchError, IndexValue,
    },
    logging,
    util::{self, text},
};

#[async_trait]
impl IndexValue for Investing {
    async fn fetch_index_value(&self) -> Result<Decimal, FetchError> {
        let text = util::http::get(&self.url, &self.options, None)
            .await
            .map_err(|why| FetchError::HttpFailure(format!("{:?}", why)))?;

        let value = extract_index_value(&text, &self.url, self.layout)?;
        logging::info_file_async(format!("{} -> {}", self.url, value));

        Ok(value)
    }
}

/// Finds the layout's marker element in `html` and normalizes its text.
pub(crate) fn extract_index_value(
    html: &str,
    url: &str,
    layout: QuoteLayout,
) -> Result<Decimal, FetchError> {
    let document = Html::parse_document(html);
    let raw = util::http::element::get_one_element(util::http::element::GetOneElementText {
        url,
        selector: layout.marker(),
        document: &document,
    })
    .map_err(|why| FetchError::MarkerNotFound(format!("{} ({:?})", layout.marker(), why)))?
    .ok_or_else(|| FetchError::MarkerNotFound(layout.marker().to_string()))?;

    text::parse_localized_decimal(&raw, layout.locale())
        .map(|v| v.normalize())
        .map_err(|_| FetchError::ParseFailure(raw))
}
