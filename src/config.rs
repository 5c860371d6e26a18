use std::{env, path::PathBuf, str::FromStr};

use anyhow::{anyhow, Result};
use config::{Config as config_config, File as config_file};
use serde::{Deserialize, Serialize};

use crate::{crawler::investing::QuoteLayout, history::SchemaPreset, logging};

const CONFIG_PATH: &str = "app.json";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct App {
    pub source: Source,
    pub history: History,
    pub forecast: Forecast,
    pub schedule: Schedule,
}

const MASI_SOURCE_URL: &str = "MASI_SOURCE_URL";
const MASI_SOURCE_LAYOUT: &str = "MASI_SOURCE_LAYOUT";
const MASI_HTTP_TIMEOUT_SECS: &str = "MASI_HTTP_TIMEOUT_SECS";
const MASI_USER_AGENT: &str = "MASI_USER_AGENT";

/// 報價來源網頁
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Source {
    pub url: String,
    pub layout: QuoteLayout,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Source {
    fn default() -> Self {
        Source {
            url: "https://fr.investing.com/indices/masi".to_string(),
            layout: QuoteLayout::default(),
            timeout_secs: 10,
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

const MASI_HISTORY_PATH: &str = "MASI_HISTORY_PATH";
const MASI_HISTORY_SCHEMA: &str = "MASI_HISTORY_SCHEMA";

/// 歷史數據檔
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct History {
    pub path: PathBuf,
    pub schema: SchemaPreset,
}

impl Default for History {
    fn default() -> Self {
        History {
            path: PathBuf::from("masi_history_ready.csv"),
            schema: SchemaPreset::default(),
        }
    }
}

const MASI_MODEL_PATH: &str = "MASI_MODEL_PATH";
const MASI_SCALER_PATH: &str = "MASI_SCALER_PATH";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Forecast {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
}

impl Default for Forecast {
    fn default() -> Self {
        Forecast {
            model_path: PathBuf::from("modele_masi.json"),
            scaler_path: PathBuf::from("scaler.json"),
        }
    }
}

const MASI_UPDATE_CRON: &str = "MASI_UPDATE_CRON";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Schedule {
    /// sec min hour day-of-month month day-of-week (UTC)
    pub update_cron: String,
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule {
            update_cron: "0 0 15 * * Mon-Fri".to_string(),
        }
    }
}

impl App {
    /// 讀取 app.json（不存在時使用預設值），再以 env 覆蓋
    pub fn get() -> Result<Self> {
        Self::from_path(config_path())
    }

    pub fn from_path(config_path: PathBuf) -> Result<Self> {
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path.as_path()))
                .build()?
                .try_deserialize()
                .map_err(|why| {
                    anyhow!(
                        "Failed to deserialize {} because {:?}",
                        config_path.display(),
                        why
                    )
                })?;
            return Ok(config.override_with_env());
        }

        logging::info_file_async(format!(
            "{} not found, using defaults",
            config_path.display()
        ));

        Ok(App::default().override_with_env())
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(url) = env::var(MASI_SOURCE_URL) {
            self.source.url = url;
        }

        if let Ok(layout) = env::var(MASI_SOURCE_LAYOUT) {
            match QuoteLayout::from_str(&layout) {
                Ok(l) => self.source.layout = l,
                Err(why) => logging::error_file_async(format!("{}: {:?}", MASI_SOURCE_LAYOUT, why)),
            }
        }

        if let Ok(secs) = env::var(MASI_HTTP_TIMEOUT_SECS) {
            match parse_timeout_secs(&secs) {
                Ok(s) => self.source.timeout_secs = s,
                Err(why) => {
                    logging::error_file_async(format!("{}: {:?}", MASI_HTTP_TIMEOUT_SECS, why))
                }
            }
        }

        // 0 秒會讓每次請求立即逾時
        if self.source.timeout_secs == 0 {
            let fallback = Source::default().timeout_secs;
            logging::error_file_async(format!(
                "source.timeout_secs must be positive, using {}",
                fallback
            ));
            self.source.timeout_secs = fallback;
        }

        if let Ok(ua) = env::var(MASI_USER_AGENT) {
            self.source.user_agent = ua;
        }

        if let Ok(path) = env::var(MASI_HISTORY_PATH) {
            self.history.path = PathBuf::from(path);
        }

        if let Ok(schema) = env::var(MASI_HISTORY_SCHEMA) {
            match SchemaPreset::from_str(&schema) {
                Ok(s) => self.history.schema = s,
                Err(why) => logging::error_file_async(format!("{}: {:?}", MASI_HISTORY_SCHEMA, why)),
            }
        }

        if let Ok(path) = env::var(MASI_MODEL_PATH) {
            self.forecast.model_path = PathBuf::from(path);
        }

        if let Ok(path) = env::var(MASI_SCALER_PATH) {
            self.forecast.scaler_path = PathBuf::from(path);
        }

        if let Ok(cron) = env::var(MASI_UPDATE_CRON) {
            self.schedule.update_cron = cron;
        }

        self
    }
}

fn parse_timeout_secs(secs: &str) -> Result<u64> {
    match u64::from_str(secs.trim()) {
        Ok(0) => Err(anyhow!("timeout must be at least one second")),
        Ok(s) => Ok(s),
        Err(why) => Err(anyhow!("'{}' is not a number of seconds: {}", secs, why)),
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn tmp_dir(name: &str) -> PathBuf {
        let mut p = env::temp_dir();
        p.push(format!("masi_config_{}", name));
        let _ = fs::remove_dir_all(&p);
        fs::create_dir_all(&p).unwrap();
        p
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let app = App::from_path(tmp_dir("missing").join("app.json")).unwrap();
        assert_eq!(app.source.timeout_secs, 10);
        assert_eq!(app.source.user_agent, "Mozilla/5.0");
        assert_eq!(app.schedule.update_cron, "0 0 15 * * Mon-Fri");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let path = tmp_dir("partial").join("app.json");
        fs::write(
            &path,
            r#"{ "source": { "layout": "headline_price" }, "history": { "schema": "legacy" } }"#,
        )
        .unwrap();

        let app = App::from_path(path).unwrap();
        assert_eq!(app.source.layout, QuoteLayout::HeadlinePrice);
        assert_eq!(app.source.url, "https://fr.investing.com/indices/masi");
        assert_eq!(app.history.schema, SchemaPreset::Legacy);
        assert_eq!(app.forecast.scaler_path, PathBuf::from("scaler.json"));
    }

    #[test]
    fn test_parse_timeout_secs() {
        assert_eq!(parse_timeout_secs(" 15 ").unwrap(), 15);
        assert!(parse_timeout_secs("0").is_err());
        assert!(parse_timeout_secs("ten").is_err());
        assert!(parse_timeout_secs("-3").is_err());
    }

    #[test]
    fn test_zero_timeout_falls_back_to_default() {
        let path = tmp_dir("zero_timeout").join("app.json");
        fs::write(&path, r#"{ "source": { "timeout_secs": 0 } }"#).unwrap();

        let app = App::from_path(path).unwrap();
        assert_eq!(app.source.timeout_secs, 10);
    }
}
