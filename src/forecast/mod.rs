//! # 指數預測
//!
//! 預先訓練好的模型與其輸入縮放器在程式啟動時載入一次，包成 [`InferenceContext`]
//! 後以參考傳遞給需要預測的地方。

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

use crate::{config, history::HistoryRecord, logging};

pub mod model;
pub mod scaler;

pub use model::LinearModel;
pub use scaler::MinMaxScaler;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("not enough history: {required} values required, {available} available")]
    InsufficientHistory { required: usize, available: usize },
    #[error("model error: {0}")]
    Model(String),
    #[error("scaler error: {0}")]
    Scaler(String),
}

/// A pretrained model over a fixed-length window of scaled values.
pub trait SequenceModel: Send + Sync {
    /// Number of values the model consumes.
    fn window(&self) -> usize;

    /// Predicts the next scaled value from `scaled`, which holds exactly `window()` values.
    fn predict(&self, scaled: &[f64]) -> Result<f64, ForecastError>;
}

/// The next-value forecast and the window it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub target_date: NaiveDate,
    pub value: f64,
    pub window: Vec<HistoryRecord>,
}

/// Load-once model + scaler pair.
pub struct InferenceContext {
    model: Box<dyn SequenceModel>,
    scaler: MinMaxScaler,
}

impl InferenceContext {
    pub fn new(model: Box<dyn SequenceModel>, scaler: MinMaxScaler) -> Self {
        InferenceContext { model, scaler }
    }

    pub fn load(forecast: &config::Forecast) -> Result<Self, ForecastError> {
        let model = LinearModel::load(&forecast.model_path)?;
        let scaler = MinMaxScaler::load(&forecast.scaler_path)?;

        if model.window() != model::DEFAULT_WINDOW {
            logging::warn_file_async(format!(
                "{} expects {} values instead of {}",
                forecast.model_path.display(),
                model.window(),
                model::DEFAULT_WINDOW
            ));
        }

        logging::info_file_async(format!(
            "Loaded model {} and scaler {}",
            forecast.model_path.display(),
            forecast.scaler_path.display()
        ));

        Ok(InferenceContext::new(Box::new(model), scaler))
    }

    pub fn window(&self) -> usize {
        self.model.window()
    }

    /// Forecasts the value following `history`, labelled with `target_date`.
    ///
    /// `history` must be in chronological order; only its trailing window is used.
    pub fn forecast(
        &self,
        history: &[HistoryRecord],
        target_date: NaiveDate,
    ) -> Result<Forecast, ForecastError> {
        let required = self.window();
        if history.len() < required {
            return Err(ForecastError::InsufficientHistory {
                required,
                available: history.len(),
            });
        }

        let window = &history[history.len() - required..];
        let scaled = window
            .iter()
            .map(|r| {
                r.value
                    .to_f64()
                    .map(|v| self.scaler.transform(v))
                    .ok_or_else(|| {
                        ForecastError::Scaler(format!("{} is not representable", r.value))
                    })
            })
            .collect::<Result<Vec<f64>, ForecastError>>()?;

        let predicted = self.model.predict(&scaled)?;
        let value = self.scaler.inverse_transform(predicted);

        if !value.is_finite() {
            return Err(ForecastError::Model(format!(
                "non-finite prediction {}",
                value
            )));
        }

        Ok(Forecast {
            target_date,
            value,
            window: window.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use chrono::Days;
    use rust_decimal::Decimal;

    use super::*;

    /// Repeats the last scaled value.
    struct Persistence(usize);

    impl SequenceModel for Persistence {
        fn window(&self) -> usize {
            self.0
        }

        fn predict(&self, scaled: &[f64]) -> Result<f64, ForecastError> {
            scaled
                .last()
                .copied()
                .ok_or_else(|| ForecastError::Model("empty input".to_string()))
        }
    }

    fn history(len: usize) -> Vec<HistoryRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..len)
            .map(|i| {
                HistoryRecord::new(
                    start.checked_add_days(Days::new(i as u64)).unwrap(),
                    Decimal::from(14000 + i as i64),
                )
            })
            .collect()
    }

    fn target() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn test_insufficient_history() {
        let ctx = InferenceContext::new(
            Box::new(Persistence(60)),
            MinMaxScaler::new(13000.0, 15000.0).unwrap(),
        );

        match ctx.forecast(&history(59), target()) {
            Err(ForecastError::InsufficientHistory {
                required,
                available,
            }) => {
                assert_eq!(required, 60);
                assert_eq!(available, 59);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_forecast_uses_trailing_window() {
        let ctx = InferenceContext::new(
            Box::new(Persistence(60)),
            MinMaxScaler::new(13000.0, 15000.0).unwrap(),
        );

        let forecast = ctx.forecast(&history(75), target()).unwrap();
        assert_eq!(forecast.window.len(), 60);
        assert_eq!(forecast.window.first().unwrap().value, Decimal::from(14015));
        assert_eq!(forecast.window.last().unwrap().value, Decimal::from(14074));
        assert!((forecast.value - 14074.0).abs() < 1e-6);
        assert_eq!(forecast.target_date, target());
    }

    #[test]
    fn test_load_from_files() {
        let mut dir = std::env::temp_dir();
        dir.push("masi_forecast_load");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        let model_path: PathBuf = dir.join("model.json");
        let scaler_path: PathBuf = dir.join("scaler.json");

        // 平均最後 60 個值
        let weights = vec![1.0 / 60.0; 60];
        fs::write(
            &model_path,
            serde_json::to_string(&LinearModel::new(weights, 0.0).unwrap()).unwrap(),
        )
        .unwrap();
        fs::write(&scaler_path, r#"{ "data_min": 13000.0, "data_max": 15000.0 }"#).unwrap();

        let ctx = InferenceContext::load(&config::Forecast {
            model_path,
            scaler_path,
        })
        .unwrap();
        assert_eq!(ctx.window(), 60);

        let forecast = ctx.forecast(&history(60), target()).unwrap();
        // mean of 14000..=14059
        assert!((forecast.value - 14029.5).abs() < 1e-6);
    }

    #[test]
    fn test_load_missing_model() {
        let dir = std::env::temp_dir().join("masi_forecast_missing");
        let result = InferenceContext::load(&config::Forecast {
            model_path: dir.join("model.json"),
            scaler_path: dir.join("scaler.json"),
        });
        assert!(matches!(result, Err(ForecastError::Model(_))));
    }
}
