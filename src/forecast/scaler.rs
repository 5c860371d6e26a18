use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::forecast::ForecastError;

/// A fitted min-max scaler over a single feature.
///
/// `scaled = (x - data_min) / (data_max - data_min) * (hi - lo) + lo`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MinMaxScaler {
    pub data_min: f64,
    pub data_max: f64,
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

impl MinMaxScaler {
    pub fn new(data_min: f64, data_max: f64) -> Result<Self, ForecastError> {
        MinMaxScaler {
            data_min,
            data_max,
            feature_range: default_feature_range(),
        }
        .validated()
    }

    /// Reads the fitted parameters from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ForecastError> {
        let text = fs::read_to_string(path).map_err(|why| {
            ForecastError::Scaler(format!("cannot read {}: {}", path.display(), why))
        })?;
        let scaler: MinMaxScaler = serde_json::from_str(&text).map_err(|why| {
            ForecastError::Scaler(format!("cannot parse {}: {}", path.display(), why))
        })?;

        scaler.validated()
    }

    fn validated(self) -> Result<Self, ForecastError> {
        let (lo, hi) = self.feature_range;
        let finite = [self.data_min, self.data_max, lo, hi]
            .iter()
            .all(|v| v.is_finite());

        if !finite || self.data_max <= self.data_min || hi <= lo {
            return Err(ForecastError::Scaler(format!(
                "degenerate scaler parameters {:?}",
                self
            )));
        }

        Ok(self)
    }

    pub fn transform(&self, x: f64) -> f64 {
        let (lo, hi) = self.feature_range;
        (x - self.data_min) / (self.data_max - self.data_min) * (hi - lo) + lo
    }

    pub fn inverse_transform(&self, y: f64) -> f64 {
        let (lo, hi) = self.feature_range;
        (y - lo) / (hi - lo) * (self.data_max - self.data_min) + self.data_min
    }
}
