use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::forecast::{ForecastError, SequenceModel};

/// Length of the input sequence the published model was trained on.
pub const DEFAULT_WINDOW: usize = 60;

/// A pretrained linear readout over the scaled trailing window:
/// `y = bias + Σ weights[i] * x[i]`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub weights: Vec<f64>,
    #[serde(default)]
    pub bias: f64,
}

impl LinearModel {
    pub fn new(weights: Vec<f64>, bias: f64) -> Result<Self, ForecastError> {
        LinearModel { weights, bias }.validated()
    }

    /// Reads the weights from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ForecastError> {
        let text = fs::read_to_string(path).map_err(|why| {
            ForecastError::Model(format!("cannot read {}: {}", path.display(), why))
        })?;
        let model: LinearModel = serde_json::from_str(&text).map_err(|why| {
            ForecastError::Model(format!("cannot parse {}: {}", path.display(), why))
        })?;

        model.validated()
    }

    fn validated(self) -> Result<Self, ForecastError> {
        if self.weights.is_empty() {
            return Err(ForecastError::Model("model has no weights".to_string()));
        }

        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(ForecastError::Model("model has non-finite weights".to_string()));
        }

        Ok(self)
    }
}

impl SequenceModel for LinearModel {
    fn window(&self) -> usize {
        self.weights.len()
    }

    fn predict(&self, scaled: &[f64]) -> Result<f64, ForecastError> {
        if scaled.len() != self.weights.len() {
            return Err(ForecastError::Model(format!(
                "expected an input of {} values, got {}",
                self.weights.len(),
                scaled.len()
            )));
        }

        Ok(self.bias
            + self
                .weights
                .iter()
                .zip(scaled)
                .map(|(w, x)| w * x)
                .sum::<f64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict() {
        let model = LinearModel::new(vec![0.5, 0.5], 0.1).unwrap();
        assert_eq!(model.window(), 2);
        assert!((model.predict(&[0.2, 0.4]).unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_predict_wrong_shape() {
        let model = LinearModel::new(vec![1.0; DEFAULT_WINDOW], 0.0).unwrap();
        assert!(matches!(
            model.predict(&[0.0; 59]),
            Err(ForecastError::Model(_))
        ));
    }

    #[test]
    fn test_invalid_weights() {
        assert!(LinearModel::new(vec![], 0.0).is_err());
        assert!(LinearModel::new(vec![f64::INFINITY], 0.0).is_err());
    }

    #[test]
    fn test_deserialize_without_bias() {
        let model: LinearModel = serde_json::from_str(r#"{ "weights": [1.0, 2.0] }"#).unwrap();
        assert_eq!(model.bias, 0.0);
    }
}
