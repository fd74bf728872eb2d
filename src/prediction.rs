use log::{debug, error};
use uuid::Uuid;

use crate::artifacts::TrainingArtifacts;
use crate::error::ApiError;
use crate::features::FeatureEncoder;
use crate::models::{PredictionRequest, PredictionResult, CURRENCY_TAG};

/// Turns requests into prices using the startup artifacts, if any loaded.
pub struct PredictionService {
    artifacts: Option<TrainingArtifacts>,
    encoder: FeatureEncoder,
}

impl PredictionService {
    pub fn new(artifacts: Option<TrainingArtifacts>) -> Self {
        Self::with_encoder(artifacts, FeatureEncoder::default())
    }

    pub fn with_encoder(artifacts: Option<TrainingArtifacts>, encoder: FeatureEncoder) -> Self {
        Self { artifacts, encoder }
    }

    pub fn is_model_loaded(&self) -> bool {
        self.artifacts.is_some()
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, ApiError> {
        let artifacts = self.artifacts.as_ref().ok_or(ApiError::ModelUnavailable)?;
        let request_id = Uuid::new_v4();

        let row = self.encoder.encode(request, artifacts);
        debug!("[{}] encoded {} features", request_id, row.values().len());

        let log_price = artifacts.model().predict(row.to_array().view()).map_err(|e| {
            error!("[{}] model inference failed: {}", request_id, e);
            ApiError::Prediction(e.to_string())
        })?;

        let price = to_price(log_price as f64);
        if !price.is_finite() {
            error!("[{}] model returned log-price {}", request_id, log_price);
            return Err(ApiError::Prediction(format!(
                "model returned a non-finite price for log-price {}",
                log_price
            )));
        }

        let result = PredictionResult {
            tahmin_fiyat: price,
            konum: format!("{} / {}", request.il, request.ilce),
            para_birimi: CURRENCY_TAG,
        };
        debug!(
            "[{}] {} -> {:.2} {}",
            request_id, result.konum, result.tahmin_fiyat, CURRENCY_TAG
        );

        Ok(result)
    }
}

/// Inverse of the `log1p` target transform, rounded to 2 decimals.
pub fn to_price(log_price: f64) -> f64 {
    round2(log_price.exp_m1())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
