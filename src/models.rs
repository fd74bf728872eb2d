use serde::{de, Deserialize, Deserializer, Serialize};

pub const CURRENCY_TAG: &str = "TL";
pub const HEALTH_STATUS: &str = "API is running";

/// Body of `POST /predict`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PredictionRequest {
    pub il: String,
    pub ilce: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub metrekare: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub oda_sayisi: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub salon_sayisi: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PredictionResult {
    pub tahmin_fiyat: f64,
    pub konum: String,
    pub para_birimi: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

// Numeric form fields sometimes arrive as strings ("100"); accept both.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => n,
        NumberOrText::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("`{}` is not a number", s)))?,
    };
    if !value.is_finite() {
        return Err(de::Error::custom("number must be finite"));
    }
    Ok(value)
}
