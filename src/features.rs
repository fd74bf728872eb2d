//! Rebuilds the model's training-time feature row from a raw request.

use log::debug;
use ndarray::Array2;

use crate::artifacts::TrainingArtifacts;
use crate::models::PredictionRequest;

pub const AREA_COLUMN: &str = "Metrekare";
pub const ROOM_COUNT_COLUMN: &str = "Room_Count";
pub const LIVING_ROOM_COUNT_COLUMN: &str = "Living_Room_Count";
pub const DISTRICT_SCORE_COLUMN: &str = "Ilce_Encoded";

/// Columns filled directly from the request.
pub const SEEDED_COLUMNS: [&str; 4] = [
    AREA_COLUMN,
    ROOM_COUNT_COLUMN,
    LIVING_ROOM_COUNT_COLUMN,
    DISTRICT_SCORE_COLUMN,
];

/// Prefix of the province one-hot columns (`il_Istanbul`, `il_Ankara`, ...).
pub const PROVINCE_COLUMN_PREFIX: &str = "il_";

/// Seller type "direct owner". The API never asks for the seller type, so
/// the row always claims the dominant training case.
pub const SELLER_TYPE_DEFAULT_COLUMN: &str = "satici_tip_Sahibinden";

/// One value per training column, in training order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow<'a> {
    columns: &'a [String],
    values: Vec<f64>,
}

impl<'a> FeatureRow<'a> {
    fn zeroed(columns: &'a [String]) -> Self {
        Self {
            columns,
            values: vec![0.0; columns.len()],
        }
    }

    /// Sets `column` if it is a training column. Returns whether it was.
    fn set(&mut self, column: &str, value: f64) -> bool {
        match self.columns.iter().position(|c| c == column) {
            Some(idx) => {
                self.values[idx] = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| self.values[idx])
    }

    pub fn columns(&self) -> &'a [String] {
        self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Single-row model input.
    pub fn to_array(&self) -> Array2<f32> {
        Array2::from_shape_fn((1, self.values.len()), |(_, j)| self.values[j] as f32)
    }
}

/// Maps requests onto training columns.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    province_prefix: String,
    hidden_defaults: Vec<String>,
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self {
            province_prefix: PROVINCE_COLUMN_PREFIX.to_string(),
            hidden_defaults: vec![SELLER_TYPE_DEFAULT_COLUMN.to_string()],
        }
    }
}

impl FeatureEncoder {
    /// Encoder that forces exactly `hidden_defaults` to 1.
    pub fn with_hidden_defaults<I, S>(hidden_defaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hidden_defaults: hidden_defaults.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn hidden_defaults(&self) -> &[String] {
        &self.hidden_defaults
    }

    pub fn province_column(&self, province: &str) -> String {
        format!("{}{}", self.province_prefix, province)
    }

    pub fn encode<'a>(
        &self,
        request: &PredictionRequest,
        artifacts: &'a TrainingArtifacts,
    ) -> FeatureRow<'a> {
        let mut row = FeatureRow::zeroed(artifacts.feature_columns());

        row.set(AREA_COLUMN, request.metrekare);
        row.set(ROOM_COUNT_COLUMN, request.oda_sayisi);
        row.set(LIVING_ROOM_COUNT_COLUMN, request.salon_sayisi);

        let district_score = artifacts
            .district_average(&request.ilce)
            .unwrap_or_else(|| {
                debug!(
                    "district `{}` has no average, using global average",
                    request.ilce
                );
                artifacts.global_average()
            });
        row.set(DISTRICT_SCORE_COLUMN, district_score);

        if !row.set(&self.province_column(&request.il), 1.0) {
            debug!("province `{}` has no one-hot column", request.il);
        }

        for column in &self.hidden_defaults {
            row.set(column, 1.0);
        }

        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::Regressor;
    use ndarray::ArrayView2;
    use std::collections::HashMap;

    struct Unused;

    impl Regressor for Unused {
        fn predict(&self, _rows: ArrayView2<'_, f32>) -> anyhow::Result<f32> {
            unreachable!("encoder tests never run the model")
        }
    }

    fn columns() -> Vec<String> {
        [
            "Metrekare",
            "Room_Count",
            "Living_Room_Count",
            "Ilce_Encoded",
            "il_Ankara",
            "il_Istanbul",
            "satici_tip_Emlak",
            "satici_tip_Sahibinden",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn artifacts_with(columns: Vec<String>) -> TrainingArtifacts {
        let mut averages = HashMap::new();
        averages.insert("Kadikoy".to_string(), 15.123456789);
        averages.insert("Cankaya".to_string(), 14.2);
        TrainingArtifacts::new(Box::new(Unused), averages, 14.6, columns)
    }

    fn request(il: &str, ilce: &str) -> PredictionRequest {
        PredictionRequest {
            il: il.to_string(),
            ilce: ilce.to_string(),
            metrekare: 100.0,
            oda_sayisi: 3.0,
            salon_sayisi: 1.0,
        }
    }

    #[test]
    fn known_district_uses_stored_average_exactly() {
        let artifacts = artifacts_with(columns());
        let row = FeatureEncoder::default().encode(&request("Istanbul", "Kadikoy"), &artifacts);

        assert_eq!(row.get(DISTRICT_SCORE_COLUMN), Some(15.123456789));
    }

    #[test]
    fn unknown_district_falls_back_to_global_average() {
        let artifacts = artifacts_with(columns());
        let row = FeatureEncoder::default().encode(&request("Istanbul", "Atlantis"), &artifacts);

        assert_eq!(row.get(DISTRICT_SCORE_COLUMN), Some(14.6));
    }

    #[test]
    fn row_matches_training_columns_exactly() {
        let artifacts = artifacts_with(columns());
        let encoder = FeatureEncoder::default();

        for req in [
            request("Istanbul", "Kadikoy"),
            request("Nowhere", "Atlantis"),
            request("", ""),
        ] {
            let row = encoder.encode(&req, &artifacts);
            let names: Vec<&str> = row.iter().map(|(name, _)| name).collect();
            let expected = columns();
            assert_eq!(names, expected.iter().map(String::as_str).collect::<Vec<_>>());
            assert_eq!(row.values().len(), artifacts.feature_columns().len());
        }
    }

    #[test]
    fn seeds_numeric_columns_and_one_hots_province() {
        let artifacts = artifacts_with(columns());
        let row = FeatureEncoder::default().encode(&request("Istanbul", "Kadikoy"), &artifacts);

        assert_eq!(
            row.values(),
            &[100.0, 3.0, 1.0, 15.123456789, 0.0, 1.0, 0.0, 1.0]
        );
    }

    #[test]
    fn unknown_province_sets_no_indicator() {
        let artifacts = artifacts_with(columns());
        let row = FeatureEncoder::default().encode(&request("Trabzon", "Ortahisar"), &artifacts);

        assert_eq!(row.get("il_Ankara"), Some(0.0));
        assert_eq!(row.get("il_Istanbul"), Some(0.0));
        assert_eq!(row.get("il_Trabzon"), None);
    }

    #[test]
    fn seller_type_default_is_always_one() {
        let artifacts = artifacts_with(columns());
        let encoder = FeatureEncoder::default();

        assert_eq!(encoder.hidden_defaults(), &[SELLER_TYPE_DEFAULT_COLUMN.to_string()]);

        for req in [
            request("Istanbul", "Kadikoy"),
            request("satici_tip_Sahibinden", "x"),
            PredictionRequest {
                metrekare: 0.0,
                oda_sayisi: 0.0,
                salon_sayisi: 0.0,
                ..request("", "")
            },
        ] {
            let row = encoder.encode(&req, &artifacts);
            assert_eq!(row.get(SELLER_TYPE_DEFAULT_COLUMN), Some(1.0));
            assert_eq!(row.get("satici_tip_Emlak"), Some(0.0));
        }
    }

    #[test]
    fn hidden_defaults_can_be_disabled() {
        let artifacts = artifacts_with(columns());
        let encoder = FeatureEncoder::with_hidden_defaults(Vec::<String>::new());
        let row = encoder.encode(&request("Istanbul", "Kadikoy"), &artifacts);

        assert_eq!(row.get(SELLER_TYPE_DEFAULT_COLUMN), Some(0.0));
    }

    #[test]
    fn seeded_values_outside_training_columns_are_dropped() {
        let cols = vec!["il_Istanbul".to_string(), "Metrekare".to_string()];
        let artifacts = artifacts_with(cols.clone());
        let row = FeatureEncoder::default().encode(&request("Istanbul", "Kadikoy"), &artifacts);

        assert_eq!(row.columns(), cols.as_slice());
        assert_eq!(row.values(), &[1.0, 100.0]);
    }

    #[test]
    fn to_array_is_a_single_row_in_column_order() {
        let artifacts = artifacts_with(columns());
        let row = FeatureEncoder::default().encode(&request("Ankara", "Cankaya"), &artifacts);
        let array = row.to_array();

        assert_eq!(array.dim(), (1, 8));
        assert_eq!(array[[0, 0]], 100.0);
        assert_eq!(array[[0, 3]], 14.2_f64 as f32);
        assert_eq!(array[[0, 4]], 1.0);
        assert_eq!(array[[0, 5]], 0.0);
    }
}
