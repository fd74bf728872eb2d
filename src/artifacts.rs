//! Training artifacts: the exported regressor plus the encoding tables that
//! were fitted alongside it.
//!
//! On disk the bundle is a JSON manifest:
//!
//! ```json
//! {
//!   "model": "model.onnx",
//!   "ilce_map": { "Kadikoy": 15.1, "Cankaya": 14.2 },
//!   "global_avg": 14.6,
//!   "columns": ["Metrekare", "Room_Count", "Living_Room_Count", "Ilce_Encoded", "il_Istanbul"]
//! }
//! ```
//!
//! `model` is resolved relative to the manifest's directory.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use log::{info, warn};
use ndarray::ArrayView2;
use serde::Deserialize;
use tract_onnx::prelude::*;

use crate::error::{LoadError, LoadResult};
use crate::features::SEEDED_COLUMNS;

/// A fitted model that maps feature rows to a log-scale price.
pub trait Regressor: Send + Sync {
    /// Returns the prediction for the first row of `rows`.
    fn predict(&self, rows: ArrayView2<'_, f32>) -> anyhow::Result<f32>;
}

/// ONNX regressor executed with tract.
pub struct OnnxRegressor {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>,
    input_width: usize,
}

impl OnnxRegressor {
    pub fn load<P: AsRef<Path>>(model_path: P, input_width: usize) -> TractResult<Self> {
        let model = tract_onnx::onnx()
            .model_for_path(model_path)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, input_width)),
            )?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { model, input_width })
    }
}

impl Regressor for OnnxRegressor {
    fn predict(&self, rows: ArrayView2<'_, f32>) -> anyhow::Result<f32> {
        let (height, width) = rows.dim();
        if height != 1 || width != self.input_width {
            return Err(anyhow!(
                "model expects a 1x{} input, got {}x{}",
                self.input_width,
                height,
                width
            ));
        }

        let values: Vec<f32> = rows.iter().copied().collect();
        let input = Tensor::from_shape(&[height, width], &values)?;
        let outputs = self.model.run(tvec!(input.into()))?;

        let prediction = outputs[0]
            .to_array_view::<f32>()?
            .iter()
            .next()
            .copied()
            .ok_or_else(|| anyhow!("model produced no output"))?;

        Ok(prediction)
    }
}

/// Manifest as written next to the exported model.
#[derive(Debug, Deserialize)]
pub struct ArtifactManifest {
    pub model: PathBuf,
    pub ilce_map: HashMap<String, f64>,
    pub global_avg: f64,
    pub columns: Vec<String>,
}

impl ArtifactManifest {
    pub fn from_path<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        let raw = fs::read_to_string(path)?;
        let manifest: ArtifactManifest = serde_json::from_str(&raw)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> LoadResult<()> {
        if self.columns.is_empty() {
            return Err(invalid("`columns` is empty"));
        }

        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !seen.insert(column.as_str()) {
                return Err(invalid(format!("duplicate column `{}`", column)));
            }
        }

        if !self.global_avg.is_finite() {
            return Err(invalid("`global_avg` is not finite"));
        }

        if let Some((district, _)) = self.ilce_map.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!(
                "average for district `{}` is not finite",
                district
            )));
        }

        for column in SEEDED_COLUMNS {
            if !seen.contains(column) {
                warn!("training columns do not include `{}`; it will be dropped", column);
            }
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> LoadError {
    LoadError::InvalidArtifacts {
        message: message.into(),
    }
}

/// Everything inference needs, loaded once at startup.
pub struct TrainingArtifacts {
    model: Box<dyn Regressor>,
    district_average: HashMap<String, f64>,
    global_average: f64,
    feature_columns: Vec<String>,
}

impl TrainingArtifacts {
    pub fn new(
        model: Box<dyn Regressor>,
        district_average: HashMap<String, f64>,
        global_average: f64,
        feature_columns: Vec<String>,
    ) -> Self {
        Self {
            model,
            district_average,
            global_average,
            feature_columns,
        }
    }

    /// Reads the manifest at `path` and loads the ONNX model it names.
    pub fn load<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        let path = path.as_ref();
        let manifest = ArtifactManifest::from_path(path)?;

        let model_path = match path.parent() {
            Some(dir) => dir.join(&manifest.model),
            None => manifest.model.clone(),
        };
        let model = OnnxRegressor::load(&model_path, manifest.columns.len())
            .map_err(LoadError::Model)?;

        info!(
            "loaded model {} ({} columns, {} districts)",
            model_path.display(),
            manifest.columns.len(),
            manifest.ilce_map.len()
        );

        Ok(Self::new(
            Box::new(model),
            manifest.ilce_map,
            manifest.global_avg,
            manifest.columns,
        ))
    }

    pub fn model(&self) -> &dyn Regressor {
        self.model.as_ref()
    }

    pub fn district_average(&self, district: &str) -> Option<f64> {
        self.district_average.get(district).copied()
    }

    pub fn global_average(&self) -> f64 {
        self.global_average
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }
}
