use log::{error, warn};

use crate::artifacts::TrainingArtifacts;
use crate::cities::CityDirectory;
use crate::config::Config;
use crate::prediction::PredictionService;

/// Read-only state shared by every handler.
pub struct AppState {
    pub predictions: PredictionService,
    pub cities: CityDirectory,
}

impl AppState {
    pub fn new(predictions: PredictionService, cities: CityDirectory) -> Self {
        Self {
            predictions,
            cities,
        }
    }

    /// Loads artifacts and the city directory. Failures degrade the
    /// corresponding endpoint instead of aborting startup.
    pub fn load(config: &Config) -> Self {
        let artifacts = match TrainingArtifacts::load(&config.artifacts) {
            Ok(artifacts) => Some(artifacts),
            Err(e) => {
                error!(
                    "failed to load artifacts from {}: {}",
                    config.artifacts.display(),
                    e
                );
                None
            }
        };

        let cities = match CityDirectory::load(&config.dataset) {
            Ok(cities) => cities,
            Err(e) => {
                warn!(
                    "city directory unavailable ({}): {}",
                    config.dataset.display(),
                    e
                );
                CityDirectory::default()
            }
        };

        Self::new(PredictionService::new(artifacts), cities)
    }
}
