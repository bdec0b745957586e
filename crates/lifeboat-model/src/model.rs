//! The persisted survival model and inference.

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    attributes::PassengerAttributes, forest::RandomForest, pipeline::FeaturePipeline,
    training::TrainingConfig,
};

/// Probability above which a passenger is predicted to survive.
pub const SURVIVAL_THRESHOLD: f64 = 0.5;

/// Error raised when a model artifact cannot be written, read or used.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ModelArtifactError {
    #[display("I/O error on model file {}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("invalid model JSON in {}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("inconsistent model: {reason}")]
    Inconsistent { reason: String },
}

/// How a model was trained and how well it did on held-out rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub config: TrainingConfig,
    pub train_size: usize,
    pub test_size: usize,
    /// Fraction of correctly classified test rows, `None` without test rows
    pub test_accuracy: Option<f64>,
}

/// Survival estimate for one passenger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub probability: f64,
    pub survived: bool,
}

impl Prediction {
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        Self {
            probability,
            survived: probability > SURVIVAL_THRESHOLD,
        }
    }
}

/// A fitted feature pipeline and forest, with training metadata.
///
/// Models are produced by [`train_model`](crate::training::train_model) or
/// loaded from a JSON artifact, and are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub trained_at: DateTime<Utc>,
    pub training: TrainingSummary,
    pub pipeline: FeaturePipeline,
    pub forest: RandomForest,
}

impl TrainedModel {
    /// Predicts the survival of a passenger.
    #[must_use]
    pub fn predict(&self, attributes: &PassengerAttributes) -> Prediction {
        let features = self.pipeline.transform(attributes);
        Prediction::from_probability(self.forest.predict_proba(features.as_slice()))
    }

    /// Writes the model as JSON, creating parent directories as needed.
    pub fn save_json<P>(&self, path: P) -> Result<(), ModelArtifactError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let io_error = |source| ModelArtifactError::Io {
            path: path.to_owned(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
        serde_json::to_writer(&mut writer, self).map_err(|source| ModelArtifactError::Json {
            path: path.to_owned(),
            source,
        })?;
        writer.flush().map_err(io_error)?;
        log::info!("Saved model to {}", path.display());
        Ok(())
    }

    /// Reads and validates a model JSON artifact.
    pub fn load_json<P>(path: P) -> Result<Self, ModelArtifactError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ModelArtifactError::Io {
            path: path.to_owned(),
            source,
        })?;
        let model: Self = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            ModelArtifactError::Json {
                path: path.to_owned(),
                source,
            }
        })?;
        model.validate()?;
        log::info!(
            "Loaded model trained at {} from {}",
            model.trained_at,
            path.display()
        );
        Ok(model)
    }

    /// Checks that the pipeline and the forest fit together.
    pub fn validate(&self) -> Result<(), ModelArtifactError> {
        let inconsistent = |reason| ModelArtifactError::Inconsistent { reason };
        if self.pipeline.width() != self.forest.width() {
            return Err(inconsistent(format!(
                "pipeline produces {} features, but the forest expects {}",
                self.pipeline.width(),
                self.forest.width()
            )));
        }
        self.forest.validate().map_err(inconsistent)
    }
}
