//! Artifact bootstrapping and the read-only query service.
//!
//! Startup happens in two phases. [`bootstrap`] makes sure the dataset and
//! model artifacts exist, generating a synthetic table and training a model
//! when they are missing. [`Service::load`] then reads both artifacts into
//! immutable values; every query goes through the loaded service.

use std::fmt;

use anyhow::Context as _;
use lifeboat_data::{
    Dataset,
    aggregate::{self, GroupSurvival, Grouping},
    record::PassengerRecord,
    store::LoadDatasetError,
    synth::{self, SyntheticConfig},
};
use lifeboat_model::{
    model::{ModelArtifactError, TrainedModel},
    training::{self, TrainingConfig},
};
use serde::Serialize;

use crate::{
    request::{InvalidFeatureError, PassengerQuery, PredictRequest},
    util::{self, DataPaths},
};

/// JSON envelope of every command result.
#[derive(Debug, Serialize)]
pub(crate) struct Response<T> {
    pub(crate) success: bool,
    pub(crate) data: Option<T>,
    pub(crate) error: Option<String>,
}

impl<T> Response<T> {
    pub(crate) fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub(crate) fn failure(error: impl fmt::Display) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }

    pub(crate) fn from_result<E>(result: Result<T, E>) -> Self
    where
        E: fmt::Display,
    {
        result.map_or_else(Self::failure, Self::ok)
    }
}

/// Startup failure: an artifact is missing or unusable.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub(crate) enum DataUnavailable {
    #[display("dataset unavailable")]
    Dataset { source: LoadDatasetError },
    #[display("model unavailable")]
    Model { source: ModelArtifactError },
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BootstrapOptions {
    /// Retrain and overwrite the model even if it exists
    pub(crate) force: bool,
    pub(crate) synthetic: SyntheticConfig,
    pub(crate) training: TrainingConfig,
}

/// What [`bootstrap`] had to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BootstrapReport {
    pub(crate) dataset_created: bool,
    pub(crate) model_trained: bool,
}

/// Creates the dataset and model artifacts that do not exist yet.
pub(crate) fn bootstrap(
    paths: &DataPaths,
    options: &BootstrapOptions,
) -> anyhow::Result<BootstrapReport> {
    let dataset_path = paths.dataset();
    let model_path = paths.model();
    let dataset_created = !dataset_path.exists();
    let model_trained = options.force || dataset_created || !model_path.exists();
    if !model_trained {
        return Ok(BootstrapReport {
            dataset_created,
            model_trained,
        });
    }

    let dataset = if dataset_created {
        log::warn!(
            "No dataset at {}, generating a synthetic one",
            dataset_path.display()
        );
        let dataset =
            synth::generate(&options.synthetic).context("Failed to generate synthetic dataset")?;
        util::create_parent_dir(&dataset_path)?;
        dataset
            .save_csv(&dataset_path)
            .with_context(|| format!("Failed to write dataset: {}", dataset_path.display()))?;
        dataset
    } else {
        Dataset::load_csv(&dataset_path)
            .with_context(|| format!("Failed to load dataset: {}", dataset_path.display()))?
    };

    log::info!("Training survival model...");
    let model =
        training::train_model(&dataset, &options.training).context("Failed to train model")?;
    model
        .save_json(&model_path)
        .with_context(|| format!("Failed to write model: {}", model_path.display()))?;

    Ok(BootstrapReport {
        dataset_created,
        model_trained,
    })
}

/// Read-only view of the loaded dataset and model.
#[derive(Debug)]
pub(crate) struct Service {
    dataset: Dataset,
    model: TrainedModel,
}

/// Survival prediction with the request echoed back.
#[derive(Debug, Serialize)]
pub(crate) struct PredictResponse<'a> {
    pub(crate) survival: bool,
    pub(crate) probability: f64,
    pub(crate) features: &'a PredictRequest,
}

impl Service {
    pub(crate) fn new(dataset: Dataset, model: TrainedModel) -> Self {
        Self { dataset, model }
    }

    /// Loads both artifacts; they must already exist.
    pub(crate) fn load(paths: &DataPaths) -> Result<Self, DataUnavailable> {
        let dataset = Dataset::load_csv(paths.dataset())
            .map_err(|source| DataUnavailable::Dataset { source })?;
        let model = TrainedModel::load_json(paths.model())
            .map_err(|source| DataUnavailable::Model { source })?;
        Ok(Self::new(dataset, model))
    }

    /// Bootstraps missing artifacts, then loads them.
    pub(crate) fn start(paths: &DataPaths) -> anyhow::Result<Self> {
        bootstrap(paths, &BootstrapOptions::default())?;
        Ok(Self::load(paths)?)
    }

    pub(crate) fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub(crate) fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub(crate) fn passengers(
        &self,
        query: &PassengerQuery,
    ) -> Result<Vec<&PassengerRecord>, InvalidFeatureError> {
        let filter = query.to_filter()?;
        Ok(filter.apply(self.dataset.rows()))
    }

    pub(crate) fn stats(&self, grouping: &str) -> Result<Vec<GroupSurvival>, InvalidFeatureError> {
        let grouping = grouping.parse::<Grouping>()?;
        Ok(aggregate::aggregate(self.dataset.rows(), &grouping))
    }

    pub(crate) fn predict<'a>(
        &self,
        request: &'a PredictRequest,
    ) -> Result<PredictResponse<'a>, InvalidFeatureError> {
        let attributes = request.to_attributes()?;
        let prediction = self.model.predict(&attributes);
        Ok(PredictResponse {
            survival: prediction.survived,
            probability: prediction.probability,
            features: request,
        })
    }
}
