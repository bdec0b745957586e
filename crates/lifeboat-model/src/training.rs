//! End-to-end training of the survival model from a passenger table.

use chrono::Utc;
use lifeboat_data::Dataset;
use serde::{Deserialize, Serialize};

use crate::{
    FitError,
    attributes::PassengerAttributes,
    forest::{ForestParams, RandomForest},
    model::{TrainedModel, TrainingSummary},
    pipeline::FeaturePipeline,
    split,
};

/// Hyper-parameters of [`train_model`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation
    pub test_ratio: f64,
    /// Seed of the train/test shuffle
    pub split_seed: u64,
    pub forest: ForestParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            split_seed: 42,
            forest: ForestParams::default(),
        }
    }
}

/// Trains a model on `dataset`.
///
/// The rows are split into train and test partitions, the feature pipeline
/// and the forest are fitted on the train partition only, and the accuracy
/// is measured on the test partition.
///
/// # Errors
///
/// Returns [`FitError`] if the train partition is empty or a feature column
/// has no observed value in it.
pub fn train_model(dataset: &Dataset, config: &TrainingConfig) -> Result<TrainedModel, FitError> {
    let rows = dataset.rows();
    let split = split::train_test_split(rows.len(), config.test_ratio, config.split_seed);
    log::info!(
        "Splitting {} passengers into {} train and {} test rows",
        rows.len(),
        split.train.len(),
        split.test.len()
    );

    let train_attributes = split
        .train
        .iter()
        .map(|&i| PassengerAttributes::from(&rows[i]))
        .collect::<Vec<_>>();
    let train_labels = split.train.iter().map(|&i| rows[i].survived).collect::<Vec<_>>();

    log::info!("Fitting feature pipeline...");
    let pipeline = FeaturePipeline::fit(&train_attributes)?;
    let train_features = train_attributes
        .iter()
        .map(|attributes| pipeline.transform(attributes))
        .collect::<Vec<_>>();
    log::debug!("Feature layout: {}", pipeline.feature_names().join(", "));

    log::info!(
        "Fitting random forest with {} trees...",
        config.forest.tree_count
    );
    let forest = RandomForest::fit(&train_features, &train_labels, &config.forest)?;

    let mut model = TrainedModel {
        trained_at: Utc::now(),
        training: TrainingSummary {
            config: *config,
            train_size: split.train.len(),
            test_size: split.test.len(),
            test_accuracy: None,
        },
        pipeline,
        forest,
    };

    let correct = split
        .test
        .iter()
        .filter(|&&i| {
            let record = &rows[i];
            model.predict(&PassengerAttributes::from(record)).survived == record.survived
        })
        .count();
    #[expect(clippy::cast_precision_loss)]
    let accuracy = (!split.test.is_empty()).then(|| correct as f64 / split.test.len() as f64);
    model.training.test_accuracy = accuracy;

    match accuracy {
        Some(accuracy) => log::info!("Model trained, test accuracy {:.2}%", accuracy * 100.0),
        None => log::info!("Model trained, no rows held out for evaluation"),
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use lifeboat_data::synth::{self, SyntheticConfig};

    use super::*;

    fn small_config() -> TrainingConfig {
        TrainingConfig {
            forest: ForestParams {
                tree_count: 10,
                ..ForestParams::default()
            },
            ..TrainingConfig::default()
        }
    }

    fn small_dataset() -> Dataset {
        synth::generate(&SyntheticConfig {
            seed: 42,
            count: 200,
        })
        .unwrap()
    }

    #[test]
    fn test_training_is_reproducible() {
        let dataset = small_dataset();
        let a = train_model(&dataset, &small_config()).unwrap();
        let b = train_model(&dataset, &small_config()).unwrap();

        assert_eq!(a.training, b.training);
        assert_eq!(a.pipeline, b.pipeline);
        assert_eq!(
            serde_json::to_string(&a.forest).unwrap(),
            serde_json::to_string(&b.forest).unwrap()
        );
    }

    #[test]
    fn test_training_summary() {
        let model = train_model(&small_dataset(), &small_config()).unwrap();
        assert_eq!(model.training.train_size, 160);
        assert_eq!(model.training.test_size, 40);
        let accuracy = model.training.test_accuracy.unwrap();
        assert!((0.0..=1.0).contains(&accuracy));
        assert_eq!(model.forest.trees().len(), 10);
        assert_eq!(model.forest.width(), model.pipeline.width());
    }

    #[test]
    fn test_pipeline_is_fitted_on_train_rows_only() {
        let dataset = small_dataset();
        let config = small_config();
        let model = train_model(&dataset, &config).unwrap();

        let rows = dataset.rows();
        let split = split::train_test_split(rows.len(), config.test_ratio, config.split_seed);
        let train = split
            .train
            .iter()
            .map(|&i| PassengerAttributes::from(&rows[i]))
            .collect::<Vec<_>>();
        let all = rows.iter().map(PassengerAttributes::from).collect::<Vec<_>>();

        assert_eq!(model.pipeline, FeaturePipeline::fit(&train).unwrap());
        assert_ne!(model.pipeline, FeaturePipeline::fit(&all).unwrap());
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let dataset = Dataset::from_records(vec![]).unwrap();
        assert!(matches!(
            train_model(&dataset, &small_config()),
            Err(FitError::EmptyTrainingSet)
        ));
    }
}
