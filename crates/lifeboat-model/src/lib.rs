//! Survival model training and inference
//!
//! This crate turns the passenger table into a persisted survival classifier
//! and answers predictions with it.
//!
//! # Overview
//!
//! 1. **Split** ([`split::train_test_split`]): seeded train/test partition of the rows
//! 2. **Preprocess** ([`pipeline::FeaturePipeline`]): median/mode imputation,
//!    standardization and one-hot encoding, fitted on the train partition only
//! 3. **Classify** ([`forest::RandomForest`]): bagged CART trees with Gini splits
//! 4. **Persist** ([`model::TrainedModel`]): pipeline, forest and training
//!    metadata in one JSON artifact
//!
//! [`training::train_model`] runs the whole sequence and reports the accuracy
//! on the held-out rows.
//!
//! # Example
//!
//! ```
//! use lifeboat_data::{
//!     record::{PassengerClass, Port, Sex},
//!     synth::{self, SyntheticConfig},
//! };
//! use lifeboat_model::{
//!     attributes::PassengerAttributes,
//!     forest::ForestParams,
//!     training::{self, TrainingConfig},
//! };
//!
//! let dataset = synth::generate(&SyntheticConfig::default()).unwrap();
//! let config = TrainingConfig {
//!     forest: ForestParams {
//!         tree_count: 10,
//!         ..ForestParams::default()
//!     },
//!     ..TrainingConfig::default()
//! };
//! let model = training::train_model(&dataset, &config).unwrap();
//!
//! let prediction = model.predict(&PassengerAttributes {
//!     pclass: PassengerClass::Second,
//!     sex: Sex::Female,
//!     age: Some(8.0),
//!     sibsp: 1,
//!     parch: 1,
//!     fare: Some(26.0),
//!     embarked: Some(Port::Southampton),
//! });
//! assert!((0.0..=1.0).contains(&prediction.probability));
//! assert_eq!(prediction.survived, prediction.probability > 0.5);
//! ```

pub mod attributes;
pub mod forest;
pub mod model;
pub mod pipeline;
pub mod split;
pub mod training;

/// Error raised when the pipeline or the classifier cannot be fitted.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum FitError {
    #[display("no training rows")]
    EmptyTrainingSet,
    #[display("column {column} has no observed values in the training rows")]
    NoObservedValues { column: &'static str },
    #[display("{features} feature vectors but {labels} labels")]
    LabelCountMismatch { features: usize, labels: usize },
    #[display("forest needs at least one tree")]
    NoTrees,
    #[display("feature vector width {found} differs from {expected}")]
    InconsistentFeatureWidth { expected: usize, found: usize },
}
