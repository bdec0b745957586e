//! Feature preprocessing fitted on the training partition
//!
//! This module turns [`PassengerAttributes`] into the numeric [`FeatureVector`]
//! consumed by the classifier. All parameters are learned once by
//! [`FeaturePipeline::fit`] and then frozen: the same pipeline value is
//! persisted with the model and used unchanged at prediction time.
//!
//! # Overview
//!
//! 1. **Numeric columns** (age, sibsp, parch, fare)
//!    - missing values are replaced by the training median
//!    - values are standardized with the training mean and population standard deviation
//! 2. **Categorical columns** (pclass, sex, embarked)
//!    - missing values are replaced by the most frequent training category
//!    - values are one-hot encoded over the sorted categories seen during training
//!    - a category never seen during training encodes as all zeros
//!
//! # Layout
//!
//! ```text
//! [age, sibsp, parch, fare, pclass=1, pclass=2, pclass=3, sex=female, sex=male, embarked=C, embarked=Q, embarked=S]
//! ```
//!
//! The categorical blocks contain only the categories present in the training
//! partition, so the width can be smaller than shown above.
//!
//! # Example
//!
//! ```
//! use lifeboat_data::record::{PassengerClass, Port, Sex};
//! use lifeboat_model::{attributes::PassengerAttributes, pipeline::FeaturePipeline};
//!
//! let passenger = |pclass, sex, age| PassengerAttributes {
//!     pclass,
//!     sex,
//!     age,
//!     sibsp: 0,
//!     parch: 0,
//!     fare: Some(10.0),
//!     embarked: Some(Port::Southampton),
//! };
//! let training = [
//!     passenger(PassengerClass::First, Sex::Female, Some(20.0)),
//!     passenger(PassengerClass::Third, Sex::Male, Some(40.0)),
//!     passenger(PassengerClass::Third, Sex::Male, None),
//! ];
//!
//! let pipeline = FeaturePipeline::fit(&training).unwrap();
//! let features = pipeline.transform(&training[2]);
//! assert_eq!(features.len(), pipeline.width());
//! assert_eq!(pipeline.feature_names()[4], "pclass=1");
//! ```

use lifeboat_stats::{descriptive::DescriptiveStats, frequency};
use serde::{Deserialize, Serialize};

use crate::{
    FitError,
    attributes::{CategoricalColumn, NumericColumn, PassengerAttributes},
};

/// Numeric input of the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Imputation and scaling parameters of a numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericParams {
    pub column: NumericColumn,
    /// Median of the observed training values, used for missing values
    pub median: f64,
    /// Mean of the imputed training values
    pub mean: f64,
    /// Standard deviation of the imputed training values (1 when it is zero)
    pub scale: f64,
}

/// Imputation and encoding parameters of a categorical column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalParams {
    pub column: CategoricalColumn,
    /// Most frequent training category, used for missing values
    pub most_frequent: String,
    /// Sorted categories seen during training; one indicator dimension each
    pub categories: Vec<String>,
}

/// Frozen preprocessing parameters for all input columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePipeline {
    pub numeric: Vec<NumericParams>,
    pub categorical: Vec<CategoricalParams>,
}

impl FeaturePipeline {
    /// Learns the pipeline parameters from the training rows.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::EmptyTrainingSet`] if `rows` is empty, and
    /// [`FitError::NoObservedValues`] if a column is missing in every row.
    pub fn fit(rows: &[PassengerAttributes]) -> Result<Self, FitError> {
        if rows.is_empty() {
            return Err(FitError::EmptyTrainingSet);
        }
        let numeric = NumericColumn::ALL
            .into_iter()
            .map(|column| NumericParams::fit(column, rows))
            .collect::<Result<Vec<_>, _>>()?;
        let categorical = CategoricalColumn::ALL
            .into_iter()
            .map(|column| CategoricalParams::fit(column, rows))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            numeric,
            categorical,
        })
    }

    /// Transforms one set of raw attributes into a feature vector.
    #[must_use]
    pub fn transform(&self, attributes: &PassengerAttributes) -> FeatureVector {
        let mut values = Vec::with_capacity(self.width());
        for params in &self.numeric {
            values.push(params.transform(attributes));
        }
        for params in &self.categorical {
            params.encode_into(attributes, &mut values);
        }
        FeatureVector(values)
    }

    /// Number of dimensions of the produced feature vectors.
    #[must_use]
    pub fn width(&self) -> usize {
        self.numeric.len()
            + self
                .categorical
                .iter()
                .map(|params| params.categories.len())
                .sum::<usize>()
    }

    /// Names of the produced dimensions, e.g. `age` or `embarked=S`.
    #[must_use]
    pub fn feature_names(&self) -> Vec<String> {
        let numeric = self.numeric.iter().map(|p| p.column.name().to_owned());
        let categorical = self.categorical.iter().flat_map(|p| {
            p.categories
                .iter()
                .map(|category| format!("{}={category}", p.column.name()))
        });
        numeric.chain(categorical).collect()
    }
}

impl NumericParams {
    fn fit(column: NumericColumn, rows: &[PassengerAttributes]) -> Result<Self, FitError> {
        let observed = DescriptiveStats::new(rows.iter().filter_map(|row| column.value(row)))
            .ok_or(FitError::NoObservedValues {
                column: column.name(),
            })?;
        let median = observed.median;
        let imputed = DescriptiveStats::new(
            rows.iter()
                .map(|row| column.value(row).unwrap_or(median)),
        )
        .ok_or(FitError::EmptyTrainingSet)?;
        let scale = if imputed.std_dev == 0.0 {
            1.0
        } else {
            imputed.std_dev
        };
        Ok(Self {
            column,
            median,
            mean: imputed.mean,
            scale,
        })
    }

    fn transform(&self, attributes: &PassengerAttributes) -> f64 {
        let value = self.column.value(attributes).unwrap_or(self.median);
        (value - self.mean) / self.scale
    }
}

impl CategoricalParams {
    fn fit(column: CategoricalColumn, rows: &[PassengerAttributes]) -> Result<Self, FitError> {
        let labels = rows.iter().filter_map(|row| column.label(row));
        let most_frequent = frequency::most_frequent(labels).ok_or(FitError::NoObservedValues {
            column: column.name(),
        })?;
        let categories = frequency::value_counts(
            rows.iter()
                .map(|row| column.label(row).unwrap_or(most_frequent)),
        )
        .into_keys()
        .map(str::to_owned)
        .collect();
        Ok(Self {
            column,
            most_frequent: most_frequent.to_owned(),
            categories,
        })
    }

    fn encode_into(&self, attributes: &PassengerAttributes, values: &mut Vec<f64>) {
        let label = self
            .column
            .label(attributes)
            .unwrap_or(self.most_frequent.as_str());
        values.extend(
            self.categories
                .iter()
                .map(|category| if category == label { 1.0 } else { 0.0 }),
        );
    }
}
