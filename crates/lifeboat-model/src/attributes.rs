//! Raw model inputs and the columns the feature pipeline reads from them.

use lifeboat_data::record::{PassengerClass, PassengerRecord, Port, Sex};
use serde::{Deserialize, Serialize};

/// The passenger attributes the model is trained on and predicts from.
///
/// Training rows come from [`PassengerRecord`]s and may have an unknown age
/// or port; prediction inputs are validated at the boundary and always
/// complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerAttributes {
    pub pclass: PassengerClass,
    pub sex: Sex,
    pub age: Option<f64>,
    pub sibsp: u32,
    pub parch: u32,
    pub fare: Option<f64>,
    pub embarked: Option<Port>,
}

impl From<&PassengerRecord> for PassengerAttributes {
    fn from(record: &PassengerRecord) -> Self {
        Self {
            pclass: record.pclass,
            sex: record.sex,
            age: record.age,
            sibsp: record.sibsp,
            parch: record.parch,
            fare: Some(record.fare),
            embarked: record.embarked,
        }
    }
}

/// Numeric input columns, imputed with their median and standardized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericColumn {
    Age,
    SibSp,
    Parch,
    Fare,
}

impl NumericColumn {
    /// Columns in feature-vector order.
    pub const ALL: [Self; 4] = [Self::Age, Self::SibSp, Self::Parch, Self::Fare];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::SibSp => "sibsp",
            Self::Parch => "parch",
            Self::Fare => "fare",
        }
    }

    #[must_use]
    pub fn value(self, attributes: &PassengerAttributes) -> Option<f64> {
        match self {
            Self::Age => attributes.age,
            Self::SibSp => Some(f64::from(attributes.sibsp)),
            Self::Parch => Some(f64::from(attributes.parch)),
            Self::Fare => attributes.fare,
        }
    }
}

/// Categorical input columns, imputed with their most frequent category and one-hot encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoricalColumn {
    Pclass,
    Sex,
    Embarked,
}

impl CategoricalColumn {
    /// Columns in feature-vector order, after the numeric columns.
    pub const ALL: [Self; 3] = [Self::Pclass, Self::Sex, Self::Embarked];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pclass => "pclass",
            Self::Sex => "sex",
            Self::Embarked => "embarked",
        }
    }

    /// Category label of this column, or `None` when the value is unknown.
    #[must_use]
    pub fn label(self, attributes: &PassengerAttributes) -> Option<&'static str> {
        match self {
            Self::Pclass => Some(match attributes.pclass {
                PassengerClass::First => "1",
                PassengerClass::Second => "2",
                PassengerClass::Third => "3",
            }),
            Self::Sex => Some(attributes.sex.as_str()),
            Self::Embarked => attributes.embarked.map(Port::code),
        }
    }
}
