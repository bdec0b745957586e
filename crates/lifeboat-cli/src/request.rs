//! Validation of raw request arguments at the process boundary.

use std::str::FromStr as _;

use lifeboat_data::{
    filter::PassengerFilter,
    record::{ParseCategoryError, PassengerClass, Port, Sex},
};
use lifeboat_model::attributes::PassengerAttributes;
use serde::Serialize;

const MAX_AGE: f64 = 100.0;

/// A request argument outside its accepted domain.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("invalid {field}: {reason}")]
pub(crate) struct InvalidFeatureError {
    pub(crate) field: &'static str,
    pub(crate) reason: String,
}

impl InvalidFeatureError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl From<ParseCategoryError> for InvalidFeatureError {
    fn from(error: ParseCategoryError) -> Self {
        Self::new(error.field, format!("unsupported value {:?}", error.value))
    }
}

/// Optional passenger filters, as received on the command line.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PassengerQuery {
    /// Only passengers who survived (true) or died (false)
    #[arg(long)]
    pub(crate) survived: Option<bool>,
    /// Ticket class (1-3)
    #[arg(long)]
    pub(crate) pclass: Option<u8>,
    /// Sex (male or female)
    #[arg(long)]
    pub(crate) sex: Option<String>,
    /// Minimum age, inclusive
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) age_min: Option<f64>,
    /// Maximum age, inclusive (at most 100)
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) age_max: Option<f64>,
    /// Port of embarkation (S, C or Q)
    #[arg(long)]
    pub(crate) embarked: Option<String>,
}

impl PassengerQuery {
    pub(crate) fn to_filter(&self) -> Result<PassengerFilter, InvalidFeatureError> {
        let age_min = self
            .age_min
            .map(|age| non_negative("age_min", age))
            .transpose()?;
        let age_max = self
            .age_max
            .map(|age| {
                if age.is_nan() || age > MAX_AGE {
                    return Err(InvalidFeatureError::new(
                        "age_max",
                        format!("{age} is above {MAX_AGE}"),
                    ));
                }
                Ok(age)
            })
            .transpose()?;
        Ok(PassengerFilter {
            survived: self.survived,
            pclass: self.pclass.map(PassengerClass::try_from).transpose()?,
            sex: self.sex.as_deref().map(Sex::from_str).transpose()?,
            age_min,
            age_max,
            embarked: self.embarked.as_deref().map(Port::from_str).transpose()?,
        })
    }
}

/// Passenger attributes to predict from, echoed back in the response.
#[derive(Debug, Clone, Serialize, clap::Args)]
pub(crate) struct PredictRequest {
    /// Ticket class (1-3)
    #[arg(long)]
    pub(crate) pclass: u8,
    /// Sex (male or female)
    #[arg(long)]
    pub(crate) sex: String,
    /// Age in years
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) age: f64,
    /// Number of siblings and spouses aboard
    #[arg(long, default_value_t = 0)]
    pub(crate) sibsp: u32,
    /// Number of parents and children aboard
    #[arg(long, default_value_t = 0)]
    pub(crate) parch: u32,
    /// Ticket fare
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) fare: f64,
    /// Port of embarkation (S, C or Q)
    #[arg(long)]
    pub(crate) embarked: String,
}

impl PredictRequest {
    pub(crate) fn to_attributes(&self) -> Result<PassengerAttributes, InvalidFeatureError> {
        Ok(PassengerAttributes {
            pclass: PassengerClass::try_from(self.pclass)?,
            sex: self.sex.parse()?,
            age: Some(non_negative("age", self.age)?),
            sibsp: self.sibsp,
            parch: self.parch,
            fare: Some(non_negative("fare", self.fare)?),
            embarked: Some(self.embarked.parse()?),
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, InvalidFeatureError> {
    if !value.is_finite() || value < 0.0 {
        return Err(InvalidFeatureError::new(
            field,
            format!("{value} is not a finite non-negative number"),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predict_request() -> PredictRequest {
        PredictRequest {
            pclass: 1,
            sex: "female".to_owned(),
            age: 29.0,
            sibsp: 0,
            parch: 0,
            fare: 100.0,
            embarked: "C".to_owned(),
        }
    }

    #[test]
    fn test_query_to_filter() {
        let query = PassengerQuery {
            pclass: Some(1),
            sex: Some("female".to_owned()),
            age_min: Some(0.0),
            age_max: Some(100.0),
            ..PassengerQuery::default()
        };
        assert_eq!(
            query.to_filter().unwrap(),
            PassengerFilter {
                pclass: Some(PassengerClass::First),
                sex: Some(Sex::Female),
                age_min: Some(0.0),
                age_max: Some(100.0),
                ..PassengerFilter::default()
            }
        );
        assert!(PassengerQuery::default().to_filter().unwrap().is_empty());
    }

    #[test]
    fn test_query_rejects_out_of_domain_values() {
        let cases = [
            (
                PassengerQuery {
                    pclass: Some(4),
                    ..PassengerQuery::default()
                },
                "pclass",
            ),
            (
                PassengerQuery {
                    sex: Some("Female".to_owned()),
                    ..PassengerQuery::default()
                },
                "sex",
            ),
            (
                PassengerQuery {
                    embarked: Some("X".to_owned()),
                    ..PassengerQuery::default()
                },
                "embarked",
            ),
            (
                PassengerQuery {
                    age_min: Some(-1.0),
                    ..PassengerQuery::default()
                },
                "age_min",
            ),
            (
                PassengerQuery {
                    age_max: Some(100.5),
                    ..PassengerQuery::default()
                },
                "age_max",
            ),
        ];
        for (query, field) in cases {
            let error = query.to_filter().unwrap_err();
            assert_eq!(error.field, field, "{query:?}");
        }
    }

    #[test]
    fn test_predict_request_to_attributes() {
        let attributes = predict_request().to_attributes().unwrap();
        assert_eq!(
            attributes,
            PassengerAttributes {
                pclass: PassengerClass::First,
                sex: Sex::Female,
                age: Some(29.0),
                sibsp: 0,
                parch: 0,
                fare: Some(100.0),
                embarked: Some(Port::Cherbourg),
            }
        );
    }

    #[test]
    fn test_predict_request_rejects_invalid_features() {
        let mut request = predict_request();
        request.fare = f64::NAN;
        assert_eq!(request.to_attributes().unwrap_err().field, "fare");

        let mut request = predict_request();
        request.age = -3.0;
        assert_eq!(request.to_attributes().unwrap_err().field, "age");

        let mut request = predict_request();
        request.pclass = 0;
        assert_eq!(
            request.to_attributes().unwrap_err().to_string(),
            "invalid pclass: unsupported value \"0\""
        );
    }
}
