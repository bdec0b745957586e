//! Passenger records and their categorical fields.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Error returned when a string or number is outside a categorical field's domain.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid {field}: {value:?}")]
pub struct ParseCategoryError {
    /// Name of the field being parsed
    pub field: &'static str,
    /// The rejected input
    pub value: String,
}

impl ParseCategoryError {
    fn new(field: &'static str, value: impl fmt::Display) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

/// Ticket class of a passenger.
///
/// Serialized as the integers `1`, `2` and `3`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum PassengerClass {
    First,
    Second,
    Third,
}

impl PassengerClass {
    pub const ALL: [Self; 3] = [Self::First, Self::Second, Self::Third];

    /// Returns the class number (1, 2 or 3).
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::First => "First Class",
            Self::Second => "Second Class",
            Self::Third => "Third Class",
        }
    }
}

impl TryFrom<u8> for PassengerClass {
    type Error = ParseCategoryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            _ => Err(ParseCategoryError::new("pclass", value)),
        }
    }
}

impl From<PassengerClass> for u8 {
    fn from(value: PassengerClass) -> Self {
        value.number()
    }
}

impl FromStr for PassengerClass {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(|n| Self::try_from(n).ok())
            .ok_or_else(|| ParseCategoryError::new("pclass", s))
    }
}

impl fmt::Display for PassengerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Sex of a passenger, serialized as `male` / `female`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// Both values, in reporting order (female first).
    pub const ALL: [Self; 2] = [Self::Female, Self::Male];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
        }
    }
}

impl FromStr for Sex {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "female" => Ok(Self::Female),
            "male" => Ok(Self::Male),
            _ => Err(ParseCategoryError::new("sex", s)),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Port of embarkation, serialized as its one-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Port {
    #[serde(rename = "S")]
    Southampton,
    #[serde(rename = "C")]
    Cherbourg,
    #[serde(rename = "Q")]
    Queenstown,
}

impl Port {
    /// All ports, in reporting order (S, C, Q).
    pub const ALL: [Self; 3] = [Self::Southampton, Self::Cherbourg, Self::Queenstown];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Southampton => "S",
            Self::Cherbourg => "C",
            Self::Queenstown => "Q",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Southampton => "Southampton",
            Self::Cherbourg => "Cherbourg",
            Self::Queenstown => "Queenstown",
        }
    }
}

impl FromStr for Port {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S" => Ok(Self::Southampton),
            "C" => Ok(Self::Cherbourg),
            "Q" => Ok(Self::Queenstown),
            _ => Err(ParseCategoryError::new("embarked", s)),
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One row of the passenger table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerRecord {
    /// Unique, stable passenger id
    pub id: u32,
    pub survived: bool,
    pub pclass: PassengerClass,
    pub name: String,
    pub sex: Sex,
    /// Age in years; `None` when unknown
    pub age: Option<f64>,
    /// Number of siblings and spouses aboard
    pub sibsp: u32,
    /// Number of parents and children aboard
    pub parch: u32,
    pub ticket: String,
    pub fare: f64,
    pub cabin: Option<String>,
    /// Port of embarkation; `None` when unknown
    pub embarked: Option<Port>,
}

impl PassengerRecord {
    /// Number of family members travelling together, the passenger included.
    ///
    /// Saturates at `u32::MAX`.
    #[must_use]
    pub fn family_size(&self) -> u32 {
        self.sibsp.saturating_add(self.parch).saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passenger_class_round_trip_through_number() {
        for class in PassengerClass::ALL {
            assert_eq!(PassengerClass::try_from(class.number()), Ok(class));
            assert_eq!(class.to_string().parse::<PassengerClass>(), Ok(class));
        }
        assert!(PassengerClass::try_from(0).is_err());
        assert!(PassengerClass::try_from(4).is_err());
        assert!("first".parse::<PassengerClass>().is_err());
    }

    #[test]
    fn test_sex_parse_is_exact() {
        assert_eq!("female".parse(), Ok(Sex::Female));
        assert_eq!("male".parse(), Ok(Sex::Male));
        let err = "Male".parse::<Sex>().unwrap_err();
        assert_eq!(err.to_string(), r#"invalid sex: "Male""#);
    }

    #[test]
    fn test_port_codes() {
        for port in Port::ALL {
            assert_eq!(port.code().parse(), Ok(port));
        }
        assert!("X".parse::<Port>().is_err());
    }

    #[test]
    fn test_record_json_shape() {
        let record = PassengerRecord {
            id: 3,
            survived: true,
            pclass: PassengerClass::Second,
            name: "Passenger 3".to_owned(),
            sex: Sex::Female,
            age: None,
            sibsp: 1,
            parch: 0,
            ticket: "Ticket 3".to_owned(),
            fare: 12.5,
            cabin: None,
            embarked: Some(Port::Queenstown),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["pclass"], 2);
        assert_eq!(json["sex"], "female");
        assert_eq!(json["embarked"], "Q");
        assert!(json["age"].is_null());
        assert_eq!(record.family_size(), 2);
    }

    #[test]
    fn test_family_size_saturates() {
        let record = PassengerRecord {
            id: 1,
            survived: false,
            pclass: PassengerClass::Third,
            name: "Passenger 1".to_owned(),
            sex: Sex::Male,
            age: Some(30.0),
            sibsp: u32::MAX,
            parch: 2,
            ticket: "Ticket 1".to_owned(),
            fare: 7.25,
            cabin: None,
            embarked: Some(Port::Southampton),
        };
        assert_eq!(record.family_size(), u32::MAX);
    }
}
