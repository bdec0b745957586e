//! In-memory passenger table and its flat-file persistence.
//!
//! A [`Dataset`] is built once (from CSV or from already constructed records),
//! validated, ordered by passenger id and never mutated afterwards. Every query
//! in this crate borrows its rows.
//!
//! # CSV layout
//!
//! ```text
//! PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
//! 1,0,3,Passenger 1,male,22.0,1,0,Ticket 1,7.25,,S
//! ```
//!
//! `Survived` is `0`/`1`; empty `Age`, `Cabin` and `Embarked` cells are missing values.

use std::{
    collections::HashSet,
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::record::{ParseCategoryError, PassengerClass, PassengerRecord, Port, Sex};

/// Error raised when the passenger table cannot be loaded or fails validation.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadDatasetError {
    #[display("failed to open dataset file {}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[display("failed to parse dataset CSV")]
    Csv { source: csv::Error },
    #[display("invalid passenger record {id}: {reason}")]
    InvalidRecord { id: u32, reason: String },
    #[display("duplicate passenger id {id}")]
    DuplicateId { id: u32 },
}

/// A column of the passenger table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Survived,
    Pclass,
    Name,
    Sex,
    Age,
    SibSp,
    Parch,
    Ticket,
    Fare,
    Cabin,
    Embarked,
}

impl Column {
    pub const ALL: [Self; 12] = [
        Self::Id,
        Self::Survived,
        Self::Pclass,
        Self::Name,
        Self::Sex,
        Self::Age,
        Self::SibSp,
        Self::Parch,
        Self::Ticket,
        Self::Fare,
        Self::Cabin,
        Self::Embarked,
    ];

    /// Field name as used in serialized records.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Survived => "survived",
            Self::Pclass => "pclass",
            Self::Name => "name",
            Self::Sex => "sex",
            Self::Age => "age",
            Self::SibSp => "sibsp",
            Self::Parch => "parch",
            Self::Ticket => "ticket",
            Self::Fare => "fare",
            Self::Cabin => "cabin",
            Self::Embarked => "embarked",
        }
    }

    /// Reads this column's value from a record.
    #[must_use]
    pub fn value_of(self, record: &PassengerRecord) -> ColumnValue<'_> {
        match self {
            Self::Id => ColumnValue::Integer(record.id),
            Self::Survived => ColumnValue::Bool(record.survived),
            Self::Pclass => ColumnValue::Integer(u32::from(record.pclass.number())),
            Self::Name => ColumnValue::Text(&record.name),
            Self::Sex => ColumnValue::Text(record.sex.as_str()),
            Self::Age => record.age.map_or(ColumnValue::Missing, ColumnValue::Real),
            Self::SibSp => ColumnValue::Integer(record.sibsp),
            Self::Parch => ColumnValue::Integer(record.parch),
            Self::Ticket => ColumnValue::Text(&record.ticket),
            Self::Fare => ColumnValue::Real(record.fare),
            Self::Cabin => record
                .cabin
                .as_deref()
                .map_or(ColumnValue::Missing, ColumnValue::Text),
            Self::Embarked => record
                .embarked
                .map_or(ColumnValue::Missing, |port| ColumnValue::Text(port.code())),
        }
    }
}

impl FromStr for Column {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|column| column.name() == s)
            .ok_or_else(|| ParseCategoryError {
                field: "column",
                value: s.to_owned(),
            })
    }
}

/// A single cell of the passenger table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnValue<'a> {
    Missing,
    Bool(bool),
    Integer(u32),
    Real(f64),
    Text(&'a str),
}

/// The immutable passenger table.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<PassengerRecord>,
}

impl Dataset {
    /// Builds a dataset from records, validating every row.
    ///
    /// Rows are ordered by ascending passenger id.
    pub fn from_records(mut records: Vec<PassengerRecord>) -> Result<Self, LoadDatasetError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            validate_record(record)?;
            if !seen.insert(record.id) {
                return Err(LoadDatasetError::DuplicateId { id: record.id });
            }
        }
        records.sort_by_key(|record| record.id);
        Ok(Self { rows: records })
    }

    /// Loads and validates a dataset from a CSV file.
    pub fn load_csv<P>(path: P) -> Result<Self, LoadDatasetError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadDatasetError::Open {
            path: path.to_owned(),
            source,
        })?;
        let dataset = Self::read_csv(BufReader::new(file))?;
        log::info!(
            "Loaded {} passengers from {}",
            dataset.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Reads and validates a dataset from CSV data.
    pub fn read_csv<R>(reader: R) -> Result<Self, LoadDatasetError>
    where
        R: io::Read,
    {
        let mut reader = csv::Reader::from_reader(reader);
        let records = reader
            .deserialize::<CsvRow>()
            .map(|row| {
                let row = row.map_err(|source| LoadDatasetError::Csv { source })?;
                PassengerRecord::try_from(row)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_records(records)
    }

    /// Writes the dataset to a CSV file, replacing any existing file.
    pub fn save_csv<P>(&self, path: P) -> Result<(), csv::Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.write_csv(file)?;
        log::info!("Saved {} passengers to {}", self.len(), path.display());
        Ok(())
    }

    /// Writes the dataset as CSV data.
    pub fn write_csv<W>(&self, writer: W) -> Result<(), csv::Error>
    where
        W: io::Write,
    {
        let mut writer = csv::Writer::from_writer(writer);
        for record in &self.rows {
            writer.serialize(CsvRow::from(record))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// All rows, ordered by ascending passenger id.
    #[must_use]
    pub fn rows(&self) -> &[PassengerRecord] {
        &self.rows
    }

    /// Values of one column, aligned with [`rows`](Self::rows).
    #[must_use]
    pub fn column_values(&self, column: Column) -> Vec<ColumnValue<'_>> {
        self.rows.iter().map(|row| column.value_of(row)).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn validate_record(record: &PassengerRecord) -> Result<(), LoadDatasetError> {
    let invalid = |reason: &str| LoadDatasetError::InvalidRecord {
        id: record.id,
        reason: reason.to_owned(),
    };
    if record.id == 0 {
        return Err(invalid("id must be positive"));
    }
    if record
        .age
        .is_some_and(|age| !age.is_finite() || age < 0.0)
    {
        return Err(invalid("age must be a non-negative number"));
    }
    if !record.fare.is_finite() || record.fare < 0.0 {
        return Err(invalid("fare must be a non-negative number"));
    }
    Ok(())
}

/// On-disk row layout, using the column headers of the published dataset.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CsvRow {
    passenger_id: u32,
    survived: u8,
    pclass: u8,
    name: String,
    sex: String,
    age: Option<f64>,
    #[serde(rename = "SibSp")]
    sibsp: u32,
    parch: u32,
    ticket: String,
    fare: f64,
    cabin: Option<String>,
    embarked: Option<String>,
}

impl TryFrom<CsvRow> for PassengerRecord {
    type Error = LoadDatasetError;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        let id = row.passenger_id;
        let invalid = |reason: String| LoadDatasetError::InvalidRecord { id, reason };
        let survived = match row.survived {
            0 => false,
            1 => true,
            n => return Err(invalid(format!("survived must be 0 or 1, got {n}"))),
        };
        let pclass = PassengerClass::try_from(row.pclass).map_err(|e| invalid(e.to_string()))?;
        let sex = row.sex.parse::<Sex>().map_err(|e| invalid(e.to_string()))?;
        let embarked = row
            .embarked
            .filter(|code| !code.is_empty())
            .map(|code| code.parse::<Port>())
            .transpose()
            .map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            id,
            survived,
            pclass,
            name: row.name,
            sex,
            age: row.age,
            sibsp: row.sibsp,
            parch: row.parch,
            ticket: row.ticket,
            fare: row.fare,
            cabin: row.cabin.filter(|cabin| !cabin.is_empty()),
            embarked,
        })
    }
}

impl From<&PassengerRecord> for CsvRow {
    fn from(record: &PassengerRecord) -> Self {
        Self {
            passenger_id: record.id,
            survived: u8::from(record.survived),
            pclass: record.pclass.number(),
            name: record.name.clone(),
            sex: record.sex.as_str().to_owned(),
            age: record.age,
            sibsp: record.sibsp,
            parch: record.parch,
            ticket: record.ticket.clone(),
            fare: record.fare,
            cabin: record.cabin.clone(),
            embarked: record.embarked.map(|port| port.code().to_owned()),
        }
    }
}
