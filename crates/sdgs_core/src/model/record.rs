//! Indicator record domain model.
//!
//! # Responsibility
//! - Define `Record`, its composite `RecordId` and the measure set.
//! - Validate create drafts and measure patches before any store call.
//!
//! # Invariants
//! - `id == RecordId::derive(region_name, year)` for every persisted record.
//! - `id`, `region_name` and `year` never change after create; only
//!   measures are patched.
//! - Measures must be finite when present.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static RECORD_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*\S)_(-?\d+)$").expect("valid record id regex"));

/// Composite natural key of a record: `"{region_name}_{year}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Derives the key for a region/year pair.
    pub fn derive(region_name: &str, year: i32) -> Self {
        Self(format!("{region_name}_{year}"))
    }

    /// Parses an id received from outside the core (UI, console).
    ///
    /// # Errors
    /// - `MalformedId` when the value is not `<region>_<year>`.
    pub fn parse(value: &str) -> Result<Self, RecordValidationError> {
        let trimmed = value.trim();
        if RECORD_ID_RE.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(RecordValidationError::MalformedId(value.to_string()))
        }
    }

    /// Splits the key back into `(region_name, year)`.
    pub fn parts(&self) -> Option<(&str, i32)> {
        let caps = RECORD_ID_RE.captures(&self.0)?;
        let region = caps.get(1)?.as_str();
        let year = caps.get(2)?.as_str().parse().ok()?;
        Some((region, year))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the three numeric indicators carried by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    PovertySeverityIndex,
    PovertyPopulationPct,
    UnemploymentRate,
}

impl Measure {
    pub const ALL: [Measure; 3] = [
        Measure::PovertySeverityIndex,
        Measure::PovertyPopulationPct,
        Measure::UnemploymentRate,
    ];

    /// Operator-facing label used by chart titles.
    pub fn label(self) -> &'static str {
        match self {
            Self::PovertySeverityIndex => "Poverty severity index",
            Self::PovertyPopulationPct => "Population in poverty (%)",
            Self::UnemploymentRate => "Open unemployment rate",
        }
    }

    /// Storage column name.
    pub fn column(self) -> &'static str {
        match self {
            Self::PovertySeverityIndex => "poverty_severity_index",
            Self::PovertyPopulationPct => "poverty_population_pct",
            Self::UnemploymentRate => "unemployment_rate",
        }
    }
}

/// Stored measures; `None` means the value is missing in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Measures {
    pub poverty_severity_index: Option<f64>,
    pub poverty_population_pct: Option<f64>,
    pub unemployment_rate: Option<f64>,
}

impl Measures {
    /// Builds a measure set with every value present.
    pub fn complete(severity_index: f64, population_pct: f64, unemployment_rate: f64) -> Self {
        Self {
            poverty_severity_index: Some(severity_index),
            poverty_population_pct: Some(population_pct),
            unemployment_rate: Some(unemployment_rate),
        }
    }

    pub fn get(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::PovertySeverityIndex => self.poverty_severity_index,
            Measure::PovertyPopulationPct => self.poverty_population_pct,
            Measure::UnemploymentRate => self.unemployment_rate,
        }
    }

    /// Value with missing coalesced to zero. Render boundary only.
    pub fn value_or_zero(&self, measure: Measure) -> f64 {
        self.get(measure).unwrap_or(0.0)
    }

    fn validate(&self) -> Result<(), RecordValidationError> {
        for measure in Measure::ALL {
            if let Some(value) = self.get(measure) {
                if !value.is_finite() {
                    return Err(RecordValidationError::NonFiniteMeasure(measure));
                }
            }
        }
        Ok(())
    }
}

/// Canonical region/year indicator record as held in the collection cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub region_name: String,
    pub year: i32,
    #[serde(flatten)]
    pub measures: Measures,
}

impl Record {
    /// Checks identity consistency of a record read back from storage.
    pub fn validate_identity(&self) -> Result<(), RecordValidationError> {
        if self.region_name.trim().is_empty() {
            return Err(RecordValidationError::EmptyRegion);
        }
        let expected = RecordId::derive(&self.region_name, self.year);
        if self.id != expected {
            return Err(RecordValidationError::IdMismatch {
                id: self.id.clone(),
                expected,
            });
        }
        Ok(())
    }
}

/// Create request; the id is derived, never supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub region_name: String,
    pub year: i32,
    #[serde(flatten)]
    pub measures: Measures,
}

impl RecordDraft {
    pub fn new(region_name: impl Into<String>, year: i32, measures: Measures) -> Self {
        Self {
            region_name: region_name.into(),
            year,
            measures,
        }
    }

    pub fn id(&self) -> RecordId {
        RecordId::derive(self.region_name.trim(), self.year)
    }

    /// Validates the draft against the configured year bounds.
    ///
    /// # Errors
    /// - `EmptyRegion` when the region is blank (the unselected default).
    /// - `YearOutOfRange` when `year` is outside `[min_year, max_year]`.
    /// - `NonFiniteMeasure` when a present measure is NaN or infinite.
    pub fn validate(&self, min_year: i32, max_year: i32) -> Result<(), RecordValidationError> {
        if self.region_name.trim().is_empty() {
            return Err(RecordValidationError::EmptyRegion);
        }
        if self.year < min_year || self.year > max_year {
            return Err(RecordValidationError::YearOutOfRange {
                year: self.year,
                min: min_year,
                max: max_year,
            });
        }
        self.measures.validate()
    }

    /// Converts into the record that will be inserted.
    pub fn into_record(self) -> Record {
        let region_name = self.region_name.trim().to_string();
        Record {
            id: RecordId::derive(&region_name, self.year),
            region_name,
            year: self.year,
            measures: self.measures,
        }
    }
}

/// Partial measure update. `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurePatch {
    pub poverty_severity_index: Option<f64>,
    pub poverty_population_pct: Option<f64>,
    pub unemployment_rate: Option<f64>,
}

impl MeasurePatch {
    pub fn is_empty(&self) -> bool {
        self.poverty_severity_index.is_none()
            && self.poverty_population_pct.is_none()
            && self.unemployment_rate.is_none()
    }

    pub fn set(&mut self, measure: Measure, value: f64) {
        match measure {
            Measure::PovertySeverityIndex => self.poverty_severity_index = Some(value),
            Measure::PovertyPopulationPct => self.poverty_population_pct = Some(value),
            Measure::UnemploymentRate => self.unemployment_rate = Some(value),
        }
    }

    /// Present fields in storage column order.
    pub fn fields(&self) -> Vec<(Measure, f64)> {
        let as_measures = Measures {
            poverty_severity_index: self.poverty_severity_index,
            poverty_population_pct: self.poverty_population_pct,
            unemployment_rate: self.unemployment_rate,
        };
        Measure::ALL
            .into_iter()
            .filter_map(|measure| as_measures.get(measure).map(|value| (measure, value)))
            .collect()
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.is_empty() {
            return Err(RecordValidationError::EmptyPatch);
        }
        for (measure, value) in self.fields() {
            if !value.is_finite() {
                return Err(RecordValidationError::NonFiniteMeasure(measure));
            }
        }
        Ok(())
    }
}

/// Input rejected before reaching the snapshot store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    EmptyRegion,
    UnknownRegion(String),
    YearOutOfRange { year: i32, min: i32, max: i32 },
    InvertedYearRange { min: i32, max: i32 },
    NonFiniteMeasure(Measure),
    EmptyPatch,
    MalformedId(String),
    IdMismatch { id: RecordId, expected: RecordId },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRegion => write!(f, "region name is required"),
            Self::UnknownRegion(name) => write!(f, "unknown region `{name}`"),
            Self::YearOutOfRange { year, min, max } => {
                write!(f, "year {year} is outside [{min}, {max}]")
            }
            Self::InvertedYearRange { min, max } => {
                write!(f, "year range start {min} is after end {max}")
            }
            Self::NonFiniteMeasure(measure) => {
                write!(f, "{} must be a finite number", measure.column())
            }
            Self::EmptyPatch => write!(f, "update carries no measure values"),
            Self::MalformedId(value) => {
                write!(f, "malformed record id `{value}`; expected <region>_<year>")
            }
            Self::IdMismatch { id, expected } => {
                write!(f, "record id `{id}` does not match derived key `{expected}`")
            }
        }
    }
}

impl Error for RecordValidationError {}
