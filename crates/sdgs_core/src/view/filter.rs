//! Filter engine over the collection cache.
//!
//! # Invariants
//! - Output is a subset of the input in the same relative order.
//! - Every returned record satisfies `range.min <= year <= range.max`.
//! - The region selector never removes rows from chart input; it only
//!   narrows list views.

use crate::model::record::{Record, RecordValidationError};
use serde::{Deserialize, Serialize};

/// Inclusive year interval. `min == max` selects a single year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Result<Self, RecordValidationError> {
        if min > max {
            return Err(RecordValidationError::InvertedYearRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }
}

/// Highlighted-region selector; `All` is the "all regions" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum RegionSelector {
    #[default]
    All,
    Region(String),
}

impl RegionSelector {
    pub fn matches(&self, region_name: &str) -> bool {
        match self {
            Self::All => false,
            Self::Region(name) => name == region_name,
        }
    }

    pub fn region(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Region(name) => Some(name.as_str()),
        }
    }
}

/// Returns every record whose year lies in `range`, preserving order.
pub fn filter_by_years(records: &[Record], range: YearRange) -> Vec<&Record> {
    records
        .iter()
        .filter(|record| range.contains(record.year))
        .collect()
}

/// Narrows a year-filtered set to the selected region for list views.
pub fn narrow_to_region<'a>(records: &[&'a Record], selector: &RegionSelector) -> Vec<&'a Record> {
    match selector.region() {
        None => records.to_vec(),
        Some(name) => records
            .iter()
            .copied()
            .filter(|record| record.region_name == name)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{filter_by_years, narrow_to_region, RegionSelector, YearRange};
    use crate::model::record::{Measures, Record, RecordId};

    fn record(region: &str, year: i32) -> Record {
        Record {
            id: RecordId::derive(region, year),
            region_name: region.to_string(),
            year,
            measures: Measures::default(),
        }
    }

    #[test]
    fn single_year_range_is_valid() {
        let records = vec![record("A", 2019), record("A", 2020), record("B", 2020)];
        let range = YearRange::new(2020, 2020).unwrap();
        let years: Vec<_> = filter_by_years(&records, range)
            .iter()
            .map(|record| record.id.as_str())
            .collect();
        assert_eq!(years, vec!["A_2020", "B_2020"]);
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(YearRange::new(2021, 2019).is_err());
    }

    #[test]
    fn all_regions_sentinel_keeps_every_row() {
        let records = vec![record("A", 2020), record("B", 2020)];
        let scoped = filter_by_years(&records, YearRange::new(2000, 2100).unwrap());

        assert_eq!(narrow_to_region(&scoped, &RegionSelector::All).len(), 2);
        let only_b = narrow_to_region(&scoped, &RegionSelector::Region("B".to_string()));
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b[0].region_name, "B");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let range = YearRange::new(2000, 2001).unwrap();
        assert!(filter_by_years(&[], range).is_empty());
    }
}
