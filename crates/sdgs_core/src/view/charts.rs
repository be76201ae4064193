//! Aggregate series for the dashboard view.
//!
//! Missing measures count as zero here, matching the table rendering.

use crate::model::record::{Measure, Record};
use crate::view::filter::RegionSelector;
use serde::Serialize;
use std::collections::BTreeMap;

/// Bar-chart point: mean of one measure for one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionMean {
    pub region_name: String,
    pub mean: f64,
    pub highlighted: bool,
}

/// Trend-line point: mean of one measure for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearMean {
    pub year: i32,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureCharts {
    pub measure: Measure,
    pub title: &'static str,
    /// Sorted by mean descending, then region name.
    pub by_region: Vec<RegionMean>,
    /// Sorted by year ascending.
    pub by_year: Vec<YearMean>,
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: u32,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / f64::from(self.count)
        }
    }
}

/// Per-region mean over the year-filtered set; every region is kept and the
/// selected one is flagged.
pub fn mean_by_region(
    records: &[&Record],
    measure: Measure,
    selector: &RegionSelector,
) -> Vec<RegionMean> {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.region_name.as_str())
            .or_default()
            .push(record.measures.value_or_zero(measure));
    }

    let mut series: Vec<RegionMean> = groups
        .into_iter()
        .map(|(region_name, acc)| RegionMean {
            region_name: region_name.to_string(),
            mean: acc.mean(),
            highlighted: selector.matches(region_name),
        })
        .collect();
    series.sort_by(|left, right| {
        right
            .mean
            .total_cmp(&left.mean)
            .then_with(|| left.region_name.cmp(&right.region_name))
    });
    series
}

/// Per-year mean over the year-filtered set, restricted to the selected
/// region when one is set.
pub fn mean_by_year(records: &[&Record], measure: Measure, selector: &RegionSelector) -> Vec<YearMean> {
    let mut groups: BTreeMap<i32, Accumulator> = BTreeMap::new();
    for record in records {
        if let Some(region) = selector.region() {
            if record.region_name != region {
                continue;
            }
        }
        groups
            .entry(record.year)
            .or_default()
            .push(record.measures.value_or_zero(measure));
    }

    groups
        .into_iter()
        .map(|(year, acc)| YearMean {
            year,
            mean: acc.mean(),
        })
        .collect()
}

/// One bar series and one trend series per measure.
pub fn build_charts(records: &[&Record], selector: &RegionSelector) -> Vec<MeasureCharts> {
    Measure::ALL
        .into_iter()
        .map(|measure| MeasureCharts {
            measure,
            title: measure.label(),
            by_region: mean_by_region(records, measure, selector),
            by_year: mean_by_year(records, measure, selector),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{mean_by_region, mean_by_year};
    use crate::model::record::{Measure, Measures, Record, RecordId};
    use crate::view::filter::RegionSelector;

    fn record(region: &str, year: i32, severity: Option<f64>) -> Record {
        Record {
            id: RecordId::derive(region, year),
            region_name: region.to_string(),
            year,
            measures: Measures {
                poverty_severity_index: severity,
                ..Measures::default()
            },
        }
    }

    #[test]
    fn region_means_flag_highlight_and_count_missing_as_zero() {
        let records = [
            record("A", 2020, Some(2.0)),
            record("A", 2021, None),
            record("B", 2020, Some(4.0)),
        ];
        let refs: Vec<&Record> = records.iter().collect();
        let selector = RegionSelector::Region("A".to_string());

        let series = mean_by_region(&refs, Measure::PovertySeverityIndex, &selector);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].region_name, "B");
        assert_eq!(series[0].mean, 4.0);
        assert!(!series[0].highlighted);
        assert_eq!(series[1].region_name, "A");
        assert_eq!(series[1].mean, 1.0);
        assert!(series[1].highlighted);
    }

    #[test]
    fn year_means_follow_region_selection() {
        let records = [
            record("A", 2020, Some(2.0)),
            record("B", 2020, Some(4.0)),
            record("B", 2021, Some(6.0)),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        let all = mean_by_year(&refs, Measure::PovertySeverityIndex, &RegionSelector::All);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].year, 2020);
        assert_eq!(all[0].mean, 3.0);

        let only_a = mean_by_year(
            &refs,
            Measure::PovertySeverityIndex,
            &RegionSelector::Region("A".to_string()),
        );
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].mean, 2.0);
    }
}
