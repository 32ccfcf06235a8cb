//! Record filtering by date range and zone selection.
//!
//! Filtering is the single upstream step every other component consumes:
//! apply it once per filter change, then hand the result to the KPI
//! aggregator, event detector, correlation analyzer, and anomaly detector
//! independently.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use city_pulse_records::DataSet;

/// Filter window applied uniformly to all four streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParams {
    /// First day of the window, inclusive.
    pub start: NaiveDate,
    /// Last day of the window, inclusive.
    pub end: NaiveDate,
    /// Zones to keep. Callers supply a non-empty set; an empty set
    /// filters every stream down to nothing.
    pub zones: BTreeSet<String>,
}

impl FilterParams {
    /// Whether a record with this date and zone passes the filter.
    #[must_use]
    pub fn matches(&self, date: NaiveDate, zone: &str) -> bool {
        date >= self.start && date <= self.end && self.zones.contains(zone)
    }
}

/// Restricts each stream to the filter window.
///
/// Streams are filtered independently: a zone present in one stream but
/// absent from another simply yields an empty sub-collection for the
/// stream that lacks it. An empty grievance result is logged as the
/// explicit no-data signal; downstream aggregates additionally degrade to
/// defined zeros, so nothing divides by an empty count.
#[must_use]
pub fn filter_records(data: &DataSet, params: &FilterParams) -> DataSet {
    let filtered = DataSet {
        grievances: data
            .grievances
            .iter()
            .filter(|r| params.matches(r.date, &r.zone))
            .cloned()
            .collect(),
        energy: data
            .energy
            .iter()
            .filter(|r| params.matches(r.date, &r.zone))
            .cloned()
            .collect(),
        traffic: data
            .traffic
            .iter()
            .filter(|r| params.matches(r.date, &r.zone))
            .cloned()
            .collect(),
        waste: data
            .waste
            .iter()
            .filter(|r| params.matches(r.date, &r.zone))
            .cloned()
            .collect(),
    };

    if filtered.grievances.is_empty() && !data.grievances.is_empty() {
        log::warn!(
            "Filter {} to {} matched no grievance records; grievance KPIs will report zeros",
            params.start,
            params.end
        );
    }
    log::debug!(
        "Filtered {} of {} records across {} zones",
        filtered.total_records(),
        data.total_records(),
        params.zones.len()
    );

    filtered
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use city_pulse_records::{GrievanceRecord, GrievanceStatus, TrafficRecord, WasteRecord};

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn traffic(date: NaiveDate, zone: &str) -> TrafficRecord {
        TrafficRecord {
            date,
            hour: 9,
            zone: zone.to_string(),
            junction_id: "J-1".to_string(),
            vehicle_volume: 500,
            avg_speed_kmph: 24.0,
            congestion_index: 55.0,
        }
    }

    fn grievance(date: NaiveDate, zone: &str) -> GrievanceRecord {
        GrievanceRecord {
            date,
            zone: zone.to_string(),
            ticket_id: "PMC1001".to_string(),
            department: "Roads".to_string(),
            issue_type: "Potholes".to_string(),
            status: GrievanceStatus::Open,
            sla_days: 3,
        }
    }

    fn params(start: u32, end: u32, zones: &[&str]) -> FilterParams {
        FilterParams {
            start: day(start),
            end: day(end),
            zones: zones.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn keeps_records_inside_inclusive_window() {
        let data = DataSet {
            traffic: vec![
                traffic(day(1), "Kothrud"),
                traffic(day(5), "Kothrud"),
                traffic(day(10), "Kothrud"),
            ],
            ..DataSet::default()
        };
        let filtered = filter_records(&data, &params(1, 5, &["Kothrud"]));
        assert_eq!(filtered.traffic.len(), 2);
        assert_eq!(filtered.traffic[0].date, day(1));
        assert_eq!(filtered.traffic[1].date, day(5));
    }

    #[test]
    fn drops_unselected_zones() {
        let data = DataSet {
            traffic: vec![traffic(day(2), "Kothrud"), traffic(day(2), "Hadapsar")],
            ..DataSet::default()
        };
        let filtered = filter_records(&data, &params(1, 5, &["Hadapsar"]));
        assert_eq!(filtered.traffic.len(), 1);
        assert_eq!(filtered.traffic[0].zone, "Hadapsar");
    }

    #[test]
    fn zone_missing_from_one_stream_is_not_an_error() {
        let data = DataSet {
            traffic: vec![traffic(day(2), "Hinjewadi")],
            grievances: vec![grievance(day(2), "Kothrud")],
            ..DataSet::default()
        };
        let filtered = filter_records(&data, &params(1, 5, &["Hinjewadi"]));
        assert_eq!(filtered.traffic.len(), 1);
        assert!(filtered.grievances.is_empty());
    }

    #[test]
    fn empty_zone_set_yields_empty_streams() {
        let data = DataSet {
            waste: vec![WasteRecord {
                date: day(3),
                zone: "Swargate".to_string(),
                total_waste_kg: 1200.0,
                avg_bin_fill_percent: 64.0,
                segregation_efficiency_percent: 71.0,
                missed_pickups: 0,
            }],
            ..DataSet::default()
        };
        let filtered = filter_records(&data, &params(1, 5, &[]));
        assert!(filtered.is_empty());
    }
}
