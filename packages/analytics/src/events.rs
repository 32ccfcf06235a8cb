//! Rule-based event detection over the filtered streams.

use chrono::{DateTime, Duration, Utc};
use city_pulse_analytics_models::{AnalyticsConfig, Domain, Event, Severity};
use city_pulse_records::{DataSet, GrievanceStatus};

// Backdate offsets applied to event timestamps, per rule. Events are
// presented as having been detected shortly before the pass ran; each rule
// gets a fixed offset and consecutive matches of the same rule are
// staggered one minute apart, keeping the feed's recency order fully
// deterministic.
const TRAFFIC_BACKDATE_MINUTES: i64 = 30;
const ENERGY_BACKDATE_MINUTES: i64 = 45;
const WASTE_BACKDATE_MINUTES: i64 = 60;
const GRIEVANCE_BACKDATE_MINUTES: i64 = 20;

/// Evaluates the fixed rule set and returns the event feed, most recent
/// first.
///
/// Each rule is evaluated independently and capped at its configured
/// match count, taken in stream order — the cap bounds feed size and is
/// not a severity ranking, so a later, more severe match past the cap is
/// dropped. Re-running over the same input with the same `detection_time`
/// reproduces the identical feed.
#[must_use]
pub fn detect_events(
    data: &DataSet,
    detection_time: DateTime<Utc>,
    config: &AnalyticsConfig,
) -> Vec<Event> {
    let mut events = Vec::new();

    for (i, record) in data
        .traffic
        .iter()
        .filter(|r| r.congestion_index > config.congestion_event_threshold)
        .take(config.traffic_event_cap)
        .enumerate()
    {
        events.push(Event {
            severity: Severity::Critical,
            domain: Domain::Traffic,
            message: format!(
                "Severe congestion at {} - Index: {:.0}",
                record.zone, record.congestion_index
            ),
            recommended_action: "Deploy traffic management team".to_string(),
            timestamp: backdated(detection_time, TRAFFIC_BACKDATE_MINUTES, i),
        });
    }

    for (i, record) in data
        .energy
        .iter()
        .filter(|r| r.power_cut)
        .take(config.energy_event_cap)
        .enumerate()
    {
        events.push(Event {
            severity: Severity::Critical,
            domain: Domain::Energy,
            message: format!("Power outage in {} at {}:00", record.zone, record.hour),
            recommended_action: "Emergency restoration initiated".to_string(),
            timestamp: backdated(detection_time, ENERGY_BACKDATE_MINUTES, i),
        });
    }

    for (i, record) in data
        .waste
        .iter()
        .filter(|r| r.avg_bin_fill_percent > config.bin_fill_event_threshold)
        .take(config.waste_event_cap)
        .enumerate()
    {
        events.push(Event {
            severity: Severity::Warning,
            domain: Domain::Waste,
            message: format!(
                "Bins {:.0}% full in {}",
                record.avg_bin_fill_percent, record.zone
            ),
            recommended_action: "Scheduled priority pickup".to_string(),
            timestamp: backdated(detection_time, WASTE_BACKDATE_MINUTES, i),
        });
    }

    // Negative sla_days (overdue tickets) satisfy the breach condition;
    // the rule is total over the field's domain.
    for (i, record) in data
        .grievances
        .iter()
        .filter(|r| r.status == GrievanceStatus::Open && r.sla_days <= config.sla_critical_days)
        .take(config.grievance_event_cap)
        .enumerate()
    {
        events.push(Event {
            severity: Severity::Critical,
            domain: Domain::CitizenServices,
            message: format!("SLA breach: {} - {}", record.ticket_id, record.issue_type),
            recommended_action: "Escalated to supervisor".to_string(),
            timestamp: backdated(detection_time, GRIEVANCE_BACKDATE_MINUTES, i),
        });
    }

    log::debug!("Detected {} events", events.len());
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events
}

fn backdated(detection_time: DateTime<Utc>, base_minutes: i64, match_index: usize) -> DateTime<Utc> {
    let stagger = i64::try_from(match_index).unwrap_or(i64::MAX);
    detection_time - Duration::minutes(base_minutes.saturating_add(stagger))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};
    use city_pulse_records::{EnergyRecord, GrievanceRecord, TrafficRecord, WasteRecord};

    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 20, 12, 0, 0).unwrap()
    }

    fn traffic(congestion: f64) -> TrafficRecord {
        TrafficRecord {
            date: day(),
            hour: 18,
            zone: "Hinjewadi".to_string(),
            junction_id: "J-4".to_string(),
            vehicle_volume: 1200,
            avg_speed_kmph: 8.0,
            congestion_index: congestion,
        }
    }

    fn energy(zone: &str, power_cut: bool) -> EnergyRecord {
        EnergyRecord {
            date: day(),
            hour: 19,
            zone: zone.to_string(),
            feeder_id: "F-9".to_string(),
            energy_kwh: 4100.0,
            grid_voltage: 226.0,
            power_cut,
        }
    }

    fn waste(fill: f64) -> WasteRecord {
        WasteRecord {
            date: day(),
            zone: "Kothrud".to_string(),
            total_waste_kg: 1500.0,
            avg_bin_fill_percent: fill,
            segregation_efficiency_percent: 70.0,
            missed_pickups: 1,
        }
    }

    fn grievance(ticket_id: &str, status: GrievanceStatus, sla_days: i32) -> GrievanceRecord {
        GrievanceRecord {
            date: day(),
            zone: "Swargate".to_string(),
            ticket_id: ticket_id.to_string(),
            department: "Water".to_string(),
            issue_type: "No Water Supply".to_string(),
            status,
            sla_days,
        }
    }

    #[test]
    fn congestion_rule_matches_above_threshold_only() {
        let data = DataSet {
            traffic: [90.0, 95.0, 70.0, 60.0, 55.0].map(traffic).to_vec(),
            ..DataSet::default()
        };
        let events = detect_events(&data, now(), &AnalyticsConfig::default());
        assert_eq!(events.len(), 2);
        assert!(
            events
                .iter()
                .all(|e| e.severity == Severity::Critical && e.domain == Domain::Traffic)
        );
    }

    #[test]
    fn caps_apply_in_stream_order() {
        let data = DataSet {
            traffic: [86.0, 87.0, 88.0, 89.0, 90.0, 99.0, 98.0].map(traffic).to_vec(),
            ..DataSet::default()
        };
        let events = detect_events(&data, now(), &AnalyticsConfig::default());
        assert_eq!(events.len(), 5);
        // First five matches in stream order win, not the most severe.
        assert!(events.iter().any(|e| e.message.ends_with("Index: 86")));
        assert!(!events.iter().any(|e| e.message.ends_with("Index: 99")));
    }

    #[test]
    fn power_cut_events_capped_at_three() {
        let data = DataSet {
            energy: vec![
                energy("A", true),
                energy("B", true),
                energy("C", true),
                energy("D", true),
            ],
            ..DataSet::default()
        };
        let events = detect_events(&data, now(), &AnalyticsConfig::default());
        assert_eq!(events.len(), 3);
        assert!(events.iter().any(|e| e.message.contains("Power outage in A")));
        assert!(!events.iter().any(|e| e.message.contains("Power outage in D")));
    }

    #[test]
    fn bin_overflow_produces_warnings_in_stream_order() {
        let data = DataSet {
            waste: [90.0, 86.0, 80.0].map(waste).to_vec(),
            ..DataSet::default()
        };
        let events = detect_events(&data, now(), &AnalyticsConfig::default());
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.severity == Severity::Warning));
        assert!(events.iter().any(|e| e.message.starts_with("Bins 90%")));
        assert!(events.iter().any(|e| e.message.starts_with("Bins 86%")));
    }

    #[test]
    fn sla_rule_accepts_overdue_negative_days() {
        let data = DataSet {
            grievances: vec![
                grievance("PMC1", GrievanceStatus::Open, -3),
                grievance("PMC2", GrievanceStatus::Open, 1),
                grievance("PMC3", GrievanceStatus::Resolved, 0),
                grievance("PMC4", GrievanceStatus::Open, 2),
            ],
            ..DataSet::default()
        };
        let events = detect_events(&data, now(), &AnalyticsConfig::default());
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| e.message.contains("PMC1")));
        assert!(events.iter().any(|e| e.message.contains("PMC2")));
    }

    #[test]
    fn feed_is_sorted_descending_by_timestamp() {
        let data = DataSet {
            traffic: vec![traffic(90.0), traffic(92.0)],
            energy: vec![energy("A", true)],
            waste: vec![waste(91.0)],
            grievances: vec![grievance("PMC9", GrievanceStatus::Open, 0)],
        };
        let events = detect_events(&data, now(), &AnalyticsConfig::default());
        assert!(events.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn identical_input_reproduces_identical_feed() {
        let data = DataSet {
            traffic: vec![traffic(95.0)],
            energy: vec![energy("A", true)],
            ..DataSet::default()
        };
        let config = AnalyticsConfig::default();
        let first = detect_events(&data, now(), &config);
        let second = detect_events(&data, now(), &config);
        assert_eq!(first, second);
    }

    #[test]
    fn custom_caps_and_thresholds_are_honored() {
        let data = DataSet {
            traffic: [70.0, 75.0, 80.0].map(traffic).to_vec(),
            ..DataSet::default()
        };
        let config = AnalyticsConfig {
            congestion_event_threshold: 65.0,
            traffic_event_cap: 2,
            ..AnalyticsConfig::default()
        };
        let events = detect_events(&data, now(), &config);
        assert_eq!(events.len(), 2);
    }
}
