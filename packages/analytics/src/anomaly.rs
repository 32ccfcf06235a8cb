//! Hourly traffic anomaly detection.

use std::collections::BTreeMap;

use city_pulse_analytics_models::{AnalyticsConfig, HourlyAnomaly};
use city_pulse_records::TrafficRecord;

use crate::stats;

/// Flags hour-of-day buckets whose mean congestion falls outside the
/// statistical band for that hour.
///
/// For each hour 0-23, the normal band is the bucket's mean congestion
/// index plus/minus `anomaly_sigma` sample standard deviations, computed
/// across all matching records. The hour's observed mean is flagged only
/// when strictly outside the band. Buckets with fewer than two records
/// have no defined deviation and are never flagged. The result is a
/// signal count for operators; no remediation is attached.
#[must_use]
pub fn traffic_anomalies(traffic: &[TrafficRecord], config: &AnalyticsConfig) -> Vec<HourlyAnomaly> {
    let mut by_hour: BTreeMap<u8, Vec<f64>> = BTreeMap::new();
    for record in traffic {
        by_hour
            .entry(record.hour)
            .or_default()
            .push(record.congestion_index);
    }

    let mut flagged = Vec::new();
    for (hour, values) in by_hour {
        let Some(std_dev) = stats::sample_std_dev(&values) else {
            continue;
        };
        let observed = stats::mean(values.iter().copied());
        let lower = observed - config.anomaly_sigma * std_dev;
        let upper = observed + config.anomaly_sigma * std_dev;
        if observed < lower || observed > upper {
            flagged.push(HourlyAnomaly {
                hour,
                observed,
                lower,
                upper,
            });
        }
    }
    flagged
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn traffic(hour: u8, congestion: f64) -> TrafficRecord {
        TrafficRecord {
            date: NaiveDate::from_ymd_opt(2025, 6, 25).unwrap(),
            hour,
            zone: "Koregaon Park".to_string(),
            junction_id: "J-11".to_string(),
            vehicle_volume: 400,
            avg_speed_kmph: 30.0,
            congestion_index: congestion,
        }
    }

    #[test]
    fn well_sampled_hours_stay_inside_their_own_band() {
        // The band is centered on the bucket mean, so a bucket evaluated
        // against itself is never flagged.
        let records: Vec<_> = (0..24)
            .flat_map(|h| [traffic(h, 30.0), traffic(h, 50.0), traffic(h, 70.0)])
            .collect();
        assert!(traffic_anomalies(&records, &AnalyticsConfig::default()).is_empty());
    }

    #[test]
    fn single_record_buckets_are_never_flagged() {
        let records = vec![traffic(3, 99.0)];
        assert!(traffic_anomalies(&records, &AnalyticsConfig::default()).is_empty());
    }

    #[test]
    fn empty_input_yields_no_flags() {
        assert!(traffic_anomalies(&[], &AnalyticsConfig::default()).is_empty());
    }
}
