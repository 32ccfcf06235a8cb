//! Composite per-zone stress scoring.

use std::collections::BTreeMap;

use city_pulse_analytics_models::AnalyticsConfig;
use city_pulse_records::{DataSet, GrievanceStatus};

use crate::stats;

/// Computes the composite stress score for every zone.
///
/// The traffic stream's distinct zone set is authoritative: a zone with no
/// traffic records gets no entry, even when it has energy, waste, or
/// grievance records. Per zone:
///
/// ```text
/// stress = mean(congestion_index)
///        + power_cut_weight     * power cuts
///        + missed_pickup_weight * missed pickups
///        + open_grievance_weight * open grievances
/// ```
///
/// A domain with no rows for a zone contributes 0. The mapping is
/// unsorted; ordering for display is the caller's responsibility.
#[must_use]
pub fn zone_stress_scores(data: &DataSet, config: &AnalyticsConfig) -> BTreeMap<String, f64> {
    let mut scores = BTreeMap::new();

    for record in &data.traffic {
        if scores.contains_key(record.zone.as_str()) {
            continue;
        }
        scores.insert(record.zone.clone(), 0.0);
    }

    for (zone, score) in &mut scores {
        let congestion = stats::mean(
            data.traffic
                .iter()
                .filter(|r| &r.zone == zone)
                .map(|r| r.congestion_index),
        );
        let power_cuts = data
            .energy
            .iter()
            .filter(|r| &r.zone == zone && r.power_cut)
            .count();
        let missed_pickups: u64 = data
            .waste
            .iter()
            .filter(|r| &r.zone == zone)
            .map(|r| u64::from(r.missed_pickups))
            .sum();
        let open_grievances = data
            .grievances
            .iter()
            .filter(|r| &r.zone == zone && r.status == GrievanceStatus::Open)
            .count();

        #[allow(clippy::cast_precision_loss)]
        {
            *score = congestion
                + config.power_cut_weight * power_cuts as f64
                + config.missed_pickup_weight * missed_pickups as f64
                + config.open_grievance_weight * open_grievances as f64;
        }
    }

    scores
}
