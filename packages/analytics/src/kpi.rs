//! City-wide KPI aggregation over a filtered record set.

use city_pulse_analytics_models::{AnalyticsConfig, KpiSnapshot};
use city_pulse_records::{DataSet, GrievanceStatus};

use crate::{stats, stress};

/// Builds a fresh [`KpiSnapshot`] from the filtered streams.
///
/// Every aggregate over an empty stream resolves to 0 — including
/// `resolution_rate`, which is defined as 0 when there are no grievance
/// tickets — so a snapshot exists for any filter selection without
/// special-casing by the caller.
#[must_use]
pub fn compute_kpis(data: &DataSet, config: &AnalyticsConfig) -> KpiSnapshot {
    let avg_energy = stats::mean(data.energy.iter().map(|r| r.energy_kwh));
    let power_cuts = data.energy.iter().filter(|r| r.power_cut).count() as u64;
    let voltage_issues = data
        .energy
        .iter()
        .filter(|r| r.grid_voltage < config.low_voltage_threshold)
        .count() as u64;

    let avg_congestion = stats::mean(data.traffic.iter().map(|r| r.congestion_index));
    let peak_congestion = data
        .traffic
        .iter()
        .map(|r| r.congestion_index)
        .fold(0.0, f64::max);
    let flow_efficiency = 1.0 - avg_congestion / 100.0;

    let avg_bin_fill = stats::mean(data.waste.iter().map(|r| r.avg_bin_fill_percent));
    let missed_pickups: u64 = data
        .waste
        .iter()
        .map(|r| u64::from(r.missed_pickups))
        .sum();
    let avg_segregation = stats::mean(
        data.waste
            .iter()
            .map(|r| r.segregation_efficiency_percent),
    );

    let total_grievances = data.grievances.len() as u64;
    let open_grievances = data
        .grievances
        .iter()
        .filter(|r| r.status == GrievanceStatus::Open)
        .count() as u64;
    let critical_issues = data
        .grievances
        .iter()
        .filter(|r| r.status == GrievanceStatus::Open && r.sla_days <= config.sla_critical_days)
        .count() as u64;
    let resolved = data
        .grievances
        .iter()
        .filter(|r| r.status == GrievanceStatus::Resolved)
        .count() as u64;
    let resolution_rate = if total_grievances == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        {
            resolved as f64 / total_grievances as f64
        }
    };

    let snapshot = KpiSnapshot {
        avg_energy,
        power_cuts,
        voltage_issues,
        avg_congestion,
        peak_congestion,
        flow_efficiency,
        avg_bin_fill,
        missed_pickups,
        avg_segregation,
        total_grievances,
        open_grievances,
        critical_issues,
        resolution_rate,
        zone_stress: stress::zone_stress_scores(data, config),
    };
    log::debug!(
        "KPI snapshot: {} grievances, {} power cuts, avg congestion {:.1}",
        snapshot.total_grievances,
        snapshot.power_cuts,
        snapshot.avg_congestion
    );
    snapshot
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use city_pulse_records::{EnergyRecord, GrievanceRecord, TrafficRecord, WasteRecord};

    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn energy(power_cut: bool, grid_voltage: f64, energy_kwh: f64) -> EnergyRecord {
        EnergyRecord {
            date: day(),
            hour: 12,
            zone: "A".to_string(),
            feeder_id: "F-1".to_string(),
            energy_kwh,
            grid_voltage,
            power_cut,
        }
    }

    fn traffic(congestion: f64) -> TrafficRecord {
        TrafficRecord {
            date: day(),
            hour: 12,
            zone: "A".to_string(),
            junction_id: "J-1".to_string(),
            vehicle_volume: 650,
            avg_speed_kmph: 20.0,
            congestion_index: congestion,
        }
    }

    fn grievance(status: GrievanceStatus, sla_days: i32) -> GrievanceRecord {
        GrievanceRecord {
            date: day(),
            zone: "A".to_string(),
            ticket_id: "PMC3000".to_string(),
            department: "Electricity".to_string(),
            issue_type: "Frequent Power Cut".to_string(),
            status,
            sla_days,
        }
    }

    #[test]
    fn power_cuts_count_only_flagged_rows() {
        let data = DataSet {
            energy: vec![energy(true, 228.0, 3000.0), energy(false, 228.0, 5000.0)],
            ..DataSet::default()
        };
        let kpis = compute_kpis(&data, &AnalyticsConfig::default());
        assert_eq!(kpis.power_cuts, 1);
        assert!((kpis.avg_energy - 4000.0).abs() < 1e-9);
    }

    #[test]
    fn voltage_issues_use_config_threshold() {
        let data = DataSet {
            energy: vec![energy(false, 210.0, 100.0), energy(false, 225.0, 100.0)],
            ..DataSet::default()
        };
        let default_kpis = compute_kpis(&data, &AnalyticsConfig::default());
        assert_eq!(default_kpis.voltage_issues, 1);

        let strict = AnalyticsConfig {
            low_voltage_threshold: 230.0,
            ..AnalyticsConfig::default()
        };
        assert_eq!(compute_kpis(&data, &strict).voltage_issues, 2);
    }

    #[test]
    fn flow_efficiency_derives_from_avg_congestion() {
        let data = DataSet {
            traffic: vec![traffic(40.0), traffic(60.0)],
            ..DataSet::default()
        };
        let kpis = compute_kpis(&data, &AnalyticsConfig::default());
        assert!((kpis.avg_congestion - 50.0).abs() < 1e-9);
        assert!((kpis.flow_efficiency - (1.0 - kpis.avg_congestion / 100.0)).abs() < 1e-12);
        assert!((kpis.peak_congestion - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn resolution_rate_stays_in_unit_interval() {
        let data = DataSet {
            grievances: vec![
                grievance(GrievanceStatus::Resolved, 5),
                grievance(GrievanceStatus::Open, 3),
                grievance(GrievanceStatus::InProgress, 2),
            ],
            ..DataSet::default()
        };
        let kpis = compute_kpis(&data, &AnalyticsConfig::default());
        assert!((0.0..=1.0).contains(&kpis.resolution_rate));
        assert!((kpis.resolution_rate - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(kpis.open_grievances, 1);
    }

    #[test]
    fn critical_issues_require_open_status_and_sla_breach() {
        let data = DataSet {
            grievances: vec![
                grievance(GrievanceStatus::Open, 1),
                grievance(GrievanceStatus::Open, -2),
                grievance(GrievanceStatus::Open, 4),
                grievance(GrievanceStatus::Resolved, 0),
            ],
            ..DataSet::default()
        };
        let kpis = compute_kpis(&data, &AnalyticsConfig::default());
        assert_eq!(kpis.critical_issues, 2);
    }

    #[test]
    fn empty_streams_degrade_to_zeros() {
        let kpis = compute_kpis(&DataSet::default(), &AnalyticsConfig::default());
        assert!((kpis.resolution_rate - 0.0).abs() < f64::EPSILON);
        assert_eq!(kpis.critical_issues, 0);
        assert!((kpis.avg_energy - 0.0).abs() < f64::EPSILON);
        assert!((kpis.avg_congestion - 0.0).abs() < f64::EPSILON);
        assert!((kpis.peak_congestion - 0.0).abs() < f64::EPSILON);
        assert!(kpis.zone_stress.is_empty());
    }
}
