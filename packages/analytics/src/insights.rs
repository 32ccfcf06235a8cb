//! Derived insights: correlation findings, department performance, and
//! threshold-gated recommendations.

use std::collections::BTreeMap;

use city_pulse_analytics_models::{
    AnalyticsConfig, CorrelationColumn, CorrelationMatrix, CostBand, DepartmentStats, Domain,
    KpiSnapshot, Priority, Recommendation,
};
use city_pulse_records::{GrievanceRecord, GrievanceStatus};

use crate::stats;

/// Produces the two fixed textual findings derived from the correlation
/// matrix.
///
/// Each finding is threshold-gated: the strong-correlation text is emitted
/// only when the relevant coefficient clears its configured threshold,
/// otherwise a neutral fallback message is used.
#[must_use]
pub fn key_findings(matrix: &CorrelationMatrix, config: &AnalyticsConfig) -> Vec<String> {
    let congestion_energy = matrix.get(
        CorrelationColumn::TrafficCongestion,
        CorrelationColumn::EnergyConsumption,
    );
    let grievance_bin_fill = matrix.get(
        CorrelationColumn::OpenGrievances,
        CorrelationColumn::BinFillLevel,
    );

    let first = if congestion_energy > config.congestion_energy_corr_threshold {
        "Strong positive correlation between traffic congestion and energy consumption \
         suggests that traffic management improvements could lead to energy savings."
    } else {
        "Traffic and energy patterns show moderate correlation. Zone-specific analysis \
         recommended."
    };
    let second = if grievance_bin_fill > config.grievance_bin_fill_corr_threshold {
        "High bin fill levels correlate with increased grievances. Proactive waste \
         collection scheduling can reduce citizen complaints."
    } else {
        "Waste management and grievances show independent patterns. Multi-factor \
         analysis needed."
    };

    vec![first.to_string(), second.to_string()]
}

/// Aggregates grievance-handling metrics per municipal department.
///
/// Returns one entry per department seen in the input, sorted by
/// department name. Empty input yields an empty vec.
#[must_use]
pub fn department_performance(grievances: &[GrievanceRecord]) -> Vec<DepartmentStats> {
    let mut by_department: BTreeMap<&str, Vec<&GrievanceRecord>> = BTreeMap::new();
    for record in grievances {
        by_department
            .entry(record.department.as_str())
            .or_default()
            .push(record);
    }

    by_department
        .into_iter()
        .map(|(department, tickets)| {
            let resolved = tickets
                .iter()
                .filter(|r| r.status == GrievanceStatus::Resolved)
                .count();
            #[allow(clippy::cast_precision_loss)]
            let resolution_rate = resolved as f64 / tickets.len() as f64;
            DepartmentStats {
                department: department.to_string(),
                total_tickets: tickets.len() as u64,
                avg_sla_days: stats::mean(tickets.iter().map(|r| f64::from(r.sla_days))),
                resolution_rate,
            }
        })
        .collect()
}

/// Builds the threshold-gated action items for city administrators.
///
/// Gates are checked in a fixed order against the KPI snapshot; each one
/// that trips contributes one recommendation with the metric interpolated
/// into its description.
#[must_use]
pub fn recommendations(kpis: &KpiSnapshot, config: &AnalyticsConfig) -> Vec<Recommendation> {
    let mut items = Vec::new();

    if kpis.avg_congestion > config.high_congestion_threshold {
        items.push(Recommendation {
            priority: Priority::High,
            category: Domain::Traffic,
            title: "Implement Dynamic Traffic Signal Management".to_string(),
            description: format!(
                "Current avg congestion: {:.1}/100. Deploy AI-based adaptive traffic \
                 signals in high-congestion zones.",
                kpis.avg_congestion
            ),
            impact: "Potential 15-20% reduction in congestion".to_string(),
            cost: CostBand::Medium,
            timeline: "3-6 months".to_string(),
        });
    }

    if kpis.power_cuts > config.power_cut_alert_count {
        items.push(Recommendation {
            priority: Priority::High,
            category: Domain::Energy,
            title: "Strengthen Grid Infrastructure in Vulnerable Zones".to_string(),
            description: format!(
                "{} power cuts detected. Focus on zones with frequent outages.",
                kpis.power_cuts
            ),
            impact: "Improve service reliability by 30%".to_string(),
            cost: CostBand::High,
            timeline: "6-12 months".to_string(),
        });
    }

    if kpis.avg_bin_fill > config.bin_fill_warning_threshold {
        items.push(Recommendation {
            priority: Priority::Medium,
            category: Domain::Waste,
            title: "Optimize Waste Collection Routes".to_string(),
            description: format!(
                "Avg bin fill at {:.1}%. Implement IoT-based smart bin monitoring for \
                 dynamic scheduling.",
                kpis.avg_bin_fill
            ),
            impact: "25% reduction in operational costs".to_string(),
            cost: CostBand::Low,
            timeline: "1-3 months".to_string(),
        });
    }

    if kpis.resolution_rate < config.target_resolution_rate {
        items.push(Recommendation {
            priority: Priority::High,
            category: Domain::CitizenServices,
            title: "Enhance Grievance Resolution Process".to_string(),
            description: format!(
                "Resolution rate at {:.1}%. Deploy dedicated teams for critical \
                 departments.",
                kpis.resolution_rate * 100.0
            ),
            impact: "Improve citizen satisfaction by 40%".to_string(),
            cost: CostBand::Low,
            timeline: "Immediate".to_string(),
        });
    }

    if kpis.avg_segregation < config.min_segregation_percent {
        items.push(Recommendation {
            priority: Priority::Medium,
            category: Domain::Waste,
            title: "Launch Waste Segregation Awareness Campaign".to_string(),
            description: format!(
                "Segregation efficiency at {:.1}%. Conduct citizen education programs.",
                kpis.avg_segregation
            ),
            impact: "Increase recycling rate by 20%".to_string(),
            cost: CostBand::Low,
            timeline: "1-2 months".to_string(),
        });
    }

    log::debug!("{} recommendations triggered", items.len());
    items
}
