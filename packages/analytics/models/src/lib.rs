#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analytics result types and policy configuration.
//!
//! Defines the output contract consumed by the presentation layer (KPI
//! snapshot, event feed, correlation matrix, anomaly flags, insights) and
//! the [`AnalyticsConfig`] value that carries every threshold, weight, and
//! cap the analytics components apply. Presentation code only ever sees
//! these types, never raw records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Severity of an operational event.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Requires immediate operational response.
    Critical,
    /// Needs attention but is not service-threatening.
    Warning,
}

/// The civic domain an event or recommendation belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Domain {
    /// Road traffic and congestion.
    Traffic,
    /// Power grid supply and quality.
    Energy,
    /// Waste collection and segregation.
    Waste,
    /// Citizen grievance handling.
    #[serde(rename = "Citizen Services")]
    #[strum(serialize = "Citizen Services")]
    CitizenServices,
}

/// Priority band for rules and recommendations.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Priority {
    /// Drop everything.
    Critical,
    /// Schedule ahead of routine work.
    High,
    /// Routine follow-up.
    Medium,
}

/// Relative implementation cost of a recommendation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum CostBand {
    /// Low implementation cost.
    Low,
    /// Medium implementation cost.
    Medium,
    /// High implementation cost.
    High,
}

/// A discrete operational event produced when a rule condition matches a
/// record.
///
/// Events carry no persistent identity; each detection pass builds a fresh
/// feed that the presentation layer consumes immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event severity.
    pub severity: Severity,
    /// Domain the triggering record came from.
    pub domain: Domain,
    /// Human-readable description interpolating the matched record.
    pub message: String,
    /// Fixed response action for the triggering rule.
    pub recommended_action: String,
    /// Backdated detection timestamp; the feed is sorted descending on it.
    pub timestamp: DateTime<Utc>,
}

/// A static processing rule as shown to operators.
///
/// The catalog is fixed configuration, not derived from data; the event
/// detector's thresholds and caps live in [`AnalyticsConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Stable rule identifier (e.g. "R001").
    pub id: &'static str,
    /// Operator-facing rule name.
    pub name: &'static str,
    /// Human-readable trigger condition.
    pub condition: &'static str,
    /// Human-readable response action.
    pub action: &'static str,
    /// Priority band.
    pub priority: Priority,
}

/// Returns the static processing rule catalog.
///
/// R005 surfaces through `voltage_issues` in the KPI snapshot rather than
/// the event feed; the other four each back one event-detector rule.
#[must_use]
pub const fn rule_catalog() -> &'static [Rule] {
    &[
        Rule {
            id: "R001",
            name: "Critical Traffic Congestion",
            condition: "Congestion Index > 85",
            action: "Deploy traffic management + Notify authorities",
            priority: Priority::High,
        },
        Rule {
            id: "R002",
            name: "Power Outage Detection",
            condition: "Power_Cut_Flag = 1",
            action: "Emergency restoration + Citizen notification",
            priority: Priority::Critical,
        },
        Rule {
            id: "R003",
            name: "Waste Overflow Warning",
            condition: "Bin Fill Level > 85%",
            action: "Schedule priority pickup",
            priority: Priority::Medium,
        },
        Rule {
            id: "R004",
            name: "SLA Breach Alert",
            condition: "SLA Days <= 1 AND Status = Open",
            action: "Escalate to supervisor",
            priority: Priority::High,
        },
        Rule {
            id: "R005",
            name: "Voltage Fluctuation",
            condition: "Grid Voltage < 220V",
            action: "Log incident + Maintenance alert",
            priority: Priority::Medium,
        },
    ]
}

/// Point-in-time aggregated summary of all domain metrics for the current
/// filter selection.
///
/// Created fresh on every filter change and never mutated. Every aggregate
/// over an empty input is a defined zero, so a snapshot always exists even
/// when a stream filtered down to nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSnapshot {
    /// Mean energy consumption across filtered observations, in kWh.
    pub avg_energy: f64,
    /// Observations with a power cut.
    pub power_cuts: u64,
    /// Observations below the low-voltage threshold.
    pub voltage_issues: u64,
    /// Mean congestion index across filtered observations.
    pub avg_congestion: f64,
    /// Highest congestion index observed.
    pub peak_congestion: f64,
    /// `1 - avg_congestion / 100`.
    pub flow_efficiency: f64,
    /// Mean bin fill level, percent.
    pub avg_bin_fill: f64,
    /// Total missed pickups.
    pub missed_pickups: u64,
    /// Mean segregation efficiency, percent.
    pub avg_segregation: f64,
    /// Total grievance tickets.
    pub total_grievances: u64,
    /// Tickets currently open.
    pub open_grievances: u64,
    /// Open tickets at or past the critical SLA threshold.
    pub critical_issues: u64,
    /// Resolved tickets over total, in [0, 1]; 0 when no tickets.
    pub resolution_rate: f64,
    /// Composite stress score per zone, keyed by zone name.
    ///
    /// Zones are drawn from the traffic stream's distinct zone set; the
    /// mapping is unsorted and display ordering is the caller's concern.
    pub zone_stress: BTreeMap<String, f64>,
}

/// One column of the cross-domain correlation table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum CorrelationColumn {
    /// Daily per-zone mean congestion index.
    #[serde(rename = "Traffic Congestion")]
    #[strum(serialize = "Traffic Congestion")]
    TrafficCongestion,
    /// Daily per-zone mean energy consumption.
    #[serde(rename = "Energy Consumption")]
    #[strum(serialize = "Energy Consumption")]
    EnergyConsumption,
    /// Daily per-zone mean bin fill level.
    #[serde(rename = "Bin Fill Level")]
    #[strum(serialize = "Bin Fill Level")]
    BinFillLevel,
    /// Daily per-zone open grievance count.
    #[serde(rename = "Open Grievances")]
    #[strum(serialize = "Open Grievances")]
    OpenGrievances,
}

impl CorrelationColumn {
    /// All columns in matrix order.
    pub const ALL: [Self; 4] = [
        Self::TrafficCongestion,
        Self::EnergyConsumption,
        Self::BinFillLevel,
        Self::OpenGrievances,
    ];

    /// Row/column index of this column in the matrix.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Symmetric 4x4 Pearson correlation matrix over the cross-domain daily
/// table.
///
/// Diagonal entries are exactly 1.0 (including for zero-variance columns,
/// where the value is pinned rather than left undefined); all entries lie
/// in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationMatrix {
    /// Matrix values indexed by [`CorrelationColumn::index`].
    pub values: [[f64; 4]; 4],
}

impl CorrelationMatrix {
    /// Correlation between two columns.
    #[must_use]
    pub const fn get(&self, a: CorrelationColumn, b: CorrelationColumn) -> f64 {
        self.values[a.index()][b.index()]
    }
}

/// A per-hour traffic observation flagged as outside its statistical band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyAnomaly {
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Observed mean congestion index for the hour.
    pub observed: f64,
    /// Lower edge of the normal band.
    pub lower: f64,
    /// Upper edge of the normal band.
    pub upper: f64,
}

/// Grievance-handling metrics for one municipal department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStats {
    /// Department name.
    pub department: String,
    /// Tickets assigned to the department.
    pub total_tickets: u64,
    /// Mean SLA days remaining across the department's tickets.
    pub avg_sla_days: f64,
    /// Resolved tickets over total, in [0, 1].
    pub resolution_rate: f64,
}

/// A threshold-gated action item for city administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Priority band.
    pub priority: Priority,
    /// Domain the recommendation targets.
    pub category: Domain,
    /// Short title.
    pub title: String,
    /// Description interpolating the metric that tripped the gate.
    pub description: String,
    /// Expected impact statement.
    pub impact: String,
    /// Relative implementation cost.
    pub cost: CostBand,
    /// Suggested implementation timeline.
    pub timeline: String,
}

/// Policy constants applied by the analytics components.
///
/// Passed explicitly into each component instead of living as ambient
/// state, so tests can run with alternate thresholds. Missing keys in a
/// TOML override fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    // ── Event detection ─────────────────────────────────
    /// Congestion index above which a traffic event fires.
    pub congestion_event_threshold: f64,
    /// Bin fill percentage above which a waste event fires.
    pub bin_fill_event_threshold: f64,
    /// Grid voltage below which an observation counts as a voltage issue.
    pub low_voltage_threshold: f64,
    /// SLA days at or below which an open ticket is critical.
    pub sla_critical_days: i32,
    /// Most traffic events kept per detection pass, in stream order.
    pub traffic_event_cap: usize,
    /// Most energy events kept per detection pass, in stream order.
    pub energy_event_cap: usize,
    /// Most waste events kept per detection pass, in stream order.
    pub waste_event_cap: usize,
    /// Most grievance events kept per detection pass, in stream order.
    pub grievance_event_cap: usize,

    // ── Zone stress weights ─────────────────────────────
    /// Stress contribution per power cut in a zone.
    pub power_cut_weight: f64,
    /// Stress contribution per missed pickup in a zone.
    pub missed_pickup_weight: f64,
    /// Stress contribution per open grievance in a zone.
    pub open_grievance_weight: f64,

    // ── Correlation insights ────────────────────────────
    /// Congestion/energy correlation above which the strong-correlation
    /// finding is emitted.
    pub congestion_energy_corr_threshold: f64,
    /// Grievance/bin-fill correlation above which the waste-grievance
    /// finding is emitted.
    pub grievance_bin_fill_corr_threshold: f64,

    // ── Anomaly detection ───────────────────────────────
    /// Width of the hourly normal band, in standard deviations.
    pub anomaly_sigma: f64,

    // ── Recommendation gates ────────────────────────────
    /// Mean congestion above which signal management is recommended.
    pub high_congestion_threshold: f64,
    /// Power cut count above which grid work is recommended.
    pub power_cut_alert_count: u64,
    /// Mean bin fill above which route optimization is recommended.
    pub bin_fill_warning_threshold: f64,
    /// Resolution rate below which process improvement is recommended.
    pub target_resolution_rate: f64,
    /// Segregation percentage below which a campaign is recommended.
    pub min_segregation_percent: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            congestion_event_threshold: 85.0,
            bin_fill_event_threshold: 85.0,
            low_voltage_threshold: 220.0,
            sla_critical_days: 1,
            traffic_event_cap: 5,
            energy_event_cap: 3,
            waste_event_cap: 3,
            grievance_event_cap: 5,
            power_cut_weight: 20.0,
            missed_pickup_weight: 10.0,
            open_grievance_weight: 5.0,
            congestion_energy_corr_threshold: 0.5,
            grievance_bin_fill_corr_threshold: 0.4,
            anomaly_sigma: 2.0,
            high_congestion_threshold: 60.0,
            power_cut_alert_count: 10,
            bin_fill_warning_threshold: 70.0,
            target_resolution_rate: 0.70,
            min_segregation_percent: 75.0,
        }
    }
}
