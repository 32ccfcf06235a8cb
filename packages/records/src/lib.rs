#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Civic domain record types shared across all four data streams.
//!
//! Each struct mirrors one row of the corresponding tabular source. The
//! serde renames match the source column headers exactly, so a stream
//! missing a required column fails typed deserialization at the ingestion
//! boundary instead of producing partial records. Zone names are plain
//! strings and are the common join key across every stream.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Lifecycle status of a citizen grievance ticket.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum GrievanceStatus {
    /// Ticket is unresolved and awaiting action.
    Open,
    /// Ticket has been resolved and closed.
    Resolved,
    /// Ticket is being worked on.
    #[serde(rename = "In Progress", alias = "InProgress")]
    #[strum(serialize = "In Progress")]
    InProgress,
}

/// A citizen grievance ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrievanceRecord {
    /// Day the ticket was raised.
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    /// Zone the grievance was reported from.
    #[serde(rename = "Zone_Name")]
    pub zone: String,
    /// Unique ticket identifier.
    #[serde(rename = "Ticket_ID")]
    pub ticket_id: String,
    /// Municipal department responsible for the ticket.
    #[serde(rename = "Department")]
    pub department: String,
    /// Reported issue type (e.g. "Potholes", "Bin Overflowing").
    #[serde(rename = "Issue_Type")]
    pub issue_type: String,
    /// Current ticket status.
    #[serde(rename = "Status")]
    pub status: GrievanceStatus,
    /// Days remaining (positive) or overdue (non-positive) against the
    /// service-level target.
    #[serde(rename = "SLA_Days")]
    pub sla_days: i32,
}

/// One hourly energy observation from a grid feeder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyRecord {
    /// Observation day.
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    /// Hour of day, 0-23.
    #[serde(rename = "Hour", deserialize_with = "hour_of_day")]
    pub hour: u8,
    /// Zone served by the feeder.
    #[serde(rename = "Zone_Name")]
    pub zone: String,
    /// Grid feeder identifier.
    #[serde(rename = "Feeder_ID")]
    pub feeder_id: String,
    /// Energy consumed during the hour, in kWh.
    #[serde(rename = "Energy_Consumption_kWh")]
    pub energy_kwh: f64,
    /// Measured grid voltage, in volts.
    #[serde(rename = "Grid_Voltage")]
    pub grid_voltage: f64,
    /// Whether a power cut occurred during the hour (source encodes 0/1).
    #[serde(rename = "Power_Cut_Flag", with = "power_cut_flag")]
    pub power_cut: bool,
}

/// One hourly traffic observation from a junction sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficRecord {
    /// Observation day.
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    /// Hour of day, 0-23.
    #[serde(rename = "Hour", deserialize_with = "hour_of_day")]
    pub hour: u8,
    /// Zone containing the junction.
    #[serde(rename = "Zone_Name")]
    pub zone: String,
    /// Junction sensor identifier.
    #[serde(rename = "Junction_ID")]
    pub junction_id: String,
    /// Vehicles observed during the hour.
    #[serde(rename = "Vehicle_Volume")]
    pub vehicle_volume: u32,
    /// Average vehicle speed, in km/h.
    #[serde(rename = "Avg_Speed_Kmph")]
    pub avg_speed_kmph: f64,
    /// Composite traffic-density score, 0-100; higher is more congested.
    #[serde(rename = "Congestion_Index")]
    pub congestion_index: f64,
}

/// One daily waste-collection observation for a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteRecord {
    /// Observation day.
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    /// Zone the collection round covered.
    #[serde(rename = "Zone_Name")]
    pub zone: String,
    /// Total waste collected, in kilograms.
    #[serde(rename = "Total_Waste_Collected_Kg")]
    pub total_waste_kg: f64,
    /// Average bin fill level across the zone, 0-100 percent.
    #[serde(rename = "Avg_Bin_Fill_Level_Percent")]
    pub avg_bin_fill_percent: f64,
    /// Share of waste correctly segregated, 0-100 percent.
    #[serde(rename = "Segregation_Efficiency_Percent")]
    pub segregation_efficiency_percent: f64,
    /// Scheduled pickups that were missed.
    #[serde(rename = "Missed_Pickups")]
    pub missed_pickups: u32,
}

/// The four civic record streams, raw or filtered.
///
/// A zone present in one stream but absent from another is fine; each
/// stream stands alone until the analytics layer joins them by zone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    /// Citizen grievance tickets.
    pub grievances: Vec<GrievanceRecord>,
    /// Hourly energy observations.
    pub energy: Vec<EnergyRecord>,
    /// Hourly traffic observations.
    pub traffic: Vec<TrafficRecord>,
    /// Daily waste-collection observations.
    pub waste: Vec<WasteRecord>,
}

impl DataSet {
    /// Total record count across all four streams.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.grievances.len() + self.energy.len() + self.traffic.len() + self.waste.len()
    }

    /// Returns `true` when every stream is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_records() == 0
    }
}

/// Rejects hour values outside 0-23 during deserialization.
fn hour_of_day<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let hour = u8::deserialize(deserializer)?;
    if hour > 23 {
        return Err(serde::de::Error::custom(format!(
            "hour {hour} out of range: expected 0-23"
        )));
    }
    Ok(hour)
}

/// Serde adapter for the source's `0`/`1` power-cut flag column.
mod power_cut_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*flag))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(serde::de::Error::custom(format!(
                "invalid power cut flag {other}: expected 0 or 1"
            ))),
        }
    }
}
