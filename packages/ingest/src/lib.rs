#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV ingestion and schema validation for the four civic data streams.
//!
//! This is the Data Source collaborator: it loads the tabular sources into
//! typed records and is the only place validation errors are raised. A
//! schema violation (missing column, unparseable date, out-of-range flag)
//! is fatal and distinguishable from a missing file; past this boundary
//! the analytics core never fails.

use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use city_pulse_records::{DataSet, EnergyRecord, GrievanceRecord, TrafficRecord, WasteRecord};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Standard file name for the grievance stream.
pub const GRIEVANCES_FILE: &str = "citizen_grievances.csv";
/// Standard file name for the energy stream.
pub const ENERGY_FILE: &str = "energy_consumption.csv";
/// Standard file name for the traffic stream.
pub const TRAFFIC_FILE: &str = "traffic_flow.csv";
/// Standard file name for the waste stream.
pub const WASTE_FILE: &str = "waste_management.csv";

const GRIEVANCE_COLUMNS: &[&str] = &[
    "Date",
    "Zone_Name",
    "Ticket_ID",
    "Department",
    "Issue_Type",
    "Status",
    "SLA_Days",
];
const ENERGY_COLUMNS: &[&str] = &[
    "Date",
    "Hour",
    "Zone_Name",
    "Feeder_ID",
    "Energy_Consumption_kWh",
    "Grid_Voltage",
    "Power_Cut_Flag",
];
const TRAFFIC_COLUMNS: &[&str] = &[
    "Date",
    "Hour",
    "Zone_Name",
    "Junction_ID",
    "Vehicle_Volume",
    "Avg_Speed_Kmph",
    "Congestion_Index",
];
const WASTE_COLUMNS: &[&str] = &[
    "Date",
    "Zone_Name",
    "Total_Waste_Collected_Kg",
    "Avg_Bin_Fill_Level_Percent",
    "Segregation_Efficiency_Percent",
    "Missed_Pickups",
];

/// Errors raised at the ingestion boundary.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The data file does not exist.
    #[error("Data file not found: {}", path.display())]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file violates the expected schema.
    #[error("Schema violation in {}: {message}", path.display())]
    Schema {
        /// Path of the offending file.
        path: PathBuf,
        /// What was wrong, with row context where available.
        message: String,
    },
}

/// Loads all four streams from their standard file names under `dir`.
///
/// # Errors
///
/// Returns the first [`IngestError`] encountered; no partial dataset is
/// produced.
pub fn load_dataset(dir: &Path) -> Result<DataSet, IngestError> {
    let data = DataSet {
        grievances: load_grievances(&dir.join(GRIEVANCES_FILE))?,
        energy: load_energy(&dir.join(ENERGY_FILE))?,
        traffic: load_traffic(&dir.join(TRAFFIC_FILE))?,
        waste: load_waste(&dir.join(WASTE_FILE))?,
    };
    log::info!(
        "Loaded {} records ({} grievances, {} energy, {} traffic, {} waste) from {}",
        data.total_records(),
        data.grievances.len(),
        data.energy.len(),
        data.traffic.len(),
        data.waste.len(),
        dir.display()
    );
    Ok(data)
}

/// Loads the citizen grievance stream.
///
/// # Errors
///
/// Returns an [`IngestError`] if the file is missing, unreadable, or
/// violates the schema.
pub fn load_grievances(path: &Path) -> Result<Vec<GrievanceRecord>, IngestError> {
    load_records(path, GRIEVANCE_COLUMNS)
}

/// Loads the energy consumption stream.
///
/// # Errors
///
/// Returns an [`IngestError`] if the file is missing, unreadable, or
/// violates the schema.
pub fn load_energy(path: &Path) -> Result<Vec<EnergyRecord>, IngestError> {
    load_records(path, ENERGY_COLUMNS)
}

/// Loads the traffic flow stream.
///
/// # Errors
///
/// Returns an [`IngestError`] if the file is missing, unreadable, or
/// violates the schema.
pub fn load_traffic(path: &Path) -> Result<Vec<TrafficRecord>, IngestError> {
    load_records(path, TRAFFIC_COLUMNS)
}

/// Loads the waste management stream.
///
/// # Errors
///
/// Returns an [`IngestError`] if the file is missing, unreadable, or
/// violates the schema.
pub fn load_waste(path: &Path) -> Result<Vec<WasteRecord>, IngestError> {
    load_records(path, WASTE_COLUMNS)
}

fn load_records<T: DeserializeOwned>(
    path: &Path,
    required_columns: &[&str],
) -> Result<Vec<T>, IngestError> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let mut reader = csv::Reader::from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| classify_csv_error(path, e))?
        .clone();
    for column in required_columns {
        if !headers.iter().any(|h| h == *column) {
            return Err(IngestError::Schema {
                path: path.to_path_buf(),
                message: format!("missing required column `{column}`"),
            });
        }
    }

    let mut records = Vec::new();
    for result in reader.deserialize() {
        records.push(result.map_err(|e| classify_csv_error(path, e))?);
    }
    log::debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

fn classify_csv_error(path: &Path, err: csv::Error) -> IngestError {
    let path = path.to_path_buf();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => IngestError::Io { path, source },
        csv::ErrorKind::Deserialize { pos, err } => {
            let message = pos.map_or_else(
                || format!("record: {err}"),
                |pos| format!("record at line {}: {err}", pos.line()),
            );
            IngestError::Schema { path, message }
        }
        other => IngestError::Schema {
            path,
            message: format!("{other:?}"),
        },
    }
}
