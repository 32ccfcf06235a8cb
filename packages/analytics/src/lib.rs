#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filtering, aggregation, and cross-domain analytics core.
//!
//! Every component here is a pure, synchronous function over borrowed
//! immutable record slices: filter once, then run the KPI aggregator,
//! event detector, correlation analyzer, and anomaly detector in any order
//! — none of them reads another's output. Recomputation is wholesale on
//! every filter change.
//!
//! Nothing in this crate can fail. Empty inputs degrade to defined zero
//! values, zones missing from a stream contribute nothing, and per-record
//! oddities are absorbed into the statistics. Validation errors belong to
//! the ingestion boundary (`city_pulse_ingest`).

pub mod anomaly;
pub mod correlation;
pub mod events;
pub mod filter;
pub mod insights;
pub mod kpi;
pub mod stress;

mod stats;
