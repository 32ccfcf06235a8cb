//! Cross-domain correlation analysis.
//!
//! Joins the four streams into one daily per-zone table and computes the
//! Pearson correlation matrix over its columns.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use city_pulse_analytics_models::{CorrelationColumn, CorrelationMatrix};
use city_pulse_records::{DataSet, GrievanceStatus};

use crate::stats;

/// Accumulates a running mean per join key.
#[derive(Default)]
struct MeanAcc {
    sum: f64,
    count: u64,
}

impl MeanAcc {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Builds the daily per-zone cross-domain table.
///
/// One row per (date, zone) seen in ANY stream — outer join semantics; a
/// domain with no observations for a key contributes 0. Column order
/// matches [`CorrelationColumn::ALL`].
fn daily_zone_rows(data: &DataSet) -> Vec<[f64; 4]> {
    type Key = (NaiveDate, String);

    let mut congestion: BTreeMap<Key, MeanAcc> = BTreeMap::new();
    for r in &data.traffic {
        congestion
            .entry((r.date, r.zone.clone()))
            .or_default()
            .push(r.congestion_index);
    }

    let mut energy: BTreeMap<Key, MeanAcc> = BTreeMap::new();
    for r in &data.energy {
        energy
            .entry((r.date, r.zone.clone()))
            .or_default()
            .push(r.energy_kwh);
    }

    let mut bin_fill: BTreeMap<Key, MeanAcc> = BTreeMap::new();
    for r in &data.waste {
        bin_fill
            .entry((r.date, r.zone.clone()))
            .or_default()
            .push(r.avg_bin_fill_percent);
    }

    let mut open_count: BTreeMap<Key, u64> = BTreeMap::new();
    for r in &data.grievances {
        if r.status == GrievanceStatus::Open {
            *open_count.entry((r.date, r.zone.clone())).or_default() += 1;
        }
    }

    let mut keys: Vec<Key> = congestion
        .keys()
        .chain(energy.keys())
        .chain(bin_fill.keys())
        .chain(open_count.keys())
        .cloned()
        .collect();
    keys.sort();
    keys.dedup();

    keys.into_iter()
        .map(|key| {
            #[allow(clippy::cast_precision_loss)]
            let open = open_count.get(&key).copied().unwrap_or(0) as f64;
            [
                congestion.get(&key).map_or(0.0, MeanAcc::mean),
                energy.get(&key).map_or(0.0, MeanAcc::mean),
                bin_fill.get(&key).map_or(0.0, MeanAcc::mean),
                open,
            ]
        })
        .collect()
}

/// Computes the 4x4 Pearson correlation matrix over the daily per-zone
/// table.
///
/// Diagonal entries are pinned to 1.0. An off-diagonal pair involving a
/// zero-variance column (or a table with fewer than two rows) is defined
/// as 0.0 rather than left undefined. The result is symmetric with all
/// entries in [-1, 1].
#[must_use]
pub fn correlation_matrix(data: &DataSet) -> CorrelationMatrix {
    let rows = daily_zone_rows(data);
    let columns: Vec<Vec<f64>> = (0..4)
        .map(|c| rows.iter().map(|row| row[c]).collect())
        .collect();

    let mut values = [[0.0; 4]; 4];
    for a in CorrelationColumn::ALL {
        values[a.index()][a.index()] = 1.0;
    }
    for a in CorrelationColumn::ALL {
        for b in CorrelationColumn::ALL {
            if b.index() <= a.index() {
                continue;
            }
            let r = stats::pearson(&columns[a.index()], &columns[b.index()]).unwrap_or(0.0);
            values[a.index()][b.index()] = r;
            values[b.index()][a.index()] = r;
        }
    }

    CorrelationMatrix { values }
}
