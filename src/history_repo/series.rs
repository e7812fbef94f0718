// Parallel time-series arrays for the dashboard charts.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::Snapshot;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySeries {
    pub timestamps: Vec<DateTime<Local>>,
    pub cpu: Vec<f64>,
    pub ram: Vec<f64>,
    /// None where the temperature sensor was unavailable.
    pub temp: Vec<Option<f64>>,
}

impl HistorySeries {
    pub fn from_snapshots(history: &[Arc<Snapshot>]) -> Self {
        let mut series = Self {
            timestamps: Vec::with_capacity(history.len()),
            cpu: Vec::with_capacity(history.len()),
            ram: Vec::with_capacity(history.len()),
            temp: Vec::with_capacity(history.len()),
        };
        for s in history {
            series.timestamps.push(s.timestamp);
            series.cpu.push(s.cpu_percent);
            series.ram.push(s.memory.percent);
            series.temp.push(s.cpu_temp);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}
