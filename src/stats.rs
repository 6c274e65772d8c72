use std::io::Write;

use chrono::{DateTime, Local};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persistence::Persistence;

/// Final numbers of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub hits: u32,
    pub duration_seconds: u32,
    pub accuracy_percent: u32,
    pub rate_per_minute: u32,
}

impl SessionMetrics {
    /// Derived values are zero for a zero-length session
    pub fn compute(hits: u32, duration_seconds: u32) -> Self {
        let (accuracy_percent, rate_per_minute) = if duration_seconds > 0 {
            let per_sec = hits as f64 / duration_seconds as f64;
            ((per_sec * 100.0).round() as u32, (per_sec * 60.0).round() as u32)
        } else {
            (0, 0)
        };

        Self {
            hits,
            duration_seconds,
            accuracy_percent,
            rate_per_minute,
        }
    }
}

/// One persisted summary of a completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub timestamp: DateTime<Local>,
    pub hits: u32,
    pub duration_seconds: u32,
    pub accuracy_percent: u32,
    pub rate_per_minute: u32,
}

impl StatsRecord {
    pub fn new(timestamp: DateTime<Local>, metrics: SessionMetrics) -> Self {
        Self {
            timestamp,
            hits: metrics.hits,
            duration_seconds: metrics.duration_seconds,
            accuracy_percent: metrics.accuracy_percent,
            rate_per_minute: metrics.rate_per_minute,
        }
    }
}

/// Proof that the user explicitly agreed to wipe the history
#[derive(Debug)]
pub struct ClearConfirmation {
    _private: (),
}

impl ClearConfirmation {
    /// Only an explicit "y"/"yes" grants the confirmation
    pub fn from_answer(answer: &str) -> Option<Self> {
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => Some(Self { _private: () }),
            _ => None,
        }
    }
}

/// Aggregate view over the whole history
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatsSummary {
    pub sessions: usize,
    pub total_hits: u64,
    pub best_hits: u32,
    pub mean_accuracy: f64,
    pub mean_rate: f64,
}

/// Append-only history of past sessions, serialized as one JSON list
#[derive(Debug)]
pub struct StatsStore<P: Persistence> {
    backend: P,
    records: Vec<StatsRecord>,
}

impl<P: Persistence> StatsStore<P> {
    /// Load the history. Missing or unreadable data yields an empty history.
    pub fn open(backend: P) -> Self {
        let records = Self::read(&backend);
        Self { backend, records }
    }

    fn read(backend: &P) -> Vec<StatsRecord> {
        match backend.load() {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<StatsRecord>>(&bytes) {
                Ok(records) => {
                    info!("loaded {} session records", records.len());
                    records
                }
                Err(e) => {
                    warn!("stored history is corrupt, starting empty: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("could not read history, starting empty: {e}");
                Vec::new()
            }
        }
    }

    fn write(&mut self) -> Result<()> {
        let bytes = serde_json::to_vec(&self.records)?;
        self.backend.save(&bytes)
    }

    /// Add a record. The in-memory history keeps it even if saving fails.
    pub fn append(&mut self, record: StatsRecord) {
        self.records.push(record);
        if let Err(e) = self.write() {
            error!("failed to persist session history: {e}");
        }
    }

    /// Insertion order
    pub fn all(&self) -> &[StatsRecord] {
        &self.records
    }

    /// Last `n` records, most recent first
    pub fn recent(&self, n: usize) -> Vec<StatsRecord> {
        self.records.iter().rev().take(n).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Irreversibly wipe the history
    pub fn clear(&mut self, _confirmation: ClearConfirmation) {
        self.records.clear();
        match self.backend.delete() {
            Ok(()) => info!("session history cleared"),
            Err(e) => error!("failed to delete stored history: {e}"),
        }
    }

    pub fn summary(&self) -> StatsSummary {
        if self.records.is_empty() {
            return StatsSummary::default();
        }
        let n = self.records.len() as f64;
        StatsSummary {
            sessions: self.records.len(),
            total_hits: self.records.iter().map(|r| r.hits as u64).sum(),
            best_hits: self.records.iter().map(|r| r.hits).max().unwrap_or(0),
            mean_accuracy: self
                .records
                .iter()
                .map(|r| r.accuracy_percent as f64)
                .sum::<f64>()
                / n,
            mean_rate: self
                .records
                .iter()
                .map(|r| r.rate_per_minute as f64)
                .sum::<f64>()
                / n,
        }
    }

    /// Write the history as CSV with a header row
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for record in &self.records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn backend(&self) -> &P {
        &self.backend
    }
}
