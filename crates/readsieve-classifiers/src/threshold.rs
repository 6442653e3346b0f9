//! Trained threshold table lookup
//!
//! The parameter file is a CSV with a header row and the columns
//! `reference_kb, power, num_packs, num_scouts, threshold, specificity`.
//! The reference size is stored in kilo-events.

use readsieve_core::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// One row of the threshold table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdEntry {
    /// Reference size in events
    pub reference_size: usize,
    pub power: u32,
    pub num_packs: usize,
    pub num_scouts: usize,
    /// Score below which a query counts as on-target
    pub threshold: f32,
    pub specificity: f32,
}

/// Parsed threshold table
#[derive(Debug, Clone, Default)]
pub struct ThresholdTable {
    entries: Vec<ThresholdEntry>,
}

impl ThresholdTable {
    /// Load a table from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::classifier(format!(
                "failed to open parameter file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_reader(file)
    }

    /// Parse a table from any reader. The first line is a header.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut entries = Vec::new();
        for (index, line) in BufReader::new(reader).lines().enumerate().skip(1) {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                Some(entry) => entries.push(entry),
                None => debug!(line = index + 1, "Skipping malformed threshold row"),
            }
        }
        Ok(Self { entries })
    }

    /// First entry trained for exactly these parameters
    pub fn lookup(
        &self,
        reference_size: usize,
        power: u32,
        num_packs: usize,
        num_scouts: usize,
    ) -> Option<&ThresholdEntry> {
        self.entries.iter().find(|e| {
            e.reference_size == reference_size
                && e.power == power
                && e.num_packs == num_packs
                && e.num_scouts == num_scouts
        })
    }

    /// Number of parsed rows
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_line(line: &str) -> Option<ThresholdEntry> {
    let mut fields = line.split(',').map(str::trim);
    let reference_kb: usize = fields.next()?.parse().ok()?;
    let power = fields.next()?.parse().ok()?;
    let num_packs = fields.next()?.parse().ok()?;
    let num_scouts = fields.next()?.parse().ok()?;
    let threshold = fields.next()?.parse().ok()?;
    let specificity = fields.next()?.parse().ok()?;

    Some(ThresholdEntry {
        reference_size: reference_kb * 1000,
        power,
        num_packs,
        num_scouts,
        threshold,
        specificity,
    })
}
