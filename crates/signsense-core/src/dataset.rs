//! Exemplar dataset: loading, nearest-neighbor search, mirroring.
//!
//! The on-disk format is comma-separated UTF-8 text with exactly 127
//! columns: a label followed by 63 `h1_*` floats and 63 `h2_*` floats. An
//! absent hand is encoded as 63 zeros. Malformed rows are skipped and
//! counted, never fatal; an entirely empty dataset is.

use std::fmt::Write as _;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::{info, warn};

use crate::error::{SignError, SignResult};
use crate::labels;
use crate::types::{Observation, HAND_DIMS, OBS_DIMS};

/// Columns per data row: label + 126 floats.
const COLUMNS: usize = 1 + OBS_DIMS;

/// A stored, labeled reference observation.
///
/// Immutable after load; the store is populated once at startup and only
/// offline tooling ever regenerates the underlying file.
#[derive(Debug, Clone, PartialEq)]
pub struct Exemplar {
    /// Canonical label (post synonym-table normalization).
    pub label: String,
    pub vector: Observation,
}

/// Read-only set of labeled exemplars with brute-force nearest search.
///
/// Safe to share immutably (e.g. behind an `Arc`) across concurrent
/// classification sessions; nothing here locks or mutates after load.
#[derive(Debug)]
pub struct ExemplarStore {
    exemplars: Vec<Exemplar>,
    skipped: usize,
}

impl ExemplarStore {
    /// Load a store from any reader producing the dataset text format.
    ///
    /// Rows with wrong arity or non-numeric fields are skipped and counted.
    ///
    /// # Errors
    ///
    /// [`SignError::Dataset`] when the source cannot be read or yields zero
    /// valid rows.
    pub fn load<R: Read>(reader: R) -> SignResult<Self> {
        let reader = BufReader::new(reader);
        let mut exemplars = Vec::new();
        let mut skipped = 0usize;

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|e| SignError::Dataset(format!("read failed: {e}")))?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if idx == 0 && trimmed.starts_with("label,") {
                continue;
            }
            match parse_row(trimmed, line_no) {
                Ok(exemplar) => exemplars.push(exemplar),
                Err(err) => {
                    warn!(line = line_no, %err, "skipping malformed dataset row");
                    skipped += 1;
                }
            }
        }

        if exemplars.is_empty() {
            return Err(SignError::Dataset(format!(
                "no valid exemplar rows ({skipped} skipped)"
            )));
        }
        info!(
            rows = exemplars.len(),
            skipped,
            "loaded exemplar dataset"
        );
        Ok(Self { exemplars, skipped })
    }

    /// Load a store from a file path.
    pub fn load_path<P: AsRef<Path>>(path: P) -> SignResult<Self> {
        let file = std::fs::File::open(path.as_ref()).map_err(|e| {
            SignError::Dataset(format!("cannot open {}: {e}", path.as_ref().display()))
        })?;
        Self::load(file)
    }

    /// Build a store directly from in-memory exemplars.
    ///
    /// Labels are canonicalized on the way in. Used by tests and tooling.
    pub fn from_exemplars(exemplars: Vec<Exemplar>) -> SignResult<Self> {
        if exemplars.is_empty() {
            return Err(SignError::Dataset("no exemplars provided".to_string()));
        }
        let exemplars = exemplars
            .into_iter()
            .map(|e| Exemplar {
                label: labels::canonical(&e.label),
                vector: e.vector,
            })
            .collect();
        Ok(Self {
            exemplars,
            skipped: 0,
        })
    }

    /// The `k` nearest exemplars to `observation`, ascending by distance.
    ///
    /// Distances are Euclidean; internally the scan compares squared
    /// distances and only takes square roots for the returned pairs. Ties
    /// resolve to first-seen (file) order. Brute force is adequate at the
    /// expected dataset sizes (low thousands of rows).
    pub fn nearest(&self, observation: &Observation, k: usize) -> Vec<(&Exemplar, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .exemplars
            .iter()
            .enumerate()
            .map(|(i, e)| (i, squared_distance(&e.vector, observation)))
            .collect();
        // Stable sort keeps first-seen order for equal distances.
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(k)
            .map(|(i, d2)| (&self.exemplars[i], d2.sqrt()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.exemplars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exemplars.is_empty()
    }

    /// Rows discarded during load because they failed to parse.
    pub fn skipped_rows(&self) -> usize {
        self.skipped
    }

    pub fn exemplars(&self) -> &[Exemplar] {
        &self.exemplars
    }
}

fn squared_distance(a: &Observation, b: &Observation) -> f32 {
    let mut sum = 0.0f32;
    for i in 0..OBS_DIMS {
        let d = a[i] - b[i];
        sum += d * d;
    }
    sum
}

fn parse_row(line: &str, line_no: usize) -> SignResult<Exemplar> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != COLUMNS {
        return Err(SignError::MalformedRow {
            line: line_no,
            message: format!("expected {COLUMNS} columns, got {}", fields.len()),
        });
    }
    let label = labels::canonical(fields[0]);
    if label.is_empty() {
        return Err(SignError::MalformedRow {
            line: line_no,
            message: "empty label".to_string(),
        });
    }
    let mut vector = [0.0f32; OBS_DIMS];
    for (i, field) in fields[1..].iter().enumerate() {
        vector[i] = field
            .trim()
            .parse::<f32>()
            .map_err(|e| SignError::MalformedRow {
                line: line_no,
                message: format!("column {}: {e}", i + 2),
            })?;
    }
    Ok(Exemplar { label, vector })
}

/// The canonical dataset header row.
pub fn header() -> String {
    let mut out = String::from("label");
    for hand in ["h1", "h2"] {
        for lm in 0..21 {
            for axis in ["x", "y", "z"] {
                let _ = write!(out, ",{hand}_{lm}_{axis}");
            }
        }
    }
    out
}

/// Format one data row the way the loader expects it back.
///
/// Floats are written with up to 10 significant digits, plenty for the
/// detector's precision without bloating regenerated files.
pub fn format_row(label: &str, vector: &Observation) -> String {
    let mut out = labels::canonical(label);
    for v in vector.iter() {
        let _ = write!(out, ",{}", format_float(*v));
    }
    out
}

fn format_float(v: f32) -> String {
    if v == 0.0 {
        "0".to_string()
    } else {
        let s = format!("{v:.10}");
        let s = s.trim_end_matches('0').trim_end_matches('.');
        s.to_string()
    }
}

/// Apply the dataset mirroring convention to one observation row.
///
/// Negates every x coordinate (index = 0 mod 3 within each 63-value hand
/// block) and swaps the h1/h2 blocks, reflecting the handedness flip.
/// Involutive: `mirror_row(&mirror_row(v)) == *v`.
pub fn mirror_row(vector: &Observation) -> Observation {
    let mut out = [0.0f32; OBS_DIMS];
    for block in 0..2 {
        let src = block * HAND_DIMS;
        let dst = (1 - block) * HAND_DIMS;
        for i in 0..HAND_DIMS {
            let v = vector[src + i];
            out[dst + i] = if i % 3 == 0 { -v } else { v };
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn row(label: &str, seed: f32) -> String {
        let mut vector = [0.0f32; OBS_DIMS];
        for (i, v) in vector.iter_mut().enumerate() {
            *v = seed + i as f32 * 0.001;
        }
        format_row(label, &vector)
    }

    fn store_from(text: &str) -> SignResult<ExemplarStore> {
        ExemplarStore::load(Cursor::new(text.to_string()))
    }

    #[test]
    fn loads_valid_rows_and_skips_bad_ones() {
        let text = format!(
            "{}\n{}\nnot,a,valid,row\n{}\n",
            header(),
            row("Tiger", 0.1),
            row("rabbit", 0.5),
        );
        let store = store_from(&text).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.skipped_rows(), 1);
        // Labels went through the synonym table.
        assert_eq!(store.exemplars()[0].label, "tiger");
        assert_eq!(store.exemplars()[1].label, "hare");
    }

    #[test]
    fn non_numeric_field_skips_row() {
        let mut bad = row("boar", 0.2);
        bad = bad.replacen("0.2", "abc", 1);
        let text = format!("{}\n{}\n{}\n", header(), row("tiger", 0.1), bad);
        let store = store_from(&text).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.skipped_rows(), 1);
    }

    #[test]
    fn zero_valid_rows_is_fatal() {
        let text = format!("{}\ngarbage\n", header());
        assert!(matches!(store_from(&text), Err(SignError::Dataset(_))));
    }

    #[test]
    fn nearest_returns_ascending_distances() {
        let mut near = [0.0f32; OBS_DIMS];
        near[0] = 1.0;
        let mut far = [0.0f32; OBS_DIMS];
        far[0] = 5.0;
        let store = ExemplarStore::from_exemplars(vec![
            Exemplar { label: "far".into(), vector: far },
            Exemplar { label: "near".into(), vector: near },
        ])
        .unwrap();

        let query = [0.0f32; OBS_DIMS];
        let hits = store.nearest(&query, 2);
        assert_eq!(hits[0].0.label, "near");
        assert!((hits[0].1 - 1.0).abs() < 1e-6);
        assert_eq!(hits[1].0.label, "far");
        assert!((hits[1].1 - 5.0).abs() < 1e-6);
    }

    #[test]
    fn nearest_ties_break_first_seen() {
        let mut a = [0.0f32; OBS_DIMS];
        a[0] = 1.0;
        let mut b = [0.0f32; OBS_DIMS];
        b[1] = 1.0;
        let store = ExemplarStore::from_exemplars(vec![
            Exemplar { label: "first".into(), vector: a },
            Exemplar { label: "second".into(), vector: b },
        ])
        .unwrap();
        let hits = store.nearest(&[0.0; OBS_DIMS], 1);
        assert_eq!(hits[0].0.label, "first");
    }

    #[test]
    fn header_has_127_columns() {
        assert_eq!(header().split(',').count(), COLUMNS);
        assert!(header().starts_with("label,h1_0_x,h1_0_y,h1_0_z"));
        assert!(header().ends_with("h2_20_x,h2_20_y,h2_20_z"));
    }

    #[test]
    fn format_then_load_round_trips() {
        let mut vector = [0.0f32; OBS_DIMS];
        vector[0] = -0.25;
        vector[77] = 1.5;
        let text = format!("{}\n{}\n", header(), format_row("Tiger", &vector));
        let store = store_from(&text).unwrap();
        assert_eq!(store.exemplars()[0].vector, vector);
        assert_eq!(store.exemplars()[0].label, "tiger");
    }

    #[test]
    fn mirror_is_involutive() {
        let mut vector = [0.0f32; OBS_DIMS];
        for (i, v) in vector.iter_mut().enumerate() {
            *v = (i as f32) * 0.017 - 1.0;
        }
        let mirrored = mirror_row(&vector);
        assert_ne!(mirrored, vector);
        assert_eq!(mirror_row(&mirrored), vector);
    }

    #[test]
    fn mirror_swaps_blocks_and_negates_x() {
        let mut vector = [0.0f32; OBS_DIMS];
        vector[0] = 0.5; // h1 lm0 x
        vector[1] = 0.25; // h1 lm0 y
        let mirrored = mirror_row(&vector);
        assert_eq!(mirrored[HAND_DIMS], -0.5);
        assert_eq!(mirrored[HAND_DIMS + 1], 0.25);
        assert_eq!(mirrored[0], 0.0);
    }

    #[test]
    fn load_path_missing_file_is_dataset_error() {
        let err = ExemplarStore::load_path("/nonexistent/signs.csv");
        assert!(matches!(err, Err(SignError::Dataset(_))));
    }
}
