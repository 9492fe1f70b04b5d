//! Dataset subcommands: validate, mirror, stats.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{Args, Subcommand};
use tracing::info;

use signsense_core::dataset::{self, ExemplarStore};
use signsense_core::labels;
use signsense_core::{SignError, SignResult};

#[derive(Subcommand)]
pub enum DatasetCommands {
    /// Load a dataset file and report what the runtime would keep
    Validate(ValidateArgs),
    /// Write a copy of the dataset with mirrored rows appended
    Mirror(MirrorArgs),
    /// Per-label counts and nearest-neighbor distances
    Stats(StatsArgs),
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Dataset file to check
    pub file: PathBuf,
}

#[derive(Args)]
pub struct MirrorArgs {
    /// Source dataset file
    pub input: PathBuf,
    /// Destination file (original rows plus mirrored copies)
    pub output: PathBuf,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Dataset file to analyze
    pub file: PathBuf,
}

pub fn run(command: DatasetCommands) -> SignResult<()> {
    match command {
        DatasetCommands::Validate(args) => validate(&args),
        DatasetCommands::Mirror(args) => mirror(&args),
        DatasetCommands::Stats(args) => stats(&args),
    }
}

fn validate(args: &ValidateArgs) -> SignResult<()> {
    let store = ExemplarStore::load_path(&args.file)?;

    println!("rows kept:    {}", store.len());
    println!("rows skipped: {}", store.skipped_rows());
    println!("label table:  v{}", labels::LABEL_TABLE_VERSION);
    println!();
    for (label, count) in histogram(&store) {
        println!("{label:<20} {count}");
    }
    Ok(())
}

fn mirror(args: &MirrorArgs) -> SignResult<()> {
    let store = ExemplarStore::load_path(&args.input)?;

    let file = File::create(&args.output).map_err(|e| {
        SignError::Config(format!("cannot create {}: {e}", args.output.display()))
    })?;
    let mut out = BufWriter::new(file);

    write_line(&mut out, &dataset::header(), &args.output)?;
    for exemplar in store.exemplars() {
        write_line(
            &mut out,
            &dataset::format_row(&exemplar.label, &exemplar.vector),
            &args.output,
        )?;
    }
    for exemplar in store.exemplars() {
        let mirrored = dataset::mirror_row(&exemplar.vector);
        write_line(
            &mut out,
            &dataset::format_row(&exemplar.label, &mirrored),
            &args.output,
        )?;
    }
    out.flush()
        .map_err(|e| SignError::Config(format!("write failed: {e}")))?;

    info!(
        rows = store.len() * 2,
        output = %args.output.display(),
        "wrote mirrored dataset"
    );
    println!("{} rows written to {}", store.len() * 2, args.output.display());
    Ok(())
}

fn stats(args: &StatsArgs) -> SignResult<()> {
    let store = ExemplarStore::load_path(&args.file)?;

    // Leave-one-out nearest distance per exemplar, aggregated per label.
    // Quadratic, fine at dataset sizes of a few thousand rows.
    let mut spread: BTreeMap<&str, (usize, f32)> = BTreeMap::new();
    for exemplar in store.exemplars() {
        let hits = store.nearest(&exemplar.vector, 2);
        // First hit is the exemplar itself at distance zero.
        if let Some((_, distance)) = hits.get(1) {
            let entry = spread.entry(exemplar.label.as_str()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += distance;
        }
    }

    println!("{:<20} {:>6} {:>14}", "label", "count", "mean nn dist");
    for (label, (count, sum)) in &spread {
        let mean = *sum / *count as f32;
        println!("{label:<20} {count:>6} {mean:>14.4}");
    }
    Ok(())
}

fn histogram(store: &ExemplarStore) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for exemplar in store.exemplars() {
        *counts.entry(exemplar.label.as_str()).or_insert(0) += 1;
    }
    counts
}

fn write_line(out: &mut impl Write, line: &str, path: &std::path::Path) -> SignResult<()> {
    writeln!(out, "{line}")
        .map_err(|e| SignError::Config(format!("write to {} failed: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use signsense_core::types::OBS_DIMS;

    fn sample_dataset() -> tempfile::NamedTempFile {
        let mut vector = [0.0f32; OBS_DIMS];
        vector[0] = 0.5;
        vector[64] = -0.25;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", dataset::header()).unwrap();
        writeln!(file, "{}", dataset::format_row("Tiger", &vector)).unwrap();
        writeln!(file, "{}", dataset::format_row("rabbit", &vector)).unwrap();
        writeln!(file, "bad,row").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn validate_accepts_sample() {
        let file = sample_dataset();
        validate(&ValidateArgs {
            file: file.path().to_path_buf(),
        })
        .unwrap();
    }

    #[test]
    fn mirror_doubles_rows_and_round_trips() {
        let input = sample_dataset();
        let output = tempfile::NamedTempFile::new().unwrap();
        mirror(&MirrorArgs {
            input: input.path().to_path_buf(),
            output: output.path().to_path_buf(),
        })
        .unwrap();

        let mirrored = ExemplarStore::load_path(output.path()).unwrap();
        assert_eq!(mirrored.len(), 4);
        assert_eq!(mirrored.skipped_rows(), 0);
        // Labels are canonical in the regenerated file.
        assert!(mirrored.exemplars().iter().any(|e| e.label == "hare"));

        // The mirrored copy of the first row negates x and swaps blocks.
        let original = &mirrored.exemplars()[0].vector;
        let copy = &mirrored.exemplars()[2].vector;
        assert_eq!(copy[63], -original[0]);
    }

    #[test]
    fn stats_runs_on_sample() {
        let file = sample_dataset();
        stats(&StatsArgs {
            file: file.path().to_path_buf(),
        })
        .unwrap();
    }

    #[test]
    fn validate_missing_file_fails() {
        let err = validate(&ValidateArgs {
            file: PathBuf::from("/nonexistent/signs.csv"),
        });
        assert!(matches!(err, Err(SignError::Dataset(_))));
    }
}
