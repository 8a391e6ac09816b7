// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod batch;
mod output;

pub use args::Args;
pub use batch::{parse_batch_csv, read_batch_csv, run_batch, save_results_csv, FilePair, PairOutcome};
pub use output::{print_batch_summary, print_json, print_result};

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::core::{load_as_mono, VisqolApi};

/// Run the CLI for already-parsed arguments
pub fn run(args: &Args) -> Result<()> {
    if let (Some(input), Some(results)) = (&args.batch_input_csv, &args.results_csv) {
        let pairs = read_batch_csv(input)?;
        if pairs.is_empty() {
            bail!("No file pairs found in {}", input.display());
        }
        let outcomes = run_batch(args, &pairs)?;
        save_results_csv(results, &outcomes)?;
        print_batch_summary(&outcomes);
        println!("Results written to {}", results.display());
        return Ok(());
    }

    match (&args.reference_file, &args.degraded_file) {
        (Some(reference), Some(degraded)) => run_single(args, reference, degraded),
        _ => bail!("Provide --reference-file and --degraded-file, or --batch-input-csv"),
    }
}

fn run_single(args: &Args, reference_path: &Path, degraded_path: &Path) -> Result<()> {
    let reference = load_as_mono(reference_path)?;
    let degraded = load_as_mono(degraded_path)?;
    if reference.sample_rate != degraded.sample_rate {
        bail!(
            "Reference and degraded sample rates differ ({} Hz vs {} Hz)",
            reference.sample_rate,
            degraded.sample_rate
        );
    }

    let api = VisqolApi::from_config(&args.to_config(reference.sample_rate))?;
    let result = api
        .measure_signals(&reference, &degraded)
        .with_context(|| format!("Failed to score {}", degraded_path.display()))?;

    if args.json {
        print_json(&result)?;
    } else {
        print_result(reference_path, degraded_path, &result, args.verbose);
    }
    if let Some(results) = &args.results_csv {
        let outcome = PairOutcome {
            reference: reference_path.to_path_buf(),
            degraded: degraded_path.to_path_buf(),
            result: Ok(result),
        };
        save_results_csv(results, std::slice::from_ref(&outcome))?;
    }
    Ok(())
}
