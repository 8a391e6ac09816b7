//! Output formatting for CLI results

use colorful::Colorful;
use std::path::Path;

use super::batch::PairOutcome;
use crate::measurement::{MeasurementResult, QualityGrade};

fn colored_mos(result: &MeasurementResult) -> String {
    let text = format!("{:.4}", result.moslqo);
    match result.grade() {
        QualityGrade::Excellent | QualityGrade::Good => text.green().to_string(),
        QualityGrade::Fair => text.yellow().to_string(),
        QualityGrade::Poor | QualityGrade::Bad => text.red().to_string(),
    }
}

/// Print one measurement for a terminal
pub fn print_result(reference: &Path, degraded: &Path, result: &MeasurementResult, verbose: bool) {
    println!("Reference: {}", reference.display().to_string().cyan());
    println!("Degraded:  {}", degraded.display().to_string().cyan());
    println!(
        "  MOS-LQO: {} {} ({})",
        colored_mos(result),
        result.grade().symbol(),
        result.grade().label()
    );
    println!("  VNSIM:   {:.4}", result.vnsim);
    if result.alignment_lag_s != 0.0 {
        println!("  Global lag removed: {:.4} s", result.alignment_lag_s);
    }

    if verbose {
        println!("\n  Per-band similarity:");
        for (band, (cf, sim)) in result
            .center_freq_bands
            .iter()
            .zip(&result.fvnsim)
            .enumerate()
        {
            let coverage = result.band_coverage.get(band).copied().unwrap_or(0);
            println!(
                "    {:>8.1} Hz  fvnsim {:.4}  std {:.4}  patches {}",
                cf,
                sim,
                result.fstdnsim.get(band).copied().unwrap_or(0.0),
                coverage
            );
        }

        println!("\n  Patches:");
        for patch in &result.patch_sims {
            println!(
                "    ref {:>7.3}-{:<7.3} s  deg {:>7.3}-{:<7.3} s  nsim {:.4}",
                patch.ref_start_s,
                patch.ref_end_s,
                patch.deg_start_s,
                patch.deg_end_s,
                patch.similarity
            );
        }
    }
}

/// Print one measurement as pretty JSON
pub fn print_json(result: &MeasurementResult) -> anyhow::Result<()> {
    println!("{}", result.to_json()?);
    Ok(())
}

/// Summary line per pair after a batch run
pub fn print_batch_summary(outcomes: &[PairOutcome]) {
    let mut failed = 0usize;
    for outcome in outcomes {
        match &outcome.result {
            Ok(result) => println!(
                "{} {} -> {}",
                result.grade().symbol(),
                outcome.degraded.display(),
                colored_mos(result)
            ),
            Err(message) => {
                failed += 1;
                println!(
                    "{} {}: {}",
                    "✗".red(),
                    outcome.degraded.display(),
                    message.clone().red()
                );
            }
        }
    }
    println!(
        "\nScored {} of {} pairs",
        outcomes.len() - failed,
        outcomes.len()
    );
}
