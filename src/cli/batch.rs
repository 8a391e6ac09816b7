// src/cli/batch.rs
//
// Batch mode: read reference/degraded pairs from a CSV file, score them in
// parallel and write one result row per pair.

use anyhow::{bail, Context, Result};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use log::{info, warn};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::args::Args;
use crate::core::{load_as_mono, AudioSignal, VisqolApi};
use crate::measurement::MeasurementResult;

const CSV_HEADER: &str = "reference,degraded";

/// One line of the batch input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub reference: PathBuf,
    pub degraded: PathBuf,
}

/// Result of scoring one pair; failures are kept as messages so one bad file
/// does not abort the batch.
#[derive(Debug)]
pub struct PairOutcome {
    pub reference: PathBuf,
    pub degraded: PathBuf,
    pub result: std::result::Result<MeasurementResult, String>,
}

/// Parse batch CSV text. A leading `reference,degraded` header is optional;
/// blank lines are skipped.
pub fn parse_batch_csv(text: &str) -> Result<Vec<FilePair>> {
    let mut pairs = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if idx == 0 && line.replace(' ', "").eq_ignore_ascii_case(CSV_HEADER) {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 2 || fields.iter().any(|f| f.is_empty()) {
            bail!(
                "line {}: expected '<reference>,<degraded>', got '{}'",
                idx + 1,
                line
            );
        }
        pairs.push(FilePair {
            reference: PathBuf::from(fields[0]),
            degraded: PathBuf::from(fields[1]),
        });
    }
    Ok(pairs)
}

pub fn read_batch_csv(path: &Path) -> Result<Vec<FilePair>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file: {}", path.display()))?;
    parse_batch_csv(&text)
}

fn load_pair(pair: &FilePair) -> Result<(AudioSignal, AudioSignal)> {
    let reference = load_as_mono(&pair.reference)?;
    let degraded = load_as_mono(&pair.degraded)?;
    if reference.sample_rate != degraded.sample_rate {
        bail!(
            "sample rates differ: reference {} Hz, degraded {} Hz",
            reference.sample_rate,
            degraded.sample_rate
        );
    }
    Ok((reference, degraded))
}

/// Configured instances keyed by sample rate. A rate whose configuration
/// fails keeps the error so every pair at that rate reports it.
struct ApiCache<'a> {
    args: &'a Args,
    apis: Mutex<HashMap<u32, Arc<std::result::Result<VisqolApi, String>>>>,
}

impl<'a> ApiCache<'a> {
    fn new(args: &'a Args) -> Self {
        Self {
            args,
            apis: Mutex::new(HashMap::new()),
        }
    }

    fn get(&self, rate: u32) -> Arc<std::result::Result<VisqolApi, String>> {
        let mut apis = self.apis.lock().unwrap_or_else(PoisonError::into_inner);
        apis.entry(rate)
            .or_insert_with(|| {
                let api = VisqolApi::from_config(&self.args.to_config(rate)).map_err(|e| {
                    warn!("cannot configure ViSQOL for {} Hz: {}", rate, e);
                    e.to_string()
                });
                Arc::new(api)
            })
            .clone()
    }
}

fn score_pair(cache: &ApiCache, pair: &FilePair) -> std::result::Result<MeasurementResult, String> {
    let (reference, degraded) = load_pair(pair).map_err(|e| format!("{:#}", e))?;
    let api = cache.get(reference.sample_rate);
    match &*api {
        Ok(api) => api
            .measure_signals(&reference, &degraded)
            .map_err(|e| e.to_string()),
        Err(message) => Err(message.clone()),
    }
}

/// Score every pair. Each worker decodes its own pair right before scoring
/// it; one configured instance per distinct sample rate is shared across
/// workers.
pub fn run_batch(args: &Args, pairs: &[FilePair]) -> Result<Vec<PairOutcome>> {
    let progress = ProgressBar::new(pairs.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let cache = ApiCache::new(args);
    let outcomes: Vec<PairOutcome> = pairs
        .par_iter()
        .progress_with(progress.clone())
        .map(|pair| {
            let result = score_pair(&cache, pair);
            if let Err(message) = &result {
                warn!("{}: {}", pair.degraded.display(), message);
            }
            PairOutcome {
                reference: pair.reference.clone(),
                degraded: pair.degraded.clone(),
                result,
            }
        })
        .collect();

    progress.finish_and_clear();
    info!("batch finished: {} pairs", outcomes.len());
    Ok(outcomes)
}

/// Write `reference,degraded,moslqo,vnsim` rows. Failed pairs get empty
/// score columns.
pub fn write_results_csv<W: Write>(out: &mut W, outcomes: &[PairOutcome]) -> Result<()> {
    writeln!(out, "reference,degraded,moslqo,vnsim")?;
    for outcome in outcomes {
        let (mos, vnsim) = match &outcome.result {
            Ok(r) => (format!("{:.6}", r.moslqo), format!("{:.6}", r.vnsim)),
            Err(_) => (String::new(), String::new()),
        };
        writeln!(
            out,
            "{},{},{},{}",
            outcome.reference.display(),
            outcome.degraded.display(),
            mos,
            vnsim
        )?;
    }
    Ok(())
}

pub fn save_results_csv(path: &Path, outcomes: &[PairOutcome]) -> Result<()> {
    let mut file = fs::File::create(path)
        .with_context(|| format!("Failed to create results file: {}", path.display()))?;
    write_results_csv(&mut file, outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_header() {
        let pairs = parse_batch_csv("reference,degraded\na.wav,b.wav\n\n c.wav , d.wav \n").unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].reference, PathBuf::from("c.wav"));
        assert_eq!(pairs[1].degraded, PathBuf::from("d.wav"));
    }

    #[test]
    fn test_parse_without_header() {
        let pairs = parse_batch_csv("a.wav,b.wav").unwrap();
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_parse_rejects_bad_rows() {
        assert!(parse_batch_csv("reference,degraded\nonly_one.wav\n").is_err());
        assert!(parse_batch_csv("a.wav,b.wav,c.wav\n").is_err());
    }

    #[test]
    fn test_cache_keeps_config_error_per_rate() {
        use clap::Parser;
        let args = Args::try_parse_from(["visqol", "--batch-input-csv", "p.csv", "--results-csv", "r.csv"])
            .unwrap();
        let cache = ApiCache::new(&args);

        assert!(cache.get(48_000).is_ok());
        let rejected = cache.get(44_100);
        let message = match &*rejected {
            Err(message) => message.clone(),
            Ok(_) => panic!("44.1 kHz must be rejected without the override"),
        };
        assert!(message.contains("48k is the only sample rate"));
        assert!(Arc::ptr_eq(&rejected, &cache.get(44_100)));
    }

    #[test]
    fn test_results_csv_rows() {
        let outcomes = vec![PairOutcome {
            reference: PathBuf::from("a.wav"),
            degraded: PathBuf::from("b.wav"),
            result: Err("broken".to_string()),
        }];
        let mut buf = Vec::new();
        write_results_csv(&mut buf, &outcomes).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "reference,degraded,moslqo,vnsim\na.wav,b.wav,,\n");
    }
}
