// tests/alignment_test.rs
//
// Sample-level alignment through the public API.

use visqol::core::analysis::{align_and_truncate, globally_align};
use visqol::core::dsp::calc_best_lag;
use visqol::AudioSignal;

const REFERENCE: [f64; 14] = [
    2.0, 2.0, 1.0, 0.1, -3.0, 0.1, 1.0, 2.0, 2.0, 6.0, 8.0, 6.0, 2.0, 2.0,
];
// Degraded copy leading the reference by two samples
const DEGRADED_LEAD: [f64; 14] = [
    1.2, 0.1, -3.3, 0.1, 1.1, 2.2, 2.1, 7.1, 8.3, 6.8, 2.4, 2.2, 2.2, 2.1,
];
// Degraded copy lagging the reference by two samples
const DEGRADED_LAG: [f64; 14] = [
    2.0, 2.0, 2.0, 2.0, 1.0, 0.1, -3.0, 0.1, 1.0, 2.0, 2.0, 6.0, 8.0, 6.0,
];

fn signal(samples: &[f64]) -> AudioSignal {
    AudioSignal::new(samples.to_vec(), 1)
}

#[test]
fn test_positive_lag_pads_degraded() {
    let reference = signal(&REFERENCE);
    let (aligned, lag) = globally_align(&reference, &signal(&DEGRADED_LEAD));
    assert_eq!(lag, 2.0);
    assert_eq!(aligned.len(), REFERENCE.len() + 2);
    assert_eq!(calc_best_lag(&reference.samples, &aligned.samples), 0);
}

#[test]
fn test_negative_lag_cuts_degraded() {
    let reference = signal(&REFERENCE);
    let (aligned, lag) = globally_align(&reference, &signal(&DEGRADED_LAG));
    assert_eq!(lag, -2.0);
    assert_eq!(aligned.len(), REFERENCE.len() - 2);
    assert_eq!(calc_best_lag(&reference.samples, &aligned.samples), 0);
}

#[test]
fn test_no_lag_keeps_degraded() {
    let reference = signal(&REFERENCE);
    let (aligned, lag) = globally_align(&reference, &reference);
    assert_eq!(lag, 0.0);
    assert_eq!(aligned.len(), REFERENCE.len());
}

#[test]
fn test_truncate_to_common_duration() {
    let reference = signal(&REFERENCE);
    let original = reference.duration();

    let (r, d, lag) = align_and_truncate(&reference, &signal(&DEGRADED_LAG));
    assert_eq!(lag, -2.0);
    assert_eq!(d.duration(), original + lag);
    assert_eq!(r.duration(), original + lag);

    let (r, d, lag) = align_and_truncate(&reference, &signal(&DEGRADED_LEAD));
    assert_eq!(lag, 2.0);
    assert_eq!(d.duration(), original - lag);
    assert_eq!(r.duration(), original - lag);
}

#[test]
fn test_implausible_lag_is_ignored() {
    // A single impulse far from the reference content correlates best at a
    // lag beyond half the reference length
    let reference = signal(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    let degraded = signal(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(calc_best_lag(&reference.samples, &degraded.samples), 6);

    let (aligned, lag) = globally_align(&reference, &degraded);
    assert_eq!(lag, 0.0);
    assert_eq!(aligned, degraded);
}
