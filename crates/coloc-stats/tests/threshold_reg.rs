//! Automatic threshold regression test
//!
//! The thresholds must not depend on which channel is called channel 1,
//! and both search strategies must land on a usable background cut.

use coloc_core::{Descriptor, Mask};
use coloc_stats::{
    Algorithm, AutoThresholdRegression, PearsonImplementation, PearsonsCorrelation, ThresholdMode,
    ThresholdStrategy,
};
use coloc_test::RegParams;
use coloc_test::fixtures::correlated_pair;

fn run(d: &Descriptor, strategy: ThresholdStrategy) -> (f64, f64) {
    let mut stage = AutoThresholdRegression::new(strategy, PearsonImplementation::Fast);
    stage.execute(d).unwrap();
    let t = stage.threshold_pair().unwrap();
    (t.ch1_max, t.ch2_max)
}

#[test]
fn threshold_reg_commutative() {
    let mut rp = RegParams::new("threshold_commutative");

    for seed in [3u64, 17, 29] {
        let (a, b) = correlated_pair(&[48, 48], 3.0, 30.0, seed).unwrap();
        let d = Descriptor::new(a, b, Mask::full(&[48, 48]).unwrap()).unwrap();
        let swapped = d.swapped();
        for strategy in [ThresholdStrategy::Bisection, ThresholdStrategy::Costes] {
            let (t1, t2) = run(&d, strategy);
            let (s1, s2) = run(&swapped, strategy);
            eprintln!("  seed {seed} {strategy:?}: ({t1}, {t2}) swapped ({s1}, {s2})");
            rp.compare_values(t1, s2, 1.0);
            rp.compare_values(t2, s1, 1.0);
        }
    }

    assert!(rp.cleanup(), "threshold commutativity regression test failed");
}

#[test]
fn threshold_reg_background() {
    let mut rp = RegParams::new("threshold_background");

    let (a, b) = correlated_pair(&[48, 48], 3.0, 30.0, 5).unwrap();
    let d = Descriptor::new(a, b, Mask::full(&[48, 48]).unwrap()).unwrap();
    let mut stage = AutoThresholdRegression::default();
    stage.execute(&d).unwrap();
    let t = stage.threshold_pair().unwrap();
    let line = stage.line().unwrap();

    // --- Test 1: the thresholds lie on the regression line ---
    // Rounding moves each threshold by at most half a level; clamped
    // thresholds at 0 are off the line.
    if t.ch1_max > 0.0 && t.ch2_max > 0.0 {
        let on_line = t.ch1_max * line.slope + line.intercept;
        rp.compare_values(on_line, t.ch2_max, line.slope.abs().max(1.0) + 1.0);
    }

    // --- Test 2: the background correlates less than the whole image ---
    let pearson = PearsonsCorrelation::default();
    let r_all = pearson.calculate(d.pairs()).unwrap();
    match pearson.calculate_thresholded(&d, &t, ThresholdMode::Below) {
        Ok(r) => {
            eprintln!("  r below threshold = {r:.4}, r = {r_all:.4}");
            rp.compare_bool(true, r < r_all);
        }
        Err(e) => {
            rp.compare_bool(true, e.is_precondition());
        }
    }

    assert!(rp.cleanup(), "threshold background regression test failed");
}
