//! Kendall rank correlation regression test

use coloc_core::{Descriptor, Mask};
use coloc_stats::kendall::{kendall_tau_b, tau_from_ranks};
use coloc_stats::spearman::spearman_rho;
use coloc_stats::{Algorithm, MaxKendallTau, MaxTauOptions};
use coloc_test::RegParams;
use coloc_test::fixtures::correlated_pair;

#[test]
fn kendall_reg_tau() {
    let mut rp = RegParams::new("kendall_tau");

    // --- Test 1: fully concordant and fully discordant ranks ---
    let up: Vec<f64> = (1..=50).map(f64::from).collect();
    let down: Vec<f64> = up.iter().rev().copied().collect();
    rp.compare_values(1.0, tau_from_ranks(&up, &up), 0.0);
    rp.compare_values(-1.0, tau_from_ranks(&up, &down), 0.0);

    // --- Test 2: tau-b agrees with the O(n^2) definition ---
    let x = [4.0, 1.0, 3.0, 3.0, 7.0, 0.0, 2.0, 7.0, 5.0];
    let y = [2.0, 2.0, 5.0, 1.0, 6.0, 0.0, 3.0, 8.0, 5.0];
    let (mut concordant, mut discordant, mut tx, mut ty) = (0.0_f64, 0.0_f64, 0.0_f64, 0.0_f64);
    for i in 0..x.len() {
        for j in i + 1..x.len() {
            let s = (x[i] - x[j]) * (y[i] - y[j]);
            if s > 0.0 {
                concordant += 1.0;
            } else if s < 0.0 {
                discordant += 1.0;
            }
            // Pairs tied in both channels count for neither.
            if x[i] == x[j] && y[i] != y[j] {
                tx += 1.0;
            }
            if y[i] == y[j] && x[i] != x[j] {
                ty += 1.0;
            }
        }
    }
    let expected =
        (concordant - discordant) / ((concordant + discordant + tx) * (concordant + discordant + ty)).sqrt();
    let tau = kendall_tau_b(x.into_iter().zip(y)).unwrap();
    rp.compare_values(expected, tau, 1e-12);

    // --- Test 3: tau-b follows the sign of Spearman's rho ---
    let (a, b) = correlated_pair(&[32, 32], 2.0, 30.0, 12).unwrap();
    let d = Descriptor::new(a, b, Mask::full(&[32, 32]).unwrap()).unwrap();
    let tau = kendall_tau_b(d.pairs()).unwrap();
    let rho = spearman_rho(d.pairs()).unwrap();
    eprintln!("  tau-b = {tau:.4}, rho = {rho:.4}");
    rp.compare_bool(true, tau > 0.0 && rho > 0.0);
    rp.compare_bool(true, tau <= rho);

    assert!(rp.cleanup(), "kendall tau regression test failed");
}

#[test]
fn kendall_reg_max_tau() {
    let mut rp = RegParams::new("kendall_max_tau");

    let (a, b) = correlated_pair(&[48, 48], 3.0, 10.0, 2).unwrap();
    let d = Descriptor::new(a, b, Mask::full(&[48, 48]).unwrap()).unwrap();
    let options = MaxTauOptions {
        randomizations: 6,
        seed: 77,
    };

    // --- Test 1: the statistic and its p-value ---
    let mut stage = MaxKendallTau::new(options);
    stage.execute(&d).unwrap();
    let observed = stage.observed().unwrap();
    eprintln!(
        "  max tau = {:.4}, p = {:.4}, rank thresholds = ({}, {})",
        observed.tau,
        stage.p_value(),
        observed.rank_threshold1,
        observed.rank_threshold2
    );
    rp.compare_bool(true, observed.tau > 0.0);
    rp.compare_bool(true, observed.rank_threshold1 >= d.pixel_count() / 2);
    rp.compare_values(6.0, stage.distribution().len() as f64, 0.0);
    rp.compare_bool(true, stage.p_value() <= 0.5);

    // --- Test 2: the same seed reproduces the run ---
    let mut again = MaxKendallTau::new(options);
    again.execute(&d).unwrap();
    rp.compare_values(observed.tau, again.observed().unwrap().tau, 0.0);
    rp.compare_values(stage.p_value(), again.p_value(), 0.0);

    assert!(rp.cleanup(), "max kendall tau regression test failed");
}
