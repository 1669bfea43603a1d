//! Command-line smoke tests on reduced run sizes.

use std::process::Command;

fn nearkpss_sim() -> Command {
    Command::new(env!("CARGO_BIN_EXE_nearkpss-sim"))
}

#[test]
fn test_default_runs_critical_values() {
    let output = nearkpss_sim()
        .args(["--replications", "40", "--steps", "60"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Running default: critical values simulation"));
    assert!(stdout.contains("LEVEL CASE"));
    assert!(stdout.contains("TREND CASE"));
}

#[test]
fn test_table1_flag() {
    let output = nearkpss_sim()
        .args(["--table1", "--sims", "20", "--seed", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Table 1"));
    assert!(!stdout.contains("LEVEL CASE"));
}

#[test]
fn test_all_flag_runs_every_report() {
    let output = nearkpss_sim()
        .args(["--all", "--replications", "20", "--steps", "40", "--sims", "10"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("LEVEL CASE"));
    assert!(stdout.contains("Rejection Rate"));
    assert!(stdout.contains("Table 1"));
}

#[test]
fn test_invalid_counts_exit_with_failure() {
    let output = nearkpss_sim()
        .args(["--critical-values", "--replications", "0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("replications"));
}
