//! Spawncraft Headless Validation Harness
//!
//! Sweeps the pure scheduling logic without the engine crate.
//! Runs entirely in-process with no ECS, no RNG state, no rendering.
//!
//! Usage:
//!   cargo run -p spawncraft-simtest
//!   cargo run -p spawncraft-simtest -- --verbose

use serde::Deserialize;
use spawncraft_logic::bands::{adjusted_total, select_pass, BandEntry};
use spawncraft_logic::constants::UNCONDITIONAL;
use spawncraft_logic::counts;
use spawncraft_logic::gate::{window_allows, GateLatch};
use spawncraft_logic::policy::{DestructionPolicy, TeardownAction};

// ── Band fixtures (selection cases checked against fixed rolls) ─────────
const BAND_FIXTURES_JSON: &str = r#"[
    { "name": "two bands, low roll",       "probabilities": [0.5, 1.0],        "roll": 0.3,  "fired": [0] },
    { "name": "two bands, high roll",      "probabilities": [0.5, 1.0],        "roll": 0.7,  "fired": [1] },
    { "name": "reset on decrease",         "probabilities": [0.99, 0.01],      "roll": 0.995, "fired": [1] },
    { "name": "unconditional plus pick",   "probabilities": [-1.0, 0.5, 1.0],  "roll": 0.7,  "fired": [0, 2] },
    { "name": "pick ends pass",            "probabilities": [0.5, -1.0],       "roll": 0.1,  "fired": [0] },
    { "name": "three ascending bands",     "probabilities": [0.2, 0.6, 1.0],   "roll": 0.45, "fired": [1] }
]"#;

#[derive(Debug, Deserialize)]
struct BandFixture {
    name: String,
    probabilities: Vec<f32>,
    roll: f32,
    fired: Vec<usize>,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed,
        detail,
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Spawncraft Logic Harness ===\n");

    let mut results = Vec::new();

    // 1. Band selection over JSON fixtures
    results.extend(validate_band_fixtures(verbose));

    // 2. Capacity math sweep
    results.extend(validate_counts(verbose));

    // 3. Gate windows
    results.extend(validate_windows(verbose));

    // 4. Latch debounce sequences
    results.extend(validate_latch(verbose));

    // 5. Destruction-policy action table
    results.extend(validate_policy(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for result in &results {
        if !result.passed {
            println!("FAIL {}: {}", result.name, result.detail);
        }
    }
    println!("\n{} checks: {} passed, {} failed", total, passed, failed);
    if failed > 0 {
        std::process::exit(1);
    }
}

fn entries_from(probabilities: &[f32]) -> Vec<BandEntry> {
    probabilities
        .iter()
        .map(|&probability| BandEntry {
            probability,
            placeholder: false,
            maxed: false,
        })
        .collect()
}

fn validate_band_fixtures(verbose: bool) -> Vec<TestResult> {
    let fixtures: Vec<BandFixture> =
        serde_json::from_str(BAND_FIXTURES_JSON).expect("band fixtures parse");
    let mut results = Vec::new();

    for fixture in fixtures {
        let entries = entries_from(&fixture.probabilities);
        let outcome = select_pass(&entries, fixture.roll);
        if verbose {
            println!(
                "band '{}': roll {} over {:?} -> {:?}",
                fixture.name, fixture.roll, fixture.probabilities, outcome.fired
            );
        }
        results.push(check(
            &format!("band: {}", fixture.name),
            outcome.fired == fixture.fired,
            format!("expected {:?}, got {:?}", fixture.fired, outcome.fired),
        ));
    }

    // Totals: unconditional entries contribute nothing.
    let entries = entries_from(&[UNCONDITIONAL, 0.5, 1.0]);
    let total = adjusted_total(&entries);
    results.push(check(
        "band: unconditional excluded from total",
        (total - 1.0).abs() < 1e-6,
        format!("total {}", total),
    ));

    // Placeholder bands absorb rolls without firing.
    let mut entries = entries_from(&[0.5, 1.0]);
    entries[0].placeholder = true;
    let outcome = select_pass(&entries, 0.2);
    results.push(check(
        "band: placeholder absorbs roll",
        outcome.fired.is_empty(),
        format!("fired {:?}", outcome.fired),
    ));

    results
}

fn validate_counts(verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();

    results.push(check(
        "counts: inherit resolves to generator bound",
        counts::effective_max(0, 6) == 6 && counts::effective_max(2, 6) == 2,
        String::new(),
    ));
    results.push(check(
        "counts: unbounded max never reached",
        !counts::max_reached(10_000, 0) && counts::max_reached(3, 3),
        String::new(),
    ));
    results.push(check(
        "counts: drift still reads as reached",
        counts::max_reached(5, 3),
        String::new(),
    ));

    // Batch sizing sweep over both ceilings.
    let mut batch_ok = true;
    for profile_remaining in 0..4u32 {
        for generator_remaining in 0..4u32 {
            let batch = counts::batch_size(profile_remaining, generator_remaining);
            if batch > profile_remaining || batch > generator_remaining {
                batch_ok = false;
            }
            if verbose {
                println!(
                    "batch({}, {}) = {}",
                    profile_remaining, generator_remaining, batch
                );
            }
        }
    }
    results.push(check(
        "counts: batch never exceeds either ceiling",
        batch_ok,
        String::new(),
    ));

    results
}

fn validate_windows(verbose: bool) -> Vec<TestResult> {
    let cases: &[(i64, Option<i64>, Option<i64>, bool)] = &[
        (50, None, None, true),
        (50, Some(100), None, false),
        (100, Some(100), None, true),
        (150, Some(100), Some(200), true),
        (250, Some(100), Some(200), false),
        (200, None, Some(200), true),
    ];

    let mut all_ok = true;
    for &(now, start, end, expected) in cases {
        let got = window_allows(now, start, end);
        if verbose {
            println!("window now={} start={:?} end={:?} -> {}", now, start, end, got);
        }
        if got != expected {
            all_ok = false;
        }
    }
    vec![check("gate: window bounds", all_ok, String::new())]
}

fn validate_latch(verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();

    // Transient flip never commits.
    let mut latch = GateLatch::default();
    let transient = !latch.observe(true, false) && !latch.observe(true, true);
    results.push(check("latch: transient flip held", transient, String::new()));

    // Two consecutive disagreements commit.
    let mut latch = GateLatch::default();
    let committed = !latch.observe(true, false) && latch.observe(true, false);
    results.push(check("latch: double observation commits", committed, String::new()));

    // Long agreement never commits.
    let mut latch = GateLatch::default();
    let mut stable = true;
    for _ in 0..10 {
        if latch.observe(false, false) {
            stable = false;
        }
    }
    results.push(check("latch: agreement stays stable", stable, String::new()));

    if verbose {
        println!("latch sequences validated");
    }
    results
}

fn validate_policy(verbose: bool) -> Vec<TestResult> {
    let table = [
        (DestructionPolicy::Nothing, true, TeardownAction::Leave),
        (DestructionPolicy::Nothing, false, TeardownAction::Leave),
        (DestructionPolicy::Destroy, true, TeardownAction::Despawn),
        (DestructionPolicy::Destroy, false, TeardownAction::Despawn),
        (DestructionPolicy::Kill, true, TeardownAction::Lethal),
        (DestructionPolicy::Kill, false, TeardownAction::Despawn),
    ];

    let mut all_ok = true;
    for (policy, is_creature, expected) in table {
        let got = policy.action_for(is_creature);
        if verbose {
            println!("{:?} creature={} -> {:?}", policy, is_creature, got);
        }
        if got != expected {
            all_ok = false;
        }
    }
    vec![check("policy: action table", all_ok, String::new())]
}
