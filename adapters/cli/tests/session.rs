use std::process::Command;

use serde_json::Value;

fn arena_horde(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_arena-horde"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to launch arena-horde")
}

fn json_report(args: &[&str]) -> Value {
    let output = arena_horde(args);
    assert!(output.status.success(), "arena-horde exited with {}", output.status);
    serde_json::from_slice(&output.stdout).expect("stdout holds a JSON report")
}

#[test]
fn json_report_covers_summary_and_diagnostics() {
    let report = json_report(&["--duration-ms", "10000", "--tick-ms", "100", "--json", "--log-level", "warn"]);

    assert_eq!(report["summary"]["wave"], 1);
    assert_eq!(report["summary"]["ticks"], 101);
    assert_eq!(report["summary"]["spawned"], 5);
    assert_eq!(report["diagnostics"]["current_wave"], 1);
    assert_eq!(report["diagnostics"]["effective_spawn_interval_ms"], 2000);
    assert_eq!(report["diagnostics"]["scheduled_spawns"], 0);
}

#[test]
fn seeded_runs_print_identical_reports() {
    let args = ["--seed", "42", "--duration-ms", "40000", "--json", "--log-level", "off"];
    assert_eq!(json_report(&args), json_report(&args));
}

#[test]
fn upgrades_are_applied_before_the_session() {
    let report = json_report(&[
        "--duration-ms",
        "0",
        "--upgrade",
        "culling",
        "--upgrade",
        "horde-master",
        "--json",
        "--log-level",
        "off",
    ]);
    let modifiers = &report["diagnostics"]["raw_modifiers"];
    assert_eq!(modifiers["enemy-health"], 1.5);
    assert_eq!(modifiers["spawn-rate"], 1.15);
}

#[test]
fn bundled_config_runs() {
    let report = json_report(&[
        "--config",
        "configs/arena.toml",
        "--duration-ms",
        "30000",
        "--json",
        "--log-level",
        "off",
    ]);
    assert_eq!(report["summary"]["wave"], 2);
}

#[test]
fn unknown_upgrade_is_rejected() {
    let output = arena_horde(&["--upgrade", "dragon-slayer"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown upgrade 'dragon-slayer'"), "{stderr}");
}

#[test]
fn missing_config_reports_the_path() {
    let output = arena_horde(&["--config", "configs/missing.toml", "--log-level", "off"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("configs/missing.toml"), "{stderr}");
}
