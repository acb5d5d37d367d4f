use std::process::Command;

fn heist() -> Command {
    Command::new(env!("CARGO_BIN_EXE_heist"))
}

#[test]
fn bundled_scenario_prints_a_summary() {
    let output = heist()
        .args(["--ticks", "400", "--show-frame"])
        .output()
        .expect("failed to launch heist binary");

    assert!(output.status.success(), "heist should exit cleanly");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("loot: "), "summary missing from {stdout}");
    assert!(stdout.contains("guard 1: "));
    assert!(stdout.contains("guard 2: "));
    assert!(stdout.contains('@'), "final frame missing from {stdout}");
}

#[test]
fn missing_scenario_file_is_reported() {
    let output = heist()
        .args(["--scenario", "does/not/exist.toml"])
        .output()
        .expect("failed to launch heist binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does/not/exist.toml"), "unexpected error: {stderr}");
}

#[test]
fn zero_tick_length_is_rejected() {
    let output = heist()
        .args(["--tick-ms", "0"])
        .output()
        .expect("failed to launch heist binary");

    assert!(!output.status.success());
}
