use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "wordquest-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_wordquest-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("adventure"));
}

#[test]
fn cli_runs_scenarios_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_wordquest-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--report",
            "json",
            "--scenarios",
            "daily,spam",
            "--iterations",
            "1",
            "--seeds",
            "1,2",
            "--today",
            "2024-06-01",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("WordQuest Automated Tester"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_path).expect("read report"))
            .expect("report is json");
    let rows = report.as_array().expect("array of results");
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|row| row["passed"] == true));
}

#[test]
fn cli_daily_play_persists_profile_and_shop_reads_it() {
    let exe = env!("CARGO_BIN_EXE_wordquest-tester");
    let dir = temp_path("play");
    let profile = dir.join("scores.json");

    let status = Command::new(exe)
        .args([
            "--mode",
            "daily",
            "--accuracy",
            "1.0",
            "--today",
            "2024-06-01",
            "--profile",
        ])
        .arg(&profile)
        .status()
        .expect("run daily");
    assert!(status.success());

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&profile).expect("profile written"))
            .expect("profile is json");
    assert_eq!(saved["daily_streak"], 1);
    assert_eq!(saved["last_daily_date"], "2024-06-01");
    assert_eq!(saved["coin_balance"], 135);

    let output_path = temp_path("shop");
    let status = Command::new(exe)
        .args([
            "--unlock-skin",
            "electric_blue",
            "--activate-skin",
            "electric_blue",
            "--show-profile",
            "--report",
            "json",
            "--profile",
        ])
        .arg(&profile)
        .arg("--output")
        .arg(&output_path)
        .status()
        .expect("run shop");
    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("read shop output");
    assert!(content.contains("Unlocked electric_blue; balance now 75"));
    assert!(content.contains("\"active_skin_name\": \"Electric Blue\""));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn cli_verbose_announces_catalog_and_bot() {
    let exe = env!("CARGO_BIN_EXE_wordquest-tester");
    let output = Command::new(exe)
        .args(["--verbose", "--scenarios", "daily", "--iterations", "1"])
        .args(["--today", "2024-06-01"])
        .output()
        .expect("run scenarios");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Catalog: built-in"));

    let dir = temp_path("verbose");
    let output = Command::new(exe)
        .args([
            "--verbose",
            "--mode",
            "daily",
            "--accuracy",
            "0.5",
            "--today",
            "2024-06-01",
        ])
        .arg("--profile")
        .arg(dir.join("scores.json"))
        .output()
        .expect("run daily");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Answer bot accuracy: 50%"));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn cli_rejects_bad_today() {
    let exe = env!("CARGO_BIN_EXE_wordquest-tester");
    let output = Command::new(exe)
        .args(["--scenarios", "daily", "--today", "tomorrow"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("YYYY-MM-DD"));
}
