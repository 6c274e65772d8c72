use std::fs;
use std::path::Path;

use assert_cmd::Command;
use chrono::{Local, TimeZone};
use snag::{
    persistence::SqlitePersistence,
    stats::{SessionMetrics, StatsRecord, StatsStore},
    HISTORY_KEY,
};
use tempfile::{tempdir, TempDir};

// Every run gets its own HOME so history, config and logs stay in the tempdir
fn snag(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("snag").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_DATA_HOME", home.join(".local").join("share"))
        .env_remove("SNAG_LOG");
    cmd
}

fn db_path(home: &Path) -> std::path::PathBuf {
    home.join(".local").join("state").join("snag").join("snag.db")
}

fn seeded_home(hits: &[u32]) -> TempDir {
    let home = tempdir().unwrap();
    let backend = SqlitePersistence::open(db_path(home.path()), HISTORY_KEY).unwrap();
    let mut store = StatsStore::open(backend);
    for (i, &h) in hits.iter().enumerate() {
        let ts = Local.with_ymd_and_hms(2024, 2, 1, 9, i as u32, 0).unwrap();
        store.append(StatsRecord::new(ts, SessionMetrics::compute(h, 120)));
    }
    home
}

fn stored_sessions(home: &Path) -> usize {
    let backend = SqlitePersistence::open(db_path(home), HISTORY_KEY).unwrap();
    StatsStore::open(backend).len()
}

#[test]
fn history_on_fresh_home_is_empty() {
    let home = tempdir().unwrap();
    let out = snag(home.path()).arg("--history").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("No training sessions yet"), "{stdout}");
}

#[test]
fn history_lists_most_recent_first() {
    let home = seeded_home(&[3, 10]);
    let out = snag(home.path()).arg("--history").output().unwrap();
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].starts_with("date"));
    assert!(lines[1].starts_with("2024-02-01 09:01"), "{stdout}");
    assert!(lines[2].starts_with("2024-02-01 09:00"), "{stdout}");
    assert!(stdout.contains("2 sessions"));
}

#[test]
fn export_csv_writes_all_sessions() {
    let home = seeded_home(&[10, 1, 4]);
    let csv_path = home.path().join("out.csv");
    snag(home.path())
        .arg("--export-csv")
        .arg(&csv_path)
        .assert()
        .success();

    let text = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert!(text.starts_with("timestamp,hits,"));
}

#[test]
fn clear_history_declined_keeps_sessions() {
    let home = seeded_home(&[5, 6]);
    let out = snag(home.path())
        .arg("--clear-history")
        .write_stdin("n\n")
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8(out.stdout).unwrap().contains("history kept"));
    assert_eq!(stored_sessions(home.path()), 2);
}

#[test]
fn clear_history_empty_answer_keeps_sessions() {
    let home = seeded_home(&[5]);
    snag(home.path())
        .arg("--clear-history")
        .write_stdin("\n")
        .assert()
        .success();
    assert_eq!(stored_sessions(home.path()), 1);
}

#[test]
fn clear_history_confirmed_wipes_sessions() {
    let home = seeded_home(&[5, 6, 7]);
    let out = snag(home.path())
        .arg("--clear-history")
        .write_stdin("yes\n")
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8(out.stdout).unwrap().contains("history cleared"));
    assert_eq!(stored_sessions(home.path()), 0);
}

#[test]
fn invalid_settings_are_rejected() {
    let home = tempdir().unwrap();
    snag(home.path())
        .args(["--history", "-s", "0"])
        .assert()
        .failure();
}

#[test]
fn non_finite_geometry_is_rejected() {
    let home = tempdir().unwrap();
    snag(home.path())
        .args(["--history", "--width", "inf"])
        .assert()
        .failure();
    snag(home.path())
        .args(["--history", "-r", "NaN"])
        .assert()
        .failure();
}

#[test]
fn non_tty_stdin_is_refused() {
    let home = tempdir().unwrap();
    snag(home.path()).write_stdin("").assert().failure();
}

#[test]
fn save_config_persists_overrides() {
    let home = tempdir().unwrap();
    snag(home.path())
        .args(["--save-config", "-s", "45", "--history"])
        .assert()
        .success();

    let config = home.path().join(".config").join("snag").join("config.json");
    let text = fs::read_to_string(config).unwrap();
    assert!(text.contains("\"session_secs\": 45"), "{text}");
}
