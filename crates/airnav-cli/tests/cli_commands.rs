use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::{params, Connection};
use tempfile::{tempdir, TempDir};

const FIXES: &[(i64, &str, &str, f64, f64)] = &[
    (1, "BOS", "vor", 42.357, -70.990),
    (2, "PVD", "vor", 41.724, -71.429),
    (3, "ORW", "vor", 41.556, -71.999),
    (4, "CCC", "vor", 40.930, -72.799),
    (5, "JFK", "vor", 40.633, -73.771),
    (6, "GDM", "vor", 42.546, -72.058),
    (7, "ALB", "vor", 42.747, -73.803),
    (8, "HFD", "vor", 41.641, -72.547),
    (9, "BDL", "vor", 41.941, -72.689),
];

const AIRWAYS: &[(i64, &str, &str, &[Option<i64>])] = &[
    (101, "V1", "low", &[Some(1), Some(2), Some(3), Some(4), Some(5)]),
    (102, "V2", "low", &[Some(1), Some(6), Some(7)]),
    (103, "V3", "low", &[Some(2), Some(8), Some(9), Some(7)]),
    (109, "V9", "low", &[Some(9), None, Some(6)]),
    (202, "J2", "high", &[Some(1), Some(5)]),
];

fn write_dataset(path: &Path) {
    let conn = Connection::open(path).expect("create dataset");
    conn.execute_batch(
        "CREATE TABLE positioned (guid INTEGER PRIMARY KEY, ident TEXT, type TEXT, lat REAL, lon REAL);
         CREATE TABLE airway (id INTEGER PRIMARY KEY, ident TEXT, level TEXT);
         CREATE TABLE airway_fix (airway_id INTEGER, seq INTEGER, guid INTEGER);",
    )
    .expect("create schema");
    for &(guid, ident, kind, lat, lon) in FIXES {
        conn.execute(
            "INSERT INTO positioned (guid, ident, type, lat, lon) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![guid, ident, kind, lat, lon],
        )
        .expect("insert positioned");
    }
    for &(id, ident, level, sequence) in AIRWAYS {
        conn.execute(
            "INSERT INTO airway (id, ident, level) VALUES (?1, ?2, ?3)",
            params![id, ident, level],
        )
        .expect("insert airway");
        for (seq, guid) in sequence.iter().enumerate() {
            conn.execute(
                "INSERT INTO airway_fix (airway_id, seq, guid) VALUES (?1, ?2, ?3)",
                params![id, seq as i64, guid],
            )
            .expect("insert airway element");
        }
    }
}

fn cli() -> Command {
    cargo_bin_cmd!("airnav-cli")
}

fn prepare_command() -> (Command, TempDir) {
    let temp_dir = tempdir().expect("create temp dir");
    write_dataset(&temp_dir.path().join("navdata.db"));
    let mut cmd = cli();
    cmd.env("RUST_LOG", "error")
        .env_remove("AIRNAV_DATA_DIR")
        .arg("--data-dir")
        .arg(temp_dir.path());
    (cmd, temp_dir)
}

#[test]
fn route_on_low_network_follows_v1() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["route", "--from", "BOS", "--to", "JFK", "--level", "low"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Route: BOS -> JFK (4 legs"))
        .stdout(predicate::str::contains("ORW"))
        .stdout(predicate::str::contains("V1"));
}

#[test]
fn route_defaults_to_high_network() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["route", "--from", "BOS", "--to", "JFK"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("(1 legs"))
        .stdout(predicate::str::contains("J2"));
}

#[test]
fn json_route_output_is_structured() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["--format", "json", "route", "--from", "BOS", "--to", "JFK", "--level", "low"]);

    let output = cmd.assert().success().get_output().stdout.clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(value["kind"], "route");
    assert_eq!(value["start"]["ident"], "BOS");
    let legs = value["legs"].as_array().expect("legs array");
    assert_eq!(legs.len(), 4);
    assert!(legs.iter().all(|leg| leg["airway"] == "V1"));
}

#[test]
fn via_lists_the_airway_segment() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["via", "--airway", "V3", "--from", "PVD", "--to", "ALB"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Via: PVD -> ALB (3 legs"))
        .stdout(predicate::str::contains("BDL"));
}

#[test]
fn via_across_a_discontinuity_fails() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["via", "--airway", "V9", "--from", "BDL", "--to", "GDM"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid transition on airway V9"));
}

#[test]
fn airway_listing_shows_discontinuity() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["airway", "--ident", "V9"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Airway V9 (low"))
        .stdout(predicate::str::contains("-- discontinuity --"));
}

#[test]
fn unknown_fix_suggests_close_idents() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["route", "--from", "BOX", "--to", "JFK"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown fix: BOX"))
        .stderr(predicate::str::contains("BOS"));
}

#[test]
fn both_level_is_rejected_for_routing() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["route", "--from", "BOS", "--to", "JFK", "--level", "both"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--level must be low or high"));
}

#[test]
fn dataset_directory_comes_from_environment() {
    let temp_dir = tempdir().expect("create temp dir");
    write_dataset(&temp_dir.path().join("navdata.db"));

    cli()
        .env("RUST_LOG", "error")
        .env("AIRNAV_DATA_DIR", temp_dir.path())
        .args(["airway", "--ident", "J2", "--level", "high"])
        .assert()
        .success()
        .stdout(predicate::str::contains("JFK"));
}

#[test]
fn missing_dataset_is_reported() {
    let temp_dir = tempdir().expect("create temp dir");

    cli()
        .env("RUST_LOG", "error")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["airway", "--ident", "V1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("navigation dataset not found"));
}

#[test]
fn invalid_config_file_is_rejected() {
    let (mut cmd, temp) = prepare_command();
    let config_path = temp.path().join("router.json");
    fs::write(&config_path, r#"{ "dog_leg_threshold_deg": 0.0 }"#).expect("write config");

    cmd.arg("--config")
        .arg(&config_path)
        .args(["route", "--from", "BOS", "--to", "JFK"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("router configuration"));
}
