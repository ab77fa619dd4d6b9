//! Common test utilities and fixture helpers.
//!
//! The sample network is a handful of New England VORs joined by invented
//! airways, small enough to reason about by hand:
//!
//! * low: V1 BOS-PVD-ORW-CCC-JFK, V2 BOS-GDM-ALB, V3 PVD-HFD-BDL-ALB,
//!   V4 ORW-HFD, V9 BDL-<gap>-GDM
//! * high: J1 BOS-ALB, J2 BOS-JFK
//!
//! LONE is a fix on no airway; KBOS is an airport just west of BOS.

use std::path::{Path, PathBuf};

use airnav_lib::{GeoPos, Level, MemoryNavCache, Positioned, PositionedType};
use rusqlite::{params, Connection};
use tempfile::TempDir;

pub const FIXES: &[(i64, &str, &str, f64, f64)] = &[
    (1, "BOS", "vor", 42.357, -70.990),
    (2, "PVD", "vor", 41.724, -71.429),
    (3, "ORW", "vor", 41.556, -71.999),
    (4, "CCC", "vor", 40.930, -72.799),
    (5, "JFK", "vor", 40.633, -73.771),
    (6, "GDM", "vor", 42.546, -72.058),
    (7, "ALB", "vor", 42.747, -73.803),
    (8, "HFD", "vor", 41.641, -72.547),
    (9, "BDL", "vor", 41.941, -72.689),
    (10, "LONE", "fix", 44.000, -69.000),
    (11, "KBOS", "airport", 42.3656, -71.0096),
];

pub const AIRWAYS: &[(i64, &str, Level, &[Option<i64>])] = &[
    (101, "V1", Level::Low, &[Some(1), Some(2), Some(3), Some(4), Some(5)]),
    (102, "V2", Level::Low, &[Some(1), Some(6), Some(7)]),
    (103, "V3", Level::Low, &[Some(2), Some(8), Some(9), Some(7)]),
    (104, "V4", Level::Low, &[Some(3), Some(8)]),
    (109, "V9", Level::Low, &[Some(9), None, Some(6)]),
    (201, "J1", Level::High, &[Some(1), Some(7)]),
    (202, "J2", Level::High, &[Some(1), Some(5)]),
];

fn altitudes(level: Level) -> (i32, i32) {
    match level {
        Level::High => (18_000, 45_000),
        _ => (1_200, 17_999),
    }
}

/// Sample network as an in-memory cache.
#[allow(dead_code)]
pub fn sample_cache() -> MemoryNavCache {
    let cache = MemoryNavCache::new();
    for &(guid, ident, kind, lat, lon) in FIXES {
        let kind: PositionedType = kind.parse().expect("fixture type");
        cache.insert_positioned(Positioned::new(guid, ident, kind, GeoPos::new(lat, lon)));
    }
    for &(id, ident, level, sequence) in AIRWAYS {
        let (bottom, top) = altitudes(level);
        cache.insert_airway(airnav_lib::AirwayRecord {
            id,
            ident: ident.to_string(),
            level,
            bottom_altitude_ft: bottom,
            top_altitude_ft: top,
        });
        cache
            .insert_airway_sequence(id, sequence.to_vec())
            .expect("fixture sequence");
    }
    cache
}

/// Write the sample network as a SQLite dataset.
#[allow(dead_code)]
pub fn write_sample_dataset(path: &Path) {
    let conn = Connection::open(path).expect("create dataset");
    conn.execute_batch(
        "CREATE TABLE positioned (
             guid INTEGER PRIMARY KEY,
             ident TEXT NOT NULL,
             name TEXT,
             type TEXT NOT NULL,
             lat REAL NOT NULL,
             lon REAL NOT NULL
         );
         CREATE TABLE airway (
             id INTEGER PRIMARY KEY,
             ident TEXT NOT NULL,
             level TEXT NOT NULL,
             bottom_ft INTEGER,
             top_ft INTEGER
         );
         CREATE TABLE airway_fix (
             airway_id INTEGER NOT NULL,
             seq INTEGER NOT NULL,
             guid INTEGER
         );",
    )
    .expect("create schema");

    for &(guid, ident, kind, lat, lon) in FIXES {
        conn.execute(
            "INSERT INTO positioned (guid, ident, name, type, lat, lon) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![guid, ident, format!("{ident} test navaid"), kind, lat, lon],
        )
        .expect("insert positioned");
    }
    for &(id, ident, level, sequence) in AIRWAYS {
        let (bottom, top) = altitudes(level);
        conn.execute(
            "INSERT INTO airway (id, ident, level, bottom_ft, top_ft) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, ident, level.to_string(), bottom, top],
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

/// Temporary directory holding the sample dataset as `navdata.db`.
#[allow(dead_code)]
pub struct DatasetDir {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl DatasetDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        write_sample_dataset(&dir.path().join("navdata.db"));
        Self { dir }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("navdata.db")
    }
}
