use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info, warn};

use crate::airway::{AirwayId, Level};
use crate::error::{Error, Result};
use crate::geo::GeoPos;
use crate::positioned::{Guid, Positioned, PositionedType};
use crate::store::{AirwayRecord, MemoryNavCache, NavDataStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SchemaDefinition {
    /// `positioned.name` is present.
    positioned_names: bool,
    /// `airway.bottom_ft` / `airway.top_ft` are present.
    airway_altitudes: bool,
    /// Edges are listed in `airway_edge` instead of derived from sequences.
    explicit_edges: bool,
}

/// Load a navigation dataset into an in-memory cache.
///
/// The dataset holds `positioned`, `airway` and `airway_fix` tables, where
/// `airway_fix` lists each airway's elements in `seq` order and a NULL
/// `guid` marks a discontinuity. When an `airway_edge` table exists its rows
/// are the network edges; otherwise every contiguous element pair becomes an
/// edge in both directions. Rows referencing unknown entities are skipped
/// with a warning rather than failing the whole load.
pub fn load_nav_cache(db_path: &Path) -> Result<MemoryNavCache> {
    if !db_path.exists() {
        return Err(Error::DatasetNotFound {
            path: db_path.to_path_buf(),
        });
    }

    let connection = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let schema = detect_schema(&connection)?;
    debug!(?schema, path = %db_path.display(), "loading navigation dataset");

    let cache = MemoryNavCache::new();
    load_positioned(&connection, &schema, &cache)?;
    load_airways(&connection, &schema, &cache)?;
    load_sequences(&connection, &schema, &cache)?;
    if schema.explicit_edges {
        load_edges(&connection, &cache)?;
    }

    info!(
        positioned = cache.positioned_count(),
        airways = cache.airway_count(),
        low_edges = cache.edge_count(Level::Low),
        high_edges = cache.edge_count(Level::High),
        path = %db_path.display(),
        "loaded navigation dataset"
    );
    Ok(cache)
}

fn detect_schema(connection: &Connection) -> Result<SchemaDefinition> {
    let required: [(&str, &[&str]); 3] = [
        ("positioned", &["guid", "ident", "type", "lat", "lon"]),
        ("airway", &["id", "ident", "level"]),
        ("airway_fix", &["airway_id", "seq", "guid"]),
    ];
    for (table, columns) in required {
        if !table_exists(connection, table)? || !table_has_columns(connection, table, columns)? {
            return Err(Error::UnsupportedSchema);
        }
    }

    let explicit_edges = table_exists(connection, "airway_edge")?
        && table_has_columns(
            connection,
            "airway_edge",
            &["airway_id", "from_guid", "to_guid"],
        )?;

    Ok(SchemaDefinition {
        positioned_names: table_has_columns(connection, "positioned", &["name"])?,
        airway_altitudes: table_has_columns(connection, "airway", &["bottom_ft", "top_ft"])?,
        explicit_edges,
    })
}

fn load_positioned(
    connection: &Connection,
    schema: &SchemaDefinition,
    cache: &MemoryNavCache,
) -> Result<()> {
    let name = if schema.positioned_names {
        "name"
    } else {
        "NULL"
    };
    let sql = format!("SELECT guid, ident, type, lat, lon, {name} FROM positioned");
    let mut stmt = connection.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, Guid>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, f64>(3)?,
            row.get::<_, f64>(4)?,
            row.get::<_, Option<String>>(5)?,
        ))
    })?;

    let mut skipped = 0usize;
    for row in rows {
        let (guid, ident, kind, lat, lon, name) = row?;
        let Ok(kind) = kind.parse::<PositionedType>() else {
            skipped += 1;
            continue;
        };
        let mut positioned = Positioned::new(guid, ident, kind, GeoPos::new(lat, lon));
        if let Some(name) = name {
            positioned = positioned.with_name(name);
        }
        cache.insert_positioned(positioned);
    }

    if skipped > 0 {
        warn!(skipped, "ignored positioned rows with an unknown type");
    }
    Ok(())
}

fn load_airways(
    connection: &Connection,
    schema: &SchemaDefinition,
    cache: &MemoryNavCache,
) -> Result<()> {
    let altitudes = if schema.airway_altitudes {
        "bottom_ft, top_ft"
    } else {
        "0, 0"
    };
    let sql = format!("SELECT id, ident, CAST(level AS TEXT), {altitudes} FROM airway");
    let mut stmt = connection.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, AirwayId>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<i32>>(3)?,
            row.get::<_, Option<i32>>(4)?,
        ))
    })?;

    let mut skipped = 0usize;
    for row in rows {
        let (id, ident, level, bottom, top) = row?;
        let level = match level.parse::<Level>() {
            Ok(level @ (Level::Low | Level::High)) => level,
            _ => {
                skipped += 1;
                continue;
            }
        };
        cache.insert_airway(AirwayRecord {
            id,
            ident,
            level,
            bottom_altitude_ft: bottom.unwrap_or(0),
            top_altitude_ft: top.unwrap_or(0),
        });
    }

    if skipped > 0 {
        warn!(skipped, "ignored airway rows without a single low/high level");
    }
    Ok(())
}

fn load_sequences(
    connection: &Connection,
    schema: &SchemaDefinition,
    cache: &MemoryNavCache,
) -> Result<()> {
    let mut stmt =
        connection.prepare("SELECT airway_id, guid FROM airway_fix ORDER BY airway_id, seq")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, AirwayId>(0)?, row.get::<_, Option<Guid>>(1)?))
    })?;

    let mut sequences: BTreeMap<AirwayId, Vec<Option<Guid>>> = BTreeMap::new();
    let mut orphaned = 0usize;
    let mut unresolved = 0usize;
    for row in rows {
        let (airway, guid) = row?;
        if cache.load_airway(airway).is_none() {
            orphaned += 1;
            continue;
        }
        // An element that cannot be resolved is treated as a gap so its
        // neighbours are never joined directly.
        let guid = guid.filter(|guid| {
            let known = cache.load_by_id(*guid).is_some();
            if !known {
                unresolved += 1;
            }
            known
        });
        sequences.entry(airway).or_default().push(guid);
    }

    for (airway, sequence) in sequences {
        if schema.explicit_edges {
            cache.set_airway_sequence(airway, sequence)?;
        } else {
            cache.insert_airway_sequence(airway, sequence)?;
        }
    }

    if orphaned > 0 {
        warn!(orphaned, "ignored airway_fix rows referencing unknown airways");
    }
    if unresolved > 0 {
        warn!(
            unresolved,
            "airway elements referencing unknown positioned entities became discontinuities"
        );
    }
    Ok(())
}

fn load_edges(connection: &Connection, cache: &MemoryNavCache) -> Result<()> {
    let mut stmt = connection.prepare("SELECT airway_id, from_guid, to_guid FROM airway_edge")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, AirwayId>(0)?,
            row.get::<_, Guid>(1)?,
            row.get::<_, Guid>(2)?,
        ))
    })?;

    let mut skipped = 0usize;
    for row in rows {
        let (airway, from, to) = row?;
        let Some(record) = cache.load_airway(airway) else {
            skipped += 1;
            continue;
        };
        if cache.load_by_id(from).is_none() || cache.load_by_id(to).is_none() {
            skipped += 1;
            continue;
        }
        cache.insert_edge(record.level, airway, from, to)?;
    }

    if skipped > 0 {
        warn!(skipped, "ignored airway edges referencing unknown entities");
    }
    Ok(())
}

fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

fn table_has_columns(connection: &Connection, table: &str, required: &[&str]) -> Result<bool> {
    let pragma = format!("PRAGMA table_info('{table}')");
    let mut stmt = connection.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }

    Ok(required.iter().all(|required| {
        columns
            .iter()
            .any(|column| column.eq_ignore_ascii_case(required))
    }))
}
