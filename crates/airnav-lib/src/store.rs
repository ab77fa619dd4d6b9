//! Node/edge store: canonical identity of every fix and every directed
//! airway edge, per network level.
//!
//! The router only reads from a [`NavDataStore`] while searching.
//! [`MemoryNavCache`] is the in-process implementation used by the dataset
//! loader and by tests; other hosts can plug in their own store.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::airway::{AirwayId, Level};
use crate::error::{Error, Result};
use crate::positioned::{Guid, Positioned, PositionedRef};

/// Persisted identity and attributes of one airway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirwayRecord {
    pub id: AirwayId,
    pub ident: String,
    pub level: Level,
    pub bottom_altitude_ft: i32,
    pub top_altitude_ft: i32,
}

/// Read interface the router needs from the navigation data cache.
///
/// `level` arguments name a single network (`Level::Low` or `Level::High`);
/// `Level::Both` never matches stored edges.
pub trait NavDataStore: Send + Sync {
    /// Whether `guid` is an endpoint of any edge in the `level` network.
    fn is_in_airway_network(&self, level: Level, guid: Guid) -> bool;

    /// Outward edges from `guid` as `(airway, neighbour)` pairs.
    fn edges_from(&self, level: Level, guid: Guid) -> Vec<(AirwayId, Guid)>;

    fn load_by_id(&self, guid: Guid) -> Option<PositionedRef>;

    /// Resolve an airway id, optionally creating an empty record.
    fn find_airway(&self, level: Level, ident: &str, create_if_absent: bool) -> Option<AirwayId>;

    fn load_airway(&self, id: AirwayId) -> Option<AirwayRecord>;

    /// Ordered element guids of an airway; `None` slots are discontinuities.
    fn airway_waypts(&self, id: AirwayId) -> Option<Vec<Option<Guid>>>;

    /// Load-time edge insertion. Both endpoints must already be known.
    fn insert_edge(&self, level: Level, airway: AirwayId, from: Guid, to: Guid) -> Result<()>;

    /// All entities carrying `ident`.
    fn find_by_ident(&self, ident: &str) -> Vec<PositionedRef>;

    /// Every airway identifier known to the store.
    fn airway_idents(&self) -> Vec<String>;

    /// Every fix identifier known to the store.
    fn positioned_idents(&self) -> Vec<String>;
}

#[derive(Debug, Default)]
struct CacheInner {
    positioned: HashMap<Guid, PositionedRef>,
    by_ident: HashMap<String, Vec<Guid>>,
    airways: HashMap<AirwayId, AirwayRecord>,
    airway_keys: HashMap<(Level, String), AirwayId>,
    airway_fixes: HashMap<AirwayId, Vec<Option<Guid>>>,
    edges: HashMap<(Level, Guid), Vec<(AirwayId, Guid)>>,
    members: HashSet<(Level, Guid)>,
    next_airway_id: AirwayId,
}

/// In-memory navigation data cache.
#[derive(Debug, Default)]
pub struct MemoryNavCache {
    inner: RwLock<CacheInner>,
}

impl MemoryNavCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a positioned entity, replacing any previous entry for its guid.
    pub fn insert_positioned(&self, positioned: Positioned) -> PositionedRef {
        let positioned = PositionedRef::new(positioned);
        let mut inner = self.write();
        let key = positioned.ident.to_ascii_uppercase();
        let guids = inner.by_ident.entry(key).or_default();
        if !guids.contains(&positioned.guid) {
            guids.push(positioned.guid);
        }
        inner.positioned.insert(positioned.guid, positioned.clone());
        positioned
    }

    /// Create (or return the existing) airway record for `(ident, level)`.
    pub fn create_airway(
        &self,
        ident: &str,
        level: Level,
        bottom_altitude_ft: i32,
        top_altitude_ft: i32,
    ) -> AirwayId {
        let mut inner = self.write();
        let id = Self::create_airway_locked(&mut inner, ident, level);
        if let Some(record) = inner.airways.get_mut(&id) {
            record.bottom_altitude_ft = bottom_altitude_ft;
            record.top_altitude_ft = top_altitude_ft;
        }
        id
    }

    /// Register an airway with a known persisted id.
    pub fn insert_airway(&self, record: AirwayRecord) {
        let mut inner = self.write();
        inner.next_airway_id = inner.next_airway_id.max(record.id);
        inner
            .airway_keys
            .insert((record.level, record.ident.clone()), record.id);
        inner.airways.insert(record.id, record);
    }

    fn create_airway_locked(inner: &mut CacheInner, ident: &str, level: Level) -> AirwayId {
        if let Some(id) = inner.airway_keys.get(&(level, ident.to_string())) {
            return *id;
        }
        inner.next_airway_id += 1;
        let id = inner.next_airway_id;
        inner.airways.insert(
            id,
            AirwayRecord {
                id,
                ident: ident.to_string(),
                level,
                bottom_altitude_ft: 0,
                top_altitude_ft: 0,
            },
        );
        inner.airway_keys.insert((level, ident.to_string()), id);
        id
    }

    /// Store the element sequence of an airway and derive its edges.
    ///
    /// Each contiguous pair of elements becomes an edge in both directions
    /// within the airway's level. A `None` slot breaks contiguity.
    pub fn insert_airway_sequence(&self, airway: AirwayId, sequence: Vec<Option<Guid>>) -> Result<()> {
        let level = self.set_airway_sequence(airway, sequence.clone())?;
        for pair in sequence.windows(2) {
            if let [Some(from), Some(to)] = pair {
                self.insert_edge(level, airway, *from, *to)?;
                self.insert_edge(level, airway, *to, *from)?;
            }
        }
        Ok(())
    }

    /// Store the element sequence of an airway without touching its edges,
    /// for datasets that list edges explicitly. Returns the airway's level.
    pub fn set_airway_sequence(&self, airway: AirwayId, sequence: Vec<Option<Guid>>) -> Result<Level> {
        let mut inner = self.write();
        let record = inner
            .airways
            .get(&airway)
            .ok_or_else(|| Error::inconsistency(format!("airway {airway} has no record")))?;
        if let Some(missing) = sequence
            .iter()
            .flatten()
            .find(|guid| !inner.positioned.contains_key(*guid))
        {
            return Err(Error::inconsistency(format!(
                "airway {} references unknown positioned {missing}",
                record.ident
            )));
        }
        let level = record.level;

        debug!(airway, elements = sequence.len(), "stored airway sequence");
        inner.airway_fixes.insert(airway, sequence);
        Ok(level)
    }

    /// Snapshot of every positioned entity, for building a spatial index.
    pub fn positioned(&self) -> Vec<PositionedRef> {
        let mut all: Vec<_> = self.read().positioned.values().cloned().collect();
        all.sort_by_key(|p| p.guid);
        all
    }

    pub fn positioned_count(&self) -> usize {
        self.read().positioned.len()
    }

    pub fn airway_count(&self) -> usize {
        self.read().airways.len()
    }

    /// Number of directed edges in a network.
    pub fn edge_count(&self, level: Level) -> usize {
        self.read()
            .edges
            .iter()
            .filter(|((edge_level, _), _)| *edge_level == level)
            .map(|(_, edges)| edges.len())
            .sum()
    }
}

impl NavDataStore for MemoryNavCache {
    fn is_in_airway_network(&self, level: Level, guid: Guid) -> bool {
        self.read().members.contains(&(level, guid))
    }

    fn edges_from(&self, level: Level, guid: Guid) -> Vec<(AirwayId, Guid)> {
        self.read()
            .edges
            .get(&(level, guid))
            .cloned()
            .unwrap_or_default()
    }

    fn load_by_id(&self, guid: Guid) -> Option<PositionedRef> {
        self.read().positioned.get(&guid).cloned()
    }

    fn find_airway(&self, level: Level, ident: &str, create_if_absent: bool) -> Option<AirwayId> {
        if let Some(id) = self.read().airway_keys.get(&(level, ident.to_string())) {
            return Some(*id);
        }
        if !create_if_absent {
            return None;
        }
        let mut inner = self.write();
        Some(Self::create_airway_locked(&mut inner, ident, level))
    }

    fn load_airway(&self, id: AirwayId) -> Option<AirwayRecord> {
        self.read().airways.get(&id).cloned()
    }

    fn airway_waypts(&self, id: AirwayId) -> Option<Vec<Option<Guid>>> {
        self.read().airway_fixes.get(&id).cloned()
    }

    fn insert_edge(&self, level: Level, airway: AirwayId, from: Guid, to: Guid) -> Result<()> {
        let mut inner = self.write();
        for guid in [from, to] {
            if !inner.positioned.contains_key(&guid) {
                return Err(Error::inconsistency(format!(
                    "edge on airway {airway} references unknown positioned {guid}"
                )));
            }
        }
        if !inner.airways.contains_key(&airway) {
            return Err(Error::inconsistency(format!(
                "edge references unknown airway {airway}"
            )));
        }

        let edges = inner.edges.entry((level, from)).or_default();
        if !edges.contains(&(airway, to)) {
            edges.push((airway, to));
        }
        inner.members.insert((level, from));
        inner.members.insert((level, to));
        Ok(())
    }

    fn find_by_ident(&self, ident: &str) -> Vec<PositionedRef> {
        let inner = self.read();
        inner
            .by_ident
            .get(&ident.to_ascii_uppercase())
            .map(|guids| {
                guids
                    .iter()
                    .filter_map(|guid| inner.positioned.get(guid).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn airway_idents(&self) -> Vec<String> {
        let mut idents: Vec<String> = self
            .read()
            .airways
            .values()
            .map(|record| record.ident.clone())
            .collect();
        idents.sort();
        idents.dedup();
        idents
    }

    fn positioned_idents(&self) -> Vec<String> {
        let mut idents: Vec<String> = self
            .read()
            .positioned
            .values()
            .map(|p| p.ident.clone())
            .collect();
        idents.sort();
        idents.dedup();
        idents
    }
}

/// Similarity floor for suggestions (Jaro-Winkler, case-insensitive).
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Up to `limit` candidates most similar to `query`, best first.
pub fn fuzzy_matches(candidates: &[String], query: &str, limit: usize) -> Vec<String> {
    let query = query.to_ascii_uppercase();
    let mut scored: Vec<(f64, &String)> = candidates
        .iter()
        .map(|candidate| {
            (
                strsim::jaro_winkler(&query, &candidate.to_ascii_uppercase()),
                candidate,
            )
        })
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, candidate)| candidate.clone())
        .collect()
}
