//! Named, leveled airways and the registry that memoizes them.
//!
//! An [`Airway`] is an ordered sequence of fixes in which an empty slot marks a
//! discontinuity. The sequence is loaded from the store on first use and kept
//! for the lifetime of the instance. [`AirwayRegistry`] hands out one shared
//! instance per `(ident, level)` so repeated lookups never rebuild it.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::positioned::Positioned;
use crate::store::{fuzzy_matches, AirwayRecord, NavDataStore};
use crate::waypoint::Waypt;

/// Persisted airway identifier assigned by the store.
pub type AirwayId = i64;

/// Shared handle to a registered airway.
pub type AirwayRef = Arc<Airway>;

/// Altitude level of an airway network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    High,
    /// Lookup-only: try `High`, then `Low`.
    Both,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Level::Low => "low",
            Level::High => "high",
            Level::Both => "both",
        };
        f.write_str(value)
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "low" | "l" | "1" => Ok(Level::Low),
            "high" | "h" | "2" => Ok(Level::High),
            "both" => Ok(Level::Both),
            other => Err(format!("unknown airway level '{other}'")),
        }
    }
}

/// Lightweight airway attribution attached to generated waypoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AirwayTag {
    pub id: AirwayId,
    pub ident: String,
    pub level: Level,
}

/// One named airway at one level.
pub struct Airway {
    record: AirwayRecord,
    store: Arc<dyn NavDataStore>,
    elements: OnceCell<Vec<Option<Waypt>>>,
}

impl fmt::Debug for Airway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Airway")
            .field("ident", &self.record.ident)
            .field("level", &self.record.level)
            .field("cache_id", &self.record.id)
            .field("loaded", &self.elements.get().is_some())
            .finish()
    }
}

impl Airway {
    pub(crate) fn new(record: AirwayRecord, store: Arc<dyn NavDataStore>) -> Self {
        Self {
            record,
            store,
            elements: OnceCell::new(),
        }
    }

    pub fn ident(&self) -> &str {
        &self.record.ident
    }

    pub fn level(&self) -> Level {
        self.record.level
    }

    pub fn cache_id(&self) -> AirwayId {
        self.record.id
    }

    pub fn top_altitude_ft(&self) -> i32 {
        self.record.top_altitude_ft
    }

    pub fn bottom_altitude_ft(&self) -> i32 {
        self.record.bottom_altitude_ft
    }

    pub fn tag(&self) -> AirwayTag {
        AirwayTag {
            id: self.record.id,
            ident: self.record.ident.clone(),
            level: self.record.level,
        }
    }

    /// Whether the element sequence has been loaded yet.
    pub fn is_loaded(&self) -> bool {
        self.elements.get().is_some()
    }

    /// Load the element sequence from the store on first call.
    ///
    /// Either every element resolves or the airway stays unloaded and the
    /// error is returned; a later call retries.
    pub fn load_waypoints(&self) -> Result<&[Option<Waypt>]> {
        let elements = self.elements.get_or_try_init(|| {
            let guids = self.store.airway_waypts(self.record.id).ok_or_else(|| {
                Error::inconsistency(format!(
                    "airway {} ({}) has no stored element sequence",
                    self.record.ident, self.record.id
                ))
            })?;

            let tag = self.tag();
            let mut elements = Vec::with_capacity(guids.len());
            for guid in guids {
                let Some(guid) = guid else {
                    elements.push(None);
                    continue;
                };
                let positioned = self.store.load_by_id(guid).ok_or_else(|| {
                    Error::inconsistency(format!(
                        "airway {} references unknown positioned {guid}",
                        self.record.ident
                    ))
                })?;
                elements.push(Some(Waypt::navaid(positioned).with_airway(Some(tag.clone()))));
            }

            debug!(
                airway = %self.record.ident,
                level = %self.record.level,
                elements = elements.len(),
                "loaded airway elements"
            );
            Ok::<_, Error>(elements)
        })?;
        Ok(elements.as_slice())
    }

    /// Index of the first element matching `wpt`.
    pub fn find(&self, wpt: &Waypt) -> Result<Option<usize>> {
        let wanted = wpt.to_navaid();
        Ok(self
            .load_waypoints()?
            .iter()
            .position(|element| element.as_ref().is_some_and(|e| e.matches(&wanted))))
    }

    /// Whether a contiguous sub-path runs from `from` to `to`, in either
    /// direction along the airway.
    pub fn can_via(&self, from: &Waypt, to: &Waypt) -> Result<bool> {
        let elements = self.load_waypoints()?;
        let (Some(from_index), Some(to_index)) = (self.find(from)?, self.find(to)?) else {
            return Ok(false);
        };

        Ok(transition_indices(from_index, to_index)
            .into_iter()
            .all(|index| elements[index].is_some()))
    }

    /// Elements after `from` up to and including `to`.
    ///
    /// Fails when either point is not on the airway or a discontinuity lies
    /// between them; callers should check [`Airway::can_via`] first.
    pub fn via(&self, from: &Waypt, to: &Waypt) -> Result<Vec<Waypt>> {
        let elements = self.load_waypoints()?;
        let (Some(from_index), Some(to_index)) = (self.find(from)?, self.find(to)?) else {
            return Err(self.invalid_transition(from, to, "transition points are not on the airway"));
        };

        let mut path = Vec::new();
        for index in transition_indices(from_index, to_index) {
            match &elements[index] {
                Some(element) => path.push(element.clone().flagged_via()),
                None => return Err(self.invalid_transition(from, to, "discontinuity in airway")),
            }
        }
        Ok(path)
    }

    pub fn contains_navaid(&self, navaid: &Positioned) -> Result<bool> {
        Ok(self.load_waypoints()?.iter().flatten().any(|element| {
            element
                .source()
                .is_some_and(|source| source.guid == navaid.guid)
        }))
    }

    /// First element whose ident equals `ident`.
    pub fn find_enroute(&self, ident: &str) -> Result<Option<Waypt>> {
        Ok(self
            .load_waypoints()?
            .iter()
            .flatten()
            .find(|element| element.ident().eq_ignore_ascii_case(ident))
            .cloned())
    }

    fn invalid_transition(&self, from: &Waypt, to: &Waypt, reason: &str) -> Error {
        Error::InvalidTransition {
            airway: self.record.ident.clone(),
            from: from.ident().into_owned(),
            to: to.ident().into_owned(),
            reason: reason.to_string(),
        }
    }
}

/// Element indices walked from `from` (exclusive) to `to` (inclusive).
fn transition_indices(from: usize, to: usize) -> Vec<usize> {
    if from == to {
        vec![to]
    } else if from < to {
        (from + 1..=to).collect()
    } else {
        (to..from).rev().collect()
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    by_key: HashMap<(String, Level), AirwayRef>,
    by_id: HashMap<AirwayId, AirwayRef>,
}

/// Create-on-miss memo of airway instances.
///
/// Entries are only ever added. Readers share the lock; inserts are
/// serialized and re-check for a racing insert before registering.
pub struct AirwayRegistry {
    store: Arc<dyn NavDataStore>,
    inner: RwLock<RegistryInner>,
}

impl fmt::Debug for AirwayRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirwayRegistry")
            .field("len", &self.len())
            .finish()
    }
}

impl AirwayRegistry {
    pub fn new(store: Arc<dyn NavDataStore>) -> Self {
        Self {
            store,
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered airway for `(ident, level)`, resolving it through the
    /// store on first use. `Level::Both` prefers the high-level airway.
    pub fn find_by_ident(&self, ident: &str, level: Level) -> Result<Option<AirwayRef>> {
        if level == Level::Both {
            if let Some(high) = self.find_by_ident(ident, Level::High)? {
                return Ok(Some(high));
            }
            return self.find_by_ident(ident, Level::Low);
        }

        let key = (ident.to_string(), level);
        if let Some(existing) = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_key
            .get(&key)
        {
            return Ok(Some(existing.clone()));
        }

        let Some(id) = self.store.find_airway(level, ident, false) else {
            return Ok(None);
        };
        self.load_by_cache_id(id).map(Some)
    }

    /// Like [`AirwayRegistry::find_by_ident`], but an unknown ident is an
    /// error carrying similar idents.
    pub fn require_by_ident(&self, ident: &str, level: Level) -> Result<AirwayRef> {
        self.find_by_ident(ident, level)?.ok_or_else(|| Error::UnknownAirway {
            ident: ident.to_string(),
            suggestions: fuzzy_matches(&self.store.airway_idents(), ident, 3),
        })
    }

    /// Airway named `ident` that can carry `from` to `to`, preferring high level.
    pub fn find_by_ident_and_via(
        &self,
        ident: &str,
        from: &Waypt,
        to: &Waypt,
    ) -> Result<Option<AirwayRef>> {
        for level in [Level::High, Level::Low] {
            if let Some(airway) = self.find_by_ident(ident, level)? {
                if airway.can_via(from, to)? {
                    return Ok(Some(airway));
                }
            }
        }
        Ok(None)
    }

    /// Airway named `ident` that passes through `navaid`, preferring high level.
    pub fn find_by_ident_and_navaid(
        &self,
        ident: &str,
        navaid: &Positioned,
    ) -> Result<Option<AirwayRef>> {
        for level in [Level::High, Level::Low] {
            if let Some(airway) = self.find_by_ident(ident, level)? {
                if airway.contains_navaid(navaid)? {
                    return Ok(Some(airway));
                }
            }
        }
        Ok(None)
    }

    /// Registered airway for a persisted id.
    pub fn load_by_cache_id(&self, id: AirwayId) -> Result<AirwayRef> {
        if let Some(existing) = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .get(&id)
        {
            return Ok(existing.clone());
        }

        let record = self
            .store
            .load_airway(id)
            .ok_or_else(|| Error::inconsistency(format!("no airway record for id {id}")))?;

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = inner.by_id.get(&id) {
            return Ok(existing.clone());
        }

        let key = (record.ident.clone(), record.level);
        let airway = Arc::new(Airway::new(record, self.store.clone()));
        debug!(airway = %key.0, level = %key.1, id, "registered airway");
        inner.by_key.insert(key, airway.clone());
        inner.by_id.insert(id, airway.clone());
        Ok(airway)
    }
}
