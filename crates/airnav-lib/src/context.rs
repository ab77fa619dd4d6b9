//! Shared routing context: one store, one spatial index, one airway registry
//! and the two level networks built on top of them.
//!
//! Hosts construct a [`NavContext`] once and pass it to whatever needs
//! routing; nothing in the crate reaches for process-wide state.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::airway::{AirwayRef, AirwayRegistry, AirwayTag, Level};
use crate::config::RouterConfig;
use crate::db::load_nav_cache;
use crate::error::{Error, Result};
use crate::network::Network;
use crate::output::{RouteOutputKind, RouteSummary};
use crate::positioned::PositionedRef;
use crate::spatial::{KdSpatialIndex, SpatialIndex};
use crate::store::{fuzzy_matches, MemoryNavCache, NavDataStore};
use crate::waypoint::Waypt;

pub struct NavContext {
    store: Arc<dyn NavDataStore>,
    registry: Arc<AirwayRegistry>,
    low: Network,
    high: Network,
}

impl fmt::Debug for NavContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavContext")
            .field("registry", &self.registry)
            .field("low", &self.low)
            .field("high", &self.high)
            .finish()
    }
}

impl NavContext {
    pub fn new(
        store: Arc<dyn NavDataStore>,
        spatial: Arc<dyn SpatialIndex>,
        config: RouterConfig,
    ) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(AirwayRegistry::new(store.clone()));
        let network = |level| {
            Network::new(
                level,
                store.clone(),
                spatial.clone(),
                registry.clone(),
                config,
            )
        };
        let low = network(Level::Low);
        let high = network(Level::High);

        Ok(Self {
            store,
            registry,
            low,
            high,
        })
    }

    /// Index a populated cache and build both networks over it.
    pub fn from_cache(cache: MemoryNavCache, config: RouterConfig) -> Result<Self> {
        let spatial = Arc::new(KdSpatialIndex::from_cache(&cache));
        info!(
            positioned = cache.positioned_count(),
            airways = cache.airway_count(),
            low_edges = cache.edge_count(Level::Low),
            high_edges = cache.edge_count(Level::High),
            "navigation context ready"
        );
        Self::new(Arc::new(cache), spatial, config)
    }

    /// Load a SQLite navigation dataset and build a context from it.
    pub fn open(path: &Path, config: RouterConfig) -> Result<Self> {
        Self::from_cache(load_nav_cache(path)?, config)
    }

    pub fn store(&self) -> &Arc<dyn NavDataStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<AirwayRegistry> {
        &self.registry
    }

    /// Network for a single level. `Level::Both` has no network of its own.
    pub fn network(&self, level: Level) -> Option<&Network> {
        match level {
            Level::Low => Some(&self.low),
            Level::High => Some(&self.high),
            Level::Both => None,
        }
    }

    /// Resolve a fix or navaid by ident, preferring enroute navaids.
    pub fn resolve_fix(&self, ident: &str) -> Result<PositionedRef> {
        let candidates = self.store.find_by_ident(ident);
        candidates
            .iter()
            .find(|p| p.kind.is_enroute_navaid())
            .or_else(|| candidates.first())
            .cloned()
            .ok_or_else(|| Error::UnknownFix {
                ident: ident.to_string(),
                suggestions: fuzzy_matches(&self.store.positioned_idents(), ident, 3),
            })
    }

    /// Route between two named fixes on one level network.
    pub fn route_between(&self, from: &str, to: &str, level: Level) -> Result<RouteSummary> {
        let network = self
            .network(level)
            .ok_or(Error::InvalidLevel { level })?;
        let from = Waypt::navaid(self.resolve_fix(from)?);
        let to = Waypt::navaid(self.resolve_fix(to)?);

        let path = network
            .route(&from, &to)?
            .ok_or_else(|| Error::RouteNotFound {
                from: from.ident().into_owned(),
                to: to.ident().into_owned(),
            })?;

        let last = path.last().unwrap_or(&from);
        let to = match self.joining_airway(level, last, &to)? {
            Some(tag) => to.with_airway(Some(tag)),
            None => to,
        };
        Ok(RouteSummary::from_route(RouteOutputKind::Route, &from, &path, &to))
    }

    /// Airway of the edge from `a` to `b` on `level`, when both are store
    /// entities joined directly. Lets the leg into a trimmed endpoint keep
    /// its attribution.
    fn joining_airway(&self, level: Level, a: &Waypt, b: &Waypt) -> Result<Option<AirwayTag>> {
        let (Some(a), Some(b)) = (a.source(), b.source()) else {
            return Ok(None);
        };
        let Some((airway, _)) = self
            .store
            .edges_from(level, a.guid)
            .into_iter()
            .find(|(_, neighbour)| *neighbour == b.guid)
        else {
            return Ok(None);
        };
        Ok(Some(self.registry.load_by_cache_id(airway)?.tag()))
    }

    /// Follow a named airway between two of its fixes.
    pub fn via(&self, airway: &str, from: &str, to: &str) -> Result<RouteSummary> {
        let from = Waypt::navaid(self.resolve_fix(from)?);
        let to = Waypt::navaid(self.resolve_fix(to)?);

        let Some(found) = self.registry.find_by_ident_and_via(airway, &from, &to)? else {
            let known = self.registry.require_by_ident(airway, Level::Both)?;
            return Err(Error::InvalidTransition {
                airway: known.ident().to_string(),
                from: from.ident().into_owned(),
                to: to.ident().into_owned(),
                reason: "no contiguous segment joins the transition points".to_string(),
            });
        };

        let path = found.via(&from, &to)?;
        Ok(RouteSummary::from_route(RouteOutputKind::Via, &from, &path, &to))
    }

    /// Registered airway by ident, with suggestions when unknown.
    pub fn airway(&self, ident: &str, level: Level) -> Result<AirwayRef> {
        self.registry.require_by_ident(ident, level)
    }
}
