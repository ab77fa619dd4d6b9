//! Routable graph for one altitude level.
//!
//! A [`Network`] turns "route from waypoint A to waypoint B" into a graph
//! search: both ends are resolved onto graph members, [`search`] runs over
//! the store's edges, and [`clean_generated_path`] trims the result against
//! the caller's original endpoints.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::airway::{AirwayId, AirwayRegistry, Level};
use crate::clean::clean_generated_path;
use crate::config::RouterConfig;
use crate::error::{Error, Result};
use crate::geo::GeoPos;
use crate::positioned::{Guid, PositionedRef};
use crate::search::{search, SearchHop};
use crate::spatial::SpatialIndex;
use crate::store::NavDataStore;
use crate::waypoint::Waypt;

/// Graph member chosen to stand in for a caller's waypoint.
#[derive(Debug, Clone)]
pub struct ClosestNode {
    pub node: PositionedRef,
    /// The member is the waypoint itself, or close enough to be treated as
    /// the same point when cleaning the path.
    pub exact: bool,
}

pub struct Network {
    level: Level,
    store: Arc<dyn NavDataStore>,
    spatial: Arc<dyn SpatialIndex>,
    registry: Arc<AirwayRegistry>,
    config: RouterConfig,
    in_network_cache: RwLock<HashMap<Guid, bool>>,
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("level", &self.level)
            .field("config", &self.config)
            .finish()
    }
}

impl Network {
    /// `level` must name a single network; `Level::Both` never has edges.
    pub fn new(
        level: Level,
        store: Arc<dyn NavDataStore>,
        spatial: Arc<dyn SpatialIndex>,
        registry: Arc<AirwayRegistry>,
        config: RouterConfig,
    ) -> Self {
        Self {
            level,
            store,
            spatial,
            registry,
            config,
            in_network_cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Route between two arbitrary waypoints.
    ///
    /// `Ok(None)` when either end has no graph member nearby or when the two
    /// members are not connected. `Ok(Some(path))` may hold an empty path
    /// when both ends resolve to the same or adjacent nodes.
    pub fn route(&self, from: &Waypt, to: &Waypt) -> Result<Option<Vec<Waypt>>> {
        let Some(start) = self.find_closest_node(from) else {
            debug!(from = %from.ident(), level = %self.level, "no graph node near origin");
            return Ok(None);
        };
        let Some(goal) = self.find_closest_node(to) else {
            debug!(to = %to.ident(), level = %self.level, "no graph node near destination");
            return Ok(None);
        };

        debug!(
            from = %from.ident(),
            to = %to.ident(),
            start = %start.node.ident,
            goal = %goal.node.ident,
            exact_from = start.exact,
            exact_to = goal.exact,
            "resolved route endpoints"
        );

        let Some(hops) = search(
            self.store.as_ref(),
            self.level,
            &start.node,
            &goal.node,
            self.config.max_expansions,
        )?
        else {
            debug!(from = %from.ident(), to = %to.ident(), level = %self.level, "no route");
            return Ok(None);
        };

        let mut path = self.build_waypoints(hops)?;
        clean_generated_path(
            from,
            to,
            &mut path,
            start.exact,
            goal.exact,
            self.config.dog_leg_threshold_deg,
        );
        Ok(Some(path))
    }

    /// Graph member standing in for `waypt`.
    ///
    /// A waypoint backed by a member of this network resolves to it exactly.
    /// Anything else falls back to [`Network::find_closest_node_at`].
    pub fn find_closest_node(&self, waypt: &Waypt) -> Option<ClosestNode> {
        if let Some(source) = waypt.source() {
            if self.in_network(source.guid) {
                return Some(ClosestNode {
                    node: source.clone(),
                    exact: true,
                });
            }
        }
        self.find_closest_node_at(&waypt.position())
    }

    /// Nearest member within the search radius. A member within the exact
    /// match tolerance of `position` is flagged exact.
    pub fn find_closest_node_at(&self, position: &GeoPos) -> Option<ClosestNode> {
        let node = self.spatial.find_closest(
            position,
            self.config.search_radius_nm,
            &|candidate| self.in_network(candidate.guid),
        )?;
        let exact = position.distance_m(&node.position) < self.config.exact_match_tolerance_m;
        Some(ClosestNode { node, exact })
    }

    /// Whether `guid` is an edge endpoint in this network. Answers, including
    /// negative ones, are memoised until [`Network::clear_membership_cache`].
    pub fn in_network(&self, guid: Guid) -> bool {
        if let Some(&member) = self
            .in_network_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&guid)
        {
            return member;
        }

        let member = self.store.is_in_airway_network(self.level, guid);
        self.in_network_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(guid, member);
        member
    }

    /// Forget memoised membership, for hosts that reload navigation data.
    pub fn clear_membership_cache(&self) {
        self.in_network_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Load-time edge insertion into this network.
    pub fn add_edge(&self, airway: AirwayId, from: Guid, to: Guid) -> Result<()> {
        self.store.insert_edge(self.level, airway, from, to)?;
        let mut cache = self
            .in_network_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        cache.insert(from, true);
        cache.insert(to, true);
        Ok(())
    }

    /// Insert an edge whose endpoints are given by ident and an approximate
    /// position, as found in published airway listings.
    pub fn add_edge_by_ident(
        &self,
        airway: AirwayId,
        from_ident: &str,
        from_hint: &GeoPos,
        to_ident: &str,
        to_hint: &GeoPos,
    ) -> Result<()> {
        let from = self.resolve_enroute(airway, from_ident, from_hint)?;
        let to = self.resolve_enroute(airway, to_ident, to_hint)?;
        self.add_edge(airway, from.guid, to.guid)
    }

    fn resolve_enroute(&self, airway: AirwayId, ident: &str, hint: &GeoPos) -> Result<PositionedRef> {
        self.spatial
            .find_closest_with_ident(ident, hint, &|candidate| candidate.kind.is_enroute_navaid())
            .ok_or_else(|| {
                Error::inconsistency(format!(
                    "airway {airway}: no fix or navaid named {ident} near {:.4},{:.4}",
                    hint.lat, hint.lon
                ))
            })
    }

    /// Turn search hops into generated waypoints carrying their airway.
    fn build_waypoints(&self, hops: Vec<SearchHop>) -> Result<Vec<Waypt>> {
        hops.into_iter()
            .map(|hop| {
                let airway = match hop.airway {
                    Some(id) => Some(self.registry.load_by_cache_id(id)?.tag()),
                    None => None,
                };
                Ok(Waypt::navaid(hop.node)
                    .with_airway(airway)
                    .flagged_via()
                    .flagged_generated())
            })
            .collect()
    }
}
