//! Airway network routing library entry points.
//!
//! This crate models navigation fixes joined by directed airway edges, one
//! graph per altitude level, and finds great-circle-optimal routes between
//! arbitrary waypoints with an A* search. Higher-level consumers (the CLI)
//! should only depend on the items exported here instead of reimplementing
//! behavior.
//!

#![deny(warnings)]

pub mod airway;
pub mod clean;
pub mod config;
pub mod context;
pub mod dataset;
pub mod db;
pub mod error;
pub mod geo;
pub mod network;
pub mod output;
pub mod positioned;
pub mod search;
pub mod spatial;
pub mod store;
pub mod waypoint;

pub use airway::{Airway, AirwayId, AirwayRef, AirwayRegistry, AirwayTag, Level};
pub use clean::clean_generated_path;
pub use config::RouterConfig;
pub use context::NavContext;
pub use dataset::{default_dataset_path, resolve_dataset_path};
pub use db::load_nav_cache;
pub use error::{Error, Result};
pub use geo::GeoPos;
pub use network::{ClosestNode, Network};
pub use output::{AirwayListing, RouteLeg, RouteOutputKind, RouteSummary};
pub use positioned::{Guid, Positioned, PositionedRef, PositionedType};
pub use search::{search, SearchHop};
pub use spatial::{KdSpatialIndex, SpatialIndex};
pub use store::{AirwayRecord, MemoryNavCache, NavDataStore};
pub use waypoint::{Waypt, WayptKind};
