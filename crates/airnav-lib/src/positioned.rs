use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::geo::GeoPos;

/// Stable identifier of a positioned entity within the navigation store.
pub type Guid = i64;

/// Shared, immutable handle to a positioned entity owned by the store.
pub type PositionedRef = Arc<Positioned>;

/// Kind of navigational object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionedType {
    Fix,
    Vor,
    Ndb,
    Dme,
    Tacan,
    Airport,
    Runway,
    UserWaypoint,
}

impl PositionedType {
    /// Types that airway definitions may name as endpoints.
    pub fn is_enroute_navaid(self) -> bool {
        matches!(
            self,
            PositionedType::Fix
                | PositionedType::Vor
                | PositionedType::Ndb
                | PositionedType::Dme
                | PositionedType::Tacan
        )
    }

    fn as_str(self) -> &'static str {
        match self {
            PositionedType::Fix => "fix",
            PositionedType::Vor => "vor",
            PositionedType::Ndb => "ndb",
            PositionedType::Dme => "dme",
            PositionedType::Tacan => "tacan",
            PositionedType::Airport => "airport",
            PositionedType::Runway => "runway",
            PositionedType::UserWaypoint => "user_waypoint",
        }
    }
}

impl fmt::Display for PositionedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PositionedType {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let kind = match value.to_ascii_lowercase().as_str() {
            "fix" => PositionedType::Fix,
            "vor" => PositionedType::Vor,
            "ndb" => PositionedType::Ndb,
            "dme" => PositionedType::Dme,
            "tacan" => PositionedType::Tacan,
            "airport" => PositionedType::Airport,
            "runway" => PositionedType::Runway,
            "user_waypoint" | "user" => PositionedType::UserWaypoint,
            other => return Err(format!("unknown positioned type '{other}'")),
        };
        Ok(kind)
    }
}

/// A point-like navigational object with a stable identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Positioned {
    pub guid: Guid,
    pub ident: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: PositionedType,
    pub position: GeoPos,
}

impl Positioned {
    pub fn new(guid: Guid, ident: impl Into<String>, kind: PositionedType, position: GeoPos) -> Self {
        Self {
            guid,
            ident: ident.into(),
            name: None,
            kind,
            position,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
