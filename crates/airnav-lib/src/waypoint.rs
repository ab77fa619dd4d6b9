//! Minimal waypoint contract used by the router.
//!
//! A [`Waypt`] is any point a route can pass through. Some are backed by a
//! [`Positioned`](crate::positioned::Positioned) from the navigation store,
//! which lets the router test graph membership without a spatial query.

use std::borrow::Cow;

use crate::airway::AirwayTag;
use crate::geo::GeoPos;
use crate::positioned::PositionedRef;

/// Two waypoints with the same ident closer than this are the same point.
pub const MATCH_TOLERANCE_M: f64 = 100.0;

/// Waypoint variants understood by the router.
#[derive(Debug, Clone)]
pub enum WayptKind {
    /// Backed by a fix or radio navaid.
    Navaid(PositionedRef),
    /// Backed by a runway threshold.
    Runway(PositionedRef),
    /// Free geographic point with no store backing.
    Basic { ident: String, position: GeoPos },
    /// Placeholder for "follow `airway` to `to`" inside a route.
    Via { airway: String, to: PositionedRef },
}

#[derive(Debug, Clone)]
pub struct Waypt {
    kind: WayptKind,
    airway: Option<AirwayTag>,
    via: bool,
    generated: bool,
}

impl Waypt {
    fn from_kind(kind: WayptKind) -> Self {
        Self {
            kind,
            airway: None,
            via: false,
            generated: false,
        }
    }

    pub fn navaid(positioned: PositionedRef) -> Self {
        Self::from_kind(WayptKind::Navaid(positioned))
    }

    pub fn runway(positioned: PositionedRef) -> Self {
        Self::from_kind(WayptKind::Runway(positioned))
    }

    pub fn basic(ident: impl Into<String>, position: GeoPos) -> Self {
        Self::from_kind(WayptKind::Basic {
            ident: ident.into(),
            position,
        })
    }

    pub fn via(airway: impl Into<String>, to: PositionedRef) -> Self {
        Self::from_kind(WayptKind::Via {
            airway: airway.into(),
            to,
        })
    }

    pub fn kind(&self) -> &WayptKind {
        &self.kind
    }

    pub fn position(&self) -> GeoPos {
        match &self.kind {
            WayptKind::Navaid(p) | WayptKind::Runway(p) => p.position,
            WayptKind::Basic { position, .. } => *position,
            WayptKind::Via { to, .. } => to.position,
        }
    }

    pub fn ident(&self) -> Cow<'_, str> {
        match &self.kind {
            WayptKind::Navaid(p) | WayptKind::Runway(p) => Cow::Borrowed(p.ident.as_str()),
            WayptKind::Basic { ident, .. } => Cow::Borrowed(ident.as_str()),
            WayptKind::Via { airway, to } => Cow::Owned(format!("{airway}-{}", to.ident)),
        }
    }

    /// Store entity behind this waypoint, if any.
    pub fn source(&self) -> Option<&PositionedRef> {
        match &self.kind {
            WayptKind::Navaid(p) | WayptKind::Runway(p) => Some(p),
            WayptKind::Via { to, .. } => Some(to),
            WayptKind::Basic { .. } => None,
        }
    }

    /// Identity comparison: same ident and within [`MATCH_TOLERANCE_M`].
    pub fn matches(&self, other: &Waypt) -> bool {
        if let (Some(a), Some(b)) = (self.source(), other.source()) {
            if a.guid == b.guid {
                return true;
            }
        }

        self.ident() == other.ident() && self.matches_position(&other.position())
    }

    pub fn matches_position(&self, position: &GeoPos) -> bool {
        self.position().distance_m(position) < MATCH_TOLERANCE_M
    }

    /// Collapse a `Via` placeholder into the navaid it terminates at.
    pub fn to_navaid(&self) -> Waypt {
        match &self.kind {
            WayptKind::Via { to, .. } => Waypt::navaid(to.clone()),
            _ => self.clone(),
        }
    }

    pub fn airway(&self) -> Option<&AirwayTag> {
        self.airway.as_ref()
    }

    pub fn is_via(&self) -> bool {
        self.via
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn with_airway(mut self, airway: Option<AirwayTag>) -> Self {
        self.airway = airway;
        self
    }

    pub fn flagged_via(mut self) -> Self {
        self.via = true;
        self
    }

    pub fn flagged_generated(mut self) -> Self {
        self.generated = true;
        self
    }
}
