use std::fmt::Write;

use serde::Serialize;

use crate::airway::{Airway, Level};
use crate::error::Result;
use crate::geo::GeoPos;
use crate::waypoint::Waypt;

/// Classifies the high-level command that produced a route summary.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RouteOutputKind {
    Route,
    Via,
}

impl RouteOutputKind {
    /// Human-readable label shown in textual renderings.
    pub fn label(self) -> &'static str {
        match self {
            RouteOutputKind::Route => "Route",
            RouteOutputKind::Via => "Via",
        }
    }
}

/// Endpoint within a planned route.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteEndpoint {
    pub ident: String,
    pub position: GeoPos,
}

impl RouteEndpoint {
    fn from_waypt(wpt: &Waypt) -> Self {
        Self {
            ident: wpt.ident().into_owned(),
            position: wpt.position(),
        }
    }
}

/// One leg between consecutive route points.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteLeg {
    pub index: usize,
    pub from: String,
    pub to: String,
    /// Airway flown on this leg; `None` is a direct leg.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airway: Option<String>,
    pub course_deg: f64,
    pub distance_nm: f64,
}

/// Structured representation of a route that higher-level consumers can serialise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub kind: RouteOutputKind,
    pub start: RouteEndpoint,
    pub goal: RouteEndpoint,
    pub legs: Vec<RouteLeg>,
    pub total_distance_nm: f64,
}

impl RouteSummary {
    /// Summarise `from`, the generated `path` and `to` as a list of legs.
    ///
    /// Consecutive points that match each other collapse into one, keeping
    /// whichever copy carries airway attribution.
    pub fn from_route(kind: RouteOutputKind, from: &Waypt, path: &[Waypt], to: &Waypt) -> Self {
        let mut points: Vec<&Waypt> = Vec::with_capacity(path.len() + 2);
        for wpt in std::iter::once(from).chain(path).chain(std::iter::once(to)) {
            if let Some(previous) = points.last_mut().filter(|p| p.matches(wpt)) {
                if previous.airway().is_none() {
                    *previous = wpt;
                }
                continue;
            }
            points.push(wpt);
        }

        let legs: Vec<RouteLeg> = points
            .windows(2)
            .enumerate()
            .map(|(index, pair)| {
                let (a, b) = (pair[0].position(), pair[1].position());
                RouteLeg {
                    index: index + 1,
                    from: pair[0].ident().into_owned(),
                    to: pair[1].ident().into_owned(),
                    airway: pair[1].airway().map(|tag| tag.ident.clone()),
                    course_deg: a.course_deg(&b),
                    distance_nm: a.distance_nm(&b),
                }
            })
            .collect();
        let total_distance_nm = legs.iter().map(|leg| leg.distance_nm).sum();

        Self {
            kind,
            start: RouteEndpoint::from_waypt(from),
            goal: RouteEndpoint::from_waypt(to),
            legs,
            total_distance_nm,
        }
    }

    pub fn render(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "{}: {} -> {} ({} legs, {:.1} nm)",
            self.kind.label(),
            self.start.ident,
            self.goal.ident,
            self.legs.len(),
            self.total_distance_nm
        );
        for leg in &self.legs {
            let _ = writeln!(
                buffer,
                "{:>3}: {:<7} -> {:<7} {:<6} {:>03.0}° {:>7.1} nm",
                leg.index,
                leg.from,
                leg.to,
                leg.airway.as_deref().unwrap_or("DCT"),
                leg.course_deg,
                leg.distance_nm
            );
        }
        buffer
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One element of an airway listing; `None` marks a discontinuity.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListedElement {
    pub ident: String,
    pub position: GeoPos,
}

/// Element sequence of one airway.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AirwayListing {
    pub ident: String,
    pub level: Level,
    pub bottom_altitude_ft: i32,
    pub top_altitude_ft: i32,
    pub elements: Vec<Option<ListedElement>>,
}

impl AirwayListing {
    pub fn from_airway(airway: &Airway) -> Result<Self> {
        let elements = airway
            .load_waypoints()?
            .iter()
            .map(|element| {
                element.as_ref().map(|wpt| ListedElement {
                    ident: wpt.ident().into_owned(),
                    position: wpt.position(),
                })
            })
            .collect();

        Ok(Self {
            ident: airway.ident().to_string(),
            level: airway.level(),
            bottom_altitude_ft: airway.bottom_altitude_ft(),
            top_altitude_ft: airway.top_altitude_ft(),
            elements,
        })
    }

    pub fn render(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Airway {} ({}, {}-{} ft)",
            self.ident, self.level, self.bottom_altitude_ft, self.top_altitude_ft
        );
        for (index, element) in self.elements.iter().enumerate() {
            match element {
                Some(element) => {
                    let _ = writeln!(
                        buffer,
                        "{:>3}: {:<7} {:>9.4} {:>10.4}",
                        index, element.ident, element.position.lat, element.position.lon
                    );
                }
                None => {
                    let _ = writeln!(buffer, "{index:>3}: -- discontinuity --");
                }
            }
        }
        buffer
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
