use std::path::PathBuf;

use thiserror::Error;

use crate::airway::Level;

/// Convenient result alias for the airway routing library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Expected absences (unknown airway, no graph node near a position, no path
/// between two nodes) are reported as `Option::None` by the routing entry
/// points rather than through this type. The variants here cover contract
/// violations, corrupt navigation data and environment failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Navigation dataset could not be located at the resolved path.
    #[error("navigation dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for the navigation dataset")]
    ProjectDirsUnavailable,

    /// Raised when the dataset does not contain the expected tables.
    #[error("unsupported dataset schema; expected positioned/airway/airway_fix tables")]
    UnsupportedSchema,

    /// Raised when an airway identifier could not be found in the store.
    #[error("unknown airway: {ident}{}", format_suggestions(.suggestions))]
    UnknownAirway {
        ident: String,
        suggestions: Vec<String>,
    },

    /// Raised when a fix or navaid identifier could not be found in the store.
    #[error("unknown fix: {ident}{}", format_suggestions(.suggestions))]
    UnknownFix {
        ident: String,
        suggestions: Vec<String>,
    },

    /// Raised by callers that need to surface a missing route as an error.
    #[error("no route found between {from} and {to}")]
    RouteNotFound { from: String, to: String },

    /// `via` was asked for a sub-path the airway cannot provide.
    #[error("invalid transition on airway {airway} from {from} to {to}: {reason}")]
    InvalidTransition {
        airway: String,
        from: String,
        to: String,
        reason: String,
    },

    /// The store references data it cannot resolve.
    #[error("navigation data inconsistency: {message}")]
    DataInconsistency { message: String },

    /// The search hit its expansion limit before reaching a verdict.
    #[error("route search aborted after expanding {expanded} nodes")]
    SearchAborted { expanded: usize },

    /// A routing call named a level without a network of its own.
    #[error("level {level} does not name a single airway network; use low or high")]
    InvalidLevel { level: Level },

    /// Raised when a router configuration is rejected.
    #[error("invalid router configuration: {message}")]
    InvalidConfig { message: String },

    /// Raised when a configuration file cannot be read or parsed.
    #[error("failed to load router configuration from {path}: {message}")]
    ConfigLoad { path: PathBuf, message: String },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for JSON errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn inconsistency(message: impl Into<String>) -> Self {
        Error::DataInconsistency {
            message: message.into(),
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
