use crate::ombi::NormalizedSearchResult;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Availability of one movie on one server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Status {
    Available,
    Requested,
    Unavailable,
    /// The server could not be queried. Display-only, never cached.
    Error,
}

impl Status {
    /// Whether a lookup ending in this status may be served from cache later.
    ///
    /// `requested` changes out of band (the service approves and fulfils
    /// requests on its own schedule) so it is always re-fetched.
    pub fn is_cacheable(self) -> bool {
        matches!(self, Status::Available | Status::Unavailable)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Available => "available",
            Status::Requested => "requested",
            Status::Unavailable => "unavailable",
            Status::Error => "error",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a normalized response to a status. First matching rule wins.
pub fn resolve_status(result: &NormalizedSearchResult) -> Status {
    if result.available {
        Status::Available
    } else if result.requested {
        Status::Requested
    } else {
        Status::Unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(available: bool, requested: bool, approved: Option<bool>) -> NormalizedSearchResult {
        NormalizedSearchResult {
            id: Some("1".into()),
            title: None,
            available,
            requested,
            approved,
            plex_url: None,
        }
    }

    #[test]
    fn available_wins_over_everything() {
        for requested in [false, true] {
            for approved in [None, Some(false), Some(true)] {
                assert_eq!(
                    resolve_status(&result(true, requested, approved)),
                    Status::Available
                );
            }
        }
    }

    #[test]
    fn requested_then_unavailable() {
        assert_eq!(resolve_status(&result(false, true, None)), Status::Requested);
        assert_eq!(resolve_status(&result(false, false, None)), Status::Unavailable);
        // Approval alone does not count as requested.
        assert_eq!(
            resolve_status(&result(false, false, Some(true))),
            Status::Unavailable
        );
    }

    #[test]
    fn plex_url_alone_is_not_availability() {
        let mut r = result(false, false, None);
        r.plex_url = Some("https://app.plex.tv/x".into());
        assert_eq!(resolve_status(&r), Status::Unavailable);
    }

    #[test]
    fn only_settled_states_are_cacheable() {
        assert!(Status::Available.is_cacheable());
        assert!(Status::Unavailable.is_cacheable());
        assert!(!Status::Requested.is_cacheable());
        assert!(!Status::Error.is_cacheable());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(Status::Unavailable).unwrap(),
            serde_json::json!("unavailable")
        );
    }
}
