use crate::utils::is_numeric_id;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What the page-extraction step found about the movie being viewed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieIdentity {
    pub title: Option<String>,
    /// Catalog id (TMDb); always a string of digits when present.
    pub external_id: Option<String>,
    pub year: Option<String>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

impl MovieIdentity {
    /// Build an identity from raw extraction output. Blank fields become
    /// absent and a non-numeric id is discarded.
    pub fn new(title: Option<String>, external_id: Option<String>, year: Option<String>) -> Self {
        let external_id = clean(external_id).filter(|id| {
            let numeric = is_numeric_id(id);
            if !numeric {
                warn!(external_id = %id, "ignoring non-numeric external id");
            }
            numeric
        });
        Self {
            title: clean(title),
            external_id,
            year: clean(year),
        }
    }

    /// Whether there is anything to look up.
    pub fn is_usable(&self) -> bool {
        self.external_id.is_some() || self.title.is_some()
    }

    /// The value used both as the search query and as the movie part of cache keys:
    /// the external id when known, the title otherwise.
    pub fn lookup_key(&self) -> Option<&str> {
        self.external_id.as_deref().or(self.title.as_deref())
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Unknown Movie")
    }
}
