use serde::{Deserialize, Serialize};

use crate::parser::{self, PageText};

/// One fetched Légifrance page as recorded in the artifact.
///
/// The plain text is only needed during the run and is never written out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSnapshot {
    pub id: String,
    pub label: String,
    pub url: String,
    pub last_update: String,
    pub fingerprint: String,
    #[serde(skip)]
    pub text: String,
}

impl SourceSnapshot {
    pub fn from_html(id: &str, label: &str, url: &str, raw_html: &str) -> Self {
        let PageText { text, fingerprint, last_update } = parser::process_page(raw_html);
        SourceSnapshot {
            id: id.to_string(),
            label: label.to_string(),
            url: url.to_string(),
            last_update,
            fingerprint,
            text,
        }
    }
}

/// Whether a source drifted since the previous run.
///
/// No history is not a change. An empty field in the previous snapshot means
/// "unknown" and is not compared.
pub fn source_changed(previous: Option<&SourceSnapshot>, current: &SourceSnapshot) -> bool {
    let Some(prev) = previous else {
        return false;
    };
    let fingerprint_moved = !prev.fingerprint.is_empty() && prev.fingerprint != current.fingerprint;
    let date_moved = !prev.last_update.is_empty() && prev.last_update != current.last_update;
    fingerprint_moved || date_moved
}
