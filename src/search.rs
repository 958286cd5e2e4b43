//! Free-text search over a JSON snapshot.
//!
//! A query either reads like a path expression and is run through the
//! [`QueryEngine`], or it is a plain word matched against the snapshot's
//! top-level keys. The result is always a JSON value ready for display;
//! failures degrade to `{}`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, instrument, warn};

use crate::path::{DEFAULT_ENGINE, Match, QueryEngine};

static INDEX_ACCESS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\d+\]").expect("Failed to compile index access regex"));

static QUOTED_ACCESS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\[(?:'[^']*'|"[^"]*")\]"#).expect("Failed to compile quoted access regex")
});

static DOTTED_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z_$][\w$]*\.[A-Za-z_$][\w$]*").expect("Failed to compile dotted name regex")
});

static BRACKET_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\['([^']*)'\]$").expect("Failed to compile bracket key regex"));

/// How a query is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchRoute {
    /// Snapshot returned as is
    Empty,
    /// Case-insensitive substring match on top-level keys
    Keys,
    /// Path query
    Path,
}

/// True when `query` reads like a path expression rather than a key
/// fragment.
///
/// The check is textual: `user.name` counts as a path, while a key that
/// happens to contain a dot between two words is misread the same way.
pub fn looks_like_path(query: &str) -> bool {
    query.starts_with('$')
        || INDEX_ACCESS_REGEX.is_match(query)
        || QUOTED_ACCESS_REGEX.is_match(query)
        || DOTTED_NAME_REGEX.is_match(query)
        || query.contains("..")
        || query.contains('*')
}

pub fn classify(query: &str) -> SearchRoute {
    let query = query.trim();
    if query.is_empty() {
        SearchRoute::Empty
    } else if looks_like_path(query) {
        SearchRoute::Path
    } else {
        SearchRoute::Keys
    }
}

/// [`Searcher::search`] on the process-wide engine.
pub fn search(snapshot: &JsonValue, query: &str) -> JsonValue {
    Searcher::new(&DEFAULT_ENGINE).search(snapshot, query)
}

/// Search dispatcher bound to an engine.
#[derive(Debug, Clone, Copy)]
pub struct Searcher<'e> {
    engine: &'e QueryEngine,
}

impl<'e> Searcher<'e> {
    pub fn new(engine: &'e QueryEngine) -> Self {
        Searcher { engine }
    }

    /// Never fails: malformed paths and failing filters give `{}`.
    #[instrument(level = "debug", skip(self, snapshot))]
    pub fn search(&self, snapshot: &JsonValue, query: &str) -> JsonValue {
        let route = classify(query);
        debug!(?route, "search route");
        match route {
            SearchRoute::Empty => snapshot.clone(),
            SearchRoute::Keys => match_keys(snapshot, query.trim()),
            SearchRoute::Path => self.search_path(snapshot, query.trim()),
        }
    }

    fn search_path(&self, snapshot: &JsonValue, query: &str) -> JsonValue {
        let path = if query.starts_with('$') {
            query.to_string()
        } else if query.starts_with('[') {
            format!("${}", query)
        } else {
            format!("$.{}", query)
        };

        match self.engine.query(snapshot, &path) {
            Ok(matches) => collapse(matches),
            Err(error) => {
                warn!(path = path.as_str(), %error, "path search failed, returning empty result");
                empty()
            }
        }
    }
}

fn empty() -> JsonValue {
    JsonValue::Object(Map::new())
}

/// Top-level entries whose key contains `query`, ignoring case.
fn match_keys(snapshot: &JsonValue, query: &str) -> JsonValue {
    let Some(map) = snapshot.as_object() else {
        return empty();
    };
    let needle = query.to_lowercase();
    JsonValue::Object(
        map.iter()
            .filter(|(key, _)| key.to_lowercase().contains(&needle))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    )
}

/// Shapes the matches into one displayable value.
fn collapse(mut matches: Vec<Match<'_>>) -> JsonValue {
    if matches.len() == 1 {
        let only = matches.remove(0);
        if only.path.is_empty() || only.value.is_object() {
            return only.value.into_owned();
        }
        let mut map = Map::new();
        map.insert(derive_key(&only.path_string()), only.value.into_owned());
        return JsonValue::Object(map);
    }

    let mut merged = Map::new();
    for m in matches {
        let base = derive_key(&m.path_string());
        let mut key = base.clone();
        let mut suffix = 2;
        while merged.contains_key(&key) {
            key = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        merged.insert(key, m.value.into_owned());
    }
    JsonValue::Object(merged)
}

/// Display key for a match path: the trailing bracket-quoted key, else the
/// text after the last `.`, else the path without its `$.` prefix.
pub fn derive_key(path: &str) -> String {
    if let Some(key) = BRACKET_KEY_REGEX.captures(path).and_then(|c| c.get(1)) {
        return key.as_str().to_string();
    }
    if let Some((_, last)) = path.rsplit_once('.') {
        return last.to_string();
    }
    path.strip_prefix("$.").unwrap_or(path).to_string()
}
