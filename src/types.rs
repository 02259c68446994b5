//! Core types for api-aggregator

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classifier::Shape;
use crate::decode::{PostList, UserPage, WeatherReport};
use crate::error::EngineError;

/// Opaque identifier of one external source (a URL). Used verbatim as a result key.
pub type SourceId = String;

/// Separator used when joining sources into a cache key.
///
/// A newline cannot appear in a well-formed URL, so distinct source sets can
/// never produce the same key.
const CACHE_KEY_SEPARATOR: char = '\n';

/// Prefix of every cache key
const CACHE_KEY_PREFIX: &str = "aggregate:";

/// A canonicalized set of sources submitted together
///
/// Sources are sorted lexicographically and deduplicated on construction, so
/// two requests naming the same sources in a different order compare equal and
/// share a cache key. A `SourceSet` is never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceSet(Vec<SourceId>);

impl SourceSet {
    /// Canonicalize the given sources
    ///
    /// Returns [`EngineError::EmptySourceSet`] if no sources are given.
    pub fn new<I, S>(sources: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<SourceId>,
    {
        let mut sources: Vec<SourceId> = sources.into_iter().map(Into::into).collect();
        if sources.is_empty() {
            return Err(EngineError::EmptySourceSet);
        }
        sources.sort();
        sources.dedup();
        Ok(Self(sources))
    }

    /// Sources in canonical (sorted) order
    pub fn iter(&self) -> impl Iterator<Item = &SourceId> {
        self.0.iter()
    }

    /// Number of distinct sources
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no sources (never true for a constructed set)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical cache key for this set
    pub fn cache_key(&self) -> String {
        let mut key = String::from(CACHE_KEY_PREFIX);
        for (i, source) in self.0.iter().enumerate() {
            if i > 0 {
                key.push(CACHE_KEY_SEPARATOR);
            }
            key.push_str(source);
        }
        key
    }
}

/// Successfully decoded payload of a known shape
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "record", rename_all = "snake_case")]
pub enum Payload {
    /// Current weather for a city
    Weather(WeatherReport),
    /// List of posts
    PostList(PostList),
    /// One page of users
    UserPage(UserPage),
}

impl Payload {
    /// Shape discriminator of this payload
    pub fn shape(&self) -> Shape {
        match self {
            Payload::Weather(_) => Shape::Weather,
            Payload::PostList(_) => Shape::PostList,
            Payload::UserPage(_) => Shape::UserPage,
        }
    }
}

/// Result of fetching one source
///
/// Exactly one outcome exists per requested source; retries never surface as
/// extra entries.
///
/// Serialized as
/// `{"outcome":"structured","shape":"weather","record":{..}}`,
/// `{"outcome":"raw_text","text":".."}` or
/// `{"outcome":"failed","message":".."}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Payload of a known shape
    Structured(Payload),
    /// Body of an unrecognized source, verbatim
    RawText {
        /// Response body
        text: String,
    },
    /// Every attempt failed
    Failed {
        /// Human-readable diagnostic
        message: String,
    },
}

impl FetchOutcome {
    /// Wrap raw text
    pub fn raw_text(text: impl Into<String>) -> Self {
        FetchOutcome::RawText { text: text.into() }
    }

    /// Wrap a failure diagnostic
    pub fn failed(message: impl Into<String>) -> Self {
        FetchOutcome::Failed {
            message: message.into(),
        }
    }

    /// The failure diagnostic, if this is a failed outcome
    pub fn failure(&self) -> Option<&str> {
        match self {
            FetchOutcome::Failed { message } => Some(message),
            _ => None,
        }
    }
}

impl From<Payload> for FetchOutcome {
    fn from(payload: Payload) -> Self {
        FetchOutcome::Structured(payload)
    }
}

/// Merged result keyed by source
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateResult(BTreeMap<SourceId, FetchOutcome>);

impl AggregateResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the outcome for a source
    pub fn insert(&mut self, source: impl Into<SourceId>, outcome: FetchOutcome) {
        self.0.insert(source.into(), outcome);
    }

    /// Outcome for a source
    pub fn get(&self, source: &str) -> Option<&FetchOutcome> {
        self.0.get(source)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the result has no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Source keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &SourceId> {
        self.0.keys()
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&SourceId, &FetchOutcome)> {
        self.0.iter()
    }
}

impl FromIterator<(SourceId, FetchOutcome)> for AggregateResult {
    fn from_iter<T: IntoIterator<Item = (SourceId, FetchOutcome)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for AggregateResult {
    type Item = (SourceId, FetchOutcome);
    type IntoIter = std::collections::btree_map::IntoIter<SourceId, FetchOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// How an aggregate was served by the result cache
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheStatus {
    /// Served from an unexpired entry
    Hit,
    /// Computed by this request and stored
    Miss,
    /// Joined a computation started by a concurrent request
    Shared,
    /// Cache disabled, computed without storing
    Bypass,
}

impl CacheStatus {
    /// Header value, e.g. `HIT`
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Shared => "SHARED",
            CacheStatus::Bypass => "BYPASS",
        }
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::Post;

    #[test]
    fn test_source_set_rejects_empty() {
        let result = SourceSet::new(Vec::<String>::new());
        assert_eq!(result.unwrap_err(), EngineError::EmptySourceSet);
    }

    #[test]
    fn test_source_set_order_independent() {
        let a = SourceSet::new(["https://b.example", "https://a.example"]).unwrap();
        let b = SourceSet::new(["https://a.example", "https://b.example"]).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.cache_key(), b.cache_key());
        let ordered: Vec<_> = a.iter().cloned().collect();
        assert_eq!(ordered, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_source_set_deduplicates() {
        let set = SourceSet::new(["x", "y", "x"]).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_cache_key_is_unambiguous() {
        // Joining with an underscore would make these collide
        let a = SourceSet::new(["a_b", "c"]).unwrap();
        let b = SourceSet::new(["a", "b_c"]).unwrap();
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_outcome_wire_format() {
        let failed = serde_json::to_value(FetchOutcome::failed("nope")).unwrap();
        assert_eq!(failed["outcome"], "failed");
        assert_eq!(failed["message"], "nope");

        let raw = serde_json::to_value(FetchOutcome::raw_text("{\"a\":1}")).unwrap();
        assert_eq!(raw["outcome"], "raw_text");
        assert_eq!(raw["text"], "{\"a\":1}");

        let posts = FetchOutcome::from(Payload::PostList(PostList {
            posts: vec![Post {
                user_id: 1,
                id: 7,
                title: "t".into(),
                body: "b".into(),
            }],
        }));
        let json = serde_json::to_value(&posts).unwrap();
        assert_eq!(json["outcome"], "structured");
        assert_eq!(json["shape"], "post_list");
        assert_eq!(json["record"]["posts"][0]["userId"], 1);

        let back: FetchOutcome = serde_json::from_value(json).unwrap();
        assert_eq!(back, posts);
    }

    #[test]
    fn test_aggregate_result_serializes_as_map() {
        let result: AggregateResult = [
            ("https://b".to_string(), FetchOutcome::raw_text("b")),
            ("https://a".to_string(), FetchOutcome::failed("a")),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.is_object());
        assert_eq!(json["https://a"]["outcome"], "failed");
        assert_eq!(json["https://b"]["text"], "b");
        assert_eq!(result.get("https://a").unwrap().failure(), Some("a"));
    }

    #[test]
    fn test_cache_status_header_values() {
        assert_eq!(CacheStatus::Hit.as_str(), "HIT");
        assert_eq!(
            serde_json::to_string(&CacheStatus::Shared).unwrap(),
            "\"SHARED\""
        );
    }
}
