//! Source classification
//!
//! Maps a source identifier to the payload shape it is expected to return by
//! substring match, in a fixed priority order. Anything unmatched is
//! [`Shape::Unknown`] and is passed through as raw text.

use serde::{Deserialize, Serialize};

/// Built-in rules, highest priority first
const DEFAULT_RULES: &[(&str, Shape)] = &[
    ("openweathermap", Shape::Weather),
    ("jsonplaceholder.typicode.com/posts", Shape::PostList),
    ("reqres.in/api/users", Shape::UserPage),
];

/// Known payload shapes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Current weather for a single city (OpenWeather)
    Weather,
    /// List of posts (JSONPlaceholder)
    PostList,
    /// One page of users (reqres)
    UserPage,
    /// Unrecognized source, body returned verbatim
    Unknown,
}

impl Shape {
    /// Stable lowercase name, as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Weather => "weather",
            Shape::PostList => "post_list",
            Shape::UserPage => "user_page",
            Shape::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single substring rule
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierRule {
    /// Substring that must appear in the source identifier (case-sensitive)
    pub pattern: String,
    /// Shape assigned when the pattern matches
    pub shape: Shape,
}

impl ClassifierRule {
    /// Create a rule
    pub fn new(pattern: impl Into<String>, shape: Shape) -> Self {
        Self {
            pattern: pattern.into(),
            shape,
        }
    }
}

/// Ordered rule set; the first matching rule wins
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classifier {
    rules: Vec<ClassifierRule>,
}

impl Classifier {
    /// Build a classifier from rules in priority order
    pub fn new(rules: Vec<ClassifierRule>) -> Self {
        Self { rules }
    }

    /// Classify a source identifier. Never fails.
    pub fn classify(&self, source: &str) -> Shape {
        self.rules
            .iter()
            .find(|rule| source.contains(rule.pattern.as_str()))
            .map(|rule| rule.shape)
            .unwrap_or(Shape::Unknown)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

/// The built-in rule list
pub fn default_rules() -> Vec<ClassifierRule> {
    DEFAULT_RULES
        .iter()
        .map(|(pattern, shape)| ClassifierRule::new(*pattern, *shape))
        .collect()
}
