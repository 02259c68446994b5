//! Post-processing: filter, then sort
//!
//! Both stages are pure: they consume an [`AggregateResult`] and return a new
//! one, leaving the cached copy untouched. Behavior is chosen per entry by
//! matching on the payload shape.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::decode::{Post, User};
use crate::types::{AggregateResult, FetchOutcome, Payload};

type Comparator<T> = fn(&T, &T) -> Ordering;

/// Case-insensitive substring test
fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Keep the entries (and sub-records) matching `needle`
///
/// An empty needle returns the input unchanged. Failed entries never match.
pub fn filter(result: AggregateResult, needle: &str) -> AggregateResult {
    if needle.is_empty() {
        return result;
    }
    let needle = needle.to_lowercase();

    result
        .into_iter()
        .filter_map(|(source, outcome)| {
            filter_outcome(outcome, &needle).map(|outcome| (source, outcome))
        })
        .collect()
}

fn filter_outcome(outcome: FetchOutcome, needle: &str) -> Option<FetchOutcome> {
    match outcome {
        FetchOutcome::RawText { ref text } => {
            contains_ignore_case(text, needle).then_some(outcome)
        }
        FetchOutcome::Structured(Payload::Weather(ref report)) => {
            (contains_ignore_case(&report.city, needle)
                || contains_ignore_case(&report.description, needle))
            .then_some(outcome)
        }
        FetchOutcome::Structured(Payload::PostList(mut list)) => {
            list.posts.retain(|post| {
                contains_ignore_case(&post.title, needle)
                    || contains_ignore_case(&post.body, needle)
            });
            (!list.posts.is_empty()).then(|| FetchOutcome::Structured(Payload::PostList(list)))
        }
        FetchOutcome::Structured(Payload::UserPage(mut page)) => {
            page.data.retain(|user| {
                contains_ignore_case(&user.first_name, needle)
                    || contains_ignore_case(&user.last_name, needle)
            });
            (!page.data.is_empty()).then(|| FetchOutcome::Structured(Payload::UserPage(page)))
        }
        FetchOutcome::Failed { .. } => None,
    }
}

/// Normalize a field name for lookup: lowercase, underscores dropped
///
/// `userId`, `user_id` and `USERID` all resolve to `userid`.
fn normalize_field(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Sorts list-shaped payloads by a named field
///
/// Each list shape has a fixed table from normalized field name to comparator.
/// An unknown field leaves the entry as it was.
#[derive(Clone, Debug)]
pub struct Sorter {
    posts: HashMap<&'static str, Comparator<Post>>,
    users: HashMap<&'static str, Comparator<User>>,
}

impl Default for Sorter {
    fn default() -> Self {
        Self::new()
    }
}

impl Sorter {
    /// Build the comparator tables
    pub fn new() -> Self {
        let posts: [(&'static str, Comparator<Post>); 4] = [
            ("userid", |a, b| a.user_id.cmp(&b.user_id)),
            ("id", |a, b| a.id.cmp(&b.id)),
            ("title", |a, b| a.title.cmp(&b.title)),
            ("body", |a, b| a.body.cmp(&b.body)),
        ];
        let users: [(&'static str, Comparator<User>); 5] = [
            ("id", |a, b| a.id.cmp(&b.id)),
            ("email", |a, b| a.email.cmp(&b.email)),
            ("firstname", |a, b| a.first_name.cmp(&b.first_name)),
            ("lastname", |a, b| a.last_name.cmp(&b.last_name)),
            ("avatar", |a, b| a.avatar.cmp(&b.avatar)),
        ];

        Self {
            posts: posts.into_iter().collect(),
            users: users.into_iter().collect(),
        }
    }

    /// Sort every list-shaped entry ascending by `field`
    ///
    /// The sort is stable. Weather, raw text and failed entries pass through.
    pub fn sort(&self, result: AggregateResult, field: &str) -> AggregateResult {
        if field.is_empty() {
            return result;
        }
        let field = normalize_field(field);
        let post_cmp = self.posts.get(field.as_str()).copied();
        let user_cmp = self.users.get(field.as_str()).copied();

        result
            .into_iter()
            .map(|(source, outcome)| {
                let outcome = match outcome {
                    FetchOutcome::Structured(Payload::PostList(mut list)) => {
                        if let Some(cmp) = post_cmp {
                            list.posts.sort_by(cmp);
                        }
                        FetchOutcome::Structured(Payload::PostList(list))
                    }
                    FetchOutcome::Structured(Payload::UserPage(mut page)) => {
                        if let Some(cmp) = user_cmp {
                            page.data.sort_by(cmp);
                        }
                        FetchOutcome::Structured(Payload::UserPage(page))
                    }
                    other => other,
                };
                (source, outcome)
            })
            .collect()
    }

    /// Filter, then sort. Empty or absent specs are skipped.
    pub fn apply(
        &self,
        result: AggregateResult,
        filter_by: Option<&str>,
        sort_by: Option<&str>,
    ) -> AggregateResult {
        let filtered = match filter_by {
            Some(needle) => filter(result, needle),
            None => result,
        };
        match sort_by {
            Some(field) => self.sort(filtered, field),
            None => filtered,
        }
    }
}
