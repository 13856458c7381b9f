//! State-matching queries.

/// A query over a region set.
///
/// Keys are parallel region keys or state identifiers; see
/// [`Configuration`](crate::configuration::Configuration) for how a key is
/// resolved. Entries combine with logical AND, and an empty query matches
/// every configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    entries: Vec<(String, QueryNode)>,
}

/// Constraint placed on one key of a [`Query`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryNode {
    /// The key must be active (`true`) or not active (`false`).
    Is(bool),
    /// The key must be active and the nested query must match inside it.
    Nested(Query),
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint on `key`.
    pub fn with(mut self, key: impl Into<String>, node: QueryNode) -> Self {
        self.entries.push((key.into(), node));
        self
    }

    /// Require `key` to be active or not active.
    pub fn is(self, key: impl Into<String>, active: bool) -> Self {
        self.with(key, QueryNode::Is(active))
    }

    /// Require `key` to be active and `query` to match inside it.
    pub fn within(self, key: impl Into<String>, query: Query) -> Self {
        self.with(key, QueryNode::Nested(query))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &QueryNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
