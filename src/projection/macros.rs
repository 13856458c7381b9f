//! Macro for writing state-matching queries.

/// Build a [`Query`](crate::projection::Query) that mirrors the chart
/// nesting.
///
/// # Example
///
/// ```
/// use chartgate::query;
/// use chartgate::projection::{Query, QueryNode};
///
/// let query = query! {
///     DASHBOARD: {
///         issues: { ERROR: true },
///         projects: { LIST: true },
///     },
///     LOGIN: false,
/// };
///
/// let expected = Query::new()
///     .within(
///         "DASHBOARD",
///         Query::new()
///             .within("issues", Query::new().is("ERROR", true))
///             .within("projects", Query::new().is("LIST", true)),
///     )
///     .is("LOGIN", false);
/// assert_eq!(query, expected);
/// assert_eq!(query! {}, Query::new());
/// ```
#[macro_export]
macro_rules! query {
    (@node true) => {
        $crate::projection::QueryNode::Is(true)
    };
    (@node false) => {
        $crate::projection::QueryNode::Is(false)
    };
    (@node { $($inner:tt)* }) => {
        $crate::projection::QueryNode::Nested($crate::query! { $($inner)* })
    };
    ($($key:ident : $node:tt),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut query = $crate::projection::Query::new();
        $(
            query = query.with(stringify!($key), $crate::query!(@node $node));
        )*
        query
    }};
}
