use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the matching APIs.
///
/// Finding no mapping is not an error; those calls return an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// A query graph was passed where a concrete molecule is required.
    #[error("a query graph cannot be used as the first (target) argument")]
    QueryAsTarget,
    /// The resolution-graph search ran past its configured deadline.
    #[error("resolution graph search timed out after {limit:?}")]
    Timeout { limit: Duration },
}
