//! Core engine errors.

use thiserror::Error;

use crate::proto::SearchOperator;
use crate::query::ResolveError;

/// Errors raised while building or running a query.
///
/// Every variant is a deterministic function of the request and maps to a
/// client-side validation failure.
#[derive(Debug, Error)]
pub enum Error {
    /// A filter clause names a field the entity does not have.
    #[error("cannot filter with {operator}: {source}")]
    Filter {
        /// Operator of the rejected clause.
        operator: SearchOperator,
        /// Resolution failure.
        #[source]
        source: ResolveError,
    },

    /// A filter clause omits the operand its operator needs.
    #[error("{operator} on `{field}` requires a value")]
    MissingValue {
        /// Field path of the clause.
        field: String,
        /// Operator of the clause.
        operator: SearchOperator,
    },

    /// The request failed decoding or paging validation.
    #[error("invalid request: {0}")]
    Protocol(#[from] dynquery_proto::Error),

    /// Engine configuration could not be read.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
