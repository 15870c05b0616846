pub mod xpath;

use thiserror::Error;

use crate::domain::Document;

pub use xpath::{XPathDialect, XPathQuery};

/// Errors raised while compiling a query expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("query is empty")]
    Empty,

    #[error("unexpected {found} at position {position}")]
    Unexpected { position: usize, found: String },

    #[error("unsupported construct: {0}")]
    Unsupported(String),

    #[error("invalid selector `{css}`: {reason}")]
    Selector { css: String, reason: String },
}

/// A query that has been compiled once and can be run against any number
/// of documents.
pub trait CompiledQuery {
    /// The source expression this query was compiled from.
    fn expression(&self) -> &str;

    /// Run the query, returning the selected values in document order.
    fn evaluate(&self, document: &Document) -> Vec<String>;
}

/// A query language that turns expressions into [`CompiledQuery`] objects.
///
/// Rule and template compilation only see this trait, so the document
/// engine underneath can be swapped without touching them.
pub trait QueryDialect {
    fn name(&self) -> &str;

    fn compile(&self, expression: &str) -> Result<Box<dyn CompiledQuery>, QueryError>;
}
