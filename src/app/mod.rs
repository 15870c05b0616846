pub mod context;
pub mod error;

pub use context::{AppContext, UrlOutcome};
pub use error::{PagesiftError, Result};
