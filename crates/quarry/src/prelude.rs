//! Convenience re-exports for the common composition and execution surface.
//!
//! ```ignore
//! use quarry::prelude::*;
//! ```

pub use crate::connection::{Connection, StreamingConnection};
pub use crate::error::{QueryError, QueryResult};
pub use crate::query::{Fetched, Query, Yielded};
pub use crate::row::{FromRow, Row};
pub use crate::value::Value;
pub use crate::{delete, insert, select, update, values};
pub use crate::{Delete, Insert, Select, Update};
