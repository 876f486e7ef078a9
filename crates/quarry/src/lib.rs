//! # quarry
//!
//! A programmatic SQL statement composer for Rust.
//!
//! ## Features
//!
//! - **Fluent composition**: chainable SELECT / INSERT / UPDATE / DELETE
//!   builders with a fixed rendering order, independent of call order
//! - **Bind tracking**: every inline value gets a unique `:pN` placeholder;
//!   values travel with the statement in registration order
//! - **Deep separation**: `sub_select()` and `Clone` never share state, so
//!   derived queries cannot leak bindings into each other
//! - **Set operations**: UNION / UNION ALL chaining with a shared registry
//! - **Execution bridge**: a `Connection` trait with eager fetch shapes and
//!   a `StreamingConnection` trait with lazy yield shapes
//! - **Postgres-native**: `tokio-postgres` and `deadpool-postgres` impls
//!   behind the default `postgres` and optional `pool` features
//!
//! ## Composing
//!
//! ```ignore
//! use quarry::{select, values};
//!
//! let users = select()
//!     .columns(["id", "name"])
//!     .from("users")
//!     .where_("status = ?", values!["active"])
//!     .order_by(["created_at DESC"])
//!     .limit(10);
//!
//! assert_eq!(
//!     users.get_statement(),
//!     "SELECT id, name FROM users WHERE status = :p1 \
//!      ORDER BY created_at DESC LIMIT 10"
//! );
//! ```
//!
//! ## Executing
//!
//! ```ignore
//! use quarry::{insert, Query};
//!
//! let ins = insert().into("users").column("name", "Ann").returning(["id"]);
//! let row = ins.fetch_one(&client).await?;
//! ```

#[macro_use]
pub mod value;

pub mod bind;
pub mod clause;
pub mod connection;
pub mod delete;
pub mod error;
pub mod insert;
pub mod prelude;
pub mod query;
pub mod row;
pub mod select;
pub mod stream;
pub mod update;

#[cfg(feature = "postgres")]
pub mod pg;

#[cfg(feature = "pool")]
pub mod pool;

pub use bind::Binder;
pub use connection::{Connection, StreamingConnection};
pub use delete::Delete;
pub use error::{QueryError, QueryResult};
pub use insert::Insert;
pub use query::{FetchOp, Fetched, Query, YieldOp, Yielded};
pub use row::{FromRow, Row};
pub use select::Select;
pub use stream::{FromRowStream, KeyPairStream, KeyedRowStream, RowStream, ValueStream};
pub use update::Update;
pub use value::Value;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config, create_pool_with_tls};

/// Start composing a SELECT statement.
pub fn select() -> Select {
    Select::new()
}

/// Start composing an INSERT statement.
pub fn insert() -> Insert {
    Insert::new()
}

/// Start composing an UPDATE statement.
pub fn update() -> Update {
    Update::new()
}

/// Start composing a DELETE statement.
pub fn delete() -> Delete {
    Delete::new()
}
