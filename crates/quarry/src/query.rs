//! Execution surface shared by all composers.

use std::future::Future;

use crate::connection::{Connection, StreamingConnection};
use crate::error::{QueryError, QueryResult};
use crate::row::{FromRow, Row};
use crate::stream::{FromRowStream, KeyPairStream, KeyedRowStream, RowStream, ValueStream};
use crate::value::Value;

/// A renderable statement with bound values, executable against any
/// [`Connection`].
///
/// Composers only implement [`statement`](Query::statement) and
/// [`bind_values`](Query::bind_values); the fetch and yield families are
/// provided on top and forward to the connection unmodified.
pub trait Query: Sync {
    /// Render the complete SQL text.
    fn statement(&self) -> String;

    /// The bound name/value pairs in registration order.
    fn bind_values(&self) -> &[(String, Value)];

    /// Execute the statement and return the affected-row count.
    fn perform(&self, conn: &impl Connection) -> impl Future<Output = QueryResult<u64>> + Send {
        async move { conn.execute(&self.statement(), self.bind_values()).await }
    }

    /// Fetch all rows.
    fn fetch_all(
        &self,
        conn: &impl Connection,
    ) -> impl Future<Output = QueryResult<Vec<Row>>> + Send {
        async move { conn.fetch_all(&self.statement(), self.bind_values()).await }
    }

    /// Fetch the first row, if any.
    fn fetch_one(
        &self,
        conn: &impl Connection,
    ) -> impl Future<Output = QueryResult<Option<Row>>> + Send {
        async move { conn.fetch_one(&self.statement(), self.bind_values()).await }
    }

    /// Execute and return the affected-row count.
    fn fetch_affected(
        &self,
        conn: &impl Connection,
    ) -> impl Future<Output = QueryResult<u64>> + Send {
        async move {
            conn.fetch_affected(&self.statement(), self.bind_values())
                .await
        }
    }

    /// Fetch one column (by index) from every row.
    fn fetch_column(
        &self,
        conn: &impl Connection,
        index: usize,
    ) -> impl Future<Output = QueryResult<Vec<Value>>> + Send {
        async move {
            conn.fetch_column(&self.statement(), self.bind_values(), index)
                .await
        }
    }

    /// Fetch a single scalar (by index) from the first row.
    fn fetch_value(
        &self,
        conn: &impl Connection,
        index: usize,
    ) -> impl Future<Output = QueryResult<Option<Value>>> + Send {
        async move {
            conn.fetch_value(&self.statement(), self.bind_values(), index)
                .await
        }
    }

    /// Fetch first-column/second-column pairs from every row.
    fn fetch_key_pair(
        &self,
        conn: &impl Connection,
    ) -> impl Future<Output = QueryResult<Vec<(String, Value)>>> + Send {
        async move {
            conn.fetch_key_pair(&self.statement(), self.bind_values())
                .await
        }
    }

    /// Fetch rows keyed by their first column, one row per key.
    fn fetch_unique(
        &self,
        conn: &impl Connection,
    ) -> impl Future<Output = QueryResult<Vec<(String, Row)>>> + Send {
        async move {
            conn.fetch_unique(&self.statement(), self.bind_values())
                .await
        }
    }

    /// Fetch rows grouped by their first column, first-seen key order.
    fn fetch_group(
        &self,
        conn: &impl Connection,
    ) -> impl Future<Output = QueryResult<Vec<(String, Vec<Row>)>>> + Send {
        async move {
            conn.fetch_group(&self.statement(), self.bind_values())
                .await
        }
    }

    /// Fetch the first row mapped through [`FromRow`].
    fn fetch_object<T: FromRow>(
        &self,
        conn: &impl Connection,
    ) -> impl Future<Output = QueryResult<Option<T>>> + Send {
        async move {
            let row = conn.fetch_one(&self.statement(), self.bind_values()).await?;
            row.map(|r| T::from_row(&r)).transpose()
        }
    }

    /// Fetch all rows mapped through [`FromRow`].
    fn fetch_objects<T: FromRow>(
        &self,
        conn: &impl Connection,
    ) -> impl Future<Output = QueryResult<Vec<T>>> + Send {
        async move {
            let rows = conn.fetch_all(&self.statement(), self.bind_values()).await?;
            rows.iter().map(T::from_row).collect()
        }
    }

    /// Stream all rows lazily.
    fn yield_all(
        &self,
        conn: &impl StreamingConnection,
    ) -> impl Future<Output = QueryResult<RowStream>> + Send {
        async move { conn.stream(&self.statement(), self.bind_values()).await }
    }

    /// Stream one column (by index) lazily.
    fn yield_column(
        &self,
        conn: &impl StreamingConnection,
        index: usize,
    ) -> impl Future<Output = QueryResult<ValueStream>> + Send {
        async move {
            conn.yield_column(&self.statement(), self.bind_values(), index)
                .await
        }
    }

    /// Stream first-column/second-column pairs lazily.
    fn yield_key_pair(
        &self,
        conn: &impl StreamingConnection,
    ) -> impl Future<Output = QueryResult<KeyPairStream>> + Send {
        async move {
            conn.yield_key_pair(&self.statement(), self.bind_values())
                .await
        }
    }

    /// Stream rows keyed by their first column lazily.
    fn yield_unique(
        &self,
        conn: &impl StreamingConnection,
    ) -> impl Future<Output = QueryResult<KeyedRowStream>> + Send {
        async move {
            conn.yield_unique(&self.statement(), self.bind_values())
                .await
        }
    }

    /// Stream rows mapped through [`FromRow`] lazily.
    fn yield_objects<T: FromRow>(
        &self,
        conn: &impl StreamingConnection,
    ) -> impl Future<Output = QueryResult<FromRowStream<T>>> + Send {
        async move {
            let rows = conn.stream(&self.statement(), self.bind_values()).await?;
            Ok(FromRowStream::new(rows))
        }
    }

    /// Run the eager fetch named by `name` (e.g. `"fetch_unique"`).
    ///
    /// Column and value fetches use index 0; the object fetches return the
    /// plain row shapes since a runtime name cannot carry a target type.
    fn fetch_named(
        &self,
        name: &str,
        conn: &impl Connection,
    ) -> impl Future<Output = QueryResult<Fetched>> + Send {
        async move {
            let op = FetchOp::parse(name)?;
            Ok(match op {
                FetchOp::All | FetchOp::Objects => Fetched::Rows(self.fetch_all(conn).await?),
                FetchOp::One | FetchOp::Object => Fetched::Row(self.fetch_one(conn).await?),
                FetchOp::Affected => Fetched::Affected(self.fetch_affected(conn).await?),
                FetchOp::Column => Fetched::Column(self.fetch_column(conn, 0).await?),
                FetchOp::Value => Fetched::Value(self.fetch_value(conn, 0).await?),
                FetchOp::KeyPair => Fetched::KeyPairs(self.fetch_key_pair(conn).await?),
                FetchOp::Unique => Fetched::Keyed(self.fetch_unique(conn).await?),
                FetchOp::Group => Fetched::Groups(self.fetch_group(conn).await?),
            })
        }
    }

    /// Run the lazy fetch named by `name` (e.g. `"yield_column"`).
    fn yield_named(
        &self,
        name: &str,
        conn: &impl StreamingConnection,
    ) -> impl Future<Output = QueryResult<Yielded>> + Send {
        async move {
            let op = YieldOp::parse(name)?;
            Ok(match op {
                YieldOp::All | YieldOp::Objects => Yielded::Rows(self.yield_all(conn).await?),
                YieldOp::Column => Yielded::Column(self.yield_column(conn, 0).await?),
                YieldOp::KeyPair => Yielded::KeyPairs(self.yield_key_pair(conn).await?),
                YieldOp::Unique => Yielded::Keyed(self.yield_unique(conn).await?),
            })
        }
    }
}

/// The closed set of eager fetch operations addressable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOp {
    All,
    One,
    Affected,
    Column,
    Value,
    KeyPair,
    Unique,
    Group,
    Object,
    Objects,
}

impl FetchOp {
    /// Map a snake_case operation name to its op; unknown names fail with
    /// [`QueryError::UnsupportedOperation`].
    pub fn parse(name: &str) -> QueryResult<Self> {
        Ok(match name {
            "fetch_all" => Self::All,
            "fetch_one" => Self::One,
            "fetch_affected" => Self::Affected,
            "fetch_column" => Self::Column,
            "fetch_value" => Self::Value,
            "fetch_key_pair" => Self::KeyPair,
            "fetch_unique" => Self::Unique,
            "fetch_group" => Self::Group,
            "fetch_object" => Self::Object,
            "fetch_objects" => Self::Objects,
            other => return Err(QueryError::unsupported(other)),
        })
    }
}

/// The closed set of lazy fetch operations addressable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum YieldOp {
    All,
    Column,
    KeyPair,
    Unique,
    Objects,
}

impl YieldOp {
    /// Map a snake_case operation name to its op; unknown names fail with
    /// [`QueryError::UnsupportedOperation`].
    pub fn parse(name: &str) -> QueryResult<Self> {
        Ok(match name {
            "yield_all" => Self::All,
            "yield_column" => Self::Column,
            "yield_key_pair" => Self::KeyPair,
            "yield_unique" => Self::Unique,
            "yield_objects" => Self::Objects,
            other => return Err(QueryError::unsupported(other)),
        })
    }
}

/// Result of a name-dispatched eager fetch.
#[derive(Debug)]
pub enum Fetched {
    Rows(Vec<Row>),
    Row(Option<Row>),
    Affected(u64),
    Column(Vec<Value>),
    Value(Option<Value>),
    KeyPairs(Vec<(String, Value)>),
    Keyed(Vec<(String, Row)>),
    Groups(Vec<(String, Vec<Row>)>),
}

/// Result of a name-dispatched lazy fetch.
pub enum Yielded {
    Rows(RowStream),
    Column(ValueStream),
    KeyPairs(KeyPairStream),
    Keyed(KeyedRowStream),
}

// The wrapped streams are opaque, so only the variant name is shown.
impl std::fmt::Debug for Yielded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Yielded::Rows(_) => "Rows",
            Yielded::Column(_) => "Column",
            Yielded::KeyPairs(_) => "KeyPairs",
            Yielded::Keyed(_) => "Keyed",
        };
        f.debug_tuple(name).finish()
    }
}
