//! Lazy result streams for the yield family.
//!
//! Each stream is a thin shape adapter over a type-erased [`RowStream`], so a
//! connection only has to produce rows; the key-pair/column/unique shapes are
//! derived here, one element at a time.

use crate::error::{QueryError, QueryResult};
use crate::row::{FromRow, Row};
use crate::value::Value;
use futures_core::Stream;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A stream of database rows.
///
/// Type-erased wrapper around a `Stream<Item = QueryResult<Row>>` so that
/// different connection implementations can return a uniform streaming type.
#[must_use]
pub struct RowStream {
    inner: Pin<Box<dyn Stream<Item = QueryResult<Row>> + Send>>,
}

impl RowStream {
    /// Create a new `RowStream` from any compatible stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = QueryResult<Row>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl Stream for RowStream {
    type Item = QueryResult<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// A stream of one column's values.
#[must_use]
pub struct ValueStream {
    inner: RowStream,
    column: usize,
}

impl ValueStream {
    /// Wrap a row stream, yielding the value at `column` from each row.
    pub fn new(inner: RowStream, column: usize) -> Self {
        Self { inner, column }
    }
}

impl Stream for ValueStream {
    type Item = QueryResult<Value>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let column = self.column;
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(row))) => Poll::Ready(Some(
                row.get(column)
                    .cloned()
                    .ok_or_else(|| QueryError::decode(column.to_string(), "column index out of range")),
            )),
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// A stream of (first column as text key, second column value) pairs.
#[must_use]
pub struct KeyPairStream {
    inner: RowStream,
}

impl KeyPairStream {
    /// Wrap a row stream of at-least-two-column rows.
    pub fn new(inner: RowStream) -> Self {
        Self { inner }
    }
}

impl Stream for KeyPairStream {
    type Item = QueryResult<(String, Value)>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(row))) => Poll::Ready(Some(key_pair_of(row))),
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

pub(crate) fn key_pair_of(row: Row) -> QueryResult<(String, Value)> {
    let key = row.key_text()?;
    let value = row
        .get(1)
        .cloned()
        .ok_or_else(|| QueryError::decode("1", "key-pair row needs two columns"))?;
    Ok((key, value))
}

/// A stream of (first column as text key, remaining columns as row) pairs.
#[must_use]
pub struct KeyedRowStream {
    inner: RowStream,
}

impl KeyedRowStream {
    /// Wrap a row stream, splitting the first column off each row as its key.
    pub fn new(inner: RowStream) -> Self {
        Self { inner }
    }
}

impl Stream for KeyedRowStream {
    type Item = QueryResult<(String, Row)>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(row))) => Poll::Ready(Some(row.split_key())),
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// A stream of rows mapped through [`FromRow`].
#[must_use]
pub struct FromRowStream<T> {
    inner: RowStream,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromRow> FromRowStream<T> {
    /// Wrap a row stream, mapping each row into `T`.
    pub fn new(inner: RowStream) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

impl<T: FromRow> Stream for FromRowStream<T> {
    type Item = QueryResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(row))) => Poll::Ready(Some(T::from_row(&row))),
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
