//! Clause modules: independently accumulating units of a statement.
//!
//! Each module owns its SQL fragment text and delegates any literal value it
//! receives to the shared [`Binder`](crate::Binder). A module's `build()` is
//! pure over its accumulated state, renders with its own leading keyword and
//! whitespace, and returns the empty string while unused, so composers can
//! concatenate every module unconditionally in grammatical order.

mod columns;
mod conditions;
mod flags;
mod from;
mod group_by;
mod limit;
mod modify;
mod order_by;
mod returning;
mod with;

pub use columns::SelectColumns;
pub use conditions::Conditions;
pub use flags::Flags;
pub use from::FromClause;
pub use group_by::GroupBy;
pub use limit::Limit;
pub use modify::ModifyColumns;
pub use order_by::OrderBy;
pub use returning::Returning;
pub use with::With;
