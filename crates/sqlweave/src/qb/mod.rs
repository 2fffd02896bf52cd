//! Statement builders and the expression layer.
//!
//! Every builder is an immutable value: each method consumes `self` and returns a new
//! builder, and clones share their record until one of them changes it. A partly built
//! query can be kept as a template and extended in different directions.
//!
//! # Usage
//!
//! ```ignore
//! use sqlweave::{args, qb, Eq, PlaceholderFormat, Runnable};
//!
//! // SELECT
//! let (sql, args) = qb::select(&["id", "name"])
//!     .from("users")
//!     .where_clause(Eq::new().set("status", "active"))
//!     .order_by(&["created_at DESC"])
//!     .limit(20)
//!     .placeholder_format(PlaceholderFormat::Dollar)
//!     .to_sql()?;
//!
//! // INSERT
//! qb::insert("users")
//!     .columns(&["username", "email"])
//!     .values(args!["alice", "alice@example.com"])
//!     .suffix("RETURNING id", args![])
//!     .run_with(client)
//!     .scan::<i64>()
//!     .await?;
//!
//! // UPDATE
//! qb::update("users")
//!     .set("status", "inactive")
//!     .where_sql("id = ?", args![user_id])
//!     .run_with(client)
//!     .exec()
//!     .await?;
//! ```

mod args;
mod builder;
mod case;
mod delete;
mod expr;
mod insert;
mod select;
mod sqlizer;
mod statement;
mod traits;
mod update;

pub use args::{Arg, Args, IntoValue, Value};
pub use builder::Builder;
pub use case::CaseBuilder;
pub use delete::DeleteBuilder;
pub use expr::{
    Alias, And, ConcatExpr, Eq, Expr, Gt, GtOrEq, ILike, Like, Lt, LtOrEq, Not, NotEq, NotILike,
    NotLike, Or, debug_sqlizer,
};
pub use insert::InsertBuilder;
pub use select::SelectBuilder;
pub use sqlizer::{Part, Sqlizer};
pub use statement::StatementBuilder;
pub use traits::Runnable;
pub use update::UpdateBuilder;

/// Start a SELECT with the given result columns.
///
/// # Example
/// ```ignore
/// let q = sqlweave::qb::select(&["id"]).from("users");
/// ```
pub fn select(columns: &[&str]) -> SelectBuilder {
    StatementBuilder::new().select(columns)
}

/// Start an INSERT into `into`.
pub fn insert(into: &str) -> InsertBuilder {
    StatementBuilder::new().insert(into)
}

/// Start a `REPLACE INTO` (MySQL, SQLite).
pub fn replace(into: &str) -> InsertBuilder {
    StatementBuilder::new().replace(into)
}

/// Start an UPDATE of `table`.
pub fn update(table: &str) -> UpdateBuilder {
    StatementBuilder::new().update(table)
}

/// Start a DELETE from `from`.
pub fn delete(from: &str) -> DeleteBuilder {
    StatementBuilder::new().delete(from)
}

/// Start a searched `CASE WHEN .. END`.
pub fn case() -> CaseBuilder {
    CaseBuilder::new()
}

/// Start a simple `CASE what WHEN .. END`.
pub fn case_of(what: impl Sqlizer + 'static) -> CaseBuilder {
    CaseBuilder::new().what(what)
}

#[cfg(test)]
mod tests;
