//! # sqlweave
//!
//! Composable SQL statement builders with pluggable placeholder formats.
//!
//! ## Features
//!
//! - **Immutable builders**: every method returns a new builder; clones are O(1) and
//!   never see each other's changes
//! - **Neutral placeholders**: fragments are written with `?` and rewritten once, at
//!   the final render, into `?`, `$n`, `:n` or `@pn`
//! - **Composable expressions**: `And`, `Or`, `Not`, `Eq`, `Lt`, `Like`, `CASE`, raw
//!   fragments and subqueries nest inside each other and inside statements
//! - **Pluggable runners**: attach a `tokio_postgres::Client` (or any type that
//!   implements the runner traits) and call `exec`, `query`, `query_row` or `scan`
//!
//! ```ignore
//! use sqlweave::{args, select, Eq, Expr, Or, PlaceholderFormat};
//!
//! let (sql, args) = select(&["id", "name"])
//!     .from("users")
//!     .where_clause(Eq::new().set("status", "active"))
//!     .where_clause(Or::new().add(Expr::new("age > ?", args![18])).add("vip"))
//!     .placeholder_format(PlaceholderFormat::Dollar)
//!     .to_sql()?;
//! // SELECT id, name FROM users WHERE status = $1 AND (age > $2 OR vip)
//! ```

pub mod error;
pub mod log;
pub mod placeholder;
pub mod qb;
pub mod runner;

#[cfg(feature = "pool")]
pub mod pool;

pub use error::{SqlError, SqlResult};
pub use placeholder::{PlaceholderFormat, count_placeholders, placeholders};
pub use runner::{
    BaseRunner, Context, Execer, ExecerContext, QueryRower, QueryRowerContext, Queryer,
    QueryerContext, RunnerHandle, exec_context_with, exec_with, query_context_with,
    query_row_context_with, query_row_with, query_with,
};

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};

pub use qb::{
    Alias, And, Arg, Args, Builder, CaseBuilder, ConcatExpr, DeleteBuilder, Eq, Expr, Gt, GtOrEq,
    ILike, InsertBuilder, IntoValue, Like, Lt, LtOrEq, Not, NotEq, NotILike, NotLike, Or, Part,
    Runnable, SelectBuilder, Sqlizer, StatementBuilder, UpdateBuilder, Value, case, case_of,
    debug_sqlizer, delete, insert, replace, select, update,
};
