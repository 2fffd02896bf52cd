//! Runner capabilities: the database side of a statement.
//!
//! A runner is anything that can execute SQL text with bound arguments. Capabilities
//! are split into small traits so a runner only promises what it can do:
//!
//! - [`Execer`] / [`Queryer`]: required of every runner a builder stores ([`BaseRunner`])
//! - [`QueryRower`]: single-row queries
//! - [`ExecerContext`] / [`QueryerContext`] / [`QueryRowerContext`]: the same calls
//!   honoring a [`Context`] (deadline and tag)
//!
//! The free `*_with` functions check capabilities at compile time. Builders hold a
//! type-erased [`RunnerHandle`] and discover optional capabilities through the
//! `as_*` accessors on [`BaseRunner`].

use std::fmt;
use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, ToSql};

use crate::error::{SqlError, SqlResult};
use crate::log;
use crate::qb::Sqlizer;

/// Per-call options for the context-aware runner methods.
#[derive(Debug, Clone, Default)]
pub struct Context {
    timeout: Option<Duration>,
    tag: Option<String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the call with [`SqlError::Timeout`] once `timeout` has elapsed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// A label carried into log events.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Drive `future` to completion under this context's deadline.
    pub async fn run<T, F>(&self, future: F) -> SqlResult<T>
    where
        F: Future<Output = SqlResult<T>>,
    {
        match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, future).await {
                Ok(result) => result,
                Err(_) => Err(SqlError::Timeout(timeout)),
            },
            None => future.await,
        }
    }
}

#[async_trait]
pub trait Execer: Send + Sync {
    /// Execute a statement and return the number of affected rows.
    async fn exec(&self, sql: &str, args: &[&(dyn ToSql + Sync)]) -> SqlResult<u64>;
}

#[async_trait]
pub trait Queryer: Send + Sync {
    async fn query(&self, sql: &str, args: &[&(dyn ToSql + Sync)]) -> SqlResult<Vec<Row>>;
}

#[async_trait]
pub trait QueryRower: Send + Sync {
    /// Return the first row. Zero rows is [`SqlError::NotFound`].
    async fn query_row(&self, sql: &str, args: &[&(dyn ToSql + Sync)]) -> SqlResult<Row>;
}

#[async_trait]
pub trait ExecerContext: Send + Sync {
    async fn exec_context(
        &self,
        ctx: &Context,
        sql: &str,
        args: &[&(dyn ToSql + Sync)],
    ) -> SqlResult<u64>;
}

#[async_trait]
pub trait QueryerContext: Send + Sync {
    async fn query_context(
        &self,
        ctx: &Context,
        sql: &str,
        args: &[&(dyn ToSql + Sync)],
    ) -> SqlResult<Vec<Row>>;
}

#[async_trait]
pub trait QueryRowerContext: Send + Sync {
    async fn query_row_context(
        &self,
        ctx: &Context,
        sql: &str,
        args: &[&(dyn ToSql + Sync)],
    ) -> SqlResult<Row>;
}

/// The minimum a builder's stored runner must do, plus optional capabilities.
pub trait BaseRunner: Execer + Queryer {
    fn as_query_rower(&self) -> Option<&dyn QueryRower> {
        None
    }

    fn as_execer_context(&self) -> Option<&dyn ExecerContext> {
        None
    }

    fn as_queryer_context(&self) -> Option<&dyn QueryerContext> {
        None
    }

    fn as_query_rower_context(&self) -> Option<&dyn QueryRowerContext> {
        None
    }
}

/// A shared, type-erased runner stored inside builders.
///
/// The runner must be `'static`. A borrowed runner such as a
/// `tokio_postgres::Transaction<'_>` cannot be stored; pass it to
/// [`exec_with`], [`query_with`] or [`query_row_with`] instead.
#[derive(Clone)]
pub struct RunnerHandle(Arc<dyn BaseRunner>);

impl RunnerHandle {
    pub fn new<R: BaseRunner + 'static>(runner: R) -> Self {
        Self(Arc::new(runner))
    }

    pub fn from_arc(runner: Arc<dyn BaseRunner>) -> Self {
        Self(runner)
    }
}

impl Deref for RunnerHandle {
    type Target = dyn BaseRunner;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Debug for RunnerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RunnerHandle").field(&"<dyn BaseRunner>").finish()
    }
}

fn render_for<S: Sqlizer + ?Sized>(op: &'static str, s: &S) -> SqlResult<(String, crate::qb::Args)> {
    s.to_sql().inspect_err(|err| log::render_failed(op, err))
}

/// Render `s` and execute it on `db`.
pub async fn exec_with<E, S>(db: &E, s: &S) -> SqlResult<u64>
where
    E: Execer + ?Sized,
    S: Sqlizer + ?Sized,
{
    let (sql, args) = render_for("exec", s)?;
    log::statement("exec", None, &sql, args.len());
    db.exec(&sql, &args.as_refs()).await
}

/// Render `s` and query it on `db`.
pub async fn query_with<Q, S>(db: &Q, s: &S) -> SqlResult<Vec<Row>>
where
    Q: Queryer + ?Sized,
    S: Sqlizer + ?Sized,
{
    let (sql, args) = render_for("query", s)?;
    log::statement("query", None, &sql, args.len());
    db.query(&sql, &args.as_refs()).await
}

/// Render `s` and fetch its first row from `db`.
pub async fn query_row_with<R, S>(db: &R, s: &S) -> SqlResult<Row>
where
    R: QueryRower + ?Sized,
    S: Sqlizer + ?Sized,
{
    let (sql, args) = render_for("query_row", s)?;
    log::statement("query_row", None, &sql, args.len());
    db.query_row(&sql, &args.as_refs()).await
}

pub async fn exec_context_with<E, S>(db: &E, ctx: &Context, s: &S) -> SqlResult<u64>
where
    E: ExecerContext + ?Sized,
    S: Sqlizer + ?Sized,
{
    let (sql, args) = render_for("exec", s)?;
    log::statement("exec", ctx.tag(), &sql, args.len());
    db.exec_context(ctx, &sql, &args.as_refs()).await
}

pub async fn query_context_with<Q, S>(db: &Q, ctx: &Context, s: &S) -> SqlResult<Vec<Row>>
where
    Q: QueryerContext + ?Sized,
    S: Sqlizer + ?Sized,
{
    let (sql, args) = render_for("query", s)?;
    log::statement("query", ctx.tag(), &sql, args.len());
    db.query_context(ctx, &sql, &args.as_refs()).await
}

pub async fn query_row_context_with<R, S>(db: &R, ctx: &Context, s: &S) -> SqlResult<Row>
where
    R: QueryRowerContext + ?Sized,
    S: Sqlizer + ?Sized,
{
    let (sql, args) = render_for("query_row", s)?;
    log::statement("query_row", ctx.tag(), &sql, args.len());
    db.query_row_context(ctx, &sql, &args.as_refs()).await
}

/// Decode the first column of `row`.
pub fn scan_first<T>(row: &Row) -> SqlResult<T>
where
    T: for<'a> FromSql<'a>,
{
    row.try_get(0)
        .map_err(|e| SqlError::decode("0", e.to_string()))
}

fn first_row(rows: Vec<Row>) -> SqlResult<Row> {
    rows.into_iter()
        .next()
        .ok_or_else(|| SqlError::not_found("query returned no rows"))
}

/// Runner impls for types exposing tokio-postgres' `execute` / `query` methods.
macro_rules! impl_postgres_runner {
    ($ty:ty $(, $lt:lifetime)?) => {
        #[async_trait]
        impl$(<$lt>)? Execer for $ty {
            async fn exec(&self, sql: &str, args: &[&(dyn ToSql + Sync)]) -> SqlResult<u64> {
                <$ty>::execute(self, sql, args).await.map_err(SqlError::from)
            }
        }

        #[async_trait]
        impl$(<$lt>)? Queryer for $ty {
            async fn query(&self, sql: &str, args: &[&(dyn ToSql + Sync)]) -> SqlResult<Vec<Row>> {
                <$ty>::query(self, sql, args).await.map_err(SqlError::from)
            }
        }

        #[async_trait]
        impl$(<$lt>)? QueryRower for $ty {
            async fn query_row(&self, sql: &str, args: &[&(dyn ToSql + Sync)]) -> SqlResult<Row> {
                first_row(Queryer::query(self, sql, args).await?)
            }
        }

        #[async_trait]
        impl$(<$lt>)? ExecerContext for $ty {
            async fn exec_context(
                &self,
                ctx: &Context,
                sql: &str,
                args: &[&(dyn ToSql + Sync)],
            ) -> SqlResult<u64> {
                ctx.run(Execer::exec(self, sql, args)).await
            }
        }

        #[async_trait]
        impl$(<$lt>)? QueryerContext for $ty {
            async fn query_context(
                &self,
                ctx: &Context,
                sql: &str,
                args: &[&(dyn ToSql + Sync)],
            ) -> SqlResult<Vec<Row>> {
                ctx.run(Queryer::query(self, sql, args)).await
            }
        }

        #[async_trait]
        impl$(<$lt>)? QueryRowerContext for $ty {
            async fn query_row_context(
                &self,
                ctx: &Context,
                sql: &str,
                args: &[&(dyn ToSql + Sync)],
            ) -> SqlResult<Row> {
                ctx.run(QueryRower::query_row(self, sql, args)).await
            }
        }

        impl$(<$lt>)? BaseRunner for $ty {
            fn as_query_rower(&self) -> Option<&dyn QueryRower> {
                Some(self)
            }

            fn as_execer_context(&self) -> Option<&dyn ExecerContext> {
                Some(self)
            }

            fn as_queryer_context(&self) -> Option<&dyn QueryerContext> {
                Some(self)
            }

            fn as_query_rower_context(&self) -> Option<&dyn QueryRowerContext> {
                Some(self)
            }
        }
    };
}

impl_postgres_runner!(tokio_postgres::Client);
// Borrows its client, so only usable through the `*_with` functions.
impl_postgres_runner!(tokio_postgres::Transaction<'a>, 'a);

#[async_trait]
impl<R: Execer + ?Sized> Execer for Arc<R> {
    async fn exec(&self, sql: &str, args: &[&(dyn ToSql + Sync)]) -> SqlResult<u64> {
        (**self).exec(sql, args).await
    }
}

#[async_trait]
impl<R: Queryer + ?Sized> Queryer for Arc<R> {
    async fn query(&self, sql: &str, args: &[&(dyn ToSql + Sync)]) -> SqlResult<Vec<Row>> {
        (**self).query(sql, args).await
    }
}

impl<R: BaseRunner + ?Sized> BaseRunner for Arc<R> {
    fn as_query_rower(&self) -> Option<&dyn QueryRower> {
        (**self).as_query_rower()
    }

    fn as_execer_context(&self) -> Option<&dyn ExecerContext> {
        (**self).as_execer_context()
    }

    fn as_queryer_context(&self) -> Option<&dyn QueryerContext> {
        (**self).as_queryer_context()
    }

    fn as_query_rower_context(&self) -> Option<&dyn QueryRowerContext> {
        (**self).as_query_rower_context()
    }
}
