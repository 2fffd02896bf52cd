//! Running a statement through the runner attached with `run_with`.

use std::future::Future;

use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

use super::sqlizer::Sqlizer;
use crate::error::{SqlError, SqlResult};
use crate::runner::{
    self, Context, RunnerHandle, exec_context_with, exec_with, query_context_with,
    query_row_context_with, query_row_with, query_with,
};

/// A statement that carries its own runner.
///
/// Every method renders the statement first; a render failure is returned before the
/// runner is touched.
pub trait Runnable: Sqlizer {
    /// The runner attached with `run_with`, if any.
    fn runner(&self) -> Option<&RunnerHandle>;

    /// Execute and return the number of affected rows.
    fn exec(&self) -> impl Future<Output = SqlResult<u64>> + Send {
        async move {
            let db = self.runner().ok_or(SqlError::RunnerNotSet)?;
            exec_with(&**db, self).await
        }
    }

    /// Execute and return all rows.
    fn query(&self) -> impl Future<Output = SqlResult<Vec<Row>>> + Send {
        async move {
            let db = self.runner().ok_or(SqlError::RunnerNotSet)?;
            query_with(&**db, self).await
        }
    }

    /// Execute and return the first row.
    ///
    /// Fails with [`SqlError::RunnerNotQueryRunner`] when the runner cannot fetch a
    /// single row.
    fn query_row(&self) -> impl Future<Output = SqlResult<Row>> + Send {
        async move {
            let db = self.runner().ok_or(SqlError::RunnerNotSet)?;
            let rower = db.as_query_rower().ok_or(SqlError::RunnerNotQueryRunner)?;
            query_row_with(rower, self).await
        }
    }

    /// Decode the first column of the first row.
    fn scan<T>(&self) -> impl Future<Output = SqlResult<T>> + Send
    where
        T: for<'a> FromSql<'a> + Send,
    {
        async move {
            let row = self.query_row().await?;
            runner::scan_first(&row)
        }
    }

    fn exec_context(&self, ctx: &Context) -> impl Future<Output = SqlResult<u64>> + Send {
        async move {
            let db = self.runner().ok_or(SqlError::RunnerNotSet)?;
            let db = db.as_execer_context().ok_or(SqlError::NoContextSupport)?;
            exec_context_with(db, ctx, self).await
        }
    }

    fn query_context(&self, ctx: &Context) -> impl Future<Output = SqlResult<Vec<Row>>> + Send {
        async move {
            let db = self.runner().ok_or(SqlError::RunnerNotSet)?;
            let db = db.as_queryer_context().ok_or(SqlError::NoContextSupport)?;
            query_context_with(db, ctx, self).await
        }
    }

    /// Context-aware [`query_row`](Self::query_row).
    ///
    /// A runner with no context support at all reports
    /// [`SqlError::RunnerNotQueryRunner`]; one that supports context queries but not
    /// single-row fetches reports [`SqlError::NoContextSupport`].
    fn query_row_context(&self, ctx: &Context) -> impl Future<Output = SqlResult<Row>> + Send {
        async move {
            let db = self.runner().ok_or(SqlError::RunnerNotSet)?;
            match db.as_query_rower_context() {
                Some(rower) => query_row_context_with(rower, ctx, self).await,
                None if db.as_queryer_context().is_none() => Err(SqlError::RunnerNotQueryRunner),
                None => Err(SqlError::NoContextSupport),
            }
        }
    }

    fn scan_context<T>(&self, ctx: &Context) -> impl Future<Output = SqlResult<T>> + Send
    where
        T: for<'a> FromSql<'a> + Send,
    {
        async move {
            let row = self.query_row_context(ctx).await?;
            runner::scan_first(&row)
        }
    }
}
