//! `StatementBuilder` and the methods every statement builder shares.

use super::builder::Builder;
use super::delete::DeleteBuilder;
use super::insert::InsertBuilder;
use super::select::SelectBuilder;
use super::update::UpdateBuilder;
use crate::placeholder::PlaceholderFormat;
use crate::runner::{BaseRunner, RunnerHandle};

/// Defaults applied to every statement started from a [`StatementBuilder`].
#[derive(Clone, Debug, Default)]
pub(crate) struct StatementData {
    pub(crate) placeholder_format: PlaceholderFormat,
    pub(crate) run_with: Option<RunnerHandle>,
}

/// A template for starting statements with a shared placeholder format and runner.
///
/// ```ignore
/// let psql = StatementBuilder::new()
///     .placeholder_format(PlaceholderFormat::Dollar)
///     .run_with(client);
/// let rows = psql.select(&["id"]).from("users").query().await?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct StatementBuilder(Builder<StatementData>);

impl StatementBuilder {
    /// `?` placeholders and no runner.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placeholder_format(self, format: PlaceholderFormat) -> Self {
        Self(self.0.set(|d| &mut d.placeholder_format, format))
    }

    pub fn run_with<R: BaseRunner + 'static>(self, runner: R) -> Self {
        self.run_with_handle(RunnerHandle::new(runner))
    }

    pub fn run_with_handle(self, runner: RunnerHandle) -> Self {
        Self(self.0.set(|d| &mut d.run_with, Some(runner)))
    }

    pub fn select(&self, columns: &[&str]) -> SelectBuilder {
        SelectBuilder::from_statement(self.0.get_struct()).columns(columns)
    }

    pub fn insert(&self, into: &str) -> InsertBuilder {
        InsertBuilder::from_statement(self.0.get_struct(), "INSERT").into_table(into)
    }

    /// `REPLACE INTO`, otherwise identical to [`insert`](Self::insert).
    pub fn replace(&self, into: &str) -> InsertBuilder {
        InsertBuilder::from_statement(self.0.get_struct(), "REPLACE").into_table(into)
    }

    pub fn update(&self, table: &str) -> UpdateBuilder {
        UpdateBuilder::from_statement(self.0.get_struct()).table(table)
    }

    pub fn delete(&self, from: &str) -> DeleteBuilder {
        DeleteBuilder::from_statement(self.0.get_struct()).from(from)
    }
}

/// Placeholder format, runner, prefix and suffix setters shared by every statement.
macro_rules! statement_methods {
    ($name:ident) => {
        impl $name {
            /// Placeholder format used by the final render.
            ///
            /// Ignored when this statement is nested inside another one.
            pub fn placeholder_format(self, format: $crate::placeholder::PlaceholderFormat) -> Self {
                Self(self.0.set(|d| &mut d.placeholder_format, format))
            }

            /// Attach the runner used by `exec`, `query`, `query_row` and `scan`.
            pub fn run_with<R: $crate::runner::BaseRunner + 'static>(self, runner: R) -> Self {
                self.run_with_handle($crate::runner::RunnerHandle::new(runner))
            }

            pub fn run_with_handle(self, runner: $crate::runner::RunnerHandle) -> Self {
                Self(self.0.set(|d| &mut d.run_with, Some(runner)))
            }

            /// Add a fragment placed before the statement, e.g. a `WITH` clause.
            pub fn prefix(self, sql: impl Into<String>, args: Vec<$crate::qb::args::Value>) -> Self {
                self.prefix_expr($crate::qb::expr::Expr::new(sql, args))
            }

            pub fn prefix_expr(self, expr: impl $crate::qb::sqlizer::Sqlizer + 'static) -> Self {
                Self(self.0.append(|d| &mut d.prefixes, $crate::qb::sqlizer::part(expr)))
            }

            /// Add a fragment placed after the statement, e.g. `RETURNING id`.
            pub fn suffix(self, sql: impl Into<String>, args: Vec<$crate::qb::args::Value>) -> Self {
                self.suffix_expr($crate::qb::expr::Expr::new(sql, args))
            }

            pub fn suffix_expr(self, expr: impl $crate::qb::sqlizer::Sqlizer + 'static) -> Self {
                Self(self.0.append(|d| &mut d.suffixes, $crate::qb::sqlizer::part(expr)))
            }
        }

        impl $crate::qb::traits::Runnable for $name {
            fn runner(&self) -> Option<&$crate::runner::RunnerHandle> {
                self.0.get_struct().run_with.as_ref()
            }
        }

        $crate::qb::args::impl_into_value_subquery!($name);
    };
}
pub(crate) use statement_methods;

/// WHERE, ORDER BY, LIMIT and OFFSET setters for SELECT, UPDATE and DELETE.
macro_rules! filter_methods {
    ($name:ident) => {
        impl $name {
            /// Add a WHERE predicate. Predicates are joined with `AND`.
            pub fn where_clause(self, pred: impl $crate::qb::sqlizer::Sqlizer + 'static) -> Self {
                Self(self.0.append(|d| &mut d.where_parts, $crate::qb::sqlizer::part(pred)))
            }

            /// Add a raw WHERE predicate with arguments.
            pub fn where_sql(self, sql: impl Into<String>, args: Vec<$crate::qb::args::Value>) -> Self {
                self.where_clause($crate::qb::expr::Expr::new(sql, args))
            }

            pub fn order_by(self, order_bys: &[&str]) -> Self {
                let parts = order_bys
                    .iter()
                    .map(|o| $crate::qb::sqlizer::part(o.to_string()));
                Self(self.0.extend(|d| &mut d.order_bys, parts))
            }

            /// Add an ORDER BY term that carries arguments.
            pub fn order_by_clause(self, expr: impl $crate::qb::sqlizer::Sqlizer + 'static) -> Self {
                Self(self.0.append(|d| &mut d.order_bys, $crate::qb::sqlizer::part(expr)))
            }

            pub fn limit(self, limit: u64) -> Self {
                Self(self.0.set(|d| &mut d.limit, Some(limit)))
            }

            pub fn offset(self, offset: u64) -> Self {
                Self(self.0.set(|d| &mut d.offset, Some(offset)))
            }
        }
    };
}
pub(crate) use filter_methods;
