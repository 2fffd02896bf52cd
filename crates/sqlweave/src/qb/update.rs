//! UPDATE statement builder.

use super::args::{Args, IntoValue, Value};
use super::builder::Builder;
use super::expr::Alias;
use super::select::SelectBuilder;
use super::sqlizer::{
    Part, Sqlizer, append_clause, append_limit_offset, append_prefixes, part, render,
};
use super::statement::{StatementData, filter_methods, statement_methods};
use crate::error::{SqlError, SqlResult};
use crate::placeholder::PlaceholderFormat;
use crate::runner::RunnerHandle;

#[derive(Clone, Debug, Default)]
pub(crate) struct UpdateData {
    placeholder_format: PlaceholderFormat,
    run_with: Option<RunnerHandle>,
    prefixes: Vec<Part>,
    table: String,
    set_clauses: Vec<(String, Value)>,
    from: Option<Part>,
    where_parts: Vec<Part>,
    order_bys: Vec<Part>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<Part>,
}

/// Builds `UPDATE t SET a = ?, b = ? [FROM ..] [WHERE ..]`.
#[derive(Clone, Debug, Default)]
pub struct UpdateBuilder(Builder<UpdateData>);

impl UpdateBuilder {
    pub(crate) fn from_statement(defaults: &StatementData) -> Self {
        Self(Builder::new(UpdateData {
            placeholder_format: defaults.placeholder_format,
            run_with: defaults.run_with.clone(),
            ..Default::default()
        }))
    }

    pub fn table(self, table: &str) -> Self {
        Self(self.0.set(|d| &mut d.table, table.to_string()))
    }

    /// Add `column = value`. Builders nest as parenthesized subqueries.
    pub fn set(self, column: &str, value: impl IntoValue) -> Self {
        let clause = (column.to_string(), value.into_value());
        Self(self.0.append(|d| &mut d.set_clauses, clause))
    }

    /// Add one SET clause per map entry, in map iteration order.
    pub fn set_map<K, M>(self, clauses: M) -> Self
    where
        K: Into<String>,
        M: IntoIterator<Item = (K, Value)>,
    {
        let clauses = clauses.into_iter().map(|(k, v)| (k.into(), v));
        Self(self.0.extend(|d| &mut d.set_clauses, clauses))
    }

    /// `FROM table` (PostgreSQL).
    pub fn from(self, from: &str) -> Self {
        Self(self.0.set(|d| &mut d.from, Some(part(from.to_string()))))
    }

    /// `FROM (subquery) AS alias`
    pub fn from_select(self, from: SelectBuilder, alias: &str) -> Self {
        let from = part(Alias::new(from, alias));
        Self(self.0.set(|d| &mut d.from, Some(from)))
    }
}

statement_methods!(UpdateBuilder);
filter_methods!(UpdateBuilder);

impl Sqlizer for UpdateBuilder {
    fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
        let data = self.0.get_struct();
        if data.table.is_empty() {
            return Err(SqlError::validation("update statements must specify a table"));
        }
        if data.set_clauses.is_empty() {
            return Err(SqlError::validation(
                "update statements must have at least one Set clause",
            ));
        }

        append_prefixes(&data.prefixes, sql, args)?;
        sql.push_str("UPDATE ");
        sql.push_str(&data.table);
        sql.push_str(" SET ");
        for (i, (column, value)) in data.set_clauses.iter().enumerate() {
            if let Value::List(_) = value {
                return Err(SqlError::validation(format!(
                    "cannot assign a value list to column {column}"
                )));
            }
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(column);
            sql.push_str(" = ");
            value.append_to_sql(sql, args)?;
        }

        if let Some(from) = &data.from {
            sql.push_str(" FROM ");
            from.append_to_sql(sql, args)?;
        }
        append_clause(" WHERE ", &data.where_parts, " AND ", sql, args)?;
        append_clause(" ORDER BY ", &data.order_bys, ", ", sql, args)?;
        append_limit_offset(sql, data.limit, data.offset);
        append_clause(" ", &data.suffixes, " ", sql, args)?;
        Ok(())
    }

    fn to_sql(&self) -> SqlResult<(String, Args)> {
        render(self, self.0.get_struct().placeholder_format)
    }
}
