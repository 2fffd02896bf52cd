//! SELECT statement builder.

use super::args::{Args, Value};
use super::builder::Builder;
use super::expr::{Alias, Expr};
use super::sqlizer::{
    Part, Sqlizer, append_clause, append_joined, append_limit_offset, append_prefixes, part,
    render,
};
use super::statement::{StatementData, filter_methods, statement_methods};
use crate::error::{SqlError, SqlResult};
use crate::placeholder::PlaceholderFormat;
use crate::runner::RunnerHandle;

#[derive(Clone, Debug, Default)]
pub(crate) struct SelectData {
    placeholder_format: PlaceholderFormat,
    run_with: Option<RunnerHandle>,
    prefixes: Vec<Part>,
    options: Vec<String>,
    columns: Vec<Part>,
    from: Option<Part>,
    joins: Vec<Part>,
    where_parts: Vec<Part>,
    group_bys: Vec<String>,
    having_parts: Vec<Part>,
    order_bys: Vec<Part>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<Part>,
}

/// Builds `SELECT` statements.
///
/// ```ignore
/// let (sql, args) = select(&["id", "name"])
///     .from("users")
///     .where_clause(Eq::new().set("status", "active"))
///     .order_by(&["created_at DESC"])
///     .limit(20)
///     .to_sql()?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct SelectBuilder(Builder<SelectData>);

impl SelectBuilder {
    pub(crate) fn from_statement(defaults: &StatementData) -> Self {
        Self(Builder::new(SelectData {
            placeholder_format: defaults.placeholder_format,
            run_with: defaults.run_with.clone(),
            ..Default::default()
        }))
    }

    /// `SELECT DISTINCT`
    pub fn distinct(self) -> Self {
        self.options(&["DISTINCT"])
    }

    /// Keywords placed between `SELECT` and the column list.
    pub fn options(self, options: &[&str]) -> Self {
        let options = options.iter().map(|o| o.to_string());
        Self(self.0.extend(|d| &mut d.options, options))
    }

    /// Add result columns.
    pub fn columns(self, columns: &[&str]) -> Self {
        let columns = columns.iter().map(|c| part(c.to_string()));
        Self(self.0.extend(|d| &mut d.columns, columns))
    }

    /// Add a result column that is an expression, possibly with arguments.
    pub fn column(self, column: impl Sqlizer + 'static) -> Self {
        Self(self.0.append(|d| &mut d.columns, part(column)))
    }

    pub fn remove_columns(self) -> Self {
        Self(self.0.update(|d| d.columns.clear()))
    }

    pub fn from(self, from: &str) -> Self {
        Self(self.0.set(|d| &mut d.from, Some(part(from.to_string()))))
    }

    /// `FROM (subquery) AS alias`
    ///
    /// The subquery always renders neutral markers; its own placeholder format is
    /// ignored.
    pub fn from_select(self, from: SelectBuilder, alias: &str) -> Self {
        let from = part(Alias::new(from, alias));
        Self(self.0.set(|d| &mut d.from, Some(from)))
    }

    /// Add a join clause written in full, arguments included.
    pub fn join_clause(self, join: impl Sqlizer + 'static) -> Self {
        Self(self.0.append(|d| &mut d.joins, part(join)))
    }

    fn join_with(self, keyword: &str, join: &str, args: Vec<Value>) -> Self {
        self.join_clause(Expr::new(format!("{keyword} {join}"), args))
    }

    /// `JOIN <join>`; `join` includes the ON condition.
    pub fn join(self, join: &str, args: Vec<Value>) -> Self {
        self.join_with("JOIN", join, args)
    }

    pub fn left_join(self, join: &str, args: Vec<Value>) -> Self {
        self.join_with("LEFT JOIN", join, args)
    }

    pub fn right_join(self, join: &str, args: Vec<Value>) -> Self {
        self.join_with("RIGHT JOIN", join, args)
    }

    pub fn inner_join(self, join: &str, args: Vec<Value>) -> Self {
        self.join_with("INNER JOIN", join, args)
    }

    pub fn cross_join(self, join: &str, args: Vec<Value>) -> Self {
        self.join_with("CROSS JOIN", join, args)
    }

    pub fn group_by(self, group_bys: &[&str]) -> Self {
        let group_bys = group_bys.iter().map(|g| g.to_string());
        Self(self.0.extend(|d| &mut d.group_bys, group_bys))
    }

    /// Add a HAVING predicate. Predicates are joined with `AND`.
    pub fn having(self, pred: impl Sqlizer + 'static) -> Self {
        Self(self.0.append(|d| &mut d.having_parts, part(pred)))
    }

    pub fn having_sql(self, sql: impl Into<String>, args: Vec<Value>) -> Self {
        self.having(Expr::new(sql, args))
    }

    pub fn remove_limit(self) -> Self {
        Self(self.0.set(|d| &mut d.limit, None))
    }

    pub fn remove_offset(self) -> Self {
        Self(self.0.set(|d| &mut d.offset, None))
    }
}

statement_methods!(SelectBuilder);
filter_methods!(SelectBuilder);

impl Sqlizer for SelectBuilder {
    fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
        let data = self.0.get_struct();
        if data.columns.is_empty() {
            return Err(SqlError::validation(
                "select statements must have at least one result column",
            ));
        }

        append_prefixes(&data.prefixes, sql, args)?;
        sql.push_str("SELECT ");
        if !data.options.is_empty() {
            sql.push_str(&data.options.join(" "));
            sql.push(' ');
        }
        append_joined(&data.columns, ", ", sql, args)?;

        if let Some(from) = &data.from {
            sql.push_str(" FROM ");
            from.append_to_sql(sql, args)?;
        }
        append_clause(" ", &data.joins, " ", sql, args)?;
        append_clause(" WHERE ", &data.where_parts, " AND ", sql, args)?;
        if !data.group_bys.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&data.group_bys.join(", "));
        }
        append_clause(" HAVING ", &data.having_parts, " AND ", sql, args)?;
        append_clause(" ORDER BY ", &data.order_bys, ", ", sql, args)?;
        append_limit_offset(sql, data.limit, data.offset);
        append_clause(" ", &data.suffixes, " ", sql, args)?;
        Ok(())
    }

    fn to_sql(&self) -> SqlResult<(String, Args)> {
        render(self, self.0.get_struct().placeholder_format)
    }
}
