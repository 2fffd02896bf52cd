//! INSERT / REPLACE statement builder.

use std::collections::HashMap;

use super::args::{Args, Value};
use super::builder::Builder;
use super::select::SelectBuilder;
use super::sqlizer::{Part, Sqlizer, append_clause, append_prefixes, render};
use super::statement::{StatementData, statement_methods};
use crate::error::{SqlError, SqlResult};
use crate::placeholder::PlaceholderFormat;
use crate::runner::RunnerHandle;

#[derive(Clone, Debug)]
pub(crate) struct InsertData {
    placeholder_format: PlaceholderFormat,
    run_with: Option<RunnerHandle>,
    prefixes: Vec<Part>,
    statement_keyword: &'static str,
    options: Vec<String>,
    into: String,
    columns: Vec<String>,
    values: Vec<Vec<Value>>,
    select: Option<SelectBuilder>,
    suffixes: Vec<Part>,
    build_error: Option<String>,
}

impl Default for InsertData {
    fn default() -> Self {
        Self {
            placeholder_format: PlaceholderFormat::default(),
            run_with: None,
            prefixes: Vec::new(),
            statement_keyword: "INSERT",
            options: Vec::new(),
            into: String::new(),
            columns: Vec::new(),
            values: Vec::new(),
            select: None,
            suffixes: Vec::new(),
            build_error: None,
        }
    }
}

/// Builds `INSERT INTO t (cols) VALUES (..),(..)` and `INSERT .. SELECT`.
#[derive(Clone, Debug, Default)]
pub struct InsertBuilder(Builder<InsertData>);

impl InsertBuilder {
    pub(crate) fn from_statement(defaults: &StatementData, keyword: &'static str) -> Self {
        Self(Builder::new(InsertData {
            placeholder_format: defaults.placeholder_format,
            run_with: defaults.run_with.clone(),
            statement_keyword: keyword,
            ..Default::default()
        }))
    }

    /// Keywords placed between `INSERT` and `INTO`, e.g. `IGNORE`.
    pub fn options(self, options: &[&str]) -> Self {
        let options = options.iter().map(|o| o.to_string());
        Self(self.0.extend(|d| &mut d.options, options))
    }

    /// The target table.
    pub fn into_table(self, into: &str) -> Self {
        Self(self.0.set(|d| &mut d.into, into.to_string()))
    }

    pub fn columns(self, columns: &[&str]) -> Self {
        let columns = columns.iter().map(|c| c.to_string());
        Self(self.0.extend(|d| &mut d.columns, columns))
    }

    /// Add one row of values.
    pub fn values(self, row: Vec<Value>) -> Self {
        Self(self.0.append(|d| &mut d.values, row))
    }

    /// Replace columns and rows with a single row taken from a column-to-value map.
    pub fn set_map<K, M>(self, clauses: M) -> Self
    where
        K: Into<String>,
        M: IntoIterator<Item = (K, Value)>,
    {
        let (columns, row): (Vec<String>, Vec<Value>) =
            clauses.into_iter().map(|(k, v)| (k.into(), v)).unzip();
        Self(self.0.update(move |d| {
            d.columns = columns;
            d.values = vec![row];
        }))
    }

    /// Append a row from a column-to-value map.
    ///
    /// The first map fixes the column list. Later maps are aligned to it; a missing or
    /// unknown column is recorded and reported when the statement renders.
    pub fn add_map<K, M>(self, clauses: M) -> Self
    where
        K: Into<String>,
        M: IntoIterator<Item = (K, Value)>,
    {
        let clauses: Vec<(String, Value)> =
            clauses.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self(self.0.update(move |d| {
            if d.columns.is_empty() && d.values.is_empty() {
                let (columns, row) = clauses.into_iter().unzip();
                d.columns = columns;
                d.values.push(row);
                return;
            }

            let mut lookup: HashMap<String, Value> = clauses.into_iter().collect();
            let mut row = Vec::with_capacity(d.columns.len());
            for column in &d.columns {
                match lookup.remove(column) {
                    Some(value) => row.push(value),
                    None => {
                        d.build_error
                            .get_or_insert_with(|| format!("add_map: no value for column {column}"));
                        row.push(Value::Default);
                    }
                }
            }
            if let Some(extra) = lookup.keys().next() {
                d.build_error
                    .get_or_insert_with(|| format!("add_map: unknown column {extra}"));
            }
            d.values.push(row);
        }))
    }

    /// `INSERT INTO t (cols) SELECT ..` instead of a VALUES list.
    pub fn select(self, select: SelectBuilder) -> Self {
        Self(self.0.set(|d| &mut d.select, Some(select)))
    }
}

statement_methods!(InsertBuilder);

impl Sqlizer for InsertBuilder {
    fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
        let data = self.0.get_struct();
        if data.into.is_empty() {
            return Err(SqlError::validation("insert statements must specify a table"));
        }
        if data.values.is_empty() && data.select.is_none() {
            return Err(SqlError::validation(
                "insert statements must have at least one set of values or select clause",
            ));
        }
        if let Some(err) = &data.build_error {
            return Err(SqlError::validation(err.clone()));
        }

        append_prefixes(&data.prefixes, sql, args)?;
        sql.push_str(data.statement_keyword);
        sql.push(' ');
        if !data.options.is_empty() {
            sql.push_str(&data.options.join(" "));
            sql.push(' ');
        }
        sql.push_str("INTO ");
        sql.push_str(&data.into);
        sql.push(' ');
        if !data.columns.is_empty() {
            sql.push('(');
            sql.push_str(&data.columns.join(","));
            sql.push_str(") ");
        }

        match &data.select {
            Some(select) => select.append_to_sql(sql, args)?,
            None => {
                sql.push_str("VALUES ");
                for (i, row) in data.values.iter().enumerate() {
                    if i > 0 {
                        sql.push(',');
                    }
                    sql.push('(');
                    for (j, value) in row.iter().enumerate() {
                        if let Value::List(_) = value {
                            return Err(SqlError::validation(match data.columns.get(j) {
                                Some(column) => {
                                    format!("cannot assign a value list to column {column}")
                                }
                                None => format!("cannot assign a value list to value {}", j + 1),
                            }));
                        }
                        if j > 0 {
                            sql.push(',');
                        }
                        value.append_to_sql(sql, args)?;
                    }
                    sql.push(')');
                }
            }
        }

        append_clause(" ", &data.suffixes, " ", sql, args)?;
        Ok(())
    }

    fn to_sql(&self) -> SqlResult<(String, Args)> {
        render(self, self.0.get_struct().placeholder_format)
    }
}
