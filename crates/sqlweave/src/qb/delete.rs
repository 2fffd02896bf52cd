//! DELETE statement builder.

use super::args::Args;
use super::builder::Builder;
use super::sqlizer::{
    Part, Sqlizer, append_clause, append_limit_offset, append_prefixes, render,
};
use super::statement::{StatementData, filter_methods, statement_methods};
use crate::error::{SqlError, SqlResult};
use crate::placeholder::PlaceholderFormat;
use crate::runner::RunnerHandle;

#[derive(Clone, Debug, Default)]
pub(crate) struct DeleteData {
    placeholder_format: PlaceholderFormat,
    run_with: Option<RunnerHandle>,
    prefixes: Vec<Part>,
    from: String,
    where_parts: Vec<Part>,
    order_bys: Vec<Part>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<Part>,
}

/// Builds `DELETE FROM t [WHERE ..] [ORDER BY ..] [LIMIT n] [OFFSET n]`.
///
/// A DELETE without any WHERE predicate removes every row; nothing guards against it.
#[derive(Clone, Debug, Default)]
pub struct DeleteBuilder(Builder<DeleteData>);

impl DeleteBuilder {
    pub(crate) fn from_statement(defaults: &StatementData) -> Self {
        Self(Builder::new(DeleteData {
            placeholder_format: defaults.placeholder_format,
            run_with: defaults.run_with.clone(),
            ..Default::default()
        }))
    }

    /// The table to delete from.
    pub fn from(self, from: &str) -> Self {
        Self(self.0.set(|d| &mut d.from, from.to_string()))
    }
}

statement_methods!(DeleteBuilder);
filter_methods!(DeleteBuilder);

impl Sqlizer for DeleteBuilder {
    fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
        let data = self.0.get_struct();
        if data.from.is_empty() {
            return Err(SqlError::validation(
                "delete statements must specify a From table",
            ));
        }

        append_prefixes(&data.prefixes, sql, args)?;
        sql.push_str("DELETE FROM ");
        sql.push_str(&data.from);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::qb::{Eq, delete};

    #[test]
    fn full_delete() {
        let (sql, args) = delete("a")
            .prefix("WITH prefix AS ?", args![0])
            .where_sql("b = ?", args![1])
            .order_by(&["c"])
            .limit(2)
            .offset(3)
            .suffix("RETURNING ?", args![4])
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "WITH prefix AS ? DELETE FROM a WHERE b = ? ORDER BY c LIMIT 2 OFFSET 3 RETURNING ?"
        );
        assert_eq!(format!("{args:?}"), "[0, 1, 4]");
    }

    #[test]
    fn delete_requires_table() {
        let err = delete("").to_sql().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: delete statements must specify a From table"
        );
    }

    #[test]
    fn where_predicates_join_with_and() {
        let (sql, args) = delete("users")
            .where_clause(Eq::new().set("id", 5))
            .where_sql("deleted_at IS NULL", args![])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "DELETE FROM users WHERE id = ? AND deleted_at IS NULL");
        assert_eq!(format!("{args:?}"), "[5]");
    }

    #[test]
    fn dollar_format() {
        let (sql, _) = delete("t")
            .where_sql("a = ? AND b = ?", args![1, 2])
            .placeholder_format(PlaceholderFormat::Dollar)
            .to_sql()
            .unwrap();
        assert_eq!(sql, "DELETE FROM t WHERE a = $1 AND b = $2");
    }

    #[test]
    fn without_where_deletes_everything() {
        assert_eq!(delete("t").to_sql().unwrap().0, "DELETE FROM t");
    }
}
