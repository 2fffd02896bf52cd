//! `CASE` expressions.

use super::args::{Args, IntoValue, Value, impl_into_value_expr};
use super::builder::Builder;
use super::sqlizer::{Part, Sqlizer, part};
use crate::error::{SqlError, SqlResult};

#[derive(Clone, Debug)]
struct WhenPart {
    when: Part,
    then: Value,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct CaseData {
    what: Option<Part>,
    when_parts: Vec<WhenPart>,
    else_value: Option<Value>,
}

/// Builds `CASE [what] WHEN .. THEN .. [ELSE ..] END`.
///
/// `THEN` and `ELSE` values bind as arguments unless they are expressions; use
/// [`Expr::raw`](crate::Expr::raw) to return a column.
#[derive(Clone, Debug, Default)]
pub struct CaseBuilder(Builder<CaseData>);

impl CaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The operand of a simple `CASE x WHEN 1 THEN ..` expression.
    pub fn what(self, what: impl Sqlizer + 'static) -> Self {
        Self(self.0.set(|d| &mut d.what, Some(part(what))))
    }

    pub fn when(self, when: impl Sqlizer + 'static, then: impl IntoValue) -> Self {
        let when_part = WhenPart {
            when: part(when),
            then: then.into_value(),
        };
        Self(self.0.append(|d| &mut d.when_parts, when_part))
    }

    pub fn else_value(self, value: impl IntoValue) -> Self {
        Self(self.0.set(|d| &mut d.else_value, Some(value.into_value())))
    }
}

impl Sqlizer for CaseBuilder {
    fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
        let data = self.0.get_struct();
        if data.when_parts.is_empty() {
            return Err(SqlError::validation(
                "case expression must contain at lease one WHEN clause",
            ));
        }

        sql.push_str("CASE");
        if let Some(what) = &data.what {
            sql.push(' ');
            what.append_to_sql(sql, args)?;
        }
        for part in &data.when_parts {
            sql.push_str(" WHEN ");
            part.when.append_to_sql(sql, args)?;
            sql.push_str(" THEN ");
            part.then.append_to_sql(sql, args)?;
        }
        if let Some(value) = &data.else_value {
            sql.push_str(" ELSE ");
            value.append_to_sql(sql, args)?;
        }
        sql.push_str(" END");
        Ok(())
    }
}

impl_into_value_expr!(CaseBuilder);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::{Eq, Expr};

    #[test]
    fn simple_case_with_operand() {
        let case = CaseBuilder::new()
            .what("status")
            .when("1", "active")
            .when("2", "banned")
            .else_value("unknown");
        let (sql, args) = case.to_sql().unwrap();
        assert_eq!(sql, "CASE status WHEN 1 THEN ? WHEN 2 THEN ? ELSE ? END");
        assert_eq!(format!("{args:?}"), r#"["active", "banned", "unknown"]"#);
    }

    #[test]
    fn searched_case_with_predicates() {
        let case = CaseBuilder::new()
            .when(Eq::new().set("a", 1), Expr::raw("b"))
            .else_value(Expr::raw("c"));
        let (sql, args) = case.to_sql().unwrap();
        assert_eq!(sql, "CASE WHEN a = ? THEN b ELSE c END");
        assert_eq!(format!("{args:?}"), "[1]");
    }

    #[test]
    fn case_without_when_fails() {
        let err = CaseBuilder::new().what("x").to_sql().unwrap_err();
        assert!(matches!(err, SqlError::Validation(_)));
    }
}
