//! Expression composition: raw fragments, boolean groups and column comparisons.
//!
//! Every type here is a [`Sqlizer`] and renders neutral `?` markers, so expressions
//! nest freely inside each other and inside statement builders.
//!
//! Comparison maps (`Eq`, `Lt`, `Like`, ...) are backed by a `HashMap`. Their entries
//! render joined by `AND` in map iteration order, which is not stable.

use std::collections::HashMap;
use std::fmt::Write;

use super::args::{Args, IntoValue, Value, impl_into_value_expr};
use super::sqlizer::{Part, Sqlizer, append_joined, check_placeholders, part};
use crate::error::{SqlError, SqlResult};
use crate::placeholder::{Segment, Segments};

/// A raw SQL fragment with `?` markers and the values that fill them.
///
/// Plain values are appended verbatim. When a value is an expression, a subquery or
/// a list, the matching `?` is replaced in place by its rendering.
#[derive(Clone, Debug)]
pub struct Expr {
    sql: String,
    args: Vec<Value>,
}

impl Expr {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// A fragment with no arguments.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }
}

impl Sqlizer for Expr {
    fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
        if self.args.iter().all(Value::is_plain_arg) {
            sql.push_str(&self.sql);
            for value in &self.args {
                value.append_to_sql(&mut String::new(), args)?;
            }
            return Ok(());
        }

        let mut values = self.args.iter();
        for segment in Segments::new(&self.sql) {
            match segment {
                Segment::Text(text) => sql.push_str(text),
                Segment::Escaped => sql.push_str("??"),
                Segment::Marker => match values.next() {
                    Some(value) => value.append_to_sql(sql, args)?,
                    None => sql.push('?'),
                },
            }
        }
        // Surplus values still bind so the final count check reports them.
        for value in values {
            value.append_to_sql(&mut String::new(), args)?;
        }
        Ok(())
    }
}

/// Concatenation of fragments with no separator.
///
/// ```ignore
/// let name = ConcatExpr::new()
///     .push("COALESCE(full_name, ")
///     .push(Expr::new("CONCAT(?, ' ', ?)", args!["first", "last"]))
///     .push(")");
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConcatExpr(Vec<Part>);

impl ConcatExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, fragment: impl Sqlizer + 'static) -> Self {
        self.0.push(part(fragment));
        self
    }
}

impl Sqlizer for ConcatExpr {
    fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
        for fragment in &self.0 {
            fragment.append_to_sql(sql, args)?;
        }
        Ok(())
    }
}

/// `(expr) AS alias`, mostly for result columns.
#[derive(Clone, Debug)]
pub struct Alias {
    expr: Part,
    alias: String,
}

impl Alias {
    pub fn new(expr: impl Sqlizer + 'static, alias: impl Into<String>) -> Self {
        Self {
            expr: part(expr),
            alias: alias.into(),
        }
    }
}

impl Sqlizer for Alias {
    fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
        sql.push('(');
        self.expr.append_to_sql(sql, args)?;
        sql.push_str(") AS ");
        sql.push_str(&self.alias);
        Ok(())
    }
}

fn append_group(
    parts: &[Part],
    sep: &str,
    empty: &str,
    sql: &mut String,
    args: &mut Args,
) -> SqlResult<()> {
    let mut inner = String::new();
    append_joined(parts, sep, &mut inner, args)?;
    if inner.is_empty() {
        sql.push_str(empty);
    } else {
        sql.push('(');
        sql.push_str(&inner);
        sql.push(')');
    }
    Ok(())
}

/// Conjunction. Empty renders `(1=1)`.
#[derive(Clone, Debug, Default)]
pub struct And(Vec<Part>);

impl And {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, expr: impl Sqlizer + 'static) -> Self {
        self.0.push(part(expr));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Part>> for And {
    fn from(parts: Vec<Part>) -> Self {
        Self(parts)
    }
}

impl Sqlizer for And {
    fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
        append_group(&self.0, " AND ", "(1=1)", sql, args)
    }
}

/// Disjunction. Empty renders `(1=0)`.
#[derive(Clone, Debug, Default)]
pub struct Or(Vec<Part>);

impl Or {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, expr: impl Sqlizer + 'static) -> Self {
        self.0.push(part(expr));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Part>> for Or {
    fn from(parts: Vec<Part>) -> Self {
        Self(parts)
    }
}

impl Sqlizer for Or {
    fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
        append_group(&self.0, " OR ", "(1=0)", sql, args)
    }
}

/// `NOT (expr)`
#[derive(Clone, Debug)]
pub struct Not(Part);

impl Not {
    pub fn new(expr: impl Sqlizer + 'static) -> Self {
        Self(part(expr))
    }
}

impl Sqlizer for Not {
    fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
        let mut inner = String::new();
        self.0.append_to_sql(&mut inner, args)?;
        if !inner.is_empty() {
            sql.push_str("NOT (");
            sql.push_str(&inner);
            sql.push(')');
        }
        Ok(())
    }
}

/// Declares a column-to-value map type with builder-style setters.
macro_rules! column_map {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default)]
        pub struct $name(HashMap<String, Value>);

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            /// Set `column` to `value`, replacing any previous value for it.
            pub fn set(mut self, column: impl Into<String>, value: impl IntoValue) -> Self {
                self.0.insert(column.into(), value.into_value());
                self
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn get(&self, column: &str) -> Option<&Value> {
                self.0.get(column)
            }
        }

        impl<K: Into<String>, V: IntoValue> FromIterator<(K, V)> for $name {
            fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                Self(
                    iter.into_iter()
                        .map(|(k, v)| (k.into(), v.into_value()))
                        .collect(),
                )
            }
        }

        impl IntoIterator for $name {
            type Item = (String, Value);
            type IntoIter = std::collections::hash_map::IntoIter<String, Value>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }
    };
}

column_map!(
    /// Equality per column: `col = ?`, `col IS NULL`, `col IN (?,?)`.
    Eq
);
column_map!(
    /// Inequality per column: `col <> ?`, `col IS NOT NULL`, `col NOT IN (?,?)`.
    NotEq
);
column_map!(Lt);
column_map!(LtOrEq);
column_map!(Gt);
column_map!(GtOrEq);
column_map!(Like);
column_map!(NotLike);
column_map!(
    /// Case-insensitive `LIKE` (PostgreSQL).
    ILike
);
column_map!(NotILike);

macro_rules! equality_helpers {
    ($($name:ident => $in_kw:literal, $null_kw:literal;)*) => {
        $(
            impl $name {
                #[doc = concat!("`column ", $in_kw, " (...)`, one argument per item.")]
                pub fn set_in<T, I>(self, column: impl Into<String>, values: I) -> Self
                where
                    T: tokio_postgres::types::ToSql + Send + Sync + 'static,
                    I: IntoIterator<Item = T>,
                {
                    self.set(column, Value::list(values))
                }

                #[doc = concat!("`column ", $null_kw, "`")]
                pub fn set_null(self, column: impl Into<String>) -> Self {
                    self.set(column, Value::Null)
                }
            }
        )*
    };
}

equality_helpers!(
    Eq => "IN", "IS NULL";
    NotEq => "NOT IN", "IS NOT NULL";
);

const EMPTY_MAP: &str = "(1=1)";

fn append_equality(
    map: &HashMap<String, Value>,
    negate: bool,
    sql: &mut String,
    args: &mut Args,
) -> SqlResult<()> {
    if map.is_empty() {
        sql.push_str(EMPTY_MAP);
        return Ok(());
    }
    let (eq_op, in_op, null_op, empty_in) = if negate {
        ("<>", "NOT IN", "IS NOT", "(1=1)")
    } else {
        ("=", "IN", "IS", "(1=0)")
    };

    for (i, (column, value)) in map.iter().enumerate() {
        if i > 0 {
            sql.push_str(" AND ");
        }
        match value {
            Value::Null => {
                let _ = write!(sql, "{column} {null_op} NULL");
            }
            Value::List(items) if items.is_empty() => sql.push_str(empty_in),
            Value::List(_) => {
                let _ = write!(sql, "{column} {in_op} (");
                value.append_to_sql(sql, args)?;
                sql.push(')');
            }
            Value::Default => {
                return Err(SqlError::validation(format!(
                    "cannot compare column {column} with DEFAULT"
                )));
            }
            _ => {
                let _ = write!(sql, "{column} {eq_op} ");
                value.append_to_sql(sql, args)?;
            }
        }
    }
    Ok(())
}

fn append_comparison(
    map: &HashMap<String, Value>,
    op: &str,
    kind: &str,
    sql: &mut String,
    args: &mut Args,
) -> SqlResult<()> {
    if map.is_empty() {
        sql.push_str(EMPTY_MAP);
        return Ok(());
    }
    for (i, (column, value)) in map.iter().enumerate() {
        match value {
            Value::Null | Value::Default => {
                return Err(SqlError::validation(format!(
                    "cannot use null with {kind} operators"
                )));
            }
            Value::List(_) => {
                return Err(SqlError::validation(format!(
                    "cannot use array or slice with {kind} operators"
                )));
            }
            _ => {}
        }
        if i > 0 {
            sql.push_str(" AND ");
        }
        let _ = write!(sql, "{column} {op} ");
        value.append_to_sql(sql, args)?;
    }
    Ok(())
}

impl Sqlizer for Eq {
    fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
        append_equality(&self.0, false, sql, args)
    }
}

impl Sqlizer for NotEq {
    fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
        append_equality(&self.0, true, sql, args)
    }
}

macro_rules! impl_comparison {
    ($($name:ident => ($op:literal, $kind:literal)),+ $(,)?) => {
        $(
            impl Sqlizer for $name {
                fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
                    append_comparison(&self.0, $op, $kind, sql, args)
                }
            }
        )+
    };
}

impl_comparison!(
    Lt => ("<", "less than or greater than"),
    LtOrEq => ("<=", "less than or greater than"),
    Gt => (">", "less than or greater than"),
    GtOrEq => (">=", "less than or greater than"),
    Like => ("LIKE", "like"),
    NotLike => ("NOT LIKE", "like"),
    ILike => ("ILIKE", "like"),
    NotILike => ("NOT ILIKE", "like"),
);

impl_into_value_expr!(
    Expr, ConcatExpr, Alias, And, Or, Not, Eq, NotEq, Lt, LtOrEq, Gt, GtOrEq, Like, NotLike,
    ILike, NotILike,
);

/// Render with arguments inlined, for logs and error messages only.
///
/// Each argument is written from its `Debug` form in single quotes. Failures are
/// reported inside the returned text instead of as an error.
pub fn debug_sqlizer(sqlizer: &dyn Sqlizer) -> String {
    // Markers stay neutral here; a statement's own format would hide them.
    let mut sql = String::new();
    let mut args = Args::new();
    if let Err(err) = sqlizer
        .append_to_sql(&mut sql, &mut args)
        .and_then(|()| check_placeholders(&sql, &args))
    {
        return format!("[to_sql error: {err}]");
    }

    let mut out = String::with_capacity(sql.len());
    let mut values = args.iter();
    for segment in Segments::new(&sql) {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Escaped => out.push('?'),
            Segment::Marker => match values.next() {
                Some(arg) => {
                    let shown = format!("{arg:?}");
                    let shown = shown
                        .strip_prefix('"')
                        .and_then(|s| s.strip_suffix('"'))
                        .unwrap_or(&shown);
                    let _ = write!(out, "'{shown}'");
                }
                None => return "[debug_sqlizer error: too many placeholders]".to_string(),
            },
        }
    }
    if values.next().is_some() {
        return "[debug_sqlizer error: too many arguments]".to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    fn render(s: &dyn Sqlizer) -> (String, String) {
        let (sql, args) = s.to_sql().unwrap();
        (sql, format!("{args:?}"))
    }

    #[test]
    fn raw_fragment_is_verbatim() {
        let (sql, args) = render(&Expr::new("a = ? OR b = ?", args![1, 2]));
        assert_eq!(sql, "a = ? OR b = ?");
        assert_eq!(args, "[1, 2]");
    }

    #[test]
    fn raw_fragment_splices_nested_values() {
        let inner = Expr::new("COALESCE(b, ?)", args![0]);
        let (sql, args) = render(&Expr::new(
            "a = ? AND c IN (?) AND d = ?",
            args![inner, Value::list([1, 2]), 9],
        ));
        assert_eq!(sql, "a = COALESCE(b, ?) AND c IN (?,?) AND d = ?");
        assert_eq!(args, "[0, 1, 2, 9]");
    }

    #[test]
    fn raw_fragment_with_wrong_count_fails_at_render() {
        let expr = Expr::new("a = ?", args![1, 2]);
        assert!(matches!(
            expr.to_sql(),
            Err(SqlError::PlaceholderMismatch {
                markers: 1,
                args: 2
            })
        ));
    }

    #[test]
    fn and_or_wrap_in_parentheses() {
        let e = And::new()
            .add(Expr::new("a = ?", args![1]))
            .add(Or::new().add("b = 2").add(Expr::new("c = ?", args![3])));
        let (sql, args) = render(&e);
        assert_eq!(sql, "(a = ? AND (b = 2 OR c = ?))");
        assert_eq!(args, "[1, 3]");
    }

    #[test]
    fn empty_groups_render_sentinels() {
        assert_eq!(render(&And::new()).0, "(1=1)");
        assert_eq!(render(&Or::new()).0, "(1=0)");
        assert_eq!(render(&And::new().add("")).0, "(1=1)");
    }

    #[test]
    fn not_wraps() {
        assert_eq!(render(&Not::new("a = 1")).0, "NOT (a = 1)");
    }

    #[test]
    fn eq_single_entry() {
        let (sql, args) = render(&Eq::new().set("id", 5));
        assert_eq!(sql, "id = ?");
        assert_eq!(args, "[5]");
    }

    #[test]
    fn eq_two_entries_any_order() {
        let (sql, args) = render(&Eq::new().set("a", 1).set("b", 2));
        assert!(
            (sql == "a = ? AND b = ?" && args == "[1, 2]")
                || (sql == "b = ? AND a = ?" && args == "[2, 1]"),
            "unexpected {sql} {args}"
        );
    }

    #[test]
    fn eq_null_and_list() {
        assert_eq!(render(&Eq::new().set_null("a")).0, "a IS NULL");
        assert_eq!(render(&NotEq::new().set_null("a")).0, "a IS NOT NULL");

        let (sql, args) = render(&Eq::new().set_in("id", [1, 2, 3]));
        assert_eq!(sql, "id IN (?,?,?)");
        assert_eq!(args, "[1, 2, 3]");
        assert_eq!(
            render(&NotEq::new().set("id", Value::list([1]))).0,
            "id NOT IN (?)"
        );
    }

    #[test]
    fn eq_empty_list_sentinels() {
        assert_eq!(render(&Eq::new().set_in("id", Vec::<i32>::new())).0, "(1=0)");
        assert_eq!(
            render(&NotEq::new().set("id", Value::list(Vec::<i32>::new()))).0,
            "(1=1)"
        );
    }

    #[test]
    fn not_eq_uses_angle_brackets() {
        assert_eq!(render(&NotEq::new().set("a", 1)).0, "a <> ?");
    }

    #[test]
    fn eq_subquery_value() {
        let sub = Expr::new("SELECT max(id) FROM t WHERE k = ?", args![1]);
        let (sql, args) = render(&Eq::new().set("id", Value::subquery(sub)));
        assert_eq!(sql, "id = (SELECT max(id) FROM t WHERE k = ?)");
        assert_eq!(args, "[1]");
    }

    #[test]
    fn eq_rejects_default() {
        let err = Eq::new().set("a", Value::Default).to_sql().unwrap_err();
        assert!(matches!(err, SqlError::Validation(_)));
    }

    #[test]
    fn empty_map_is_true() {
        assert_eq!(render(&Eq::new()).0, "(1=1)");
        assert_eq!(render(&Gt::new()).0, "(1=1)");
    }

    #[test]
    fn ordering_operators() {
        assert_eq!(render(&Lt::new().set("a", 1)).0, "a < ?");
        assert_eq!(render(&LtOrEq::new().set("a", 1)).0, "a <= ?");
        assert_eq!(render(&Gt::new().set("a", 1)).0, "a > ?");
        assert_eq!(render(&GtOrEq::new().set("a", 1)).0, "a >= ?");
    }

    #[test]
    fn ordering_rejects_null_and_lists() {
        let err = Lt::new().set("a", Value::Null).to_sql().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: cannot use null with less than or greater than operators"
        );
        let err = Gt::new().set("a", Value::list([1])).to_sql().unwrap_err();
        assert!(err.to_string().contains("array or slice"));
    }

    #[test]
    fn like_operators() {
        assert_eq!(render(&Like::new().set("name", "%a%")).0, "name LIKE ?");
        assert_eq!(render(&NotLike::new().set("name", "%a%")).0, "name NOT LIKE ?");
        assert_eq!(render(&ILike::new().set("name", "%a%")).0, "name ILIKE ?");
        assert_eq!(
            render(&NotILike::new().set("name", "%a%")).0,
            "name NOT ILIKE ?"
        );
        assert!(Like::new().set("name", Value::Null).to_sql().is_err());
    }

    #[test]
    fn concat_and_alias() {
        let c = ConcatExpr::new()
            .push("COALESCE(name, ")
            .push(Expr::new("?", args!["anon"]))
            .push(")");
        let (sql, args) = render(&Alias::new(c, "display"));
        assert_eq!(sql, "(COALESCE(name, ?)) AS display");
        assert_eq!(args, r#"["anon"]"#);
    }

    #[test]
    fn map_from_iterator() {
        let eq: Eq = [("a", 1)].into_iter().collect();
        assert_eq!(render(&eq).0, "a = ?");
    }

    #[test]
    fn debug_inlines_arguments() {
        let e = Expr::new("a = ? AND b = ? AND c ?? d", args![1, "x"]);
        assert_eq!(debug_sqlizer(&e), "a = '1' AND b = 'x' AND c ? d");
    }

    #[test]
    fn debug_reports_errors_in_text() {
        let e = Expr::new("a = ?", args![]);
        assert!(debug_sqlizer(&e).starts_with("[to_sql error:"));
    }
}
