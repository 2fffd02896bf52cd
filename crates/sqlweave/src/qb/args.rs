//! Bound arguments and the values builders accept in place of a `?`.

use std::fmt;
use std::sync::Arc;

use tokio_postgres::types::ToSql;

use super::sqlizer::Sqlizer;
use crate::error::SqlResult;

/// A clone-friendly bound argument.
///
/// Cloning a builder never copies argument values; every clone points at the same
/// `Arc`.
#[derive(Clone)]
pub struct Arg(Arc<dyn ToSql + Send + Sync>);

impl Arg {
    /// Wrap any `ToSql` value.
    pub fn new<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Arg(Arc::new(value))
    }

    /// Borrow the value the way `tokio_postgres` expects parameters.
    pub fn as_param(&self) -> &(dyn ToSql + Sync) {
        &*self.0 as &(dyn ToSql + Sync)
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// The ordered argument list produced alongside rendered SQL.
#[derive(Clone, Default)]
pub struct Args {
    args: Vec<Arg>,
}

impl Args {
    /// Create a new empty argument list.
    pub fn new() -> Self {
        Self { args: Vec::new() }
    }

    /// Append a value and return its 1-based position.
    pub fn push<T: ToSql + Send + Sync + 'static>(&mut self, value: T) -> usize {
        self.push_arg(Arg::new(value))
    }

    /// Append a pre-wrapped argument and return its 1-based position.
    pub fn push_arg(&mut self, arg: Arg) -> usize {
        self.args.push(arg);
        self.args.len()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arg> {
        self.args.iter()
    }

    /// Parameter references ready for `tokio_postgres`.
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.args.iter().map(Arg::as_param).collect()
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.args.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a Args {
    type Item = &'a Arg;
    type IntoIter = std::slice::Iter<'a, Arg>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}

/// Anything that can stand where a `?` would go.
#[derive(Clone, Debug)]
pub enum Value {
    /// A bound argument, rendered as `?`.
    Arg(Arg),
    /// A list of bound arguments, rendered as `?,?,?`. Comparison expressions turn it
    /// into `IN (...)`.
    List(Vec<Arg>),
    /// SQL `NULL`. Comparison expressions turn it into `IS NULL`.
    Null,
    /// The `DEFAULT` keyword, for INSERT rows and UPDATE assignments.
    Default,
    /// A nested expression rendered inline.
    Expr(Arc<dyn Sqlizer>),
    /// A nested statement rendered inline and wrapped in parentheses.
    Subquery(Arc<dyn Sqlizer>),
}

impl Value {
    /// Bind a single value.
    pub fn arg<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Value::Arg(Arg::new(value))
    }

    /// Bind each item as its own argument.
    ///
    /// `Vec<T>` passed directly binds a single PostgreSQL array; use this for `IN`.
    pub fn list<T, I>(values: I) -> Self
    where
        T: ToSql + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        Value::List(values.into_iter().map(Arg::new).collect())
    }

    pub fn expr(expr: impl Sqlizer + 'static) -> Self {
        Value::Expr(Arc::new(expr))
    }

    pub fn subquery(query: impl Sqlizer + 'static) -> Self {
        Value::Subquery(Arc::new(query))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub(crate) fn is_plain_arg(&self) -> bool {
        matches!(self, Value::Arg(_))
    }

    /// Render this value at the current position.
    pub(crate) fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
        match self {
            Value::Arg(arg) => {
                sql.push('?');
                args.push_arg(arg.clone());
            }
            Value::List(items) if items.is_empty() => sql.push_str("NULL"),
            Value::List(items) => {
                sql.push_str(&crate::placeholder::placeholders(items.len()));
                for item in items {
                    args.push_arg(item.clone());
                }
            }
            Value::Null => sql.push_str("NULL"),
            Value::Default => sql.push_str("DEFAULT"),
            Value::Expr(expr) => expr.append_to_sql(sql, args)?,
            Value::Subquery(query) => {
                sql.push('(');
                query.append_to_sql(sql, args)?;
                sql.push(')');
            }
        }
        Ok(())
    }
}

/// Conversion into a [`Value`].
///
/// Every `ToSql` type binds as an argument. Expressions and builders from this crate
/// render inline.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl<T: ToSql + Send + Sync + 'static> IntoValue for T {
    fn into_value(self) -> Value {
        Value::Arg(Arg::new(self))
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for Arg {
    fn into_value(self) -> Value {
        Value::Arg(self)
    }
}

/// Implement [`IntoValue`] for sqlizer types that render inline.
macro_rules! impl_into_value_expr {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::qb::args::IntoValue for $ty {
                fn into_value(self) -> $crate::qb::args::Value {
                    $crate::qb::args::Value::Expr(::std::sync::Arc::new(self))
                }
            }
        )+
    };
}
pub(crate) use impl_into_value_expr;

/// Implement [`IntoValue`] for statement builders, which nest as parenthesized subqueries.
macro_rules! impl_into_value_subquery {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::qb::args::IntoValue for $ty {
                fn into_value(self) -> $crate::qb::args::Value {
                    $crate::qb::args::Value::Subquery(::std::sync::Arc::new(self))
                }
            }
        )+
    };
}
pub(crate) use impl_into_value_subquery;

/// Build a `Vec<Value>` from a list of arguments.
///
/// ```ignore
/// let args = sqlweave::args![1_i64, "name", sqlweave::Value::Null];
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::IntoValue::into_value($value)),+]
    };
}
