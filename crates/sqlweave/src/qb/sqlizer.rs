//! The `Sqlizer` trait and the rendering helpers shared by every builder.

use std::sync::Arc;

use super::args::Args;
use crate::error::{SqlError, SqlResult};
use crate::placeholder::{PlaceholderFormat, count_placeholders};

/// Anything that renders to a SQL fragment plus its bound arguments.
///
/// `append_to_sql` writes neutral `?` markers and pushes arguments in marker order. It
/// is what nesting uses: an outer builder calls it on every part so the whole tree
/// shares one argument list.
///
/// `to_sql` is the final render. The default checks that markers and arguments agree;
/// statement builders override it to also rewrite markers into their placeholder
/// format.
pub trait Sqlizer: std::fmt::Debug + Send + Sync {
    fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()>;

    fn to_sql(&self) -> SqlResult<(String, Args)> {
        render(self, PlaceholderFormat::Question)
    }
}

/// A shared, type-erased sqlizer.
pub type Part = Arc<dyn Sqlizer>;

pub(crate) fn part(sqlizer: impl Sqlizer + 'static) -> Part {
    Arc::new(sqlizer)
}

/// Render neutrally, validate the marker count, then rewrite markers into `format`.
pub(crate) fn render<S: Sqlizer + ?Sized>(
    sqlizer: &S,
    format: PlaceholderFormat,
) -> SqlResult<(String, Args)> {
    let mut sql = String::new();
    let mut args = Args::new();
    sqlizer.append_to_sql(&mut sql, &mut args)?;
    check_placeholders(&sql, &args)?;
    Ok((format.replace_placeholders(&sql), args))
}

pub(crate) fn check_placeholders(sql: &str, args: &Args) -> SqlResult<()> {
    let markers = count_placeholders(sql);
    if markers != args.len() {
        return Err(SqlError::PlaceholderMismatch {
            markers,
            args: args.len(),
        });
    }
    Ok(())
}

/// Render `parts` separated by `sep`. Parts that render to nothing are skipped.
pub(crate) fn append_joined(
    parts: &[Part],
    sep: &str,
    sql: &mut String,
    args: &mut Args,
) -> SqlResult<()> {
    let mut first = true;
    for p in parts {
        let mut fragment = String::new();
        p.append_to_sql(&mut fragment, args)?;
        if fragment.is_empty() {
            continue;
        }
        if !first {
            sql.push_str(sep);
        }
        sql.push_str(&fragment);
        first = false;
    }
    Ok(())
}

/// Render `keyword` followed by the joined parts, or nothing when every part is empty.
pub(crate) fn append_clause(
    keyword: &str,
    parts: &[Part],
    sep: &str,
    sql: &mut String,
    args: &mut Args,
) -> SqlResult<()> {
    if parts.is_empty() {
        return Ok(());
    }
    let mut clause = String::new();
    append_joined(parts, sep, &mut clause, args)?;
    if !clause.is_empty() {
        sql.push_str(keyword);
        sql.push_str(&clause);
    }
    Ok(())
}

/// Statement prefixes, followed by a space when anything was written.
pub(crate) fn append_prefixes(prefixes: &[Part], sql: &mut String, args: &mut Args) -> SqlResult<()> {
    let start = sql.len();
    append_joined(prefixes, " ", sql, args)?;
    if sql.len() > start {
        sql.push(' ');
    }
    Ok(())
}

pub(crate) fn append_limit_offset(sql: &mut String, limit: Option<u64>, offset: Option<u64>) {
    if let Some(limit) = limit {
        sql.push_str(" LIMIT ");
        sql.push_str(&limit.to_string());
    }
    if let Some(offset) = offset {
        sql.push_str(" OFFSET ");
        sql.push_str(&offset.to_string());
    }
}

impl Sqlizer for &'static str {
    fn append_to_sql(&self, sql: &mut String, _args: &mut Args) -> SqlResult<()> {
        sql.push_str(self);
        Ok(())
    }
}

impl Sqlizer for String {
    fn append_to_sql(&self, sql: &mut String, _args: &mut Args) -> SqlResult<()> {
        sql.push_str(self);
        Ok(())
    }
}

impl<S: Sqlizer + ?Sized> Sqlizer for Arc<S> {
    fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
        (**self).append_to_sql(sql, args)
    }

    fn to_sql(&self) -> SqlResult<(String, Args)> {
        (**self).to_sql()
    }
}

impl<S: Sqlizer + ?Sized> Sqlizer for Box<S> {
    fn append_to_sql(&self, sql: &mut String, args: &mut Args) -> SqlResult<()> {
        (**self).append_to_sql(sql, args)
    }

    fn to_sql(&self) -> SqlResult<(String, Args)> {
        (**self).to_sql()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::Expr;

    #[test]
    fn raw_strings_render_verbatim() {
        let (sql, args) = "a = 1".to_sql().unwrap();
        assert_eq!(sql, "a = 1");
        assert!(args.is_empty());
    }

    #[test]
    fn default_to_sql_rejects_unbound_markers() {
        let err = "a = ?".to_sql().unwrap_err();
        assert!(matches!(
            err,
            SqlError::PlaceholderMismatch {
                markers: 1,
                args: 0
            }
        ));
    }

    #[test]
    fn joined_parts_skip_empty_fragments() {
        let parts = vec![part("a"), part(""), part(Expr::new("b = ?", crate::args![1]))];
        let mut sql = String::new();
        let mut args = Args::new();
        append_joined(&parts, " AND ", &mut sql, &mut args).unwrap();
        assert_eq!(sql, "a AND b = ?");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn clause_is_omitted_when_empty() {
        let mut sql = String::from("SELECT a FROM t");
        let mut args = Args::new();
        append_clause(" WHERE ", &[part("")], " AND ", &mut sql, &mut args).unwrap();
        assert_eq!(sql, "SELECT a FROM t");
    }

    #[test]
    fn render_rewrites_after_validation() {
        let expr = Expr::new("a = ? AND b = ?", crate::args![1, 2]);
        let (sql, _) = render(&expr, PlaceholderFormat::Dollar).unwrap();
        assert_eq!(sql, "a = $1 AND b = $2");
    }
}
