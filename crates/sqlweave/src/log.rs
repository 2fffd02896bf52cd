//! Statement logging.
//!
//! With the `tracing` feature enabled every statement handed to a runner emits a
//! `DEBUG` event on the `sqlweave.sql` target. Render failures are emitted at `WARN`.
//! Without the feature these functions compile to nothing.

use crate::error::SqlError;

/// Longest SQL text (in bytes) written to a log event before truncation.
pub const MAX_SQL_LENGTH: usize = 200;

/// Truncate a string to at most `max_bytes` bytes without splitting a UTF-8 character.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

pub(crate) fn truncate_sql(sql: &str) -> String {
    if sql.len() > MAX_SQL_LENGTH {
        format!("{}...", truncate_sql_bytes(sql, MAX_SQL_LENGTH))
    } else {
        sql.to_string()
    }
}

/// Record a statement that is about to be sent to a runner.
pub(crate) fn statement(op: &'static str, tag: Option<&str>, sql: &str, arg_count: usize) {
    #[cfg(feature = "tracing")]
    {
        let tag = tag.unwrap_or("-");
        tracing::debug!(
            target: "sqlweave.sql",
            op,
            tag,
            arg_count,
            sql = %truncate_sql(sql),
            "dispatching statement"
        );
    }
    #[cfg(not(feature = "tracing"))]
    let _ = (op, tag, sql, arg_count);
}

/// Record a statement that failed to render and was never sent.
pub(crate) fn render_failed(op: &'static str, err: &SqlError) {
    #[cfg(feature = "tracing")]
    tracing::warn!(target: "sqlweave.sql", op, error = %err, "statement failed to render");
    #[cfg(not(feature = "tracing"))]
    let _ = (op, err);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_sql_is_untouched() {
        assert_eq!(truncate_sql("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn long_sql_is_cut_with_ellipsis() {
        let sql = format!("SELECT {}", "a, ".repeat(100));
        let out = truncate_sql(&sql);
        assert_eq!(out.len(), MAX_SQL_LENGTH + 3);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let s = "é".repeat(150);
        let cut = truncate_sql_bytes(&s, 201);
        assert_eq!(cut.len(), 200);
        assert!(s.is_char_boundary(cut.len()));
    }
}
