//! Cross-builder tests for the qb module.

use crate::args;
use crate::error::SqlError;
use crate::placeholder::{PlaceholderFormat, count_placeholders};
use crate::qb::{
    And, CaseBuilder, Eq, Expr, Gt, Not, NotEq, Or, Sqlizer, StatementBuilder, Value, case_of,
    debug_sqlizer, delete, insert, select, update,
};

fn args_of(s: &dyn Sqlizer) -> String {
    let (_, args) = s.to_sql().unwrap();
    format!("{args:?}")
}

#[test]
fn test_delete_with_where() {
    let (sql, args) = delete("users").where_sql("id = ?", args![5]).to_sql().unwrap();
    assert_eq!(sql, "DELETE FROM users WHERE id = ?");
    assert_eq!(format!("{args:?}"), "[5]");
}

#[test]
fn test_render_is_idempotent() {
    let q = select(&["a"])
        .from("t")
        .where_clause(Eq::new().set("b", 1))
        .where_sql("c IN (?)", args![Value::list([2, 3])])
        .placeholder_format(PlaceholderFormat::Dollar);
    let first = q.to_sql().unwrap();
    let second = q.to_sql().unwrap();
    assert_eq!(first.0, second.0);
    assert_eq!(format!("{:?}", first.1), format!("{:?}", second.1));
}

#[test]
fn test_template_branches_do_not_alias() {
    let base = select(&["id"]).from("users").where_sql("active", args![]);
    let admins = base.clone().where_clause(Eq::new().set("role", "admin"));
    let recent = base.clone().order_by(&["created_at DESC"]).limit(5);

    assert_eq!(base.to_sql().unwrap().0, "SELECT id FROM users WHERE active");
    assert_eq!(
        admins.to_sql().unwrap().0,
        "SELECT id FROM users WHERE active AND role = ?"
    );
    assert_eq!(
        recent.to_sql().unwrap().0,
        "SELECT id FROM users WHERE active ORDER BY created_at DESC LIMIT 5"
    );
}

#[test]
fn test_template_shared_across_threads() {
    let base = StatementBuilder::new()
        .placeholder_format(PlaceholderFormat::Dollar)
        .select(&["id"])
        .from("t");

    let handles: Vec<_> = (0..4i32)
        .map(|i| {
            let q = base.clone().where_clause(Eq::new().set("k", i));
            std::thread::spawn(move || q.to_sql().map(|(sql, args)| (sql, args.len())))
        })
        .collect();

    for h in handles {
        let (sql, n) = h.join().unwrap().unwrap();
        assert_eq!(sql, "SELECT id FROM t WHERE k = $1");
        assert_eq!(n, 1);
    }
    assert_eq!(base.to_sql().unwrap().0, "SELECT id FROM t");
}

#[test]
fn test_arg_count_matches_markers() {
    let sub = select(&["id"]).from("b").where_sql("x = ?", args![1]);
    let statements: Vec<Box<dyn Sqlizer>> = vec![
        Box::new(
            select(&["*"])
                .from("a")
                .where_clause(Or::new().add(Eq::new().set("p", 1)).add(Gt::new().set("q", 2)))
                .where_sql("id IN ?", args![sub.clone()]),
        ),
        Box::new(insert("a").columns(&["x", "y"]).values(args![1, Value::Default])),
        Box::new(update("a").set("x", sub).where_clause(Not::new(Eq::new().set("y", 3)))),
        Box::new(delete("a").where_clause(And::new().add(NotEq::new().set("z", Value::list([1, 2]))))),
    ];
    for s in statements {
        let (sql, args) = s.to_sql().unwrap();
        assert_eq!(count_placeholders(&sql), args.len(), "{sql}");
    }
}

#[test]
fn test_nested_builder_format_is_ignored() {
    let inner = select(&["id"])
        .from("b")
        .where_sql("x = ?", args![1])
        .placeholder_format(PlaceholderFormat::Colon);
    let (sql, _) = select(&["*"])
        .from("a")
        .where_sql("id IN ? AND y = ?", args![inner, 2])
        .placeholder_format(PlaceholderFormat::AtP)
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM a WHERE id IN (SELECT id FROM b WHERE x = @p1) AND y = @p2"
    );
}

#[test]
fn test_literal_question_mark() {
    let (sql, args) = select(&["*"])
        .from("docs")
        .where_sql("meta ?? 'tag' AND owner = ?", args![7])
        .placeholder_format(PlaceholderFormat::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM docs WHERE meta ? 'tag' AND owner = $1");
    assert_eq!(format!("{args:?}"), "[7]");
}

#[test]
fn test_mismatch_detected_at_statement_render() {
    let q = select(&["*"]).from("t").where_sql("a = ? AND b = ?", args![1]);
    match q.to_sql() {
        Err(SqlError::PlaceholderMismatch { markers, args }) => {
            assert_eq!(markers, 2);
            assert_eq!(args, 1);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_validation_error_propagates_from_nested() {
    let bad = select(&[]).from("b");
    let err = select(&["*"])
        .from("a")
        .where_sql("id IN ?", args![bad])
        .to_sql()
        .unwrap_err();
    assert!(err.is_render_error());
}

#[test]
fn test_case_in_update() {
    let grade = case_of("score")
        .when("100", "perfect")
        .else_value("ok");
    let (sql, args) = update("results")
        .set("label", grade)
        .where_clause(Eq::new().set("id", 1))
        .placeholder_format(PlaceholderFormat::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE results SET label = CASE score WHEN 100 THEN $1 ELSE $2 END WHERE id = $3"
    );
    assert_eq!(format!("{args:?}"), r#"["perfect", "ok", 1]"#);
}

#[test]
fn test_expression_only_sqlizers() {
    assert_eq!(
        args_of(&And::new().add(Eq::new().set("a", 1)).add(Expr::new("b > ?", args![2]))),
        "[1, 2]"
    );
    assert_eq!(args_of(&CaseBuilder::new().when("x", 1)), "[1]");
}

#[test]
fn test_insert_select_with_dollar() {
    let src = select(&["name"]).from("staging").where_sql("batch = ?", args![9]);
    let (sql, args) = StatementBuilder::new()
        .placeholder_format(PlaceholderFormat::Dollar)
        .insert("users")
        .columns(&["name"])
        .select(src)
        .suffix("RETURNING id", args![])
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO users (name) SELECT name FROM staging WHERE batch = $1 RETURNING id"
    );
    assert_eq!(args.len(), 1);
}

#[test]
fn test_debug_sqlizer_ignores_statement_format() {
    for format in [
        PlaceholderFormat::Dollar,
        PlaceholderFormat::Colon,
        PlaceholderFormat::AtP,
    ] {
        let q = select(&["a"])
            .from("t")
            .where_sql("b = ?", args![1])
            .where_clause(NotEq::new().set_in("c", ["x", "y"]))
            .placeholder_format(format);
        assert_eq!(
            debug_sqlizer(&q),
            "SELECT a FROM t WHERE b = '1' AND c NOT IN ('x','y')"
        );
    }
}

#[test]
fn test_not_eq_null_and_list_helpers() {
    let (sql, args) = NotEq::new().set_null("deleted_at").to_sql().unwrap();
    assert_eq!(sql, "deleted_at IS NOT NULL");
    assert!(args.is_empty());

    let (sql, args) = NotEq::new().set_in("id", [1, 2]).to_sql().unwrap();
    assert_eq!(sql, "id NOT IN (?,?)");
    assert_eq!(format!("{args:?}"), "[1, 2]");
}

#[test]
fn test_comment_in_fragment_keeps_numbering() {
    let (sql, args) = select(&["*"])
        .from("t")
        .where_sql("a = ? -- don't\n AND b = ?", args![1, 2])
        .placeholder_format(PlaceholderFormat::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM t WHERE a = $1 -- don't\n AND b = $2");
    assert_eq!(args.len(), 2);
}
