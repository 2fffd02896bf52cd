//! Rendering statements without a database.
//!
//! Run with: cargo run --example render -p sqlweave

use sqlweave::{
    Alias, Eq, Expr, Gt, Or, PlaceholderFormat, SqlResult, Sqlizer, StatementBuilder, Value,
    args, case_of, debug_sqlizer, select,
};

fn main() -> SqlResult<()> {
    let psql = StatementBuilder::new().placeholder_format(PlaceholderFormat::Dollar);

    // A base query reused as a template.
    let active_users = psql
        .select(&["id", "name"])
        .from("users")
        .where_clause(Eq::new().set("status", "active"));

    let (sql, args) = active_users
        .clone()
        .where_clause(Or::new().add(Gt::new().set("age", 18)).add("vip"))
        .order_by(&["name"])
        .limit(20)
        .to_sql()?;
    println!("{sql}\n  args: {args:?}");

    let (sql, args) = active_users.clone().remove_columns().columns(&["count(*)"]).to_sql()?;
    println!("{sql}\n  args: {args:?}");

    // Subqueries and CASE expressions nest anywhere a value can go.
    let banned = select(&["user_id"]).from("bans").where_sql("until > now()", args![]);
    let tier = case_of("plan")
        .when("'pro'", "paid")
        .else_value("free");
    let q = psql
        .select(&["id"])
        .column(Alias::new(tier, "tier"))
        .from("users")
        .where_sql("id NOT IN ?", args![banned])
        .where_clause(Eq::new().set("region", Value::list(["eu", "us"])));
    let (sql, args) = q.to_sql()?;
    println!("{sql}\n  args: {args:?}");
    println!("debug: {}", debug_sqlizer(&q));

    let (sql, args) = psql
        .update("users")
        .set("visits", Expr::new("visits + ?", args![1]))
        .where_clause(Eq::new().set("id", 42_i64))
        .suffix("RETURNING visits", args![])
        .to_sql()?;
    println!("{sql}\n  args: {args:?}");

    Ok(())
}
