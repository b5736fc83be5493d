use std::collections::HashMap;

use sea_orm::sea_query::{Expr, Func, Query, SelectStatement, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entities::user_entity as users;
use crate::error::AppResult;

/// `%term%` in lower case, or None for a blank search box.
/// LIKE wildcards in the term match literally (Postgres escapes with `\`).
pub(crate) fn search_pattern(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", escape_like(&s.to_lowercase())))
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `LOWER(col) LIKE pattern`
pub(crate) fn lower_like<C: ColumnTrait + 'static>(col: C, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((col.entity_name(), col)))).like(pattern)
}

/// Name or email match on `users`.
pub(crate) fn user_search_condition(pattern: &str) -> Condition {
    Condition::any()
        .add(lower_like(users::Column::FirstName, pattern))
        .add(lower_like(users::Column::LastName, pattern))
        .add(lower_like(users::Column::Email, pattern))
}

/// `SELECT id FROM users WHERE <name or email matches>`
pub(crate) fn matching_user_ids(pattern: &str) -> SelectStatement {
    Query::select()
        .column(users::Column::Id)
        .from(users::Entity)
        .cond_where(user_search_condition(pattern))
        .to_owned()
}

/// Loads the users referenced by a page of rows in one query.
pub(crate) async fn load_users(
    db: &DatabaseConnection,
    mut ids: Vec<i64>,
) -> AppResult<HashMap<i64, users::Model>> {
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|u| (u.id, u)).collect())
}
