// src/poll.rs
use sqlx::PgConnection;

/// Clears the category reference of every poll in `category_id`.
/// Polls themselves are left in place.
pub async fn detach_from_category(
    conn: &mut PgConnection,
    category_id: i32,
) -> Result<u64, sqlx::Error> {
    let detached = sqlx::query(
        r#"
        UPDATE polls
        SET category_id = NULL
        WHERE category_id = $1
        "#,
    )
    .bind(category_id)
    .execute(conn)
    .await?
    .rows_affected();

    Ok(detached)
}
