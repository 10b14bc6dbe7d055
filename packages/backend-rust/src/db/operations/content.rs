use std::collections::BTreeMap;

use affinity_algo::ContentItem;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::Row;

use crate::db::DatabaseProxy;

pub async fn get_content_item(
    proxy: &DatabaseProxy,
    content_id: &str,
) -> Result<Option<ContentItem>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT "id", "difficultyVector", "knowledgeDomains", "pedagogicalAttributes"
        FROM "content_items"
        WHERE "id" = $1
        LIMIT 1
        "#,
    )
    .bind(content_id)
    .fetch_optional(proxy.pool())
    .await?;

    row.as_ref().map(map_content_item).transpose()
}

pub async fn list_content_items(proxy: &DatabaseProxy) -> Result<Vec<ContentItem>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT "id", "difficultyVector", "knowledgeDomains", "pedagogicalAttributes"
        FROM "content_items"
        ORDER BY "id" ASC
        "#,
    )
    .fetch_all(proxy.pool())
    .await?;

    rows.iter().map(map_content_item).collect()
}

/// Returns `false` if a row with the same id already exists.
pub async fn insert_content_item(
    proxy: &DatabaseProxy,
    item: &ContentItem,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO "content_items" (
            "id", "difficultyVector", "knowledgeDomains", "pedagogicalAttributes", "createdAt"
        ) VALUES ($1, $2, $3, $4, NOW())
        ON CONFLICT ("id") DO NOTHING
        "#,
    )
    .bind(&item.id)
    .bind(Json(&item.difficulty_vector))
    .bind(Json(&item.knowledge_domains))
    .bind(Json(&item.pedagogical_attributes))
    .execute(proxy.pool())
    .await?;

    Ok(result.rows_affected() > 0)
}

fn map_content_item(row: &PgRow) -> Result<ContentItem, sqlx::Error> {
    Ok(ContentItem {
        id: row.try_get("id")?,
        difficulty_vector: row.try_get::<Json<Vec<f64>>, _>("difficultyVector")?.0,
        knowledge_domains: row
            .try_get::<Json<BTreeMap<String, f64>>, _>("knowledgeDomains")?
            .0,
        pedagogical_attributes: row
            .try_get::<Json<Vec<f64>>, _>("pedagogicalAttributes")?
            .0,
    })
}
