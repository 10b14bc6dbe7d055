use affinity_algo::{LearnerProfile, LearningPatterns};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::Row;

use crate::db::DatabaseProxy;

pub async fn get_learner_profile(
    proxy: &DatabaseProxy,
    learner_id: &str,
) -> Result<Option<LearnerProfile>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT "id", "knowledgeState", "learningPatterns", "learningPreferences"
        FROM "learner_profiles"
        WHERE "id" = $1
        LIMIT 1
        "#,
    )
    .bind(learner_id)
    .fetch_optional(proxy.pool())
    .await?;

    row.as_ref().map(map_learner_profile).transpose()
}

pub async fn upsert_learner_profile(
    proxy: &DatabaseProxy,
    profile: &LearnerProfile,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "learner_profiles" (
            "id", "knowledgeState", "learningPatterns", "learningPreferences",
            "createdAt", "updatedAt"
        ) VALUES ($1, $2, $3, $4, NOW(), NOW())
        ON CONFLICT ("id") DO UPDATE SET
            "knowledgeState" = EXCLUDED."knowledgeState",
            "learningPatterns" = EXCLUDED."learningPatterns",
            "learningPreferences" = EXCLUDED."learningPreferences",
            "updatedAt" = NOW()
        "#,
    )
    .bind(&profile.id)
    .bind(Json(&profile.knowledge_state))
    .bind(Json(&profile.learning_patterns))
    .bind(Json(&profile.learning_preferences))
    .execute(proxy.pool())
    .await?;
    Ok(())
}

fn map_learner_profile(row: &PgRow) -> Result<LearnerProfile, sqlx::Error> {
    Ok(LearnerProfile {
        id: row.try_get("id")?,
        knowledge_state: row.try_get::<Json<Vec<f64>>, _>("knowledgeState")?.0,
        learning_patterns: row
            .try_get::<Json<LearningPatterns>, _>("learningPatterns")?
            .0,
        learning_preferences: row
            .try_get::<Json<Vec<f64>>, _>("learningPreferences")?
            .0,
    })
}
