use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::db::DatabaseProxy;
use crate::store::{Assignment, AssignmentStatus};

const ASSIGNMENT_COLUMNS: &str = r#"
    "id", "learnerId", "contentId", "affinityScore", "assignmentToken",
    "status", "createdAt", "updatedAt"
"#;

pub async fn insert_assignment(
    proxy: &DatabaseProxy,
    assignment: &Assignment,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "assignments" (
            "id", "learnerId", "contentId", "affinityScore", "assignmentToken",
            "status", "createdAt", "updatedAt"
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&assignment.id)
    .bind(&assignment.learner_id)
    .bind(&assignment.content_id)
    .bind(assignment.affinity_score)
    .bind(&assignment.assignment_token)
    .bind(assignment.status.as_str())
    .bind(assignment.created_at)
    .bind(assignment.updated_at)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn find_assignment_by_token(
    proxy: &DatabaseProxy,
    token: &str,
) -> Result<Option<Assignment>, sqlx::Error> {
    let sql = format!(
        r#"SELECT {ASSIGNMENT_COLUMNS} FROM "assignments" WHERE "assignmentToken" = $1 LIMIT 1"#
    );
    let row = sqlx::query(&sql)
        .bind(token)
        .fetch_optional(proxy.pool())
        .await?;
    row.as_ref().map(map_assignment).transpose()
}

/// Conditional update; returns whether a row moved from `expected` to `status`.
pub async fn update_assignment_status(
    proxy: &DatabaseProxy,
    token: &str,
    expected: AssignmentStatus,
    status: AssignmentStatus,
    updated_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE "assignments"
        SET "status" = $1, "updatedAt" = $2
        WHERE "assignmentToken" = $3 AND "status" = $4
        "#,
    )
    .bind(status.as_str())
    .bind(updated_at)
    .bind(token)
    .bind(expected.as_str())
    .execute(proxy.pool())
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_assignments_by_learner(
    proxy: &DatabaseProxy,
    learner_id: &str,
) -> Result<Vec<Assignment>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {ASSIGNMENT_COLUMNS} FROM "assignments"
        WHERE "learnerId" = $1
        ORDER BY "createdAt" DESC, "seq" DESC
        "#
    );
    let rows = sqlx::query(&sql)
        .bind(learner_id)
        .fetch_all(proxy.pool())
        .await?;
    rows.iter().map(map_assignment).collect()
}

pub async fn list_pending_assignments_before(
    proxy: &DatabaseProxy,
    cutoff: DateTime<Utc>,
) -> Result<Vec<Assignment>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {ASSIGNMENT_COLUMNS} FROM "assignments"
        WHERE "status" = 'pending' AND "createdAt" < $1
        ORDER BY "createdAt" ASC
        "#
    );
    let rows = sqlx::query(&sql)
        .bind(cutoff)
        .fetch_all(proxy.pool())
        .await?;
    rows.iter().map(map_assignment).collect()
}

fn map_assignment(row: &PgRow) -> Result<Assignment, sqlx::Error> {
    let raw_status: String = row.try_get("status")?;
    let status = AssignmentStatus::parse(&raw_status).ok_or_else(|| {
        sqlx::Error::Decode(format!("unknown assignment status: {raw_status}").into())
    })?;

    Ok(Assignment {
        id: row.try_get("id")?,
        learner_id: row.try_get("learnerId")?,
        content_id: row.try_get("contentId")?,
        affinity_score: row.try_get("affinityScore")?,
        assignment_token: row.try_get("assignmentToken")?,
        status,
        created_at: row.try_get("createdAt")?,
        updated_at: row.try_get("updatedAt")?,
    })
}
