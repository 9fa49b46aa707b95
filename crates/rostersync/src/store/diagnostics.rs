use chrono::Utc;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::diagnostic_log::{ActiveModel, Column, Entity as DiagnosticLog, Model};

use super::errors::Result;

/// Category for unreadable external-id payloads.
pub const CATEGORY_IDENTITY: &str = "identity";
/// Category for players whose team could not be resolved.
pub const CATEGORY_TEAM_RESOLUTION: &str = "team_resolution";

/// Persist one non-fatal diagnostic.
pub async fn add_diagnostic_log_entry<C: ConnectionTrait>(
    db: &C,
    category: &str,
    message: &str,
    context: Option<&str>,
) -> Result<()> {
    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        logged_at: Set(Utc::now().fixed_offset()),
        category: Set(category.to_string()),
        message: Set(message.to_string()),
        context: Set(context.map(str::to_string)),
    };
    DiagnosticLog::insert(model).exec_without_returning(db).await?;
    Ok(())
}

/// Diagnostics in one category, newest first.
pub async fn diagnostics_by_category<C: ConnectionTrait>(db: &C, category: &str) -> Result<Vec<Model>> {
    Ok(DiagnosticLog::find()
        .filter(Column::Category.eq(category))
        .order_by_desc(Column::LoggedAt)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn writes_one_row() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results([MockExecResult {
                rows_affected: 1,
                last_insert_id: 0,
            }])
            .into_connection();

        add_diagnostic_log_entry(&db, CATEGORY_IDENTITY, "payload is not an object", Some("nba_api"))
            .await
            .expect("insert should succeed");

        let sql = format!("{:?}", db.into_transaction_log());
        assert!(sql.contains("diagnostic_log"));
    }
}
