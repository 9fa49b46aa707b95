//! `rostersync migrate`: schema management.

use console::style;
use rostersync::db;
use rostersync::migration::{Migrator, MigratorTrait};

use crate::MigrateAction;

pub(crate) async fn handle_migrate(
    action: MigrateAction,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;

    match action {
        MigrateAction::Up => {
            let pending = Migrator::get_pending_migrations(&db).await?.len();
            if pending == 0 {
                println!("Schema is up to date.");
                return Ok(());
            }
            println!("Applying {pending} migration(s)...");
            Migrator::up(&db, None).await?;
            println!("{} Migrations applied.", style("✓").green());
        }
        MigrateAction::Down => {
            println!("Rolling back the last migration...");
            Migrator::down(&db, Some(1)).await?;
            println!("{} Rollback complete.", style("✓").green());
        }
        MigrateAction::Status => {
            let applied = Migrator::get_applied_migrations(&db).await?.len();
            let pending = Migrator::get_pending_migrations(&db).await?.len();
            println!("{applied} applied, {pending} pending");
            Migrator::status(&db).await?;
        }
        MigrateAction::Fresh => {
            println!(
                "{} Dropping every table, including synced rosters, and reapplying migrations...",
                style("!").yellow().bold()
            );
            Migrator::fresh(&db).await?;
            println!("{} Fresh schema ready.", style("✓").green());
        }
    }

    Ok(())
}
