use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use rocket::fairing::AdHoc;
use rocket_sync_db_pools::{database, diesel};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Pooled connection to the session store, configured under
/// `databases.sqlite_db`.
#[database("sqlite_db")]
pub struct DbConn(diesel::SqliteConnection);

/// Applies every pending migration and returns how many ran.
pub fn run_pending_migrations(conn: &mut diesel::SqliteConnection) -> Result<usize, String> {
    let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| e.to_string())?;
    for version in &applied {
        info!("Applied migration {}", version);
    }
    Ok(applied.len())
}

/// Runs migrations on ignition. Ignition fails if the store can't be
/// migrated.
pub fn run_migrations_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Diesel Migrations", |rocket| async {
        let Some(conn) = DbConn::get_one(&rocket).await else {
            error!("No database connection available for migrations");
            return Err(rocket);
        };
        match conn.run(run_pending_migrations).await {
            Ok(count) => {
                debug!("{} pending migrations applied", count);
                Ok(rocket)
            }
            Err(e) => {
                error!("Failed to run migrations: {}", e);
                Err(rocket)
            }
        }
    })
}
