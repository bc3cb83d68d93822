//! Backing stores for the resource bundles, and database bootstrap.

pub mod memory;
pub mod postgres;

use crate::error::StoreError;
use sqlx::postgres::PgConnectOptions;
use sqlx::ConnectOptions;
use std::str::FromStr;

/// Connect to the `postgres` maintenance database and create the target database if absent.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin, db_name) = admin_options(database_url)?;
    let Some(db_name) = db_name.filter(|n| n != "postgres") else {
        return Ok(());
    };
    let mut conn: sqlx::PgConnection = admin.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", crate::sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Options for the `postgres` maintenance database with every other setting of
/// `url` kept, plus the target database name if the url names one.
fn admin_options(url: &str) -> Result<(PgConnectOptions, Option<String>), StoreError> {
    let opts = PgConnectOptions::from_str(url)?;
    let db_name = opts
        .get_database()
        .map(str::to_string)
        .filter(|n| !n.is_empty());
    Ok((opts.database("postgres"), db_name))
}

#[cfg(test)]
mod tests {
    use super::admin_options;
    use sqlx::postgres::PgSslMode;

    #[test]
    fn admin_options_keep_connection_settings() {
        let (admin, db) =
            admin_options("postgres://u:p@db.internal:6543/cms?sslmode=require&sslrootcert=/etc/ssl/ca.pem")
                .unwrap();
        assert_eq!(db.as_deref(), Some("cms"));
        assert_eq!(admin.get_database(), Some("postgres"));
        assert_eq!(admin.get_host(), "db.internal");
        assert_eq!(admin.get_port(), 6543);
        assert_eq!(admin.get_username(), "u");
        assert!(matches!(admin.get_ssl_mode(), PgSslMode::Require));
    }

    #[test]
    fn url_without_database_names_none() {
        let (_, db) = admin_options("postgres://u@localhost:5432").unwrap();
        assert!(db.is_none());
    }
}
