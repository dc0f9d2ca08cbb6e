// src/db.rs

use std::str::FromStr;

use sqlx::{
    SqlitePool,
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{config::Config, error::AppError, utils::hash::hash_password};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens the SQLite database, creating the file when it does not exist.
///
/// Connections are never recycled: an in-memory database lives exactly as
/// long as its connection.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

/// Creates the configured administrator if they do not exist yet.
/// Nothing happens unless both ADMIN_EMAIL and ADMIN_PASSWORD are set.
pub async fn seed_admin(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };

    let admin_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM econnect_admin WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    if admin_exists.is_none() {
        tracing::info!("Seeding admin: {}", email);
        let hashed_password = hash_password(password)?;

        sqlx::query("INSERT INTO econnect_admin (name, email, password) VALUES (?, ?, ?)")
            .bind(&config.admin_name)
            .bind(email)
            .bind(hashed_password)
            .execute(pool)
            .await?;
        tracing::info!("Admin created successfully.");
    }
    Ok(())
}
