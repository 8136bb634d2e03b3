//! Database connection management

use sqlx::{PgPool, Postgres, Transaction, query};
use thiserror::Error;

use crate::auth::UserUuid;

/// SQL used to set the acting user for row-level security.
pub const SET_USER_CONTEXT_SQL: &str = "SELECT set_config('app.current_user_uuid', $1, true)";

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction with no user context. Owner-scoped tables are invisible to it.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction fails.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Begin a transaction and set the acting user for RLS policies.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction or setting user context fails.
    pub async fn begin_user_transaction(
        &self,
        user: UserUuid,
    ) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        query(SET_USER_CONTEXT_SQL)
            .bind(user.into_uuid().to_string())
            .execute(&mut *tx)
            .await?;

        Ok(tx)
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Run pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

#[derive(Debug, Error)]
pub enum AppRoleError {
    #[error("invalid role name {0:?}")]
    InvalidName(String),

    #[error("password must not contain single quotes")]
    InvalidPassword,

    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}

/// Create (or update the password of) a login role that is not a superuser, and grant it
/// access to the application tables.
///
/// Superusers and table owners bypass row-level security, so the server must connect as a
/// role like this one for owner scoping to apply.
///
/// # Errors
///
/// Returns an error if the role name or password is not acceptable, or a statement fails.
pub async fn ensure_app_role(pool: &PgPool, role: &str, password: &str) -> Result<(), AppRoleError> {
    validate_role_name(role)?;

    if password.contains('\'') {
        return Err(AppRoleError::InvalidPassword);
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_roles WHERE rolname = $1)")
        .bind(role)
        .fetch_one(pool)
        .await?;

    let statement = if exists {
        format!("ALTER ROLE {role} WITH LOGIN PASSWORD '{password}'")
    } else {
        format!(
            "CREATE ROLE {role} WITH LOGIN PASSWORD '{password}' \
               NOSUPERUSER NOCREATEDB NOCREATEROLE NOBYPASSRLS"
        )
    };

    if let Err(error) = query(&statement).execute(pool).await {
        // Concurrent creators race on the role name; the role exists either way.
        let duplicate = error
            .as_database_error()
            .and_then(|database_error| database_error.code())
            .is_some_and(|code| code == "42710" || code == "23505");

        if !duplicate {
            return Err(error.into());
        }
    }

    for statement in [
        format!("GRANT USAGE ON SCHEMA public TO {role}"),
        format!("GRANT SELECT, INSERT, UPDATE, DELETE ON ALL TABLES IN SCHEMA public TO {role}"),
        format!("GRANT USAGE, SELECT ON ALL SEQUENCES IN SCHEMA public TO {role}"),
    ] {
        query(&statement).execute(pool).await?;
    }

    Ok(())
}

fn validate_role_name(role: &str) -> Result<(), AppRoleError> {
    let valid = !role.is_empty()
        && role.len() <= 63
        && role.starts_with(|c: char| c.is_ascii_lowercase() || c == '_')
        && role
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(AppRoleError::InvalidName(role.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_are_restricted_to_plain_identifiers() {
        assert!(validate_role_name("bazaar_app").is_ok());
        assert!(validate_role_name("").is_err());
        assert!(validate_role_name("1app").is_err());
        assert!(validate_role_name("app; DROP TABLE users").is_err());
        assert!(validate_role_name("App").is_err());
    }
}
