//! Auth service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::{
    auth::{
        AuthServiceError, AuthSettings, AuthenticatedUser, NewSession, NewUser, SessionTokenSecret,
        SessionTokenVersion, SessionUuid, TokenPair, UserRecord, UserUuid, format_session_token,
        hash_password, hash_session_token, parse_session_token, repository::PgAuthRepository,
        verify_password,
    },
    database::Db,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    db: Db,
    repository: PgAuthRepository,
    settings: AuthSettings,
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: Db, settings: AuthSettings) -> Self {
        Self {
            db,
            repository: PgAuthRepository::new(),
            settings,
        }
    }

    async fn issue_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<TokenPair, AuthServiceError> {
        let session_uuid = SessionUuid::new();
        let now = Timestamp::now();
        let version = SessionTokenVersion::V1;

        let access_token =
            format_session_token(session_uuid, version, &SessionTokenSecret::generate());
        let refresh_token =
            format_session_token(session_uuid, version, &SessionTokenSecret::generate());

        let access_expires_at = now
            .checked_add(self.settings.access_ttl)
            .map_err(AuthServiceError::Time)?;
        let refresh_expires_at = now
            .checked_add(self.settings.refresh_ttl)
            .map_err(AuthServiceError::Time)?;

        self.repository
            .create_session(
                tx,
                &NewSession {
                    uuid: session_uuid,
                    user_uuid: user,
                    access_hash: hash_session_token(&access_token),
                    refresh_hash: hash_session_token(&refresh_token),
                    access_expires_at,
                    refresh_expires_at,
                },
            )
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
        })
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn register(&self, user: NewUser) -> Result<UserRecord, AuthServiceError> {
        let email = normalise_email(&user.email)?;
        let password_hash = hash_password(&user.password)?;

        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_user(&mut tx, user.uuid, &email, &password_hash, user.role)
            .await?;

        tx.commit().await?;

        info!(user_uuid = %created.uuid, role = %created.role, "registered user");

        Ok(created)
    }

    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let user = self
            .repository
            .find_user_by_email(&mut tx, email.trim())
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        if !verify_password(&user.password_hash, password)? {
            return Err(AuthServiceError::InvalidCredentials);
        }

        let tokens = self.issue_session(&mut tx, user.uuid).await?;

        tx.commit().await?;

        Ok(tokens)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthServiceError> {
        let parsed = parse_session_token(refresh_token)?;

        let mut tx = self.db.begin().await?;

        let session = self
            .repository
            .find_session(&mut tx, parsed.session_uuid)
            .await?
            .ok_or(AuthServiceError::Unauthenticated)?;

        if session.revoked_at.is_some()
            || session.refresh_hash != hash_session_token(refresh_token)
            || session.refresh_expires_at <= Timestamp::now()
        {
            return Err(AuthServiceError::Unauthenticated);
        }

        // A concurrent refresh of the same token loses here.
        if self.repository.revoke_session(&mut tx, session.uuid).await? == 0 {
            return Err(AuthServiceError::Unauthenticated);
        }

        let tokens = self.issue_session(&mut tx, session.user_uuid).await?;

        tx.commit().await?;

        Ok(tokens)
    }

    async fn logout(&self, session: SessionUuid) -> Result<(), AuthServiceError> {
        let mut tx = self.db.begin().await?;

        if self.repository.revoke_session(&mut tx, session).await? == 0 {
            return Err(AuthServiceError::Unauthenticated);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticatedUser, AuthServiceError> {
        let parsed = parse_session_token(bearer_token)?;

        let mut tx = self.db.begin().await?;

        let session = self
            .repository
            .find_session(&mut tx, parsed.session_uuid)
            .await?
            .ok_or(AuthServiceError::Unauthenticated)?;

        tx.commit().await?;

        if session.revoked_at.is_some()
            || session.access_hash != hash_session_token(bearer_token)
            || session.access_expires_at <= Timestamp::now()
        {
            return Err(AuthServiceError::Unauthenticated);
        }

        Ok(AuthenticatedUser {
            user_uuid: session.user_uuid,
            session_uuid: session.uuid,
            role: session.role,
        })
    }

    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let user = self.repository.get_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(user)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a user with a hashed password.
    async fn register(&self, user: NewUser) -> Result<UserRecord, AuthServiceError>;

    /// Verify credentials and open a new session.
    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthServiceError>;

    /// Exchange a refresh token for a new token pair, revoking the old session.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthServiceError>;

    /// Revoke a session.
    async fn logout(&self, session: SessionUuid) -> Result<(), AuthServiceError>;

    /// Resolve an access token to the user it was issued to.
    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticatedUser, AuthServiceError>;

    /// Retrieve a single user.
    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, AuthServiceError>;
}

fn normalise_email(email: &str) -> Result<String, AuthServiceError> {
    let email = email.trim().to_lowercase();

    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        });

    if !valid || email.chars().any(char::is_whitespace) {
        return Err(AuthServiceError::InvalidData("email address is invalid"));
    }

    Ok(email)
}
