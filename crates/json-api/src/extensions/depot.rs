//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};

use bazaar_app::auth::AuthenticatedUser;

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    /// Store the caller resolved by the auth middleware.
    fn insert_current_user(&mut self, user: AuthenticatedUser);

    fn current_user_or_401(&self) -> Result<AuthenticatedUser, StatusError>;

    /// The current user, provided they are an admin.
    fn admin_or_403(&self) -> Result<AuthenticatedUser, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_current_user(&mut self, user: AuthenticatedUser) {
        self.inject(user);
    }

    fn current_user_or_401(&self) -> Result<AuthenticatedUser, StatusError> {
        self.obtain::<AuthenticatedUser>()
            .copied()
            .map_err(|_ignored| StatusError::unauthorized())
    }

    fn admin_or_403(&self) -> Result<AuthenticatedUser, StatusError> {
        let user = self.current_user_or_401()?;

        if !user.is_admin() {
            return Err(StatusError::forbidden().brief("Admin role required"));
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use bazaar_app::auth::{Role, SessionUuid, UserUuid};
    use salvo::http::StatusCode;

    use super::*;

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_uuid: UserUuid::new(),
            session_uuid: SessionUuid::new(),
            role,
        }
    }

    #[test]
    fn missing_user_is_unauthorized() {
        let depot = Depot::new();

        let status = depot.current_user_or_401().err().map(|error| error.code);

        assert_eq!(status, Some(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn customers_are_forbidden_from_admin_routes() {
        let mut depot = Depot::new();

        depot.insert_current_user(user(Role::Customer));

        let status = depot.admin_or_403().err().map(|error| error.code);

        assert_eq!(status, Some(StatusCode::FORBIDDEN));
    }

    #[test]
    fn admins_pass_the_admin_check() {
        let mut depot = Depot::new();
        let admin = user(Role::Admin);

        depot.insert_current_user(admin);

        assert_eq!(depot.admin_or_403().ok(), Some(admin));
    }
}
