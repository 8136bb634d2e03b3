//! Auth Config

use clap::Args;
use jiff::SignedDuration;

use bazaar_app::auth::AuthSettings;

/// Session token lifetimes.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// Access token lifetime in seconds
    #[arg(long, env = "ACCESS_TOKEN_TTL_SECONDS", default_value_t = 900_u32)]
    pub access_token_ttl_seconds: u32,

    /// Refresh token lifetime in seconds
    #[arg(long, env = "REFRESH_TOKEN_TTL_SECONDS", default_value_t = 2_592_000_u32)]
    pub refresh_token_ttl_seconds: u32,
}

impl AuthConfig {
    #[must_use]
    pub fn settings(&self) -> AuthSettings {
        AuthSettings {
            access_ttl: SignedDuration::from_secs(i64::from(self.access_token_ttl_seconds)),
            refresh_ttl: SignedDuration::from_secs(i64::from(self.refresh_token_ttl_seconds)),
        }
    }
}
