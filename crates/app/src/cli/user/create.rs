use bazaar_app::{
    auth::{AuthService, AuthSettings, NewUser, PgAuthService, Role, UserUuid},
    database::{self, Db},
};
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    /// Login email address
    #[arg(long)]
    email: String,

    /// Login password
    #[arg(long, env = "BAZAAR_USER_PASSWORD", hide_env_values = true)]
    password: String,

    /// `customer` or `admin`
    #[arg(long, default_value = "customer")]
    role: Role,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgAuthService::new(Db::new(pool), AuthSettings::default());

    let user = service
        .register(NewUser {
            uuid: UserUuid::new(),
            email: args.email,
            password: args.password,
            role: args.role,
        })
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("email: {}", user.email);
    println!("role: {}", user.role);

    Ok(())
}
