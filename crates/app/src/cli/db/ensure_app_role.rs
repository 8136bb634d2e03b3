use bazaar_app::database;
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct EnsureAppRoleArgs {
    /// Administrative PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Role the API server connects as
    #[arg(long, default_value = "bazaar_app")]
    role_name: String,

    /// Password for the role
    #[arg(long, env = "APP_DB_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(crate) async fn run(args: EnsureAppRoleArgs) -> Result<(), String> {
    if args.password.trim().is_empty() {
        return Err("password cannot be empty".to_string());
    }

    // CREATE/ALTER ROLE needs an administrative connection, not the app role.
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    database::ensure_app_role(&pool, &args.role_name, &args.password)
        .await
        .map_err(|error| format!("failed to ensure app role: {error}"))?;

    println!("ensured app role: {}", args.role_name);
    println!("the API server must connect as this role for owner scoping to apply");

    Ok(())
}
