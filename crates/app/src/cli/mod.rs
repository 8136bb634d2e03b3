use clap::{Parser, Subcommand};

mod db;
mod product;
mod user;

#[derive(Debug, Parser)]
#[command(name = "bazaar-app", about = "Bazaar administration CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    User(user::UserCommand),
    Product(product::ProductCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::User(command) => user::run(command).await,
            Commands::Product(command) => product::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_user_create() {
        let cli = Cli::try_parse_from([
            "bazaar-app",
            "user",
            "create",
            "--email",
            "admin@example.com",
            "--password",
            "correct horse battery",
            "--role",
            "admin",
            "--database-url",
            "postgres://localhost/bazaar",
        ]);

        assert!(cli.is_ok(), "{cli:?}");
    }
}
