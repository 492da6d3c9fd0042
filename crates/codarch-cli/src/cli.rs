use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    version = env!("CARGO_PKG_VERSION"),
    about = "codarch - A REST archive for reusable code snippets",
    long_about = "codarch stores code snippets in a SQLite database and serves them over a JSON API."
)]
pub struct Codarch {
    #[clap(subcommand)]
    pub commands: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the API server (the default when no command is given)
    Serve {
        #[clap(long, short, help = "Port to listen on, overrides PORT")]
        port: Option<u16>,

        #[clap(long, help = "Database path, overrides DATABASE_URL")]
        database_url: Option<String>,
    },
    /// Check that the database can be opened and answers a query
    Ping {
        #[clap(long, help = "Database path, overrides DATABASE_URL")]
        database_url: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_flags_parse() {
        let args = Codarch::parse_from(["codarch", "serve", "--port", "8080", "--database-url", "a.db"]);
        assert_eq!(
            args.commands,
            Some(Commands::Serve {
                port: Some(8080),
                database_url: Some("a.db".to_string()),
            })
        );
    }

    #[test]
    fn no_command_is_allowed() {
        let args = Codarch::parse_from(["codarch"]);
        assert_eq!(args.commands, None);
    }
}
