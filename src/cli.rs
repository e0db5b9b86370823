use clap::{Parser, Subcommand};

/// Demo REST API with an optional bearer-token gate
#[derive(Parser)]
#[command(name = "demo-api", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind (overrides DEMO_HOST)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides DEMO_PORT)
        #[arg(short, long)]
        port: Option<u16>,
        /// Serve every route without authentication
        #[arg(long)]
        no_auth: bool,
    },

    /// Print a bearer token for the configured user
    Token,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::parse_from(["demo-api", "serve", "--port", "9090", "--no-auth"]);
        match cli.command {
            Some(Commands::Serve { host, port, no_auth }) => {
                assert_eq!(host, None);
                assert_eq!(port, Some(9090));
                assert!(no_auth);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::parse_from(["demo-api"]);
        assert!(cli.command.is_none());
    }
}
