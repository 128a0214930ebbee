use crate::search::{parse_query, run_search, SearchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rigger::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Rigger Job Board",
    about = "Run the rigging job marketplace API or query a job seed file",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Filter jobs from a seed CSV and print the result page as JSON
    Search(SearchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Job seed CSV loaded into the store at start-up (overrides JOBS_SEED_CSV)
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Search(args) => run_search(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["rigger-api"]).expect("parses");
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["rigger-api", "serve", "--port", "8181"]).expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => assert_eq!(args.port, Some(8181)),
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn search_parses_query_strings() {
        let cli = Cli::try_parse_from([
            "rigger-api",
            "search",
            "--seed",
            "jobs.csv",
            "--query",
            "jobType=CRANE_OPERATION&minPay=600&limit=5",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Search(args)) => {
                let query = args.query.expect("query parsed");
                assert_eq!(query.job_type.as_deref(), Some("CRANE_OPERATION"));
                assert_eq!(query.min_pay.as_deref(), Some("600"));
                assert_eq!(query.limit.as_deref(), Some("5"));
            }
            other => panic!("expected search, got {other:?}"),
        }

        assert!(parse_query("minPay=plenty").is_ok_and(|query| query.into_search().is_err()));
    }
}
