use crate::server;
use clap::{Args, Parser, Subcommand};
use job_board::api::http_client;
use job_board::config::AppConfig;
use job_board::domain::Role;
use job_board::error::AppError;
use job_board::session::Session;
use job_board::views::{PageContext, RouteGuard};

#[derive(Parser, Debug)]
#[command(
    name = "Job Board Web",
    about = "Serve the job board pages or inspect an employer's application statistics",
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
    /// Print an employer's application statistics, checked against their application list
    Statistics(StatisticsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct StatisticsArgs {
    /// Bearer token of the employer account
    #[arg(long)]
    pub(crate) token: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Statistics(args) => run_statistics(args).await,
    }
}

async fn run_statistics(args: StatisticsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let session = Session::from_bearer(Some(args.token));
    let identity = RouteGuard::require(&session, Role::Employer)?;

    let ctx = PageContext::for_session(http_client(&config.backend)?, &config.backend, &session);
    let (board, statistics) = ctx.workflow().employer_statistics(&identity).await?;

    println!(
        "Employer {}: {} applications",
        identity.user_id, statistics.counts.total
    );
    for (label, count) in statistics.counts.labelled(ctx.locale()) {
        println!("  {label:<12} {count}");
    }
    println!(
        "Backend statistics agree with the {} listed applications.",
        board.len()
    );
    Ok(())
}
