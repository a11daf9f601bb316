use crate::demo::{run_demo, show_specification, SpecArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use onboarding::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Onboarding API",
    about = "Collect and track KYC answers for business customers",
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
    /// Print the KYC template that applies to a customer kind and entity
    Spec(SpecArgs),
    /// Walk one customer from creation to submission and print every response
    Demo,
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

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Spec(args) => show_specification(args),
        Command::Demo => run_demo(),
    }
}
