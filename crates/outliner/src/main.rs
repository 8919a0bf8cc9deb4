use crate::prelude::*;
use clap::Parser;

mod batch;
mod config;
mod error;
mod inspect;
mod outline;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Extract a title and H1-H3 outline from PDF documents using layout cues"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// TOML file overriding classifier thresholds
    #[clap(long, env = "OUTLINER_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Whether to display additional information.
    #[clap(long, env = "OUTLINER_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Outline every PDF in a directory, writing one JSON file per document
    Batch(crate::batch::BatchOptions),

    /// Outline a single PDF
    Outline(crate::outline::OutlineOptions),

    /// Show per-line features and classifier decisions for a PDF
    Inspect(crate::inspect::InspectOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    let app = App::parse();

    let default_filter = if app.global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    color_eyre::install()?;

    match app.command {
        SubCommands::Batch(options) => crate::batch::run(options, app.global).await,
        SubCommands::Outline(options) => crate::outline::run(options, app.global).await,
        SubCommands::Inspect(options) => crate::inspect::run(options, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
