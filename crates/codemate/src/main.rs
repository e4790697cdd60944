use crate::prelude::*;
use clap::Parser;

mod config;
mod error;
mod generate;
mod github;
mod llm;
mod materialize;
mod pipeline;
mod prelude;
mod serve;
mod whoami;

#[cfg(test)]
mod test_support;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Generate starter projects from a description and publish them to GitHub"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// GitHub token used to publish generated projects
    #[clap(long, env = "GITHUB_TOKEN", global = true, hide_env_values = true)]
    github_token: Option<String>,

    /// GitHub REST API base URL
    #[clap(
        long,
        env = "GITHUB_API_URL",
        global = true,
        default_value = config::DEFAULT_GITHUB_API_URL
    )]
    github_api_url: String,

    /// Whether to display additional information.
    #[clap(long, env = "CODEMATE_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Generate a project and publish it
    Generate(crate::generate::App),

    /// Show the GitHub account behind the configured token
    Whoami(crate::whoami::App),

    /// Serve project generation over HTTP
    Serve(crate::serve::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Generate(sub_app) => crate::generate::run(sub_app, app.global).await,
        SubCommands::Whoami(sub_app) => crate::whoami::run(sub_app, app.global).await,
        SubCommands::Serve(sub_app) => crate::serve::run(sub_app, app.global).await,
    }
}
