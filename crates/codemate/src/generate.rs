use std::path::PathBuf;

use codemate_core::project::ProjectRequest;
use codemate_core::result::{PipelineResult, Status};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{GeneratorArgs, PipelineSettings, DEFAULT_OUTPUT_DIR};
use crate::pipeline::generate_project;
use crate::prelude::{eprintln, println, *};
use crate::whoami::resolve_requester;

#[derive(Debug, clap::Parser)]
#[command(name = "generate")]
#[command(about = "Generate a project from a description and publish it to GitHub")]
pub struct App {
    /// What the project should do (e.g., "A simple Flask hello-world server")
    description: String,

    /// Name the project is filed under (defaults to the token's GitHub login)
    #[arg(short, long, env = "CODEMATE_USER")]
    user: Option<String>,

    /// Root directory for generated projects
    #[arg(short, long, env = "CODEMATE_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Write files locally and skip GitHub even when a token is set
    #[arg(long)]
    local_only: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    #[clap(flatten)]
    generator: GeneratorArgs,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if app.description.trim().is_empty() {
        return Err(eyre!("Please provide a project description."));
    }

    let config = app.generator.into_config();
    let token = if app.local_only {
        None
    } else {
        global.github_token.clone()
    };

    if global.verbose {
        eprintln!("Backend: {:?} ({})", config.provider, config.base_url);
        eprintln!("Model: {}", config.model);
        eprintln!("Output directory: {}", app.output_dir.display());
        if token.is_none() {
            eprintln!("No GitHub token, files will only be written locally");
        }
        eprintln!();
    }

    let spinner = (!app.json).then(new_spinner).transpose()?;

    let result = match config.validate() {
        Err(e) => PipelineResult::error(e.to_string()),
        Ok(()) => {
            set_spinner_msg(spinner.as_ref(), "Resolving requester...");
            let requester =
                resolve_requester(app.user.as_deref(), token.as_deref(), &global.github_api_url)
                    .await;
            let request = ProjectRequest::new(app.description, requester, token);
            let settings = PipelineSettings::new(app.output_dir, global.github_api_url);

            set_spinner_msg(spinner.as_ref(), format!("Generating '{}'...", request.slug()));
            generate_project(&config, settings, &request).await
        }
    };

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if app.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", format_result_text(&result));
    }

    if result.is_error() {
        return Err(eyre!("Project generation failed"));
    }

    Ok(())
}

fn new_spinner() -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(spinner)
}

fn set_spinner_msg(spinner: Option<&ProgressBar>, msg: impl Into<String>) {
    if let Some(spinner) = spinner {
        spinner.set_message(msg.into());
    }
}

/// Human-readable rendering of a pipeline result.
pub fn format_result_text(result: &PipelineResult) -> String {
    let status = match result.status {
        Status::Success => result.status.to_string().green().bold(),
        Status::Warning => result.status.to_string().yellow().bold(),
        Status::Error => result.status.to_string().red().bold(),
    };

    let mut table = new_table();
    table.add_row(prettytable::row!["Status".bold().cyan(), status]);
    if let Some(url) = &result.repo_url {
        table.add_row(prettytable::row!["Repository".bold().cyan(), url.bright_blue()]);
    }
    for (i, path) in result.generated_files.iter().enumerate() {
        let label = if i == 0 { "Files" } else { "" };
        table.add_row(prettytable::row![label.bold().cyan(), path.display()]);
    }

    let mut out = format!("\n{}\n\n{}", result.message, table);
    for warning in &result.warnings {
        out.push_str(&format!("{} {}\n", "warning:".yellow().bold(), warning));
    }
    out
}
