use crate::config::GitHubConfig;
use crate::github::GitHubClient;
use crate::prelude::{eprintln, println, *};

/// Requester used when neither a name nor a usable token is available.
pub const ANONYMOUS: &str = "anonymous";

#[derive(Debug, clap::Parser)]
#[command(name = "whoami")]
#[command(about = "Show the GitHub account a token belongs to")]
pub struct App {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let token = global
        .github_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_eyre("No GitHub token supplied. Set GITHUB_TOKEN or pass --github-token.")?;

    if global.verbose {
        eprintln!("GitHub API: {}", global.github_api_url);
    }

    let client = GitHubClient::new(&GitHubConfig::new(global.github_api_url.as_str(), token))?;
    let user = client.user().await?;

    if app.json {
        let value = serde_json::json!({
            "login": user.login,
            "html_url": user.html_url,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["Login".bold().cyan(), user.login.bright_white()]);
    if let Some(url) = &user.html_url {
        table.add_row(prettytable::row!["Profile".bold().cyan(), url.bright_blue()]);
    }
    table.printstd();

    Ok(())
}

/// Name generated projects are filed under.
///
/// An explicit name wins; otherwise the token's GitHub login, then [`ANONYMOUS`].
pub async fn resolve_requester(user: Option<&str>, token: Option<&str>, api_url: &str) -> String {
    if let Some(user) = user.map(str::trim).filter(|u| !u.is_empty()) {
        return user.to_string();
    }

    let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
        return ANONYMOUS.to_string();
    };

    let login = match GitHubClient::new(&GitHubConfig::new(api_url, token)) {
        Ok(client) => client.user().await.map(|user| user.login),
        Err(e) => Err(e),
    };

    login.unwrap_or_else(|e| {
        log::warn!("Could not resolve GitHub login, using '{ANONYMOUS}': {e}");
        ANONYMOUS.to_string()
    })
}
