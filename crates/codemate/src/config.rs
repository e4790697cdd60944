use std::fmt;
use std::path::PathBuf;

use codemate_core::retry::RetryPolicy;

use crate::prelude::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.novita.ai/v3/openai";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.1-8b-instruct";
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_OUTPUT_DIR: &str = "generated_projects";

/// Older deployments configured the key under the provider's own name.
pub const LEGACY_API_KEY_VAR: &str = "NOVITA_AI_API_KEY";

/// Text-generation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Provider {
    /// Hosted OpenAI-compatible chat completions endpoint
    #[default]
    Openai,
    /// Local Ollama server
    Ollama,
}

/// Text-generation flags shared by every command that runs the pipeline
#[derive(Debug, Clone, clap::Args)]
pub struct GeneratorArgs {
    /// Text-generation backend
    #[clap(long, env = "CODEMATE_PROVIDER", value_enum, default_value = "openai")]
    pub provider: Provider,

    /// API key for the hosted backend (falls back to NOVITA_AI_API_KEY)
    #[clap(long, env = "CODEMATE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[clap(long, env = "CODEMATE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Ollama base URL, used with `--provider ollama`
    #[clap(long, env = "OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL)]
    pub ollama_url: String,

    /// Model name
    #[clap(long, env = "CODEMATE_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Token ceiling for the single completion call
    #[clap(long, env = "CODEMATE_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,
}

impl GeneratorArgs {
    /// Resolve the final configuration, reading the legacy key variable if needed.
    pub fn into_config(self) -> GeneratorConfig {
        let api_key = resolve_api_key(self.api_key, std::env::var(LEGACY_API_KEY_VAR).ok());
        let base_url = match self.provider {
            Provider::Openai => self.base_url,
            Provider::Ollama => self.ollama_url,
        };

        GeneratorConfig {
            provider: self.provider,
            base_url,
            api_key,
            model: self.model,
            max_tokens: self.max_tokens,
        }
    }
}

/// First non-blank key wins.
pub fn resolve_api_key(primary: Option<String>, legacy: Option<String>) -> Option<String> {
    primary
        .into_iter()
        .chain(legacy)
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

/// Everything needed to reach the text-generation backend.
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub provider: Provider,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
}

impl GeneratorConfig {
    /// Hosted configuration with the stock endpoint and model.
    pub fn hosted(api_key: Option<String>) -> Self {
        Self {
            provider: Provider::Openai,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fails when the hosted backend has no API key.
    pub fn validate(&self) -> Result<(), Error> {
        match (self.provider, self.api_key.as_deref()) {
            (Provider::Openai, None) => Err(Error::Configuration(format!(
                "Text-generation API key not found. Set CODEMATE_API_KEY (or {LEGACY_API_KEY_VAR}) in your environment."
            ))),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// GitHub API access for one token.
#[derive(Clone)]
pub struct GitHubConfig {
    pub base_url: String,
    pub token: String,
}

impl GitHubConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Settings of the pipeline that do not depend on the request.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub output_root: PathBuf,
    pub github_api_url: String,
    pub branch_retry: RetryPolicy,
}

impl PipelineSettings {
    pub fn new(output_root: impl Into<PathBuf>, github_api_url: impl Into<String>) -> Self {
        Self {
            output_root: output_root.into(),
            github_api_url: github_api_url.into(),
            branch_retry: RetryPolicy::BRANCH_REF,
        }
    }

    pub fn with_branch_retry(mut self, retry: RetryPolicy) -> Self {
        self.branch_retry = retry;
        self
    }
}
