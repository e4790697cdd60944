use std::path::PathBuf;

use codemate_core::files::GeneratedFileSet;
use codemate_core::project::ProjectRequest;
use codemate_core::prompt::build_prompt;
use codemate_core::result::PipelineResult;
use codemate_core::template::{MarkerParser, ResponseParser};

use crate::config::{GeneratorConfig, GitHubConfig, PipelineSettings};
use crate::github::{GitHubClient, Reconciler, RepositoryHost};
use crate::llm::{Generator, TextGenerator};
use crate::materialize::{materialize, LocalWriteResult};
use crate::prelude::Error;

/// Output of the local stages, before publishing.
#[derive(Debug)]
pub struct LocalProject {
    pub slug: String,
    pub directory: PathBuf,
    pub files: GeneratedFileSet,
    pub written: LocalWriteResult,
}

impl LocalProject {
    /// Final result once the (optional) publishing step has run.
    pub fn into_result(self, published: Option<Result<String, Error>>) -> PipelineResult {
        let LocalWriteResult { written, warnings } = self.written;

        if written.is_empty() {
            return PipelineResult::error(format!(
                "Failed to write project files locally: none of the {} files could be written to {}",
                self.files.len(),
                self.directory.display()
            ))
            .with_warnings(warnings);
        }

        match published {
            None => PipelineResult::success(&self.slug, written, None),
            Some(Ok(url)) => PipelineResult::success(&self.slug, written, Some(url)),
            Some(Err(e)) => {
                log::error!("Failed to publish '{}' to GitHub: {e}", self.slug);
                PipelineResult::publish_failed(written, e)
            }
        }
        .with_warnings(warnings)
    }
}

/// Generate, parse, write and optionally publish one project.
pub struct Pipeline<G, P = MarkerParser> {
    generator: G,
    parser: P,
    settings: PipelineSettings,
}

impl<G: TextGenerator> Pipeline<G> {
    pub fn new(generator: G, settings: PipelineSettings) -> Self {
        Self {
            generator,
            parser: MarkerParser::default(),
            settings,
        }
    }
}

impl<G: TextGenerator, P: ResponseParser> Pipeline<G, P> {
    pub fn with_parser<Q: ResponseParser>(self, parser: Q) -> Pipeline<G, Q> {
        Pipeline {
            generator: self.generator,
            parser,
            settings: self.settings,
        }
    }

    /// Run every stage. Publishing happens only when a host is given.
    ///
    /// Never fails: every failure is folded into the returned status.
    pub async fn run<H: RepositoryHost>(
        &self,
        request: &ProjectRequest,
        host: Option<&H>,
    ) -> PipelineResult {
        let project = match self.build_locally(request).await {
            Ok(project) => project,
            Err(e) => {
                log::error!("Project generation failed: {e}");
                return PipelineResult::error(e.to_string());
            }
        };

        let published = match host {
            Some(host) if !project.written.written.is_empty() => {
                Some(self.publish(host, request, &project.files).await)
            }
            _ => None,
        };

        project.into_result(published)
    }

    /// Text generation, parsing and the local write, in that order.
    pub async fn build_locally(&self, request: &ProjectRequest) -> Result<LocalProject, Error> {
        let slug = request.slug();
        let prompt = build_prompt(&request.description);

        log::debug!("Generating project '{slug}' for {}", request.requester);
        let raw = self.generator.generate(&prompt).await?;

        let outcome = self.parser.parse(&raw)?;
        for skipped in &outcome.skipped {
            log::warn!("Skipping {}: {}", skipped.path, skipped.reason);
        }

        let directory = request.project_directory(&self.settings.output_root);
        let written = materialize(&directory, &outcome.files).await?;
        log::debug!(
            "Wrote {} file(s) to {}",
            written.written.len(),
            directory.display()
        );

        Ok(LocalProject {
            slug,
            directory,
            files: outcome.files,
            written,
        })
    }

    async fn publish<H: RepositoryHost>(
        &self,
        host: &H,
        request: &ProjectRequest,
        files: &GeneratedFileSet,
    ) -> Result<String, Error> {
        Reconciler::new(host)
            .with_branch_retry(self.settings.branch_retry)
            .publish(&request.repository_name(), &request.description, files)
            .await
    }
}

/// Run the pipeline with the configured backends.
///
/// A missing API key is reported before any network call.
pub async fn generate_project(
    config: &GeneratorConfig,
    settings: PipelineSettings,
    request: &ProjectRequest,
) -> PipelineResult {
    let generator = match Generator::from_config(config) {
        Ok(generator) => generator,
        Err(e) => {
            log::error!("Invalid generator configuration: {e}");
            return PipelineResult::error(e.to_string());
        }
    };

    let client = request
        .credential()
        .map(|token| GitHubClient::new(&GitHubConfig::new(settings.github_api_url.as_str(), token)));
    let pipeline = Pipeline::new(generator, settings);

    match client {
        None => pipeline.run::<GitHubClient>(request, None).await,
        Some(Ok(client)) => pipeline.run(request, Some(&client)).await,
        Some(Err(e)) => match pipeline.build_locally(request).await {
            Ok(project) => project.into_result(Some(Err(e))),
            Err(e) => PipelineResult::error(e.to_string()),
        },
    }
}
