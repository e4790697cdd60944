//! Pure half of codemate.
//!
//! Everything here is deterministic and free of I/O: the prompt sent to the
//! model, the parser that cuts model output into files, the naming rules for
//! directories and repositories, and the plan for pushing files to GitHub.
//! The `codemate` binary performs the model call, the filesystem writes and
//! the HTTP requests around these functions.
//!
//! - [`prompt`] builds the system and user prompts.
//! - [`chat`] holds the wire types of OpenAI-compatible chat completions.
//! - [`template`] extracts marker-delimited sections into a [`files::GeneratedFileSet`].
//! - [`project`] derives slugs, project directories and repository names.
//! - [`github`] holds GitHub REST payloads and [`github::plan_push`].
//! - [`retry`] names the retry budget for eventually-consistent remote reads.
//! - [`result`] is the outcome reported to the CLI and HTTP callers.
//!
//! ```rust,ignore
//! use codemate_core::template::{MarkerParser, ResponseParser};
//!
//! let outcome = MarkerParser::default().parse("<README.md>\n# Hello\n</README.md>")?;
//! assert_eq!(outcome.files.get("README.md"), Some("# Hello"));
//! ```

pub mod chat;
pub mod files;
pub mod github;
pub mod project;
pub mod prompt;
pub mod result;
pub mod retry;
pub mod template;
