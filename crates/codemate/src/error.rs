use codemate_core::template::ParseError;

/// Failures of the generation-and-publish pipeline.
///
/// Local variants abort a run. Remote variants only abort publishing and
/// downgrade the result to a warning.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Configuration(String),

    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("Failed to write project files locally: {0}")]
    LocalWrite(String),

    #[error("GitHub authentication failed: {0}")]
    Auth(String),

    /// Used to trigger repository creation, not surfaced to users.
    #[error("Not found on GitHub: {0}")]
    RemoteNotFound(String),

    /// The remote has not caught up with a previous write yet.
    #[error("GitHub state not yet consistent: {0}")]
    RemoteTransient(String),

    #[error("GitHub operation failed: {0}")]
    Remote(String),
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Generation(err.to_string())
    }
}

impl Error {
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::RemoteTransient(_))
    }
}
