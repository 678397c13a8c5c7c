use std::path::PathBuf;

/// Errors that can occur while loading, flattening, or searching a document.
///
/// `Input`, `Fetch`, and `Parse` are terminal for a load attempt: the session
/// clears its document, entries, and search state when any of them is raised.
/// The remaining variants cover configuration and output plumbing.
///
/// # Examples
///
/// ```
/// use yamler_core::YamlerError;
///
/// let err = YamlerError::Input("please enter a URL".into());
/// assert!(err.to_string().contains("please enter a URL"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum YamlerError {
    /// The URL was empty or did not carry an http(s) scheme.
    #[error("{0}")]
    #[diagnostic(
        code(yamler::input),
        help("pass a GitHub file URL or a raw URL, e.g. https://github.com/org/chart/blob/main/values.yaml")
    )]
    Input(String),

    /// Network failure or non-success HTTP status.
    #[error("failed to fetch the file: {0}")]
    #[diagnostic(code(yamler::fetch))]
    Fetch(String),

    /// The fetched text is not a single valid YAML document.
    #[error("invalid YAML format: {0}")]
    #[diagnostic(code(yamler::parse))]
    Parse(String),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(yamler::config))]
    Config(String),

    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(yamler::io))]
    Io(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(yamler::serialization))]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(yamler::toml), help("check the syntax of your .yamler.toml"))]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    #[diagnostic(code(yamler::file_not_found))]
    FileNotFound(PathBuf),
}

impl From<serde_yaml::Error> for YamlerError {
    fn from(err: serde_yaml::Error) -> Self {
        YamlerError::Parse(err.to_string())
    }
}
