use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GrabError {
    #[error("malformed path template: {0}")]
    TemplateSyntax(String),

    #[error("unknown placeholder `{{{0}}}` in path template")]
    #[diagnostic(help(
        "known placeholders: institution, model, experiment, run, variable, estimate, version"
    ))]
    UnknownPlaceholder(String),

    #[error("path template does not reference `{{{0}}}`")]
    MissingPlaceholder(String),

    #[error("invalid {field}: {value:?}")]
    InvalidLabel { field: &'static str, value: String },

    #[error("invalid variable name: {0:?}")]
    InvalidVariable(String),

    #[error("variable listed more than once: {0}")]
    DuplicateVariable(String),

    #[error("variable list is empty")]
    EmptyVariableList,

    #[error("institution `{institution}` does not appear as a directory in `{path}`")]
    #[diagnostic(help("pass --output_directory to choose where the files go"))]
    InstitutionNotInPath { institution: String, path: String },

    #[error("htar thread count must be at least 1, got {0}")]
    InvalidThreads(u32),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("required tool not found: {0}")]
    MissingTool(String),

    #[error("failed to verify that `{path}` exists: {message}")]
    VerificationFailed { path: String, message: String },

    #[error("failed to extract `{variable}` from `{path}`: {message}")]
    ExtractionFailed {
        variable: String,
        path: String,
        message: String,
    },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl GrabError {
    /// True for errors raised before any archive interaction.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GrabError::TemplateSyntax(_)
                | GrabError::UnknownPlaceholder(_)
                | GrabError::MissingPlaceholder(_)
                | GrabError::InvalidLabel { .. }
                | GrabError::InvalidVariable(_)
                | GrabError::DuplicateVariable(_)
                | GrabError::EmptyVariableList
                | GrabError::InstitutionNotInPath { .. }
                | GrabError::InvalidThreads(_)
                | GrabError::ConfigRead(_)
                | GrabError::ConfigParse(_)
        )
    }
}
