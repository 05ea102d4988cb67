use oxigraph::io::RdfParseError;
use oxigraph::sparql::{QueryEvaluationError, SparqlSyntaxError};
use oxigraph::store::StorageError;
use oxiri::IriParseError;
use std::io;

/// A single source could not be read. The loader degrades it to an empty contribution.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("Failed to read {location}: {error}")]
    Io {
        location: String,
        #[source]
        error: io::Error,
    },
    #[error("{location} answered with HTTP status {status}")]
    Status { location: String, status: u16 },
    #[error("{location} redirected again after a redirection, only one hop is followed")]
    TooManyRedirects { location: String },
    #[error("{location} redirected but redirections are disabled")]
    RedirectDisabled { location: String },
    #[error("{location} redirected without a valid Location header")]
    MissingLocation { location: String },
    #[error("{location} redirected to the invalid IRI {target}: {error}")]
    InvalidRedirect {
        location: String,
        target: String,
        #[source]
        error: IriParseError,
    },
    #[error("{location} is not a valid base IRI: {error}")]
    InvalidBase {
        location: String,
        #[source]
        error: IriParseError,
    },
    #[error("Failed to parse {location}: {error}")]
    Parse {
        location: String,
        #[source]
        error: RdfParseError,
    },
}

impl SourceError {
    pub(crate) fn io(location: impl ToString, error: io::Error) -> Self {
        Self::Io {
            location: location.to_string(),
            error,
        }
    }
}

/// Loading could not go on.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LoadError {
    /// The default remote source, which has no alternative, failed.
    #[error("The required source {location} could not be loaded")]
    RequiredSource {
        location: String,
        #[source]
        error: SourceError,
    },
}

/// The validation engine failed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ValidateError {
    #[error(transparent)]
    Engine(#[from] shapeval::ShaclError),
}

/// Result rows could not be extracted from the report.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Invalid built-in report query: {0}")]
    Syntax(#[from] SparqlSyntaxError),
    #[error(transparent)]
    Evaluation(#[from] QueryEvaluationError),
    #[error("The built-in report query is not a SELECT query")]
    NotSolutions,
}

/// Any failure of a validation run.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Validate(#[from] ValidateError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("Failed to set up the HTTP client: {0}")]
    HttpClient(#[source] io::Error),
    #[error("Failed to write the results: {0}")]
    Output(#[from] io::Error),
}
