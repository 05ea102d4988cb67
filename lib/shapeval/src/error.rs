use oxrdf::Term;

/// Any failure of the engine.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShaclError {
    /// The shapes graph could not be read into shapes.
    #[error(transparent)]
    Parse(#[from] ShaclParseError),
    /// Evaluation of the shapes against the data graph failed.
    #[error(transparent)]
    Validation(#[from] ShaclValidationError),
}

/// An error raised while reading shapes out of an RDF graph.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShaclParseError {
    /// A node used as a shape is a literal.
    #[error("{shape} cannot be used as a shape: {message}")]
    InvalidShape { shape: Term, message: String },
    /// An `rdf:first`/`rdf:rest` chain is broken or cyclic.
    #[error("Invalid RDF list in the definition of {shape}: {message}")]
    InvalidRdfList { shape: Term, message: String },
    /// A property path is not one of the SHACL path forms.
    #[error("Invalid property path in {shape}: {message}")]
    InvalidPropertyPath { shape: Term, message: String },
    /// `sh:pattern` is not a valid regular expression.
    #[error("Invalid regular expression '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },
}

impl ShaclParseError {
    pub(crate) fn invalid_shape(shape: impl Into<Term>, message: impl Into<String>) -> Self {
        Self::InvalidShape {
            shape: shape.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_rdf_list(shape: impl Into<Term>, message: impl Into<String>) -> Self {
        Self::InvalidRdfList {
            shape: shape.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_property_path(
        shape: impl Into<Term>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidPropertyPath {
            shape: shape.into(),
            message: message.into(),
        }
    }
}

/// An error raised while evaluating shapes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShaclValidationError {
    /// Shape references nest deeper than the engine allows.
    #[error("Shape references nest deeper than {depth} levels")]
    MaxRecursionDepth { depth: usize },
}
