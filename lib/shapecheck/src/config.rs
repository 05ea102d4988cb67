//! Explicit configuration of a validation run.

use crate::source::SourceDescriptor;
use oxigraph::io::{JsonLdProfileSet, RdfFormat};
use oxiri::Iri;
use std::path::Path;
use std::time::Duration;

/// Canonical data set fetched when no data location is given.
pub const DEFAULT_DATA_URI: &str = "http://n2t.net/ark:/99152/p0d.json";
/// Canonical shape vocabulary fetched when no shape location is given.
pub const DEFAULT_SHAPES_URI: &str = "http://n2t.net/ark:/99152/p0v";
/// Only files with this extension are read out of a directory.
pub const SHAPE_FILE_EXTENSION: &str = "ttl";

const JSON_LD: RdfFormat = RdfFormat::JsonLd {
    profile: JsonLdProfileSet::empty(),
};

/// Maps file extensions to RDF syntaxes.
///
/// Explicit entries win over the extensions known to [`RdfFormat::from_extension`].
/// Anything else, including locations without extension, gets the default syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxMap {
    overrides: Vec<(String, RdfFormat)>,
    default: RdfFormat,
}

impl Default for SyntaxMap {
    fn default() -> Self {
        Self {
            overrides: Vec::new(),
            default: JSON_LD,
        }
    }
}

impl SyntaxMap {
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>, syntax: RdfFormat) -> Self {
        self.overrides
            .push((extension.into().to_ascii_lowercase(), syntax));
        self
    }

    #[must_use]
    pub fn with_default(mut self, syntax: RdfFormat) -> Self {
        self.default = syntax;
        self
    }

    pub fn default_syntax(&self) -> RdfFormat {
        self.default
    }

    /// The syntax registered for `extension`, if any.
    pub fn for_extension(&self, extension: &str) -> Option<RdfFormat> {
        let extension = extension.to_ascii_lowercase();
        self.overrides
            .iter()
            .rev()
            .find(|(e, _)| *e == extension)
            .map(|(_, syntax)| *syntax)
            .or_else(|| RdfFormat::from_extension(&extension))
    }

    /// The syntax of a local file, falling back to the default syntax.
    pub fn for_path(&self, path: &Path) -> RdfFormat {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| self.for_extension(e))
            .unwrap_or(self.default)
    }

    /// The syntax announced by the extension of the URI path, if it is a known one.
    pub fn for_uri(&self, uri: &str) -> Option<RdfFormat> {
        let iri = Iri::parse(uri).ok()?;
        let file_name = iri.path().rsplit('/').next()?;
        let (_, extension) = file_name.rsplit_once('.')?;
        self.for_extension(extension)
    }
}

/// How result rows are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// `name: value` lines, one blank line after each row.
    #[default]
    Text,
    /// SPARQL 1.1 query results JSON.
    Json,
}

/// Options of the source resolver and of the HTTP client.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Whether a `302` answer is followed. Only a single hop is ever followed.
    pub follow_redirects: bool,
    pub data_uri: String,
    pub data_syntax: RdfFormat,
    pub shapes_uri: String,
    pub shapes_syntax: RdfFormat,
    pub syntax_map: SyntaxMap,
    pub http_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            data_uri: DEFAULT_DATA_URI.to_owned(),
            data_syntax: JSON_LD,
            shapes_uri: DEFAULT_SHAPES_URI.to_owned(),
            shapes_syntax: RdfFormat::Turtle,
            syntax_map: SyntaxMap::default(),
            http_timeout: Some(Duration::from_secs(60)),
            user_agent: concat!("shapecheck/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl SourceOptions {
    #[must_use]
    pub fn with_follow_redirects(mut self, follow_redirects: bool) -> Self {
        self.follow_redirects = follow_redirects;
        self
    }

    #[must_use]
    pub fn with_data_uri(mut self, uri: impl Into<String>, syntax: RdfFormat) -> Self {
        self.data_uri = uri.into();
        self.data_syntax = syntax;
        self
    }

    #[must_use]
    pub fn with_shapes_uri(mut self, uri: impl Into<String>, syntax: RdfFormat) -> Self {
        self.shapes_uri = uri.into();
        self.shapes_syntax = syntax;
        self
    }

    #[must_use]
    pub fn with_syntax_map(mut self, syntax_map: SyntaxMap) -> Self {
        self.syntax_map = syntax_map;
        self
    }

    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.http_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The source read when no data location is given.
    pub fn data_fallback(&self) -> SourceDescriptor {
        SourceDescriptor::Remote {
            uri: self.data_uri.clone(),
            syntax: Some(self.data_syntax),
            required: true,
        }
    }

    /// The source read when no shape location is given.
    pub fn shapes_fallback(&self) -> SourceDescriptor {
        SourceDescriptor::Remote {
            uri: self.shapes_uri.clone(),
            syntax: Some(self.shapes_syntax),
            required: true,
        }
    }
}

/// Everything a single run is asked to do.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Data locations. Empty means the default data URI.
    pub data: Vec<String>,
    /// Shape locations. Empty means the default shape vocabulary.
    pub shapes: Vec<String>,
    /// Locations of statements subtracted from the shapes.
    pub remove: Vec<String>,
    pub output: OutputMode,
}
