//! Turns user supplied locations into readable sources.

use crate::config::{SHAPE_FILE_EXTENSION, SourceOptions};
use crate::error::SourceError;
use crate::http::{Fetch, fetch_following_one_redirect};
use oxigraph::io::RdfFormat;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, StdinLock};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Location given to read standard input.
pub const STDIN_LOCATION: &str = "-";

/// A place statements are read from, with the syntax to parse them with.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceDescriptor {
    File {
        path: PathBuf,
        syntax: RdfFormat,
    },
    /// `syntax` is `None` when it must be guessed from the answer `Content-Type`.
    Remote {
        uri: String,
        syntax: Option<RdfFormat>,
        /// Set on the default fallback whose failure ends the run.
        required: bool,
    },
    Stdin {
        syntax: RdfFormat,
    },
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { path, .. } => write!(f, "{}", path.display()),
            Self::Remote { uri, .. } => f.write_str(uri),
            Self::Stdin { .. } => f.write_str("<stdin>"),
        }
    }
}

impl SourceDescriptor {
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Remote { required: true, .. })
    }

    /// Opens the source. Files and HTTP bodies are closed when the reader is dropped.
    pub fn open(
        &self,
        fetch: &dyn Fetch,
        options: &SourceOptions,
    ) -> Result<OpenedSource, SourceError> {
        match self {
            Self::File { path, syntax } => {
                let file = File::open(path).map_err(|e| SourceError::io(self, e))?;
                Ok(OpenedSource {
                    reader: SourceReader::File(BufReader::new(file)),
                    syntax: *syntax,
                    base: None,
                })
            }
            Self::Stdin { syntax } => Ok(OpenedSource {
                reader: SourceReader::Stdin(io::stdin().lock()),
                syntax: *syntax,
                base: None,
            }),
            Self::Remote { uri, syntax, .. } => {
                let accept = syntax.map_or(
                    "text/turtle, application/ld+json;q=0.9, application/n-triples;q=0.8, application/rdf+xml;q=0.7, */*;q=0.1",
                    RdfFormat::media_type,
                );
                let response =
                    fetch_following_one_redirect(fetch, uri, accept, options.follow_redirects)?;
                let syntax = syntax
                    .or_else(|| {
                        response
                            .content_type
                            .as_deref()
                            .and_then(RdfFormat::from_media_type)
                    })
                    .unwrap_or_else(|| options.syntax_map.default_syntax());
                Ok(OpenedSource {
                    reader: SourceReader::Remote(response.body),
                    syntax,
                    base: Some(response.url),
                })
            }
        }
    }
}

/// A source ready to be parsed.
pub struct OpenedSource {
    pub reader: SourceReader,
    pub syntax: RdfFormat,
    /// The URL the statements were finally read from, after redirections.
    pub base: Option<String>,
}

/// An opened source.
pub enum SourceReader {
    /// Holds the process-wide lock; dropping it releases the lock, never the descriptor.
    Stdin(StdinLock<'static>),
    File(BufReader<File>),
    Remote(Box<dyn Read>),
}

impl Read for SourceReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Stdin(r) => r.read(buf),
            Self::File(r) => r.read(buf),
            Self::Remote(r) => r.read(buf),
        }
    }
}

/// Resolves `locations` into sources, in order.
///
/// An empty list resolves to `fallback` (if any). Directories contribute
/// their `.ttl` children in file name order, `-` is standard input and
/// `http(s)://` locations are fetched.
pub fn resolve_sources(
    locations: &[String],
    fallback: Option<SourceDescriptor>,
    options: &SourceOptions,
) -> Vec<SourceDescriptor> {
    if locations.is_empty() {
        return fallback.into_iter().collect();
    }
    let syntax_map = &options.syntax_map;
    let mut sources = Vec::new();
    for location in locations {
        if location == STDIN_LOCATION {
            sources.push(SourceDescriptor::Stdin {
                syntax: syntax_map.default_syntax(),
            });
        } else if location.starts_with("http://") || location.starts_with("https://") {
            sources.push(SourceDescriptor::Remote {
                uri: location.clone(),
                syntax: syntax_map.for_uri(location),
                required: false,
            });
        } else {
            let path = Path::new(location);
            if path.is_dir() {
                match shape_files(path) {
                    Ok(files) => {
                        debug!(directory = %path.display(), files = files.len(), "listed directory");
                        sources.extend(files.into_iter().map(|path| SourceDescriptor::File {
                            path,
                            syntax: RdfFormat::Turtle,
                        }));
                    }
                    Err(error) => {
                        warn!(directory = %path.display(), %error, "skipping unreadable directory");
                    }
                }
            } else {
                sources.push(SourceDescriptor::File {
                    path: path.to_owned(),
                    syntax: syntax_map.for_path(path),
                });
            }
        }
    }
    sources
}

/// The regular files directly inside `directory` with the shape file extension, sorted.
///
/// Symbolic links are followed. Entries that cannot be inspected are skipped.
fn shape_files(directory: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(error) => {
                warn!(directory = %directory.display(), %error, "skipping unreadable directory entry");
                continue;
            }
        };
        if !path
            .extension()
            .is_some_and(|e| e == SHAPE_FILE_EXTENSION)
        {
            continue;
        }
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => files.push(path),
            Ok(_) => (),
            Err(error) => warn!(file = %path.display(), %error, "skipping unreadable file"),
        }
    }
    files.sort();
    Ok(files)
}
