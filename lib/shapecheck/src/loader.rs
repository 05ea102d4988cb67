//! Parses resolved sources and merges them into a single graph.

use crate::config::SourceOptions;
use crate::error::{LoadError, SourceError};
use crate::http::Fetch;
use crate::source::SourceDescriptor;
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::Graph;
use std::io::Read;
use tracing::{debug, error, warn};

/// Loads sources one after the other into a merged graph.
///
/// A failing source is logged and contributes nothing, unless it is required.
/// Standard input is read at most once per loader, so one loader should be shared
/// by all the loads of a run.
pub struct GraphLoader<'a> {
    options: &'a SourceOptions,
    fetch: &'a dyn Fetch,
    stdin_consumed: bool,
}

impl<'a> GraphLoader<'a> {
    pub fn new(options: &'a SourceOptions, fetch: &'a dyn Fetch) -> Self {
        Self {
            options,
            fetch,
            stdin_consumed: false,
        }
    }

    /// The union of the graphs of all `sources`.
    pub fn load(&mut self, sources: &[SourceDescriptor]) -> Result<Graph, LoadError> {
        let mut merged = Graph::new();
        for source in sources {
            if matches!(source, SourceDescriptor::Stdin { .. }) {
                if self.stdin_consumed {
                    warn!(source = %source, "standard input was already read, skipping it");
                    continue;
                }
                self.stdin_consumed = true;
            }
            match self.load_source(source) {
                Ok(graph) => {
                    debug!(source = %source, statements = graph.len(), "loaded source");
                    merged.extend(&graph);
                }
                Err(e) if source.is_required() => {
                    error!(source = %source, error = %e, "required source failed");
                    return Err(LoadError::RequiredSource {
                        location: source.to_string(),
                        error: e,
                    });
                }
                Err(e) => warn!(source = %source, error = %e, "skipping source"),
            }
        }
        Ok(merged)
    }

    fn load_source(&self, source: &SourceDescriptor) -> Result<Graph, SourceError> {
        let opened = source.open(self.fetch, self.options)?;
        // The reader is dropped on return, closing files and connections.
        parse_graph(
            opened.reader,
            opened.syntax,
            opened.base.as_deref(),
            &source.to_string(),
        )
    }
}

/// Parses a whole stream into a graph with fresh blank node identifiers.
///
/// Named graphs are merged into the result. Any syntax error discards the
/// whole stream.
pub fn parse_graph(
    reader: impl Read,
    syntax: RdfFormat,
    base: Option<&str>,
    location: &str,
) -> Result<Graph, SourceError> {
    let mut parser = RdfParser::from_format(syntax).rename_blank_nodes();
    if let Some(base) = base {
        parser = parser
            .with_base_iri(base)
            .map_err(|error| SourceError::InvalidBase {
                location: location.to_owned(),
                error,
            })?;
    }
    let mut graph = Graph::new();
    for quad in parser.for_reader(reader) {
        let quad = quad.map_err(|error| SourceError::Parse {
            location: location.to_owned(),
            error,
        })?;
        graph.insert(quad.as_ref());
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::FetchResponse;
    use std::fs;
    use std::io::{self, Cursor};
    use std::path::Path;

    struct Offline;

    impl Fetch for Offline {
        fn get(&self, url: &str, _: &str) -> io::Result<FetchResponse> {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, url.to_owned()))
        }
    }

    /// Redirects `/a/start` to `/b/doc.ttl`, which holds a relative subject.
    struct Moved;

    impl Fetch for Moved {
        fn get(&self, url: &str, _: &str) -> io::Result<FetchResponse> {
            let (status, location, body) = match url {
                "http://h.example/a/start" => (302, Some("/b/doc.ttl".to_owned()), ""),
                "http://h.example/b/doc.ttl" => (200, None, "<x> <http://e/p> <http://e/o> ."),
                _ => return Err(io::Error::new(io::ErrorKind::NotFound, url.to_owned())),
            };
            Ok(FetchResponse {
                url: url.to_owned(),
                status,
                location,
                content_type: Some("text/turtle".to_owned()),
                body: Box::new(Cursor::new(body)),
            })
        }
    }

    fn file(path: &Path) -> SourceDescriptor {
        SourceDescriptor::File {
            path: path.to_owned(),
            syntax: RdfFormat::NTriples,
        }
    }

    #[test]
    fn sources_are_merged() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.nt"),
            "<http://e/a> <http://e/p> <http://e/b> .\n<http://e/x> <http://e/p> <http://e/y> .\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.nt"),
            "<http://e/x> <http://e/p> <http://e/y> .\n",
        )
        .unwrap();
        let options = SourceOptions::default();
        let graph = GraphLoader::new(&options, &Offline)
            .load(&[file(&dir.path().join("a.nt")), file(&dir.path().join("b.nt"))])
            .unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn broken_sources_contribute_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("ok.nt"),
            "<http://e/a> <http://e/p> <http://e/b> .\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("broken.nt"),
            "<http://e/c> <http://e/p> <http://e/d> .\n<http://e/c> <http://e/p> .\n",
        )
        .unwrap();
        let options = SourceOptions::default();
        let graph = GraphLoader::new(&options, &Offline)
            .load(&[
                file(&dir.path().join("missing.nt")),
                file(&dir.path().join("broken.nt")),
                file(&dir.path().join("ok.nt")),
                SourceDescriptor::Remote {
                    uri: "http://localhost:1/data.nt".to_owned(),
                    syntax: None,
                    required: false,
                },
            ])
            .unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn required_source_failure_is_fatal() {
        let options = SourceOptions::default();
        let result = GraphLoader::new(&options, &Offline).load(&[options.data_fallback()]);
        assert!(matches!(result, Err(LoadError::RequiredSource { .. })));
    }

    #[test]
    fn blank_nodes_of_different_sources_stay_distinct() {
        let turtle = "_:b <http://e/p> <http://e/o> .";
        let first = parse_graph(turtle.as_bytes(), RdfFormat::Turtle, None, "first").unwrap();
        let second = parse_graph(turtle.as_bytes(), RdfFormat::Turtle, None, "second").unwrap();
        let mut merged = first;
        merged.extend(&second);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn relative_iris_resolve_against_the_base() {
        let graph = parse_graph(
            "<s> <p> <o> .".as_bytes(),
            RdfFormat::Turtle,
            Some("http://example.com/dir/doc.ttl"),
            "remote",
        )
        .unwrap();
        let triple = graph.iter().next().unwrap();
        assert_eq!(triple.subject.to_string(), "<http://example.com/dir/s>");
    }

    #[test]
    fn redirected_documents_resolve_against_their_final_url() {
        let options = SourceOptions::default();
        let graph = GraphLoader::new(&options, &Moved)
            .load(&[SourceDescriptor::Remote {
                uri: "http://h.example/a/start".to_owned(),
                syntax: None,
                required: true,
            }])
            .unwrap();
        let triple = graph.iter().next().unwrap();
        assert_eq!(triple.subject.to_string(), "<http://h.example/b/x>");
    }
}
