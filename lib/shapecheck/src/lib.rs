#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod error;
mod http;
mod loader;
mod pipeline;
mod present;
mod report;
mod shapes;
mod source;
mod validate;

pub use crate::config::{
    DEFAULT_DATA_URI, DEFAULT_SHAPES_URI, Invocation, OutputMode, SHAPE_FILE_EXTENSION,
    SourceOptions, SyntaxMap,
};
pub use crate::error::{Error, LoadError, ReportError, SourceError, ValidateError};
pub use crate::http::{Fetch, FetchResponse, HttpFetcher, fetch_following_one_redirect};
pub use crate::loader::{GraphLoader, parse_graph};
pub use crate::pipeline::{run, run_with};
pub use crate::present::{format_term, present};
pub use crate::report::{DEFAULT_QUERY, ResultRows, extract_rows};
pub use crate::shapes::assemble_shapes;
pub use crate::source::{
    OpenedSource, STDIN_LOCATION, SourceDescriptor, SourceReader, resolve_sources,
};
pub use crate::validate::{ShaclEngine, ShapeValidator};
