use crate::config::{Invocation, SourceOptions};
use crate::error::Error;
use crate::http::{Fetch, HttpFetcher};
use crate::loader::GraphLoader;
use crate::present::present;
use crate::report::extract_rows;
use crate::shapes::assemble_shapes;
use crate::source::resolve_sources;
use crate::validate::{ShaclEngine, ShapeValidator};
use std::io::Write;
use tracing::debug;

/// Runs a whole validation with the HTTP client and the SHACL engine.
///
/// Returns the number of result rows written to `out`.
pub fn run(
    invocation: &Invocation,
    options: &SourceOptions,
    out: impl Write,
) -> Result<usize, Error> {
    let fetcher = HttpFetcher::new(options).map_err(Error::HttpClient)?;
    run_with(invocation, options, &fetcher, &ShaclEngine, out)
}

/// Same as [`run`] with explicit remote access and constraint engine.
pub fn run_with(
    invocation: &Invocation,
    options: &SourceOptions,
    fetch: &dyn Fetch,
    validator: &dyn ShapeValidator,
    out: impl Write,
) -> Result<usize, Error> {
    let mut loader = GraphLoader::new(options, fetch);

    let data = loader.load(&resolve_sources(
        &invocation.data,
        Some(options.data_fallback()),
        options,
    ))?;
    let shapes = loader.load(&resolve_sources(
        &invocation.shapes,
        Some(options.shapes_fallback()),
        options,
    ))?;
    let remove = loader.load(&resolve_sources(&invocation.remove, None, options))?;
    debug!(
        data = data.len(),
        shapes = shapes.len(),
        remove = remove.len(),
        "loaded graphs"
    );
    let shapes = assemble_shapes(shapes, &remove);

    let report = validator.validate(&shapes, &data)?;

    let rows = extract_rows(&report)?;
    present(rows, invocation.output, out)
}
