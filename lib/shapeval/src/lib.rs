#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod constraint;
mod error;
mod graph;
mod model;
mod path;
mod report;
mod validator;
pub mod vocab;

pub use constraint::Constraint;
pub use error::{ShaclError, ShaclParseError, ShaclValidationError};
pub use model::{Shape, ShapeId, ShapesGraph, Target};
pub use path::PropertyPath;
pub use report::{Severity, ValidationReport, ValidationResult};
pub use validator::ShaclValidator;

use oxrdf::Graph;

/// Validates `data` against the shapes found in `shapes` and returns the report as an RDF graph.
pub fn validate_graphs(shapes: &Graph, data: &Graph) -> Result<Graph, ShaclError> {
    let shapes = ShapesGraph::from_graph(shapes)?;
    let report = ShaclValidator::new(shapes).validate(data)?;
    Ok(report.to_graph())
}
