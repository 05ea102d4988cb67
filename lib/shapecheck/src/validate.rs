use crate::error::ValidateError;
use oxigraph::model::Graph;
use tracing::debug;

/// A constraint engine turning a shapes graph and a data graph into a report graph.
pub trait ShapeValidator {
    fn validate(&self, shapes: &Graph, data: &Graph) -> Result<Graph, ValidateError>;
}

/// [`ShapeValidator`] backed by the SHACL Core engine of [`shapeval`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ShaclEngine;

impl ShapeValidator for ShaclEngine {
    fn validate(&self, shapes: &Graph, data: &Graph) -> Result<Graph, ValidateError> {
        debug!(
            shapes = shapes.len(),
            data = data.len(),
            "validating data against shapes"
        );
        Ok(shapeval::validate_graphs(shapes, data)?)
    }
}
