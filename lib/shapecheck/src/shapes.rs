use oxigraph::model::Graph;
use tracing::debug;

/// The effective shapes: every statement of `primary` that is not in `remove`.
///
/// Statements are compared structurally. Blank nodes are renamed on every parse,
/// so statements mentioning them are only removed when both graphs share them.
pub fn assemble_shapes(mut primary: Graph, remove: &Graph) -> Graph {
    if remove.is_empty() {
        return primary;
    }
    let before = primary.len();
    for triple in remove {
        primary.remove(triple);
    }
    debug!(
        removed = before - primary.len(),
        remaining = primary.len(),
        "subtracted statements from the shapes"
    );
    primary
}
