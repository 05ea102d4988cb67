//! Validation results and their RDF encoding.

use crate::model::ShapeId;
use crate::path::PropertyPath;
use crate::vocab::shacl;
use oxrdf::vocab::{rdf, xsd};
use oxrdf::{BlankNode, Graph, Literal, NamedNode, NamedNodeRef, Term, Triple};
use std::fmt;

/// `sh:severity` of a shape, copied onto each of its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    #[default]
    Violation,
    Warning,
    Info,
}

impl Severity {
    pub fn iri(self) -> NamedNodeRef<'static> {
        match self {
            Self::Violation => shacl::VIOLATION,
            Self::Warning => shacl::WARNING,
            Self::Info => shacl::INFO,
        }
    }

    pub fn from_iri(iri: NamedNodeRef<'_>) -> Option<Self> {
        [Self::Violation, Self::Warning, Self::Info]
            .into_iter()
            .find(|s| s.iri() == iri)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Violation => "Violation",
            Self::Warning => "Warning",
            Self::Info => "Info",
        })
    }
}

/// One `sh:ValidationResult`.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub focus_node: Term,
    pub path: Option<PropertyPath>,
    pub value: Option<Term>,
    pub source_shape: ShapeId,
    pub component: NamedNode,
    /// Either the shape's `sh:message` values or a generated description.
    pub messages: Vec<Literal>,
    pub severity: Severity,
}

/// The outcome of validating a data graph.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    results: Vec<ValidationResult>,
}

impl ValidationReport {
    /// True when no result was produced, whatever its severity.
    pub fn conforms(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    pub(crate) fn push(&mut self, result: ValidationResult) {
        self.results.push(result);
    }

    /// Encodes the report with the SHACL validation report vocabulary.
    pub fn to_graph(&self) -> Graph {
        let mut graph = Graph::new();
        let report = BlankNode::default();
        graph.insert(&Triple::new(report.clone(), rdf::TYPE, shacl::VALIDATION_REPORT));
        graph.insert(&Triple::new(
            report.clone(),
            shacl::CONFORMS,
            Literal::new_typed_literal(self.conforms().to_string(), xsd::BOOLEAN),
        ));

        for result in &self.results {
            let node = BlankNode::default();
            graph.insert(&Triple::new(report.clone(), shacl::RESULT, node.clone()));
            graph.insert(&Triple::new(node.clone(), rdf::TYPE, shacl::VALIDATION_RESULT));
            graph.insert(&Triple::new(
                node.clone(),
                shacl::FOCUS_NODE,
                result.focus_node.clone(),
            ));
            if let Some(path) = &result.path {
                let path = path.write_to(&mut graph);
                graph.insert(&Triple::new(node.clone(), shacl::RESULT_PATH, path));
            }
            if let Some(value) = &result.value {
                graph.insert(&Triple::new(node.clone(), shacl::VALUE, value.clone()));
            }
            graph.insert(&Triple::new(
                node.clone(),
                shacl::SOURCE_SHAPE,
                result.source_shape.to_term(),
            ));
            graph.insert(&Triple::new(
                node.clone(),
                shacl::SOURCE_CONSTRAINT_COMPONENT,
                result.component.clone(),
            ));
            for message in &result.messages {
                graph.insert(&Triple::new(
                    node.clone(),
                    shacl::RESULT_MESSAGE,
                    message.clone(),
                ));
            }
            graph.insert(&Triple::new(
                node,
                shacl::RESULT_SEVERITY,
                result.severity.iri(),
            ));
        }
        graph
    }
}
