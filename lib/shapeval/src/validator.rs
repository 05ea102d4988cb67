//! Evaluation of shapes against a data graph.

use crate::constraint::Constraint;
use crate::error::ShaclValidationError;
use crate::graph;
use crate::model::{Shape, ShapeId, ShapesGraph, subclass_closure};
use crate::path::PropertyPath;
use crate::report::{ValidationReport, ValidationResult};
use crate::vocab::shacl;
use oxrdf::vocab::{rdf, xsd};
use oxrdf::{Graph, Literal, NamedNode, NamedNodeRef, Term};
use rustc_hash::FxHashSet;
use std::cmp::Ordering;

/// How deep `sh:node`, `sh:property` and the logical constraints may nest.
const MAX_RECURSION_DEPTH: usize = 50;

/// Validates data graphs against a fixed set of shapes.
#[derive(Debug, Clone)]
pub struct ShaclValidator {
    shapes: ShapesGraph,
}

/// A constraint failure before it is turned into a [`ValidationResult`].
struct Failure {
    value: Option<Term>,
    /// Overrides the shape path, used by `sh:closed`.
    path: Option<PropertyPath>,
    message: String,
}

impl Failure {
    fn value(value: &Term, message: impl Into<String>) -> Self {
        Self {
            value: Some(value.clone()),
            path: None,
            message: message.into(),
        }
    }

    fn focus(message: impl Into<String>) -> Self {
        Self {
            value: None,
            path: None,
            message: message.into(),
        }
    }
}

impl ShaclValidator {
    pub fn new(shapes: ShapesGraph) -> Self {
        Self { shapes }
    }

    pub fn shapes(&self) -> &ShapesGraph {
        &self.shapes
    }

    /// Validates every target of every active shape.
    pub fn validate(&self, data: &Graph) -> Result<ValidationReport, ShaclValidationError> {
        let mut report = ValidationReport::default();
        for shape in self.shapes.iter() {
            if shape.deactivated || shape.targets.is_empty() {
                continue;
            }
            let mut focus_nodes = Vec::new();
            for target in &shape.targets {
                target.focus_nodes(data, &mut focus_nodes);
            }
            let mut seen = FxHashSet::default();
            focus_nodes.retain(|n| seen.insert(n.clone()));
            for focus in &focus_nodes {
                self.check(data, shape, focus, 0, &mut report)?;
            }
        }
        Ok(report)
    }

    fn check(
        &self,
        data: &Graph,
        shape: &Shape,
        focus: &Term,
        depth: usize,
        report: &mut ValidationReport,
    ) -> Result<(), ShaclValidationError> {
        if depth > MAX_RECURSION_DEPTH {
            return Err(ShaclValidationError::MaxRecursionDepth {
                depth: MAX_RECURSION_DEPTH,
            });
        }
        if shape.deactivated {
            return Ok(());
        }
        let values = match &shape.path {
            Some(path) => path.evaluate(data, focus),
            None => vec![focus.clone()],
        };

        for constraint in &shape.constraints {
            let failures = if constraint.is_aggregate() {
                check_focus(data, shape, focus, &values, constraint)
            } else {
                let mut failures = Vec::new();
                for value in &values {
                    if let Some(message) = self.check_value(data, value, constraint, depth)? {
                        failures.push(Failure::value(value, message));
                    }
                }
                failures
            };
            for failure in failures {
                let messages = if shape.messages.is_empty() {
                    vec![Literal::new_simple_literal(failure.message)]
                } else {
                    shape.messages.clone()
                };
                report.push(ValidationResult {
                    focus_node: focus.clone(),
                    path: failure.path.or_else(|| shape.path.clone()),
                    value: failure.value,
                    source_shape: shape.id.clone(),
                    component: constraint.component().into_owned(),
                    messages,
                    severity: shape.severity,
                });
            }
        }

        for property in &shape.properties {
            if let Some(property) = self.shapes.get(property) {
                for value in &values {
                    self.check(data, property, value, depth + 1, report)?;
                }
            }
        }
        Ok(())
    }

    fn conforms(
        &self,
        data: &Graph,
        node: &Term,
        shape: &ShapeId,
        depth: usize,
    ) -> Result<bool, ShaclValidationError> {
        let Some(shape) = self.shapes.get(shape) else {
            return Ok(true);
        };
        let mut nested = ValidationReport::default();
        self.check(data, shape, node, depth + 1, &mut nested)?;
        Ok(nested.conforms())
    }

    /// Checks a constraint that applies to one value node, returning the failure message.
    fn check_value(
        &self,
        data: &Graph,
        value: &Term,
        constraint: &Constraint,
        depth: usize,
    ) -> Result<Option<String>, ShaclValidationError> {
        let failed = |ok: bool, message: String| (!ok).then_some(message);
        Ok(match constraint {
            Constraint::Class(class) => failed(
                is_instance_of(data, value, class),
                format!("Value is not an instance of {class}"),
            ),
            Constraint::Datatype(datatype) => failed(
                matches!(value, Term::Literal(l) if l.datatype() == datatype.as_ref() && is_well_formed(l)),
                format!("Value is not a well-formed literal of datatype {datatype}"),
            ),
            Constraint::NodeKind(kind) => failed(
                has_node_kind(value, kind.as_ref()),
                format!("Value does not have node kind {kind}"),
            ),
            Constraint::MinExclusive(bound) => failed(
                compare(value, bound) == Some(Ordering::Greater),
                format!("Value is not greater than {bound}"),
            ),
            Constraint::MinInclusive(bound) => failed(
                matches!(compare(value, bound), Some(Ordering::Greater | Ordering::Equal)),
                format!("Value is less than {bound}"),
            ),
            Constraint::MaxExclusive(bound) => failed(
                compare(value, bound) == Some(Ordering::Less),
                format!("Value is not less than {bound}"),
            ),
            Constraint::MaxInclusive(bound) => failed(
                matches!(compare(value, bound), Some(Ordering::Less | Ordering::Equal)),
                format!("Value is greater than {bound}"),
            ),
            Constraint::MinLength(min) => failed(
                string_value(value).is_some_and(|s| s.chars().count() >= *min),
                format!("Value has less than {min} characters"),
            ),
            Constraint::MaxLength(max) => failed(
                string_value(value).is_some_and(|s| s.chars().count() <= *max),
                format!("Value has more than {max} characters"),
            ),
            Constraint::Pattern(regex) => failed(
                string_value(value).is_some_and(|s| regex.is_match(s)),
                format!("Value does not match pattern \"{}\"", regex.as_str()),
            ),
            Constraint::LanguageIn(tags) => failed(
                matches!(value, Term::Literal(l) if l.language().is_some_and(|lang| tags.iter().any(|t| lang_matches(lang, t)))),
                format!("Language tag is not one of {}", tags.join(", ")),
            ),
            Constraint::In(members) => failed(
                members.contains(value),
                "Value is not in the list of allowed values".to_owned(),
            ),
            Constraint::Node(shape) => failed(
                self.conforms(data, value, shape, depth)?,
                format!("Value does not conform to shape {shape}"),
            ),
            Constraint::Not(shape) => failed(
                !self.conforms(data, value, shape, depth)?,
                format!("Value conforms to shape {shape}"),
            ),
            Constraint::And(shapes) => {
                let mut all = true;
                for shape in shapes {
                    if !self.conforms(data, value, shape, depth)? {
                        all = false;
                        break;
                    }
                }
                failed(all, "Value does not conform to all shapes".to_owned())
            }
            Constraint::Or(shapes) => {
                let mut any = false;
                for shape in shapes {
                    if self.conforms(data, value, shape, depth)? {
                        any = true;
                        break;
                    }
                }
                failed(any, "Value does not conform to any shape".to_owned())
            }
            Constraint::Xone(shapes) => {
                let mut count = 0;
                for shape in shapes {
                    if self.conforms(data, value, shape, depth)? {
                        count += 1;
                    }
                }
                failed(
                    count == 1,
                    format!("Value conforms to {count} shapes instead of exactly one"),
                )
            }
            _ => None,
        })
    }
}

/// Checks a constraint that looks at all the value nodes of a focus node at once.
fn check_focus(
    data: &Graph,
    shape: &Shape,
    focus: &Term,
    values: &[Term],
    constraint: &Constraint,
) -> Vec<Failure> {
    match constraint {
        Constraint::MinCount(min) if values.len() < *min => {
            vec![Failure::focus(format!("Less than {min} values"))]
        }
        Constraint::MaxCount(max) if values.len() > *max => {
            vec![Failure::focus(format!("More than {max} values"))]
        }
        Constraint::HasValue(expected) if !values.contains(expected) => {
            vec![Failure::focus(format!("Missing expected value {expected}"))]
        }
        Constraint::UniqueLang => {
            let mut seen = FxHashSet::default();
            let mut reported = FxHashSet::default();
            let mut failures = Vec::new();
            for value in values {
                if let Term::Literal(l) = value {
                    if let Some(lang) = l.language() {
                        let lang = lang.to_ascii_lowercase();
                        if !seen.insert(lang.clone()) && reported.insert(lang.clone()) {
                            failures.push(Failure::focus(format!(
                                "Language \"{lang}\" is used more than once"
                            )));
                        }
                    }
                }
            }
            failures
        }
        Constraint::Equals(property) => {
            let others = graph::objects(data, focus, property.as_ref());
            let mut failures = Vec::new();
            for value in values.iter().filter(|v| !others.contains(v)) {
                failures.push(Failure::value(value, format!("Value is not a value of {property}")));
            }
            for other in others.iter().filter(|o| !values.contains(o)) {
                failures.push(Failure::value(other, format!("Missing value of {property}")));
            }
            failures
        }
        Constraint::Disjoint(property) => {
            let others = graph::objects(data, focus, property.as_ref());
            values
                .iter()
                .filter(|v| others.contains(v))
                .map(|v| Failure::value(v, format!("Value is also a value of {property}")))
                .collect()
        }
        Constraint::LessThan(property) | Constraint::LessThanOrEquals(property) => {
            let or_equal = matches!(constraint, Constraint::LessThanOrEquals(_));
            let others = graph::objects(data, focus, property.as_ref());
            let mut failures = Vec::new();
            for value in values {
                for other in &others {
                    let order = match other {
                        Term::Literal(other) => compare(value, other),
                        _ => None,
                    };
                    let ok = match order {
                        Some(Ordering::Less) => true,
                        Some(Ordering::Equal) => or_equal,
                        _ => false,
                    };
                    if !ok {
                        failures.push(Failure::value(
                            value,
                            format!("Value is not less than {other}"),
                        ));
                    }
                }
            }
            failures
        }
        Constraint::Closed { allowed } => {
            let mut failures = Vec::new();
            for value in values {
                for (predicate, object) in graph::outgoing(data, value) {
                    if !allowed.contains(&predicate) {
                        failures.push(Failure {
                            value: Some(object),
                            message: format!("Predicate {predicate} is not allowed (closed shape {})", shape.id),
                            path: Some(PropertyPath::Predicate(predicate)),
                        });
                    }
                }
            }
            failures
        }
        _ => Vec::new(),
    }
}

fn is_instance_of(data: &Graph, value: &Term, class: &NamedNode) -> bool {
    let types = graph::objects(data, value, rdf::TYPE);
    !types.is_empty()
        && subclass_closure(data, class)
            .iter()
            .any(|c| types.contains(c))
}

fn has_node_kind(value: &Term, kind: NamedNodeRef<'_>) -> bool {
    let iri = matches!(value, Term::NamedNode(_));
    let blank = matches!(value, Term::BlankNode(_));
    let literal = matches!(value, Term::Literal(_));
    if kind == shacl::IRI {
        iri
    } else if kind == shacl::BLANK_NODE {
        blank
    } else if kind == shacl::LITERAL {
        literal
    } else if kind == shacl::BLANK_NODE_OR_IRI {
        blank || iri
    } else if kind == shacl::BLANK_NODE_OR_LITERAL {
        blank || literal
    } else if kind == shacl::IRI_OR_LITERAL {
        iri || literal
    } else {
        false
    }
}

/// The string used by the length and pattern constraints, blank nodes having none.
fn string_value(value: &Term) -> Option<&str> {
    match value {
        Term::NamedNode(n) => Some(n.as_str()),
        Term::Literal(l) => Some(l.value()),
        _ => None,
    }
}

/// Basic language range matching, as in SPARQL `langMatches`.
fn lang_matches(tag: &str, range: &str) -> bool {
    if range == "*" {
        return !tag.is_empty();
    }
    tag.len() >= range.len()
        && tag[..range.len()].eq_ignore_ascii_case(range)
        && (tag.len() == range.len() || tag.as_bytes()[range.len()] == b'-')
}

const INTEGER_TYPES: &[&str] = &[
    "integer",
    "long",
    "int",
    "short",
    "byte",
    "nonNegativeInteger",
    "positiveInteger",
    "nonPositiveInteger",
    "negativeInteger",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
];

fn xsd_local_name(datatype: NamedNodeRef<'_>) -> Option<&str> {
    datatype.as_str().strip_prefix("http://www.w3.org/2001/XMLSchema#")
}

fn is_numeric(datatype: NamedNodeRef<'_>) -> bool {
    xsd_local_name(datatype)
        .is_some_and(|l| matches!(l, "decimal" | "float" | "double") || INTEGER_TYPES.contains(&l))
}

/// Lexical check for the datatypes whose value space is easy to test.
fn is_well_formed(literal: &Literal) -> bool {
    let value = literal.value();
    if literal.datatype() == xsd::BOOLEAN {
        return matches!(value, "true" | "false" | "1" | "0");
    }
    match xsd_local_name(literal.datatype()) {
        Some(l) if INTEGER_TYPES.contains(&l) => value.parse::<i128>().is_ok(),
        Some("decimal") => {
            !value.contains(['e', 'E']) && value.parse::<f64>().is_ok_and(f64::is_finite)
        }
        Some("float" | "double") => {
            matches!(value, "INF" | "-INF" | "NaN") || value.parse::<f64>().is_ok_and(f64::is_finite)
        }
        _ => true,
    }
}

/// Orders two literals when they are comparable.
fn compare(a: &Term, b: &Literal) -> Option<Ordering> {
    let Term::Literal(a) = a else {
        return None;
    };
    if is_numeric(a.datatype()) && is_numeric(b.datatype()) {
        let x = a.value().parse::<f64>().ok()?;
        let y = b.value().parse::<f64>().ok()?;
        return x.partial_cmp(&y);
    }
    (a.datatype() == b.datatype() && a.language() == b.language())
        .then(|| a.value().cmp(b.value()))
}
