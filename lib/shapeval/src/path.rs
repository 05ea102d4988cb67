//! SHACL property paths.

use crate::error::ShaclParseError;
use crate::graph;
use crate::vocab::shacl;
use oxrdf::vocab::rdf;
use oxrdf::{BlankNode, Graph, NamedNode, NamedNodeRef, Term, Triple};
use rustc_hash::FxHashSet;
use std::fmt;

/// A SHACL property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyPath {
    /// An IRI used directly as a path.
    Predicate(NamedNode),
    /// An RDF list of at least two paths, followed one after the other.
    Sequence(Vec<PropertyPath>),
    /// `sh:alternativePath`
    Alternative(Vec<PropertyPath>),
    /// `sh:inversePath`
    Inverse(Box<PropertyPath>),
    /// `sh:zeroOrMorePath`
    ZeroOrMore(Box<PropertyPath>),
    /// `sh:oneOrMorePath`
    OneOrMore(Box<PropertyPath>),
    /// `sh:zeroOrOnePath`
    ZeroOrOne(Box<PropertyPath>),
}

impl PropertyPath {
    /// Reads the path whose root is `node` in the shapes graph.
    pub fn parse(shapes: &Graph, node: &Term) -> Result<Self, ShaclParseError> {
        match node {
            Term::NamedNode(n) => Ok(Self::Predicate(n.clone())),
            Term::BlankNode(_) => {
                if let Some(head) = graph::object(shapes, node, shacl::ALTERNATIVE_PATH) {
                    return Ok(Self::Alternative(Self::parse_list(shapes, head, node)?));
                }
                let unary: [(NamedNodeRef<'static>, fn(Box<Self>) -> Self); 4] = [
                    (shacl::INVERSE_PATH, Self::Inverse),
                    (shacl::ZERO_OR_MORE_PATH, Self::ZeroOrMore),
                    (shacl::ONE_OR_MORE_PATH, Self::OneOrMore),
                    (shacl::ZERO_OR_ONE_PATH, Self::ZeroOrOne),
                ];
                for (predicate, build) in unary {
                    if let Some(inner) = graph::object(shapes, node, predicate) {
                        return Ok(build(Box::new(Self::parse(shapes, &inner)?)));
                    }
                }
                if graph::object(shapes, node, rdf::FIRST).is_some() {
                    let steps = Self::parse_list(shapes, node.clone(), node)?;
                    if steps.len() >= 2 {
                        return Ok(Self::Sequence(steps));
                    }
                    return Err(ShaclParseError::invalid_property_path(
                        node.clone(),
                        "a sequence path needs at least two members",
                    ));
                }
                Err(ShaclParseError::invalid_property_path(
                    node.clone(),
                    "unknown property path structure",
                ))
            }
            _ => Err(ShaclParseError::invalid_property_path(
                node.clone(),
                "a property path must be an IRI or a blank node",
            )),
        }
    }

    fn parse_list(shapes: &Graph, head: Term, owner: &Term) -> Result<Vec<Self>, ShaclParseError> {
        graph::list(shapes, head, owner)?
            .iter()
            .map(|member| Self::parse(shapes, member))
            .collect()
    }

    /// Returns the distinct value nodes reachable from `focus`, in discovery order.
    pub fn evaluate(&self, data: &Graph, focus: &Term) -> Vec<Term> {
        let mut reached = Vec::new();
        self.walk(data, focus, false, &mut reached);
        let mut seen = FxHashSet::default();
        reached.retain(|t| seen.insert(t.clone()));
        reached
    }

    fn walk(&self, data: &Graph, node: &Term, inverse: bool, out: &mut Vec<Term>) {
        match self {
            Self::Predicate(p) => {
                if inverse {
                    out.extend(graph::subjects(data, p.as_ref(), node));
                } else {
                    out.extend(graph::objects(data, node, p.as_ref()));
                }
            }
            Self::Inverse(inner) => inner.walk(data, node, !inverse, out),
            Self::Sequence(steps) => {
                let mut frontier = vec![node.clone()];
                let mut advance = |step: &Self| {
                    let mut next = Vec::new();
                    for n in &frontier {
                        step.walk(data, n, inverse, &mut next);
                    }
                    let mut seen = FxHashSet::default();
                    next.retain(|t| seen.insert(t.clone()));
                    frontier = next;
                };
                if inverse {
                    steps.iter().rev().for_each(&mut advance);
                } else {
                    steps.iter().for_each(&mut advance);
                }
                out.extend(frontier);
            }
            Self::Alternative(options) => {
                for option in options {
                    option.walk(data, node, inverse, out);
                }
            }
            Self::ZeroOrMore(inner) => inner.closure(data, node, inverse, true, out),
            Self::OneOrMore(inner) => inner.closure(data, node, inverse, false, out),
            Self::ZeroOrOne(inner) => {
                out.push(node.clone());
                inner.walk(data, node, inverse, out);
            }
        }
    }

    /// Transitive closure of `self` from `start`, including `start` itself when `reflexive`.
    fn closure(&self, data: &Graph, start: &Term, inverse: bool, reflexive: bool, out: &mut Vec<Term>) {
        let mut visited = FxHashSet::default();
        if reflexive {
            visited.insert(start.clone());
            out.push(start.clone());
        }
        let mut queue = vec![start.clone()];
        while let Some(current) = queue.pop() {
            let mut next = Vec::new();
            self.walk(data, &current, inverse, &mut next);
            for n in next {
                if visited.insert(n.clone()) {
                    out.push(n.clone());
                    queue.push(n);
                }
            }
        }
    }

    /// The predicate, if this is a plain predicate path.
    pub fn as_predicate(&self) -> Option<&NamedNode> {
        match self {
            Self::Predicate(p) => Some(p),
            _ => None,
        }
    }

    /// Writes the RDF encoding of the path into `graph` and returns its root node.
    pub fn write_to(&self, graph: &mut Graph) -> Term {
        let unary = |graph: &mut Graph, predicate: NamedNodeRef<'static>, inner: &Self| {
            let root = BlankNode::default();
            let inner = inner.write_to(graph);
            graph.insert(&Triple::new(root.clone(), predicate, inner));
            Term::from(root)
        };
        match self {
            Self::Predicate(p) => p.clone().into(),
            Self::Sequence(steps) => write_list(graph, steps),
            Self::Alternative(options) => {
                let root = BlankNode::default();
                let list = write_list(graph, options);
                graph.insert(&Triple::new(root.clone(), shacl::ALTERNATIVE_PATH, list));
                root.into()
            }
            Self::Inverse(inner) => unary(graph, shacl::INVERSE_PATH, inner),
            Self::ZeroOrMore(inner) => unary(graph, shacl::ZERO_OR_MORE_PATH, inner),
            Self::OneOrMore(inner) => unary(graph, shacl::ONE_OR_MORE_PATH, inner),
            Self::ZeroOrOne(inner) => unary(graph, shacl::ZERO_OR_ONE_PATH, inner),
        }
    }
}

fn write_list(graph: &mut Graph, members: &[PropertyPath]) -> Term {
    let mut tail = Term::from(rdf::NIL.into_owned());
    for member in members.iter().rev() {
        let cell = BlankNode::default();
        let value = member.write_to(graph);
        graph.insert(&Triple::new(cell.clone(), rdf::FIRST, value));
        graph.insert(&Triple::new(cell.clone(), rdf::REST, tail));
        tail = cell.into();
    }
    tail
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = |f: &mut fmt::Formatter<'_>, parts: &[Self], sep: &str| {
            f.write_str("(")?;
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                write!(f, "{part}")?;
            }
            f.write_str(")")
        };
        match self {
            Self::Predicate(p) => write!(f, "{p}"),
            Self::Sequence(steps) => joined(f, steps, " / "),
            Self::Alternative(options) => joined(f, options, " | "),
            Self::Inverse(p) => write!(f, "^{p}"),
            Self::ZeroOrMore(p) => write!(f, "{p}*"),
            Self::OneOrMore(p) => write!(f, "{p}+"),
            Self::ZeroOrOne(p) => write!(f, "{p}?"),
        }
    }
}
