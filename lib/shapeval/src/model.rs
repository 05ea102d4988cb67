//! Shapes read out of a shapes graph.

use crate::constraint::{Constraint, compile_pattern};
use crate::error::ShaclParseError;
use crate::graph;
use crate::path::PropertyPath;
use crate::report::Severity;
use crate::vocab::shacl;
use oxrdf::vocab::{rdf, rdfs};
use oxrdf::{BlankNode, Graph, Literal, NamedNode, NamedNodeRef, Term};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// Identifies a shape node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShapeId {
    Named(NamedNode),
    Blank(BlankNode),
}

impl ShapeId {
    pub fn to_term(&self) -> Term {
        match self {
            Self::Named(n) => n.clone().into(),
            Self::Blank(b) => b.clone().into(),
        }
    }
}

impl TryFrom<Term> for ShapeId {
    type Error = ShaclParseError;

    fn try_from(term: Term) -> Result<Self, Self::Error> {
        match term {
            Term::NamedNode(n) => Ok(Self::Named(n)),
            Term::BlankNode(b) => Ok(Self::Blank(b)),
            _ => Err(ShaclParseError::invalid_shape(
                term,
                "a shape must be an IRI or a blank node",
            )),
        }
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => write!(f, "{n}"),
            Self::Blank(b) => write!(f, "{b}"),
        }
    }
}

/// Selects focus nodes from a data graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `sh:targetClass`, or the shape itself when it is also an `rdfs:Class`.
    Class(NamedNode),
    /// `sh:targetNode`
    Node(Term),
    /// `sh:targetSubjectsOf`
    SubjectsOf(NamedNode),
    /// `sh:targetObjectsOf`
    ObjectsOf(NamedNode),
}

impl Target {
    /// Appends the focus nodes selected in `data` to `out`.
    pub fn focus_nodes(&self, data: &Graph, out: &mut Vec<Term>) {
        match self {
            Self::Class(class) => {
                for class in subclass_closure(data, class) {
                    out.extend(graph::subjects(data, rdf::TYPE, &class));
                }
            }
            Self::Node(node) => out.push(node.clone()),
            Self::SubjectsOf(p) => out.extend(
                data.triples_for_predicate(p)
                    .map(|t| Term::from(t.subject.into_owned())),
            ),
            Self::ObjectsOf(p) => {
                out.extend(data.triples_for_predicate(p).map(|t| t.object.into_owned()));
            }
        }
    }
}

/// `class` and everything reachable from it through inverse `rdfs:subClassOf` links.
pub(crate) fn subclass_closure(data: &Graph, class: &NamedNode) -> Vec<Term> {
    let mut classes = vec![Term::from(class.clone())];
    let mut seen: FxHashSet<Term> = classes.iter().cloned().collect();
    let mut pending = classes.clone();
    while let Some(current) = pending.pop() {
        for sub in graph::subjects(data, rdfs::SUB_CLASS_OF, &current) {
            if seen.insert(sub.clone()) {
                classes.push(sub.clone());
                pending.push(sub);
            }
        }
    }
    classes
}

/// A node shape, or a property shape when `path` is set.
#[derive(Debug, Clone)]
pub struct Shape {
    pub id: ShapeId,
    pub path: Option<PropertyPath>,
    pub targets: Vec<Target>,
    pub constraints: Vec<Constraint>,
    /// Shapes linked with `sh:property`.
    pub properties: Vec<ShapeId>,
    pub severity: Severity,
    pub messages: Vec<Literal>,
    pub deactivated: bool,
}

/// Every shape reachable from the shapes graph, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct ShapesGraph {
    shapes: Vec<Shape>,
    index: FxHashMap<ShapeId, usize>,
}

impl ShapesGraph {
    /// Reads all shapes out of `graph`.
    ///
    /// A node is a shape if it is typed `sh:NodeShape` or `sh:PropertyShape`,
    /// declares a target, or is referenced from another shape.
    pub fn from_graph(graph: &Graph) -> Result<Self, ShaclParseError> {
        let mut pending = Vec::new();
        for class in [shacl::NODE_SHAPE, shacl::PROPERTY_SHAPE] {
            pending.extend(graph::subjects(graph, rdf::TYPE, &class.into_owned().into()));
        }
        for predicate in [
            shacl::TARGET_CLASS,
            shacl::TARGET_NODE,
            shacl::TARGET_SUBJECTS_OF,
            shacl::TARGET_OBJECTS_OF,
        ] {
            pending.extend(
                graph
                    .triples_for_predicate(predicate)
                    .map(|t| Term::from(t.subject.into_owned())),
            );
        }

        let mut shapes = Self::default();
        let mut pending = pending.into_iter().rev().collect::<Vec<_>>();
        while let Some(term) = pending.pop() {
            let id = ShapeId::try_from(term)?;
            if shapes.index.contains_key(&id) {
                continue;
            }
            let shape = parse_shape(graph, id.clone())?;
            for referenced in shape.references() {
                if !shapes.index.contains_key(referenced) {
                    pending.push(referenced.to_term());
                }
            }
            shapes.index.insert(id, shapes.shapes.len());
            shapes.shapes.push(shape);
        }
        Ok(shapes)
    }

    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.index.get(id).map(|i| &self.shapes[*i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl Shape {
    fn references(&self) -> impl Iterator<Item = &ShapeId> {
        self.properties.iter().chain(self.constraints.iter().flat_map(|c| match c {
            Constraint::Not(id) | Constraint::Node(id) => std::slice::from_ref(id),
            Constraint::And(ids) | Constraint::Or(ids) | Constraint::Xone(ids) => ids.as_slice(),
            _ => &[],
        }))
    }
}

fn parse_shape(graph: &Graph, id: ShapeId) -> Result<Shape, ShaclParseError> {
    let node = id.to_term();
    let path = graph::object(graph, &node, shacl::PATH)
        .map(|p| PropertyPath::parse(graph, &p))
        .transpose()?;

    let mut targets = Vec::new();
    for class in graph::objects(graph, &node, shacl::TARGET_CLASS) {
        if let Term::NamedNode(class) = class {
            targets.push(Target::Class(class));
        }
    }
    if let ShapeId::Named(iri) = &id {
        let is_class = graph::objects(graph, &node, rdf::TYPE)
            .iter()
            .any(|t| matches!(t, Term::NamedNode(c) if c.as_ref() == rdfs::CLASS));
        if is_class {
            targets.push(Target::Class(iri.clone()));
        }
    }
    for target in graph::objects(graph, &node, shacl::TARGET_NODE) {
        targets.push(Target::Node(target));
    }
    for p in graph::objects(graph, &node, shacl::TARGET_SUBJECTS_OF) {
        if let Term::NamedNode(p) = p {
            targets.push(Target::SubjectsOf(p));
        }
    }
    for p in graph::objects(graph, &node, shacl::TARGET_OBJECTS_OF) {
        if let Term::NamedNode(p) = p {
            targets.push(Target::ObjectsOf(p));
        }
    }

    let properties = graph::objects(graph, &node, shacl::PROPERTY)
        .into_iter()
        .map(ShapeId::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let severity = match graph::object(graph, &node, shacl::SEVERITY) {
        Some(Term::NamedNode(s)) => Severity::from_iri(s.as_ref()).unwrap_or_default(),
        _ => Severity::default(),
    };
    let messages = graph::objects(graph, &node, shacl::MESSAGE)
        .into_iter()
        .filter_map(|m| match m {
            Term::Literal(l) => Some(l),
            _ => None,
        })
        .collect();

    Ok(Shape {
        constraints: parse_constraints(graph, &node, &properties)?,
        deactivated: graph::boolean(graph, &node, shacl::DEACTIVATED).unwrap_or(false),
        id,
        path,
        targets,
        properties,
        severity,
        messages,
    })
}

fn named_objects(graph: &Graph, node: &Term, predicate: NamedNodeRef<'_>) -> Vec<NamedNode> {
    graph::objects(graph, node, predicate)
        .into_iter()
        .filter_map(|t| match t {
            Term::NamedNode(n) => Some(n),
            _ => None,
        })
        .collect()
}

fn shape_list(graph: &Graph, node: &Term, head: Term) -> Result<Vec<ShapeId>, ShaclParseError> {
    graph::list(graph, head, node)?
        .into_iter()
        .map(ShapeId::try_from)
        .collect()
}

fn parse_constraints(
    graph: &Graph,
    node: &Term,
    properties: &[ShapeId],
) -> Result<Vec<Constraint>, ShaclParseError> {
    let mut constraints = Vec::new();

    constraints.extend(named_objects(graph, node, shacl::CLASS).into_iter().map(Constraint::Class));
    if let Some(Term::NamedNode(dt)) = graph::object(graph, node, shacl::DATATYPE) {
        constraints.push(Constraint::Datatype(dt));
    }
    if let Some(Term::NamedNode(kind)) = graph::object(graph, node, shacl::NODE_KIND) {
        constraints.push(Constraint::NodeKind(kind));
    }

    let counts: [(_, fn(usize) -> Constraint); 4] = [
        (shacl::MIN_COUNT, Constraint::MinCount),
        (shacl::MAX_COUNT, Constraint::MaxCount),
        (shacl::MIN_LENGTH, Constraint::MinLength),
        (shacl::MAX_LENGTH, Constraint::MaxLength),
    ];
    for (predicate, build) in counts {
        if let Some(n) = graph::integer(graph, node, predicate) {
            constraints.push(build(n));
        }
    }

    let bounds: [(_, fn(Literal) -> Constraint); 4] = [
        (shacl::MIN_EXCLUSIVE, Constraint::MinExclusive),
        (shacl::MIN_INCLUSIVE, Constraint::MinInclusive),
        (shacl::MAX_EXCLUSIVE, Constraint::MaxExclusive),
        (shacl::MAX_INCLUSIVE, Constraint::MaxInclusive),
    ];
    for (predicate, build) in bounds {
        if let Some(bound) = graph::literal(graph, node, predicate) {
            constraints.push(build(bound));
        }
    }

    if let Some(pattern) = graph::string(graph, node, shacl::PATTERN) {
        let flags = graph::string(graph, node, shacl::FLAGS);
        constraints.push(Constraint::Pattern(compile_pattern(&pattern, flags.as_deref())?));
    }
    if let Some(head) = graph::object(graph, node, shacl::LANGUAGE_IN) {
        let tags = graph::list(graph, head, node)?
            .into_iter()
            .filter_map(|t| match t {
                Term::Literal(l) => Some(l.value().to_owned()),
                _ => None,
            })
            .collect();
        constraints.push(Constraint::LanguageIn(tags));
    }
    if graph::boolean(graph, node, shacl::UNIQUE_LANG) == Some(true) {
        constraints.push(Constraint::UniqueLang);
    }

    let pairs: [(_, fn(NamedNode) -> Constraint); 4] = [
        (shacl::EQUALS, Constraint::Equals),
        (shacl::DISJOINT, Constraint::Disjoint),
        (shacl::LESS_THAN, Constraint::LessThan),
        (shacl::LESS_THAN_OR_EQUALS, Constraint::LessThanOrEquals),
    ];
    for (predicate, build) in pairs {
        constraints.extend(named_objects(graph, node, predicate).into_iter().map(build));
    }

    for shape in graph::objects(graph, node, shacl::NOT) {
        constraints.push(Constraint::Not(ShapeId::try_from(shape)?));
    }
    let lists: [(_, fn(Vec<ShapeId>) -> Constraint); 3] = [
        (shacl::AND, Constraint::And),
        (shacl::OR, Constraint::Or),
        (shacl::XONE, Constraint::Xone),
    ];
    for (predicate, build) in lists {
        for head in graph::objects(graph, node, predicate) {
            constraints.push(build(shape_list(graph, node, head)?));
        }
    }
    for shape in graph::objects(graph, node, shacl::NODE) {
        constraints.push(Constraint::Node(ShapeId::try_from(shape)?));
    }

    constraints.extend(
        graph::objects(graph, node, shacl::HAS_VALUE)
            .into_iter()
            .map(Constraint::HasValue),
    );
    if let Some(head) = graph::object(graph, node, shacl::IN) {
        constraints.push(Constraint::In(graph::list(graph, head, node)?));
    }

    if graph::boolean(graph, node, shacl::CLOSED) == Some(true) {
        let mut allowed = Vec::new();
        for property in properties {
            if let Some(Term::NamedNode(p)) = graph::object(graph, &property.to_term(), shacl::PATH) {
                allowed.push(p);
            }
        }
        if let Some(head) = graph::object(graph, node, shacl::IGNORED_PROPERTIES) {
            allowed.extend(graph::list(graph, head, node)?.into_iter().filter_map(|t| match t {
                Term::NamedNode(n) => Some(n),
                _ => None,
            }));
        }
        constraints.push(Constraint::Closed { allowed });
    }

    Ok(constraints)
}
