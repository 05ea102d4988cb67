//! Small lookup helpers over [`Graph`] keyed by owned [`Term`]s.

use crate::error::ShaclParseError;
use oxrdf::vocab::rdf;
use oxrdf::{Graph, Literal, NamedNode, NamedNodeRef, Term, TermRef};
use rustc_hash::FxHashSet;

pub(crate) fn objects(graph: &Graph, subject: &Term, predicate: NamedNodeRef<'_>) -> Vec<Term> {
    match subject {
        Term::NamedNode(n) => graph
            .objects_for_subject_predicate(n, predicate)
            .map(TermRef::into_owned)
            .collect(),
        Term::BlankNode(b) => graph
            .objects_for_subject_predicate(b, predicate)
            .map(TermRef::into_owned)
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn object(graph: &Graph, subject: &Term, predicate: NamedNodeRef<'_>) -> Option<Term> {
    match subject {
        Term::NamedNode(n) => graph
            .object_for_subject_predicate(n, predicate)
            .map(TermRef::into_owned),
        Term::BlankNode(b) => graph
            .object_for_subject_predicate(b, predicate)
            .map(TermRef::into_owned),
        _ => None,
    }
}

pub(crate) fn subjects(graph: &Graph, predicate: NamedNodeRef<'_>, object: &Term) -> Vec<Term> {
    graph
        .subjects_for_predicate_object(predicate, object)
        .map(|s| Term::from(s.into_owned()))
        .collect()
}

/// Every `(predicate, object)` pair having `subject` as subject.
pub(crate) fn outgoing(graph: &Graph, subject: &Term) -> Vec<(NamedNode, Term)> {
    match subject {
        Term::NamedNode(n) => graph
            .triples_for_subject(n)
            .map(|t| (t.predicate.into_owned(), t.object.into_owned()))
            .collect(),
        Term::BlankNode(b) => graph
            .triples_for_subject(b)
            .map(|t| (t.predicate.into_owned(), t.object.into_owned()))
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn literal(graph: &Graph, subject: &Term, predicate: NamedNodeRef<'_>) -> Option<Literal> {
    match object(graph, subject, predicate)? {
        Term::Literal(l) => Some(l),
        _ => None,
    }
}

pub(crate) fn string(graph: &Graph, subject: &Term, predicate: NamedNodeRef<'_>) -> Option<String> {
    literal(graph, subject, predicate).map(|l| l.value().to_owned())
}

pub(crate) fn integer(graph: &Graph, subject: &Term, predicate: NamedNodeRef<'_>) -> Option<usize> {
    literal(graph, subject, predicate).and_then(|l| l.value().trim().parse().ok())
}

pub(crate) fn boolean(graph: &Graph, subject: &Term, predicate: NamedNodeRef<'_>) -> Option<bool> {
    match literal(graph, subject, predicate)?.value() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Reads the members of the RDF list starting at `head`.
///
/// `owner` is only used to describe the failure.
pub(crate) fn list(graph: &Graph, head: Term, owner: &Term) -> Result<Vec<Term>, ShaclParseError> {
    let mut members = Vec::new();
    let mut seen = FxHashSet::default();
    let mut current = head;
    loop {
        if let Term::NamedNode(n) = &current {
            if n.as_ref() == rdf::NIL {
                return Ok(members);
            }
        }
        if !seen.insert(current.clone()) {
            return Err(ShaclParseError::invalid_rdf_list(
                owner.clone(),
                "the list is cyclic",
            ));
        }
        let first = object(graph, &current, rdf::FIRST).ok_or_else(|| {
            ShaclParseError::invalid_rdf_list(owner.clone(), format!("{current} has no rdf:first"))
        })?;
        members.push(first);
        current = object(graph, &current, rdf::REST).ok_or_else(|| {
            ShaclParseError::invalid_rdf_list(owner.clone(), format!("{current} has no rdf:rest"))
        })?;
    }
}
