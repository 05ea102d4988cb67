//! Writes result rows as text blocks or as SPARQL JSON results.

use crate::config::OutputMode;
use crate::error::Error;
use crate::report::ResultRows;
use oxigraph::model::vocab::xsd;
use oxigraph::model::{NamedNodeRef, TermRef};
use oxigraph::sparql::results::{QueryResultsFormat, QueryResultsSerializer};
use shapeval::vocab::shacl;
use std::io::Write;

/// Writes `rows` to `out` and returns how many rows were written.
///
/// Nothing is written in text mode when there is no row. `out` is flushed
/// before returning.
pub fn present(rows: ResultRows, mode: OutputMode, mut out: impl Write) -> Result<usize, Error> {
    let mut count = 0;
    match mode {
        OutputMode::Json => {
            let mut serializer = QueryResultsSerializer::from_format(QueryResultsFormat::Json)
                .serialize_solutions_to_writer(&mut out, rows.variables().to_vec())?;
            for row in rows {
                serializer.serialize(&row?)?;
                count += 1;
            }
            serializer.finish()?;
        }
        OutputMode::Text => {
            for row in rows {
                for (variable, value) in &row? {
                    writeln!(out, "{}: {}", variable.as_str(), format_term(value.as_ref()))?;
                }
                writeln!(out)?;
                count += 1;
            }
        }
    }
    out.flush()?;
    Ok(count)
}

/// Human readable form of a term, with the SHACL namespace compacted to `sh:`.
pub fn format_term(term: TermRef<'_>) -> String {
    match term {
        TermRef::NamedNode(node) => format_iri(node),
        TermRef::BlankNode(node) => node.to_string(),
        TermRef::Literal(literal) => {
            if let Some(language) = literal.language() {
                format!("{}@{language}", literal.value())
            } else if literal.datatype() == xsd::STRING {
                literal.value().to_owned()
            } else {
                format!("{}^^{}", literal.value(), format_iri(literal.datatype()))
            }
        }
    }
}

fn format_iri(iri: NamedNodeRef<'_>) -> String {
    match iri.as_str().strip_prefix(shacl::NAMESPACE) {
        Some(local) => format!("sh:{local}"),
        None => iri.as_str().to_owned(),
    }
}
