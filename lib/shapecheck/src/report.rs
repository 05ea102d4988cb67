//! Projects a validation report graph into flat result rows.

use crate::error::ReportError;
use oxigraph::model::{Graph, GraphNameRef};
use oxigraph::sparql::{QueryResults, QuerySolution, QuerySolutionIter, SparqlEvaluator, Variable};
use oxigraph::store::Store;

/// The query selecting one row per result of a `sh:ValidationReport`.
pub const DEFAULT_QUERY: &str = include_str!("default-query.rq");

/// Runs [`DEFAULT_QUERY`] against `report`.
///
/// The report is copied into a fresh in-memory store owned by the returned rows.
pub fn extract_rows(report: &Graph) -> Result<ResultRows, ReportError> {
    let store = Store::new()?;
    store.extend(report.iter().map(|t| t.in_graph(GraphNameRef::DefaultGraph)))?;
    let results = SparqlEvaluator::new()
        .parse_query(DEFAULT_QUERY)?
        .on_store(&store)
        .execute()?;
    let QueryResults::Solutions(solutions) = results else {
        return Err(ReportError::NotSolutions);
    };
    Ok(ResultRows { solutions })
}

/// Forward-only sequence of result rows.
///
/// Rows come in the order the store yields them, which callers must not rely on.
pub struct ResultRows {
    solutions: QuerySolutionIter<'static>,
}

impl ResultRows {
    /// The projected variables, in query order.
    pub fn variables(&self) -> &[Variable] {
        self.solutions.variables()
    }
}

impl Iterator for ResultRows {
    type Item = Result<QuerySolution, ReportError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.solutions.next()?.map_err(Into::into))
    }
}
