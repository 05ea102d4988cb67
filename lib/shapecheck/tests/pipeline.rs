#![allow(clippy::panic_in_result_fn)]

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::Graph;
use oxigraph::sparql::QuerySolution;
use oxigraph::sparql::results::{
    QueryResultsFormat, QueryResultsParser, SliceQueryResultsParserOutput,
};
use shapecheck::{
    Error, Fetch, FetchResponse, GraphLoader, Invocation, LoadError, OutputMode, ShaclEngine,
    ShapeValidator, SourceOptions, ValidateError, extract_rows, resolve_sources, run_with,
};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::{self, Cursor};
use std::path::Path;
use tempfile::TempDir;

const SHAPES: &str = r#"
@prefix sh: <http://www.w3.org/ns/shacl#> .
@prefix ex: <http://example.com/> .
ex:PersonShape a sh:NodeShape ;
    sh:targetClass ex:Person ;
    sh:property ex:NameShape .
ex:NameShape sh:path ex:name ;
    sh:minCount 1 ;
    sh:message "A person needs a name" .
"#;

/// Serves fixed bodies and fails on anything else.
#[derive(Default)]
struct StaticFetch {
    bodies: HashMap<String, (&'static str, &'static str)>,
}

impl StaticFetch {
    fn with(mut self, url: &str, content_type: &'static str, body: &'static str) -> Self {
        self.bodies.insert(url.to_owned(), (content_type, body));
        self
    }
}

impl Fetch for StaticFetch {
    fn get(&self, url: &str, _: &str) -> io::Result<FetchResponse> {
        let (content_type, body) = self
            .bodies
            .get(url)
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, url.to_owned()))?;
        Ok(FetchResponse {
            url: url.to_owned(),
            status: 200,
            location: None,
            content_type: Some(content_type.to_owned()),
            body: Box::new(Cursor::new(body)),
        })
    }
}

struct FailingEngine;

impl ShapeValidator for FailingEngine {
    fn validate(&self, _: &Graph, _: &Graph) -> Result<Graph, ValidateError> {
        let shapes = parse("@prefix sh: <http://www.w3.org/ns/shacl#> . <http://e/s> sh:targetNode <http://e/n> ; sh:pattern \"(\" .");
        shapeval::validate_graphs(&shapes, &Graph::new())?;
        Ok(Graph::new())
    }
}

fn parse(turtle: &str) -> Graph {
    let mut graph = Graph::new();
    for quad in RdfParser::from_format(RdfFormat::Turtle).for_reader(turtle.as_bytes()) {
        graph.insert(quad.unwrap().as_ref());
    }
    graph
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

fn invocation(data: Vec<String>, shapes: Vec<String>, output: OutputMode) -> Invocation {
    Invocation {
        data,
        shapes,
        remove: Vec::new(),
        output,
    }
}

/// The bound variables of each row, comparable as a set.
fn row_set(rows: impl IntoIterator<Item = QuerySolution>) -> BTreeSet<Vec<(String, String)>> {
    rows.into_iter()
        .map(|row| {
            let mut bindings = row
                .iter()
                .map(|(variable, term)| (variable.as_str().to_owned(), term.to_string()))
                .collect::<Vec<_>>();
            bindings.sort();
            bindings
        })
        .collect()
}

fn run_to_string(invocation: &Invocation, fetch: &dyn Fetch) -> Result<(usize, String), Error> {
    let mut output = Vec::new();
    let count = run_with(
        invocation,
        &SourceOptions::default(),
        fetch,
        &ShaclEngine,
        &mut output,
    )?;
    Ok((count, String::from_utf8(output).unwrap()))
}

#[test]
fn conforming_data_prints_nothing() -> Result<(), Error> {
    let dir = TempDir::new().unwrap();
    let data = write(
        dir.path(),
        "data.ttl",
        r#"<http://example.com/alice> a <http://example.com/Person> ; <http://example.com/name> "Alice" ."#,
    );
    let shapes = write(dir.path(), "shapes.ttl", SHAPES);
    let (count, output) = run_to_string(
        &invocation(vec![data], vec![shapes], OutputMode::Text),
        &StaticFetch::default(),
    )?;
    assert_eq!(count, 0);
    assert_eq!(output, "");
    Ok(())
}

#[test]
fn missing_property_is_reported() -> Result<(), Error> {
    let dir = TempDir::new().unwrap();
    let data = write(
        dir.path(),
        "data.ttl",
        "<http://example.com/bob> a <http://example.com/Person> .",
    );
    let shapes = write(dir.path(), "shapes.ttl", SHAPES);
    let (count, output) = run_to_string(
        &invocation(vec![data], vec![shapes], OutputMode::Text),
        &StaticFetch::default(),
    )?;
    assert_eq!(count, 1);
    assert!(output.contains("focusNode: http://example.com/bob\n"), "{output}");
    assert!(output.contains("resultPath: http://example.com/name\n"), "{output}");
    assert!(output.contains("resultMessage: A person needs a name\n"), "{output}");
    assert!(output.contains("resultSeverity: sh:Violation\n"), "{output}");
    assert!(
        output.contains("sourceConstraintComponent: sh:MinCountConstraintComponent\n"),
        "{output}"
    );
    assert!(!output.contains("value:"), "{output}");
    assert!(output.ends_with("\n\n"), "{output}");
    Ok(())
}

#[test]
fn removed_statements_disable_constraints() -> Result<(), Error> {
    let dir = TempDir::new().unwrap();
    let data = write(
        dir.path(),
        "data.ttl",
        "<http://example.com/bob> a <http://example.com/Person> .",
    );
    let shapes = write(dir.path(), "shapes.ttl", SHAPES);
    let remove = write(
        dir.path(),
        "remove.nt",
        "<http://example.com/NameShape> <http://www.w3.org/ns/shacl#minCount> \"1\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n",
    );
    let mut invocation = invocation(vec![data], vec![shapes], OutputMode::Text);
    invocation.remove = vec![remove];
    let (count, output) = run_to_string(&invocation, &StaticFetch::default())?;
    assert_eq!(count, 0, "{output}");
    Ok(())
}

#[test]
fn effective_shapes_are_the_set_difference() {
    let dir = TempDir::new().unwrap();
    let primary = write(
        dir.path(),
        "primary.nt",
        "<http://e/a> <http://e/p> <http://e/b> .\n<http://e/c> <http://e/p> <http://e/d> .\n",
    );
    let remove = write(
        dir.path(),
        "remove.nt",
        "<http://e/c> <http://e/p> <http://e/d> .\n<http://e/x> <http://e/p> <http://e/y> .\n",
    );
    let options = SourceOptions::default();
    let fetch = StaticFetch::default();
    let mut loader = GraphLoader::new(&options, &fetch);
    let primary = loader
        .load(&resolve_sources(&[primary], None, &options))
        .unwrap();
    let remove = loader
        .load(&resolve_sources(&[remove], None, &options))
        .unwrap();
    let effective = shapecheck::assemble_shapes(primary, &remove);
    assert_eq!(
        effective,
        parse("<http://e/a> <http://e/p> <http://e/b> .")
    );
}

#[test]
fn shape_directories_only_read_turtle_files() -> Result<(), Error> {
    let dir = TempDir::new().unwrap();
    let shapes_dir = dir.path().join("shapes");
    fs::create_dir(&shapes_dir).unwrap();
    write(&shapes_dir, "person.ttl", SHAPES);
    // Would report every node that is not a literal if it was read
    write(
        &shapes_dir,
        "strict.json",
        r#"{"@id": "http://example.com/Strict", "http://www.w3.org/ns/shacl#targetSubjectsOf": {"@id": "http://www.w3.org/1999/02/22-rdf-syntax-ns#type"}, "http://www.w3.org/ns/shacl#nodeKind": {"@id": "http://www.w3.org/ns/shacl#Literal"}}"#,
    );
    let data = write(
        dir.path(),
        "data.ttl",
        "<http://example.com/bob> a <http://example.com/Person> .",
    );
    let (count, output) = run_to_string(
        &invocation(
            vec![data],
            vec![shapes_dir.display().to_string()],
            OutputMode::Text,
        ),
        &StaticFetch::default(),
    )?;
    assert_eq!(count, 1, "{output}");
    assert!(output.contains("sh:MinCountConstraintComponent"), "{output}");
    Ok(())
}

#[test]
fn unreadable_sources_are_skipped() -> Result<(), Error> {
    let dir = TempDir::new().unwrap();
    let broken = write(dir.path(), "broken.ttl", "<http://example.com/bob> a ");
    let data = write(
        dir.path(),
        "data.ttl",
        "<http://example.com/bob> a <http://example.com/Person> .",
    );
    let shapes = write(dir.path(), "shapes.ttl", SHAPES);
    let (count, _) = run_to_string(
        &invocation(
            vec![
                dir.path().join("missing.ttl").display().to_string(),
                broken,
                "http://example.com/unreachable.ttl".to_owned(),
                data,
            ],
            vec![shapes],
            OutputMode::Text,
        ),
        &StaticFetch::default(),
    )?;
    assert_eq!(count, 1);
    Ok(())
}

#[test]
fn defaults_are_fetched_when_nothing_is_given() -> Result<(), Error> {
    let options = SourceOptions::default();
    let fetch = StaticFetch::default()
        .with(
            &options.data_uri,
            "application/ld+json",
            r#"{"@id": "http://example.com/bob", "@type": "http://example.com/Person"}"#,
        )
        .with(&options.shapes_uri, "text/turtle", SHAPES);
    let (count, output) = run_to_string(&Invocation::default(), &fetch)?;
    assert_eq!(count, 1);
    assert!(output.contains("focusNode: http://example.com/bob\n"), "{output}");
    Ok(())
}

#[test]
fn failing_default_source_is_fatal() {
    let dir = TempDir::new().unwrap();
    let data = write(
        dir.path(),
        "data.ttl",
        "<http://example.com/bob> a <http://example.com/Person> .",
    );
    let result = run_to_string(
        &invocation(vec![data], Vec::new(), OutputMode::Text),
        &StaticFetch::default(),
    );
    assert!(matches!(
        result,
        Err(Error::Load(LoadError::RequiredSource { .. }))
    ));
}

#[test]
fn engine_failures_are_fatal() {
    let dir = TempDir::new().unwrap();
    let data = write(dir.path(), "data.ttl", "");
    let shapes = write(dir.path(), "shapes.ttl", SHAPES);
    let result = run_with(
        &invocation(vec![data], vec![shapes], OutputMode::Text),
        &SourceOptions::default(),
        &StaticFetch::default(),
        &FailingEngine,
        Vec::new(),
    );
    assert!(matches!(result, Err(Error::Validate(_))));
}

#[test]
fn empty_graphs_give_an_empty_report() -> Result<(), Error> {
    let dir = TempDir::new().unwrap();
    let data = write(dir.path(), "data.ttl", "");
    let shapes = write(dir.path(), "shapes.ttl", "");
    let (count, output) = run_to_string(
        &invocation(vec![data.clone()], vec![shapes.clone()], OutputMode::Text),
        &StaticFetch::default(),
    )?;
    assert_eq!((count, output.as_str()), (0, ""));
    let (count, output) = run_to_string(
        &invocation(vec![data], vec![shapes], OutputMode::Json),
        &StaticFetch::default(),
    )?;
    assert_eq!(count, 0);
    assert!(output.contains(r#""bindings":[]"#), "{output}");
    Ok(())
}

#[test]
fn json_output_is_sparql_results() -> Result<(), Error> {
    let dir = TempDir::new().unwrap();
    let data = write(
        dir.path(),
        "data.ttl",
        "<http://example.com/bob> a <http://example.com/Person> .",
    );
    let shapes = write(dir.path(), "shapes.ttl", SHAPES);
    let (count, output) = run_to_string(
        &invocation(vec![data], vec![shapes], OutputMode::Json),
        &StaticFetch::default(),
    )?;
    assert_eq!(count, 1);
    assert!(output.starts_with(r#"{"head":{"vars":["focusNode","resultPath","value","resultMessage","resultSeverity","sourceShape","sourceConstraintComponent"]}"#), "{output}");
    assert!(
        output.contains(r#""focusNode":{"type":"uri","value":"http://example.com/bob"}"#),
        "{output}"
    );
    assert!(
        output.contains(r#""resultMessage":{"type":"literal","value":"A person needs a name"}"#),
        "{output}"
    );
    Ok(())
}

#[test]
fn json_output_parses_back_to_the_extracted_rows() -> Result<(), Error> {
    let dir = TempDir::new().unwrap();
    let data_turtle = r#"
        <http://example.com/bob> a <http://example.com/Person> .
        <http://example.com/carol> a <http://example.com/Person> .
        <http://example.com/alice> a <http://example.com/Person> ; <http://example.com/name> "Alice" .
    "#;
    let data = write(dir.path(), "data.ttl", data_turtle);
    let shapes = write(dir.path(), "shapes.ttl", SHAPES);
    let (count, output) = run_to_string(
        &invocation(vec![data], vec![shapes], OutputMode::Json),
        &StaticFetch::default(),
    )?;
    assert_eq!(count, 2);

    let SliceQueryResultsParserOutput::Solutions(parsed) =
        QueryResultsParser::from_format(QueryResultsFormat::Json)
            .for_slice(&output)
            .unwrap()
    else {
        panic!("not solutions: {output}");
    };
    assert_eq!(
        parsed
            .variables()
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>(),
        [
            "focusNode",
            "resultPath",
            "value",
            "resultMessage",
            "resultSeverity",
            "sourceShape",
            "sourceConstraintComponent"
        ]
    );
    let parsed = parsed.collect::<Result<Vec<_>, _>>().unwrap();

    let report = ShaclEngine.validate(&parse(SHAPES), &parse(data_turtle))?;
    let extracted = extract_rows(&report)?.collect::<Result<Vec<_>, _>>()?;
    assert_eq!(extracted.len(), 2);
    assert_eq!(row_set(parsed), row_set(extracted));
    Ok(())
}
