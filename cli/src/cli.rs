use clap::{Parser, ValueHint};

#[derive(Parser)]
#[command(about, version, name = "shapecheck")]
/// Validates RDF data against SHACL shapes and prints the violations
pub struct Args {
    /// Data files, directories or URLs, `-` for standard input
    ///
    /// If none is given, the canonical data set is fetched.
    #[arg(value_hint = ValueHint::AnyPath)]
    pub files: Vec<String>,
    /// File or directory of shapes, can be repeated
    ///
    /// Only the `.ttl` files of a directory are read.
    /// If none is given, the canonical shape vocabulary is fetched.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::AnyPath)]
    pub shapes: Vec<String>,
    /// File or directory of statements to remove from the shapes, can be repeated
    #[arg(long, value_name = "PATH", value_hint = ValueHint::AnyPath)]
    pub remove: Vec<String>,
    /// Prints the results as SPARQL 1.1 query results JSON
    #[arg(long)]
    pub json: bool,
}
