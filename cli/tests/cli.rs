#![allow(clippy::panic_in_result_fn)]

use anyhow::Result;
use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

const CAROL: &str = r#"{"@id": "http://example.com/carol", "@type": "http://example.com/Person"}"#;

const SHAPES: &str = r#"
@prefix sh: <http://www.w3.org/ns/shacl#> .
@prefix ex: <http://example.com/> .
ex:PersonShape a sh:NodeShape ;
    sh:targetClass ex:Person ;
    sh:property [ sh:path ex:name ; sh:minCount 1 ; sh:message "A person needs a name" ] .
"#;

/// Without blank nodes, so that two runs print the same text.
const NAMED_SHAPES: &str = r#"
@prefix sh: <http://www.w3.org/ns/shacl#> .
@prefix ex: <http://example.com/> .
ex:PersonShape a sh:NodeShape ;
    sh:targetClass ex:Person ;
    sh:property ex:NameShape .
ex:NameShape sh:path ex:name ; sh:minCount 1 ; sh:message "A person needs a name" .
"#;

fn cli_command() -> Result<Command> {
    Ok(Command::cargo_bin("shapecheck")?)
}

fn workspace() -> Result<TempDir> {
    let dir = TempDir::new()?;
    dir.child("shapes.ttl").write_str(SHAPES)?;
    dir.child("named.ttl").write_str(NAMED_SHAPES)?;
    dir.child("bob.ttl")
        .write_str("<http://example.com/bob> a <http://example.com/Person> .")?;
    dir.child("alice.ttl").write_str(
        r#"<http://example.com/alice> a <http://example.com/Person> ; <http://example.com/name> "Alice" ."#,
    )?;
    Ok(dir)
}

#[test]
fn cli_help() -> Result<()> {
    cli_command()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--shapes"))
        .stdout(predicate::str::contains("--remove"))
        .stdout(predicate::str::contains("--json"));
    Ok(())
}

#[test]
fn cli_version() -> Result<()> {
    cli_command()?
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_unknown_option() -> Result<()> {
    cli_command()?
        .arg("--frobnicate")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Usage"));
    Ok(())
}

#[test]
fn cli_conforming_data() -> Result<()> {
    let dir = workspace()?;
    cli_command()?
        .arg(dir.child("alice.ttl").path())
        .arg("--shapes")
        .arg(dir.child("shapes.ttl").path())
        .assert()
        .success()
        .stdout("");
    Ok(())
}

#[test]
fn cli_violation_text() -> Result<()> {
    let dir = workspace()?;
    cli_command()?
        .arg(dir.child("bob.ttl").path())
        .arg(dir.child("alice.ttl").path())
        .arg("--shapes")
        .arg(dir.child("shapes.ttl").path())
        .assert()
        .success()
        .stdout(predicate::str::contains("focusNode: http://example.com/bob\n"))
        .stdout(predicate::str::contains("resultMessage: A person needs a name\n"))
        .stdout(predicate::str::contains("http://example.com/alice").not());
    Ok(())
}

#[test]
fn cli_violation_json() -> Result<()> {
    let dir = workspace()?;
    cli_command()?
        .arg(dir.child("bob.ttl").path())
        .arg("--shapes")
        .arg(dir.child("shapes.ttl").path())
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(r#"{"head":{"vars":["#))
        .stdout(predicate::str::contains(
            r#""focusNode":{"type":"uri","value":"http://example.com/bob"}"#,
        ));
    Ok(())
}

#[test]
fn cli_stdin() -> Result<()> {
    let dir = workspace()?;
    cli_command()?
        .arg("-")
        .arg("--shapes")
        .arg(dir.child("shapes.ttl").path())
        .write_stdin(CAROL)
        .assert()
        .success()
        .stdout(predicate::str::contains("focusNode: http://example.com/carol\n"));
    Ok(())
}

#[test]
fn cli_stdin_matches_the_same_file() -> Result<()> {
    let dir = workspace()?;
    dir.child("carol.json").write_str(CAROL)?;
    let from_file = cli_command()?
        .arg(dir.child("carol.json").path())
        .arg("--shapes")
        .arg(dir.child("named.ttl").path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert!(!from_file.is_empty());
    cli_command()?
        .arg("-")
        .arg("--shapes")
        .arg(dir.child("named.ttl").path())
        .write_stdin(CAROL)
        .assert()
        .success()
        .stdout(from_file);
    Ok(())
}

#[test]
fn cli_stdin_is_read_once() -> Result<()> {
    let dir = workspace()?;
    let once = cli_command()?
        .arg("-")
        .arg("--shapes")
        .arg(dir.child("named.ttl").path())
        .write_stdin(CAROL)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    cli_command()?
        .arg("-")
        .arg("-")
        .arg("--shapes")
        .arg(dir.child("named.ttl").path())
        .write_stdin(CAROL)
        .env("RUST_LOG", "warn")
        .assert()
        .success()
        .stdout(once)
        .stderr(predicate::str::contains("standard input was already read"));
    Ok(())
}

#[test]
fn cli_remove() -> Result<()> {
    let dir = workspace()?;
    let strict = dir.child("strict");
    strict.create_dir_all()?;
    strict.child("extra.ttl").write_str(
        r#"@prefix sh: <http://www.w3.org/ns/shacl#> .
        <http://example.com/Typed> sh:targetClass <http://example.com/Person> ;
            sh:property [ sh:path <http://example.com/email> ; sh:minCount 1 ] ."#,
    )?;
    dir.child("relax.ttl").write_str(
        r#"@prefix sh: <http://www.w3.org/ns/shacl#> .
        <http://example.com/Typed> sh:targetClass <http://example.com/Person> ."#,
    )?;
    cli_command()?
        .arg(dir.child("alice.ttl").path())
        .arg("--shapes")
        .arg(dir.child("shapes.ttl").path())
        .arg("--shapes")
        .arg(strict.path())
        .arg("--remove")
        .arg(dir.child("relax.ttl").path())
        .assert()
        .success()
        .stdout("");
    Ok(())
}

#[test]
fn cli_logs_on_stderr() -> Result<()> {
    let dir = workspace()?;
    cli_command()?
        .arg(dir.child("alice.ttl").path())
        .arg(dir.child("missing.ttl").path())
        .arg("--shapes")
        .arg(dir.child("shapes.ttl").path())
        .env("RUST_LOG", "warn")
        .env("SHAPECHECK_LOG_FORMAT", "json")
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("skipping source"))
        .stderr(predicate::str::contains("missing.ttl"));
    Ok(())
}
