//! SHACL Core constraint components.

use crate::error::ShaclParseError;
use crate::model::ShapeId;
use crate::vocab::shacl;
use oxrdf::{Literal, NamedNode, NamedNodeRef, Term};
use regex::{Regex, RegexBuilder};

/// A single constraint attached to a shape.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// `sh:class`: every value is an instance of the class (or of one of its subclasses).
    Class(NamedNode),
    /// `sh:datatype`
    Datatype(NamedNode),
    /// `sh:nodeKind`, holding one of the `sh:IRI`... node kind terms.
    NodeKind(NamedNode),
    /// `sh:minCount`
    MinCount(usize),
    /// `sh:maxCount`
    MaxCount(usize),
    /// `sh:minExclusive`
    MinExclusive(Literal),
    /// `sh:minInclusive`
    MinInclusive(Literal),
    /// `sh:maxExclusive`
    MaxExclusive(Literal),
    /// `sh:maxInclusive`
    MaxInclusive(Literal),
    /// `sh:minLength`
    MinLength(usize),
    /// `sh:maxLength`
    MaxLength(usize),
    /// `sh:pattern` with its optional `sh:flags`, compiled once.
    Pattern(Regex),
    /// `sh:languageIn`
    LanguageIn(Vec<String>),
    /// `sh:uniqueLang true`
    UniqueLang,
    /// `sh:equals`
    Equals(NamedNode),
    /// `sh:disjoint`
    Disjoint(NamedNode),
    /// `sh:lessThan`
    LessThan(NamedNode),
    /// `sh:lessThanOrEquals`
    LessThanOrEquals(NamedNode),
    /// `sh:not`
    Not(ShapeId),
    /// `sh:and`
    And(Vec<ShapeId>),
    /// `sh:or`
    Or(Vec<ShapeId>),
    /// `sh:xone`
    Xone(Vec<ShapeId>),
    /// `sh:node`
    Node(ShapeId),
    /// `sh:hasValue`
    HasValue(Term),
    /// `sh:in`
    In(Vec<Term>),
    /// `sh:closed true`, with the properties allowed besides the shape's own property paths.
    Closed { allowed: Vec<NamedNode> },
}

impl Constraint {
    /// The `sh:*ConstraintComponent` IRI reported for violations of this constraint.
    pub fn component(&self) -> NamedNodeRef<'static> {
        match self {
            Self::Class(_) => shacl::CLASS_CONSTRAINT_COMPONENT,
            Self::Datatype(_) => shacl::DATATYPE_CONSTRAINT_COMPONENT,
            Self::NodeKind(_) => shacl::NODE_KIND_CONSTRAINT_COMPONENT,
            Self::MinCount(_) => shacl::MIN_COUNT_CONSTRAINT_COMPONENT,
            Self::MaxCount(_) => shacl::MAX_COUNT_CONSTRAINT_COMPONENT,
            Self::MinExclusive(_) => shacl::MIN_EXCLUSIVE_CONSTRAINT_COMPONENT,
            Self::MinInclusive(_) => shacl::MIN_INCLUSIVE_CONSTRAINT_COMPONENT,
            Self::MaxExclusive(_) => shacl::MAX_EXCLUSIVE_CONSTRAINT_COMPONENT,
            Self::MaxInclusive(_) => shacl::MAX_INCLUSIVE_CONSTRAINT_COMPONENT,
            Self::MinLength(_) => shacl::MIN_LENGTH_CONSTRAINT_COMPONENT,
            Self::MaxLength(_) => shacl::MAX_LENGTH_CONSTRAINT_COMPONENT,
            Self::Pattern(_) => shacl::PATTERN_CONSTRAINT_COMPONENT,
            Self::LanguageIn(_) => shacl::LANGUAGE_IN_CONSTRAINT_COMPONENT,
            Self::UniqueLang => shacl::UNIQUE_LANG_CONSTRAINT_COMPONENT,
            Self::Equals(_) => shacl::EQUALS_CONSTRAINT_COMPONENT,
            Self::Disjoint(_) => shacl::DISJOINT_CONSTRAINT_COMPONENT,
            Self::LessThan(_) => shacl::LESS_THAN_CONSTRAINT_COMPONENT,
            Self::LessThanOrEquals(_) => shacl::LESS_THAN_OR_EQUALS_CONSTRAINT_COMPONENT,
            Self::Not(_) => shacl::NOT_CONSTRAINT_COMPONENT,
            Self::And(_) => shacl::AND_CONSTRAINT_COMPONENT,
            Self::Or(_) => shacl::OR_CONSTRAINT_COMPONENT,
            Self::Xone(_) => shacl::XONE_CONSTRAINT_COMPONENT,
            Self::Node(_) => shacl::NODE_CONSTRAINT_COMPONENT,
            Self::HasValue(_) => shacl::HAS_VALUE_CONSTRAINT_COMPONENT,
            Self::In(_) => shacl::IN_CONSTRAINT_COMPONENT,
            Self::Closed { .. } => shacl::CLOSED_CONSTRAINT_COMPONENT,
        }
    }

    /// Whether the constraint is checked once per focus node rather than once per value node.
    pub(crate) fn is_aggregate(&self) -> bool {
        matches!(
            self,
            Self::MinCount(_)
                | Self::MaxCount(_)
                | Self::UniqueLang
                | Self::Equals(_)
                | Self::Disjoint(_)
                | Self::LessThan(_)
                | Self::LessThanOrEquals(_)
                | Self::HasValue(_)
                | Self::Closed { .. }
        )
    }
}

/// Compiles a `sh:pattern` using the XPath flag letters accepted by `sh:flags`.
pub(crate) fn compile_pattern(pattern: &str, flags: Option<&str>) -> Result<Regex, ShaclParseError> {
    let flags = flags.unwrap_or_default();
    let mut builder = if flags.contains('q') {
        RegexBuilder::new(&regex::escape(pattern))
    } else {
        RegexBuilder::new(pattern)
    };
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            'q' => &mut builder,
            other => {
                return Err(ShaclParseError::InvalidRegex {
                    pattern: pattern.to_owned(),
                    message: format!("unsupported flag '{other}'"),
                });
            }
        };
    }
    builder.build().map_err(|e| ShaclParseError::InvalidRegex {
        pattern: pattern.to_owned(),
        message: e.to_string(),
    })
}
