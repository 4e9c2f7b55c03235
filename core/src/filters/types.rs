//! Filter type definitions
//!
//! Defines the request, value and predicate types shared by the operator
//! registry, the compiler and the store adapters.

use std::fmt;

use chrono::NaiveDateTime;

/// One filter parameter as handed over by the request layer
///
/// Fields are private so a request cannot change once it has been built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    field: String,
    operator: String,
    value: String,
    negate: bool,
}

impl FilterRequest {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
            negate: false,
        }
    }

    /// Same request with negation requested
    pub fn negated(self) -> Self {
        Self {
            negate: true,
            ..self
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn negate(&self) -> bool {
        self.negate
    }
}

/// Store-native 12-byte document identifier (24 hex characters)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Parse a 24 character hex string, `None` for anything else
    pub fn parse_str(s: &str) -> Option<Self> {
        if s.len() != 24 {
            return None;
        }
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).ok()?;
        Some(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Comparison kind carried by a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Nin,
    Exists,
    IExact,
    Contains,
    IContains,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::In => "in",
            Self::Nin => "nin",
            Self::Exists => "exists",
            Self::IExact => "iexact",
            Self::Contains => "contains",
            Self::IContains => "icontains",
            Self::StartsWith => "startswith",
            Self::IStartsWith => "istartswith",
            Self::EndsWith => "endswith",
            Self::IEndsWith => "iendswith",
        }
    }

    /// Pattern relations match against string values only
    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            Self::IExact
                | Self::Contains
                | Self::IContains
                | Self::StartsWith
                | Self::IStartsWith
                | Self::EndsWith
                | Self::IEndsWith
        )
    }

    pub fn is_case_insensitive(&self) -> bool {
        matches!(
            self,
            Self::IExact | Self::IContains | Self::IStartsWith | Self::IEndsWith
        )
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of coercing a raw string
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Int(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    ObjectId(ObjectId),
    Bool(bool),
    String(String),
    List(Vec<TypedValue>),
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::ObjectId(id) => write!(f, "ObjectId({})", id),
            Self::Bool(b) => write!(f, "{}", b),
            Self::String(s) => write!(f, "{:?}", s),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Single `(path, relation, value)` comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub path: String,
    pub relation: Relation,
    pub value: TypedValue,
}

/// Store-native clause that bypasses the relation vocabulary
///
/// Matches when any value reachable at `path` equals one of `any_of`. Used
/// for lists of sub-documents, where `path` walks into every element.
#[derive(Debug, Clone, PartialEq)]
pub struct RawClause {
    pub path: String,
    pub any_of: Vec<TypedValue>,
}

/// Predicate tree handed to a store adapter
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every document (empty conjunction)
    All,
    Condition(Condition),
    Raw(RawClause),
    Not(Box<Predicate>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn condition(path: impl Into<String>, relation: Relation, value: TypedValue) -> Self {
        Self::Condition(Condition {
            path: path.into(),
            relation,
            value,
        })
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Predicate) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Conjunction that collapses the trivial cases
    pub fn all_of(mut predicates: Vec<Predicate>) -> Self {
        predicates.retain(|p| !matches!(p, Self::All));
        match predicates.len() {
            0 => Self::All,
            1 => predicates.remove(0),
            _ => Self::And(predicates),
        }
    }

    /// Disjunction; a single branch is returned as is
    pub fn any_of(mut predicates: Vec<Predicate>) -> Self {
        if predicates.len() == 1 {
            predicates.remove(0)
        } else {
            Self::Or(predicates)
        }
    }

    /// Every field path referenced by this tree, in tree order
    pub fn paths(&self) -> Vec<&str> {
        let mut paths = Vec::new();
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::All => {}
            Self::Condition(c) => out.push(&c.path),
            Self::Raw(r) => out.push(&r.path),
            Self::Not(inner) => inner.collect_paths(out),
            Self::And(items) | Self::Or(items) => {
                for item in items {
                    item.collect_paths(out);
                }
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "ALL"),
            Self::Condition(c) => write!(f, "{} {} {}", c.path, c.relation, c.value),
            Self::Raw(r) => {
                let parts: Vec<String> = r.any_of.iter().map(|v| v.to_string()).collect();
                write!(f, "{} any-of [{}]", r.path, parts.join(", "))
            }
            Self::Not(inner) => write!(f, "NOT ({})", inner),
            Self::And(items) => write_joined(f, items, " AND "),
            Self::Or(items) => write_joined(f, items, " OR "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Predicate], sep: &str) -> fmt::Result {
    let parts: Vec<String> = items.iter().map(|p| p.to_string()).collect();
    write!(f, "({})", parts.join(sep))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_parses_24_hex() {
        let id = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        assert_eq!(id.to_hex(), "507f1f77bcf86cd799439011");
        assert_eq!(id.to_string(), "507f1f77bcf86cd799439011");
    }

    #[test]
    fn object_id_rejects_bad_input() {
        assert!(ObjectId::parse_str("").is_none());
        assert!(ObjectId::parse_str("507f1f77bcf86cd79943901").is_none());
        assert!(ObjectId::parse_str("507f1f77bcf86cd79943901z").is_none());
        assert!(ObjectId::parse_str("not-an-id").is_none());
    }

    #[test]
    fn filter_request_negated_keeps_fields() {
        let request = FilterRequest::new("age", "gte", "18").negated();
        assert_eq!(request.field(), "age");
        assert_eq!(request.operator(), "gte");
        assert_eq!(request.value(), "18");
        assert!(request.negate());
    }

    #[test]
    fn all_of_collapses() {
        assert_eq!(Predicate::all_of(vec![]), Predicate::All);

        let single = Predicate::condition("a", Relation::Eq, TypedValue::Int(1));
        assert_eq!(Predicate::all_of(vec![single.clone()]), single);
        assert_eq!(
            Predicate::all_of(vec![Predicate::All, single.clone()]),
            single
        );

        let pair = Predicate::all_of(vec![single.clone(), single.clone()]);
        assert!(matches!(pair, Predicate::And(ref items) if items.len() == 2));
    }

    #[test]
    fn paths_in_tree_order() {
        let predicate = Predicate::all_of(vec![
            Predicate::condition("a", Relation::Eq, TypedValue::Int(1)),
            Predicate::any_of(vec![
                Predicate::condition("b", Relation::Exists, TypedValue::Bool(true)),
                Predicate::not(Predicate::condition(
                    "c",
                    Relation::Gt,
                    TypedValue::Float(1.5),
                )),
            ]),
        ]);
        assert_eq!(predicate.paths(), vec!["a", "b", "c"]);
    }

    #[test]
    fn display_predicate() {
        let predicate = Predicate::any_of(vec![
            Predicate::condition("age", Relation::Exists, TypedValue::Bool(true)),
            Predicate::condition("age", Relation::Gte, TypedValue::Int(18)),
        ]);
        assert_eq!(predicate.to_string(), "(age exists true OR age gte 18)");

        let negated = Predicate::not(Predicate::condition(
            "name",
            Relation::IContains,
            TypedValue::String("bob".to_string()),
        ));
        assert_eq!(negated.to_string(), r#"NOT (name icontains "bob")"#);
    }

    #[test]
    fn relation_flags() {
        assert!(Relation::IStartsWith.is_pattern());
        assert!(Relation::IStartsWith.is_case_insensitive());
        assert!(Relation::Contains.is_pattern());
        assert!(!Relation::Contains.is_case_insensitive());
        assert!(!Relation::Gte.is_pattern());
    }
}
