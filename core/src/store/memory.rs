//! In-memory JSON document store

use std::cmp::Ordering;

use serde_json::Value;

use crate::filters::{Condition, ObjectId, Predicate, RawClause, Relation, TypedValue};
use crate::utils::json::{comparison_candidates, resolve_path, tagged_str};
use crate::utils::time::parse_document_timestamp;

use super::DocumentStore;
use super::error::StoreError;

/// Document store holding JSON objects in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Vec<Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents(documents: Vec<Value>) -> Self {
        Self { documents }
    }

    /// Load a JSON array of objects, or one object per line
    pub fn from_json_str(input: &str) -> Result<Self, StoreError> {
        let trimmed = input.trim_start();
        let documents: Vec<Value> = if trimmed.starts_with('[') {
            serde_json::from_str(trimmed).map_err(|source| StoreError::Parse {
                line: source.line(),
                source,
            })?
        } else {
            input
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(i, line)| {
                    serde_json::from_str(line)
                        .map_err(|source| StoreError::Parse { line: i + 1, source })
                })
                .collect::<Result<_, _>>()?
        };

        if let Some(index) = documents.iter().position(|d| !d.is_object()) {
            return Err(StoreError::NotAnObject { index });
        }
        tracing::debug!(count = documents.len(), "Loaded documents");
        Ok(Self::from_documents(documents))
    }

    pub fn insert(&mut self, document: Value) {
        self.documents.push(document);
    }

    pub fn documents(&self) -> &[Value] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn find(&self, predicate: &Predicate) -> Vec<Value> {
        let found: Vec<Value> = self
            .documents
            .iter()
            .filter(|doc| matches(predicate, doc))
            .cloned()
            .collect();
        tracing::debug!(
            matched = found.len(),
            total = self.documents.len(),
            "Evaluated predicate"
        );
        found
    }
}

/// Evaluate a predicate against one document
///
/// Follows document store conventions: arrays fan out so a condition holds
/// when any element satisfies it, `ne`/`nin` hold when no reachable value is
/// equal, and values of a different type never compare.
pub fn matches(predicate: &Predicate, doc: &Value) -> bool {
    match predicate {
        Predicate::All => true,
        Predicate::Condition(condition) => condition_matches(condition, doc),
        Predicate::Raw(clause) => raw_matches(clause, doc),
        Predicate::Not(inner) => !matches(inner, doc),
        Predicate::And(items) => items.iter().all(|p| matches(p, doc)),
        Predicate::Or(items) => items.iter().any(|p| matches(p, doc)),
    }
}

fn condition_matches(condition: &Condition, doc: &Value) -> bool {
    let values = resolve_path(doc, &condition.path);

    if condition.relation == Relation::Exists {
        let expected = !matches!(condition.value, TypedValue::Bool(false));
        return values.is_empty() != expected;
    }

    let candidates = comparison_candidates(&values);
    let target = &condition.value;

    match condition.relation {
        Relation::Eq => candidates.iter().any(|c| json_equals(c, target)),
        Relation::Ne => !candidates.iter().any(|c| json_equals(c, target)),
        Relation::In => candidates.iter().any(|c| member_of(c, target)),
        Relation::Nin => !candidates.iter().any(|c| member_of(c, target)),
        Relation::Lt => any_ordering(&candidates, target, |o| o == Ordering::Less),
        Relation::Lte => any_ordering(&candidates, target, |o| o != Ordering::Greater),
        Relation::Gt => any_ordering(&candidates, target, |o| o == Ordering::Greater),
        Relation::Gte => any_ordering(&candidates, target, |o| o != Ordering::Less),
        relation => {
            let TypedValue::String(pattern) = target else {
                return false;
            };
            candidates
                .iter()
                .filter_map(|c| c.as_str())
                .any(|s| pattern_matches(relation, s, pattern))
        }
    }
}

fn raw_matches(clause: &RawClause, doc: &Value) -> bool {
    let values = resolve_path(doc, &clause.path);
    comparison_candidates(&values)
        .iter()
        .any(|c| clause.any_of.iter().any(|v| json_equals(c, v)))
}

fn member_of(candidate: &Value, target: &TypedValue) -> bool {
    match target {
        TypedValue::List(items) => items.iter().any(|v| json_equals(candidate, v)),
        other => json_equals(candidate, other),
    }
}

fn any_ordering(candidates: &[&Value], target: &TypedValue, accept: impl Fn(Ordering) -> bool) -> bool {
    candidates
        .iter()
        .filter_map(|c| compare(c, target))
        .any(accept)
}

fn json_equals(candidate: &Value, target: &TypedValue) -> bool {
    compare(candidate, target) == Some(Ordering::Equal)
}

/// Order a stored value against a typed query value, `None` across types
fn compare(candidate: &Value, target: &TypedValue) -> Option<Ordering> {
    match target {
        TypedValue::Int(i) => match candidate.as_i64() {
            Some(n) => Some(n.cmp(i)),
            None => candidate.as_f64()?.partial_cmp(&(*i as f64)),
        },
        TypedValue::Float(x) => candidate.as_f64()?.partial_cmp(x),
        TypedValue::DateTime(dt) => {
            let stored = parse_document_timestamp(tagged_str(candidate, "$date")?)?;
            Some(stored.cmp(dt))
        }
        TypedValue::ObjectId(id) => {
            let stored = ObjectId::parse_str(tagged_str(candidate, "$oid")?)?;
            Some(stored.cmp(id))
        }
        TypedValue::Bool(b) => Some(candidate.as_bool()?.cmp(b)),
        TypedValue::String(s) => Some(candidate.as_str()?.cmp(s.as_str())),
        TypedValue::List(_) => None,
    }
}

fn pattern_matches(relation: Relation, value: &str, pattern: &str) -> bool {
    let (value, pattern) = if relation.is_case_insensitive() {
        (value.to_lowercase(), pattern.to_lowercase())
    } else {
        (value.to_string(), pattern.to_string())
    };
    match relation {
        Relation::IExact => value == pattern,
        Relation::Contains | Relation::IContains => value.contains(&pattern),
        Relation::StartsWith | Relation::IStartsWith => value.starts_with(&pattern),
        Relation::EndsWith | Relation::IEndsWith => value.ends_with(&pattern),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    const OID: &str = "507f1f77bcf86cd799439011";

    fn cond(path: &str, relation: Relation, value: TypedValue) -> Predicate {
        Predicate::condition(path, relation, value)
    }

    #[test]
    fn numeric_comparison_across_int_and_float() {
        let doc = json!({"price": 9.5, "qty": 3});
        assert!(matches(&cond("price", Relation::Lt, TypedValue::Int(10)), &doc));
        assert!(matches(&cond("qty", Relation::Gte, TypedValue::Float(2.5)), &doc));
        assert!(!matches(&cond("qty", Relation::Gt, TypedValue::Int(3)), &doc));
    }

    #[test]
    fn mismatched_types_never_compare() {
        let doc = json!({"f": "5"});
        assert!(!matches(&cond("f", Relation::Eq, TypedValue::Int(5)), &doc));
        assert!(!matches(&cond("f", Relation::Gte, TypedValue::Int(0)), &doc));
        assert!(matches(&cond("f", Relation::Ne, TypedValue::Int(5)), &doc));
    }

    #[test]
    fn exists_checks_presence() {
        let doc = json!({"a": null});
        assert!(matches(&cond("a", Relation::Exists, TypedValue::Bool(true)), &doc));
        assert!(matches(&cond("b", Relation::Exists, TypedValue::Bool(false)), &doc));
        assert!(!matches(&cond("b", Relation::Exists, TypedValue::Bool(true)), &doc));
    }

    #[test]
    fn arrays_fan_out() {
        let doc = json!({"tags": ["red", "blue"], "items": [{"sku": 1}, {"sku": 2}]});
        assert!(matches(
            &cond("tags", Relation::Eq, TypedValue::String("blue".to_string())),
            &doc
        ));
        assert!(!matches(
            &cond("tags", Relation::Ne, TypedValue::String("blue".to_string())),
            &doc
        ));
        let raw = Predicate::Raw(RawClause {
            path: "items.sku".to_string(),
            any_of: vec![TypedValue::Int(2), TypedValue::Int(9)],
        });
        assert!(matches(&raw, &doc));
        assert!(!matches(&Predicate::not(raw), &doc));
    }

    #[test]
    fn membership() {
        let doc = json!({"f": 5});
        let list = TypedValue::List(vec![TypedValue::Int(4), TypedValue::Int(5)]);
        assert!(matches(&cond("f", Relation::In, list.clone()), &doc));
        assert!(!matches(&cond("f", Relation::Nin, list.clone()), &doc));
        assert!(matches(&cond("missing", Relation::Nin, list), &doc));
    }

    #[test]
    fn datetimes_compare_against_tagged_and_plain_strings() {
        let cutoff = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let tagged = json!({"at": {"$date": "2024-03-01T00:00:00Z"}});
        let plain = json!({"at": "2023-12-31 23:59:59"});
        let pred = cond("at", Relation::Gte, TypedValue::DateTime(cutoff));
        assert!(matches(&pred, &tagged));
        assert!(!matches(&pred, &plain));
    }

    #[test]
    fn object_ids_compare_against_tagged_and_plain_strings() {
        let id = ObjectId::parse_str(OID).unwrap();
        let pred = cond("owner", Relation::Eq, TypedValue::ObjectId(id));
        assert!(matches(&pred, &json!({"owner": {"$oid": OID}})));
        assert!(matches(&pred, &json!({"owner": OID})));
        assert!(!matches(&pred, &json!({"owner": "507f191e810c19729de860ea"})));
    }

    #[test]
    fn patterns() {
        let doc = json!({"name": "Alice Smith"});
        let s = |v: &str| TypedValue::String(v.to_string());
        assert!(matches(&cond("name", Relation::IExact, s("alice smith")), &doc));
        assert!(matches(&cond("name", Relation::Contains, s("ce S")), &doc));
        assert!(!matches(&cond("name", Relation::Contains, s("ce s")), &doc));
        assert!(matches(&cond("name", Relation::IContains, s("CE S")), &doc));
        assert!(matches(&cond("name", Relation::StartsWith, s("Ali")), &doc));
        assert!(matches(&cond("name", Relation::IStartsWith, s("ali")), &doc));
        assert!(matches(&cond("name", Relation::EndsWith, s("ith")), &doc));
        assert!(matches(&cond("name", Relation::IEndsWith, s("SMITH")), &doc));
    }

    #[test]
    fn logical_combinators() {
        let doc = json!({"a": 1, "b": 2});
        let a = cond("a", Relation::Eq, TypedValue::Int(1));
        let b = cond("b", Relation::Eq, TypedValue::Int(3));
        assert!(matches(&Predicate::All, &doc));
        assert!(!matches(&Predicate::And(vec![a.clone(), b.clone()]), &doc));
        assert!(matches(&Predicate::Or(vec![a, b.clone()]), &doc));
        assert!(matches(&Predicate::not(b), &doc));
    }

    #[test]
    fn load_json_array_and_lines() {
        let store = MemoryStore::from_json_str(r#"[{"a": 1}, {"a": 2}]"#).unwrap();
        assert_eq!(store.len(), 2);

        let store = MemoryStore::from_json_str("{\"a\": 1}\n\n{\"a\": 2}\n").unwrap();
        assert_eq!(store.documents()[1], json!({"a": 2}));
    }

    #[test]
    fn load_reports_bad_input() {
        let err = MemoryStore::from_json_str("{\"a\": 1}\n{oops").unwrap_err();
        assert!(matches!(err, StoreError::Parse { line: 2, .. }));

        let err = MemoryStore::from_json_str("[{\"a\": 1}, 3]").unwrap_err();
        assert!(matches!(err, StoreError::NotAnObject { index: 1 }));
    }

    #[test]
    fn find_keeps_store_order() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        store.insert(json!({"n": 2}));
        store.insert(json!({"n": 1}));
        store.insert(json!({"n": 3}));
        let found = store.find(&cond("n", Relation::Gte, TypedValue::Int(2)));
        assert_eq!(found, vec![json!({"n": 2}), json!({"n": 3})]);
    }
}
