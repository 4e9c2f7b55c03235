//! Mongo query document translator
//!
//! Renders a [`Predicate`] as a Mongo filter document (extended JSON for
//! datetimes and object identifiers). Pattern relations become anchored,
//! escaped regular expressions.

use serde_json::{Map, Value, json};

use crate::filters::{Condition, Predicate, RawClause, Relation, TypedValue};
use crate::utils::time::{ceil_to_millis, datetime_to_iso};

/// Translate a predicate into a Mongo filter document
pub fn to_mongo(predicate: &Predicate) -> Value {
    match predicate {
        Predicate::All => json!({}),
        Predicate::Condition(condition) => {
            field_doc(&condition.path, condition_expr(condition, false))
        }
        Predicate::Raw(clause) => field_doc(&clause.path, raw_expr(clause)),
        Predicate::Not(inner) => match inner.as_ref() {
            Predicate::Condition(condition) => field_doc(
                &condition.path,
                json!({ "$not": condition_expr(condition, true) }),
            ),
            Predicate::Raw(clause) => {
                field_doc(&clause.path, json!({ "$not": raw_expr(clause) }))
            }
            other => json!({ "$nor": [to_mongo(other)] }),
        },
        Predicate::And(items) => json!({ "$and": items.iter().map(to_mongo).collect::<Vec<_>>() }),
        Predicate::Or(items) => json!({ "$or": items.iter().map(to_mongo).collect::<Vec<_>>() }),
    }
}

fn field_doc(path: &str, expr: Value) -> Value {
    let mut map = Map::new();
    map.insert(path.to_string(), expr);
    Value::Object(map)
}

/// Expression for one condition; `operator_form` forces `{"$eq": v}` for
/// equality, as required under `$not`
fn condition_expr(condition: &Condition, operator_form: bool) -> Value {
    let value = match (condition.relation, &condition.value) {
        // Sub-millisecond bounds round up so `$lt`/`$gte` keep their meaning
        (Relation::Lt | Relation::Gte, TypedValue::DateTime(dt)) => {
            json!({ "$date": datetime_to_iso(&ceil_to_millis(dt)) })
        }
        (_, other) => typed_to_json(other),
    };
    match condition.relation {
        Relation::Eq if !operator_form => value,
        Relation::Eq => json!({ "$eq": value }),
        Relation::Ne => json!({ "$ne": value }),
        Relation::Lt => json!({ "$lt": value }),
        Relation::Lte => json!({ "$lte": value }),
        Relation::Gt => json!({ "$gt": value }),
        Relation::Gte => json!({ "$gte": value }),
        Relation::In => json!({ "$in": as_array(value) }),
        Relation::Nin => json!({ "$nin": as_array(value) }),
        Relation::Exists => json!({ "$exists": value }),
        relation => regex_expr(relation, &condition.value),
    }
}

fn raw_expr(clause: &RawClause) -> Value {
    json!({ "$in": clause.any_of.iter().map(typed_to_json).collect::<Vec<_>>() })
}

fn regex_expr(relation: Relation, value: &TypedValue) -> Value {
    let text = match value {
        TypedValue::String(s) => s.clone(),
        other => other.to_string(),
    };
    let escaped = regex::escape(&text);
    let pattern = match relation {
        Relation::IExact => format!("^{}$", escaped),
        Relation::StartsWith | Relation::IStartsWith => format!("^{}", escaped),
        Relation::EndsWith | Relation::IEndsWith => format!("{}$", escaped),
        _ => escaped,
    };
    if relation.is_case_insensitive() {
        json!({ "$regex": pattern, "$options": "i" })
    } else {
        json!({ "$regex": pattern })
    }
}

fn as_array(value: Value) -> Value {
    match value {
        Value::Array(_) => value,
        other => Value::Array(vec![other]),
    }
}

/// Extended JSON rendering of a typed value
fn typed_to_json(value: &TypedValue) -> Value {
    match value {
        TypedValue::Int(i) => json!(i),
        TypedValue::Float(x) => json!(x),
        TypedValue::DateTime(dt) => json!({ "$date": datetime_to_iso(dt) }),
        TypedValue::ObjectId(id) => json!({ "$oid": id.to_hex() }),
        TypedValue::Bool(b) => json!(b),
        TypedValue::String(s) => json!(s),
        TypedValue::List(items) => Value::Array(items.iter().map(typed_to_json).collect()),
    }
}
