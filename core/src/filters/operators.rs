//! Filter operators
//!
//! Each operator turns `(field, raw value, negate)` into a [`Predicate`].
//! Operators are plain values: the kind plus whether negation is accepted.
//! They hold no per-request state and can be shared freely across threads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::coerce::{
    coerce_comparable, coerce_member, parse_flag, split_list, try_object_id,
};
use super::error::FilterError;
use super::types::{Predicate, RawClause, Relation, TypedValue};

/// Suffix marking a negated parameter key
pub const NEGATION_SUFFIX: &str = "not";

/// Separator between field and operator segments in parameter keys
pub const SEGMENT_SEPARATOR: &str = "__";

/// Closed set of operator behaviours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    /// Equality; negation uses the store's native not-equal
    Exact,
    #[serde(rename = "iexact")]
    IExact,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    /// Membership; a single value degenerates to equality
    In,
    /// Membership over store identifiers, invalid elements dropped
    InObjectId,
    /// Membership against a subfield of a list of sub-documents
    #[serde(rename = "indict")]
    InDict,
    Contains,
    #[serde(rename = "icontains")]
    IContains,
    #[serde(rename = "startswith")]
    StartsWith,
    #[serde(rename = "istartswith")]
    IStartsWith,
    #[serde(rename = "endswith")]
    EndsWith,
    #[serde(rename = "iendswith")]
    IEndsWith,
    Exists,
    /// Equality against a boolean field; negation flips the value
    Boolean,
    /// Pipe-delimited fields and values folded with OR
    Or,
    #[serde(rename = "eogte")]
    ExistsOrGte,
    #[serde(rename = "eogt")]
    ExistsOrGt,
    #[serde(rename = "eolte")]
    ExistsOrLte,
    #[serde(rename = "eolt")]
    ExistsOrLt,
}

impl OperatorKind {
    pub const ALL: &'static [OperatorKind] = &[
        Self::Exact,
        Self::IExact,
        Self::Eq,
        Self::Ne,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::In,
        Self::InObjectId,
        Self::InDict,
        Self::Contains,
        Self::IContains,
        Self::StartsWith,
        Self::IStartsWith,
        Self::EndsWith,
        Self::IEndsWith,
        Self::Exists,
        Self::Boolean,
        Self::Or,
        Self::ExistsOrGte,
        Self::ExistsOrGt,
        Self::ExistsOrLte,
        Self::ExistsOrLt,
    ];

    /// Identifier used in configuration files
    pub fn id(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::IExact => "iexact",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::In => "in",
            Self::InObjectId => "in_object_id",
            Self::InDict => "indict",
            Self::Contains => "contains",
            Self::IContains => "icontains",
            Self::StartsWith => "startswith",
            Self::IStartsWith => "istartswith",
            Self::EndsWith => "endswith",
            Self::IEndsWith => "iendswith",
            Self::Exists => "exists",
            Self::Boolean => "boolean",
            Self::Or => "or",
            Self::ExistsOrGte => "eogte",
            Self::ExistsOrGt => "eogt",
            Self::ExistsOrLte => "eolte",
            Self::ExistsOrLt => "eolt",
        }
    }

    /// Name the operator answers to in parameter keys
    pub fn name(&self) -> &'static str {
        match self {
            Self::InObjectId => "in",
            Self::Boolean => "exact",
            other => other.id(),
        }
    }

    /// Relation emitted by the plain comparison and pattern kinds
    fn simple_relation(&self) -> Option<Relation> {
        match self {
            Self::IExact => Some(Relation::IExact),
            Self::Eq => Some(Relation::Eq),
            Self::Ne => Some(Relation::Ne),
            Self::Lt => Some(Relation::Lt),
            Self::Lte => Some(Relation::Lte),
            Self::Gt => Some(Relation::Gt),
            Self::Gte => Some(Relation::Gte),
            Self::Contains => Some(Relation::Contains),
            Self::IContains => Some(Relation::IContains),
            Self::StartsWith => Some(Relation::StartsWith),
            Self::IStartsWith => Some(Relation::IStartsWith),
            Self::EndsWith => Some(Relation::EndsWith),
            Self::IEndsWith => Some(Relation::IEndsWith),
            _ => None,
        }
    }

    /// Comparison branch of the exists-or-compare family
    fn exists_or_relation(&self) -> Option<Relation> {
        match self {
            Self::ExistsOrGte => Some(Relation::Gte),
            Self::ExistsOrGt => Some(Relation::Gt),
            Self::ExistsOrLte => Some(Relation::Lte),
            Self::ExistsOrLt => Some(Relation::Lt),
            _ => None,
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for OperatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.id() == lowered)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|k| k.id()).collect();
                format!(
                    "Invalid operator '{}'. Valid options: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}

/// Configured operator instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operator {
    kind: OperatorKind,
    allows_negation: bool,
}

impl Operator {
    /// New operator that rejects negation until opted in
    pub const fn new(kind: OperatorKind) -> Self {
        Self {
            kind,
            allows_negation: false,
        }
    }

    pub const fn with_negation(self) -> Self {
        Self {
            allows_negation: true,
            ..self
        }
    }

    pub fn kind(&self) -> OperatorKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn allows_negation(&self) -> bool {
        self.allows_negation
    }

    /// Build the predicate for one filter parameter
    ///
    /// Pure function of its inputs. Negation on an operator that has not
    /// opted in is rejected with [`FilterError::UnsupportedNegation`].
    pub fn prepare(&self, field: &str, value: &str, negate: bool) -> Result<Predicate, FilterError> {
        if negate && !self.allows_negation {
            return Err(FilterError::unsupported_negation(field, self.name()));
        }

        match self.kind {
            OperatorKind::Exact => {
                let relation = if negate { Relation::Ne } else { Relation::Eq };
                Ok(Predicate::condition(
                    field,
                    relation,
                    coerce_comparable(value),
                ))
            }
            OperatorKind::In => Ok(prepare_in(field, value, negate)),
            OperatorKind::InObjectId => prepare_in_object_id(field, value, negate),
            OperatorKind::InDict => prepare_in_dict(field, value, negate),
            OperatorKind::Exists => Ok(negatable(
                Predicate::condition(field, Relation::Exists, TypedValue::Bool(parse_flag(value))),
                negate,
            )),
            OperatorKind::Boolean => {
                let flag = value != "false";
                Ok(Predicate::condition(
                    field,
                    Relation::Eq,
                    TypedValue::Bool(flag != negate),
                ))
            }
            OperatorKind::Or => self.prepare_or(field, value),
            kind => match (kind.simple_relation(), kind.exists_or_relation()) {
                (Some(relation), _) => {
                    let typed = if relation.is_pattern() {
                        TypedValue::String(value.to_string())
                    } else {
                        coerce_comparable(value)
                    };
                    Ok(negatable(
                        Predicate::condition(field, relation, typed),
                        negate,
                    ))
                }
                (None, Some(relation)) => Ok(self.prepare_exists_or(field, value, negate, relation)),
                (None, None) => Err(FilterError::unknown_operator(field, kind.name())),
            },
        }
    }

    /// `(path exists == !negate) OR (path <relation> value)`
    fn prepare_exists_or(
        &self,
        field: &str,
        value: &str,
        negate: bool,
        relation: Relation,
    ) -> Predicate {
        let path = strip_key_suffixes(field, self.name());
        Predicate::Or(vec![
            Predicate::condition(path, Relation::Exists, TypedValue::Bool(!negate)),
            Predicate::condition(path, relation, coerce_comparable(value)),
        ])
    }

    fn prepare_or(&self, field: &str, value: &str) -> Result<Predicate, FilterError> {
        let path = strip_key_suffixes(field, self.name());
        let fields: Vec<&str> = path.split('|').collect();
        let values: Vec<&str> = value.split('|').collect();

        if fields.len() != values.len() {
            return Err(FilterError::malformed(
                field,
                format!(
                    "expected {} pipe-separated values, got {}",
                    fields.len(),
                    values.len()
                ),
            ));
        }
        if fields.iter().any(|f| f.is_empty()) {
            return Err(FilterError::malformed(field, "empty field in OR list"));
        }

        let branches = fields
            .into_iter()
            .zip(values)
            .map(|(f, v)| Predicate::condition(f, Relation::Eq, coerce_comparable(v)))
            .collect();
        Ok(Predicate::any_of(branches))
    }
}

fn negatable(predicate: Predicate, negate: bool) -> Predicate {
    if negate {
        Predicate::not(predicate)
    } else {
        predicate
    }
}

fn prepare_in(field: &str, value: &str, negate: bool) -> Predicate {
    if value.contains(',') {
        let items = split_list(value).map(coerce_member).collect();
        let relation = if negate { Relation::Nin } else { Relation::In };
        Predicate::condition(field, relation, TypedValue::List(items))
    } else {
        let relation = if negate { Relation::Ne } else { Relation::Eq };
        Predicate::condition(field, relation, coerce_member(value))
    }
}

fn prepare_in_object_id(field: &str, value: &str, negate: bool) -> Result<Predicate, FilterError> {
    if value.contains(',') {
        let mut ids = Vec::new();
        for element in split_list(value) {
            match try_object_id(element) {
                Some(id) => ids.push(TypedValue::ObjectId(id)),
                None => {
                    tracing::warn!(field, element, "Dropping invalid object identifier");
                }
            }
        }
        if ids.is_empty() {
            return Err(FilterError::malformed(
                field,
                "no valid object identifiers in list",
            ));
        }
        let relation = if negate { Relation::Nin } else { Relation::In };
        Ok(Predicate::condition(field, relation, TypedValue::List(ids)))
    } else {
        let id = try_object_id(value)
            .ok_or_else(|| FilterError::malformed(field, "not a valid object identifier"))?;
        let relation = if negate { Relation::Ne } else { Relation::Eq };
        Ok(Predicate::condition(
            field,
            relation,
            TypedValue::ObjectId(id),
        ))
    }
}

/// `<subfield>.<value[,value...]>` against `field.subfield`
fn prepare_in_dict(field: &str, value: &str, negate: bool) -> Result<Predicate, FilterError> {
    let (subfield, values) = value
        .split_once('.')
        .filter(|(subfield, _)| !subfield.is_empty())
        .ok_or_else(|| {
            FilterError::malformed(field, "expected `<subfield>.<value[,value...]>`")
        })?;

    let any_of = if values.contains(',') {
        split_list(values)
            .filter(|v| !v.is_empty())
            .map(coerce_member)
            .collect()
    } else {
        vec![coerce_member(values)]
    };

    let clause = Predicate::Raw(RawClause {
        path: format!("{}.{}", field, subfield),
        any_of,
    });
    Ok(negatable(clause, negate))
}

/// Strip trailing `__not` and `__<operator>` segments left by key parsing
pub fn strip_key_suffixes<'a>(field: &'a str, operator: &str) -> &'a str {
    let mut current = field;
    loop {
        let Some((head, tail)) = current.rsplit_once(SEGMENT_SEPARATOR) else {
            return current;
        };
        if head.is_empty() || (tail != NEGATION_SUFFIX && tail != operator) {
            return current;
        }
        current = head;
    }
}
