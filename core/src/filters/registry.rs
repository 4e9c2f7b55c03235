//! Operator registry
//!
//! Maps operator names to configured [`Operator`] values. A registry is built
//! once at startup, then only read; share it behind an `Arc`.

use std::collections::{BTreeSet, HashMap};

use super::operators::{Operator, OperatorKind};

/// Operators registered by name when no field override applies
const BASELINE: &[OperatorKind] = &[
    OperatorKind::Exact,
    OperatorKind::IExact,
    OperatorKind::Eq,
    OperatorKind::Ne,
    OperatorKind::Lt,
    OperatorKind::Lte,
    OperatorKind::Gt,
    OperatorKind::Gte,
    OperatorKind::In,
    OperatorKind::InDict,
    OperatorKind::Contains,
    OperatorKind::IContains,
    OperatorKind::StartsWith,
    OperatorKind::IStartsWith,
    OperatorKind::EndsWith,
    OperatorKind::IEndsWith,
    OperatorKind::Exists,
    OperatorKind::Or,
    OperatorKind::ExistsOrGte,
    OperatorKind::ExistsOrGt,
    OperatorKind::ExistsOrLte,
    OperatorKind::ExistsOrLt,
];

#[derive(Debug, Clone, Default)]
pub struct Registry {
    operators: HashMap<String, Operator>,
    field_operators: HashMap<String, HashMap<String, Operator>>,
}

impl Registry {
    /// Empty registry, nothing resolves
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding every baseline operator under its own name
    pub fn baseline() -> Self {
        let mut registry = Self::empty();
        for kind in BASELINE {
            registry.register(kind.name(), Self::standard(*kind));
        }
        registry
    }

    /// Operator configured with the standard negation policy for its kind
    ///
    /// Explicit OR has no defined complement and stays non-negatable.
    pub fn standard(kind: OperatorKind) -> Operator {
        match kind {
            OperatorKind::Or => Operator::new(kind),
            _ => Operator::new(kind).with_negation(),
        }
    }

    /// Register an operator by name, returning the one it replaced
    pub fn register(&mut self, name: impl Into<String>, operator: Operator) -> Option<Operator> {
        self.operators.insert(name.into(), operator)
    }

    /// Register an operator that only applies to one field
    pub fn register_for_field(
        &mut self,
        field: impl Into<String>,
        name: impl Into<String>,
        operator: Operator,
    ) -> Option<Operator> {
        self.field_operators
            .entry(field.into())
            .or_default()
            .insert(name.into(), operator)
    }

    pub fn get(&self, name: &str) -> Option<&Operator> {
        self.operators.get(name)
    }

    /// Look up `name` for `field`; field overrides win over the shared table
    pub fn resolve(&self, field: &str, name: &str) -> Option<&Operator> {
        self.field_operators
            .get(field)
            .and_then(|ops| ops.get(name))
            .or_else(|| self.operators.get(name))
    }

    /// Whether `name` is an operator name anywhere in the registry
    pub fn is_operator_name(&self, name: &str) -> bool {
        self.operators.contains_key(name)
            || self
                .field_operators
                .values()
                .any(|ops| ops.contains_key(name))
    }

    /// Shared operator names, sorted
    pub fn names(&self) -> Vec<&str> {
        let names: BTreeSet<&str> = self.operators.keys().map(String::as_str).collect();
        names.into_iter().collect()
    }

    /// Field overrides as `(field, name, operator)`, sorted by field then name
    pub fn field_overrides(&self) -> Vec<(&str, &str, &Operator)> {
        let mut overrides: Vec<(&str, &str, &Operator)> = self
            .field_operators
            .iter()
            .flat_map(|(field, ops)| {
                ops.iter()
                    .map(move |(name, op)| (field.as_str(), name.as_str(), op))
            })
            .collect();
        overrides.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_registers_every_name() {
        let registry = Registry::baseline();
        for name in [
            "exact",
            "iexact",
            "eq",
            "ne",
            "lt",
            "lte",
            "gt",
            "gte",
            "in",
            "indict",
            "contains",
            "icontains",
            "startswith",
            "istartswith",
            "endswith",
            "iendswith",
            "exists",
            "or",
            "eogte",
            "eogt",
            "eolte",
            "eolt",
        ] {
            assert!(registry.get(name).is_some(), "missing {}", name);
        }
        assert!(registry.get("between").is_none());
    }

    #[test]
    fn baseline_negation_policy() {
        let registry = Registry::baseline();
        assert!(!registry.get("or").unwrap().allows_negation());
        assert!(registry.get("eogte").unwrap().allows_negation());
        assert!(registry.get("gte").unwrap().allows_negation());
        assert!(registry.get("in").unwrap().allows_negation());
    }

    #[test]
    fn field_override_wins() {
        let mut registry = Registry::baseline();
        registry.register_for_field(
            "owner",
            "in",
            Registry::standard(OperatorKind::InObjectId),
        );
        registry.register_for_field("active", "exact", Registry::standard(OperatorKind::Boolean));

        assert_eq!(
            registry.resolve("owner", "in").unwrap().kind(),
            OperatorKind::InObjectId
        );
        assert_eq!(
            registry.resolve("tags", "in").unwrap().kind(),
            OperatorKind::In
        );
        assert_eq!(
            registry.resolve("active", "exact").unwrap().kind(),
            OperatorKind::Boolean
        );
        assert_eq!(
            registry.resolve("active", "gte").unwrap().kind(),
            OperatorKind::Gte
        );
    }

    #[test]
    fn field_only_operator_names() {
        let mut registry = Registry::empty();
        registry.register_for_field("items", "indict", Registry::standard(OperatorKind::InDict));

        assert!(registry.is_operator_name("indict"));
        assert!(registry.resolve("items", "indict").is_some());
        assert!(registry.resolve("other", "indict").is_none());
        assert!(registry.names().is_empty());
        assert_eq!(registry.field_overrides().len(), 1);
    }

    #[test]
    fn register_replaces() {
        let mut registry = Registry::baseline();
        let previous = registry.register("gte", Operator::new(OperatorKind::Gte));
        assert!(previous.unwrap().allows_negation());
        assert!(!registry.get("gte").unwrap().allows_negation());
    }

    #[test]
    fn names_sorted() {
        let registry = Registry::baseline();
        let names = registry.names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), BASELINE.len());
    }
}
