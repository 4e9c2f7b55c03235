//! Query parameter parser
//!
//! Turns `field[__not][__operator]=value` pairs into [`FilterRequest`]s.
//! Only the key is interpreted; the value is passed through untouched.

use crate::core::constants::DEFAULT_OPERATOR;

use super::error::FilterError;
use super::operators::{NEGATION_SUFFIX, SEGMENT_SEPARATOR};
use super::registry::Registry;
use super::types::FilterRequest;

/// Parse one parameter key and its value
///
/// The last `__` segment is the operator when the registry knows the name,
/// otherwise the default operator applies. A `not` segment in front of the
/// operator (or as the last segment) requests negation.
pub fn parse_param(key: &str, value: &str, registry: &Registry) -> Result<FilterRequest, FilterError> {
    let mut segments: Vec<&str> = key.split(SEGMENT_SEPARATOR).collect();

    let operator = match segments.last().copied() {
        Some(last) if segments.len() > 1 && registry.is_operator_name(last) => {
            segments.pop();
            last.to_string()
        }
        _ => DEFAULT_OPERATOR.to_string(),
    };

    let negate = segments.len() > 1 && segments.last().copied() == Some(NEGATION_SUFFIX);
    if negate {
        segments.pop();
    }

    let field = segments.join(SEGMENT_SEPARATOR);
    if field.is_empty() {
        return Err(FilterError::InvalidParameter(format!(
            "missing field name in '{}'",
            key
        )));
    }

    let request = FilterRequest::new(field, operator, value);
    Ok(if negate { request.negated() } else { request })
}

/// Parse every `(key, value)` pair, stopping at the first error
pub fn parse_params<'a, I>(params: I, registry: &Registry) -> Result<Vec<FilterRequest>, FilterError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    params
        .into_iter()
        .map(|(key, value)| parse_param(key, value, registry))
        .collect()
}

/// Split `key=value` on the first `=`; a missing `=` gives an empty value
pub fn parse_pair(pair: &str) -> (&str, &str) {
    pair.split_once('=').unwrap_or((pair, ""))
}

/// Parse an already decoded `a=1&b__gte=2` query string
pub fn parse_query_string(query: &str, registry: &Registry) -> Result<Vec<FilterRequest>, FilterError> {
    parse_params(
        query.split('&').filter(|p| !p.is_empty()).map(parse_pair),
        registry,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::baseline()
    }

    #[test]
    fn bare_field_uses_default_operator() {
        let request = parse_param("name", "bob", &registry()).unwrap();
        assert_eq!(request, FilterRequest::new("name", "exact", "bob"));
    }

    #[test]
    fn operator_segment() {
        let request = parse_param("age__gte", "18", &registry()).unwrap();
        assert_eq!(request, FilterRequest::new("age", "gte", "18"));
    }

    #[test]
    fn negated_operator() {
        let request = parse_param("name__not__icontains", "bot", &registry()).unwrap();
        assert_eq!(
            request,
            FilterRequest::new("name", "icontains", "bot").negated()
        );
    }

    #[test]
    fn trailing_not_negates_default_operator() {
        let request = parse_param("status__not", "draft", &registry()).unwrap();
        assert_eq!(request, FilterRequest::new("status", "exact", "draft").negated());
    }

    #[test]
    fn unknown_segment_stays_in_field() {
        let request = parse_param("meta__between", "1", &registry()).unwrap();
        assert_eq!(request, FilterRequest::new("meta__between", "exact", "1"));
    }

    #[test]
    fn field_named_like_operator() {
        let request = parse_param("in", "x", &registry()).unwrap();
        assert_eq!(request, FilterRequest::new("in", "exact", "x"));

        let request = parse_param("not", "x", &registry()).unwrap();
        assert_eq!(request, FilterRequest::new("not", "exact", "x"));
    }

    #[test]
    fn empty_field_rejected() {
        let err = parse_param("__gte", "1", &registry()).unwrap_err();
        assert!(matches!(err, FilterError::InvalidParameter(_)));
    }

    #[test]
    fn field_only_operator_names_are_recognised() {
        let mut registry = Registry::empty();
        registry.register_for_field(
            "owner",
            "oid",
            Registry::standard(crate::filters::OperatorKind::InObjectId),
        );
        let request = parse_param("owner__oid", "x", &registry).unwrap();
        assert_eq!(request.operator(), "oid");
    }

    #[test]
    fn parse_query_string_keeps_order() {
        let requests =
            parse_query_string("age__gte=18&&name__not__startswith=a&flag", &registry()).unwrap();
        assert_eq!(
            requests,
            vec![
                FilterRequest::new("age", "gte", "18"),
                FilterRequest::new("name", "startswith", "a").negated(),
                FilterRequest::new("flag", "exact", ""),
            ]
        );
    }

    #[test]
    fn parse_pair_splits_on_first_equals() {
        assert_eq!(parse_pair("a=b=c"), ("a", "b=c"));
        assert_eq!(parse_pair("a"), ("a", ""));
    }
}
