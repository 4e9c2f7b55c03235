//! Filter compiler
//!
//! Resolves each [`FilterRequest`] to its operator, builds the predicate and
//! ANDs the results together. No coercion happens here.

use std::sync::Arc;

use serde_json::Value;

use crate::core::config::FilterConfig;
use crate::store::DocumentStore;

use super::error::FilterError;
use super::operators::strip_key_suffixes;
use super::registry::Registry;
use super::types::{FilterRequest, Predicate};

#[derive(Debug, Clone)]
pub struct FilterCompiler {
    registry: Arc<Registry>,
    config: FilterConfig,
}

impl FilterCompiler {
    pub fn new(registry: Arc<Registry>, config: FilterConfig) -> Self {
        Self { registry, config }
    }

    /// Compiler over the baseline registry plus the configured field overrides
    pub fn from_config(config: FilterConfig) -> Self {
        let registry = Arc::new(config.build_registry());
        Self::new(registry, config)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Compile a filter set into one predicate
    ///
    /// Zero requests yield [`Predicate::All`]. Requests are folded in input
    /// order and every operator keeps its own list elements in input order.
    pub fn compile(&self, requests: &[FilterRequest]) -> Result<Predicate, FilterError> {
        if requests.len() > self.config.max_filters {
            return Err(FilterError::TooManyFilters {
                count: requests.len(),
                max: self.config.max_filters,
            });
        }

        let predicates = requests
            .iter()
            .map(|request| self.prepare(request))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = predicates.len(), "Compiled filter set");
        Ok(Predicate::all_of(predicates))
    }

    /// Validate and build the predicate for a single request
    pub fn prepare(&self, request: &FilterRequest) -> Result<Predicate, FilterError> {
        let field = request.field();
        if request.value().len() > self.config.max_value_bytes {
            return Err(FilterError::ValueTooLarge {
                field: field.to_string(),
                len: request.value().len(),
                max: self.config.max_value_bytes,
            });
        }

        // Overrides are keyed by the bare field, without `__not`/`__<op>` tails
        let bare_field = strip_key_suffixes(field, request.operator());
        let operator = self
            .registry
            .resolve(bare_field, request.operator())
            .ok_or_else(|| FilterError::unknown_operator(field, request.operator()))?;

        let predicate = operator.prepare(bare_field, request.value(), request.negate())?;

        if let Some(path) = predicate
            .paths()
            .into_iter()
            .find(|path| !self.config.is_field_allowed(path))
        {
            return Err(FilterError::FieldNotAllowed {
                field: path.to_string(),
            });
        }

        tracing::trace!(
            field,
            operator = request.operator(),
            negate = request.negate(),
            predicate = %predicate,
            "Prepared filter"
        );
        Ok(predicate)
    }

    /// Compile and run the filter set against a store
    pub fn apply<S: DocumentStore>(
        &self,
        store: &S,
        requests: &[FilterRequest],
    ) -> Result<Vec<Value>, FilterError> {
        let predicate = self.compile(requests)?;
        Ok(store.find(&predicate))
    }
}

impl Default for FilterCompiler {
    fn default() -> Self {
        Self::from_config(FilterConfig::default())
    }
}
