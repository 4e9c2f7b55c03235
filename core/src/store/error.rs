use thiserror::Error;

/// Errors raised while loading documents into a store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Input is neither a JSON array nor JSON lines
    #[error("Invalid JSON on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A document is not a JSON object
    #[error("Document {index} is not a JSON object")]
    NotAnObject { index: usize },
}
