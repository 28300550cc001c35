//! Error types for form construction and field access
//!
//! Configuration mistakes (`FormError`) are returned to the caller. Per-field
//! problems (`FieldAccessError`, `ProviderMismatch`) are logged by the form
//! manager and never abort the rest of the form.

/// Fatal errors in form setup
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// The schema type has no `#[form]` marker
    #[error("`{type_name}` is not a form: add #[form] to the struct")]
    MissingFormMarker { type_name: &'static str },

    /// Two form items share a key and the duplicate policy is `reject`
    #[error("duplicate form key `{0}`")]
    DuplicateKey(String),
}

/// Failure reading or writing one schema field
#[derive(Debug, thiserror::Error)]
pub enum FieldAccessError {
    #[error("no form field named `{0}`")]
    NoSuchField(String),

    #[error("cannot convert value of field `{field}`: {source}")]
    Conversion {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A validator asked to display an error on a layout provider it does not understand
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected layout provider `{expected}`, found `{found}`")]
pub struct ProviderMismatch {
    pub expected: &'static str,
    pub found: &'static str,
}
