use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid evaluation pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("duplicate action name '{name}'")]
    DuplicateAction { name: String },

    #[error("negative '{negative}' of action '{action}' is not a registered action")]
    UndefinedNegative { action: String, negative: String },

    #[error("no form with id '{id}' to run its script against")]
    UnknownForm { id: String },
}

/// Non-fatal problems met while dispatching actions. Collected in a
/// [`DispatchReport`](super::DispatchReport), never returned as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("unknown action '{name}'")]
    UnknownAction { name: String },
}
