use thiserror::Error;

pub type NetabaseResult<T> = Result<T, NetabaseError>;

#[derive(Error, Debug)]
pub enum NetabaseError {
    #[error("Configuration Error: a migration hook must be provided")]
    MissingHook,

    #[error("Class Map Not Registered: {0}")]
    ClassMapNotRegistered(String),

    #[error("Duplicate Class Map: {0}")]
    DuplicateClassMap(String),

    #[error("Duplicate Element: `{element}` is mapped twice on {type_name}")]
    DuplicateElement { type_name: String, element: String },

    #[error("Invalid Schema Version: element `{element}` holds {found}")]
    InvalidSchemaVersion { element: String, found: String },

    #[error("Type Mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Parent Type Mismatch: expected {expected}")]
    ParentTypeMismatch { expected: &'static str },

    #[error("Unexpected Element: `{element}` has no member on {type_name}")]
    UnexpectedElement { type_name: String, element: String },

    #[error("Nesting Too Deep: sub-document depth {depth} exceeds the configured limit")]
    NestingTooDeep { depth: usize },

    #[error(transparent)]
    Decode(#[from] bson::de::Error),

    #[error("Migration Error: {0}")]
    Migration(String),
}
