//! Schema version carried through the decode of one top-level document.

use bson::Bson;
use derive_more::Display;

use crate::errors::{NetabaseError, NetabaseResult};

/// The schema version of the document being decoded.
///
/// ```
/// use netabase_migrate::traits::migration::SchemaVersion;
///
/// assert_eq!(SchemaVersion::Unversioned.number(), None);
/// assert_eq!(SchemaVersion::Unspecified.number(), Some(0));
/// assert_eq!(SchemaVersion::Explicit(3).number(), Some(3));
///
/// // Disposal always sees a concrete number.
/// assert_eq!(SchemaVersion::Unversioned.disposal_value(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum SchemaVersion {
    /// The target type does not participate in versioning.
    #[default]
    #[display("unversioned")]
    Unversioned,
    /// The target type is versioned but the document did not say which version.
    #[display("unspecified")]
    Unspecified,
    /// The document carried this version.
    #[display("v{_0}")]
    Explicit(i32),
}

impl SchemaVersion {
    /// Interpret the version element of a versioned document. `None` means the
    /// document has no such element.
    pub fn from_element(element: &str, value: Option<&Bson>) -> NetabaseResult<Self> {
        match value {
            None => Ok(SchemaVersion::Unspecified),
            Some(Bson::Int32(version)) => Ok(SchemaVersion::Explicit(*version)),
            Some(Bson::Int64(version)) => i32::try_from(*version)
                .map(SchemaVersion::Explicit)
                .map_err(|_| NetabaseError::InvalidSchemaVersion {
                    element: element.to_string(),
                    found: version.to_string(),
                }),
            Some(other) => Err(NetabaseError::InvalidSchemaVersion {
                element: element.to_string(),
                found: format!("{:?}", other.element_type()),
            }),
        }
    }

    /// The version as the legacy nullable integer: absent when unversioned,
    /// 0 when unspecified.
    pub fn number(&self) -> Option<i32> {
        match self {
            SchemaVersion::Unversioned => None,
            SchemaVersion::Unspecified => Some(0),
            SchemaVersion::Explicit(version) => Some(*version),
        }
    }

    /// The version handed to extra-element disposal, which is never absent.
    pub fn disposal_value(&self) -> i32 {
        self.number().unwrap_or(0)
    }

    pub fn is_versioned(&self) -> bool {
        !matches!(self, SchemaVersion::Unversioned)
    }
}
