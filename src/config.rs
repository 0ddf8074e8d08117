//! Decoder configuration.
//!
//! Built with `typed-builder`, and (de)serialisable so it can live next to
//! the rest of an application's settings.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Name of the element carrying the schema version unless configured otherwise.
pub const DEFAULT_VERSION_ELEMENT: &str = "_v";

/// Configuration for [`ObjectDecoder`](crate::decoder::ObjectDecoder).
///
/// # Examples
///
/// ```
/// use netabase_migrate::config::DecoderConfig;
///
/// // Create with defaults
/// let config = DecoderConfig::default();
/// assert_eq!(config.version_element, "_v");
///
/// // Customize options
/// let config = DecoderConfig::builder()
///     .version_element("schema")
///     .ignore_extra_elements(false)
///     .build();
/// assert!(!config.ignore_extra_elements);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder, Serialize, Deserialize)]
#[builder(doc)]
#[serde(default)]
pub struct DecoderConfig {
    /// Element holding the schema version of a top-level document
    #[builder(default = DEFAULT_VERSION_ELEMENT.to_string(), setter(into))]
    pub version_element: String,

    /// Only honour the version element when it is the first element
    #[builder(default = false)]
    pub version_must_lead: bool,

    /// Hand unknown elements to the hook even when it cannot recover the type.
    /// When false, such elements fail the decode instead.
    #[builder(default = true)]
    pub ignore_extra_elements: bool,

    /// Maximum sub-document nesting below the top-level document
    #[builder(default = 64)]
    pub max_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            version_element: DEFAULT_VERSION_ELEMENT.to_string(),
            version_must_lead: false,
            ignore_extra_elements: true,
            max_depth: 64,
        }
    }
}

impl DecoderConfig {
    /// Configuration that rejects unknown elements the active hook cannot recover.
    pub fn strict() -> Self {
        Self {
            ignore_extra_elements: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_config_builder() {
        let config = DecoderConfig::builder()
            .version_element("schema_version")
            .version_must_lead(true)
            .max_depth(8)
            .build();

        assert_eq!(config.version_element, "schema_version");
        assert!(config.version_must_lead);
        assert!(config.ignore_extra_elements);
        assert_eq!(config.max_depth, 8);
    }

    #[test]
    fn test_decoder_config_defaults_match_builder() {
        assert_eq!(DecoderConfig::default(), DecoderConfig::builder().build());
    }

    #[test]
    fn test_strict_config() {
        let config = DecoderConfig::strict();
        assert!(!config.ignore_extra_elements);
        assert_eq!(config.version_element, DEFAULT_VERSION_ELEMENT);
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: DecoderConfig =
            bson::from_document(bson::doc! { "max_depth": 3_i64 }).unwrap();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.version_element, "_v");
        assert!(config.ignore_extra_elements);
    }
}
