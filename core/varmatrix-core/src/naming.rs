//! The `{prefix}{NNN}{extension}` file naming convention for variants

use serde::{Deserialize, Serialize};

use crate::error::NamingError;

/// Numeric identifier of a configuration variant.
pub type VariantId = u32;

/// How variant numbers map to configuration file names.
///
/// `format` and `parse` are inverses: a name is only accepted when
/// formatting the parsed number reproduces it exactly, so `var_5.h` and
/// `var_0042.h` are rejected under the default three-digit width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantNaming {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_prefix() -> String {
    "var_".to_string()
}

fn default_width() -> usize {
    3
}

fn default_extension() -> String {
    ".h".to_string()
}

impl Default for VariantNaming {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            width: default_width(),
            extension: default_extension(),
        }
    }
}

impl VariantNaming {
    pub fn new(prefix: impl Into<String>, width: usize, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            width,
            extension: extension.into(),
        }
    }

    /// Zero-padded number as passed to the build entry point (`7` -> `007`).
    pub fn label(&self, id: VariantId) -> String {
        format!("{id:0width$}", width = self.width)
    }

    /// Configuration file name for `id` (`7` -> `var_007.h`).
    pub fn format(&self, id: VariantId) -> String {
        format!("{}{}{}", self.prefix, self.label(id), self.extension)
    }

    pub fn matches_extension(&self, name: &str) -> bool {
        name.ends_with(&self.extension)
    }

    /// Extract the variant number from a configuration file name.
    ///
    /// Names without the extension yield [`NamingError::NotAVariant`];
    /// anything else that is not the canonical spelling of a number is
    /// [`NamingError::Malformed`].
    pub fn parse(&self, name: &str) -> Result<VariantId, NamingError> {
        let stem = name
            .strip_suffix(&self.extension)
            .ok_or_else(|| NamingError::NotAVariant {
                name: name.to_string(),
                extension: self.extension.clone(),
            })?;

        let digits = stem
            .strip_prefix(&self.prefix)
            .ok_or_else(|| malformed(name, format!("missing prefix `{}`", self.prefix)))?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed(
                name,
                format!("`{digits}` is not a decimal variant number"),
            ));
        }

        let id: VariantId = digits
            .parse()
            .map_err(|_| malformed(name, format!("`{digits}` is out of range")))?;

        if self.label(id) != digits {
            return Err(malformed(
                name,
                format!("number is not zero-padded to {} digits", self.width),
            ));
        }

        Ok(id)
    }
}

fn malformed(name: &str, reason: String) -> NamingError {
    NamingError::Malformed {
        name: name.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn formats_with_zero_padding() {
        let naming = VariantNaming::default();
        assert_eq!(naming.format(0), "var_000.h");
        assert_eq!(naming.format(42), "var_042.h");
        assert_eq!(naming.format(1234), "var_1234.h");
        assert_eq!(naming.label(5), "005");
    }

    #[test]
    fn parses_canonical_names() {
        let naming = VariantNaming::default();
        assert_eq!(naming.parse("var_000.h"), Ok(0));
        assert_eq!(naming.parse("var_042.h"), Ok(42));
        assert_eq!(naming.parse("var_1000.h"), Ok(1000));
    }

    #[test]
    fn other_extensions_are_not_variants() {
        let naming = VariantNaming::default();
        assert!(matches!(
            naming.parse("notes.txt"),
            Err(NamingError::NotAVariant { .. })
        ));
        assert!(!naming.matches_extension("var_001.hpp"));
    }

    #[test]
    fn rejects_malformed_names() {
        let naming = VariantNaming::default();
        for name in [
            "var_abc.h",
            "var_.h",
            "var_-01.h",
            "var_+01.h",
            "var_5.h",
            "var_0042.h",
            "config.h",
            ".h",
            "var_99999999999.h",
        ] {
            assert!(
                matches!(naming.parse(name), Err(NamingError::Malformed { .. })),
                "{name} should be malformed"
            );
        }
    }

    #[test]
    fn custom_schema() {
        let naming = VariantNaming::new("param-", 2, ".inc");
        assert_eq!(naming.format(7), "param-07.inc");
        assert_eq!(naming.parse("param-07.inc"), Ok(7));
        assert!(naming.parse("var_007.h").is_err());
    }

    proptest! {
        #[test]
        fn parse_inverts_format(id in any::<u32>(), width in 1usize..8) {
            let naming = VariantNaming::new("var_", width, ".h");
            prop_assert_eq!(naming.parse(&naming.format(id)), Ok(id));
        }
    }
}
