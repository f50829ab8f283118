//! Minify configuration and the configuration file.
//!
//! Defaults are overlaid per key by whatever the user supplies; the overlay is
//! a pure function computed once per converter, never per node.

use serde::{Deserialize, Serialize};
use starlight_llms_core::Options;

use crate::widget::AsideVariant;
use crate::Result;

/// Resolved minify configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinifyOptions {
    pub note: bool,
    pub tip: bool,
    pub caution: bool,
    pub danger: bool,
    pub details: bool,
    pub whitespace: bool,
    pub custom_selectors: Vec<String>,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            note: true,
            tip: true,
            caution: false,
            danger: false,
            details: true,
            whitespace: true,
            custom_selectors: Vec::new(),
        }
    }
}

impl MinifyOptions {
    /// Overlay `overrides` onto `defaults`, key by key.
    pub fn merge(defaults: &MinifyOptions, overrides: &MinifyOverrides) -> MinifyOptions {
        MinifyOptions {
            note: overrides.note.unwrap_or(defaults.note),
            tip: overrides.tip.unwrap_or(defaults.tip),
            caution: overrides.caution.unwrap_or(defaults.caution),
            danger: overrides.danger.unwrap_or(defaults.danger),
            details: overrides.details.unwrap_or(defaults.details),
            whitespace: overrides.whitespace.unwrap_or(defaults.whitespace),
            custom_selectors: overrides
                .custom_selectors
                .clone()
                .unwrap_or_else(|| defaults.custom_selectors.clone()),
        }
    }

    /// Whether asides of `variant` are removed when minifying
    pub fn removes_aside(&self, variant: AsideVariant) -> bool {
        match variant {
            AsideVariant::Note => self.note,
            AsideVariant::Tip => self.tip,
            AsideVariant::Caution => self.caution,
            AsideVariant::Danger => self.danger,
        }
    }
}

/// User-supplied minify options; absent keys keep their default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MinifyOverrides {
    pub note: Option<bool>,
    pub tip: Option<bool>,
    pub caution: Option<bool>,
    pub danger: Option<bool>,
    pub details: Option<bool>,
    pub whitespace: Option<bool>,
    pub custom_selectors: Option<Vec<String>>,
}

/// Contents of a configuration file.
///
/// ```toml
/// strictParsing = false
///
/// [minify]
/// caution = true
/// customSelectors = [".sl-banner"]
///
/// [markdown]
/// headingStyle = "atx"
/// bulletListMarker = "-"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    pub minify: MinifyOverrides,
    pub markdown: Options,
    pub strict_parsing: bool,
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Minify options with this file's overrides applied to the defaults
    pub fn minify_options(&self) -> MinifyOptions {
        MinifyOptions::merge(&MinifyOptions::default(), &self.minify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LlmsError;
    use pretty_assertions::assert_eq;
    use starlight_llms_core::HeadingStyle;

    #[test]
    fn test_defaults() {
        let options = MinifyOptions::default();
        assert!(options.note && options.tip && options.details && options.whitespace);
        assert!(!options.caution && !options.danger);
        assert!(options.custom_selectors.is_empty());
    }

    #[test]
    fn test_merge_is_per_key() {
        let overrides = MinifyOverrides {
            note: Some(false),
            danger: Some(true),
            custom_selectors: Some(vec![".banner".to_string()]),
            ..Default::default()
        };
        let merged = MinifyOptions::merge(&MinifyOptions::default(), &overrides);

        assert_eq!(
            merged,
            MinifyOptions {
                note: false,
                tip: true,
                caution: false,
                danger: true,
                details: true,
                whitespace: true,
                custom_selectors: vec![".banner".to_string()],
            }
        );
    }

    #[test]
    fn test_empty_overrides_are_identity() {
        let defaults = MinifyOptions::default();
        assert_eq!(MinifyOptions::merge(&defaults, &MinifyOverrides::default()), defaults);
    }

    #[test]
    fn test_removes_aside() {
        let options = MinifyOptions::default();
        assert!(options.removes_aside(AsideVariant::Note));
        assert!(!options.removes_aside(AsideVariant::Danger));
    }

    #[test]
    fn test_config_from_toml() {
        let config = Config::from_toml_str(
            r#"
            strictParsing = true

            [minify]
            whitespace = false
            customSelectors = [".sl-banner", "nav"]

            [markdown]
            headingStyle = "setext"
            "#,
        )
        .unwrap();

        assert!(config.strict_parsing);
        assert_eq!(config.markdown.heading_style, HeadingStyle::Setext);
        assert_eq!(config.markdown.fence, "```");

        let minify = config.minify_options();
        assert!(!minify.whitespace);
        assert!(minify.note);
        assert_eq!(minify.custom_selectors, vec![".sl-banner", "nav"]);
    }

    #[test]
    fn test_config_rejects_unknown_keys() {
        let err = Config::from_toml_str("[minify]\nnotes = true\n").unwrap_err();
        assert!(matches!(err, LlmsError::Config(_)));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.minify_options(), MinifyOptions::default());
        assert_eq!(config.markdown, Options::gfm());
    }
}
