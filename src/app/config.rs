//! Application configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Page-level settings fixed at application creation.
///
/// Missing fields fall back to [`AppConfig::default`], so a JSON config only
/// needs the keys it changes:
///
/// ```ignore
/// let config = AppConfig::from_json(r#"{ "title": "Demo", "lang": "en" }"#)?;
/// let app = Application::new(config);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Document title, also the default artifact name.
    pub title: String,
    /// `lang` attribute of the exported `<html>` element.
    pub lang: Option<String>,
    /// Class of the root container (without the leading dot).
    pub root_class: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Spark Page".to_string(),
            lang: None,
            root_class: "pageRoot".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Selector of the root class rule (`.pageRoot`).
    pub fn root_selector(&self) -> String {
        format!(".{}", self.root_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PageError;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = AppConfig::from_json(r#"{ "title": "Demo" }"#).unwrap();
        assert_eq!(config.title, "Demo");
        assert_eq!(config.root_class, "pageRoot");
        assert_eq!(config.lang, None);
        assert_eq!(config.root_selector(), ".pageRoot");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(AppConfig::from_json("{ title"), Err(PageError::InvalidConfig(_))));
    }

    #[test]
    fn test_builders() {
        let config = AppConfig::default().with_title("Docs").with_lang("en");
        assert_eq!(config.title, "Docs");
        assert_eq!(config.lang.as_deref(), Some("en"));
    }
}
