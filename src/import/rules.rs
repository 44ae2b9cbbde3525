use crate::{Result, TemplateToolError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Reconciliation flags for one object category.
///
/// Unset flags are omitted from the request and left to the server default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImportRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_missing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_existing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_missing: Option<bool>,
}

impl ImportRule {
    const fn new(
        create_missing: Option<bool>,
        update_existing: Option<bool>,
        delete_missing: Option<bool>,
    ) -> Self {
        Self {
            create_missing,
            update_existing,
            delete_missing,
        }
    }

    /// Create, update and delete.
    const fn sync() -> Self {
        Self::new(Some(true), Some(true), Some(true))
    }

    /// Create and update, never delete.
    const fn upsert() -> Self {
        Self::new(Some(true), Some(true), None)
    }

    const fn create_only() -> Self {
        Self::new(Some(true), None, None)
    }

    /// Leave existing objects untouched and do not create new ones.
    const fn untouched() -> Self {
        Self::new(Some(false), Some(false), None)
    }
}

/// Rule set sent with every `configuration.import` call, keyed by the
/// category name the API uses (`templateLinkage`, `valueMaps`, ...).
///
/// Categories are free-form so rule files can name categories of any
/// server version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportRules(BTreeMap<String, ImportRule>);

/// The fixed rule set: templates and their contents are fully synchronised,
/// hosts and groups are only created or updated, and global objects
/// (images, maps, screens) are never touched.
pub const DEFAULT_IMPORT_RULES: &[(&str, ImportRule)] = &[
    ("applications", ImportRule::new(Some(true), None, Some(true))),
    ("discoveryRules", ImportRule::sync()),
    ("graphs", ImportRule::sync()),
    ("groups", ImportRule::create_only()),
    ("hosts", ImportRule::upsert()),
    ("httptests", ImportRule::sync()),
    ("images", ImportRule::untouched()),
    ("items", ImportRule::sync()),
    ("maps", ImportRule::untouched()),
    ("screens", ImportRule::untouched()),
    // deleteMissing for template linkage needs Zabbix 4.4+
    ("templateLinkage", ImportRule::create_only()),
    ("templates", ImportRule::upsert()),
    ("templateScreens", ImportRule::sync()),
    ("triggers", ImportRule::sync()),
    ("valueMaps", ImportRule::upsert()),
];

impl Default for ImportRules {
    fn default() -> Self {
        DEFAULT_IMPORT_RULES
            .iter()
            .map(|(category, rule)| (category.to_string(), *rule))
            .collect()
    }
}

impl FromIterator<(String, ImportRule)> for ImportRules {
    fn from_iter<I: IntoIterator<Item = (String, ImportRule)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl ImportRules {
    pub fn get(&self, category: &str) -> Option<&ImportRule> {
        self.0.get(category)
    }

    /// Set the rule for `category`, returning the one it replaced.
    pub fn insert(&mut self, category: impl Into<String>, rule: ImportRule) -> Option<ImportRule> {
        self.0.insert(category.into(), rule)
    }

    pub fn remove(&mut self, category: &str) -> Option<ImportRule> {
        self.0.remove(category)
    }

    /// Category names in the order they are sent.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Load a rule set from a JSON object shaped like the `rules` request
    /// member, applied on top of the defaults.
    ///
    /// Each key replaces or adds that category. A `null` value removes the
    /// category, for servers that reject categories they no longer know.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let overrides: serde_json::Value = serde_json::from_str(&content)?;
        let overrides = overrides.as_object().ok_or_else(|| {
            TemplateToolError::InvalidRules(format!(
                "{} must contain a JSON object of categories",
                path.display()
            ))
        })?;

        let mut rules = Self::default();
        for (category, rule) in overrides {
            if rule.is_null() {
                if rules.remove(category).is_none() {
                    tracing::warn!("Import rule category \"{}\" is not set, nothing to remove", category);
                }
                continue;
            }

            let rule: ImportRule = serde_json::from_value(rule.clone()).map_err(|err| {
                TemplateToolError::InvalidRules(format!("category \"{}\": {}", category, err))
            })?;
            tracing::debug!("Import rule for {} set from {}", category, path.display());
            rules.insert(category.clone(), rule);
        }

        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_default_rules_wire_format() {
        let value = serde_json::to_value(ImportRules::default()).unwrap();

        assert_eq!(
            value,
            json!({
                "applications": { "createMissing": true, "deleteMissing": true },
                "discoveryRules": { "createMissing": true, "updateExisting": true, "deleteMissing": true },
                "graphs": { "createMissing": true, "updateExisting": true, "deleteMissing": true },
                "groups": { "createMissing": true },
                "hosts": { "createMissing": true, "updateExisting": true },
                "httptests": { "createMissing": true, "updateExisting": true, "deleteMissing": true },
                "images": { "createMissing": false, "updateExisting": false },
                "items": { "createMissing": true, "updateExisting": true, "deleteMissing": true },
                "maps": { "createMissing": false, "updateExisting": false },
                "screens": { "createMissing": false, "updateExisting": false },
                "templateLinkage": { "createMissing": true },
                "templates": { "createMissing": true, "updateExisting": true },
                "templateScreens": { "createMissing": true, "updateExisting": true, "deleteMissing": true },
                "triggers": { "createMissing": true, "updateExisting": true, "deleteMissing": true },
                "valueMaps": { "createMissing": true, "updateExisting": true }
            })
        );
    }

    fn write_rules(temp: &TempDir, content: &str) -> std::path::PathBuf {
        let path = temp.path().join("rules.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_from_file_overrides_named_categories() {
        let temp = TempDir::new().unwrap();
        let path = write_rules(
            &temp,
            r#"{ "templateLinkage": { "createMissing": true, "deleteMissing": true } }"#,
        );

        let rules = ImportRules::from_file(&path).unwrap();
        let defaults = ImportRules::default();

        assert_eq!(rules.get("templateLinkage").unwrap().delete_missing, Some(true));
        assert_eq!(rules.get("items"), defaults.get("items"));
        assert_eq!(rules.get("images"), defaults.get("images"));
        assert_eq!(rules.categories().count(), DEFAULT_IMPORT_RULES.len());
    }

    #[test]
    fn test_from_file_adds_new_categories() {
        let temp = TempDir::new().unwrap();
        let path = write_rules(
            &temp,
            r#"{ "templateDashboards": { "createMissing": true, "updateExisting": true } }"#,
        );

        let rules = ImportRules::from_file(&path).unwrap();
        let value = serde_json::to_value(&rules).unwrap();

        assert_eq!(
            value["templateDashboards"],
            json!({ "createMissing": true, "updateExisting": true })
        );
        assert_eq!(value["templates"], json!({ "createMissing": true, "updateExisting": true }));
    }

    #[test]
    fn test_from_file_null_removes_category() {
        let temp = TempDir::new().unwrap();
        let path = write_rules(
            &temp,
            r#"{ "applications": null, "screens": null, "templateScreens": null }"#,
        );

        let rules = ImportRules::from_file(&path).unwrap();
        let value = serde_json::to_value(&rules).unwrap();
        let sent = value.as_object().unwrap();

        assert!(!sent.contains_key("applications"));
        assert!(!sent.contains_key("screens"));
        assert!(!sent.contains_key("templateScreens"));
        assert_eq!(sent.len(), DEFAULT_IMPORT_RULES.len() - 3);
    }

    #[test]
    fn test_from_file_rejects_malformed_rules() {
        let temp = TempDir::new().unwrap();
        let path = write_rules(&temp, r#"{ "items": { "createMissing": "yes" } }"#);

        let err = ImportRules::from_file(&path).unwrap_err();
        assert!(matches!(err, TemplateToolError::InvalidRules(_)));
    }

    #[test]
    fn test_from_file_rejects_misspelled_flags() {
        let temp = TempDir::new().unwrap();
        let path = write_rules(&temp, r#"{ "items": { "createMising": true } }"#);

        let err = ImportRules::from_file(&path).unwrap_err();
        assert!(matches!(err, TemplateToolError::InvalidRules(_)));
    }

    #[test]
    fn test_from_file_requires_object() {
        let temp = TempDir::new().unwrap();
        let path = write_rules(&temp, r#"["templates"]"#);

        let err = ImportRules::from_file(&path).unwrap_err();
        assert!(matches!(err, TemplateToolError::InvalidRules(_)));
    }
}
