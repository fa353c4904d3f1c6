//! # Template Catalog
//!
//! The immutable set of query templates the engine can resolve to. A catalog is
//! validated once when it is built; after that it is only ever read. There is no
//! insert or update path: a different catalog means building a new engine (see
//! `SharedEngine::replace`).

use crate::{
    binder::slots,
    constants::TABLE_SLOT,
    errors::CatalogError,
    types::{ParamName, ParamValue},
};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use tracing::info;

/// The catalog compiled into the library.
const BUILTIN_CATALOG: &str = include_str!("catalog.yml");

/// A parameterized query pattern with its example phrasings.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub id: String,
    pub examples: Vec<String>,
    pub sql_skeleton: String,
    pub description: String,
    /// Checked in order; the first one missing is reported.
    pub required_params: Vec<ParamName>,
    pub optional_params: Vec<ParamName>,
    /// Value bound for an optional parameter the utterance did not supply.
    pub defaults: BTreeMap<ParamName, ParamValue>,
}

impl Template {
    /// Every parameter the template binds, required first.
    pub fn params(&self) -> impl Iterator<Item = ParamName> + '_ {
        self.required_params
            .iter()
            .chain(self.optional_params.iter())
            .copied()
    }
}

/// The serialized form of a template, as written in catalog YAML.
#[derive(Debug, Deserialize)]
struct TemplateDef {
    id: String,
    examples: Vec<String>,
    sql_skeleton: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    required_params: Vec<ParamName>,
    #[serde(default)]
    optional_params: Vec<ParamName>,
    #[serde(default)]
    defaults: BTreeMap<ParamName, String>,
}

#[derive(Debug, Deserialize)]
struct CatalogDef {
    templates: Vec<TemplateDef>,
}

impl TryFrom<TemplateDef> for Template {
    type Error = CatalogError;

    fn try_from(def: TemplateDef) -> Result<Self, Self::Error> {
        let mut defaults = BTreeMap::new();
        for (param, raw) in def.defaults {
            let value = ParamValue::parse(param, &raw).map_err(|reason| {
                CatalogError::InvalidDefault {
                    template: def.id.clone(),
                    param: param.to_string(),
                    reason,
                }
            })?;
            defaults.insert(param, value);
        }
        Ok(Template {
            id: def.id,
            examples: def.examples,
            sql_skeleton: def.sql_skeleton.trim().to_string(),
            description: def.description,
            required_params: def.required_params,
            optional_params: def.optional_params,
            defaults,
        })
    }
}

/// An ordered, validated collection of templates.
#[derive(Debug, Clone)]
pub struct Catalog {
    templates: Vec<Template>,
}

impl Catalog {
    /// Validates `templates` and wraps them, preserving their order.
    pub fn new(templates: Vec<Template>) -> Result<Self, CatalogError> {
        if templates.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut ids = HashSet::new();
        for template in &templates {
            validate_template(template)?;
            if !ids.insert(template.id.as_str()) {
                return Err(CatalogError::DuplicateId(template.id.clone()));
            }
        }
        Ok(Self { templates })
    }

    /// Loads the built-in churn analytics catalog.
    pub fn load() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// Parses and validates a catalog from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let def: CatalogDef = serde_yaml::from_str(yaml)?;
        let templates = def
            .templates
            .into_iter()
            .map(Template::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(templates)
    }

    /// Reads a catalog YAML file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_yaml_str(&yaml)?;
        info!(
            "Loaded {} templates from '{}'",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// The first example of every template, in catalog order.
    pub fn example_queries(&self) -> Vec<&str> {
        self.templates
            .iter()
            .filter_map(|t| t.examples.first().map(String::as_str))
            .collect()
    }
}

fn validate_template(template: &Template) -> Result<(), CatalogError> {
    let id = &template.id;
    if id.trim().is_empty() {
        return Err(CatalogError::EmptyId);
    }
    if template.examples.is_empty() {
        return Err(CatalogError::NoExamples(id.clone()));
    }
    if template.examples.iter().any(|e| e.trim().is_empty()) {
        return Err(CatalogError::BlankExample(id.clone()));
    }

    let mut declared = BTreeSet::new();
    for param in template.params() {
        if !declared.insert(param) {
            return Err(CatalogError::ConflictingParam {
                template: id.clone(),
                param: param.to_string(),
            });
        }
    }

    let skeleton_slots: BTreeSet<&str> = slots(&template.sql_skeleton)
        .into_iter()
        .map(|s| s.name)
        .collect();

    for param in &declared {
        if !skeleton_slots.contains(param.as_str()) {
            return Err(CatalogError::MissingSlot {
                template: id.clone(),
                param: param.to_string(),
            });
        }
    }

    for slot in &skeleton_slots {
        let is_declared = slot
            .parse::<ParamName>()
            .map(|p| declared.contains(&p))
            .unwrap_or(false);
        if *slot != TABLE_SLOT && !is_declared {
            return Err(CatalogError::UndeclaredSlot {
                template: id.clone(),
                slot: slot.to_string(),
            });
        }
    }

    for param in &template.optional_params {
        if !template.defaults.contains_key(param) {
            return Err(CatalogError::MissingDefault {
                template: id.clone(),
                param: param.to_string(),
            });
        }
    }

    for (param, value) in &template.defaults {
        if !template.optional_params.contains(param) {
            return Err(CatalogError::UnexpectedDefault {
                template: id.clone(),
                param: param.to_string(),
            });
        }
        if value.param() != *param {
            return Err(CatalogError::InvalidDefault {
                template: id.clone(),
                param: param.to_string(),
                reason: format!("value is a {}", value.param()),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Comparison;

    fn template(id: &str, skeleton: &str) -> Template {
        Template {
            id: id.to_string(),
            examples: vec![format!("{id} example")],
            sql_skeleton: skeleton.to_string(),
            description: String::new(),
            required_params: Vec::new(),
            optional_params: Vec::new(),
            defaults: BTreeMap::new(),
        }
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::load().expect("built-in catalog must be valid");
        assert_eq!(catalog.len(), 16);
        let threshold = catalog.get("mrr_threshold").unwrap();
        assert_eq!(threshold.required_params, vec![ParamName::Amount]);
        assert_eq!(
            threshold.defaults.get(&ParamName::Comparison),
            Some(&ParamValue::Comparison(Comparison::Greater))
        );
        assert_eq!(catalog.example_queries()[0], "how many customers");
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = Catalog::new(vec![
            template("a", "SELECT 1"),
            template("a", "SELECT 2"),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn test_rejects_declared_param_without_slot() {
        let mut t = template("filter", "SELECT * FROM `{table_ref}`");
        t.required_params = vec![ParamName::Amount];
        let err = Catalog::new(vec![t]).unwrap_err();
        assert!(matches!(err, CatalogError::MissingSlot { param, .. } if param == "amount"));
    }

    #[test]
    fn test_rejects_undeclared_slot() {
        let t = template("filter", "SELECT * FROM `{table_ref}` WHERE x > {amount}");
        let err = Catalog::new(vec![t]).unwrap_err();
        assert!(matches!(err, CatalogError::UndeclaredSlot { slot, .. } if slot == "amount"));
    }

    #[test]
    fn test_rejects_optional_without_default() {
        let mut t = template("filter", "SELECT * WHERE x {comparison} 1");
        t.optional_params = vec![ParamName::Comparison];
        let err = Catalog::new(vec![t]).unwrap_err();
        assert!(matches!(err, CatalogError::MissingDefault { .. }));
    }

    #[test]
    fn test_rejects_empty_examples() {
        let mut t = template("bare", "SELECT 1");
        t.examples.clear();
        assert!(matches!(
            Catalog::new(vec![t]).unwrap_err(),
            CatalogError::NoExamples(_)
        ));
    }

    #[test]
    fn test_yaml_default_must_parse() {
        let yaml = r#"
templates:
  - id: filter
    examples: [customers above]
    sql_skeleton: "SELECT * FROM `{table_ref}` WHERE mrr {comparison} {amount}"
    required_params: [amount]
    optional_params: [comparison]
    defaults:
      comparison: sideways
"#;
        let err = Catalog::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDefault { param, .. } if param == "comparison"));
    }

    #[test]
    fn test_yaml_unknown_param_is_rejected() {
        let yaml = r#"
templates:
  - id: filter
    examples: [customers above]
    sql_skeleton: "SELECT {region}"
    required_params: [region]
"#;
        assert!(matches!(
            Catalog::from_yaml_str(yaml).unwrap_err(),
            CatalogError::Parse(_)
        ));
    }
}
