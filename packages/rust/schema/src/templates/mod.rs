//! Field templates: one per category, mapping a record onto a schema.org object.
//!
//! Each template names its `@type` and the fields that must be non-empty in
//! the built object. The registry looks templates up by category.

mod faq;
mod generic;
mod help_article;
mod location;
mod organization;
mod person;
mod service;
mod sponsorship;
mod testimonial;

use std::collections::HashMap;

use serde_json::{Map, Value, json};

use aidata_shared::{Category, ContentRecord};

use crate::EmitContext;

pub use faq::FaqTemplate;
pub use generic::GenericTemplate;
pub use help_article::HelpArticleTemplate;
pub use location::LocationTemplate;
pub use organization::OrganizationTemplate;
pub use person::PersonTemplate;
pub use service::ServiceTemplate;
pub use sponsorship::SponsorshipTemplate;
pub use testimonial::TestimonialTemplate;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A field that must be non-empty in every emitted object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredField {
    /// Name reported in `MissingField` errors.
    pub name: &'static str,
    /// JSON pointer into the built object.
    pub pointer: &'static str,
}

/// Maps records of one category onto a JSON-LD object.
pub trait SchemaTemplate: Send + Sync {
    /// Category this template handles.
    fn category(&self) -> Category;

    /// schema.org `@type` of the emitted object.
    fn schema_type(&self, ctx: &EmitContext) -> String;

    /// Fields that must be non-empty after `build`.
    fn required_fields(&self) -> &'static [RequiredField];

    /// Build the object body (everything except `@context`, `@type`, `identifier`).
    fn build(&self, record: &ContentRecord, ctx: &EmitContext) -> Map<String, Value>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Templates keyed by category.
pub struct TemplateRegistry {
    templates: HashMap<Category, Box<dyn SchemaTemplate>>,
}

impl TemplateRegistry {
    /// Create a registry with every built-in template.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(OrganizationTemplate));
        registry.register(Box::new(ServiceTemplate));
        registry.register(Box::new(FaqTemplate));
        registry.register(Box::new(TestimonialTemplate));
        registry.register(Box::new(PersonTemplate));
        registry.register(Box::new(LocationTemplate));
        registry.register(Box::new(SponsorshipTemplate));
        registry.register(Box::new(HelpArticleTemplate));
        registry.register(Box::new(GenericTemplate::product()));
        registry.register(Box::new(GenericTemplate::award()));
        registry.register(Box::new(GenericTemplate::press_mention()));
        registry.register(Box::new(GenericTemplate::case_study()));
        registry
    }

    /// A registry with no templates.
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Register a template, replacing any previous one for its category.
    pub fn register(&mut self, template: Box<dyn SchemaTemplate>) {
        self.templates.insert(template.category(), template);
    }

    /// Template for `category`, if registered.
    pub fn get(&self, category: Category) -> Option<&dyn SchemaTemplate> {
        self.templates.get(&category).map(|t| t.as_ref())
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Object builder
// ---------------------------------------------------------------------------

/// Small helper for building JSON-LD objects that skips blank values.
#[derive(Debug, Default)]
pub(crate) struct ObjectBuilder {
    map: Map<String, Value>,
}

impl ObjectBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Set a string field; blank text is dropped.
    pub(crate) fn text(mut self, key: &str, value: &str) -> Self {
        let value = value.trim();
        if !value.is_empty() {
            self.map.insert(key.to_string(), Value::String(value.to_string()));
        }
        self
    }

    /// Set a string field from an optional value.
    pub(crate) fn opt_text(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.text(key, v),
            None => self,
        }
    }

    /// Set an arbitrary JSON value.
    pub(crate) fn value(mut self, key: &str, value: Value) -> Self {
        self.map.insert(key.to_string(), value);
        self
    }

    /// Set an optional JSON value.
    pub(crate) fn opt_value(self, key: &str, value: Option<Value>) -> Self {
        match value {
            Some(v) => self.value(key, v),
            None => self,
        }
    }

    /// Set `keywords` from record tags (comma-joined, per schema.org).
    pub(crate) fn keywords(self, tags: &[String]) -> Self {
        if tags.is_empty() {
            return self;
        }
        let joined = tags.join(", ");
        self.text("keywords", &joined)
    }

    pub(crate) fn build(self) -> Map<String, Value> {
        self.map
    }
}

/// A minimal typed node, e.g. `{"@type": "Person", "name": "..."}`.
pub(crate) fn typed_node(schema_type: &str, name: &str) -> Value {
    json!({ "@type": schema_type, "name": name.trim() })
}

/// Whether a value counts as present for required-field checks.
pub(crate) fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_category() {
        let registry = TemplateRegistry::new();
        for category in Category::DISPLAY_ORDER {
            let template = registry.get(category).expect("template registered");
            assert_eq!(template.category(), category);
            assert!(!template.required_fields().is_empty());
        }
    }

    #[test]
    fn empty_registry_has_no_templates() {
        assert!(TemplateRegistry::empty().get(Category::Service).is_none());
    }

    #[test]
    fn builder_skips_blank_text() {
        let map = ObjectBuilder::new()
            .text("name", "  Roofing ")
            .text("description", "   ")
            .opt_text("url", None)
            .keywords(&[])
            .build();
        assert_eq!(map.len(), 1);
        assert_eq!(map["name"], "Roofing");
    }

    #[test]
    fn presence_rules() {
        assert!(!is_present(&json!("")));
        assert!(!is_present(&json!({})));
        assert!(!is_present(&Value::Null));
        assert!(is_present(&json!({"name": "x"})));
        assert!(is_present(&json!(4.5)));
    }
}
