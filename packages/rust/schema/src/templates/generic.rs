use serde_json::{Map, Value, json};

use aidata_shared::{Category, ContentRecord};

use super::{ObjectBuilder, RequiredField, SchemaTemplate, typed_node};
use crate::EmitContext;

/// Catch-all for listing-style categories (products, awards, press, case studies).
///
/// Maps the common columns onto schema.org properties and carries every other
/// extra column through as an `additionalProperty` entry.
pub struct GenericTemplate {
    category: Category,
    schema_type: &'static str,
}

const REQUIRED: &[RequiredField] = &[RequiredField {
    name: "name",
    pointer: "/name",
}];

const URL_FIELDS: &[&str] = &["url", "website", "link"];
const IMAGE_FIELDS: &[&str] = &["image", "image_url", "logo"];
const DATE_FIELDS: &[&str] = &["date_published", "published", "date", "year"];
const PUBLISHER_FIELDS: &[&str] = &["outlet", "publication", "publisher", "source"];
const ISSUER_FIELDS: &[&str] = &["issuer", "awarded_by", "organization"];
const PRICE_FIELDS: &[&str] = &["price", "price_range"];

/// Columns with a dedicated property, or consumed elsewhere in the pipeline.
const CONSUMED: &[&[&str]] = &[
    URL_FIELDS,
    IMAGE_FIELDS,
    DATE_FIELDS,
    PUBLISHER_FIELDS,
    ISSUER_FIELDS,
    PRICE_FIELDS,
    &["slug"],
];

impl GenericTemplate {
    pub fn product() -> Self {
        Self {
            category: Category::Product,
            schema_type: "Product",
        }
    }

    pub fn award() -> Self {
        Self {
            category: Category::Award,
            schema_type: "CreativeWork",
        }
    }

    pub fn press_mention() -> Self {
        Self {
            category: Category::PressMention,
            schema_type: "NewsArticle",
        }
    }

    pub fn case_study() -> Self {
        Self {
            category: Category::CaseStudy,
            schema_type: "CreativeWork",
        }
    }
}

impl SchemaTemplate for GenericTemplate {
    fn category(&self) -> Category {
        self.category
    }

    fn schema_type(&self, _ctx: &EmitContext) -> String {
        self.schema_type.into()
    }

    fn required_fields(&self) -> &'static [RequiredField] {
        REQUIRED
    }

    fn build(&self, record: &ContentRecord, ctx: &EmitContext) -> Map<String, Value> {
        let mut builder = ObjectBuilder::new()
            .text("name", &record.title)
            .text("description", &record.body)
            .opt_text("url", record.field(URL_FIELDS))
            .opt_text("image", record.field(IMAGE_FIELDS))
            .opt_text("datePublished", record.field(DATE_FIELDS));

        builder = match self.category {
            Category::PressMention => builder
                .text("headline", &record.title)
                .opt_value(
                    "publisher",
                    record
                        .field(PUBLISHER_FIELDS)
                        .map(|name| typed_node("Organization", name)),
                )
                .value("about", ctx.organization.to_node()),
            Category::Award => builder
                .opt_value(
                    "creator",
                    record
                        .field(ISSUER_FIELDS)
                        .map(|name| typed_node("Organization", name)),
                )
                .value("about", ctx.organization.to_node()),
            Category::Product => builder
                .value("brand", ctx.organization.to_node())
                .opt_value(
                    "offers",
                    record.field(PRICE_FIELDS).map(|price| {
                        json!({ "@type": "Offer", "description": price })
                    }),
                ),
            _ => builder.value("creator", ctx.organization.to_node()),
        };

        builder
            .opt_value("additionalProperty", additional_properties(record))
            .keywords(&record.tags)
            .build()
    }
}

/// Remaining extra columns as `PropertyValue`s, in column-name order.
fn additional_properties(record: &ContentRecord) -> Option<Value> {
    let values: Vec<Value> = record
        .fields
        .iter()
        .filter(|(key, _)| !CONSUMED.iter().any(|group| group.contains(&key.as_str())))
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| {
            json!({ "@type": "PropertyValue", "name": key, "value": value.trim() })
        })
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(Value::Array(values))
    }
}
