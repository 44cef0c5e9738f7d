use serde_json::{Map, Value, json};

use aidata_shared::{Category, ContentRecord};

use super::{ObjectBuilder, RequiredField, SchemaTemplate, typed_node};
use crate::EmitContext;

/// Customer reviews → `Review` of the site organization.
pub struct TestimonialTemplate;

const REQUIRED: &[RequiredField] = &[
    RequiredField {
        name: "reviewBody",
        pointer: "/reviewBody",
    },
    RequiredField {
        name: "author",
        pointer: "/author/name",
    },
];

const AUTHOR_FIELDS: &[&str] = &["author", "reviewer", "client", "client_name", "name"];

impl SchemaTemplate for TestimonialTemplate {
    fn category(&self) -> Category {
        Category::Testimonial
    }

    fn schema_type(&self, _ctx: &EmitContext) -> String {
        "Review".into()
    }

    fn required_fields(&self) -> &'static [RequiredField] {
        REQUIRED
    }

    fn build(&self, record: &ContentRecord, ctx: &EmitContext) -> Map<String, Value> {
        let author = record
            .field(AUTHOR_FIELDS)
            .unwrap_or(record.title.as_str())
            .trim();
        let rating = record
            .field(&["rating", "stars"])
            .and_then(|r| r.parse::<f64>().ok())
            .map(|value| json!({ "@type": "Rating", "ratingValue": value, "bestRating": 5 }));

        let mut builder = ObjectBuilder::new();
        if !author.is_empty() {
            builder = builder.value("author", typed_node("Person", author));
        }
        builder
            .text("name", &record.title)
            .text("reviewBody", &record.body)
            .opt_value("reviewRating", rating)
            .opt_text("datePublished", record.field(&["date", "date_published"]))
            .value("itemReviewed", ctx.organization.to_node())
            .build()
    }
}
