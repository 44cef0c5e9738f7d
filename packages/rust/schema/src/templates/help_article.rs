use serde_json::{Map, Value};

use aidata_shared::{Category, ContentRecord};

use super::{ObjectBuilder, RequiredField, SchemaTemplate};
use crate::EmitContext;

/// Help-center articles → `Article` published by the site organization.
pub struct HelpArticleTemplate;

const REQUIRED: &[RequiredField] = &[
    RequiredField {
        name: "headline",
        pointer: "/headline",
    },
    RequiredField {
        name: "articleBody",
        pointer: "/articleBody",
    },
];

impl SchemaTemplate for HelpArticleTemplate {
    fn category(&self) -> Category {
        Category::HelpArticle
    }

    fn schema_type(&self, _ctx: &EmitContext) -> String {
        "Article".into()
    }

    fn required_fields(&self) -> &'static [RequiredField] {
        REQUIRED
    }

    fn build(&self, record: &ContentRecord, ctx: &EmitContext) -> Map<String, Value> {
        ObjectBuilder::new()
            .text("headline", &record.title)
            .opt_text("description", record.field(&["summary", "excerpt", "description"]))
            .text("articleBody", &record.body)
            .opt_text(
                "datePublished",
                record.field(&["date_published", "published", "date"]),
            )
            .opt_text("dateModified", record.field(&["date_modified", "updated"]))
            .opt_text("articleSection", record.field(&["section_name", "topic"]))
            .value("publisher", ctx.organization.to_node())
            .keywords(&record.tags)
            .build()
    }
}
