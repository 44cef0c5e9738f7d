use serde_json::{Map, Value};

use aidata_shared::{Category, ContentRecord};

use super::{ObjectBuilder, RequiredField, SchemaTemplate};
use crate::EmitContext;

/// Team members → `Person` working for the site organization.
pub struct PersonTemplate;

const REQUIRED: &[RequiredField] = &[RequiredField {
    name: "name",
    pointer: "/name",
}];

impl SchemaTemplate for PersonTemplate {
    fn category(&self) -> Category {
        Category::Person
    }

    fn schema_type(&self, _ctx: &EmitContext) -> String {
        "Person".into()
    }

    fn required_fields(&self) -> &'static [RequiredField] {
        REQUIRED
    }

    fn build(&self, record: &ContentRecord, ctx: &EmitContext) -> Map<String, Value> {
        ObjectBuilder::new()
            .text("name", &record.title)
            .opt_text(
                "jobTitle",
                record.field(&["role", "job_title", "title", "position"]),
            )
            .text("description", &record.body)
            .opt_text("image", record.field(&["photo", "photo_url", "image", "image_url"]))
            .opt_text("email", record.field(&["email"]))
            .opt_text("telephone", record.field(&["phone", "telephone"]))
            .value("worksFor", ctx.organization.to_node())
            .keywords(&record.tags)
            .build()
    }
}
