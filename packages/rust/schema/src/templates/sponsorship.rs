use serde_json::{Map, Value, json};

use aidata_shared::{Category, ContentRecord};

use super::{ObjectBuilder, RequiredField, SchemaTemplate};
use crate::EmitContext;

/// Community sponsorships → the sponsored `Organization`, sponsored by the site.
///
/// When the row says when the sponsorship began, `sponsor` becomes a schema.org
/// `Role` wrapping the site organization with a `startDate`.
pub struct SponsorshipTemplate;

const REQUIRED: &[RequiredField] = &[RequiredField {
    name: "name",
    pointer: "/name",
}];

impl SchemaTemplate for SponsorshipTemplate {
    fn category(&self) -> Category {
        Category::Sponsorship
    }

    fn schema_type(&self, _ctx: &EmitContext) -> String {
        "Organization".into()
    }

    fn required_fields(&self) -> &'static [RequiredField] {
        REQUIRED
    }

    fn build(&self, record: &ContentRecord, ctx: &EmitContext) -> Map<String, Value> {
        let name = record
            .field(&["organization", "sponsored_organization", "recipient"])
            .unwrap_or(record.title.as_str());

        ObjectBuilder::new()
            .text("name", name)
            .text("description", &record.body)
            .opt_text("url", record.field(&["url", "website"]))
            .value("sponsor", sponsor_node(record, ctx))
            .keywords(&record.tags)
            .build()
    }
}

fn sponsor_node(record: &ContentRecord, ctx: &EmitContext) -> Value {
    let organization = ctx.organization.to_node();
    match record.field(&["since", "year", "start_date"]) {
        Some(start) => json!({
            "@type": "Role",
            "sponsor": organization,
            "startDate": start,
        }),
        None => organization,
    }
}
