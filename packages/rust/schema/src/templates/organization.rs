use serde_json::{Map, Value};

use aidata_shared::{Category, ContentRecord};

use super::{ObjectBuilder, RequiredField, SchemaTemplate};
use crate::EmitContext;

/// The business itself → the configured organization type.
pub struct OrganizationTemplate;

const REQUIRED: &[RequiredField] = &[RequiredField {
    name: "name",
    pointer: "/name",
}];

const PROFILE_FIELDS: &[&str] = &[
    "facebook_url",
    "instagram_url",
    "linkedin_url",
    "twitter_url",
    "x_url",
    "youtube_url",
    "houzz_url",
    "yelp_url",
    "google_business_url",
];

impl SchemaTemplate for OrganizationTemplate {
    fn category(&self) -> Category {
        Category::Organization
    }

    fn schema_type(&self, ctx: &EmitContext) -> String {
        ctx.organization.schema_type.clone()
    }

    fn required_fields(&self) -> &'static [RequiredField] {
        REQUIRED
    }

    fn build(&self, record: &ContentRecord, ctx: &EmitContext) -> Map<String, Value> {
        let site = &ctx.site;
        let name = if record.title.trim().is_empty() {
            site.name.as_str()
        } else {
            record.title.as_str()
        };
        let description = if record.body.trim().is_empty() {
            site.description.as_deref()
        } else {
            Some(record.body.as_str())
        };

        ObjectBuilder::new()
            .text("name", name)
            .opt_text("legalName", record.field(&["legal_name"]))
            .opt_text("description", description)
            .opt_text(
                "url",
                record
                    .field(&["url", "website", "main_website_url"])
                    .or(site.url.as_deref()),
            )
            .opt_text(
                "logo",
                record.field(&["logo", "logo_url"]).or(site.logo.as_deref()),
            )
            .opt_text(
                "telephone",
                record
                    .field(&["phone", "telephone"])
                    .or(site.telephone.as_deref()),
            )
            .opt_text("email", record.field(&["email"]).or(site.email.as_deref()))
            .opt_text("foundingDate", record.field(&["founded", "founding_date", "year_founded"]))
            .opt_text("areaServed", record.field(&["area_served", "service_area"]))
            .opt_value("sameAs", same_as(record))
            .keywords(&record.tags)
            .build()
    }
}

/// Social and directory profiles, plus `other_profiles` split on `|` or `,`.
fn same_as(record: &ContentRecord) -> Option<Value> {
    let mut links: Vec<Value> = PROFILE_FIELDS
        .iter()
        .filter_map(|key| record.field(&[*key]))
        .map(|url| Value::String(url.to_string()))
        .collect();

    if let Some(other) = record.field(&["other_profiles", "same_as"]) {
        links.extend(
            other
                .split(['|', ','])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string())),
        );
    }

    (!links.is_empty()).then_some(Value::Array(links))
}
