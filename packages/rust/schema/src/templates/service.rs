use serde_json::{Map, Value, json};

use aidata_shared::{Category, ContentRecord};

use super::{ObjectBuilder, RequiredField, SchemaTemplate};
use crate::EmitContext;

/// Service and practice-area records → `Service`.
pub struct ServiceTemplate;

const REQUIRED: &[RequiredField] = &[
    RequiredField {
        name: "name",
        pointer: "/name",
    },
    RequiredField {
        name: "description",
        pointer: "/description",
    },
];

impl SchemaTemplate for ServiceTemplate {
    fn category(&self) -> Category {
        Category::Service
    }

    fn schema_type(&self, _ctx: &EmitContext) -> String {
        "Service".into()
    }

    fn required_fields(&self) -> &'static [RequiredField] {
        REQUIRED
    }

    fn build(&self, record: &ContentRecord, ctx: &EmitContext) -> Map<String, Value> {
        let offers = record
            .field(&["price_range", "price", "starting_price"])
            .map(|price| json!({ "@type": "Offer", "description": price }));

        ObjectBuilder::new()
            .text("name", &record.title)
            .text("description", &record.body)
            .opt_text("serviceType", record.field(&["service_type", "practice_area"]))
            .opt_text("areaServed", record.field(&["area_served", "service_area"]))
            .opt_text("url", record.field(&["url", "page_url"]))
            .opt_text("image", record.field(&["image", "image_url"]))
            .value("provider", ctx.organization.to_node())
            .opt_value("offers", offers)
            .keywords(&record.tags)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidata_shared::{RecordCategory, SiteConfig};
    use std::collections::BTreeMap;

    #[test]
    fn builds_service_with_offer_and_provider() {
        let mut fields = BTreeMap::new();
        fields.insert("price_range".to_string(), "$$$".to_string());
        fields.insert("area_served".to_string(), "Denver Metro".to_string());
        let record = ContentRecord {
            id: "s1".into(),
            category: RecordCategory::Known(Category::Service),
            title: "Kitchen Remodels".into(),
            body: "Full kitchen renovations.".into(),
            tags: vec!["kitchens".into(), "remodel".into()],
            fields,
            row: 2,
        };
        let ctx = EmitContext::new(SiteConfig {
            name: "Summit".into(),
            ..SiteConfig::default()
        });

        let map = ServiceTemplate.build(&record, &ctx);
        assert_eq!(map["name"], "Kitchen Remodels");
        assert_eq!(map["areaServed"], "Denver Metro");
        assert_eq!(map["offers"]["description"], "$$$");
        assert_eq!(map["provider"]["@type"], "GeneralContractor");
        assert_eq!(map["keywords"], "kitchens, remodel");
    }
}
