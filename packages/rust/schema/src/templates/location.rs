use serde_json::{Map, Value, json};

use aidata_shared::{Category, ContentRecord};

use super::{ObjectBuilder, RequiredField, SchemaTemplate};
use crate::EmitContext;

/// Offices and service locations → `LocalBusiness` with a `PostalAddress`.
pub struct LocationTemplate;

const REQUIRED: &[RequiredField] = &[
    RequiredField {
        name: "name",
        pointer: "/name",
    },
    RequiredField {
        name: "address",
        pointer: "/address/streetAddress",
    },
];

impl SchemaTemplate for LocationTemplate {
    fn category(&self) -> Category {
        Category::Location
    }

    fn schema_type(&self, _ctx: &EmitContext) -> String {
        "LocalBusiness".into()
    }

    fn required_fields(&self) -> &'static [RequiredField] {
        REQUIRED
    }

    fn build(&self, record: &ContentRecord, ctx: &EmitContext) -> Map<String, Value> {
        let address = ObjectBuilder::new()
            .value("@type", json!("PostalAddress"))
            .opt_text("streetAddress", record.field(&["street_address", "address", "street"]))
            .opt_text("addressLocality", record.field(&["city", "locality"]))
            .opt_text("addressRegion", record.field(&["state", "region"]))
            .opt_text("postalCode", record.field(&["postal_code", "zip", "zip_code"]))
            .opt_text("addressCountry", record.field(&["country"]))
            .build();

        ObjectBuilder::new()
            .text("name", &record.title)
            .text("description", &record.body)
            .value("address", Value::Object(address))
            .opt_value("geo", geo(record))
            .opt_text("telephone", record.field(&["phone", "telephone"]))
            .opt_text("openingHours", record.field(&["hours", "opening_hours"]))
            .opt_text("url", record.field(&["url", "page_url"]))
            .value("parentOrganization", ctx.organization.to_node())
            .keywords(&record.tags)
            .build()
    }
}

/// `GeoCoordinates` when both latitude and longitude parse.
fn geo(record: &ContentRecord) -> Option<Value> {
    let lat = record.field(&["latitude", "lat"])?.parse::<f64>().ok()?;
    let lng = record
        .field(&["longitude", "lng", "lon"])?
        .parse::<f64>()
        .ok()?;
    Some(json!({ "@type": "GeoCoordinates", "latitude": lat, "longitude": lng }))
}
