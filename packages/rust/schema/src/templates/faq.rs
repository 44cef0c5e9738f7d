use serde_json::{Map, Value, json};

use aidata_shared::{Category, ContentRecord};

use super::{ObjectBuilder, RequiredField, SchemaTemplate};
use crate::EmitContext;

/// Question/answer records → `FAQPage` with a single `Question`.
pub struct FaqTemplate;

const REQUIRED: &[RequiredField] = &[
    RequiredField {
        name: "question",
        pointer: "/mainEntity/0/name",
    },
    RequiredField {
        name: "answer",
        pointer: "/mainEntity/0/acceptedAnswer/text",
    },
];

impl SchemaTemplate for FaqTemplate {
    fn category(&self) -> Category {
        Category::Faq
    }

    fn schema_type(&self, _ctx: &EmitContext) -> String {
        "FAQPage".into()
    }

    fn required_fields(&self) -> &'static [RequiredField] {
        REQUIRED
    }

    fn build(&self, record: &ContentRecord, _ctx: &EmitContext) -> Map<String, Value> {
        let answer = ObjectBuilder::new()
            .value("@type", json!("Answer"))
            .text("text", &record.body)
            .build();
        let question = ObjectBuilder::new()
            .value("@type", json!("Question"))
            .text("name", &record.title)
            .value("acceptedAnswer", Value::Object(answer))
            .build();

        ObjectBuilder::new()
            .value("mainEntity", json!([question]))
            .opt_text("about", record.field(&["topic", "faq_category"]))
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
    fn question_nests_accepted_answer() {
        let record = ContentRecord {
            id: "f1".into(),
            category: RecordCategory::Known(Category::Faq),
            title: "Do you offer warranties?".into(),
            body: "Yes, ten years structural.".into(),
            tags: vec![],
            fields: BTreeMap::new(),
            row: 3,
        };
        let map = FaqTemplate.build(&record, &EmitContext::new(SiteConfig::default()));
        let question = &map["mainEntity"][0];
        assert_eq!(question["@type"], "Question");
        assert_eq!(question["name"], "Do you offer warranties?");
        assert_eq!(question["acceptedAnswer"]["@type"], "Answer");
        assert_eq!(question["acceptedAnswer"]["text"], "Yes, ten years structural.");
        assert!(!map.contains_key("keywords"));
    }
}
