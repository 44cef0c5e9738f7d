//! Maps raw tabular rows onto [`ContentRecord`]s.
//!
//! Header names are normalized (trimmed, lowercased, spaces → `_`) and matched
//! against per-category candidate columns. Columns not consumed as id,
//! category, title, body, or tags are carried through in `fields`.

use std::collections::BTreeMap;

use aidata_shared::{AiDataError, Category, ContentRecord, RecordCategory, Result};

/// One source row before mapping: normalized header → non-blank cell value.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawRow {
    /// 1-based position in the source (line for CSV, element for JSON).
    pub row: usize,
    pub cells: BTreeMap<String, String>,
}

impl RawRow {
    pub(crate) fn new(row: usize) -> Self {
        Self {
            row,
            cells: BTreeMap::new(),
        }
    }

    /// Insert a cell, normalizing the header. Blank values and repeated headers are ignored.
    pub(crate) fn insert(&mut self, header: &str, value: &str) {
        let key = normalize_header(header);
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            return;
        }
        self.cells.entry(key).or_insert_with(|| value.to_string());
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.cells.is_empty()
    }

    /// Remove and return the first present column among `keys`.
    fn take_first(&mut self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.cells.remove(*k))
    }
}

/// Normalize a header: trim, lowercase, inner whitespace/dashes → `_`.
pub(crate) fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

// ---------------------------------------------------------------------------
// Column candidates
// ---------------------------------------------------------------------------

const ID_COLUMNS: &[&str] = &[
    "id",
    "record_id",
    "service_id",
    "faq_id",
    "review_id",
    "member_id",
    "location_id",
    "article_id",
    "sponsorship_id",
    "product_id",
    "award_id",
    "press_id",
    "case_id",
];

const FIRST_NAME_COLUMNS: &[&str] = &["first_name", "firstname"];
const LAST_NAME_COLUMNS: &[&str] = &["last_name", "lastname"];

const CATEGORY_COLUMNS: &[&str] = &["category", "type", "content_type", "section"];

const TAG_COLUMNS: &[&str] = &["tags", "keywords"];

fn title_columns(category: Option<Category>) -> &'static [&'static str] {
    match category {
        Some(Category::Organization) => &[
            "business_name",
            "entity_name",
            "company_name",
            "name",
            "title",
        ],
        Some(Category::Service) => &["service_name", "practice_area", "name", "title"],
        Some(Category::Faq) => &["question", "faq_question", "q", "title"],
        Some(Category::Testimonial) => &["review_title", "title", "headline"],
        Some(Category::Person) => &["member_name", "full_name", "name", "title"],
        Some(Category::Location) => &["location_name", "office_name", "name", "title"],
        Some(Category::HelpArticle) => &["title", "article_title", "headline", "name"],
        Some(Category::Product) => &["product_name", "name", "title"],
        Some(Category::Award) => &["award_name", "certification", "name", "title"],
        Some(Category::PressMention) => &["title", "mention_title", "headline", "name"],
        Some(Category::CaseStudy) => &["case_title", "matter", "title", "name", "headline"],
        Some(Category::Sponsorship) | None => &["title", "name", "headline"],
    }
}

fn body_columns(category: Option<Category>) -> &'static [&'static str] {
    match category {
        Some(Category::Organization) => &[
            "long_description",
            "about",
            "description",
            "short_description",
            "body",
        ],
        Some(Category::Faq) => &["answer", "faq_answer", "a", "response", "body", "content"],
        Some(Category::Testimonial) => &[
            "review_body",
            "review",
            "quote",
            "testimonial",
            "body",
            "content",
        ],
        Some(Category::Person) => &["bio", "about", "body", "description", "summary"],
        Some(Category::HelpArticle) => &["article_content", "content", "body", "markdown"],
        Some(Category::Service)
        | Some(Category::Location)
        | Some(Category::Sponsorship)
        | Some(Category::Product)
        | Some(Category::Award)
        | Some(Category::PressMention)
        | Some(Category::CaseStudy)
        | None => &["body", "description", "summary", "details", "content"],
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Map a raw row into a record.
///
/// Fails with `MalformedRecord` when the row has no id, or no category and
/// no file-level default.
pub(crate) fn map_row(
    mut raw: RawRow,
    default_category: Option<Category>,
    origin: &str,
) -> Result<ContentRecord> {
    let row = raw.row;

    let id = raw
        .take_first(ID_COLUMNS)
        .ok_or_else(|| AiDataError::malformed(row, format!("missing id ({origin})")))?;

    let category = match raw.take_first(CATEGORY_COLUMNS) {
        Some(label) => RecordCategory::from_label(&label),
        None => match default_category {
            Some(category) => RecordCategory::Known(category),
            None => {
                return Err(AiDataError::malformed(
                    row,
                    format!("record '{id}' has no category ({origin})"),
                ));
            }
        },
    };

    let known = category.known();
    let mut title = raw.take_first(title_columns(known)).unwrap_or_default();
    if title.is_empty() && known == Some(Category::Person) {
        title = full_name(&mut raw);
    }
    let body = raw.take_first(body_columns(known)).unwrap_or_default();
    let tags = raw
        .take_first(TAG_COLUMNS)
        .map(|t| split_tags(&t))
        .unwrap_or_default();

    Ok(ContentRecord {
        id,
        category,
        title,
        body,
        tags,
        fields: raw.cells,
        row,
    })
}

/// `first_name last_name`, consuming whichever of the two columns exist.
fn full_name(raw: &mut RawRow) -> String {
    [
        raw.take_first(FIRST_NAME_COLUMNS),
        raw.take_first(LAST_NAME_COLUMNS),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Split a tag cell on `|` or `,`, trimming and dropping blanks.
pub(crate) fn split_tags(cell: &str) -> Vec<String> {
    cell.split(['|', ','])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(row: usize, cells: &[(&str, &str)]) -> RawRow {
        let mut r = RawRow::new(row);
        for (h, v) in cells {
            r.insert(h, v);
        }
        r
    }

    #[test]
    fn normalize_header_variants() {
        assert_eq!(normalize_header(" Service Name "), "service_name");
        assert_eq!(normalize_header("Review-Body"), "review_body");
        assert_eq!(normalize_header("ID"), "id");
    }

    #[test]
    fn maps_basic_service_row() {
        let row = raw(
            2,
            &[
                ("id", "1"),
                ("category", "Service"),
                ("title", "Custom Home Building"),
                ("body", "Ground-up builds."),
                ("tags", "homes | new construction"),
                ("price_range", "$$$"),
            ],
        );
        let record = map_row(row, None, "test").expect("map");
        assert_eq!(record.id, "1");
        assert_eq!(record.category, RecordCategory::Known(Category::Service));
        assert_eq!(record.title, "Custom Home Building");
        assert_eq!(record.body, "Ground-up builds.");
        assert_eq!(record.tags, vec!["homes", "new construction"]);
        assert_eq!(record.fields.get("price_range").map(String::as_str), Some("$$$"));
        assert_eq!(record.row, 2);
    }

    #[test]
    fn person_prefers_name_and_keeps_title_as_field() {
        let row = raw(
            3,
            &[
                ("id", "p1"),
                ("category", "Team"),
                ("name", "Jordan Lee"),
                ("title", "Project Manager"),
                ("bio", "Twenty years in the trades."),
            ],
        );
        let record = map_row(row, None, "test").expect("map");
        assert_eq!(record.title, "Jordan Lee");
        assert_eq!(record.body, "Twenty years in the trades.");
        assert_eq!(record.field(&["title"]), Some("Project Manager"));
    }

    #[test]
    fn person_name_from_first_and_last_columns() {
        let row = raw(
            2,
            &[
                ("id", "p1"),
                ("category", "Team"),
                ("First Name", "Jordan"),
                ("Last Name", "Lee"),
                ("bio", "Carpenter."),
            ],
        );
        let record = map_row(row, None, "test").expect("map");
        assert_eq!(record.title, "Jordan Lee");
        assert!(!record.fields.contains_key("first_name"));
        assert!(!record.fields.contains_key("last_name"));

        let row = raw(3, &[("id", "p2"), ("category", "Team"), ("lastname", "Okafor")]);
        assert_eq!(map_row(row, None, "test").expect("map").title, "Okafor");
    }

    #[test]
    fn generic_categories_pick_their_title_columns() {
        let row = raw(
            4,
            &[
                ("press_id", "n1"),
                ("category", "Press/News Mentions"),
                ("mention_title", "Builder of the Year"),
                ("outlet", "Valley Times"),
            ],
        );
        let record = map_row(row, None, "test").expect("map");
        assert_eq!(record.id, "n1");
        assert_eq!(record.category, RecordCategory::Known(Category::PressMention));
        assert_eq!(record.title, "Builder of the Year");
        assert_eq!(record.field(&["outlet"]), Some("Valley Times"));
    }

    #[test]
    fn faq_uses_question_and_answer_columns() {
        let row = raw(
            4,
            &[("id", "f1"), ("question", "Are you licensed?"), ("answer", "Yes.")],
        );
        let record = map_row(row, Some(Category::Faq), "faqs.csv").expect("map");
        assert_eq!(record.title, "Are you licensed?");
        assert_eq!(record.body, "Yes.");
    }

    #[test]
    fn missing_id_is_malformed() {
        let row = raw(5, &[("category", "Service"), ("title", "Roofing")]);
        let err = map_row(row, None, "test").unwrap_err();
        assert!(matches!(err, AiDataError::MalformedRecord { row: 5, .. }));
    }

    #[test]
    fn missing_category_without_default_is_malformed() {
        let row = raw(6, &[("id", "x"), ("title", "Roofing")]);
        let err = map_row(row, None, "test").unwrap_err();
        assert!(err.to_string().contains("no category"));
    }

    #[test]
    fn unknown_category_is_kept() {
        let row = raw(7, &[("id", "u1"), ("category", "Unknown"), ("title", "?")]);
        let record = map_row(row, None, "test").expect("map");
        assert_eq!(record.category, RecordCategory::Unknown("Unknown".into()));
    }

    #[test]
    fn split_tags_handles_both_separators() {
        assert_eq!(split_tags("a, b|c,,"), vec!["a", "b", "c"]);
        assert!(split_tags(" | ").is_empty());
    }
}
