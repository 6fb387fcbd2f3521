//! The fixed ~50-field company-intelligence schema.
//!
//! Both the selector prompt (C3) and the distiller prompt (C5) enumerate this
//! same field vocabulary — keeping them in sync is a project invariant (see
//! SPEC_FULL.md §9): divergence causes the selector to miss pages that carry
//! information the distiller is asked to fill in. `FIELD_SCHEMA` is the one
//! place that vocabulary is written down; both prompt builders render from it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Scalar,
    List,
}

pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    /// Allowed enum values, or empty for free-form scalars/lists.
    pub enum_values: &'static [&'static str],
    pub description: &'static str,
}

macro_rules! field {
    ($name:expr, scalar, $desc:expr) => {
        FieldSpec {
            name: $name,
            field_type: FieldType::Scalar,
            enum_values: &[],
            description: $desc,
        }
    };
    ($name:expr, scalar, [$($v:expr),+ $(,)?], $desc:expr) => {
        FieldSpec {
            name: $name,
            field_type: FieldType::Scalar,
            enum_values: &[$($v),+],
            description: $desc,
        }
    };
    ($name:expr, list, $desc:expr) => {
        FieldSpec {
            name: $name,
            field_type: FieldType::List,
            enum_values: &[],
            description: $desc,
        }
    };
}

/// The fixed field schema, grouped the way SPEC_FULL.md §3.1 groups it.
/// Operational-metadata fields are filled by the Orchestrator, not the LLM,
/// so they are not listed here — see [`crate::orchestrator`].
pub static FIELD_SCHEMA: &[FieldSpec] = &[
    // Identity
    field!("company_name", scalar, "Company legal or brand name"),
    field!("website", scalar, "Primary company website URL"),
    field!("industry", scalar, "Primary industry or sector"),
    field!("headquarters_location", scalar, "City/region of headquarters"),
    field!(
        "geographic_scope",
        scalar,
        ["local", "regional", "national", "global"],
        "Geographic reach of the business"
    ),
    field!("founding_year", scalar, "Year the company was founded"),
    // Business model
    field!(
        "business_model",
        scalar,
        [
            "b2b", "b2c", "b2b2c", "marketplace", "saas", "services", "ecommerce", "platform",
            "other"
        ],
        "Primary business model"
    ),
    field!("value_proposition", scalar, "Core value proposition"),
    field!("target_market", scalar, "Primary target market"),
    field!(
        "sales_complexity",
        scalar,
        ["simple", "moderate", "complex"],
        "How complex the sales motion is"
    ),
    // Products
    field!("products_services", list, "Main products or services offered"),
    field!("competitive_advantages", list, "Stated competitive advantages"),
    field!("pain_points_solved", list, "Customer pain points the product solves"),
    field!("key_partnerships", list, "Named partner organizations"),
    field!("integrations", list, "Third-party integrations offered"),
    // Stage & metrics
    field!(
        "company_size",
        scalar,
        ["1-10", "11-50", "51-200", "201-1000", "1000+"],
        "Employee count bucket"
    ),
    field!(
        "company_stage",
        scalar,
        ["startup", "growth", "scale", "enterprise"],
        "Lifecycle stage"
    ),
    field!("employee_count", scalar, "Approximate employee count, if stated"),
    field!("funding_stage", scalar, "bootstrap, seed, series_a, etc."),
    field!("total_funding_usd", scalar, "Total funding raised, in USD"),
    field!("is_profitable", scalar, "Whether the company states it is profitable"),
    // People
    field!(
        "leadership_team",
        list,
        "Leadership as \"role: name\" strings"
    ),
    field!("decision_maker_titles", list, "Titles of likely buying decision-makers"),
    field!("company_culture", scalar, "Stated culture or values"),
    // Growth
    field!("growth_rate_percent", scalar, "Stated year-over-year growth percentage"),
    field!("market_share_percent", scalar, "Stated market share percentage"),
    field!("competitors", list, "Named competitors"),
    // Technology
    field!("tech_stack", list, "Named technologies in use"),
    field!(
        "tech_sophistication",
        scalar,
        ["low", "medium", "high"],
        "Overall technical sophistication signal"
    ),
    field!("has_api", scalar, "Whether the company offers an API to customers"),
    field!("has_mobile_app", scalar, "Whether the company has a mobile app"),
    // Recognition
    field!("certifications", list, "Named certifications (SOC2, ISO, ...)"),
    field!("compliance_standards", list, "Named compliance standards"),
    field!("awards", list, "Named awards or recognitions"),
];

/// Operational-metadata fields: rolled up by the Orchestrator after
/// distillation, never asked of the LLM, so they live outside `FIELD_SCHEMA`
/// and are not rendered into either prompt.
pub static OPERATIONAL_METADATA_FIELDS: &[FieldSpec] = &[
    field!("tokens_total", scalar, "Total prompt + completion tokens spent across the invocation"),
    field!("cost_usd_total", scalar, "Total estimated USD cost across the invocation"),
    field!("seconds_total", scalar, "Wall-clock seconds the invocation took"),
    field!("pages_crawled", scalar, "Number of pages successfully extracted"),
    field!("crawl_depth", scalar, "Deepest path segment count among the crawled pages"),
];

/// Render the schema as Markdown bullets for interpolation into a prompt.
pub fn render_schema_markdown() -> String {
    let mut out = String::new();
    for spec in FIELD_SCHEMA {
        let kind = match spec.field_type {
            FieldType::Scalar => "scalar",
            FieldType::List => "list of strings",
        };
        if spec.enum_values.is_empty() {
            out.push_str(&format!(
                "- `{}` ({kind}): {}\n",
                spec.name, spec.description
            ));
        } else {
            out.push_str(&format!(
                "- `{}` ({kind}, one of: {}): {}\n",
                spec.name,
                spec.enum_values.join(", "),
                spec.description
            ));
        }
    }
    out
}

/// One scalar or list value as decoded from the distiller's JSON response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<String>),
}

/// The typed record the distiller fills in. Keys are always a subset of
/// [`FIELD_SCHEMA`]'s names; unknown keys from the LLM are dropped, not kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldRecord {
    #[serde(flatten)]
    pub values: std::collections::BTreeMap<String, FieldValue>,
}

impl FieldRecord {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a record from a raw JSON object, keeping only known schema
    /// fields and coercing each to its declared type. Type-mismatched or
    /// unknown-name entries are dropped (SPEC_FULL.md §4.5 parsing policy).
    pub fn from_json_object(obj: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut values = std::collections::BTreeMap::new();

        for spec in FIELD_SCHEMA {
            let Some(raw) = obj.get(spec.name) else {
                continue;
            };
            if raw.is_null() {
                continue;
            }
            let coerced = match spec.field_type {
                FieldType::List => raw.as_array().map(|arr| {
                    FieldValue::List(
                        arr.iter()
                            .filter_map(|v| v.as_str().map(str::to_string))
                            .collect(),
                    )
                }),
                FieldType::Scalar => {
                    if let Some(s) = raw.as_str() {
                        Some(FieldValue::Text(s.to_string()))
                    } else if let Some(n) = raw.as_f64() {
                        Some(FieldValue::Number(n))
                    } else {
                        raw.as_bool().map(FieldValue::Bool)
                    }
                }
            };
            if let Some(value) = coerced {
                values.insert(spec.name.to_string(), value);
            }
        }

        Self { values }
    }

    /// Fold in the five operational-metadata fields the Orchestrator rolls
    /// up after distillation (SPEC_FULL.md §3.1). Overwrites any prior
    /// values under those keys.
    pub fn set_operational_metadata(
        &mut self,
        tokens_total: u64,
        cost_usd_total: f64,
        seconds_total: f64,
        pages_crawled: usize,
        crawl_depth: usize,
    ) {
        self.values.insert("tokens_total".to_string(), FieldValue::Number(tokens_total as f64));
        self.values.insert("cost_usd_total".to_string(), FieldValue::Number(cost_usd_total));
        self.values.insert("seconds_total".to_string(), FieldValue::Number(seconds_total));
        self.values.insert("pages_crawled".to_string(), FieldValue::Number(pages_crawled as f64));
        self.values.insert("crawl_depth".to_string(), FieldValue::Number(crawl_depth as f64));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_unique_names() {
        let mut names: Vec<&str> = FIELD_SCHEMA.iter().map(|f| f.name).collect();
        let before = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), before, "duplicate field name in FIELD_SCHEMA");
    }

    #[test]
    fn from_json_object_drops_unknown_keys() {
        let raw = serde_json::json!({
            "company_name": "Acme",
            "not_a_real_field": "ignored",
            "tech_stack": ["Rust", "Postgres"],
            "employee_count": null,
        });
        let record = FieldRecord::from_json_object(raw.as_object().unwrap());
        assert_eq!(
            record.get("company_name"),
            Some(&FieldValue::Text("Acme".to_string()))
        );
        assert!(record.get("not_a_real_field").is_none());
        assert!(record.get("employee_count").is_none());
        assert_eq!(
            record.get("tech_stack"),
            Some(&FieldValue::List(vec!["Rust".to_string(), "Postgres".to_string()]))
        );
    }

    #[test]
    fn from_json_object_drops_type_mismatch() {
        let raw = serde_json::json!({
            "company_name": ["should", "be", "scalar"],
            "tech_stack": "should be a list",
        });
        let record = FieldRecord::from_json_object(raw.as_object().unwrap());
        assert!(record.get("company_name").is_none());
        assert!(record.get("tech_stack").is_none());
    }
}
