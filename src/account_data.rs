//! Boundary between loosely typed provider data and the typed analysis model.
//!
//! Data providers hand over a mapping from category name to a list of source
//! records, where each record's `data` is either a single object or a list of
//! objects. Nothing here ever fails: entries that do not have the expected
//! shape are logged, counted and skipped so the remaining categories can still
//! be scored.

use crate::models::{
    Engagement, FinancialSnapshot, Influence, Interaction, RelationshipStrength, Sourced,
    Stakeholder,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

pub const FINANCIAL: &str = "financial";
pub const INTERACTIONS: &str = "interactions";
pub const STAKEHOLDERS: &str = "stakeholders";
pub const EXTERNAL: &str = "external";
pub const BASIC: &str = "basic";

/// Keys whose string values are collected as an interaction's free text.
const INTERACTION_TEXT_KEYS: [&str; 4] = ["subject", "summary", "notes", "description"];

/// Raw account data as supplied by a data provider.
///
/// Category values are kept as raw JSON so that malformed categories can be
/// skipped during normalization instead of rejecting the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountData(pub BTreeMap<String, Value>);

impl AccountData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a category, builder style.
    pub fn with_category(mut self, name: impl Into<String>, records: Value) -> Self {
        self.0.insert(name.into(), records);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, records: Value) {
        self.0.insert(name.into(), records);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A provider record: a named origin and its payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceRecord {
    #[serde(default = "unknown_source")]
    pub source: String,
    pub data: RecordPayload,
}

fn unknown_source() -> String {
    "unknown".to_string()
}

/// Payload of a source record - can be single object or array
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RecordPayload {
    Many(Vec<Value>),
    Single(Value),
}

impl RecordPayload {
    /// Convert to a vec of items for uniform processing
    pub fn into_items(self) -> Vec<Value> {
        match self {
            RecordPayload::Single(item) => vec![item],
            RecordPayload::Many(items) => items,
        }
    }
}

/// Strongly typed view of an [`AccountData`] bundle.
///
/// A category is `None` when the provider did not supply it (or supplied
/// something that is not a list); `Some(vec![])` means the category was
/// present but held no usable records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountSnapshot {
    pub financial: Option<Vec<Sourced<FinancialSnapshot>>>,
    pub interactions: Option<Vec<Sourced<Interaction>>>,
    pub stakeholders: Option<Vec<Sourced<Stakeholder>>>,
    /// Distinct source tags across every category, sorted.
    pub data_sources: Vec<String>,
    /// Category names present in the raw input, sorted.
    pub categories: Vec<String>,
    /// Number of entries dropped because they were malformed.
    pub skipped: usize,
}

impl AccountSnapshot {
    /// Normalizes raw provider data.
    pub fn from_account_data(data: &AccountData) -> Self {
        let mut snapshot = AccountSnapshot {
            categories: data.0.keys().cloned().collect(),
            ..Default::default()
        };
        let mut sources = BTreeSet::new();

        for (category, value) in &data.0 {
            let Some(records) = source_records(category, value, &mut snapshot.skipped) else {
                continue;
            };

            match category.as_str() {
                FINANCIAL => {
                    let parsed = collect_items(
                        category,
                        records,
                        &mut sources,
                        &mut snapshot.skipped,
                        parse_financial,
                    );
                    snapshot.financial = Some(parsed);
                }
                INTERACTIONS => {
                    let parsed = collect_items(
                        category,
                        records,
                        &mut sources,
                        &mut snapshot.skipped,
                        parse_interaction,
                    );
                    snapshot.interactions = Some(parsed);
                }
                STAKEHOLDERS => {
                    let parsed = collect_items(
                        category,
                        records,
                        &mut sources,
                        &mut snapshot.skipped,
                        parse_stakeholder,
                    );
                    snapshot.stakeholders = Some(parsed);
                }
                _ => {
                    // Other categories (basic, external, ...) only contribute provenance.
                    sources.extend(records.into_iter().map(|r| r.source));
                }
            }
        }

        snapshot.data_sources = sources.into_iter().collect();

        if snapshot.skipped > 0 {
            tracing::warn!(
                "Normalization skipped {} malformed entr{}",
                snapshot.skipped,
                if snapshot.skipped == 1 { "y" } else { "ies" }
            );
        }

        snapshot
    }

    /// The primary financial record: the first one, if any.
    pub fn primary_financial(&self) -> Option<&FinancialSnapshot> {
        self.financial
            .as_ref()
            .and_then(|records| records.first())
            .map(|sourced| &sourced.record)
    }

    /// Whether the provider supplied an interactions category at all.
    pub fn has_interaction_data(&self) -> bool {
        self.interactions.is_some()
    }

    /// All interactions across every interaction source.
    pub fn interactions(&self) -> impl Iterator<Item = &Interaction> {
        self.interactions
            .iter()
            .flatten()
            .map(|sourced| &sourced.record)
    }

    /// All stakeholders across every stakeholder source, with their source tags.
    pub fn stakeholders(&self) -> impl Iterator<Item = &Sourced<Stakeholder>> {
        self.stakeholders.iter().flatten()
    }

    /// Counts interactions dated in `(as_of - from_days_ago, as_of - to_days_ago]`.
    ///
    /// Near the edge of the representable range a start bound that cannot be
    /// computed is left open, and an end bound that cannot be computed counts nothing.
    pub fn interactions_between(
        &self,
        as_of: DateTime<Utc>,
        from_days_ago: i64,
        to_days_ago: i64,
    ) -> usize {
        let Some(end) = days_before(as_of, to_days_ago) else {
            return 0;
        };
        let start = days_before(as_of, from_days_ago);
        self.interactions()
            .filter(|interaction| start.map_or(true, |start| interaction.date > start))
            .filter(|interaction| interaction.date <= end)
            .count()
    }

    /// Counts interactions in the last `days` days, `(as_of - days, as_of]`.
    pub fn interactions_within(&self, as_of: DateTime<Utc>, days: i64) -> usize {
        self.interactions_between(as_of, days, 0)
    }
}

fn days_before(as_of: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(days).and_then(|span| as_of.checked_sub_signed(span))
}

/// Decodes a category value into source records, skipping malformed entries.
fn source_records(category: &str, value: &Value, skipped: &mut usize) -> Option<Vec<SourceRecord>> {
    let Value::Array(entries) = value else {
        tracing::warn!(
            "Category '{}' is not a list of source records, ignoring it",
            category
        );
        *skipped += 1;
        return None;
    };

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match serde_json::from_value::<SourceRecord>(entry.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(
                    "Skipping malformed source record {} in '{}': {}",
                    index,
                    category,
                    e
                );
                *skipped += 1;
            }
        }
    }
    Some(records)
}

fn collect_items<T>(
    category: &str,
    records: Vec<SourceRecord>,
    sources: &mut BTreeSet<String>,
    skipped: &mut usize,
    parse: fn(&Value) -> Result<T, String>,
) -> Vec<Sourced<T>> {
    let mut out = Vec::new();
    for record in records {
        sources.insert(record.source.clone());
        for item in record.data.into_items() {
            match parse(&item) {
                Ok(parsed) => out.push(Sourced::new(record.source.clone(), parsed)),
                Err(reason) => {
                    tracing::warn!(
                        "Skipping {} entry from '{}': {}",
                        category,
                        record.source,
                        reason
                    );
                    *skipped += 1;
                }
            }
        }
    }
    out
}

fn as_object(item: &Value) -> Result<&Map<String, Value>, String> {
    item.as_object()
        .ok_or_else(|| format!("expected an object, found {}", type_name(item)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_financial(item: &Value) -> Result<FinancialSnapshot, String> {
    let obj = as_object(item)?;
    Ok(FinancialSnapshot {
        growth_rate: obj.get("growthRate").and_then(parse_number),
        current_arr: obj.get("currentARR").and_then(parse_number),
        contract_end_date: obj.get("contractEndDate").and_then(parse_timestamp),
        payment_history: string_field(obj, "paymentHistory"),
    })
}

fn parse_interaction(item: &Value) -> Result<Interaction, String> {
    let obj = as_object(item)?;
    let date = obj
        .get("date")
        .and_then(parse_timestamp)
        .ok_or_else(|| "missing or unparseable 'date'".to_string())?;

    let text_parts: Vec<String> = INTERACTION_TEXT_KEYS
        .iter()
        .filter_map(|key| string_field(obj, key))
        .collect();

    Ok(Interaction {
        date,
        kind: string_field(obj, "type").unwrap_or_else(|| "unknown".to_string()),
        text: if text_parts.is_empty() {
            None
        } else {
            Some(text_parts.join(" "))
        },
    })
}

fn parse_stakeholder(item: &Value) -> Result<Stakeholder, String> {
    let obj = as_object(item)?;
    let name = string_field(obj, "name").ok_or_else(|| "missing 'name'".to_string())?;

    let known = [
        "name",
        "role",
        "engagement",
        "lastContact",
        "relationshipStrength",
        "influence",
    ];
    let attributes = obj
        .iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(Stakeholder {
        name,
        role: string_field(obj, "role"),
        engagement: string_field(obj, "engagement").and_then(|s| Engagement::parse(&s)),
        last_contact: obj.get("lastContact").and_then(parse_timestamp),
        relationship_strength: string_field(obj, "relationshipStrength")
            .and_then(|s| RelationshipStrength::parse(&s)),
        influence: string_field(obj, "influence").and_then(|s| Influence::parse(&s)),
        attributes,
    })
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Reads a finite number from a JSON number or numeric string.
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Reads a timestamp from RFC 3339 text, a naive date-time, a plain date
/// (midnight UTC) or epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(naive.and_utc());
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_input_has_no_categories() {
        let snapshot = AccountSnapshot::from_account_data(&AccountData::new());
        assert!(snapshot.financial.is_none());
        assert!(snapshot.interactions.is_none());
        assert!(snapshot.stakeholders.is_none());
        assert!(snapshot.primary_financial().is_none());
        assert_eq!(snapshot.skipped, 0);
    }

    #[test]
    fn test_single_and_batch_payloads() {
        let data = AccountData::new()
            .with_category(
                FINANCIAL,
                json!([{"source": "erp", "data": {"growthRate": 0.12, "currentARR": 500000}}]),
            )
            .with_category(
                STAKEHOLDERS,
                json!([{"source": "crm", "data": [
                    {"name": "Ana", "role": "champion", "engagement": "high"},
                    {"name": "Bo", "role": "technical", "engagement": "low"}
                ]}]),
            );

        let snapshot = AccountSnapshot::from_account_data(&data);
        let financial = snapshot.primary_financial().unwrap();
        assert_eq!(financial.growth_rate, Some(0.12));
        assert_eq!(financial.current_arr, Some(500000.0));
        assert_eq!(snapshot.stakeholders().count(), 2);
        assert_eq!(snapshot.data_sources, vec!["crm", "erp"]);
        assert_eq!(snapshot.categories, vec!["financial", "stakeholders"]);
    }

    #[test]
    fn test_malformed_entries_are_skipped_not_fatal() {
        let data = AccountData::new()
            .with_category(
                INTERACTIONS,
                json!([
                    {"source": "email", "data": [
                        {"date": "2024-02-20T10:00:00Z", "type": "email"},
                        {"type": "call"},
                        "not an object"
                    ]},
                    {"source": "missing_data"}
                ]),
            )
            .with_category(STAKEHOLDERS, json!({"source": "crm"}))
            .with_category(
                FINANCIAL,
                json!([{"source": "erp", "data": {"growthRate": 0.3}}]),
            );

        let snapshot = AccountSnapshot::from_account_data(&data);
        assert_eq!(snapshot.interactions().count(), 1);
        // stakeholders category was not a list, so it counts as absent
        assert!(snapshot.stakeholders.is_none());
        assert_eq!(snapshot.primary_financial().unwrap().growth_rate, Some(0.3));
        assert_eq!(snapshot.skipped, 4);
    }

    #[test]
    fn test_primary_financial_is_first_record() {
        let data = AccountData::new().with_category(
            FINANCIAL,
            json!([
                {"source": "erp", "data": [{"growthRate": 0.05}, {"growthRate": 0.5}]},
                {"source": "billing", "data": {"growthRate": 0.9}}
            ]),
        );
        let snapshot = AccountSnapshot::from_account_data(&data);
        assert_eq!(snapshot.primary_financial().unwrap().growth_rate, Some(0.05));
    }

    #[test]
    fn test_interaction_windows() {
        let now = as_of();
        let data = AccountData::new().with_category(
            INTERACTIONS,
            json!([{"source": "crm", "data": [
                {"date": (now - Duration::days(1)).to_rfc3339(), "type": "call"},
                {"date": (now - Duration::days(30)).to_rfc3339(), "type": "call"},
                {"date": (now - Duration::days(45)).to_rfc3339(), "type": "call"},
                {"date": (now + Duration::days(2)).to_rfc3339(), "type": "call"}
            ]}]),
        );
        let snapshot = AccountSnapshot::from_account_data(&data);
        // Exactly 30 days ago belongs to the prior window; future-dated entries are not counted.
        assert_eq!(snapshot.interactions_within(now, 30), 1);
        assert_eq!(snapshot.interactions_between(now, 60, 30), 2);
    }

    #[test]
    fn test_interaction_windows_at_the_edge_of_time() {
        let earliest = DateTime::<Utc>::MIN_UTC + Duration::days(1);
        let data = AccountData::new().with_category(
            INTERACTIONS,
            json!([{"source": "crm", "data": [
                {"date": earliest.timestamp_millis(), "type": "call"}
            ]}]),
        );
        let snapshot = AccountSnapshot::from_account_data(&data);

        // The start bound falls before the earliest instant and is left open
        assert_eq!(snapshot.interactions_within(earliest, 30), 1);
        // The end bound itself is unrepresentable
        assert_eq!(snapshot.interactions_between(earliest, 60, 30), 0);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp(&json!("2024-06-30")), Some(midnight));
        assert_eq!(parse_timestamp(&json!("2024-06-30T00:00:00Z")), Some(midnight));
        assert_eq!(parse_timestamp(&json!("2024-06-30T00:00:00")), Some(midnight));
        assert_eq!(
            parse_timestamp(&json!(midnight.timestamp_millis())),
            Some(midnight)
        );
        assert_eq!(parse_timestamp(&json!("next tuesday")), None);
        assert_eq!(parse_timestamp(&json!(null)), None);
    }

    #[test]
    fn test_parse_number_accepts_numeric_strings() {
        assert_eq!(parse_number(&json!(0.25)), Some(0.25));
        assert_eq!(parse_number(&json!("0.25")), Some(0.25));
        assert_eq!(parse_number(&json!("n/a")), None);
        assert_eq!(parse_number(&json!(true)), None);
    }

    #[test]
    fn test_stakeholder_keeps_extra_attributes() {
        let data = AccountData::new().with_category(
            STAKEHOLDERS,
            json!([{"source": "linkedin", "data": {
                "name": "Chris", "role": "financial", "title": "CFO",
                "engagement": "HIGH", "influence": "High", "relationshipStrength": "Good",
                "lastContact": "2024-02-01"
            }}]),
        );
        let snapshot = AccountSnapshot::from_account_data(&data);
        let sourced = snapshot.stakeholders().next().unwrap();
        assert_eq!(sourced.source, "linkedin");
        // "HIGH" is not the lowercase engagement label
        assert_eq!(sourced.record.engagement, None);
        assert_eq!(sourced.record.influence, Some(Influence::High));
        assert_eq!(
            sourced.record.relationship_strength,
            Some(RelationshipStrength::Good)
        );
        assert_eq!(sourced.record.attributes.get("title"), Some(&json!("CFO")));
        assert!(sourced.record.attributes.get("name").is_none());
    }
}
