//! Input data model.
//!
//! These types mirror the JSON produced by the per-type data formatters.
//! Deserialization is lenient where the formatters are known to be sloppy:
//! `summary`/`detailed` that are not lists become empty, non-object rows are
//! dropped and a null `metadata` becomes the default.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing value
    Null,
    /// Boolean flag
    Bool(bool),
    /// Whole number
    Integer(i64),
    /// Fractional number
    Float(f64),
    /// Free text
    Text(String),
    /// Anything else (nested arrays or objects), shown as compact JSON
    Other(serde_json::Value),
}

impl CellValue {
    /// Numeric value of the cell.
    ///
    /// Text is parsed leniently: a leading number is read and anything that
    /// does not start with one is 0. `Null` has no value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            CellValue::Text(s) => Some(parse_leading_number(s)),
            CellValue::Other(_) => Some(0.0),
        }
    }

    /// Whether the cell holds nothing.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", format_number(*v)),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

/// Format a number the way a script runtime prints it: integral values
/// without a fractional part, everything else in shortest form.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Read the numeric prefix of `s` (after leading whitespace); 0 when absent.
pub fn parse_leading_number(s: &str) -> f64 {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, ch) in s.char_indices() {
        match ch {
            '+' | '-' if i == 0 => {},
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + ch.len_utf8();
    }
    if !seen_digit {
        return 0.0;
    }
    s[..end].parse().unwrap_or(0.0)
}

/// One table row; column order is the insertion order of the keys.
pub type Row = IndexMap<String, CellValue>;

/// Result kinds a unit can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideType {
    /// Single-choice poll
    MultipleChoice,
    /// Pick an answer
    PickAnswer,
    /// Word cloud
    WordCloud,
    /// Free text
    OpenEnded,
    /// Typed answer
    TypeAnswer,
    /// Rating scales
    Scales,
    /// Ranking
    Ranking,
    /// 100-points allocation
    HundredPoints,
    /// 2x2 grid
    #[serde(rename = "2x2_grid")]
    TwoByTwoGrid,
    /// Pin on image
    PinOnImage,
    /// Guess a number
    GuessNumber,
    /// Quiz question
    Quiz,
    /// Audience questions
    Qna,
    /// Quiz leaderboard
    Leaderboard,
    /// Join instructions
    Instruction,
    /// Whiteboard
    Miro,
    /// Any tag this crate does not know
    #[default]
    #[serde(other)]
    Unknown,
}

impl SlideType {
    /// Wire tag of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            SlideType::MultipleChoice => "multiple_choice",
            SlideType::PickAnswer => "pick_answer",
            SlideType::WordCloud => "word_cloud",
            SlideType::OpenEnded => "open_ended",
            SlideType::TypeAnswer => "type_answer",
            SlideType::Scales => "scales",
            SlideType::Ranking => "ranking",
            SlideType::HundredPoints => "hundred_points",
            SlideType::TwoByTwoGrid => "2x2_grid",
            SlideType::PinOnImage => "pin_on_image",
            SlideType::GuessNumber => "guess_number",
            SlideType::Quiz => "quiz",
            SlideType::Qna => "qna",
            SlideType::Leaderboard => "leaderboard",
            SlideType::Instruction => "instruction",
            SlideType::Miro => "miro",
            SlideType::Unknown => "unknown",
        }
    }

    /// Header badge: the tag with underscores as spaces, upper-cased.
    pub fn badge(self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }

    /// Whether units of this type carry a joinable access code.
    pub fn carries_join_code(self) -> bool {
        self == SlideType::Instruction
    }
}

impl fmt::Display for SlideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-unit metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlideMetadata {
    /// Number of responses collected
    #[serde(deserialize_with = "lenient_count")]
    pub total_responses: u64,
    /// Join code of the presentation
    pub access_code: Option<String>,
    /// Text of the correct quiz option
    pub correct_option: Option<String>,
    /// Type-specific extras
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// Formatted results of one slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormattedSlideData {
    /// Question text
    pub question: String,
    /// Export timestamp, preformatted
    pub timestamp: String,
    /// Result kind
    pub slide_type: SlideType,
    /// Aggregated rows
    #[serde(deserialize_with = "lenient_rows")]
    pub summary: Vec<Row>,
    /// Per-response rows
    #[serde(deserialize_with = "lenient_rows")]
    pub detailed: Vec<Row>,
    /// Counts and type-specific values
    #[serde(deserialize_with = "lenient_metadata")]
    pub metadata: SlideMetadata,
}

impl FormattedSlideData {
    /// Create empty data of the given type.
    pub fn new(slide_type: SlideType, question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            slide_type,
            ..Self::default()
        }
    }

    /// Set the summary rows.
    pub fn with_summary(mut self, rows: Vec<Row>) -> Self {
        self.summary = rows;
        self
    }

    /// Set the detailed rows.
    pub fn with_detailed(mut self, rows: Vec<Row>) -> Self {
        self.detailed = rows;
        self
    }

    /// Set the response count.
    pub fn with_total_responses(mut self, total: u64) -> Self {
        self.metadata.total_responses = total;
        self
    }

    /// Set the export timestamp.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// Set the access code.
    pub fn with_access_code(mut self, code: impl Into<String>) -> Self {
        self.metadata.access_code = Some(code.into());
        self
    }

    /// Set the correct quiz option.
    pub fn with_correct_option(mut self, option: impl Into<String>) -> Self {
        self.metadata.correct_option = Some(option.into());
        self
    }
}

/// One unit of a report request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportUnit {
    /// Position of the slide in its presentation (0-based)
    #[serde(default)]
    pub slide_index: Option<usize>,
    /// Identifier of the slide
    #[serde(default)]
    pub slide_id: Option<String>,
    /// For leaderboards: the quiz they rank
    #[serde(default)]
    pub linked_quiz_id: Option<String>,
    /// Formatted results
    pub data: FormattedSlideData,
}

impl ReportUnit {
    /// Wrap formatted data without identifiers.
    pub fn new(data: FormattedSlideData) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }
}

/// A full export request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRequest {
    /// Presentation title
    pub title: String,
    /// File name without extension
    pub output_name: Option<String>,
    /// Units in presentation order
    pub units: Vec<ReportUnit>,
}

impl ReportRequest {
    /// Parse a request from JSON.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Output file name with the `.pdf` extension.
    pub fn file_name(&self) -> String {
        let stem = self
            .output_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("export");
        format!("{}.pdf", stem)
    }
}

fn lenient_rows<'de, D>(deserializer: D) -> Result<Vec<Row>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| serde_json::from_value(v).map(|cell| (k, cell)))
                .collect::<Result<Row, _>>()
                .ok(),
            _ => None,
        })
        .collect())
}

fn lenient_metadata<'de, D>(deserializer: D) -> Result<SlideMetadata, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<SlideMetadata>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        serde_json::Value::String(s) => parse_leading_number(&s).max(0.0) as u64,
        _ => 0,
    })
}

/// Build a row from `(column, value)` pairs, keeping their order.
#[macro_export]
macro_rules! row {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut row = $crate::report::Row::new();
        $(row.insert(String::from($key), $crate::report::CellValue::from($value));)*
        row
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Integer(0).to_string(), "0");
        assert_eq!(CellValue::Float(3.0).to_string(), "3");
        assert_eq!(CellValue::Float(2.25).to_string(), "2.25");
        assert_eq!(CellValue::Text("Red".into()).to_string(), "Red");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_cell_as_f64() {
        assert_eq!(CellValue::Integer(7).as_f64(), Some(7.0));
        assert_eq!(CellValue::from("3.5 pts").as_f64(), Some(3.5));
        assert_eq!(CellValue::from("n/a").as_f64(), Some(0.0));
        assert_eq!(CellValue::Null.as_f64(), None);
    }

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("  42abc"), 42.0);
        assert_eq!(parse_leading_number("-1.5"), -1.5);
        assert_eq!(parse_leading_number("1.2.3"), 1.2);
        assert_eq!(parse_leading_number("-"), 0.0);
        assert_eq!(parse_leading_number(""), 0.0);
    }

    #[test]
    fn test_slide_type_tags() {
        let t: SlideType = serde_json::from_str("\"2x2_grid\"").unwrap();
        assert_eq!(t, SlideType::TwoByTwoGrid);
        let t: SlideType = serde_json::from_str("\"brand_new_type\"").unwrap();
        assert_eq!(t, SlideType::Unknown);
        assert_eq!(SlideType::MultipleChoice.badge(), "MULTIPLE CHOICE");
        assert_eq!(SlideType::HundredPoints.to_string(), "hundred_points");
    }

    #[test]
    fn test_lenient_deserialization() {
        let json = r#"{
            "question": "Favourite colour?",
            "slideType": "multiple_choice",
            "summary": [{"Option": "Red", "Votes": 3}, "garbage", {"Option": "Blue", "Votes": 7}],
            "detailed": null,
            "metadata": null
        }"#;
        let data: FormattedSlideData = serde_json::from_str(json).unwrap();
        assert_eq!(data.summary.len(), 2);
        assert!(data.detailed.is_empty());
        assert_eq!(data.metadata, SlideMetadata::default());
        let keys: Vec<&str> = data.summary[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Option", "Votes"]);
    }

    #[test]
    fn test_rows_keep_input_column_order() {
        let json = r#"{
            "slideType": "open_ended",
            "detailed": [{"Participant Name": "Ann", "Response": "hi", "Participant ID": "x"}]
        }"#;
        let data: FormattedSlideData = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = data.detailed[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Participant Name", "Response", "Participant ID"]);
    }

    #[test]
    fn test_metadata_fields() {
        let json = r#"{"totalResponses": "12", "accessCode": "ABC123", "correctOption": "Paris", "maxValue": 5}"#;
        let meta: SlideMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.total_responses, 12);
        assert_eq!(meta.access_code.as_deref(), Some("ABC123"));
        assert_eq!(meta.correct_option.as_deref(), Some("Paris"));
        assert_eq!(meta.extra.get("maxValue"), Some(&serde_json::json!(5)));
    }

    #[test]
    fn test_request_file_name() {
        let mut request = ReportRequest::default();
        assert_eq!(request.file_name(), "export.pdf");
        request.output_name = Some("q3-results".into());
        assert_eq!(request.file_name(), "q3-results.pdf");
    }

    #[test]
    fn test_row_macro_keeps_order() {
        let row = crate::row! { "Option" => "Red", "Votes" => 3i64 };
        let keys: Vec<&String> = row.keys().collect();
        assert_eq!(keys, vec!["Option", "Votes"]);
        assert_eq!(row["Votes"], CellValue::Integer(3));
    }
}
