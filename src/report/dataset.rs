//! Chart datasets derived from summary rows.
//!
//! Extraction reads only `summary`; the same rows always give the same
//! dataset.

use super::chart::ChartDataset;
use super::model::{format_number, parse_leading_number, CellValue, FormattedSlideData, Row, SlideType};
use super::text::shorten_id;
use crate::config::ExportTier;
use crate::surface::Rgb;
use indexmap::IndexMap;

/// Option labels the formatters append as synthetic summary rows.
const SYNTHETIC_MARKERS: [&str; 4] = [
    "--- Summary ---",
    "Total Responses",
    "Correct Answers",
    "Incorrect Answers",
];

const CHOICE_PALETTE: [&str; 6] = ["#3b82f6", "#10b981", "#eab308", "#a855f7", "#ec4899", "#ef4444"];
const WORD_PALETTE: [&str; 5] = ["#10b981", "#3b82f6", "#eab308", "#a855f7", "#ec4899"];
const RANKING_PALETTE: [&str; 5] = ["#ef4444", "#3b82f6", "#7c3aed", "#ec4899", "#f59e0b"];
const SCALES_PALETTE: [&str; 1] = ["#4CAF50"];
const GUESS_PALETTE: [&str; 1] = ["#3b82f6"];

fn palette(hex: &[&str]) -> Vec<Rgb> {
    hex.iter().filter_map(|h| Rgb::from_hex(h)).collect()
}

/// Whether a cell counts as present in the loose sense of the formatters:
/// not null, not zero, not empty text.
fn truthy(cell: &CellValue) -> bool {
    match cell {
        CellValue::Null => false,
        CellValue::Bool(b) => *b,
        CellValue::Integer(i) => *i != 0,
        CellValue::Float(f) => *f != 0.0 && !f.is_nan(),
        CellValue::Text(s) => !s.is_empty(),
        CellValue::Other(_) => true,
    }
}

fn number(cell: Option<&CellValue>) -> f64 {
    cell.and_then(CellValue::as_f64).unwrap_or(0.0)
}

/// `(key, value)` pairs from rows that carry both columns; a repeated key
/// keeps its first position and its last value.
fn keyed_counts(rows: &[Row], key: &str, value: &str, label: impl Fn(String) -> String) -> IndexMap<String, f64> {
    let mut counts = IndexMap::new();
    for row in rows {
        let (Some(k), Some(v)) = (row.get(key), row.get(value)) else {
            continue;
        };
        if k.is_null() {
            continue;
        }
        counts.insert(label(k.to_string()), number(Some(v)));
    }
    counts
}

fn ascending_by_key(counts: IndexMap<String, f64>) -> Vec<(String, f64)> {
    let mut entries: Vec<(String, f64)> = counts.into_iter().collect();
    entries.sort_by(|a, b| parse_leading_number(&a.0).total_cmp(&parse_leading_number(&b.0)));
    entries
}

fn descending_by_value(counts: IndexMap<String, f64>, limit: usize) -> Vec<(String, f64)> {
    let mut entries: Vec<(String, f64)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries.truncate(limit);
    entries
}

fn item_label(row: &Row) -> String {
    match row.get("Item") {
        Some(cell) if truthy(cell) => shorten_id(&cell.to_string(), 15),
        _ => "N/A".to_string(),
    }
}

fn choice_dataset(data: &FormattedSlideData) -> ChartDataset {
    let counts = keyed_counts(&data.summary, "Option", "Votes", |label| shorten_id(&label, 20));
    let pairs: Vec<(String, f64)> = counts
        .into_iter()
        .filter(|(label, _)| !SYNTHETIC_MARKERS.iter().any(|m| label.contains(m)))
        .collect();
    let mut dataset = ChartDataset::from_pairs(pairs).with_palette(palette(&CHOICE_PALETTE));

    if data.slide_type == SlideType::Quiz {
        if let Some(correct) = data.metadata.correct_option.as_deref().filter(|c| !c.is_empty()) {
            let short = shorten_id(correct, 20);
            if let Some(index) = dataset
                .labels()
                .iter()
                .position(|l| *l == short || l.contains(correct))
            {
                dataset = dataset.with_highlight(index);
            }
        }
    }
    dataset
}

fn qna_dataset(rows: &[Row]) -> ChartDataset {
    let mut votes = IndexMap::new();
    for (index, row) in rows.iter().enumerate() {
        if let Some(cell) = row.get("Votes") {
            votes.insert(format!("Q{}", index + 1), number(Some(cell)));
        }
    }
    ChartDataset::from_pairs(descending_by_value(votes, 10)).with_palette(palette(&WORD_PALETTE))
}

fn leaderboard_dataset(rows: &[Row]) -> ChartDataset {
    let pairs = rows.iter().take(10).enumerate().map(|(index, row)| {
        let score = ["Score", "Points", "Total Score"]
            .iter()
            .filter_map(|key| row.get(*key))
            .find(|cell| truthy(cell));
        (format!("Position {}", index + 1), number(score))
    });
    ChartDataset::from_pairs(pairs).with_palette(palette(&RANKING_PALETTE))
}

/// Chart dataset for a unit, or an empty dataset when its type has no chart.
pub fn extract_dataset(data: &FormattedSlideData, tier: ExportTier) -> ChartDataset {
    let rows = &data.summary;
    let dataset = match data.slide_type {
        SlideType::Quiz | SlideType::PickAnswer | SlideType::MultipleChoice => choice_dataset(data),
        SlideType::WordCloud => {
            let limit = match tier {
                ExportTier::Full => 10,
                ExportTier::ChartOnly => 15,
            };
            let counts = keyed_counts(rows, "Word", "Frequency", |w| w);
            let pairs = descending_by_value(counts, limit)
                .into_iter()
                .map(|(word, freq)| (shorten_id(&word, 15), freq));
            ChartDataset::from_pairs(pairs).with_palette(palette(&WORD_PALETTE))
        },
        SlideType::Scales => {
            let counts = keyed_counts(rows, "Rating Value", "Count", |v| v);
            ChartDataset::from_pairs(ascending_by_key(counts)).with_palette(palette(&SCALES_PALETTE))
        },
        SlideType::Ranking => {
            let pairs = rows
                .iter()
                .take(10)
                .map(|row| (item_label(row), number(row.get("Score"))));
            ChartDataset::from_pairs(pairs).with_palette(palette(&RANKING_PALETTE))
        },
        SlideType::HundredPoints => {
            let pairs = rows
                .iter()
                .map(|row| (item_label(row), number(row.get("Average Points"))));
            ChartDataset::from_pairs(pairs).with_palette(palette(&RANKING_PALETTE))
        },
        SlideType::GuessNumber => {
            let counts = keyed_counts(rows, "Guess", "Count", |g| g);
            ChartDataset::from_pairs(ascending_by_key(counts)).with_palette(palette(&GUESS_PALETTE))
        },
        SlideType::Qna if tier == ExportTier::ChartOnly => qna_dataset(rows),
        SlideType::Leaderboard if tier == ExportTier::ChartOnly => leaderboard_dataset(rows),
        SlideType::Qna
        | SlideType::Leaderboard
        | SlideType::OpenEnded
        | SlideType::TypeAnswer
        | SlideType::TwoByTwoGrid
        | SlideType::PinOnImage
        | SlideType::Instruction
        | SlideType::Miro
        | SlideType::Unknown => ChartDataset::default(),
    };
    log::debug!("{} dataset: {} bars", data.slide_type, dataset.len());
    dataset
}

/// Heading printed above a unit's chart.
pub fn chart_title(slide_type: SlideType) -> &'static str {
    match slide_type {
        SlideType::MultipleChoice | SlideType::PickAnswer | SlideType::Quiz => "Response Distribution",
        SlideType::WordCloud => "Top Words by Frequency",
        SlideType::Scales => "Rating Distribution",
        SlideType::Ranking => "Top Ranked Items (by Average Score)",
        SlideType::HundredPoints => "Average Points Allocation",
        SlideType::GuessNumber => "Guess Distribution",
        SlideType::Qna => "Top Questions by Votes",
        SlideType::Leaderboard => "Top Participants (Anonymized)",
        SlideType::OpenEnded
        | SlideType::TypeAnswer
        | SlideType::TwoByTwoGrid
        | SlideType::PinOnImage
        | SlideType::Instruction
        | SlideType::Miro
        | SlideType::Unknown => "Response Visualization",
    }
}

/// Extra line printed under the chart in the chart-only tier.
pub fn info_line(data: &FormattedSlideData) -> Option<String> {
    let total = data.metadata.total_responses;
    match data.slide_type {
        SlideType::Quiz => {
            let count_of = |label: &str| {
                data.summary
                    .iter()
                    .filter(|row| matches!(row.get("Option"), Some(CellValue::Text(t)) if t == label))
                    .filter_map(|row| row.get("Votes"))
                    .map(|cell| number(Some(cell)))
                    .last()
                    .unwrap_or(0.0)
            };
            let correct = count_of("Correct Answers");
            let incorrect = count_of("Incorrect Answers");
            (correct > 0.0 || incorrect > 0.0).then(|| {
                format!(
                    "Summary: {} correct, {} incorrect",
                    format_number(correct),
                    format_number(incorrect)
                )
            })
        },
        SlideType::Scales => {
            let entries = ascending_by_key(keyed_counts(&data.summary, "Rating Value", "Count", |v| v));
            let total: f64 = entries.iter().map(|(_, c)| c).sum();
            let weighted: f64 = entries
                .iter()
                .map(|(v, c)| parse_leading_number(v) * c)
                .sum();
            let (max_label, _) = entries.last()?;
            (total > 0.0).then(|| format!("Average Rating: {:.1} / {}", weighted / total, max_label))
        },
        SlideType::Qna => Some("Note: Question text and answers are not included in this summary export.".to_string()),
        SlideType::Leaderboard => Some("Note: Participant names are not included in this summary export.".to_string()),
        SlideType::OpenEnded | SlideType::TypeAnswer => Some(format!(
            "Text responses collected: {}\n\nNote: Individual responses are not included in this summary export.",
            total
        )),
        SlideType::PinOnImage | SlideType::Miro => Some(format!(
            "Interactive responses collected: {}\n\nNote: Spatial and interactive data cannot be shown as a chart.",
            total
        )),
        SlideType::Instruction => data
            .metadata
            .access_code
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(|code| format!("Access Code: {}", code)),
        SlideType::MultipleChoice
        | SlideType::PickAnswer
        | SlideType::WordCloud
        | SlideType::Ranking
        | SlideType::HundredPoints
        | SlideType::TwoByTwoGrid
        | SlideType::GuessNumber
        | SlideType::Unknown => None,
    }
}

/// Whether the info line is a compact single line printed right under the
/// chart rather than a free-standing note.
pub fn is_compact_info(slide_type: SlideType) -> bool {
    matches!(slide_type, SlideType::Quiz | SlideType::Scales)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn data(slide_type: SlideType, summary: Vec<Row>) -> FormattedSlideData {
        FormattedSlideData::new(slide_type, "Q").with_summary(summary)
    }

    #[test]
    fn test_choice_scenario() {
        let d = data(
            SlideType::MultipleChoice,
            vec![row! { "Option" => "Red", "Votes" => 3i64 }, row! { "Option" => "Blue", "Votes" => 7i64 }],
        );
        let dataset = extract_dataset(&d, ExportTier::Full);
        assert_eq!(dataset.labels(), &["Red".to_string(), "Blue".to_string()]);
        assert_eq!(dataset.values(), &[3.0, 7.0]);
    }

    #[test]
    fn test_choice_drops_synthetic_rows_and_merges_duplicates() {
        let d = data(
            SlideType::PickAnswer,
            vec![
                row! { "Option" => "A", "Votes" => 1i64 },
                row! { "Option" => "B", "Votes" => 2i64 },
                row! { "Option" => "A", "Votes" => 5i64 },
                row! { "Option" => "--- Summary ---", "Votes" => "" },
                row! { "Option" => "Total Responses", "Votes" => 8i64 },
                row! { "Votes" => 9i64 },
            ],
        );
        let dataset = extract_dataset(&d, ExportTier::Full);
        assert_eq!(dataset.labels(), &["A".to_string(), "B".to_string()]);
        assert_eq!(dataset.values(), &[5.0, 2.0]);
    }

    #[test]
    fn test_quiz_highlight() {
        let d = data(
            SlideType::Quiz,
            vec![
                row! { "Option" => "London", "Votes" => 1i64 },
                row! { "Option" => "Paris", "Votes" => 4i64 },
                row! { "Option" => "Rome", "Votes" => 0i64 },
            ],
        )
        .with_correct_option("Paris");
        let dataset = extract_dataset(&d, ExportTier::Full);
        assert_eq!(dataset.highlight().iter().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_word_cloud_top_n() {
        let rows: Vec<Row> = (0..20i64).map(|i| row! { "Word" => format!("w{}", i), "Frequency" => i }).collect();
        let d = data(SlideType::WordCloud, rows);
        let full = extract_dataset(&d, ExportTier::Full);
        assert_eq!(full.len(), 10);
        assert_eq!(full.labels()[0], "w19");
        assert_eq!(full.values()[9], 10.0);
        assert_eq!(extract_dataset(&d, ExportTier::ChartOnly).len(), 15);
    }

    #[test]
    fn test_scales_sorted_numerically() {
        let d = data(
            SlideType::Scales,
            vec![
                row! { "Rating Value" => "10", "Count" => 1i64 },
                row! { "Rating Value" => "2", "Count" => 3i64 },
                row! { "Rating Value" => 5i64, "Count" => 2i64 },
            ],
        );
        let dataset = extract_dataset(&d, ExportTier::Full);
        assert_eq!(dataset.labels(), &["2".to_string(), "5".to_string(), "10".to_string()]);
        assert_eq!(info_line(&d).as_deref(), Some("Average Rating: 4.3 / 10"));
    }

    #[test]
    fn test_ranking_takes_first_ten() {
        let rows: Vec<Row> = (0..12i64).map(|i| row! { "Item" => format!("Item {}", i), "Score" => 12 - i }).collect();
        let dataset = extract_dataset(&data(SlideType::Ranking, rows), ExportTier::Full);
        assert_eq!(dataset.len(), 10);
        assert_eq!(dataset.values()[0], 12.0);
    }

    #[test]
    fn test_hundred_points_parses_text() {
        let rows = vec![row! { "Item" => "Budget", "Average Points" => "33.5" }, row! { "Average Points" => 10i64 }];
        let dataset = extract_dataset(&data(SlideType::HundredPoints, rows), ExportTier::Full);
        assert_eq!(dataset.labels(), &["Budget".to_string(), "N/A".to_string()]);
        assert_eq!(dataset.values(), &[33.5, 10.0]);
    }

    #[test]
    fn test_tier_only_types() {
        let rows = vec![row! { "Question" => "Why?", "Votes" => 2i64 }, row! { "Question" => "How?", "Votes" => 5i64 }];
        let qna = data(SlideType::Qna, rows);
        assert!(extract_dataset(&qna, ExportTier::Full).is_empty());
        let chart = extract_dataset(&qna, ExportTier::ChartOnly);
        assert_eq!(chart.labels(), &["Q2".to_string(), "Q1".to_string()]);

        let board = data(
            SlideType::Leaderboard,
            vec![row! { "Name" => "Ann", "Score" => 0i64, "Total Score" => 40i64 }],
        );
        let chart = extract_dataset(&board, ExportTier::ChartOnly);
        assert_eq!(chart.labels(), &["Position 1".to_string()]);
        assert_eq!(chart.values(), &[40.0]);
    }

    #[test]
    fn test_unsupported_types_are_empty() {
        let rows = vec![row! { "Response" => "hello" }];
        assert!(extract_dataset(&data(SlideType::OpenEnded, rows), ExportTier::Full).is_empty());
    }

    #[test]
    fn test_quiz_info_line() {
        let d = data(
            SlideType::Quiz,
            vec![
                row! { "Option" => "Correct Answers", "Votes" => 6i64 },
                row! { "Option" => "Incorrect Answers", "Votes" => 2i64 },
            ],
        );
        assert_eq!(info_line(&d).as_deref(), Some("Summary: 6 correct, 2 incorrect"));
        assert_eq!(info_line(&data(SlideType::Quiz, vec![])), None);
    }

    #[test]
    fn test_chart_titles() {
        assert_eq!(chart_title(SlideType::Quiz), "Response Distribution");
        assert_eq!(chart_title(SlideType::Miro), "Response Visualization");
    }
}
