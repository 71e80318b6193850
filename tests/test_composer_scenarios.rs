//! End-to-end composition scenarios against the recording surface.

use chrono::{NaiveDate, NaiveDateTime};
use slide_report::config::{ExportTier, ReportConfig};
use slide_report::report::{
    extract_dataset, FormattedSlideData, PageComposer, ReportUnit, SlideType, UnitStage, CAPTION,
};
use slide_report::row;
use slide_report::surface::{DrawOp, RecordingSurface};

const UUID: &str = "550e8400-e29b-41d4-a716-446655440000";

fn generated_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 20)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .unwrap()
}

fn composer(tier: ExportTier) -> PageComposer {
    PageComposer::new(ReportConfig::new().with_tier(tier)).with_generated_at(generated_at())
}

fn scenario_a() -> FormattedSlideData {
    FormattedSlideData::new(SlideType::MultipleChoice, "Which colour do you prefer?")
        .with_summary(vec![
            row! { "Option" => "Red", "Votes" => 3i64 },
            row! { "Option" => "Blue", "Votes" => 7i64 },
        ])
        .with_total_responses(10)
}

#[test]
fn test_scenario_a_summary_and_chart() {
    let data = scenario_a();
    let dataset = extract_dataset(&data, ExportTier::Full);
    assert_eq!(dataset.labels(), &["Red".to_string(), "Blue".to_string()]);
    assert_eq!(dataset.values(), &[3.0, 7.0]);

    let mut surface = RecordingSurface::a4();
    let summary = composer(ExportTier::Full)
        .compose(&mut surface, "Weekly Poll", &[ReportUnit::new(data)])
        .unwrap();

    let table = summary.units[0].summary.as_ref().unwrap();
    let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Option", "Votes"]);
    assert_eq!(table.row_heights.len(), 2);
    assert_eq!(table.row_extents.len(), 2);
    assert!(surface.has_text("Summary"));
    assert!(surface.has_text("Option"));
    assert!(surface.has_text("Votes"));

    let chart = summary.units[0].chart.as_ref().unwrap();
    assert_eq!(chart.bars.len(), 2);
    assert!(chart.bars[1].height > chart.bars[0].height);
}

#[test]
fn test_scenario_b_empty_summary_is_omitted() {
    let data = FormattedSlideData::new(SlideType::MultipleChoice, "Anything?").with_total_responses(0);
    let mut surface = RecordingSurface::a4();
    let summary = composer(ExportTier::Full)
        .compose(&mut surface, "Weekly Poll", &[ReportUnit::new(data)])
        .unwrap();

    let unit = &summary.units[0];
    assert!(unit.summary.is_none());
    assert!(unit.chart.is_none());
    assert_eq!(
        unit.stages,
        vec![UnitStage::HeaderDrawn, UnitStage::MetadataDrawn, UnitStage::UnitComplete]
    );
    assert!(!surface.has_text("Summary"));
    assert!(surface.has_text("Question:"));
    assert!(surface.has_text("Export Information"));
    assert!(surface.has_text("Total Responses: 0"));
}

#[test]
fn test_scenario_c_identifiers_shortened_everywhere() {
    let data = FormattedSlideData::new(SlideType::OpenEnded, "Say something")
        .with_detailed(vec![
            row! { "Participant ID" => UUID, "Response" => "Hello" },
            row! { "Participant ID" => "short-id", "Response" => "Hi" },
        ])
        .with_total_responses(2);
    let mut surface = RecordingSurface::a4();
    composer(ExportTier::Full)
        .compose(&mut surface, "Weekly Poll", &[ReportUnit::new(data)])
        .unwrap();

    assert!(surface.has_text("550e84...0000"));
    assert!(surface.texts().iter().all(|t| !t.contains(UUID)));
}

#[test]
fn test_composition_is_idempotent() {
    let units = vec![
        ReportUnit::new(scenario_a()),
        ReportUnit::new(
            FormattedSlideData::new(SlideType::WordCloud, "One word")
                .with_summary(vec![
                    row! { "Word" => "fast", "Frequency" => 4i64 },
                    row! { "Word" => "simple", "Frequency" => 9i64 },
                ])
                .with_total_responses(13),
        ),
    ];
    let render = || {
        let mut surface = RecordingSurface::a4();
        let summary = composer(ExportTier::Full)
            .compose(&mut surface, "Weekly Poll", &units)
            .unwrap();
        (summary, surface.ops().to_vec())
    };
    let (first, first_ops) = render();
    let (second, second_ops) = render();
    assert_eq!(first, second);
    assert_eq!(first_ops, second_ops);
}

#[test]
fn test_footer_on_every_page() {
    let units: Vec<ReportUnit> = (0..3).map(|_| ReportUnit::new(scenario_a())).collect();
    let mut surface = RecordingSurface::a4();
    let config = ReportConfig::new().with_branding("Acme");
    let summary = PageComposer::new(config)
        .with_generated_at(generated_at())
        .compose(&mut surface, "Weekly Poll", &units)
        .unwrap();

    assert_eq!(summary.page_count, 3);
    for page in 0..3 {
        let footer = format!("Page {} of 3 | Generated by Acme", page + 1);
        let ops = surface.find_text(&footer);
        assert_eq!(ops.len(), 1, "{}", footer);
        assert!(matches!(ops[0], DrawOp::Text { page: p, y, .. } if *p == page && *y == 287.0));
    }
}

#[test]
fn test_chart_only_tier_has_no_tables() {
    let data = scenario_a().with_detailed(vec![row! { "Participant ID" => UUID, "Selected Option" => "Red" }]);
    let mut surface = RecordingSurface::a4();
    let summary = composer(ExportTier::ChartOnly)
        .compose(&mut surface, "Weekly Poll", &[ReportUnit::new(data)])
        .unwrap();

    let unit = &summary.units[0];
    assert!(unit.summary.is_none() && unit.detailed.is_none());
    assert!(unit.chart.is_some());
    assert!(!surface.has_text("Detailed Responses"));
    assert!(!surface.has_text("550e84...0000"));
    assert!(surface.has_text("Visual Summary Report"));
}

#[test]
fn test_quiz_correct_option_highlighted() {
    let data = FormattedSlideData::new(SlideType::Quiz, "2 + 2?")
        .with_summary(vec![
            row! { "Option" => "3", "Votes" => 1i64 },
            row! { "Option" => "4", "Votes" => 5i64 },
            row! { "Option" => "Correct Answers", "Votes" => 5i64 },
        ])
        .with_correct_option("4")
        .with_total_responses(6);
    let mut surface = RecordingSurface::a4();
    let summary = composer(ExportTier::ChartOnly)
        .compose(&mut surface, "Quiz Night", &[ReportUnit::new(data)])
        .unwrap();

    let chart = summary.units[0].chart.as_ref().unwrap();
    assert_eq!(chart.bars.len(), 2);
    assert_eq!(chart.bars[1].color, slide_report::report::HIGHLIGHT);
    assert!(surface.has_text("Summary: 5 correct, 0 incorrect"));
}

#[test]
fn test_instruction_without_code_embeds_nothing() {
    let data = FormattedSlideData::new(SlideType::Instruction, "Join now")
        .with_summary(vec![row! { "Step" => "Open the link" }]);
    let mut surface = RecordingSurface::a4();
    let summary = composer(ExportTier::Full)
        .compose(&mut surface, "Kickoff", &[ReportUnit::new(data)])
        .unwrap();
    assert!(summary.units[0].code.is_none());
    assert!(surface.has_text("INSTRUCTIONS"));
    assert!(!surface.has_text(CAPTION));
}

#[cfg(feature = "barcodes")]
#[test]
fn test_instruction_embeds_join_code() {
    let data = FormattedSlideData::new(SlideType::Instruction, "Join now")
        .with_summary(vec![row! { "Step" => "Scan the code" }])
        .with_access_code("ABC123");
    let mut surface = RecordingSurface::a4();
    let summary = composer(ExportTier::Full)
        .compose(&mut surface, "Kickoff", &[ReportUnit::new(data)])
        .unwrap();

    let unit = &summary.units[0];
    let code = unit.code.unwrap();
    assert!(unit.stages.contains(&UnitStage::CodeEmbedded));
    assert!(surface.has_text(CAPTION));
    // the code sits directly below the instructions table
    let table_bottom = unit.summary.as_ref().unwrap().row_extents[0].bottom();
    assert!(code.y > table_bottom);
    assert!(surface
        .ops()
        .iter()
        .any(|op| matches!(op, DrawOp::Image { x, .. } if *x == code.x)));
}
