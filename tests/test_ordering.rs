//! Integration tests for quiz and leaderboard ordering.

use slide_report::report::{order_units, FormattedSlideData, ReportUnit, SlideType};

fn unit(slide_type: SlideType, id: &str, linked: Option<&str>) -> ReportUnit {
    ReportUnit {
        slide_index: None,
        slide_id: Some(id.to_string()),
        linked_quiz_id: linked.map(str::to_string),
        data: FormattedSlideData::new(slide_type, id),
    }
}

fn questions(units: &[ReportUnit]) -> Vec<&str> {
    units.iter().map(|u| u.data.question.as_str()).collect()
}

#[test]
fn test_leaderboards_follow_their_quiz() {
    let units = vec![
        unit(SlideType::Leaderboard, "board-2", Some("ObjectId(\"QUIZ-2\")")),
        unit(SlideType::Quiz, "quiz-1", None),
        unit(SlideType::MultipleChoice, "poll", None),
        unit(SlideType::Quiz, "quiz-2", None),
        unit(SlideType::Leaderboard, "board-1", Some("quiz-1")),
    ];
    let ordered = order_units(&units);
    assert_eq!(
        questions(&ordered),
        vec!["quiz-1", "board-1", "poll", "quiz-2", "board-2"]
    );
}

#[test]
fn test_orphan_leaderboards_go_last() {
    let units = vec![
        unit(SlideType::Leaderboard, "orphan", Some("deleted-quiz")),
        unit(SlideType::Leaderboard, "unlinked", None),
        unit(SlideType::Quiz, "quiz", None),
    ];
    let ordered = order_units(&units);
    assert_eq!(questions(&ordered), vec!["quiz", "orphan", "unlinked"]);
}

#[test]
fn test_ordering_parsed_request() {
    let json = r#"{
        "title": "Quiz Night",
        "units": [
            {"slideId": "lb", "linkedQuizId": "'Q1'", "data": {"slideType": "leaderboard", "question": "Leaderboard"}},
            {"slideId": "q1", "data": {"slideType": "quiz", "question": "Capital of France?"}}
        ]
    }"#;
    let request = slide_report::report::ReportRequest::from_json_str(json).unwrap();
    let ordered = order_units(&request.units);
    assert_eq!(questions(&ordered), vec!["Capital of France?", "Leaderboard"]);
}
