//! Sketch analyzer against a scripted vision model.

use tankguard::app::ports::{VisionError, VisionPort, VisionRequest};
use tankguard::vision::{AnalysisOutcome, Platform, SketchAnalyzer, media_type_for};

/// Replays canned answers in order and keeps every request it saw.
struct ScriptedModel {
    answers: Vec<Result<String, VisionError>>,
    seen: Vec<(String, usize)>,
}

impl ScriptedModel {
    fn new(answers: Vec<Result<String, VisionError>>) -> Self {
        Self {
            answers,
            seen: Vec::new(),
        }
    }
}

impl VisionPort for ScriptedModel {
    fn describe(&mut self, request: &VisionRequest<'_>) -> Result<String, VisionError> {
        self.seen
            .push((request.media_type.to_owned(), request.image.len()));
        if self.answers.is_empty() {
            return Err(VisionError::Unavailable);
        }
        self.answers.remove(0)
    }
}

const MOTOR_SKETCH: &str = r#"```json
{
  "analysis_metadata": {
    "total_rungs": 2,
    "total_contacts": 3,
    "total_coils": 2,
    "total_timers": 1,
    "total_counters": 0,
    "sketch_quality": "fair",
    "ambiguities": ["rung 2 label smudged"]
  },
  "rungs": [
    {
      "rung_number": 1,
      "comment": "Motor start",
      "elements": [
        {"type": "NO_contact", "label": "START", "address": "%I0.0", "position": "left", "branch": 0},
        {"type": "NC_contact", "label": "STOP", "address": "%I0.1", "position": "middle", "branch": 0},
        {"type": "coil", "label": "MOTOR", "address": "%Q0.0", "position": "right", "branch": 0}
      ],
      "logic_description": "Seal-in start/stop"
    },
    {
      "rung_number": 2,
      "elements": [
        {"type": "timer_TON", "label": "T1", "parameters": {"preset": "5s"}}
      ],
      "logic_description": "Run delay"
    }
  ],
  "tags_detected": [
    {"name": "START", "address": "%I0.0", "data_type": "BOOL", "comment": "Start button"}
  ]
}
```"#;

#[test]
fn fenced_answer_is_parsed_scored_and_exported() {
    let mut analyzer = SketchAnalyzer::new(ScriptedModel::new(vec![Ok(MOTOR_SKETCH.into())]));
    let out = analyzer
        .analyze(b"\xFF\xD8\xFF", "image/jpeg", "motor.jpg", Platform::Schneider)
        .unwrap();

    let report = out.report().expect("parsed");
    assert_eq!(report.analysis.rungs().len(), 2);
    assert_eq!(report.analysis.tags().len(), 1);
    assert!((out.confidence() - 0.55).abs() < 1e-5);
    assert!(out.validate().is_empty());

    let summary = out.summary();
    assert!(summary.contains("Source: motor.jpg"));
    assert!(summary.contains("Rung 1: Seal-in start/stop"));
    assert!(summary.contains("rung 2 label smudged"));

    let json = out.to_json();
    assert_eq!(json["source_image"], "motor.jpg");
    assert_eq!(json["target_platform"], "schneider");
    assert_eq!(json["rungs"][0]["elements"][2]["type"], "coil");

    assert_eq!(analyzer.port().seen, vec![("image/jpeg".to_owned(), 3)]);
}

#[test]
fn prose_answer_is_reported_as_a_parse_failure() {
    let mut analyzer = SketchAnalyzer::new(ScriptedModel::new(vec![Ok(
        "I could not read this sketch.".into(),
    )]));
    let out = analyzer
        .analyze(b"png", "image/png", "blurry.png", Platform::Generic)
        .unwrap();

    assert!(matches!(out, AnalysisOutcome::ParseFailed { .. }));
    assert_eq!(out.confidence(), 0.0);
    assert_eq!(out.validate(), vec!["Analysis failed: Failed to parse model response"]);
    assert_eq!(out.to_json()["raw_response"], "I could not read this sketch.");
}

#[test]
fn incomplete_rungs_are_flagged() {
    let answer = r#"{"rungs": [{"elements": []}, {"rung_number": 7, "elements": [{"label": "X"}]}]}"#;
    let mut analyzer = SketchAnalyzer::new(ScriptedModel::new(vec![Ok(answer.into())]));
    let issues = analyzer
        .analyze(b"png", "image/png", "partial.png", Platform::Rockwell)
        .unwrap()
        .validate();

    assert_eq!(
        issues,
        vec![
            "Missing 'tags_detected' field",
            "Rung 0: Missing rung_number",
            "Rung 0: No elements found",
            "Rung 7: Element missing type",
        ]
    );
}

#[test]
fn transport_errors_pass_through() {
    let mut analyzer = SketchAnalyzer::new(ScriptedModel::new(vec![Err(VisionError::Rejected(429))]));
    assert_eq!(
        analyzer.analyze(b"png", "image/png", "a.png", Platform::Siemens),
        Err(VisionError::Rejected(429))
    );
    assert_eq!(
        analyzer.analyze(b"png", "image/png", "a.png", Platform::Siemens),
        Err(VisionError::Unavailable)
    );
}

#[test]
fn media_types_follow_the_extension() {
    assert_eq!(media_type_for("sketch.PNG"), Some("image/png"));
    assert_eq!(media_type_for("photo.jpeg"), Some("image/jpeg"));
    assert_eq!(media_type_for("scan.tiff"), None);
    assert_eq!(media_type_for("noext"), None);
}
