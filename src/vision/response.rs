//! Post-processing of the model's answer: fence stripping, JSON decoding,
//! confidence score, completeness checks and a text summary.

use core::fmt::Write;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::prompt::Platform;

/// Message carried by every parse failure.
pub const PARSE_FAILURE: &str = "Failed to parse model response";

/// Rungs listed individually in [`AnalysisOutcome::summary`].
const SUMMARY_RUNGS: usize = 5;

/// Confidence lost per reported ambiguity.
const AMBIGUITY_PENALTY: f32 = 0.05;

// ---------------------------------------------------------------------------
// Decoded shape
// ---------------------------------------------------------------------------

/// The JSON document the prompt asks for.  Every field is optional so an
/// incomplete answer still decodes and can be reported by [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SketchAnalysis {
    #[serde(default)]
    pub analysis_metadata: AnalysisMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rungs: Option<Vec<RungSketch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags_detected: Option<Vec<TagSketch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_notes: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rungs: Option<u32>,
    #[serde(default)]
    pub total_contacts: u32,
    #[serde(default)]
    pub total_coils: u32,
    #[serde(default)]
    pub total_timers: u32,
    #[serde(default)]
    pub total_counters: u32,
    /// `"good"`, `"fair"` or `"poor"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sketch_quality: Option<String>,
    /// Free-form: the model sometimes returns objects instead of strings.
    #[serde(default)]
    pub ambiguities: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RungSketch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rung_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<ElementSketch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementSketch {
    /// `contact_no`, `coil`, `timer_ton`, ...
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagSketch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl SketchAnalysis {
    pub fn rungs(&self) -> &[RungSketch] {
        self.rungs.as_deref().unwrap_or_default()
    }

    pub fn tags(&self) -> &[TagSketch] {
        self.tags_detected.as_deref().unwrap_or_default()
    }

    /// `base(quality) − 0.05 · ambiguities`, clamped to `[0, 1]`.
    /// Unknown or missing quality scores as poor.
    pub fn confidence(&self) -> f32 {
        let base = match self.analysis_metadata.sketch_quality.as_deref() {
            Some("good") => 0.9,
            Some("fair") => 0.6,
            _ => 0.3,
        };
        let penalty = self.analysis_metadata.ambiguities.len() as f32 * AMBIGUITY_PENALTY;
        (base - penalty).clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Remove a surrounding Markdown code fence (```` ```json ```` or ```` ``` ````).
pub fn strip_fences(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Decode a model answer.  Never fails: undecodable text becomes
/// [`AnalysisOutcome::ParseFailed`] carrying the raw answer.
pub fn parse_response(text: &str, source: Option<&str>, platform: Platform) -> AnalysisOutcome {
    let decoded = serde_json::from_str::<Value>(strip_fences(text))
        .and_then(serde_json::from_value::<SketchAnalysis>);
    match decoded {
        Ok(analysis) => {
            let confidence = analysis.confidence();
            AnalysisOutcome::Parsed(SketchReport {
                analysis,
                source: source.map(str::to_owned),
                platform,
                confidence,
            })
        }
        Err(e) => {
            log::warn!("model response is not valid sketch JSON: {e}");
            AnalysisOutcome::ParseFailed {
                raw: text.to_owned(),
                error: e.to_string(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// A decoded answer plus the request context.
#[derive(Debug, Clone, PartialEq)]
pub struct SketchReport {
    pub analysis: SketchAnalysis,
    pub source: Option<String>,
    pub platform: Platform,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Parsed(SketchReport),
    ParseFailed { raw: String, error: String },
}

impl AnalysisOutcome {
    pub fn confidence(&self) -> f32 {
        match self {
            Self::Parsed(r) => r.confidence,
            Self::ParseFailed { .. } => 0.0,
        }
    }

    pub fn report(&self) -> Option<&SketchReport> {
        match self {
            Self::Parsed(r) => Some(r),
            Self::ParseFailed { .. } => None,
        }
    }

    /// Completeness problems; empty when the analysis is usable.
    pub fn validate(&self) -> Vec<String> {
        match self {
            Self::Parsed(r) => validate(&r.analysis),
            Self::ParseFailed { .. } => vec![format!("Analysis failed: {PARSE_FAILURE}")],
        }
    }

    /// Human-readable summary.
    pub fn summary(&self) -> String {
        let r = match self {
            Self::Parsed(r) => r,
            Self::ParseFailed { .. } => return format!("Analysis Error: {PARSE_FAILURE}"),
        };
        let meta = &r.analysis.analysis_metadata;
        let rungs = r.analysis.rungs();

        let mut s = String::new();
        let _ = writeln!(s, "Sketch Analysis Summary");
        let _ = writeln!(s, "========================");
        let _ = writeln!(s, "Source: {}", r.source.as_deref().unwrap_or("Unknown"));
        let _ = writeln!(s, "Target Platform: {}", r.platform);
        let _ = writeln!(s, "Confidence: {:.1}%", r.confidence * 100.0);
        let _ = writeln!(
            s,
            "Quality: {}",
            meta.sketch_quality.as_deref().unwrap_or("Unknown")
        );
        let _ = writeln!(s);
        let _ = writeln!(s, "Statistics:");
        let _ = writeln!(
            s,
            "- Total Rungs: {}",
            meta.total_rungs.unwrap_or(rungs.len() as u32)
        );
        let _ = writeln!(s, "- Contacts: {}", meta.total_contacts);
        let _ = writeln!(s, "- Coils: {}", meta.total_coils);
        let _ = writeln!(s, "- Timers: {}", meta.total_timers);
        let _ = writeln!(s, "- Counters: {}", meta.total_counters);
        let _ = writeln!(s);
        let _ = writeln!(s, "Tags Detected: {}", r.analysis.tags().len());

        if !meta.ambiguities.is_empty() {
            let _ = writeln!(s, "\nAmbiguities Found:");
            for a in &meta.ambiguities {
                match a {
                    Value::String(text) => {
                        let _ = writeln!(s, "  - {text}");
                    }
                    other => {
                        let _ = writeln!(s, "  - {other}");
                    }
                }
            }
        }

        let _ = writeln!(s, "\nRung Summary:");
        for rung in rungs.iter().take(SUMMARY_RUNGS) {
            let number = rung
                .rung_number
                .map_or_else(|| "?".to_owned(), |n| n.to_string());
            let _ = writeln!(
                s,
                "  Rung {number}: {}",
                rung.logic_description.as_deref().unwrap_or("No description")
            );
        }
        if rungs.len() > SUMMARY_RUNGS {
            let _ = writeln!(s, "  ... and {} more rungs", rungs.len() - SUMMARY_RUNGS);
        }
        s
    }

    /// Export form: the decoded document with `source_image`,
    /// `target_platform` and `confidence` added, or the error record.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Parsed(r) => {
                let mut v = serde_json::to_value(&r.analysis).unwrap_or(Value::Null);
                if let Value::Object(map) = &mut v {
                    map.insert(
                        "source_image".into(),
                        r.source.clone().map_or(Value::Null, Value::String),
                    );
                    map.insert("target_platform".into(), Value::String(r.platform.tag().into()));
                    map.insert("confidence".into(), Value::from(f64::from(r.confidence)));
                }
                v
            }
            Self::ParseFailed { raw, error } => serde_json::json!({
                "error": PARSE_FAILURE,
                "raw_response": raw,
                "parse_error": error,
                "confidence": 0.0,
            }),
        }
    }
}

/// Completeness checks on a decoded analysis.
pub fn validate(a: &SketchAnalysis) -> Vec<String> {
    let mut errors = Vec::new();
    if a.rungs.is_none() {
        errors.push("Missing 'rungs' field".to_owned());
    }
    if a.tags_detected.is_none() {
        errors.push("Missing 'tags_detected' field".to_owned());
    }
    for (i, rung) in a.rungs().iter().enumerate() {
        let id = rung.rung_number.unwrap_or(i as i64);
        if rung.rung_number.is_none() {
            errors.push(format!("Rung {i}: Missing rung_number"));
        }
        let elements = rung.elements.as_deref().unwrap_or_default();
        if elements.is_empty() {
            errors.push(format!("Rung {id}: No elements found"));
        }
        for e in elements {
            if e.kind.is_none() {
                errors.push(format!("Rung {id}: Element missing type"));
            }
        }
    }
    errors
}
