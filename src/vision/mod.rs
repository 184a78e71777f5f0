//! Sketch analyzer: transcribes a photographed ladder diagram through a
//! [`VisionPort`] and turns the answer into a structured analysis.
//!
//! The analyzer owns the prompt and the post-processing only.  Image
//! understanding happens behind the port.

pub mod prompt;
pub mod response;

pub use prompt::{Platform, build_prompt};
pub use response::{
    AnalysisMetadata, AnalysisOutcome, ElementSketch, RungSketch, SketchAnalysis, SketchReport,
    TagSketch, parse_response, strip_fences, validate,
};

use log::info;

use crate::app::ports::{VisionError, VisionPort, VisionRequest};

/// Media types the analyzer will forward.
const ACCEPTED_MEDIA: [&str; 4] = ["image/png", "image/jpeg", "image/webp", "image/gif"];

/// Guess a media type from a file name's extension.
pub fn media_type_for(path: &str) -> Option<&'static str> {
    let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

pub struct SketchAnalyzer<V: VisionPort> {
    port: V,
}

impl<V: VisionPort> SketchAnalyzer<V> {
    pub fn new(port: V) -> Self {
        Self { port }
    }

    /// Send one sketch for analysis.
    ///
    /// Transport failures come back as `Err`; an answer that is not valid
    /// JSON comes back as [`AnalysisOutcome::ParseFailed`].
    pub fn analyze(
        &mut self,
        image: &[u8],
        media_type: &str,
        source: &str,
        platform: Platform,
    ) -> Result<AnalysisOutcome, VisionError> {
        if image.is_empty() || !ACCEPTED_MEDIA.contains(&media_type) {
            return Err(VisionError::UnsupportedImage);
        }
        let prompt = build_prompt(platform);
        info!(
            "Analyzing sketch {source} ({} bytes, platform {platform})",
            image.len()
        );
        let text = self.port.describe(&VisionRequest {
            image,
            media_type,
            prompt: &prompt,
        })?;
        let outcome = parse_response(&text, Some(source), platform);
        info!("Sketch {source}: confidence {:.2}", outcome.confidence());
        Ok(outcome)
    }

    pub fn port(&self) -> &V {
        &self.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned {
        answer: Result<String, VisionError>,
        prompts: Vec<String>,
    }

    impl VisionPort for Canned {
        fn describe(&mut self, request: &VisionRequest<'_>) -> Result<String, VisionError> {
            self.prompts.push(request.prompt.to_owned());
            self.answer.clone()
        }
    }

    fn analyzer(answer: Result<String, VisionError>) -> SketchAnalyzer<Canned> {
        SketchAnalyzer::new(Canned {
            answer,
            prompts: Vec::new(),
        })
    }

    #[test]
    fn forwards_platform_prompt_and_parses_answer() {
        let mut a = analyzer(Ok(r#"{"rungs": [], "tags_detected": []}"#.into()));
        let out = a
            .analyze(b"\x89PNG", "image/png", "motor.png", Platform::Mitsubishi)
            .unwrap();
        assert!(out.validate().is_empty());
        assert_eq!(out.report().unwrap().source.as_deref(), Some("motor.png"));
        assert!(a.port().prompts[0].contains("TARGET PLATFORM: Mitsubishi"));
    }

    #[test]
    fn rejects_empty_or_unknown_images_without_calling_the_port() {
        let mut a = analyzer(Ok(String::new()));
        assert_eq!(
            a.analyze(b"", "image/png", "x", Platform::Generic),
            Err(VisionError::UnsupportedImage)
        );
        assert_eq!(
            a.analyze(b"data", "application/pdf", "x", Platform::Generic),
            Err(VisionError::UnsupportedImage)
        );
        assert!(a.port().prompts.is_empty());
    }

    #[test]
    fn transport_errors_propagate() {
        let mut a = analyzer(Err(VisionError::Rejected(429)));
        assert_eq!(
            a.analyze(b"img", "image/jpeg", "x", Platform::Schneider),
            Err(VisionError::Rejected(429))
        );
    }

    #[test]
    fn media_type_from_extension() {
        assert_eq!(media_type_for("a/b/sketch.JPG"), Some("image/jpeg"));
        assert_eq!(media_type_for("notes.txt"), None);
        assert_eq!(media_type_for("noext"), None);
    }
}
