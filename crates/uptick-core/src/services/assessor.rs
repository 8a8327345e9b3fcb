//! Assessment generation.
//!
//! Only the student's own words are graded: teacher turns are dropped and the
//! remaining text is joined into a single transcript.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{AssessmentReport, ChatMessage, ConversationTurn, Speaker};
use crate::ports::{CompletionRequest, LanguageModelPort, ProviderError};
use crate::settings::Settings;

/// System message for the assessment call.
pub const ASSESSOR_SYSTEM_PROMPT: &str = "You are an expert English language assessor. Analyze the student responses and provide accurate, constructive feedback.";

const RESPONSE_FORMAT: &str = r#"Please respond in this exact JSON format:
{
  "vocabulary": {
    "score": <number>,
    "feedback": "<specific feedback about vocabulary>"
  },
  "grammar": {
    "score": <number>,
    "feedback": "<specific feedback about grammar>"
  },
  "fluency": {
    "score": <number>,
    "feedback": "<specific feedback about fluency>"
  },
  "overall": {
    "level": "<Beginner|Elementary|Intermediate|Upper-Intermediate|Advanced>",
    "summary": "<overall assessment summary>"
  }
}"#;

/// Errors from assessment generation. No partial report is ever returned.
#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("Assessment request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Assessment model returned no content")]
    Empty,

    #[error("Assessment response was not a valid report: {0}")]
    Malformed(String),
}

/// Model parameters for the assessment call.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessorConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl From<&Settings> for AssessorConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            model: settings.chat_model.clone(),
            max_tokens: settings.assessment_max_tokens,
            temperature: settings.assessment_temperature,
        }
    }
}

impl Default for AssessorConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

/// Join the user's turns with single spaces.
#[must_use]
pub fn user_transcript(conversation: &[ConversationTurn]) -> String {
    conversation
        .iter()
        .filter(|turn| turn.speaker == Speaker::User)
        .map(|turn| turn.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the grading prompt around a student transcript.
#[must_use]
pub fn build_prompt(transcript: &str) -> String {
    format!(
        "As an experienced English teacher, analyze this student's English conversation responses \
         and provide detailed scores and feedback.\n\n\
         STUDENT RESPONSES:\n{transcript}\n\n\
         Please analyze and score the following areas on a scale of 0-100:\n\n\
         1. VOCABULARY (0-100):\n\
         - Range of vocabulary used\n\
         - Appropriateness of word choices\n\
         - Use of complex vs simple words\n\
         - Variety in expression\n\n\
         2. GRAMMAR (0-100):\n\
         - Sentence structure accuracy\n\
         - Correct use of tenses\n\
         - Subject-verb agreement\n\
         - Use of articles, prepositions, etc.\n\n\
         3. FLUENCY (0-100):\n\
         - Natural flow of speech\n\
         - Ability to express ideas clearly\n\
         - Coherence and organization of thoughts\n\
         - Confidence in communication\n\n\
         {RESPONSE_FORMAT}"
    )
}

/// Parse model output into a report.
///
/// The whole (trimmed) content must be the JSON object; scores above 100 are
/// rejected.
pub fn parse_report(content: &str) -> Result<AssessmentReport, AssessmentError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AssessmentError::Empty);
    }

    let report: AssessmentReport =
        serde_json::from_str(content).map_err(|e| AssessmentError::Malformed(e.to_string()))?;

    if let Some(category) = report.out_of_range_category() {
        return Err(AssessmentError::Malformed(format!(
            "{category} score is above 100"
        )));
    }

    Ok(report)
}

/// Grades a finished conversation.
pub struct Assessor {
    model: Arc<dyn LanguageModelPort>,
    config: AssessorConfig,
}

impl Assessor {
    pub fn new(model: Arc<dyn LanguageModelPort>, config: AssessorConfig) -> Self {
        Self { model, config }
    }

    /// One model call; no retry.
    pub async fn assess(
        &self,
        conversation: &[ConversationTurn],
    ) -> Result<AssessmentReport, AssessmentError> {
        let transcript = user_transcript(conversation);
        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(ASSESSOR_SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(&transcript)),
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        tracing::debug!(
            turns = conversation.len(),
            chars = transcript.chars().count(),
            "Requesting assessment"
        );

        let content = self
            .model
            .complete(request)
            .await?
            .ok_or(AssessmentError::Empty)?;

        let report = parse_report(&content)?;
        tracing::info!(level = %report.overall.level, "Assessment generated");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatRole, ProficiencyLevel};
    use crate::ports::language_model::MockLanguageModelPort;

    const VALID: &str = r#"{
        "vocabulary": { "score": 72, "feedback": "Good range" },
        "grammar": { "score": 65, "feedback": "Watch tenses" },
        "fluency": { "score": 80, "feedback": "Natural flow" },
        "overall": { "level": "Upper-Intermediate", "summary": "Solid" }
    }"#;

    #[test]
    fn transcript_contains_only_user_text() {
        let conversation = vec![
            ConversationTurn::teacher("Hi"),
            ConversationTurn::user("I am from Spain"),
        ];
        assert_eq!(user_transcript(&conversation), "I am from Spain");

        let prompt = build_prompt(&user_transcript(&conversation));
        assert!(prompt.contains("STUDENT RESPONSES:\nI am from Spain\n"));
        assert!(!prompt.contains("Hi\n"));
    }

    #[test]
    fn transcript_joins_with_single_spaces() {
        let conversation = vec![
            ConversationTurn::user("One."),
            ConversationTurn::teacher("Go on"),
            ConversationTurn::user("Two."),
        ];
        assert_eq!(user_transcript(&conversation), "One. Two.");
    }

    #[test]
    fn parses_valid_report() {
        let report = parse_report(VALID).unwrap();
        assert_eq!(report.grammar.score, 65);
        assert_eq!(report.overall.level, ProficiencyLevel::UpperIntermediate);
    }

    #[test]
    fn rejects_malformed_and_out_of_range() {
        assert!(matches!(parse_report(""), Err(AssessmentError::Empty)));
        assert!(matches!(
            parse_report("Here is your report: {}"),
            Err(AssessmentError::Malformed(_))
        ));
        assert!(matches!(
            parse_report(&VALID.replace("72", "172")),
            Err(AssessmentError::Malformed(_))
        ));
        assert!(matches!(
            parse_report(&VALID.replace("Upper-Intermediate", "Expert")),
            Err(AssessmentError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn assess_sends_one_low_temperature_call() {
        let mut model = MockLanguageModelPort::new();
        model
            .expect_complete()
            .withf(|req| {
                req.max_tokens == 1000
                    && (req.temperature - 0.3).abs() < f32::EPSILON
                    && req.messages[0].role == ChatRole::System
                    && req.messages[0].content == ASSESSOR_SYSTEM_PROMPT
                    && req.messages[1].content.contains("I am from Spain")
            })
            .times(1)
            .returning(|_| Ok(Some(VALID.to_string())));

        let assessor = Assessor::new(Arc::new(model), AssessorConfig::default());
        let report = assessor
            .assess(&[
                ConversationTurn::teacher("Hi"),
                ConversationTurn::user("I am from Spain"),
            ])
            .await
            .unwrap();
        assert_eq!(report.fluency.score, 80);
    }

    #[tokio::test]
    async fn missing_content_is_a_failure() {
        let mut model = MockLanguageModelPort::new();
        model.expect_complete().times(1).returning(|_| Ok(None));

        let assessor = Assessor::new(Arc::new(model), AssessorConfig::default());
        let err = assessor.assess(&[]).await.unwrap_err();
        assert!(matches!(err, AssessmentError::Empty));
    }
}
