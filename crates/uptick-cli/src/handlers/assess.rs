//! Assess command handler.
//!
//! Scores a dialogue saved as JSON. Accepted shapes are a bare array of
//! turns or an object with a `conversation` array, which is what a saved
//! session snapshot contains.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use serde_json::Value;
use uptick_core::{AssessmentReport, ConversationTurn, Speaker};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Parse a saved transcript.
pub fn parse_transcript(raw: &str) -> Result<Vec<ConversationTurn>, CliError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| CliError::Input(format!("not JSON: {e}")))?;
    let turns = match value {
        Value::Object(mut map) => map
            .remove("conversation")
            .ok_or_else(|| CliError::Input("missing \"conversation\" array".to_string()))?,
        other => other,
    };

    let turns: Vec<ConversationTurn> = serde_json::from_value(turns)
        .map_err(|e| CliError::Input(format!("bad conversation turns: {e}")))?;

    if !turns.iter().any(|t| t.speaker == Speaker::User) {
        return Err(CliError::Input(
            "transcript has no student turns to assess".to_string(),
        ));
    }
    Ok(turns)
}

/// Render a report for the terminal.
pub fn format_report(report: &AssessmentReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Level: {}", report.overall.level);
    let _ = writeln!(out, "{}", report.overall.summary);
    let _ = writeln!(out);
    for (name, category) in report.categories() {
        let _ = writeln!(out, "{name:<10} {:>3}/100  {}", category.score, category.feedback);
    }
    out
}

/// Execute the assess command.
pub async fn execute(ctx: &CliContext, transcript: &Path, json: bool) -> Result<()> {
    let raw = tokio::fs::read_to_string(transcript)
        .await
        .map_err(|e| CliError::Io(format!("{}: {e}", transcript.display())))?;
    let turns = parse_transcript(&raw)?;

    tracing::info!(turns = turns.len(), "Assessing transcript");
    let report = ctx.assessor().assess(&turns).await.map_err(CliError::from)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uptick_core::{OverallAssessment, ProficiencyLevel, ScoreFeedback};

    #[test]
    fn bare_array_is_accepted() {
        let turns = parse_transcript(
            r#"[
                {"speaker": "teacher", "text": "Hi! Tell me about yourself."},
                {"speaker": "user", "text": "I am Ana"}
            ]"#,
        )
        .unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1], ConversationTurn::user("I am Ana"));
    }

    #[test]
    fn snapshot_object_is_accepted() {
        let turns = parse_transcript(
            r#"{"screen": "assessment", "conversation": [{"speaker": "user", "text": "Hello"}]}"#,
        )
        .unwrap();
        assert_eq!(turns, vec![ConversationTurn::user("Hello")]);
    }

    #[test]
    fn rejects_unusable_transcripts() {
        assert!(matches!(parse_transcript("nope"), Err(CliError::Input(_))));
        assert!(matches!(
            parse_transcript(r#"{"turns": []}"#),
            Err(CliError::Input(_))
        ));
        assert!(matches!(
            parse_transcript(r#"[{"speaker": "teacher", "text": "Hi"}]"#),
            Err(CliError::Input(_))
        ));
        assert!(matches!(
            parse_transcript(r#"[{"speaker": "robot", "text": "Hi"}]"#),
            Err(CliError::Input(_))
        ));
    }

    #[test]
    fn report_lists_categories_in_order() {
        let score = |score, feedback: &str| ScoreFeedback {
            score,
            feedback: feedback.to_string(),
        };
        let report = AssessmentReport {
            vocabulary: score(70, "Good range"),
            grammar: score(65, "Tense slips"),
            fluency: score(80, "Smooth"),
            overall: OverallAssessment {
                level: ProficiencyLevel::Intermediate,
                summary: "Solid base".to_string(),
            },
        };

        let text = format_report(&report);
        assert!(text.starts_with("Level: Intermediate\nSolid base\n"));
        let vocab = text.find("vocabulary").unwrap();
        let grammar = text.find("grammar").unwrap();
        let fluency = text.find("fluency").unwrap();
        assert!(vocab < grammar && grammar < fluency);
        assert!(text.contains(" 65/100  Tense slips"));
    }
}
