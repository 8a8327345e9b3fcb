//! Teacher reply generation.
//!
//! Builds the teacher instruction prompt and asks the language model for the
//! next line of the conversation.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::domain::ChatMessage;
use crate::ports::{CompletionRequest, LanguageModelPort, ProviderError};
use crate::settings::Settings;

/// First teacher line of every conversation.
pub const OPENING_LINE: &str =
    "Hello! I'm your English teacher. Tell me about yourself - what's your name and where are you from?";

/// Reply used when the model fails or returns nothing.
pub const FALLBACK_REPLY: &str = "Could you tell me more about that?";

/// Topics the teacher tries to cover.
pub const TARGET_TOPICS: [&str; 8] = [
    "Personal introduction (name, age, where they're from)",
    "Family situation (married, children, living situation)",
    "Work or studies",
    "Hobbies and interests",
    "Daily routines",
    "Future plans or dreams",
    "Travel experiences",
    "Food preferences",
];

const ASSESSMENT_CRITERIA: [&str; 5] = [
    "Vocabulary range and complexity",
    "Grammar accuracy and sentence structure",
    "Fluency and natural speech patterns",
    "Pronunciation clarity (you can't hear but infer from their responses)",
    "Comprehension of your questions",
];

const GUIDELINES: [&str; 7] = [
    "Keep responses conversational and encouraging",
    "Ask follow-up questions based on their answers",
    "Gradually increase complexity as appropriate",
    "Show genuine interest in their responses",
    "Don't rush - let them elaborate",
    "If they give short answers, encourage them to explain more",
    "Use varied question types (open-ended, specific, opinion-based)",
];

/// Model parameters for teacher replies.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponderConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Session length the prompt refers to.
    pub session_limit_minutes: u32,
}

impl From<&Settings> for ResponderConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            model: settings.chat_model.clone(),
            max_tokens: settings.chat_max_tokens,
            temperature: settings.chat_temperature,
            session_limit_minutes: settings.session_limit_minutes,
        }
    }
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

/// Build the teacher instruction prompt.
///
/// An empty `topics_covered` renders as `none`.
#[must_use]
pub fn build_system_prompt(
    topics_covered: &[String],
    elapsed_minutes: u32,
    limit_minutes: u32,
) -> String {
    let covered = if topics_covered.is_empty() {
        "none".to_string()
    } else {
        topics_covered.join(", ")
    };

    let mut prompt = String::from(
        "You are an experienced English teacher conducting a conversational English assessment. \
         Your goal is to naturally assess the student's English proficiency through a flowing conversation.\n\n",
    );

    let _ = writeln!(
        prompt,
        "TOPICS TO COVER (aim to cover as many as possible in {limit_minutes} minutes):"
    );
    for topic in TARGET_TOPICS {
        let _ = writeln!(prompt, "- {topic}");
    }

    let _ = write!(
        prompt,
        "\nALREADY COVERED TOPICS: {covered}\nTIME ELAPSED: {elapsed_minutes} minutes\n\n"
    );

    prompt.push_str("ASSESSMENT CRITERIA - Pay attention to:\n");
    for criterion in ASSESSMENT_CRITERIA {
        let _ = writeln!(prompt, "- {criterion}");
    }

    prompt.push_str("\nCONVERSATION GUIDELINES:\n");
    for (i, guideline) in GUIDELINES.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {guideline}", i + 1);
    }

    let _ = write!(
        prompt,
        "\nIf the time is approaching {limit_minutes} minutes or you feel you have enough information, \
         naturally conclude the conversation and indicate you're ready to provide the assessment by saying \
         something like \"Thank you for sharing so much with me! I think I have a good sense of your English level now.\"\n\n\
         Keep your responses to 1-2 sentences maximum. Be warm, encouraging, and professional."
    );

    prompt
}

/// Prepend the system prompt to the dialogue.
#[must_use]
pub fn build_messages(system_prompt: String, history: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend(history.iter().cloned());
    messages
}

/// Generates teacher replies.
pub struct ConversationResponder {
    model: Arc<dyn LanguageModelPort>,
    config: ResponderConfig,
}

impl ConversationResponder {
    pub fn new(model: Arc<dyn LanguageModelPort>, config: ResponderConfig) -> Self {
        Self { model, config }
    }

    #[must_use]
    pub const fn config(&self) -> &ResponderConfig {
        &self.config
    }

    /// One model call for the next teacher line.
    ///
    /// Empty or whitespace-only content becomes [`FALLBACK_REPLY`]; provider
    /// failures are returned.
    pub async fn respond(
        &self,
        history: &[ChatMessage],
        topics_covered: &[String],
        elapsed_minutes: u32,
    ) -> Result<String, ProviderError> {
        let system_prompt = build_system_prompt(
            topics_covered,
            elapsed_minutes,
            self.config.session_limit_minutes,
        );
        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages: build_messages(system_prompt, history),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let content = self.model.complete(request).await?;
        match content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => {
                tracing::debug!("Model returned no content, using fallback reply");
                Ok(FALLBACK_REPLY.to_string())
            }
        }
    }

    /// Like [`respond`](Self::respond) but never fails.
    pub async fn respond_or_fallback(
        &self,
        history: &[ChatMessage],
        topics_covered: &[String],
        elapsed_minutes: u32,
    ) -> String {
        match self.respond(history, topics_covered, elapsed_minutes).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Teacher reply failed, using fallback");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
