//! Prompt templates and module profiles
//!
//! The assistant has two user-facing modules. Each module has its own
//! greeting and its own fixed failure strings; the instruction template sent
//! to the model depends only on whether images are attached.

use std::fmt;

/// Greeting shown at the start of a chat session
pub const CHAT_GREETING: &str =
    "Hey! Need help with social science? I’ve got you covered. What’s your question?";

/// Shown when the provider cannot be initialized (e.g. missing API key)
pub const INIT_FAILURE_TEXT: &str = "Failed to initialize AI. Please check your configuration.";

/// Shown when a chat request fails
pub const CHAT_FAILURE_TEXT: &str = "I'm having trouble helping you right now. Let's try again.";

/// Shown when an image analysis request fails
pub const IMAGE_FAILURE_TEXT: &str = "Failed to analyze image. Please try again.";

const EXPLAIN_TEMPLATE: &str = "Explain this social science concept in very simple, easy-to-understand language for a general audience:
{question}

Guidelines:
- Use clear, everyday language
- Avoid complex academic jargon
- Explain like you're talking to a friend
- Give a straightforward, practical explanation";

const IMAGE_ANALYSIS_PROMPT: &str = "Analyze this image from a social science perspective, considering:
1. Cultural significance and symbolism
2. Social context and implications
3. Historical or contemporary relevance
4. Behavioral and psychological insights

Provide a comprehensive yet concise analysis that reveals deeper sociological meanings.";

/// A user-facing module of the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Module {
    /// Text questions answered in plain language
    #[default]
    Chat,
    /// Social-science reading of uploaded images
    ImageAnalysis,
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat => write!(f, "chat"),
            Self::ImageAnalysis => write!(f, "image analysis"),
        }
    }
}

impl Module {
    /// Built-in greeting, if the module has one
    pub fn greeting(&self) -> Option<&'static str> {
        match self {
            Self::Chat => Some(CHAT_GREETING),
            Self::ImageAnalysis => None,
        }
    }

    /// Fixed text shown when the provider cannot be initialized
    pub fn init_failure_text(&self) -> &'static str {
        INIT_FAILURE_TEXT
    }

    /// Fixed text shown when generation fails
    pub fn failure_text(&self) -> &'static str {
        match self {
            Self::Chat => CHAT_FAILURE_TEXT,
            Self::ImageAnalysis => IMAGE_FAILURE_TEXT,
        }
    }
}

/// Build the prompt sent to the model for a user's input
///
/// Text-only input is wrapped in the plain-language explanation template.
/// With images attached the social-science analysis prompt is used, and any
/// user text is appended as the focus of the analysis.
///
/// # Examples
///
/// ```
/// use scholia::prompts::build_prompt;
///
/// let prompt = build_prompt("What is a folkway?", false);
/// assert!(prompt.contains("What is a folkway?"));
/// assert!(prompt.starts_with("Explain this social science concept"));
///
/// let prompt = build_prompt("", true);
/// assert!(prompt.starts_with("Analyze this image"));
/// ```
pub fn build_prompt(text: &str, has_attachments: bool) -> String {
    let text = text.trim();
    if has_attachments {
        if text.is_empty() {
            IMAGE_ANALYSIS_PROMPT.to_string()
        } else {
            format!(
                "{}\n\nThe user asks you to focus on: {}",
                IMAGE_ANALYSIS_PROMPT, text
            )
        }
    } else {
        EXPLAIN_TEMPLATE.replace("{question}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_module_profile() {
        assert_eq!(Module::Chat.greeting(), Some(CHAT_GREETING));
        assert_eq!(Module::Chat.failure_text(), CHAT_FAILURE_TEXT);
        assert_eq!(Module::Chat.init_failure_text(), INIT_FAILURE_TEXT);
    }

    #[test]
    fn test_image_module_has_no_greeting() {
        assert!(Module::ImageAnalysis.greeting().is_none());
        assert_eq!(Module::ImageAnalysis.failure_text(), IMAGE_FAILURE_TEXT);
    }

    #[test]
    fn test_text_prompt_embeds_question() {
        let prompt = build_prompt("  What is social stratification?  ", false);
        assert!(prompt.contains("\nWhat is social stratification?\n"));
        assert!(prompt.contains("Avoid complex academic jargon"));
    }

    #[test]
    fn test_image_prompt_without_text() {
        assert_eq!(build_prompt("", true), IMAGE_ANALYSIS_PROMPT);
    }

    #[test]
    fn test_image_prompt_with_focus() {
        let prompt = build_prompt("gender roles", true);
        assert!(prompt.starts_with(IMAGE_ANALYSIS_PROMPT));
        assert!(prompt.ends_with("focus on: gender roles"));
    }

    #[test]
    fn test_module_display() {
        assert_eq!(Module::Chat.to_string(), "chat");
        assert_eq!(Module::ImageAnalysis.to_string(), "image analysis");
    }
}
