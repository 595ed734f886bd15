//! Prompt compilation
//!
//! Builds the system prompt and user message for one generation from the
//! transcript, style tags, session history, and an optional VJ steering
//! instruction. Compilation is pure: identical inputs produce byte-identical
//! output.

use crate::session::Session;

/// Base instruction prepended to every system prompt.
pub const BASE_SYSTEM_PROMPT: &str = "\
Given the following transcript, produce an effective Stable Diffusion prompt.

CRITICAL: The diffusion model has NO MEMORY. Each prompt is processed independently.
You must include ALL visual details in EVERY prompt.

IMPORTANT GUIDELINES FOR CHARACTERS AND IP:
- When users specifically request characters, reproduce them faithfully
- Include recognizable details like clothing, appearance, iconic features
- For fictional characters, use their proper names and distinctive visual traits
- Trust the user's intent

Never write things like \"same as before\", \"continue the previous style\".
Keep prompts under 300 characters. No emojis. Avoid hands/fingers if possible.";

/// Operator steering directive selecting a scene-transition style.
///
/// Anything outside the closed set is ignored rather than rejected: the
/// compiled prompt simply carries no VJ block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VjInstruction {
    /// Gentle, continuous scene changes.
    Evolve,
    /// A materially different scene.
    Jump,
    /// Same subject, drastically different style.
    Remix,
}

impl VjInstruction {
    /// Parse a raw instruction string; unrecognized values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "evolve" => Some(Self::Evolve),
            "jump" => Some(Self::Jump),
            "remix" => Some(Self::Remix),
            _ => None,
        }
    }

    /// The fixed directive sentence injected into the system prompt.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Evolve => {
                "Gradually evolve the current scene. Make subtle, gentle changes that flow naturally."
            }
            Self::Jump => {
                "Make a significant visual shift. Create a new scene that departs from the current one."
            }
            Self::Remix => {
                "Keep the subject but dramatically change the style. Same content, different aesthetic."
            }
        }
    }
}

/// Build the system prompt: base instruction plus optional style, continuity,
/// and VJ blocks.
pub fn build_system_prompt(
    style_tags: &str,
    session: &Session,
    vj_instruction: Option<VjInstruction>,
) -> String {
    let mut prompt = String::from(BASE_SYSTEM_PROMPT);

    if !style_tags.trim().is_empty() {
        prompt.push_str(&format!(
            "\n\n=== STYLE CONTEXT (HIGH PRIORITY) ===\n{}\n\nThese style elements should DOMINATE the visual output. Apply them consistently.",
            style_tags
        ));
    }

    if let Some(latest) = session.latest() {
        prompt.push_str(&format!(
            "\n\n=== RECENT PROMPT (for continuity) ===\n{}\n\nBuild iteratively on this scene. Evolve naturally, don't repeat exactly.",
            latest
        ));
    }

    if let Some(instruction) = vj_instruction {
        prompt.push_str(&format!(
            "\n\n=== VJ INSTRUCTION ===\n{}",
            instruction.directive()
        ));
    }

    prompt
}

/// Build the user message: the three newest non-empty prompts as context (when
/// any exist) followed by the transcript.
pub fn build_user_message(transcript: &str, session: &Session) -> String {
    let context: Vec<&str> = session.recent_prompts[..3]
        .iter()
        .map(|p| p.as_str())
        .filter(|p| !p.is_empty())
        .collect();

    if context.is_empty() {
        format!(
            "Transcript:\n{}\n\nGenerate a Stable Diffusion prompt for this scene.",
            transcript
        )
    } else {
        format!(
            "Recent prompts for context:\n{}\n\nNew transcript to respond to:\n{}\n\nGenerate a new Stable Diffusion prompt that builds on the scene.",
            context.join("\n"),
            transcript
        )
    }
}
