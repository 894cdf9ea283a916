//! Fixed guidance and reply texts

use crate::state_machine::{Directive, Phase};

/// Base guidance for the conversation, the first system message of a session
pub const BASE_GUIDANCE: &str = r#"You are a family dynamics expert guiding users to explore and understand their family relationships.

Ground your responses in established psychological theory and name the theory you draw from: Adler's birth order theory, Bowen's family systems theory, attachment theory (Bowlby, Ainsworth), Minuchin's structural family therapy, Satir's communication stances, Gottman's work on conflict, and similar.

Do not assume or speculate about the user's feelings or experiences based on roles, age, or gender. Ask about their direct experience instead. Your role is to guide self-discovery, not to diagnose.

Your conversational goals:
- Help users map their family structure
- Identify specific interaction patterns
- Uncover emotional dynamics and power structures

Progression:
1. Initial family mapping: names, ages, and roles of immediate and influential extended family
2. Communication patterns: how conflict is handled, who talks to whom about sensitive topics
3. Power and decision-making: who decides about finances, parenting, social life
4. Emotional dynamics: bonds, support, expression versus suppression

Keep each message concise (2-3 sentences), reference specific details the user shared, acknowledge their input, and always end with exactly one specific, pointed question."#;

pub const GREETING: &str = "Hello! I'm here to help you explore and understand your family dynamics. \
Let's start by learning about your family members. Could you tell me who makes up your immediate family?";

pub const APOLOGY: &str = "Sorry, I encountered an error while processing your message. \
Please check the API key configuration or try again later.";

pub const EMPTY_REPLY: &str = "Sorry, I received an empty response from the assistant.";

/// User-role nudge for the restore greeting call. Not recorded in the transcript.
pub const RETURNING_USER_NUDGE: &str = "(The user has returned to continue the conversation.)";

const RETURNING_INSTRUCTION: &str = "The user is returning to continue a previous conversation. \
Welcome them back briefly. Do not recap everything above. Pick exactly one of the areas listed \
and ask one targeted follow-up question about it.";

/// Focus text for a phase past the first, reused from its entry directive
fn phase_focus(phase: Phase) -> Option<&'static str> {
    match phase {
        Phase::InitialDataCollection => None,
        Phase::DeepDive => Some(Directive::ExploreDynamics.text()),
        Phase::Analysis => Some(Directive::SurfaceInsights.text()),
    }
}

/// Guidance injected when a saved snapshot is restored
pub fn restore_guidance(phase: Phase, context_summary: &str) -> String {
    let mut out = String::from(BASE_GUIDANCE);
    if let Some(focus) = phase_focus(phase) {
        out.push_str("\n\n");
        out.push_str(focus);
    }
    out.push_str("\n\nWhat you already know from previous conversations:\n");
    out.push_str(context_summary);
    out.push_str("\n\n");
    out.push_str(RETURNING_INSTRUCTION);
    out
}

/// Greeting used when the restore call fails
pub fn welcome_back(area: Option<&str>) -> String {
    match area {
        Some(area) => format!(
            "Welcome back! Last time we talked about your {area}. \
             Has anything changed there since we last spoke?"
        ),
        None => GREETING.to_string(),
    }
}
