//! Extraction request construction

use crate::transcript::{Role, Transcript};
use std::fmt::Write;

/// Guidance sent through the system channel for extraction calls
pub const EXTRACTION_GUIDANCE: &str = "You extract structured facts about family relationships \
from conversation transcripts. You respond with a single JSON object and nothing else.";

const INSTRUCTIONS: &str = r#"Extract structured information about family relationships from the conversation below.
Focus ONLY on concrete facts that are explicitly stated, not interpretations or assumptions.

Identify and extract ONLY the following (if present):
1. Family members mentioned (names, roles, ages, descriptive attributes)
2. Relationships between people (marriages, siblings, parent-child, etc.)
3. Family dynamics (communication patterns, decision-making, etc.)
4. Significant events (divorces, births, deaths, moves, conflicts, etc.)

If you are uncertain about a fact, omit it entirely. Do not infer.
Respond with ONLY a JSON object with exactly these four top-level keys, each holding a list.
Output nothing else besides the JSON object.

Example format:
{
    "family_members": [
        {"role": "father", "name": "John", "age": 45, "attributes": ["works long hours", "quiet"]}
    ],
    "relationships": [
        {"type": "marriage", "members": ["mother", "father"], "quality": "tense", "duration": "20 years"}
    ],
    "dynamics": [
        {"type": "communication", "pattern": "father rarely speaks at dinner", "members": ["father"]}
    ],
    "events": [
        {"type": "conflict", "description": "argument about college", "members": ["mother", "daughter"]}
    ]
}"#;

/// Render the transcript as flat text, user and assistant turns only
pub fn render_transcript(transcript: &Transcript) -> String {
    let mut out = String::new();
    for msg in transcript.dialogue() {
        let label = match msg.role {
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
            Role::System => continue,
        };
        let _ = write!(out, "{label}: {}\n\n", msg.content);
    }
    out
}

/// Full extraction prompt for a transcript
pub fn build(transcript: &Transcript) -> String {
    format!(
        "{INSTRUCTIONS}\n\nCONVERSATION:\n{}\nRESPONSE (JSON ONLY):",
        render_transcript(transcript)
    )
}
