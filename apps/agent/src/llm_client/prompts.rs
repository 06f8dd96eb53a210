// Shared prompt fragments. Each generation step defines its own prompts.rs
// alongside it; this file holds the cross-cutting pieces.

/// Common instruction appended to every personalization prompt.
pub const PERSONALIZATION_INSTRUCTION: &str = "\
    CRITICAL: Ground everything in the student data provided. \
    Build on the listed transferable skills when introducing new material and \
    target the listed skill gaps and learning priorities directly. \
    Do NOT invent skills, roles, or history the student data does not contain.";
