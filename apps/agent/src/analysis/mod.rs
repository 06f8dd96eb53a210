// Pure analysis core: skill-gap reconciliation and learning-priority ranking.
// No I/O and no LLM calls; identical inputs always produce identical reports.

pub mod gap;
pub mod priorities;
