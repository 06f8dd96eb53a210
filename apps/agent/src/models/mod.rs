// Serde data model for every JSON artifact the agent reads or writes:
// employee profiles, position requirements, the skills taxonomy, gap reports,
// and generated course structures. Field names are the wire contract.

pub mod course;
pub mod employee;
pub mod report;
pub mod requirements;
pub mod taxonomy;
