use serde::{Deserialize, Serialize};

/// Canonical skill taxonomy for the target domain, loaded from
/// `skills_taxonomy.json`. Read-only reference input: it is forwarded into the
/// outline prompt so the generator names real skills, but the gap analysis
/// never consults it (matching is name-based against the requirements).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillTaxonomy {
    pub skills: Vec<TaxonomySkill>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomySkill {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}
