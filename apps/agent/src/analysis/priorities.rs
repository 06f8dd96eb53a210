//! Learning-priority ranking: turns gap categories into a bounded shortlist
//! the course generator anchors on.

use crate::models::report::SkillGapCategory;
use crate::models::requirements::Priority;

/// The shortlist never exceeds this many entries.
pub const MAX_PRIORITIES: usize = 5;
/// A High-priority category contributes at most this many of its gap skills.
pub const HIGH_SKILLS_PER_CATEGORY: usize = 3;

/// Ranks gap skills into a shortlist of at most five.
///
/// Pass 1 takes up to three skills from every High category with no running
/// ceiling check; pass 2 runs only when pass 1 stayed under five and adds
/// each Medium category's first skill, re-checking the ceiling before every
/// append. Low categories never contribute. The final truncate caps the
/// list, so an oversized High harvest is trimmed rather than prevented.
pub fn identify_learning_priorities(skill_gaps: &[SkillGapCategory]) -> Vec<String> {
    let mut priorities: Vec<String> = Vec::new();

    for gap in skill_gaps {
        if gap.priority == Priority::High {
            for skill in gap.skills.iter().take(HIGH_SKILLS_PER_CATEGORY) {
                priorities.push(skill.clone());
            }
        }
    }

    if priorities.len() < MAX_PRIORITIES {
        for gap in skill_gaps {
            if gap.priority == Priority::Medium && priorities.len() < MAX_PRIORITIES {
                if let Some(first) = gap.skills.first() {
                    priorities.push(first.clone());
                }
            }
        }
    }

    priorities.truncate(MAX_PRIORITIES);
    priorities
}
