//! Skill-gap analysis: reconciles an employee's self-reported skill inventory
//! against a position's required skills.
//!
//! Pure and total: no I/O, no shared state, no failure mode. Malformed ratings
//! are compared numerically as-is; strict intake lives on the profile model.

use crate::models::employee::SkillCategory;
use crate::models::report::{SkillGapCategory, SkillGapReport};
use crate::models::requirements::PositionRequirements;

use super::priorities::identify_learning_priorities;

/// A required skill counts as covered at this proficiency or above.
pub const TRANSFERABLE_PROFICIENCY: i32 = 3;
/// Skills at this proficiency or above transfer even when no requirement asks
/// for them.
pub const STRONG_PROFICIENCY: i32 = 4;

/// Inventory entry flattened out of its category, category-then-skill order.
struct FlatSkill<'a> {
    name: &'a str,
    proficiency: i32,
}

/// Classifies every required skill as transferable or a gap and ranks the
/// gaps into a learning-priority shortlist.
///
/// Matching is case-insensitive exact on the skill name; the first match in
/// flattened inventory order wins, not the highest-proficiency one.
/// `transferable_skills` keeps the employee-side casing, first-seen order,
/// duplicates suppressed. Categories with zero gaps are omitted from
/// `skill_gaps` entirely.
pub fn analyze_skills_gap(
    inventory: &[SkillCategory],
    requirements: &PositionRequirements,
) -> SkillGapReport {
    let flattened = flatten_inventory(inventory);

    let mut transferable_skills: Vec<String> = Vec::new();
    let mut skill_gaps: Vec<SkillGapCategory> = Vec::new();

    for required in &requirements.required_skills {
        let mut gaps: Vec<String> = Vec::new();

        for required_skill in &required.skills {
            let wanted = required_skill.to_lowercase();
            match flattened.iter().find(|s| s.name.to_lowercase() == wanted) {
                Some(found) if found.proficiency >= TRANSFERABLE_PROFICIENCY => {
                    push_unique(&mut transferable_skills, found.name);
                }
                // Known-but-weak and absent both land in the gap list,
                // required-side name, input order.
                _ => gaps.push(required_skill.clone()),
            }
        }

        if !gaps.is_empty() {
            skill_gaps.push(SkillGapCategory {
                category: required.category.clone(),
                skills: gaps,
                priority: required.priority.clone(),
            });
        }
    }

    // Second pass: strong skills transfer even when nothing required them.
    for skill in &flattened {
        if skill.proficiency >= STRONG_PROFICIENCY {
            push_unique(&mut transferable_skills, skill.name);
        }
    }

    let learning_priorities = identify_learning_priorities(&skill_gaps);

    SkillGapReport {
        transferable_skills,
        skill_gaps,
        learning_priorities,
    }
}

fn flatten_inventory(inventory: &[SkillCategory]) -> Vec<FlatSkill<'_>> {
    inventory
        .iter()
        .flat_map(|group| {
            group.skills.iter().map(|s| FlatSkill {
                name: s.name.as_str(),
                proficiency: s.proficiency,
            })
        })
        .collect()
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|existing| existing == name) {
        list.push(name.to_string());
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::SkillRecord;
    use crate::models::requirements::{Priority, RequiredSkillCategory};

    fn make_inventory(categories: Vec<(&str, Vec<(&str, i32)>)>) -> Vec<SkillCategory> {
        categories
            .into_iter()
            .map(|(category, skills)| SkillCategory {
                category: category.to_string(),
                skills: skills
                    .into_iter()
                    .map(|(name, proficiency)| SkillRecord {
                        name: name.to_string(),
                        proficiency,
                    })
                    .collect(),
            })
            .collect()
    }

    fn make_requirements(categories: Vec<(&str, Vec<&str>, Priority)>) -> PositionRequirements {
        PositionRequirements {
            required_skills: categories
                .into_iter()
                .map(|(category, skills, priority)| RequiredSkillCategory {
                    category: category.to_string(),
                    skills: skills.into_iter().map(str::to_string).collect(),
                    priority,
                })
                .collect(),
        }
    }

    #[test]
    fn test_proficient_match_is_transferable_not_gap() {
        let inventory = make_inventory(vec![("Tools", vec![("Excel", 4)])]);
        let requirements = make_requirements(vec![(
            "Spreadsheets",
            vec!["Excel"],
            Priority::High,
        )]);

        let report = analyze_skills_gap(&inventory, &requirements);
        assert_eq!(report.transferable_skills, vec!["Excel"]);
        assert!(report.skill_gaps.is_empty());
        assert!(report.learning_priorities.is_empty());
    }

    #[test]
    fn test_empty_inventory_gaps_everything() {
        let requirements = make_requirements(vec![(
            "Accounting",
            vec!["GAAP", "Variance Analysis"],
            Priority::High,
        )]);

        let report = analyze_skills_gap(&[], &requirements);
        assert!(report.transferable_skills.is_empty());
        assert_eq!(report.skill_gaps.len(), 1);
        assert_eq!(report.skill_gaps[0].skills, vec!["GAAP", "Variance Analysis"]);
        assert_eq!(
            report.learning_priorities,
            vec!["GAAP", "Variance Analysis"]
        );
    }

    #[test]
    fn test_match_is_case_insensitive_keeping_employee_casing() {
        let inventory = make_inventory(vec![("Tools", vec![("excel", 3)])]);
        let requirements = make_requirements(vec![(
            "Spreadsheets",
            vec!["Excel"],
            Priority::Medium,
        )]);

        let report = analyze_skills_gap(&inventory, &requirements);
        assert_eq!(report.transferable_skills, vec!["excel"]);
        assert!(report.skill_gaps.is_empty());
    }

    #[test]
    fn test_first_match_in_flattened_order_wins() {
        // The weak SQL appears first in flattened order, so the requirement
        // sees proficiency 2; the stronger duplicate never shadows it.
        let inventory = make_inventory(vec![
            ("Databases", vec![("SQL", 2)]),
            ("Analytics", vec![("SQL", 5)]),
        ]);
        let requirements =
            make_requirements(vec![("Data", vec!["SQL"], Priority::High)]);

        let report = analyze_skills_gap(&inventory, &requirements);
        assert_eq!(report.skill_gaps[0].skills, vec!["SQL"]);
        // The strong duplicate still transfers via the second pass.
        assert_eq!(report.transferable_skills, vec!["SQL"]);
    }

    #[test]
    fn test_weak_match_is_a_gap() {
        let inventory = make_inventory(vec![("Tools", vec![("Excel", 2)])]);
        let requirements = make_requirements(vec![(
            "Spreadsheets",
            vec!["Excel"],
            Priority::Medium,
        )]);

        let report = analyze_skills_gap(&inventory, &requirements);
        assert!(report.transferable_skills.is_empty());
        assert_eq!(report.skill_gaps[0].skills, vec!["Excel"]);
    }

    #[test]
    fn test_absent_required_skill_is_a_gap() {
        let inventory = make_inventory(vec![("Tools", vec![("Excel", 5)])]);
        let requirements = make_requirements(vec![(
            "Modeling",
            vec!["DCF Modeling"],
            Priority::High,
        )]);

        let report = analyze_skills_gap(&inventory, &requirements);
        assert_eq!(report.skill_gaps[0].skills, vec!["DCF Modeling"]);
    }

    #[test]
    fn test_zero_gap_category_is_omitted() {
        let inventory = make_inventory(vec![("Tools", vec![("Excel", 4), ("SQL", 4)])]);
        let requirements = make_requirements(vec![
            ("Spreadsheets", vec!["Excel"], Priority::High),
            ("Accounting", vec!["GAAP"], Priority::High),
        ]);

        let report = analyze_skills_gap(&inventory, &requirements);
        assert_eq!(report.skill_gaps.len(), 1);
        assert_eq!(report.skill_gaps[0].category, "Accounting");
    }

    #[test]
    fn test_strong_unrequested_skills_transfer() {
        let inventory = make_inventory(vec![(
            "Technical",
            vec![("Python", 5), ("Tableau", 4), ("R", 3)],
        )]);
        let requirements = make_requirements(vec![]);

        let report = analyze_skills_gap(&inventory, &requirements);
        // Only proficiency >= 4 transfers without a matching requirement.
        assert_eq!(report.transferable_skills, vec!["Python", "Tableau"]);
        assert!(report.skill_gaps.is_empty());
        assert!(report.learning_priorities.is_empty());
    }

    #[test]
    fn test_transferable_deduped_in_first_seen_order() {
        let inventory = make_inventory(vec![("Tools", vec![("Excel", 4)])]);
        let requirements = make_requirements(vec![
            ("Spreadsheets", vec!["Excel"], Priority::High),
            ("Reporting", vec!["Excel"], Priority::Medium),
        ]);

        let report = analyze_skills_gap(&inventory, &requirements);
        // Required twice and strong enough for the second pass, listed once.
        assert_eq!(report.transferable_skills, vec!["Excel"]);
    }

    #[test]
    fn test_gap_lists_keep_required_input_order() {
        let requirements = make_requirements(vec![(
            "Modeling",
            vec!["Scenario Planning", "DCF Modeling", "Budgeting"],
            Priority::Medium,
        )]);

        let report = analyze_skills_gap(&[], &requirements);
        assert_eq!(
            report.skill_gaps[0].skills,
            vec!["Scenario Planning", "DCF Modeling", "Budgeting"]
        );
    }

    #[test]
    fn test_out_of_range_proficiency_compared_numerically() {
        let inventory = make_inventory(vec![("Tools", vec![("Excel", 0), ("SQL", 9)])]);
        let requirements = make_requirements(vec![
            ("Spreadsheets", vec!["Excel"], Priority::High),
            ("Data", vec!["SQL"], Priority::High),
        ]);

        let report = analyze_skills_gap(&inventory, &requirements);
        assert_eq!(report.skill_gaps.len(), 1);
        assert_eq!(report.skill_gaps[0].skills, vec!["Excel"]);
        assert_eq!(report.transferable_skills, vec!["SQL"]);
    }

    #[test]
    fn test_six_high_categories_truncate_to_five_priorities() {
        let categories: Vec<(String, Vec<String>)> = (1..=6)
            .map(|c| {
                (
                    format!("Category {c}"),
                    (1..=3).map(|s| format!("C{c} Skill {s}")).collect(),
                )
            })
            .collect();
        let requirements = PositionRequirements {
            required_skills: categories
                .iter()
                .map(|(category, skills)| RequiredSkillCategory {
                    category: category.clone(),
                    skills: skills.clone(),
                    priority: Priority::High,
                })
                .collect(),
        };

        let report = analyze_skills_gap(&[], &requirements);
        assert_eq!(
            report.learning_priorities,
            vec![
                "C1 Skill 1",
                "C1 Skill 2",
                "C1 Skill 3",
                "C2 Skill 1",
                "C2 Skill 2"
            ]
        );
    }

    #[test]
    fn test_priorities_are_subset_of_gap_skills() {
        let inventory = make_inventory(vec![("Tools", vec![("Excel", 4), ("SQL", 2)])]);
        let requirements = make_requirements(vec![
            ("Data", vec!["SQL", "Snowflake"], Priority::High),
            ("Accounting", vec!["GAAP"], Priority::Medium),
            ("Reporting", vec!["Excel"], Priority::High),
        ]);

        let report = analyze_skills_gap(&inventory, &requirements);
        let all_gap_skills: Vec<&String> = report
            .skill_gaps
            .iter()
            .flat_map(|g| g.skills.iter())
            .collect();
        assert!(!report.learning_priorities.is_empty());
        for priority in &report.learning_priorities {
            assert!(all_gap_skills.contains(&priority), "{priority} not a gap");
        }
    }

    #[test]
    fn test_identical_inputs_serialize_identically() {
        let inventory = make_inventory(vec![
            ("Technical", vec![("Python", 5), ("SQL", 2)]),
            ("Soft Skills", vec![("Communication", 4)]),
        ]);
        let requirements = make_requirements(vec![
            ("Data", vec!["SQL", "Python"], Priority::High),
            ("Finance", vec!["GAAP"], Priority::Medium),
        ]);

        let first = serde_json::to_string(&analyze_skills_gap(&inventory, &requirements)).unwrap();
        let second = serde_json::to_string(&analyze_skills_gap(&inventory, &requirements)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_inputs_yield_empty_report() {
        let report = analyze_skills_gap(&[], &make_requirements(vec![]));
        assert!(report.transferable_skills.is_empty());
        assert!(report.skill_gaps.is_empty());
        assert!(report.learning_priorities.is_empty());
    }
}
