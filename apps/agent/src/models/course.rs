use serde::{Deserialize, Serialize};

/// Course outline as parsed from the generator's reply and stored under
/// `course_outline`. Cosmetic string fields default to empty so a
/// structurally sound reply still parses; `weeks` is mandatory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOutline {
    #[serde(default)]
    pub course_title: String,
    #[serde(default)]
    pub course_description: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub target_role: String,
    pub weeks: Vec<CourseWeek>,
}

impl CourseOutline {
    pub fn module_count(&self) -> usize {
        self.weeks.iter().map(|w| w.modules.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseWeek {
    pub week_number: u32,
    pub theme: String,
    #[serde(default)]
    pub description: String,
    pub modules: Vec<CourseModule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseModule {
    pub module_number: u32,
    pub title: String,
    #[serde(default)]
    pub focus_area: String,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
}

/// Generated long-form content for one module, stored as
/// `course_content/module_NN`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleContent {
    pub module_number: u32,
    pub title: String,
    pub content: String,
}
