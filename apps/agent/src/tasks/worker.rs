//! Polling worker: drains the remote task queue and runs the course
//! pipeline for each employee a task points at.
//!
//! One bad task never stops the loop. Failures are written back to the
//! task's `result` column and the worker moves on; only a failed queue
//! fetch delays the next poll.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use tokio::signal;
use tracing::{debug, error, info, warn};

use crate::errors::AppError;
use crate::models::employee::EmployeeProfile;
use crate::pipeline::CoursePipeline;
use crate::tasks::{AgentTask, EmployeeDocument, TaskBackend, TaskStatus};

const ERROR_BACKOFF_SECS: u64 = 60;

pub struct Worker {
    client: Arc<dyn TaskBackend>,
    pipeline: CoursePipeline,
    poll_interval: Duration,
}

impl Worker {
    pub fn new(
        client: Arc<dyn TaskBackend>,
        pipeline: CoursePipeline,
        poll_interval_secs: u64,
    ) -> Self {
        Self {
            client,
            pipeline,
            poll_interval: Duration::from_secs(poll_interval_secs),
        }
    }

    /// Polls until ctrl-c. With `once` set, runs a single pass and returns
    /// its outcome, which gives scripts a usable exit code.
    pub async fn run(&self, once: bool) -> Result<(), AppError> {
        info!(
            "Worker started, polling every {}s",
            self.poll_interval.as_secs()
        );

        loop {
            let delay = match self.process_pending().await {
                Ok(0) => self.poll_interval,
                Ok(count) => {
                    info!("Processed {count} task(s)");
                    self.poll_interval
                }
                Err(e) => {
                    if once {
                        return Err(e);
                    }
                    error!("Polling pass failed: {e}");
                    Duration::from_secs(ERROR_BACKOFF_SECS)
                }
            };

            if once {
                info!("Single pass finished, stopping");
                return Ok(());
            }

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = signal::ctrl_c() => {
                    info!("Shutdown signal received, stopping worker");
                    return Ok(());
                }
            }
        }
    }

    /// One pass: fetch pending tasks and work through them in order.
    /// Status writes are best-effort; a failed write is logged and the pass
    /// moves on to the next task.
    async fn process_pending(&self) -> Result<usize, AppError> {
        let tasks = self.client.fetch_pending_tasks().await?;
        if tasks.is_empty() {
            return Ok(0);
        }
        info!("Fetched {} pending task(s)", tasks.len());

        let mut processed = 0;
        for task in tasks {
            let task_id = task.id.clone();
            match self.process_task(task).await {
                Ok(result) => {
                    processed += 1;
                    if let Err(update_err) = self
                        .client
                        .update_task_status(&task_id, TaskStatus::Completed, Some(result))
                        .await
                    {
                        error!("Could not mark task {task_id} completed: {update_err}");
                    }
                }
                Err(e) => {
                    warn!("Task {task_id} failed: {e}");
                    let failure = json!({
                        "error": e.to_string(),
                        "timestamp": Utc::now().to_rfc3339(),
                    });
                    if let Err(update_err) = self
                        .client
                        .update_task_status(&task_id, TaskStatus::Failed, Some(failure))
                        .await
                    {
                        error!("Could not mark task {task_id} failed: {update_err}");
                    }
                }
            }
        }

        Ok(processed)
    }

    /// One task end to end: claim it, fetch the employee and the role's
    /// requirements, run the pipeline, stamp the employee row.
    async fn process_task(&self, task: AgentTask) -> Result<Value, AppError> {
        info!(
            "Processing task {} for employee {}",
            task.id, task.data.employee_id
        );
        debug!(
            "Claiming task {} (type {}, status {:?})",
            task.id, task.task_type, task.status
        );
        self.client
            .update_task_status(&task.id, TaskStatus::InProgress, None)
            .await?;

        let record = self.client.fetch_employee(&task.data.employee_id).await?;
        debug!(
            "Employee {} fetched, department {}, {} document(s) on file",
            record.id,
            record.department.as_deref().unwrap_or("unknown"),
            record.documents.len()
        );
        let mut profile = record.profile.clone();
        profile.employee_id = Some(record.id.clone());
        // TODO: download and extract text from document URLs; for now only
        // the file names reach the generation context.
        fold_documents(&mut profile, &record.documents);

        let requirements = self
            .client
            .fetch_position_requirements(&profile.target_role)
            .await?;

        let summary = self
            .pipeline
            .run_for_employee(&record.id, &profile, &requirements)
            .await?;

        self.client.mark_employee_processed(&record.id).await?;

        let mut result = serde_json::to_value(&summary)?;
        if let Some(obj) = result.as_object_mut() {
            obj.insert("employee_id".to_string(), json!(record.id));
            obj.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));
        }
        Ok(result)
    }
}

/// Appends attached document names to the profile's free-form context so
/// the generators can reference what is on file.
fn fold_documents(profile: &mut EmployeeProfile, documents: &[EmployeeDocument]) {
    if documents.is_empty() {
        return;
    }

    let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
    let note = format!("Documents on file: {}", names.join(", "));
    profile.additional_info = Some(match profile.additional_info.take() {
        Some(existing) => format!("{existing}\n{note}"),
        None => note,
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::tempdir;

    use crate::generation::generator::ContentGenerator;
    use crate::models::course::CourseModule;
    use crate::models::report::SkillGapReport;
    use crate::models::requirements::{PositionRequirements, Priority, RequiredSkillCategory};
    use crate::models::taxonomy::SkillTaxonomy;
    use crate::storage::JsonStore;
    use crate::tasks::{EmployeeRecord, TaskData, TASK_TYPE};

    const OUTLINE_JSON: &str = r#"{
        "course_title": "Path to Senior",
        "course_description": "Closing the gap",
        "student_name": "Ana",
        "duration": "4 weeks",
        "target_role": "Senior Dev",
        "weeks": [
            {
                "week_number": 1,
                "theme": "Foundations",
                "description": "Start here",
                "modules": [
                    {"module_number": 1, "title": "Ownership in Depth", "focus_area": "Rust", "learning_objectives": ["Explain moves"]},
                    {"module_number": 2, "title": "Async Patterns", "focus_area": "Rust", "learning_objectives": ["Use join sets"]}
                ]
            }
        ]
    }"#;

    struct CannedGenerator;

    #[async_trait]
    impl ContentGenerator for CannedGenerator {
        async fn generate_outline(
            &self,
            _profile: &EmployeeProfile,
            _report: &SkillGapReport,
            _taxonomy: &SkillTaxonomy,
        ) -> Result<String, AppError> {
            Ok(OUTLINE_JSON.to_string())
        }

        async fn generate_module_content(
            &self,
            module: &CourseModule,
            _week_number: u32,
            _week_theme: &str,
            _profile: &EmployeeProfile,
            _report: &SkillGapReport,
        ) -> Result<String, AppError> {
            Ok(format!("<h3>Lesson {}</h3>", module.module_number))
        }
    }

    /// Scripted backend: serves a fixed queue, records every status write,
    /// and can reject the completed write for one task or lose an employee.
    struct ScriptedBackend {
        tasks: Vec<AgentTask>,
        record: EmployeeRecord,
        requirements: PositionRequirements,
        missing_employees: Vec<String>,
        reject_completed_for: Option<String>,
        status_log: Mutex<Vec<(String, TaskStatus)>>,
        processed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TaskBackend for ScriptedBackend {
        async fn fetch_pending_tasks(&self) -> Result<Vec<AgentTask>, AppError> {
            Ok(self.tasks.clone())
        }

        async fn fetch_employee(&self, employee_id: &str) -> Result<EmployeeRecord, AppError> {
            if self.missing_employees.iter().any(|id| id == employee_id) {
                return Err(AppError::NotFound(format!(
                    "Employee '{employee_id}' not found"
                )));
            }
            let mut record = self.record.clone();
            record.id = employee_id.to_string();
            Ok(record)
        }

        async fn fetch_position_requirements(
            &self,
            _role: &str,
        ) -> Result<PositionRequirements, AppError> {
            Ok(self.requirements.clone())
        }

        async fn update_task_status(
            &self,
            task_id: &str,
            status: TaskStatus,
            _result: Option<Value>,
        ) -> Result<(), AppError> {
            self.status_log
                .lock()
                .unwrap()
                .push((task_id.to_string(), status));
            if status == TaskStatus::Completed
                && self.reject_completed_for.as_deref() == Some(task_id)
            {
                return Err(AppError::Tasks("status write rejected".to_string()));
            }
            Ok(())
        }

        async fn mark_employee_processed(&self, employee_id: &str) -> Result<(), AppError> {
            self.processed.lock().unwrap().push(employee_id.to_string());
            Ok(())
        }
    }

    fn make_task(id: &str, employee_id: &str) -> AgentTask {
        AgentTask {
            id: id.to_string(),
            task_type: TASK_TYPE.to_string(),
            status: TaskStatus::Pending,
            data: TaskData {
                employee_id: employee_id.to_string(),
            },
        }
    }

    fn make_backend(tasks: Vec<AgentTask>) -> ScriptedBackend {
        ScriptedBackend {
            tasks,
            record: EmployeeRecord {
                id: String::new(),
                profile: make_profile(),
                department: Some("Engineering".to_string()),
                documents: Vec::new(),
            },
            requirements: PositionRequirements {
                required_skills: vec![RequiredSkillCategory {
                    category: "Engineering".to_string(),
                    skills: vec!["Rust".to_string(), "Distributed Systems".to_string()],
                    priority: Priority::High,
                }],
            },
            missing_employees: Vec::new(),
            reject_completed_for: None,
            status_log: Mutex::new(Vec::new()),
            processed: Mutex::new(Vec::new()),
        }
    }

    fn make_worker(backend: Arc<ScriptedBackend>, root: &std::path::Path) -> Worker {
        let pipeline = CoursePipeline::new(
            JsonStore::new(root),
            Arc::new(CannedGenerator) as Arc<dyn ContentGenerator>,
            2,
        );
        Worker::new(backend, pipeline, 1)
    }

    fn make_profile() -> EmployeeProfile {
        EmployeeProfile {
            employee_id: None,
            name: "Ana".to_string(),
            current_role: "Dev".to_string(),
            target_role: "Senior Dev".to_string(),
            years_experience: None,
            education: None,
            additional_info: None,
            skills: Vec::new(),
        }
    }

    fn make_document(name: &str) -> EmployeeDocument {
        EmployeeDocument {
            name: name.to_string(),
            url: None,
        }
    }

    #[tokio::test]
    async fn test_completed_write_failure_does_not_stop_the_pass() {
        let dir = tempdir().unwrap();
        let mut backend = make_backend(vec![
            make_task("task-1", "emp-1"),
            make_task("task-2", "emp-2"),
        ]);
        backend.reject_completed_for = Some("task-1".to_string());
        let backend = Arc::new(backend);
        let worker = make_worker(Arc::clone(&backend), dir.path());

        let processed = worker.process_pending().await.unwrap();

        assert_eq!(processed, 2);
        assert_eq!(
            backend.processed.lock().unwrap().as_slice(),
            ["emp-1", "emp-2"]
        );
        let log = backend.status_log.lock().unwrap();
        assert!(log.contains(&("task-1".to_string(), TaskStatus::Completed)));
        assert!(log.contains(&("task-2".to_string(), TaskStatus::Completed)));
    }

    #[tokio::test]
    async fn test_failed_task_is_marked_failed_and_the_pass_continues() {
        let dir = tempdir().unwrap();
        let mut backend = make_backend(vec![
            make_task("task-1", "emp-gone"),
            make_task("task-2", "emp-2"),
        ]);
        backend.missing_employees = vec!["emp-gone".to_string()];
        let backend = Arc::new(backend);
        let worker = make_worker(Arc::clone(&backend), dir.path());

        let processed = worker.process_pending().await.unwrap();

        assert_eq!(processed, 1);
        assert_eq!(backend.processed.lock().unwrap().as_slice(), ["emp-2"]);
        let log = backend.status_log.lock().unwrap();
        assert!(log.contains(&("task-1".to_string(), TaskStatus::Failed)));
        assert!(log.contains(&("task-2".to_string(), TaskStatus::Completed)));
    }

    #[test]
    fn test_fold_documents_sets_note_when_context_absent() {
        let mut profile = make_profile();
        fold_documents(
            &mut profile,
            &[make_document("resume.pdf"), make_document("review.docx")],
        );

        assert_eq!(
            profile.additional_info.as_deref(),
            Some("Documents on file: resume.pdf, review.docx")
        );
    }

    #[test]
    fn test_fold_documents_appends_to_existing_context() {
        let mut profile = make_profile();
        profile.additional_info = Some("Prefers evening study".to_string());
        fold_documents(&mut profile, &[make_document("resume.pdf")]);

        assert_eq!(
            profile.additional_info.as_deref(),
            Some("Prefers evening study\nDocuments on file: resume.pdf")
        );
    }

    #[test]
    fn test_fold_documents_without_documents_is_a_noop() {
        let mut profile = make_profile();
        fold_documents(&mut profile, &[]);
        assert!(profile.additional_info.is_none());
    }
}
