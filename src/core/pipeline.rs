use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

pub trait StepExecutor {
    fn execute_step(&self, step: &Step) -> Result<StepResult>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub id: String,
    #[serde(rename = "type")]
    pub step_type: String,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<crate::error::Hint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub steps: Vec<StepResult>,
    pub status: RunStatus,
    pub summary: RunSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_steps: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunResult {
    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Success
    }
}

/// Execute steps in order, aborting at the first failure.
///
/// The job contract is sequence-with-abort: once a step fails, every
/// remaining step is recorded as skipped and the run is failed. There is
/// no retry and no partial success.
pub fn run(steps: &[Step], executor: &dyn StepExecutor) -> RunResult {
    let mut results = Vec::with_capacity(steps.len());
    let mut failed_step: Option<String> = None;

    for step in steps {
        if let Some(failed) = &failed_step {
            results.push(StepResult {
                id: step.id.clone(),
                step_type: step.step_type.clone(),
                status: RunStatus::Skipped,
                warnings: vec![format!("Skipped because '{}' did not succeed", failed)],
                hints: Vec::new(),
                data: None,
                error: None,
                error_code: None,
            });
            continue;
        }

        let result = execute_single_step(step, executor);
        if result.status == RunStatus::Failed {
            failed_step = Some(step.id.clone());
        }
        results.push(result);
    }

    let status = if failed_step.is_some() {
        RunStatus::Failed
    } else {
        RunStatus::Success
    };
    let summary = build_summary(&results);

    RunResult {
        steps: results,
        status,
        summary,
    }
}

fn execute_single_step(step: &Step, executor: &dyn StepExecutor) -> StepResult {
    match executor.execute_step(step) {
        Ok(result) => result,
        Err(err) => StepResult {
            id: step.id.clone(),
            step_type: step.step_type.clone(),
            status: RunStatus::Failed,
            warnings: Vec::new(),
            hints: err.hints.clone(),
            data: Some(err.details.clone()),
            error: Some(err.message.clone()),
            error_code: Some(err.code.as_str().to_string()),
        },
    }
}

fn build_summary(results: &[StepResult]) -> RunSummary {
    let succeeded = results
        .iter()
        .filter(|r| matches!(r.status, RunStatus::Success))
        .count();
    let failed = results
        .iter()
        .filter(|r| matches!(r.status, RunStatus::Failed))
        .count();
    let skipped = results
        .iter()
        .filter(|r| matches!(r.status, RunStatus::Skipped))
        .count();

    RunSummary {
        total_steps: results.len(),
        succeeded,
        failed,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::Mutex;

    struct ScriptedExecutor {
        fail_on: Option<&'static str>,
        error_on: Option<&'static str>,
        executed: Mutex<Vec<String>>,
    }

    impl ScriptedExecutor {
        fn new() -> Self {
            Self {
                fail_on: None,
                error_on: None,
                executed: Mutex::new(Vec::new()),
            }
        }
    }

    impl StepExecutor for ScriptedExecutor {
        fn execute_step(&self, step: &Step) -> crate::error::Result<StepResult> {
            self.executed.lock().unwrap().push(step.id.clone());

            if self.error_on == Some(step.id.as_str()) {
                return Err(Error::build_artifact_missing("dist/*.snap"));
            }

            let status = if self.fail_on == Some(step.id.as_str()) {
                RunStatus::Failed
            } else {
                RunStatus::Success
            };

            Ok(StepResult {
                id: step.id.clone(),
                step_type: step.step_type.clone(),
                status,
                warnings: Vec::new(),
                hints: Vec::new(),
                data: None,
                error: None,
                error_code: None,
            })
        }
    }

    fn three_steps() -> Vec<Step> {
        ["fetch", "build", "publish"]
            .iter()
            .map(|id| Step {
                id: id.to_string(),
                step_type: id.to_string(),
                label: None,
            })
            .collect()
    }

    #[test]
    fn all_steps_run_in_order_on_success() {
        let executor = ScriptedExecutor::new();
        let result = run(&three_steps(), &executor);

        assert_eq!(result.status, RunStatus::Success);
        assert!(result.succeeded());
        assert_eq!(
            *executor.executed.lock().unwrap(),
            vec!["fetch", "build", "publish"]
        );
        assert_eq!(result.summary.succeeded, 3);
        assert_eq!(result.summary.failed, 0);
    }

    #[test]
    fn fetch_failure_skips_build_and_publish() {
        let mut executor = ScriptedExecutor::new();
        executor.fail_on = Some("fetch");
        let result = run(&three_steps(), &executor);

        assert_eq!(result.status, RunStatus::Failed);
        assert_eq!(*executor.executed.lock().unwrap(), vec!["fetch"]);
        assert_eq!(result.steps[1].status, RunStatus::Skipped);
        assert_eq!(result.steps[2].status, RunStatus::Skipped);
        assert_eq!(
            result.steps[1].warnings,
            vec!["Skipped because 'fetch' did not succeed"]
        );
    }

    #[test]
    fn build_failure_skips_publish_only() {
        let mut executor = ScriptedExecutor::new();
        executor.fail_on = Some("build");
        let result = run(&three_steps(), &executor);

        assert_eq!(result.status, RunStatus::Failed);
        assert_eq!(*executor.executed.lock().unwrap(), vec!["fetch", "build"]);
        assert_eq!(result.steps[0].status, RunStatus::Success);
        assert_eq!(result.steps[2].status, RunStatus::Skipped);
        assert_eq!(result.summary.succeeded, 1);
        assert_eq!(result.summary.failed, 1);
        assert_eq!(result.summary.skipped, 1);
    }

    #[test]
    fn executor_error_becomes_failed_step_with_code() {
        let mut executor = ScriptedExecutor::new();
        executor.error_on = Some("build");
        let result = run(&three_steps(), &executor);

        assert_eq!(result.status, RunStatus::Failed);
        let build = &result.steps[1];
        assert_eq!(build.status, RunStatus::Failed);
        assert_eq!(build.error_code.as_deref(), Some("build.artifact_missing"));
        assert!(build.error.is_some());
        assert_eq!(result.steps[2].status, RunStatus::Skipped);
    }

    #[test]
    fn empty_step_list_is_a_success() {
        let executor = ScriptedExecutor::new();
        let result = run(&[], &executor);
        assert_eq!(result.status, RunStatus::Success);
        assert_eq!(result.summary.total_steps, 0);
    }
}
