//! Job orchestration: plan and run the fetch → build → publish sequence
//! for a trigger event.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::build;
use crate::config::JobConfig;
use crate::context::ExecutionContext;
use crate::error::{Error, Result};
use crate::fetch;
use crate::pipeline::{self, RunResult, RunStatus, Step, StepExecutor, StepResult};
use crate::publish;
use crate::trigger::TriggerEvent;

pub const STEP_FETCH: &str = "fetch";
pub const STEP_BUILD: &str = "build";
pub const STEP_PUBLISH: &str = "publish";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPlan {
    pub event: TriggerEvent,
    pub repository: String,
    pub channel: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRun {
    pub run_id: String,
    pub event: TriggerEvent,
    pub channel: String,
    pub started_at: String,
    pub finished_at: String,
    pub success: bool,
    #[serde(flatten)]
    pub result: RunResult,
}

/// The step sequence is fixed and identical for every event kind; the
/// event only causes execution.
pub fn plan(config: &JobConfig, event: TriggerEvent) -> JobPlan {
    let steps = vec![
        Step {
            id: STEP_FETCH.to_string(),
            step_type: STEP_FETCH.to_string(),
            label: Some(format!("Fetch {}", config.repository)),
        },
        Step {
            id: STEP_BUILD.to_string(),
            step_type: STEP_BUILD.to_string(),
            label: Some(format!("Package artifact ({})", config.artifact_pattern)),
        },
        Step {
            id: STEP_PUBLISH.to_string(),
            step_type: STEP_PUBLISH.to_string(),
            label: Some(format!("Publish to channel '{}'", config.channel)),
        },
    ];

    JobPlan {
        event,
        repository: config.repository.clone(),
        channel: config.channel.clone(),
        steps,
    }
}

/// Execute a job inside a fresh ephemeral context. The context (and any
/// artifact in it) is discarded when this returns, whatever the outcome.
pub fn run(config: &JobConfig, event: TriggerEvent) -> Result<JobRun> {
    let job_plan = plan(config, event);
    let ctx = ExecutionContext::new()?;
    let executor = JobStepExecutor { config, ctx: &ctx };

    let started_at = Utc::now().to_rfc3339();
    log_status!("job", "Run {} triggered by {}", ctx.run_id, event);
    let result = pipeline::run(&job_plan.steps, &executor);
    let finished_at = Utc::now().to_rfc3339();

    let success = result.succeeded();
    log_status!(
        "job",
        "Run {} {}",
        ctx.run_id,
        if success { "succeeded" } else { "failed" }
    );

    Ok(JobRun {
        run_id: ctx.run_id.clone(),
        event,
        channel: job_plan.channel,
        started_at,
        finished_at,
        success,
        result,
    })
}

struct JobStepExecutor<'a> {
    config: &'a JobConfig,
    ctx: &'a ExecutionContext,
}

impl JobStepExecutor<'_> {
    fn success_result(&self, step: &Step, data: serde_json::Value) -> StepResult {
        StepResult {
            id: step.id.clone(),
            step_type: step.step_type.clone(),
            status: RunStatus::Success,
            warnings: Vec::new(),
            hints: Vec::new(),
            data: Some(data),
            error: None,
            error_code: None,
        }
    }
}

impl StepExecutor for JobStepExecutor<'_> {
    fn execute_step(&self, step: &Step) -> Result<StepResult> {
        let data = match step.id.as_str() {
            STEP_FETCH => {
                let output = fetch::fetch(
                    &self.config.repository,
                    self.config.revision.as_deref(),
                    self.ctx,
                )?;
                serde_json::to_value(output)
            }
            STEP_BUILD => {
                let output = build::build(
                    &self.config.build_command,
                    &self.config.artifact_pattern,
                    self.ctx,
                )?;
                serde_json::to_value(output)
            }
            STEP_PUBLISH => {
                let output = publish::publish(self.config, self.ctx)?;
                serde_json::to_value(output)
            }
            other => {
                return Err(Error::internal_unexpected(format!(
                    "Unknown job step '{}'",
                    other
                )))
            }
        };

        let data = data
            .map_err(|e| Error::internal_json(e.to_string(), Some("step output".to_string())))?;
        Ok(self.success_result(step, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{self, CredentialSource};
    use std::fs;
    use std::path::Path;
    use std::process::Command;

    #[test]
    fn plan_orders_fetch_build_publish() {
        let plan = plan(&config::template(), TriggerEvent::ManualDispatch);
        let ids: Vec<&str> = plan.steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["fetch", "build", "publish"]);
        assert_eq!(plan.channel, "edge");
    }

    #[test]
    fn both_event_kinds_produce_identical_sequencing() {
        let config = config::template();
        let manual = plan(&config, TriggerEvent::ManualDispatch);
        let release = plan(&config, TriggerEvent::ReleaseCreated);

        let manual_ids: Vec<&String> = manual.steps.iter().map(|s| &s.id).collect();
        let release_ids: Vec<&String> = release.steps.iter().map(|s| &s.id).collect();
        assert_eq!(manual_ids, release_ids);
        assert_eq!(manual.channel, release.channel);
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args([
                "-c",
                "user.email=test@example.com",
                "-c",
                "user.name=test",
            ])
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    fn fixture_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q", "-b", "main"]);
        fs::write(dir.path().join("Makefile"), "all:\n").unwrap();
        git(dir.path(), &["add", "."]);
        git(dir.path(), &["commit", "-q", "-m", "initial"]);
        dir
    }

    fn job_config(repo: &Path) -> config::JobConfig {
        config::JobConfig {
            repository: repo.to_string_lossy().to_string(),
            revision: None,
            build_command: "mkdir -p dist && printf payload > dist/app.snap".to_string(),
            artifact_pattern: "dist/*.snap".to_string(),
            publish_command: "test -f {{artifact}} && echo published to {{channel}}".to_string(),
            channel: "edge".to_string(),
            credential: CredentialSource {
                keychain_id: None,
                env: Some("SKIFF_TEST_JOB_LOGIN".to_string()),
            },
        }
    }

    #[test]
    fn full_run_succeeds_and_publishes_the_artifact() {
        std::env::set_var("SKIFF_TEST_JOB_LOGIN", "sekrit");
        let repo = fixture_repo();
        let run = run(&job_config(repo.path()), TriggerEvent::ReleaseCreated).unwrap();

        assert!(run.success);
        assert_eq!(run.result.summary.succeeded, 3);
        let publish_step = &run.result.steps[2];
        assert_eq!(publish_step.status, RunStatus::Success);
        let data = publish_step.data.as_ref().unwrap();
        assert_eq!(data["channel"], "edge");
        assert!(data["stdout"].as_str().unwrap().contains("published to edge"));
    }

    #[test]
    fn fetch_failure_fails_the_job_and_skips_the_rest() {
        std::env::set_var("SKIFF_TEST_JOB_LOGIN", "sekrit");
        let missing = tempfile::tempdir().unwrap();
        let mut config = job_config(&missing.path().join("no-such-repo"));
        config.revision = None;

        let run = run(&config, TriggerEvent::ManualDispatch).unwrap();
        assert!(!run.success);
        assert_eq!(run.result.steps[0].status, RunStatus::Failed);
        assert_eq!(
            run.result.steps[0].error_code.as_deref(),
            Some("fetch.clone_failed")
        );
        assert_eq!(run.result.steps[1].status, RunStatus::Skipped);
        assert_eq!(run.result.steps[2].status, RunStatus::Skipped);
    }

    #[test]
    fn build_failure_never_reaches_publish() {
        std::env::set_var("SKIFF_TEST_JOB_LOGIN", "sekrit");
        let repo = fixture_repo();
        let mut config = job_config(repo.path());
        config.build_command = "exit 1".to_string();

        let run = run(&config, TriggerEvent::ManualDispatch).unwrap();
        assert!(!run.success);
        assert_eq!(run.result.steps[1].status, RunStatus::Failed);
        assert_eq!(run.result.steps[2].status, RunStatus::Skipped);
        assert_eq!(run.result.summary.failed, 1);
    }
}
