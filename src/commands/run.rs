use clap::Args;
use serde::Serialize;

use skiff::job::{self, JobRun};
use skiff::trigger::TriggerEvent;

use super::CmdResult;

#[derive(Args)]
pub struct RunArgs {
    /// Path to the job config (defaults to skiff.json)
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Serialize)]
pub struct RunOutput {
    pub command: String,
    #[serde(flatten)]
    pub run: JobRun,
}

/// `skiff run` is the manual-dispatch trigger: no parameters, identical
/// step sequencing to a release-created event.
pub fn run(args: RunArgs, _global: &super::GlobalArgs) -> CmdResult<RunOutput> {
    let config = skiff::config::load(args.config.as_deref())?;
    let job_run = job::run(&config, TriggerEvent::ManualDispatch)?;
    let exit_code = if job_run.success { 0 } else { 1 };

    Ok((
        RunOutput {
            command: "job.run".to_string(),
            run: job_run,
        },
        exit_code,
    ))
}
