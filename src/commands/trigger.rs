use clap::Args;
use serde::Serialize;

use skiff::job::{self, JobRun};
use skiff::trigger::TriggerEvent;
use skiff::Error;

use super::CmdResult;

#[derive(Args)]
pub struct TriggerArgs {
    /// Event name: release-created or manual-dispatch
    pub event: Option<String>,

    /// Event payload JSON, e.g. '{"event": "release_created"}'
    #[arg(long, value_name = "JSON", conflicts_with = "event")]
    pub payload: Option<String>,

    /// Path to the job config (defaults to skiff.json)
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Serialize)]
pub struct TriggerOutput {
    pub command: String,
    #[serde(flatten)]
    pub run: JobRun,
}

pub fn run(args: TriggerArgs, _global: &super::GlobalArgs) -> CmdResult<TriggerOutput> {
    let event = match (&args.event, &args.payload) {
        (Some(name), _) => TriggerEvent::from_name(name)?,
        (None, Some(payload)) => TriggerEvent::from_payload(payload)?,
        (None, None) => {
            return Err(Error::validation_invalid_argument(
                "event",
                "Provide an event name or --payload",
                None,
                Some(vec![
                    "skiff trigger release-created".to_string(),
                    "skiff trigger --payload '{\"event\": \"release_created\"}'".to_string(),
                ]),
            ))
        }
    };

    let config = skiff::config::load(args.config.as_deref())?;
    let job_run = job::run(&config, event)?;
    let exit_code = if job_run.success { 0 } else { 1 };

    Ok((
        TriggerOutput {
            command: "job.trigger".to_string(),
            run: job_run,
        },
        exit_code,
    ))
}
