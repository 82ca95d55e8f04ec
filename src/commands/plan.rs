use clap::Args;
use serde::Serialize;

use skiff::job::{self, JobPlan};
use skiff::trigger::TriggerEvent;

use super::CmdResult;

#[derive(Args)]
pub struct PlanArgs {
    /// Event the plan is for (defaults to manual-dispatch)
    #[arg(long)]
    pub event: Option<String>,

    /// Path to the job config (defaults to skiff.json)
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum PlanOutput {
    #[serde(rename = "job.plan")]
    Plan { plan: JobPlan },
}

pub fn run(args: PlanArgs, _global: &super::GlobalArgs) -> CmdResult<PlanOutput> {
    let event = match &args.event {
        Some(name) => TriggerEvent::from_name(name)?,
        None => TriggerEvent::ManualDispatch,
    };
    let config = skiff::config::load(args.config.as_deref())?;
    let plan = job::plan(&config, event);

    Ok((PlanOutput::Plan { plan }, 0))
}
