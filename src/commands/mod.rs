pub mod config;
pub mod credential;
pub mod plan;
pub mod run;
pub mod trigger;

pub type CmdResult<T> = skiff::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

/// Dispatch a parsed command and serialize its output for the JSON envelope.
pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (skiff::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Run(args) => crate::output::map_cmd_result_to_json(run::run(args, global)),
        crate::Commands::Trigger(args) => {
            crate::output::map_cmd_result_to_json(trigger::run(args, global))
        }
        crate::Commands::Plan(args) => {
            crate::output::map_cmd_result_to_json(plan::run(args, global))
        }
        crate::Commands::Config(args) => {
            crate::output::map_cmd_result_to_json(config::run(args, global))
        }
        crate::Commands::Credential(args) => {
            crate::output::map_cmd_result_to_json(credential::run(args, global))
        }
    }
}
