use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::GlobalArgs;
use commands::{config, credential, plan, run, trigger};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "skiff")]
#[command(version = VERSION)]
#[command(about = "CLI for release pipeline automation: fetch, package, publish")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the release job (manual dispatch)
    Run(run::RunArgs),
    /// Run the release job for an external trigger event
    Trigger(trigger::TriggerArgs),
    /// Show the step plan without executing
    Plan(plan::PlanArgs),
    /// Manage job configuration
    Config(config::ConfigArgs),
    /// Manage store credentials in the system keychain
    Credential(credential::CredentialArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs {};

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
