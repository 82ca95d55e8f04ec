use std::io::{IsTerminal, Read};

use clap::{Args, Subcommand};
use serde::Serialize;

use skiff::keychain;
use skiff::Error;

use super::CmdResult;

#[derive(Args)]
pub struct CredentialArgs {
    #[command(subcommand)]
    command: CredentialCommand,
}

#[derive(Subcommand)]
enum CredentialCommand {
    /// Store a store login credential in the system keychain
    Set {
        /// Credential id referenced by the job config's credential.keychainId
        id: String,
        /// Credential value; read from stdin when omitted
        #[arg(long)]
        value: Option<String>,
    },
    /// Check whether a credential exists (never prints its value)
    Check { id: String },
    /// Remove a credential from the keychain
    Clear { id: String },
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum CredentialOutput {
    #[serde(rename = "credential.set")]
    Set { id: String },
    #[serde(rename = "credential.check")]
    Check { id: String, exists: bool },
    #[serde(rename = "credential.clear")]
    Clear { id: String },
}

pub fn run(args: CredentialArgs, _global: &super::GlobalArgs) -> CmdResult<CredentialOutput> {
    match args.command {
        CredentialCommand::Set { id, value } => {
            let value = match value {
                Some(value) => value,
                None => read_value_from_stdin()?,
            };
            if value.is_empty() {
                return Err(Error::validation_invalid_argument(
                    "value",
                    "Credential value is empty",
                    None,
                    None,
                ));
            }
            keychain::store(&id, &value)?;
            Ok((CredentialOutput::Set { id }, 0))
        }
        CredentialCommand::Check { id } => {
            let exists = keychain::exists(&id);
            let exit_code = if exists { 0 } else { 1 };
            Ok((CredentialOutput::Check { id, exists }, exit_code))
        }
        CredentialCommand::Clear { id } => {
            keychain::delete(&id)?;
            Ok((CredentialOutput::Clear { id }, 0))
        }
    }
}

fn read_value_from_stdin() -> skiff::Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(Error::validation_invalid_argument(
            "value",
            "Provide --value or pipe the credential on stdin",
            None,
            Some(vec![
                "printf '%s' \"$TOKEN\" | skiff credential set <id>".to_string(),
            ]),
        ));
    }

    let mut buf = String::new();
    stdin
        .read_to_string(&mut buf)
        .map_err(|e| Error::internal_io(e.to_string(), Some("read stdin".to_string())))?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}
