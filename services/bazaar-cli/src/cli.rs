//! Argument parsing and credential file resolution
//!
//! Credential path precedence: `--config` flag > `BAZAAR_CONFIG` env var >
//! `bazaar-credentials.json` in the working directory.

use std::path::PathBuf;

use thiserror::Error;

pub const USAGE: &str = "\
usage: bazaar-billing [--config PATH] <command> <package> <id> <purchase_token>

commands:
  validate      validate an in-app purchase (id = product id)
  subscription  show a subscription's status (id = subscription id)
  cancel        cancel a subscription's auto-renewal (id = subscription id)";

/// Billing operation requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Validate {
        package_name: String,
        product_id: String,
        purchase_token: String,
    },
    Subscription {
        package_name: String,
        subscription_id: String,
        purchase_token: String,
    },
    Cancel {
        package_name: String,
        subscription_id: String,
        purchase_token: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config_path: Option<String>,
    pub command: Command,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("missing command")]
    MissingCommand,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("{command} expects 3 arguments, got {got}")]
    WrongArity { command: String, got: usize },

    #[error("--config requires a path")]
    MissingConfigPath,
}

/// Parse arguments (without the program name).
pub fn parse_args(args: &[String]) -> Result<Invocation, UsageError> {
    let mut config_path = None;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let path = iter.next().ok_or(UsageError::MissingConfigPath)?;
            config_path = Some(path.clone());
        } else {
            positional.push(arg.clone());
        }
    }

    let (name, rest) = positional
        .split_first()
        .ok_or(UsageError::MissingCommand)?;
    let [package_name, id, purchase_token] = rest else {
        return Err(UsageError::WrongArity {
            command: name.clone(),
            got: rest.len(),
        });
    };
    let (package_name, id, purchase_token) =
        (package_name.clone(), id.clone(), purchase_token.clone());

    let command = match name.as_str() {
        "validate" => Command::Validate {
            package_name,
            product_id: id,
            purchase_token,
        },
        "subscription" => Command::Subscription {
            package_name,
            subscription_id: id,
            purchase_token,
        },
        "cancel" => Command::Cancel {
            package_name,
            subscription_id: id,
            purchase_token,
        },
        other => return Err(UsageError::UnknownCommand(other.to_string())),
    };

    Ok(Invocation {
        config_path,
        command,
    })
}

/// Resolve credential file path from CLI arg or BAZAAR_CONFIG env var.
pub fn resolve_config_path(cli_path: Option<&str>) -> PathBuf {
    if let Some(p) = cli_path {
        return PathBuf::from(p);
    }
    if let Ok(p) = std::env::var("BAZAAR_CONFIG") {
        return PathBuf::from(p);
    }
    PathBuf::from("bazaar-credentials.json")
}
