mod commands;
mod user;

use std::path::Path;
use std::sync::Arc;

use inquire::{Password, PasswordDisplayMode};

pub use commands::UserCommands;
pub use user::{
    run_login, run_user_add, run_user_delete, run_user_list, run_user_passwd, run_user_show,
    run_user_update,
};

use crate::auth::{CredentialStore, MIN_PASSWORD_LEN, TokenService};
use crate::config::RegistryConfig;
use crate::registry::open_credentials;

/// Loads the configuration file (if any) plus `DEPREG_*` overrides.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RegistryConfig> {
    RegistryConfig::load(path).map_err(Into::into)
}

/// Opens the credential backend named by the configuration.
pub fn init_credentials(config: &RegistryConfig) -> anyhow::Result<Arc<dyn CredentialStore>> {
    let tokens = Arc::new(TokenService::new(
        config.signing_key.as_bytes().to_vec(),
        config.token_ttl(),
    ));
    open_credentials(config, tokens).map_err(Into::into)
}

/// Returns `given`, or prompts for a password when absent.
pub fn password_or_prompt(
    given: Option<String>,
    non_interactive: bool,
    confirm: bool,
) -> anyhow::Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    if non_interactive {
        anyhow::bail!("--password is required in non-interactive mode");
    }

    let prompt = Password::new("Password:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_validator(|input: &str| {
            if input.chars().count() < MIN_PASSWORD_LEN {
                Ok(inquire::validator::Validation::Invalid(
                    format!("Password must be at least {MIN_PASSWORD_LEN} characters").into(),
                ))
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        });

    let prompt = if confirm {
        prompt
    } else {
        prompt.without_confirmation()
    };

    Ok(prompt.prompt()?)
}
