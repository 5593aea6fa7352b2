use inquire::Confirm;

use crate::config::RegistryConfig;
use crate::types::User;

use super::{init_credentials, password_or_prompt};

fn print_user(user: &User) {
    let mut flags = Vec::new();
    if user.admin {
        flags.push("admin");
    }
    if user.disabled {
        flags.push("disabled");
    }

    if flags.is_empty() {
        println!("{}", user.username);
    } else {
        println!("{} [{}]", user.username, flags.join(", "));
    }
}

pub fn run_user_add(
    config: &RegistryConfig,
    username: String,
    password: Option<String>,
    admin: bool,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let auth = init_credentials(config)?;
    let password = password_or_prompt(password, non_interactive, true)?;

    let user = User {
        admin,
        ..User::new(username)
    };
    crate::auth::validate_credentials(&user.username, &password)?;

    auth.add_user(&user)?;
    auth.set_password(&user.username, &password)?;

    println!("Created user '{}'", user.username);
    Ok(())
}

pub fn run_user_show(config: &RegistryConfig, username: String, json: bool) -> anyhow::Result<()> {
    let auth = init_credentials(config)?;
    let user = auth.get_user(&username)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        print_user(&user);
    }
    Ok(())
}

pub fn run_user_list(config: &RegistryConfig, json: bool) -> anyhow::Result<()> {
    let auth = init_credentials(config)?;
    let users = auth.list_users()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!("No users");
    }
    for user in &users {
        print_user(user);
    }
    Ok(())
}

pub fn run_user_update(
    config: &RegistryConfig,
    username: String,
    admin: Option<bool>,
    disabled: Option<bool>,
) -> anyhow::Result<()> {
    if admin.is_none() && disabled.is_none() {
        anyhow::bail!("Nothing to update; pass --admin or --disabled");
    }

    let auth = init_credentials(config)?;
    let mut user = auth.get_user(&username)?;
    if let Some(admin) = admin {
        user.admin = admin;
    }
    if let Some(disabled) = disabled {
        user.disabled = disabled;
    }

    auth.update_user(&username, &user)?;
    print_user(&user);
    Ok(())
}

pub fn run_user_passwd(
    config: &RegistryConfig,
    username: String,
    password: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let auth = init_credentials(config)?;
    auth.get_user(&username)?;

    let password = password_or_prompt(password, non_interactive, true)?;
    auth.set_password(&username, &password)?;

    println!("Password updated for '{username}'");
    Ok(())
}

pub fn run_user_delete(config: &RegistryConfig, username: String, yes: bool) -> anyhow::Result<()> {
    let auth = init_credentials(config)?;
    auth.get_user(&username)?;

    if !yes {
        let confirmed = Confirm::new(&format!("Delete user '{username}'?"))
            .with_default(false)
            .prompt()?;
        if !confirmed {
            println!("Aborted");
            return Ok(());
        }
    }

    auth.delete_user(&username)?;
    println!("Deleted user '{username}'");
    Ok(())
}

/// Prints a token for the user. The server must share the configured
/// signing key for the token to be accepted.
pub fn run_login(
    config: &RegistryConfig,
    username: String,
    password: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    if config.signing_key_generated {
        anyhow::bail!(
            "No signing key configured; set signing_key in the config file or DEPREG_SIGNING_KEY so the token matches the server's"
        );
    }

    let auth = init_credentials(config)?;
    let password = password_or_prompt(password, non_interactive, false)?;
    let token = auth.login(&username, &password)?;
    println!("{token}");
    Ok(())
}
