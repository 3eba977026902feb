use anyhow::Result;

use crate::api::RegisterRequest;
use crate::cli::prompt;
use crate::cli::CliApp;

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => prompt::read_hidden("Password: "),
    }
}

pub async fn login(app: &mut CliApp, email: &str, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password)?;
    let user = app.login(email, &password).await?;
    println!("Logged in as {} ({})", user.username, user.email);
    Ok(())
}

pub async fn register(
    app: &mut CliApp,
    username: String,
    email: String,
    full_name: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let password = password_or_prompt(password)?;
    let user = app
        .register(RegisterRequest {
            username,
            email,
            password,
            full_name,
        })
        .await?;
    println!(
        "Account created for {}. Log in with 'moodboard login {}'.",
        user.username, user.email
    );
    Ok(())
}

pub async fn logout(app: &mut CliApp) -> Result<()> {
    app.logout().await?;
    println!("Logged out");
    Ok(())
}

pub async fn whoami(app: &mut CliApp) -> Result<()> {
    let user = app.whoami().await?;
    match &user.full_name {
        Some(name) => println!("{} <{}> ({})", user.username, user.email, name),
        None => println!("{} <{}>", user.username, user.email),
    }
    println!("Member since {}", user.created_at.format("%Y-%m-%d"));
    Ok(())
}
