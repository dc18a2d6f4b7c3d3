//! Sign-in commands.

use ev_market_client::api::LoginRequest;
use secrecy::SecretString;

use super::{CliError, Context};

pub async fn login(ctx: &Context, email: String, password: String) -> Result<(), CliError> {
    let request = LoginRequest {
        email,
        password: SecretString::from(password),
    };
    let session = ctx.client.login(&request).await?;
    println!(
        "Signed in as {} ({})",
        session.user.display_name(),
        session.user.user_id
    );
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<(), CliError> {
    ctx.client.logout()?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<(), CliError> {
    let user = ctx.client.session().user()?.ok_or(CliError::NotSignedIn)?;
    println!("{} <{}>", user.display_name(), user.email);
    println!("  id:   {}", user.user_id);
    if !user.role.is_empty() {
        println!("  role: {}", user.role);
    }
    if let Some(phone) = &user.phone {
        println!("  phone: {phone}");
    }
    Ok(())
}
