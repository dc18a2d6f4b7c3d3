//! Notification commands.

use ev_market_core::NotificationId;

use super::{CliError, Context, report};

pub async fn list(ctx: &Context) -> Result<(), CliError> {
    let user_id = ctx.require_user()?;
    let notifications = ctx.client.list_notifications(user_id).await?;
    for n in &notifications {
        let marker = if n.is_read { ' ' } else { '*' };
        let when = n
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{marker} #{:<6} {when:<16} {}", n.notification_id, n.title);
        if !n.content.is_empty() {
            println!("          {}", n.content);
        }
    }
    Ok(())
}

pub async fn unread(ctx: &Context) -> Result<(), CliError> {
    let user_id = ctx.require_user()?;
    let count = report(ctx.client.unread_notification_count(user_id).await);
    println!("{count}");
    Ok(())
}

pub async fn read(ctx: &Context, id: NotificationId) -> Result<(), CliError> {
    ctx.require_user()?;
    ctx.client.mark_notification_read(id).await?;
    println!("Marked #{id} as read");
    Ok(())
}

pub async fn delete(ctx: &Context, id: NotificationId) -> Result<(), CliError> {
    ctx.require_user()?;
    ctx.client.delete_notification(id).await?;
    println!("Deleted #{id}");
    Ok(())
}
