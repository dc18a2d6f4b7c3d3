//! Favorite commands.

use ev_market_client::favorites::toggle_favorite;
use ev_market_core::ProductId;

use super::{CliError, Context, report};

pub async fn toggle(ctx: &Context, product_id: ProductId) -> Result<(), CliError> {
    let user_id = ctx.require_user()?;
    if report(toggle_favorite(&ctx.client, user_id, product_id).await) {
        println!("#{product_id} is in your favorites");
    } else {
        println!("#{product_id} is not in your favorites");
    }
    Ok(())
}

pub async fn list(ctx: &Context) -> Result<(), CliError> {
    let user_id = ctx.require_user()?;
    let favorites = ctx.client.list_favorites(user_id).await?;
    if favorites.is_empty() {
        println!("No favorites yet");
    }
    for favorite in favorites {
        match ctx.client.get_product(favorite.product_id).await {
            Ok(product) => println!(
                "#{:<6} {}  {}",
                product.id,
                product.title,
                product.price_display()
            ),
            Err(e) if e.is_not_found() => println!("#{:<6} (no longer listed)", favorite.product_id),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
