//! Listing commands.

use clap::Args;
use ev_market_client::catalog::{
    ProductFilter, SearchSource, classify, partition_by_category, search_products,
};
use ev_market_client::seller_names::SellerNameCache;
use ev_market_core::{Product, ProductCategory, ProductId, UserId};
use rust_decimal::Decimal;

use super::{CliError, Context};

/// Advanced search criteria. Text criteria are case-insensitive.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// `vehicle` or `battery`
    #[arg(long)]
    pub product_type: Option<String>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub condition: Option<String>,
    #[arg(long)]
    pub vehicle_type: Option<String>,
    #[arg(long)]
    pub fuel_type: Option<String>,
    #[arg(long)]
    pub battery_type: Option<String>,
    #[arg(long)]
    pub license_plate: Option<String>,
    #[arg(long)]
    pub year: Option<String>,
    #[arg(long)]
    pub voltage: Option<String>,
    #[arg(long)]
    pub min_price: Option<Decimal>,
    #[arg(long)]
    pub max_price: Option<Decimal>,
    #[arg(long)]
    pub max_mileage: Option<f64>,
    #[arg(long)]
    pub min_battery_health: Option<f64>,
    #[arg(long)]
    pub max_battery_health: Option<f64>,
    #[arg(long)]
    pub min_capacity: Option<f64>,
    #[arg(long)]
    pub max_capacity: Option<f64>,
    #[arg(long)]
    pub min_cycle_count: Option<i64>,
    #[arg(long)]
    pub max_cycle_count: Option<i64>,
}

impl From<SearchArgs> for ProductFilter {
    fn from(args: SearchArgs) -> Self {
        Self {
            product_type: args.product_type,
            condition: args.condition,
            vehicle_type: args.vehicle_type,
            fuel_type: args.fuel_type,
            battery_type: args.battery_type,
            year: args.year,
            voltage: args.voltage,
            brand: args.brand,
            model: args.model,
            license_plate: args.license_plate,
            min_price: args.min_price,
            max_price: args.max_price,
            max_mileage: args.max_mileage,
            min_battery_health: args.min_battery_health,
            max_battery_health: args.max_battery_health,
            min_capacity: args.min_capacity,
            max_capacity: args.max_capacity,
            min_cycle_count: args.min_cycle_count,
            max_cycle_count: args.max_cycle_count,
        }
    }
}

fn print_row(product: &Product) {
    println!(
        "#{:<6} {:<8} {:<40} {:>20}  {}",
        product.id,
        classify(product),
        product.title,
        product.price_display(),
        product.status()
    );
}

pub async fn list(ctx: &Context, category: Option<&str>) -> Result<(), CliError> {
    let wanted = category
        .map(|c| {
            ProductCategory::parse(c)
                .ok_or_else(|| CliError::InvalidArgument(format!("unknown category: {c}")))
        })
        .transpose()?;

    let products = ctx.client.list_products().await?;
    let (vehicles, batteries) = partition_by_category(products);

    if wanted != Some(ProductCategory::Battery) {
        println!("Vehicles ({})", vehicles.len());
        vehicles.iter().for_each(print_row);
    }
    if wanted != Some(ProductCategory::Vehicle) {
        println!("Batteries ({})", batteries.len());
        batteries.iter().for_each(print_row);
    }
    Ok(())
}

pub async fn show(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    let product = ctx.client.get_product(id).await?;

    println!("{} (#{})", product.title, product.id);
    println!("  {} | {} | {}", classify(&product), product.price_display(), product.status());
    if let Some(seller_id) = product.seller_id {
        let cache = SellerNameCache::load(ctx.storage.clone());
        let name = cache
            .resolve(&ctx.client, seller_id, ctx.config.seller_lookup_timeout)
            .await;
        println!("  seller: {name}");
    }

    let attributes = [
        ("brand", product.brand.clone()),
        ("model", product.model.clone()),
        ("condition", product.condition.clone()),
        ("year", product.year.map(|y| y.to_string())),
        ("mileage", product.mileage.map(|m| format!("{m} km"))),
        ("license plate", product.license_plate.clone()),
        ("capacity", product.capacity.map(|c| format!("{c} kWh"))),
        ("voltage", product.voltage.map(|v| format!("{v} V"))),
        ("cycles", product.cycle_count.map(|c| c.to_string())),
        ("battery health", product.battery_health.map(|h| format!("{h}%"))),
    ];
    for (label, value) in attributes {
        if let Some(value) = value {
            println!("  {label}: {value}");
        }
    }
    if let Some(reason) = product.visible_rejection_reason() {
        println!("  rejection reason: {reason}");
    }
    if let Some(description) = &product.description {
        println!();
        println!("{description}");
    }
    Ok(())
}

pub async fn search(ctx: &Context, args: SearchArgs) -> Result<(), CliError> {
    let filter = ProductFilter::from(args);
    let results = search_products(&ctx.client, &filter).await?;

    if results.source == SearchSource::LocalFallback {
        println!("(advanced search unavailable, filtered locally)");
    }
    println!("{} result(s)", results.products.len());
    results.products.iter().for_each(print_row);
    Ok(())
}

pub async fn mine(ctx: &Context) -> Result<(), CliError> {
    let user_id = ctx.require_user()?;
    let products = ctx.client.list_seller_products(user_id).await?;
    products.iter().for_each(print_row);
    for product in &products {
        if let Some(reason) = product.visible_rejection_reason() {
            println!("#{}: {reason}", product.id);
        }
    }
    Ok(())
}

pub async fn seller(ctx: &Context, id: UserId) -> Result<(), CliError> {
    let cache = SellerNameCache::load(ctx.storage.clone());
    let name = cache
        .resolve(&ctx.client, id, ctx.config.seller_lookup_timeout)
        .await;
    println!("{name}");
    Ok(())
}
