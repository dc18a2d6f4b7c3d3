//! Order and payment commands.

use ev_market_client::api::{CreateOrder, CreatePayment};
use ev_market_client::payment_return::{PaymentReturn, parse_payment_return, strip_payment_params};
use ev_market_client::signals::{SignalBus, SignalKind};
use ev_market_core::{OrderId, Payment, PaymentId, PaymentType, Price, ProductId};
use rust_decimal::Decimal;
use url::Url;

use super::{CliError, Context};

fn print_payment(payment: &Payment) {
    println!(
        "Payment #{} ({}) {} {}",
        payment.payment_id,
        payment
            .payment_type
            .map_or_else(|| "unknown type".to_string(), |t| t.to_string()),
        Price::new(payment.amount).display(),
        payment.status
    );
    if let Some(url) = &payment.payment_url {
        println!("Open to pay: {url}");
    }
}

pub async fn order(ctx: &Context, product_id: ProductId, amount: Decimal) -> Result<(), CliError> {
    let buyer_id = ctx.require_user()?;
    let product = ctx.client.get_product(product_id).await?;
    let order = ctx
        .client
        .create_order(&CreateOrder {
            buyer_id,
            product_id,
            seller_id: product.seller_id,
            total_amount: amount,
        })
        .await?;
    println!(
        "Order #{} for \"{}\" ({})",
        order.order_id,
        product.title,
        Price::new(order.total_amount).display()
    );
    Ok(())
}

pub async fn pay_order(
    ctx: &Context,
    order_id: OrderId,
    amount: Decimal,
    payment_type: PaymentType,
) -> Result<(), CliError> {
    ctx.require_user()?;
    let payment = ctx
        .client
        .create_payment(&CreatePayment::for_order(order_id, amount, payment_type))
        .await?;
    print_payment(&payment);
    Ok(())
}

pub async fn verify(ctx: &Context, product_id: ProductId, amount: Decimal) -> Result<(), CliError> {
    ctx.require_user()?;
    let payment = ctx
        .client
        .create_payment(&CreatePayment::verification(product_id, amount))
        .await?;
    print_payment(&payment);
    Ok(())
}

pub async fn status(ctx: &Context, id: PaymentId) -> Result<(), CliError> {
    ctx.require_user()?;
    let payment = ctx.client.get_payment(id).await?;
    print_payment(&payment);
    Ok(())
}

/// Report a provider redirect and tell other windows about a completed
/// payment.
pub fn handle_return(ctx: &Context, raw_url: &str) -> Result<(), CliError> {
    let url = Url::parse(raw_url)
        .map_err(|e| CliError::InvalidArgument(format!("invalid URL: {e}")))?;

    let Some(outcome) = parse_payment_return(&url) else {
        println!("No payment information in this URL");
        return Ok(());
    };

    match &outcome {
        PaymentReturn::Success(details) => {
            println!("Thanh toán thành công");
            if let Some(amount) = details.amount {
                println!("  amount: {}", Price::new(amount).display());
            }
            if let Some(transaction_no) = &details.transaction_no {
                println!("  transaction: {transaction_no}");
            }
            if let Some(payment_id) = details.payment_id() {
                let signal = SignalBus::new(ctx.storage.clone()).publish(
                    SignalKind::PaymentCompleted {
                        payment_id,
                        amount: details.amount,
                    },
                )?;
                tracing::info!(signal_id = signal.id, %payment_id, "Payment completion signalled");
            }
        }
        PaymentReturn::Failure { reason, code, .. } => {
            println!("{reason}");
            if let Some(code) = code {
                println!("  code: {code}");
            }
        }
    }

    println!("Continue at: {}", strip_payment_params(&url));
    Ok(())
}

pub fn signals(ctx: &Context, after: u64) -> Result<(), CliError> {
    let mut listener = SignalBus::new(ctx.storage.clone()).listen_after(after);
    for signal in listener.poll()? {
        let at = signal.published_at.format("%Y-%m-%d %H:%M:%S");
        match signal.kind {
            SignalKind::PaymentCompleted { payment_id, amount } => println!(
                "{:>4} {at} payment #{payment_id} completed{}",
                signal.id,
                amount.map(|a| format!(" ({})", Price::new(a).display())).unwrap_or_default()
            ),
            SignalKind::RefundCompleted { payment_id } => {
                println!("{:>4} {at} payment #{payment_id} refunded", signal.id);
            }
        }
    }
    Ok(())
}
