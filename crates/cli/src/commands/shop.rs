//! Storefront commands: catalog, cart, checkout and customer orders.

use tokio::sync::mpsc;
use trinket_store_client::AppContext;
use trinket_store_client::storefront::CheckoutInput;
use trinket_store_client::types::Order;
use trinket_store_core::{OrderId, ProductId, UserId};

use super::{CommandError, money};

async fn signed_in_user(context: &AppContext) -> Result<UserId, CommandError> {
    context
        .session()
        .user()
        .await
        .map(|user| user.user_id)
        .ok_or(CommandError::NotSignedIn)
}

pub async fn catalog(context: &AppContext, refresh: bool) {
    let catalog = &context.storefront.catalog;
    let products = catalog.fetch(refresh).await;
    if let Some(error) = catalog.store().error() {
        tracing::warn!(%error, "Showing the last known catalog");
    }
    for product in products {
        println!(
            "{:>5}  {:<32} {:>12}  {}",
            product.id,
            product.name,
            money(product.price_in_cents),
            product.slug
        );
    }
}

pub fn show_cart(context: &AppContext) {
    let state = context.storefront.cart.snapshot();
    println!("Cart ({})", state.owner);
    if !state.has_items() {
        println!("  empty");
        return;
    }
    for item in &state.items {
        println!(
            "  {:>5}  {:<32} {:>3} of {:<3} {:>12}",
            item.product_id,
            item.name,
            item.quantity,
            item.available_stock,
            money(Some(item.subtotal_in_cents()))
        );
    }
    println!(
        "  {} item(s), total {}",
        state.total_items(),
        money(Some(state.total_amount_in_cents()))
    );
}

pub async fn add_to_cart(
    context: &AppContext,
    product_id: i64,
    quantity: i64,
) -> Result<(), CommandError> {
    let product_id = ProductId::new(product_id);
    let product = context
        .storefront
        .catalog
        .fetch(false)
        .await
        .into_iter()
        .find(|product| product.id == product_id)
        .ok_or_else(|| {
            CommandError::InvalidArgument(format!("Product {product_id} is not in the catalog"))
        })?;

    let stock = context
        .storefront
        .inventory
        .fetch_for_product(product_id, false)
        .await?;
    let line = context
        .storefront
        .cart
        .add_item(&product, quantity, stock.qty_on_hand)
        .ok_or_else(|| CommandError::InvalidArgument(format!("{} is out of stock", product.name)))?;

    println!(
        "{} x {} in cart ({} available)",
        line.quantity, line.name, line.available_stock
    );
    Ok(())
}

pub fn update_cart(
    context: &AppContext,
    product_id: i64,
    quantity: i64,
) -> Result<(), CommandError> {
    let line = context
        .storefront
        .cart
        .update_item_quantity(ProductId::new(product_id), quantity, None)
        .ok_or_else(|| {
            CommandError::InvalidArgument(format!("Product {product_id} is not in the cart"))
        })?;
    println!("{} x {}", line.quantity, line.name);
    Ok(())
}

pub fn remove_from_cart(context: &AppContext, product_id: i64) {
    if context.storefront.cart.remove_item(ProductId::new(product_id)) {
        println!("Removed product {product_id}");
    } else {
        println!("Product {product_id} was not in the cart");
    }
}

pub fn clear_cart(context: &AppContext) {
    context.storefront.cart.clear();
    println!("Cart cleared");
}

/// Re-check stock, then pay for the cart with PIX.
pub async fn checkout(
    context: &AppContext,
    description: Option<String>,
) -> Result<(), CommandError> {
    let user_id = signed_in_user(context).await?;
    let storefront = &context.storefront;

    for item in storefront.cart.items() {
        match storefront.inventory.fetch_for_product(item.product_id, true).await {
            Ok(snapshot) => {
                storefront.cart.set_item_stock(item.product_id, snapshot.qty_on_hand);
            }
            Err(error) => {
                tracing::warn!(product_id = %item.product_id, %error, "Could not refresh stock");
            }
        }
    }

    let state = storefront.cart.snapshot();
    let input = CheckoutInput {
        user_id,
        total_amount_in_cents: state.total_amount_in_cents(),
        items: state.items,
        description,
    };
    let response = storefront.checkout.create_order_from_cart(&input).await?;
    storefront.cart.clear();

    println!(
        "Order {} created: {}",
        response.order.id,
        money(Some(response.order.total_in_cents))
    );
    if let Some(code) = &response.pix.qr_code {
        println!("PIX copy-and-paste code:\n{code}");
    }
    if let Some(expires_at) = &response.pix.expires_at {
        println!("Expires at {expires_at}");
    }
    println!("Follow the payment with: ts-cli orders watch {}", response.order.id);
    Ok(())
}

pub async fn my_orders(context: &AppContext) -> Result<(), CommandError> {
    let user_id = signed_in_user(context).await?;
    let manager = &context.storefront.orders;
    let orders = manager.fetch_orders(user_id).await;
    if let Some(message) = manager.error_message() {
        return Err(CommandError::InvalidArgument(message.to_string()));
    }
    if orders.is_empty() {
        println!("No orders yet");
    }
    let selected = manager.selected_order().map(|order| order.id);
    for order in &orders {
        println!(
            "{} {:>5}  {:<10} {:>12}  {}",
            if Some(order.id) == selected { "*" } else { " " },
            order.id,
            order.status.as_str(),
            money(Some(order.total_in_cents)),
            order.created_at.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn cancel_order(context: &AppContext, order_id: i64) -> Result<(), CommandError> {
    if context.storefront.orders.cancel_order(OrderId::new(order_id)).await {
        println!("Order {order_id} canceled");
        Ok(())
    } else {
        Err(CommandError::InvalidArgument(format!("Order {order_id} could not be canceled")))
    }
}

/// Poll a pending order until it settles or the user interrupts.
pub async fn watch_order(context: &AppContext, order_id: i64) -> Result<(), CommandError> {
    let order_id = OrderId::new(order_id);
    let order: Order = context.client().get(&format!("/orders/{order_id}")).await?;
    println!("Order {} is {}", order.id, order.status.as_str());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let poller = &context.storefront.poller;
    if !poller.start(order.id, order.status, move |order| {
        let _ = tx.send(order);
    }) {
        return Ok(());
    }

    loop {
        tokio::select! {
            update = rx.recv() => {
                let Some(update) = update else { break };
                let at = poller
                    .last_update()
                    .map_or_else(|| "--:--:--".to_string(), |at| at.format("%H:%M:%S").to_string());
                println!("{at}  {}", update.status.as_str());
                if !update.status.is_pending() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                poller.stop();
                break;
            }
        }
    }
    Ok(())
}
