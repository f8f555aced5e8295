//! Administrator commands. Each one checks the admin guard first.

use trinket_store_client::AppContext;
use trinket_store_client::admin::{
    EmailStatus, InventoryFilters, OrderFilters, ProductFilters, Recency, UserFilters,
};
use trinket_store_client::filter::Choice;
use trinket_store_core::{OrderId, OrderStatus, ProductId, UserId};

use super::{CommandError, check, money};

pub async fn products(
    context: &AppContext,
    search: String,
    category: &str,
    status: &str,
) -> Result<(), CommandError> {
    context.auth.require_admin().await?;
    let filters = ProductFilters {
        search,
        category: category.parse().unwrap_or_default(),
        status: status.parse().map_err(CommandError::InvalidArgument)?,
    };

    let products = &context.admin.products;
    products.fetch(Some(filters)).await;
    check(products.store().error())?;

    for product in products.filtered() {
        println!(
            "{:>5}  {:<32} {:<16} {}",
            product.id,
            product.name,
            product.category.as_deref().unwrap_or("-"),
            product.status().as_str()
        );
    }
    Ok(())
}

pub async fn prices(context: &AppContext, product_id: i64) -> Result<(), CommandError> {
    context.auth.require_admin().await?;
    let prices = &context.admin.prices;
    prices.fetch(ProductId::new(product_id)).await;
    check(prices.store().error())?;

    let history = prices.store().data();
    match &history.current {
        Some(current) => println!("Current: {}", current.price().display()),
        None => println!("Current: none"),
    }
    for price in &history.prices {
        println!(
            "{:>5}  {:>12}  {}{}",
            price.id,
            price.price().display(),
            price.created_at.as_deref().unwrap_or("-"),
            if price.current { "  (current)" } else { "" }
        );
    }
    Ok(())
}

pub async fn inventory(
    context: &AppContext,
    in_stock: bool,
    low_stock: Option<u32>,
) -> Result<(), CommandError> {
    context.auth.require_admin().await?;
    let inventory = &context.admin.inventory;
    inventory
        .fetch(Some(InventoryFilters {
            with_stock_only: in_stock,
            low_stock_threshold: low_stock,
        }))
        .await;
    check(inventory.store().error())?;

    for record in inventory.store().data() {
        println!(
            "{:>5}  product {:>5}  {:<32} {:>6}",
            record.id,
            record.product_id,
            record.product_name.as_deref().unwrap_or("-"),
            record.qty_on_hand
        );
    }
    Ok(())
}

pub async fn orders(
    context: &AppContext,
    status: &str,
    user: Option<i64>,
) -> Result<(), CommandError> {
    context.auth.require_admin().await?;
    let filters = OrderFilters {
        status: status.parse().map_err(CommandError::InvalidArgument)?,
        user_id: user.map(UserId::new),
        ..OrderFilters::default()
    };

    let orders = &context.admin.orders;
    orders.fetch(Some(filters)).await;
    check(orders.store().error())?;

    for order in orders.filtered() {
        println!(
            "{:>5}  user {:>5}  {:<10} {:>12}  {}",
            order.id,
            order.user_id,
            order.status.as_str(),
            money(Some(order.total_in_cents)),
            order.created_at.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn order(context: &AppContext, order_id: i64) -> Result<(), CommandError> {
    context.auth.require_admin().await?;
    let details = &context.admin.order_details;
    details.fetch(OrderId::new(order_id)).await;
    check(details.store().error())?;

    let detail = details.store().data();
    let Some(order) = detail.order else {
        return Err(CommandError::InvalidArgument(format!("No order {order_id}")));
    };
    println!(
        "Order {} for user {}: {} {}",
        order.id,
        order.user_id,
        order.status.as_str(),
        money(Some(order.total_in_cents))
    );
    if let Some(checkout_id) = &order.checkout_id {
        println!("Checkout: {checkout_id}");
    }
    for item in detail.items {
        println!(
            "  {:>3} x {:<32} {:>12}",
            item.quantity,
            item.product_name
                .unwrap_or_else(|| format!("product {}", item.product_id)),
            money(Some(item.subtotal_amount))
        );
    }
    Ok(())
}

pub async fn set_order_status(
    context: &AppContext,
    order_id: i64,
    status: &str,
) -> Result<(), CommandError> {
    context.auth.require_admin().await?;
    let status: OrderStatus = status.parse().map_err(CommandError::InvalidArgument)?;
    let mutations = &context.admin.order_mutations;
    let order = mutations
        .update_status(OrderId::new(order_id), status)
        .await
        .ok_or_else(|| {
            mutations.tracker().error().map_or_else(
                || CommandError::InvalidArgument("Status update failed".to_string()),
                Into::into,
            )
        })?;
    println!("Order {} is now {}", order.id, order.status.as_str());
    Ok(())
}

pub async fn users(
    context: &AppContext,
    search: String,
    role: &str,
    email_status: EmailStatus,
    recency: Recency,
) -> Result<(), CommandError> {
    context.auth.require_admin().await?;
    let filters = UserFilters {
        search,
        role: role.parse::<Choice<_>>().map_err(CommandError::InvalidArgument)?,
        email_status,
        recency,
    };

    let users = &context.admin.users;
    users.fetch(Some(filters)).await;
    check(users.store().error())?;

    for user in users.filtered() {
        println!(
            "{:>5}  {:<28} {:<32} {}",
            user.id,
            user.name,
            user.email.as_deref().unwrap_or("-"),
            user.role.as_str()
        );
    }
    Ok(())
}
