//! Administrator resources: one store per list/details view and one
//! mutation tracker per entity.

pub mod inventory;
pub mod order_items;
pub mod orders;
pub mod prices;
pub mod products;
pub mod profile;
pub mod users;

use crate::http::BackendClient;

pub use inventory::{InventoryByProduct, InventoryFilters, InventoryList, InventoryMutations};
pub use order_items::OrderItemMutations;
pub use orders::{OrderDetail, OrderDetails, OrderFilters, OrderMutations, OrdersList};
pub use prices::{PriceHistory, PriceMutations, ProductPrices};
pub use products::{ProductDetails, ProductFilters, ProductMutations, ProductsList};
pub use profile::CurrentUserProfile;
pub use users::{EmailStatus, Recency, UserDetails, UserFilters, UserMutations, UsersList};

/// Every administrator resource, sharing one backend client.
#[derive(Debug)]
pub struct AdminResources {
    pub products: ProductsList,
    pub product_details: ProductDetails,
    pub product_mutations: ProductMutations,
    pub prices: ProductPrices,
    pub price_mutations: PriceMutations,
    pub inventory: InventoryList,
    pub inventory_by_product: InventoryByProduct,
    pub inventory_mutations: InventoryMutations,
    pub orders: OrdersList,
    pub order_details: OrderDetails,
    pub order_mutations: OrderMutations,
    pub order_item_mutations: OrderItemMutations,
    pub users: UsersList,
    pub user_details: UserDetails,
    pub user_mutations: UserMutations,
    pub profile: CurrentUserProfile,
}

impl AdminResources {
    #[must_use]
    pub fn new(client: &BackendClient) -> Self {
        Self {
            products: ProductsList::new(client.clone()),
            product_details: ProductDetails::new(client.clone()),
            product_mutations: ProductMutations::new(client.clone()),
            prices: ProductPrices::new(client.clone()),
            price_mutations: PriceMutations::new(client.clone()),
            inventory: InventoryList::new(client.clone()),
            inventory_by_product: InventoryByProduct::new(client.clone()),
            inventory_mutations: InventoryMutations::new(client.clone()),
            orders: OrdersList::new(client.clone()),
            order_details: OrderDetails::new(client.clone()),
            order_mutations: OrderMutations::new(client.clone()),
            order_item_mutations: OrderItemMutations::new(client.clone()),
            users: UsersList::new(client.clone()),
            user_details: UserDetails::new(client.clone()),
            user_mutations: UserMutations::new(client.clone()),
            profile: CurrentUserProfile::new(client.clone()),
        }
    }
}
