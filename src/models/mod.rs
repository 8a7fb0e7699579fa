//! Data structures representing database rows and their JSON views.

pub mod cart;
pub mod category;
pub mod donation;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{Cart, CartItem, CartItemView, CartView};
pub use category::Category;
pub use donation::Donation;
pub use order::{Order, OrderItem, OrderItemView, OrderStatus, OrderView};
pub use product::Product;
pub use session::Session;
pub use user::User;
