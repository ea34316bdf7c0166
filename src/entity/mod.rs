//! SeaORM entity definitions
//!
//! Every table mirrors one record kind of the newspaper back end. Column names
//! are part of the contract with the admin and upload tooling.

pub mod archive;
pub mod order;
pub mod subscription;
pub mod user;

pub use order::{LineItem, OrderStatus};
pub use subscription::{BillingInterval, PaymentMethod, SubscriptionStatus};
pub use user::Role;
