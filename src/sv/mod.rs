pub mod access;
pub mod archive;
pub mod order;
pub mod subscription;
pub mod user;

pub use access::Access;
pub use archive::Archive;
pub use order::Order;
pub use subscription::Subscription;
pub use user::User;
