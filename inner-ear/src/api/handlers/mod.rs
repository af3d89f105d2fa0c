pub mod chat;
pub mod health;
pub mod validate;

pub use chat::chat;
pub use health::health_check;
pub use validate::validate_key;
