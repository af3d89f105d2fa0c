mod api_key;
mod message;

pub use api_key::ApiKey;
pub use message::{Message, Role};
