//! Client side of the relay: the HTTP client, the session that owns the
//! transcript, the on-disk credential store and the terminal front-end.

mod credential;
mod relay;
mod session;
pub mod terminal;

pub use credential::{deobfuscate, obfuscate, CredentialStore};
pub use relay::{ClientError, RelayClient};
pub use session::{ChatSession, TurnOutcome};
