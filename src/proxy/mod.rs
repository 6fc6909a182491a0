pub mod error;
pub mod forward;
pub mod server;

pub use error::ProxyError;
pub use forward::{ForwardRequest, Forwarder};
pub use server::{router, start_server, AppState};
