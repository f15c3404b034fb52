pub mod config;
pub mod error;
pub mod socket;

pub use config::{CONFIG_TEMPLATE as WEBSOCKET_CONFIG_TEMPLATE, WebSocketConfig};
pub use error::ClientError;
pub use socket::LyricsSocket;
