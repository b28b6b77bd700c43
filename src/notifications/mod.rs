pub mod hub;
pub mod protocol;

pub use hub::{NotificationHub, Subscription};
pub use protocol::{ClientEvent, ServerEvent};
