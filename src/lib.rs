pub mod api;
pub mod config;
pub mod controller;
pub mod desk;
pub mod providers;
pub mod types;
pub mod widget;

pub use config::Config;
pub use controller::{ControllerConfig, ConversationController, SendOutcome, ViewWatcher};
pub use types::*;
pub use widget::{ChatWidget, WidgetIntent};
