pub mod builder;
pub mod capabilities;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod flags;
pub mod platform;
pub mod resolve;
pub mod service;

pub use builder::AppiumServiceBuilder;
pub use capabilities::Capabilities;
pub use error::{Error, Result};
pub use flags::{GeneralServerFlag, ServerArgument};
pub use service::{AppiumService, LaunchSpec, ProcessServiceBuilder};
