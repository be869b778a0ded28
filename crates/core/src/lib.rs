pub mod address;
pub mod aws;
pub mod config;

pub use address::{normalize_location, AddressError, ObjectAddress, OutputLocation};
pub use aws::load_sdk_config;
pub use config::{load_dotenv, Config, Overrides};
