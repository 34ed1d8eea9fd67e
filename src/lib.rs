pub mod cli;
pub mod config;
pub mod error;
pub mod interface;
pub mod lease;
pub mod util;

pub use config::ClientConfig;
pub use error::{ConfigError, LeaseError, Outcome};
pub use lease::{
    broker::{HttpLeaseBroker, LeaseBroker},
    manager::LeaseManager,
    renewer::RenewalExit,
    LeaseAnswer, LeaseGrant, LeaseHandle, LeaseName, LeaseToken,
};
