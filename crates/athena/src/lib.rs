pub mod client;
pub mod error;
pub mod runner;
pub mod service;
pub mod status;

pub use client::AthenaClient;
pub use error::AthenaError;
pub use runner::{PollPolicy, QueryRunner};
pub use service::{QueryRequest, QueryService};
pub use status::{ExecutionState, ExecutionStatus, QueryOutcome};
