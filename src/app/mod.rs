// Application layer - Use case interactors

pub mod batch;
pub mod inspect;

pub use batch::{discover, run_batch, BatchConfig, BatchJob, BatchSummary};
pub use inspect::{inspect, InspectReport};
