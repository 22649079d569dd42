// Adapters - External system implementations

pub mod libav;

// Re-export adapters
pub use libav::LibavBackend;
