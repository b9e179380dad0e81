pub mod error;
pub mod pipeline;
pub mod scheduler;

pub use error::IngestError;
pub use pipeline::{ingest_all, ingest_handle, HandleOutcome, IngestOptions, IngestReport};
pub use scheduler::{RefreshHandle, RefreshScheduler};

#[cfg(test)]
mod test_support;
