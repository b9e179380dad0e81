pub mod client;
mod retry;
pub mod types;

pub use client::HttpPostSource;
