pub mod capability;
pub mod client;

pub use capability::{MemoryCapability, MemoryGateway};
pub use client::HttpMemoryClient;
