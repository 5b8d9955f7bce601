pub mod record;
pub mod registry;
pub mod topology;
pub mod managed;
pub mod focus;
pub mod resize;

pub use record::{WindowRecord, WindowRects};
pub use registry::{RecordGuard, Registry, RegistryGuard};

#[cfg(test)]
mod tests;
