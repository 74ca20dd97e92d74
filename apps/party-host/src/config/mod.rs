pub mod host;

pub use host::HostConfig;
