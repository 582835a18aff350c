pub mod admin;
pub mod api;
pub mod client;
pub mod error;
pub mod probe;

#[cfg(feature = "test-util")]
pub mod fake;

pub use admin::AdminContext;
pub use api::ClusterApi;
pub use client::KubeCluster;
pub use error::ClusterError;
