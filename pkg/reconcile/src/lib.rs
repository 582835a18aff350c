pub mod objects;
pub mod reconciler;

pub use reconciler::{ReconcileReport, Reconciler};
