//! Filesystem path constants.

/// Kubeconfig directory under the user's home.
pub const KUBE_DIR: &str = ".kube";

/// Admin kubeconfig filename inside [`KUBE_DIR`].
pub const ADMIN_KUBECONFIG: &str = "config";
