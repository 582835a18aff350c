//! Well-known Kubernetes object names.

// ─── Cluster-managed objects ───────────────────────────────────────────────

/// Namespace that holds cluster-level system objects.
pub const SYSTEM_NAMESPACE: &str = "kube-system";

/// Namespace that publishes the bootstrap cluster-info ConfigMap.
pub const PUBLIC_NAMESPACE: &str = "kube-public";

/// ConfigMap the controller manager distributes to every namespace with the
/// cluster root CA bundle.
pub const ROOT_CA_CONFIGMAP: &str = "kube-root-ca.crt";

/// Key inside [`ROOT_CA_CONFIGMAP`] holding the PEM bundle.
pub const ROOT_CA_KEY: &str = "ca.crt";

/// Bootstrap ConfigMap carrying a kubeconfig stub with the public endpoint.
pub const CLUSTER_INFO_CONFIGMAP: &str = "cluster-info";

/// Key inside [`CLUSTER_INFO_CONFIGMAP`] holding the kubeconfig stub.
pub const CLUSTER_INFO_KEY: &str = "kubeconfig";

/// Key holding the bearer token in a legacy service-account token Secret.
pub const TOKEN_KEY: &str = "token";

// ─── Generated objects ─────────────────────────────────────────────────────

/// Name given to the single cluster and context entry in generated
/// kubeconfigs.
pub const KUBECONFIG_CONTEXT: &str = "kubernetes";

/// Suffix appended to a Role name to form its RoleBinding name.
pub const ROLEBINDING_SUFFIX: &str = "-rolebinding";

/// Suffix appended to a ClusterRole name to form its ClusterRoleBinding name.
pub const CLUSTERROLEBINDING_SUFFIX: &str = "-clusterrolebinding";
