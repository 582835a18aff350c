use pkg_cluster::error::ClusterError;
use thiserror::Error;

/// Fatal credential-assembly failures.
///
/// A kubeconfig missing its auth material is useless, so unlike reconcile
/// errors none of these are recovered mid-run: they propagate and the run
/// terminates without writing output.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("configmap {namespace}/{name} not found")]
    MissingConfigMap { namespace: String, name: String },
    #[error("key {key:?} not found in configmap {namespace}/{name}")]
    MissingConfigMapKey {
        namespace: String,
        name: String,
        key: String,
    },
    #[error("descriptor for {0} embeds no client certificate/key")]
    MissingCredentialSeed(String),
    #[error("descriptor for {0} declares no namespace to resolve the service account from")]
    MissingNamespace(String),
    #[error("service account {namespace}/{name} not found")]
    MissingServiceAccount { namespace: String, name: String },
    #[error("secret {namespace}/{name} not found")]
    MissingSecret { namespace: String, name: String },
    #[error("key {key:?} not found in secret {namespace}/{name}")]
    MissingSecretKey {
        namespace: String,
        name: String,
        key: String,
    },
    #[error("token in secret {namespace}/{name} is not valid UTF-8")]
    InvalidToken { namespace: String, name: String },
    #[error("token request for {namespace}/{name} returned an empty token")]
    EmptyToken { namespace: String, name: String },
    #[error("cluster-info configmap does not contain a usable cluster endpoint")]
    MalformedClusterInfo,
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}
