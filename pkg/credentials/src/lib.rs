//! Credential assembly: turn reconciled cluster state plus the descriptor
//! into a single standalone kubeconfig.

pub mod error;
mod service_account;
mod user;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use pkg_cluster::admin::AdminContext;
use pkg_cluster::api::ClusterApi;
use pkg_constants::names::{ROOT_CA_CONFIGMAP, ROOT_CA_KEY};
use pkg_types::descriptor::{PrincipalDescriptor, PrincipalKind};
use pkg_types::kubeconfig::Kubeconfig;

pub use error::CredentialError;

/// Assemble the principal's kubeconfig from the descriptor and live cluster
/// state. Dispatches once on the principal kind: certificate auth for users,
/// bearer-token auth for service accounts.
pub async fn assemble(
    cluster: &dyn ClusterApi,
    desc: &PrincipalDescriptor,
    admin: &AdminContext,
) -> Result<Kubeconfig, CredentialError> {
    match desc.kind {
        PrincipalKind::User => user::assemble_user(cluster, desc, admin).await,
        PrincipalKind::ServiceAccount => {
            service_account::assemble_service_account(cluster, desc).await
        }
    }
}

/// Fetch the cluster root CA bundle published in `namespace`.
pub(crate) async fn root_ca(
    cluster: &dyn ClusterApi,
    namespace: &str,
) -> Result<String, CredentialError> {
    let map = cluster
        .get_config_map(namespace, ROOT_CA_CONFIGMAP)
        .await?
        .ok_or_else(|| CredentialError::MissingConfigMap {
            namespace: namespace.to_string(),
            name: ROOT_CA_CONFIGMAP.to_string(),
        })?;
    map.data
        .as_ref()
        .and_then(|data| data.get(ROOT_CA_KEY))
        .cloned()
        .ok_or_else(|| CredentialError::MissingConfigMapKey {
            namespace: namespace.to_string(),
            name: ROOT_CA_CONFIGMAP.to_string(),
            key: ROOT_CA_KEY.to_string(),
        })
}

pub(crate) fn encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}
