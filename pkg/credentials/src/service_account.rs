use k8s_openapi::api::core::v1::ServiceAccount;
use pkg_cluster::api::ClusterApi;
use pkg_constants::auth::TOKEN_TTL_SECONDS;
use pkg_constants::names::{
    CLUSTER_INFO_CONFIGMAP, CLUSTER_INFO_KEY, PUBLIC_NAMESPACE, ROOT_CA_KEY, TOKEN_KEY,
};
use pkg_types::descriptor::PrincipalDescriptor;
use pkg_types::kubeconfig::Kubeconfig;
use tracing::{debug, info};

use crate::error::CredentialError;
use crate::{encode, root_ca};

/// Bearer-token kubeconfig for a service-account principal, resolved from
/// its home namespace (the first declared one).
///
/// Token material comes from the account's bound legacy token Secret when
/// the cluster still provisions one, and from the TokenRequest subresource
/// otherwise. The API server endpoint comes from the cluster-published
/// bootstrap ConfigMap rather than the administrator's local file.
pub(crate) async fn assemble_service_account(
    cluster: &dyn ClusterApi,
    desc: &PrincipalDescriptor,
) -> Result<Kubeconfig, CredentialError> {
    let namespace = desc
        .home_namespace()
        .ok_or_else(|| CredentialError::MissingNamespace(desc.name.clone()))?;

    let account = cluster
        .get_service_account(namespace, &desc.name)
        .await?
        .ok_or_else(|| CredentialError::MissingServiceAccount {
            namespace: namespace.to_string(),
            name: desc.name.clone(),
        })?;

    let (token, ca) = match bound_secret_name(&account) {
        Some(secret_name) => {
            debug!(
                "Service account {}/{} references secret {}",
                namespace, desc.name, secret_name
            );
            from_token_secret(cluster, namespace, &secret_name).await?
        }
        None => {
            debug!(
                "Service account {}/{} has no bound secret, requesting a token",
                namespace, desc.name
            );
            let token = cluster
                .issue_token(namespace, &desc.name, TOKEN_TTL_SECONDS)
                .await?;
            if token.is_empty() {
                return Err(CredentialError::EmptyToken {
                    namespace: namespace.to_string(),
                    name: desc.name.clone(),
                });
            }
            let ca = root_ca(cluster, namespace).await?.into_bytes();
            (token, ca)
        }
    };

    let server = cluster_endpoint(cluster).await?;

    info!(
        "Assembling bearer-token kubeconfig for service account {}/{}",
        namespace, desc.name
    );
    Ok(Kubeconfig::with_bearer_token(
        &server,
        &encode(&ca),
        &desc.name,
        token,
    ))
}

fn bound_secret_name(account: &ServiceAccount) -> Option<String> {
    account.secrets.as_ref()?.first()?.name.clone()
}

/// Token and CA bytes from a legacy service-account token Secret.
async fn from_token_secret(
    cluster: &dyn ClusterApi,
    namespace: &str,
    secret_name: &str,
) -> Result<(String, Vec<u8>), CredentialError> {
    let secret = cluster
        .get_secret(namespace, secret_name)
        .await?
        .ok_or_else(|| CredentialError::MissingSecret {
            namespace: namespace.to_string(),
            name: secret_name.to_string(),
        })?;
    let data = secret.data.unwrap_or_default();

    let token = data
        .get(TOKEN_KEY)
        .ok_or_else(|| CredentialError::MissingSecretKey {
            namespace: namespace.to_string(),
            name: secret_name.to_string(),
            key: TOKEN_KEY.to_string(),
        })?;
    let token =
        String::from_utf8(token.0.clone()).map_err(|_| CredentialError::InvalidToken {
            namespace: namespace.to_string(),
            name: secret_name.to_string(),
        })?;

    let ca = data
        .get(ROOT_CA_KEY)
        .ok_or_else(|| CredentialError::MissingSecretKey {
            namespace: namespace.to_string(),
            name: secret_name.to_string(),
            key: ROOT_CA_KEY.to_string(),
        })?;

    Ok((token, ca.0.clone()))
}

/// The API server endpoint the cluster publishes for clients that cannot
/// read the admin kubeconfig: the kubeconfig stub inside
/// kube-public/cluster-info.
async fn cluster_endpoint(cluster: &dyn ClusterApi) -> Result<String, CredentialError> {
    let map = cluster
        .get_config_map(PUBLIC_NAMESPACE, CLUSTER_INFO_CONFIGMAP)
        .await?
        .ok_or_else(|| CredentialError::MissingConfigMap {
            namespace: PUBLIC_NAMESPACE.to_string(),
            name: CLUSTER_INFO_CONFIGMAP.to_string(),
        })?;
    let stub = map
        .data
        .and_then(|data| data.get(CLUSTER_INFO_KEY).cloned())
        .ok_or_else(|| CredentialError::MissingConfigMapKey {
            namespace: PUBLIC_NAMESPACE.to_string(),
            name: CLUSTER_INFO_CONFIGMAP.to_string(),
            key: CLUSTER_INFO_KEY.to_string(),
        })?;
    let parsed: Kubeconfig =
        serde_yaml::from_str(&stub).map_err(|_| CredentialError::MalformedClusterInfo)?;
    parsed
        .server()
        .map(str::to_string)
        .ok_or(CredentialError::MalformedClusterInfo)
}
