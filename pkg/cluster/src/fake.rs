//! In-memory cluster double for exercising reconciliation and credential
//! assembly without a live API server.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;
use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::{
    ConfigMap, Namespace, ObjectReference, Secret, ServiceAccount,
};
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::api::ClusterApi;
use crate::error::ClusterError;

type Key = (String, String);

#[derive(Default)]
struct State {
    namespaces: BTreeMap<String, Namespace>,
    service_accounts: BTreeMap<Key, ServiceAccount>,
    roles: BTreeMap<Key, Role>,
    role_bindings: BTreeMap<Key, RoleBinding>,
    cluster_roles: BTreeMap<String, ClusterRole>,
    cluster_role_bindings: BTreeMap<String, ClusterRoleBinding>,
    secrets: BTreeMap<Key, Secret>,
    config_maps: BTreeMap<Key, ConfigMap>,
    tokens: BTreeMap<Key, String>,
    fail_creates: BTreeSet<String>,
    create_attempts: Vec<String>,
    creates: usize,
}

/// In-memory [`ClusterApi`] with seedable state and per-object failure
/// injection.
///
/// Every create call records an attempt entry (`kind/namespace/name`, or
/// `kind/name` for cluster-scoped objects) before any outcome is decided,
/// so tests can assert that a create was or was not attempted at all.
#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<State>,
}

fn name_of(meta: &ObjectMeta) -> String {
    meta.name.clone().unwrap_or_default()
}

fn conflict(plural: &str, name: &str) -> ClusterError {
    ClusterError::Api {
        code: 409,
        message: format!("{} \"{}\" already exists", plural, name),
    }
}

fn injected(kind: &str, name: &str) -> ClusterError {
    ClusterError::Api {
        code: 500,
        message: format!("injected failure creating {} {}", kind, name),
    }
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every create call for an object with this name fail.
    pub fn fail_creates_of(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_creates
            .insert(name.to_string());
    }

    /// All create attempts so far, in call order.
    pub fn create_attempts(&self) -> Vec<String> {
        self.state.lock().unwrap().create_attempts.clone()
    }

    /// Number of creates that actually stored an object.
    pub fn created_total(&self) -> usize {
        self.state.lock().unwrap().creates
    }

    /// The token `issue_token` hands out for this service account.
    pub fn set_token(&self, namespace: &str, name: &str, token: &str) {
        self.state
            .lock()
            .unwrap()
            .tokens
            .insert((namespace.to_string(), name.to_string()), token.to_string());
    }

    pub fn add_namespace(&self, name: &str) {
        let ns = Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        self.state
            .lock()
            .unwrap()
            .namespaces
            .insert(name.to_string(), ns);
    }

    /// Seed a service account, optionally referencing a legacy token secret.
    pub fn add_service_account(&self, namespace: &str, name: &str, secret: Option<&str>) {
        let account = ServiceAccount {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            secrets: secret.map(|secret_name| {
                vec![ObjectReference {
                    name: Some(secret_name.to_string()),
                    ..Default::default()
                }]
            }),
            ..Default::default()
        };
        self.state
            .lock()
            .unwrap()
            .service_accounts
            .insert((namespace.to_string(), name.to_string()), account);
    }

    pub fn add_secret(&self, namespace: &str, name: &str, entries: &[(&str, &[u8])]) {
        let data: BTreeMap<String, ByteString> = entries
            .iter()
            .map(|(key, value)| (key.to_string(), ByteString(value.to_vec())))
            .collect();
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            data: Some(data),
            ..Default::default()
        };
        self.state
            .lock()
            .unwrap()
            .secrets
            .insert((namespace.to_string(), name.to_string()), secret);
    }

    pub fn add_config_map(&self, namespace: &str, name: &str, entries: &[(&str, &str)]) {
        let data: BTreeMap<String, String> = entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        let map = ConfigMap {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            data: Some(data),
            ..Default::default()
        };
        self.state
            .lock()
            .unwrap()
            .config_maps
            .insert((namespace.to_string(), name.to_string()), map);
    }

    pub fn add_cluster_role_binding(&self, name: &str) {
        let binding = ClusterRoleBinding {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        self.state
            .lock()
            .unwrap()
            .cluster_role_bindings
            .insert(name.to_string(), binding);
    }

    pub fn namespace_exists(&self, name: &str) -> bool {
        self.state.lock().unwrap().namespaces.contains_key(name)
    }

    pub fn service_account_exists(&self, namespace: &str, name: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .service_accounts
            .contains_key(&(namespace.to_string(), name.to_string()))
    }

    pub fn role_exists(&self, namespace: &str, name: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .roles
            .contains_key(&(namespace.to_string(), name.to_string()))
    }

    pub fn role_binding(&self, namespace: &str, name: &str) -> Option<RoleBinding> {
        self.state
            .lock()
            .unwrap()
            .role_bindings
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn cluster_role_exists(&self, name: &str) -> bool {
        self.state.lock().unwrap().cluster_roles.contains_key(name)
    }

    pub fn cluster_role_binding(&self, name: &str) -> Option<ClusterRoleBinding> {
        self.state
            .lock()
            .unwrap()
            .cluster_role_bindings
            .get(name)
            .cloned()
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>, ClusterError> {
        Ok(self.state.lock().unwrap().namespaces.get(name).cloned())
    }

    async fn create_namespace(&self, namespace: &Namespace) -> Result<(), ClusterError> {
        let name = name_of(&namespace.metadata);
        let mut state = self.state.lock().unwrap();
        state.create_attempts.push(format!("namespace/{}", name));
        if state.fail_creates.contains(&name) {
            return Err(injected("namespace", &name));
        }
        if state.namespaces.contains_key(&name) {
            return Err(conflict("namespaces", &name));
        }
        state.namespaces.insert(name, namespace.clone());
        state.creates += 1;
        Ok(())
    }

    async fn get_service_account(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ServiceAccount>, ClusterError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .service_accounts
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn create_service_account(
        &self,
        namespace: &str,
        account: &ServiceAccount,
    ) -> Result<(), ClusterError> {
        let name = name_of(&account.metadata);
        let mut state = self.state.lock().unwrap();
        state
            .create_attempts
            .push(format!("serviceaccount/{}/{}", namespace, name));
        if state.fail_creates.contains(&name) {
            return Err(injected("serviceaccount", &name));
        }
        let key = (namespace.to_string(), name.clone());
        if state.service_accounts.contains_key(&key) {
            return Err(conflict("serviceaccounts", &name));
        }
        state.service_accounts.insert(key, account.clone());
        state.creates += 1;
        Ok(())
    }

    async fn get_role(&self, namespace: &str, name: &str) -> Result<Option<Role>, ClusterError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .roles
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn create_role(&self, namespace: &str, role: &Role) -> Result<(), ClusterError> {
        let name = name_of(&role.metadata);
        let mut state = self.state.lock().unwrap();
        state
            .create_attempts
            .push(format!("role/{}/{}", namespace, name));
        if state.fail_creates.contains(&name) {
            return Err(injected("role", &name));
        }
        let key = (namespace.to_string(), name.clone());
        if state.roles.contains_key(&key) {
            return Err(conflict("roles", &name));
        }
        state.roles.insert(key, role.clone());
        state.creates += 1;
        Ok(())
    }

    async fn get_role_binding(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<RoleBinding>, ClusterError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .role_bindings
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn create_role_binding(
        &self,
        namespace: &str,
        binding: &RoleBinding,
    ) -> Result<(), ClusterError> {
        let name = name_of(&binding.metadata);
        let mut state = self.state.lock().unwrap();
        state
            .create_attempts
            .push(format!("rolebinding/{}/{}", namespace, name));
        if state.fail_creates.contains(&name) {
            return Err(injected("rolebinding", &name));
        }
        let key = (namespace.to_string(), name.clone());
        if state.role_bindings.contains_key(&key) {
            return Err(conflict("rolebindings", &name));
        }
        state.role_bindings.insert(key, binding.clone());
        state.creates += 1;
        Ok(())
    }

    async fn get_cluster_role(&self, name: &str) -> Result<Option<ClusterRole>, ClusterError> {
        Ok(self.state.lock().unwrap().cluster_roles.get(name).cloned())
    }

    async fn create_cluster_role(&self, role: &ClusterRole) -> Result<(), ClusterError> {
        let name = name_of(&role.metadata);
        let mut state = self.state.lock().unwrap();
        state.create_attempts.push(format!("clusterrole/{}", name));
        if state.fail_creates.contains(&name) {
            return Err(injected("clusterrole", &name));
        }
        if state.cluster_roles.contains_key(&name) {
            return Err(conflict("clusterroles", &name));
        }
        state.cluster_roles.insert(name, role.clone());
        state.creates += 1;
        Ok(())
    }

    async fn get_cluster_role_binding(
        &self,
        name: &str,
    ) -> Result<Option<ClusterRoleBinding>, ClusterError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .cluster_role_bindings
            .get(name)
            .cloned())
    }

    async fn create_cluster_role_binding(
        &self,
        binding: &ClusterRoleBinding,
    ) -> Result<(), ClusterError> {
        let name = name_of(&binding.metadata);
        let mut state = self.state.lock().unwrap();
        state
            .create_attempts
            .push(format!("clusterrolebinding/{}", name));
        if state.fail_creates.contains(&name) {
            return Err(injected("clusterrolebinding", &name));
        }
        if state.cluster_role_bindings.contains_key(&name) {
            return Err(conflict("clusterrolebindings", &name));
        }
        state.cluster_role_bindings.insert(name, binding.clone());
        state.creates += 1;
        Ok(())
    }

    async fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Secret>, ClusterError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, ClusterError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .config_maps
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn issue_token(
        &self,
        namespace: &str,
        name: &str,
        _ttl_seconds: i64,
    ) -> Result<String, ClusterError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tokens
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .unwrap_or_else(|| format!("fake-token-{}-{}", namespace, name)))
    }
}
