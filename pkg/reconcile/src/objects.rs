//! Construction of the Kubernetes objects the reconciler may create.

use k8s_openapi::api::core::v1::{Namespace, ServiceAccount};
use k8s_openapi::api::rbac::v1::{
    ClusterRole, ClusterRoleBinding, Role, RoleBinding, RoleRef, Subject,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use pkg_constants::auth::RBAC_API_GROUP;
use pkg_constants::names::{CLUSTERROLEBINDING_SUFFIX, ROLEBINDING_SUFFIX};
use pkg_types::descriptor::{PrincipalDescriptor, PrincipalKind};

/// Deterministic name of the RoleBinding wiring up `role`.
pub fn role_binding_name(role: &str) -> String {
    format!("{}{}", role, ROLEBINDING_SUFFIX)
}

/// Deterministic name of the ClusterRoleBinding wiring up `cluster_role`.
pub fn cluster_role_binding_name(cluster_role: &str) -> String {
    format!("{}{}", cluster_role, CLUSTERROLEBINDING_SUFFIX)
}

fn subject_kind(kind: PrincipalKind) -> &'static str {
    match kind {
        PrincipalKind::User => "User",
        PrincipalKind::ServiceAccount => "ServiceAccount",
    }
}

pub fn namespace(name: &str) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn service_account(namespace: &str, name: &str) -> ServiceAccount {
    ServiceAccount {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Empty-rule placeholder: the cluster operator populates rules separately,
/// or the role pre-exists with real rules and this object is never sent.
pub fn role(namespace: &str, name: &str) -> Role {
    Role {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        rules: Some(Vec::new()),
    }
}

pub fn cluster_role(name: &str) -> ClusterRole {
    ClusterRole {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        rules: Some(Vec::new()),
        ..Default::default()
    }
}

pub fn role_binding(namespace: &str, role: &str, desc: &PrincipalDescriptor) -> RoleBinding {
    RoleBinding {
        metadata: ObjectMeta {
            name: Some(role_binding_name(role)),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        subjects: Some(vec![Subject {
            kind: subject_kind(desc.kind).to_string(),
            name: desc.name.clone(),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        }]),
        role_ref: RoleRef {
            api_group: RBAC_API_GROUP.to_string(),
            kind: "Role".to_string(),
            name: role.to_string(),
        },
    }
}

pub fn cluster_role_binding(cluster_role: &str, desc: &PrincipalDescriptor) -> ClusterRoleBinding {
    // ServiceAccount subjects are namespaced objects; the home namespace
    // anchors them. User subjects have no namespace at cluster scope.
    let subject_namespace = match desc.kind {
        PrincipalKind::ServiceAccount => desc.home_namespace().map(str::to_string),
        PrincipalKind::User => None,
    };
    ClusterRoleBinding {
        metadata: ObjectMeta {
            name: Some(cluster_role_binding_name(cluster_role)),
            ..Default::default()
        },
        subjects: Some(vec![Subject {
            kind: subject_kind(desc.kind).to_string(),
            name: desc.name.clone(),
            namespace: subject_namespace,
            ..Default::default()
        }]),
        role_ref: RoleRef {
            api_group: RBAC_API_GROUP.to_string(),
            kind: "ClusterRole".to_string(),
            name: cluster_role.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, namespaces: &[&str]) -> PrincipalDescriptor {
        PrincipalDescriptor {
            name: name.to_string(),
            kind: PrincipalKind::User,
            namespaces: namespaces.iter().map(|ns| ns.to_string()).collect(),
            roles: vec![],
            clusterroles: vec![],
            existing: false,
            clientcert: Some("CERT".into()),
            clientkey: Some("KEY".into()),
        }
    }

    #[test]
    fn binding_names_are_deterministic() {
        assert_eq!(role_binding_name("viewer"), "viewer-rolebinding");
        assert_eq!(
            cluster_role_binding_name("node-reader"),
            "node-reader-clusterrolebinding"
        );
    }

    #[test]
    fn role_binding_subject_and_ref() {
        let desc = user("alice", &["team-x"]);
        let binding = role_binding("team-x", "viewer", &desc);
        assert_eq!(
            binding.metadata.name.as_deref(),
            Some("viewer-rolebinding")
        );
        let subject = &binding.subjects.as_ref().unwrap()[0];
        assert_eq!(subject.kind, "User");
        assert_eq!(subject.name, "alice");
        assert_eq!(subject.namespace.as_deref(), Some("team-x"));
        assert_eq!(binding.role_ref.kind, "Role");
        assert_eq!(binding.role_ref.name, "viewer");
        assert_eq!(binding.role_ref.api_group, "rbac.authorization.k8s.io");
    }

    #[test]
    fn cluster_role_binding_subject_namespace_by_kind() {
        let user_desc = user("alice", &["team-x"]);
        let binding = cluster_role_binding("auditor", &user_desc);
        assert_eq!(
            binding.subjects.as_ref().unwrap()[0].namespace,
            None,
            "user subjects are not namespaced"
        );

        let sa_desc = PrincipalDescriptor {
            kind: PrincipalKind::ServiceAccount,
            clientcert: None,
            clientkey: None,
            ..user("robot", &["build", "deploy"])
        };
        let binding = cluster_role_binding("auditor", &sa_desc);
        let subject = &binding.subjects.as_ref().unwrap()[0];
        assert_eq!(subject.kind, "ServiceAccount");
        assert_eq!(subject.namespace.as_deref(), Some("build"));
    }
}
