use thiserror::Error;

/// Errors surfaced by cluster operations.
///
/// Not-found is deliberately NOT represented here: reads return `Ok(None)`
/// so callers can treat absence as the create trigger rather than a failure.
#[derive(Debug, Clone, Error)]
pub enum ClusterError {
    /// The API server rejected the request (conflict, forbidden, invalid...).
    #[error("api error {code}: {message}")]
    Api { code: u16, message: String },
    /// The request never produced an API verdict (connection, TLS, auth
    /// plumbing).
    #[error("transport error: {0}")]
    Transport(String),
}

impl ClusterError {
    /// True for an already-exists conflict on create.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ClusterError::Api { code: 409, .. })
    }
}

impl From<kube::Error> for ClusterError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(resp) => ClusterError::Api {
                code: resp.code,
                message: resp.message,
            },
            other => ClusterError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_detection() {
        let conflict = ClusterError::Api {
            code: 409,
            message: "rolebindings \"viewer-rolebinding\" already exists".into(),
        };
        assert!(conflict.is_conflict());

        let forbidden = ClusterError::Api {
            code: 403,
            message: "forbidden".into(),
        };
        assert!(!forbidden.is_conflict());
        assert!(!ClusterError::Transport("connection refused".into()).is_conflict());
    }
}
