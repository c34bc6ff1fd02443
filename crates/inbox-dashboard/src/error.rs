//! Dashboard client errors.

use thiserror::Error;
use uuid::Uuid;

/// Error from a procedure call made by the dashboard.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The API answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// Rejected by the client-side form gate before any call was made.
    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status of an API rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure of the create-then-switch team flow.
#[derive(Error, Debug)]
pub enum CreateTeamError {
    #[error("{0}")]
    Validation(String),

    /// The team was not created; no switch was attempted.
    #[error("Failed to create team: {0}")]
    Create(#[source] ClientError),

    /// The team exists but the active team was left unchanged.
    #[error("Created team {team_id} but failed to switch to it: {source}")]
    Switch {
        team_id: Uuid,
        #[source]
        source: ClientError,
    },
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = ClientError::Http {
            status: 403,
            message: "Not a member of this team".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 403: Not a member of this team");
        assert_eq!(err.status(), Some(403));
        assert_eq!(ClientError::Decode("x".into()).status(), None);
    }

    #[test]
    fn test_switch_error_names_team() {
        let team_id = Uuid::nil();
        let err = CreateTeamError::Switch {
            team_id,
            source: ClientError::Http {
                status: 500,
                message: "boom".to_string(),
            },
        };
        assert!(err.to_string().contains(&team_id.to_string()));
    }
}
