use serde::{Deserialize, Serialize};

use crate::errors::AegisResult;

/// A notification recipient resolved from the project directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub user_id: String,
    pub email: String,
}

/// External directory collaborator: who owns or administers a project.
pub trait IRecipientDirectory: Send + Sync {
    fn recipients_for(&self, project_id: &str) -> AegisResult<Vec<Recipient>>;
}
