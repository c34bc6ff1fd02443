//! Recording [`Procedures`] double for component tests.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;
use uuid::Uuid;

use inbox_core::{
    CreateTeamRequest, Document, DocumentTag, DocumentTagAssignmentRequest, UpdateUserRequest,
    User,
};

use crate::client::Procedures;
use crate::error::{ClientError, Result};

#[derive(Default)]
pub struct FakeProcedures {
    pub calls: Mutex<Vec<String>>,
    pub fail_create_team: bool,
    pub fail_update_user: bool,
    pub fail_assignments: bool,
    pub switch_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeProcedures {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn rejected(status: u16) -> ClientError {
    ClientError::Http {
        status,
        message: "rejected".to_string(),
    }
}

#[async_trait]
impl Procedures for FakeProcedures {
    async fn create_team(&self, req: &CreateTeamRequest) -> Result<Uuid> {
        self.record(format!("team.create:{}:{}", req.name, req.base_currency));
        if self.fail_create_team {
            return Err(rejected(400));
        }
        Ok(inbox_core::new_v7())
    }

    async fn update_user(&self, req: &UpdateUserRequest) -> Result<User> {
        let gate = self.switch_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.record(format!("user.update:{:?}", req.team_id));
        if self.fail_update_user {
            return Err(rejected(403));
        }
        Ok(User {
            id: Uuid::nil(),
            email: "fake@example.com".to_string(),
            full_name: None,
            team_id: req.team_id,
        })
    }

    async fn current_user(&self) -> Result<User> {
        Err(rejected(404))
    }

    async fn get_document(&self, _id: Uuid) -> Result<Document> {
        Err(rejected(404))
    }

    async fn list_document_tags(&self) -> Result<Vec<DocumentTag>> {
        Ok(Vec::new())
    }

    async fn create_document_tag_assignment(
        &self,
        req: DocumentTagAssignmentRequest,
    ) -> Result<()> {
        self.record(format!("assign:{}:{}", req.tag_id, req.document_id));
        if self.fail_assignments {
            return Err(rejected(404));
        }
        Ok(())
    }

    async fn delete_document_tag_assignment(
        &self,
        req: DocumentTagAssignmentRequest,
    ) -> Result<()> {
        self.record(format!("unassign:{}:{}", req.tag_id, req.document_id));
        if self.fail_assignments {
            return Err(rejected(404));
        }
        Ok(())
    }
}
