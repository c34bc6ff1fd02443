//! Team creation form.
//!
//! Submitting creates the team, then switches the user's active team to it.
//! Only a successful switch invalidates the cache and navigates home. A
//! failed switch leaves the new team in place and the active team unchanged.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use inbox_core::{defaults, is_known_currency, CreateTeamRequest, UpdateUserRequest};

use crate::client::Procedures;
use crate::error::CreateTeamError;
use crate::mutations::{CreateTeam, MutationDef, Pending, UpdateUser};
use crate::navigation::Navigator;
use crate::query::QueryCache;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTeamValues {
    pub name: String,
    pub base_currency: String,
}

impl CreateTeamValues {
    /// Client-side gate. The server applies the full rules.
    pub fn validate(&self) -> Result<(), CreateTeamError> {
        if self.name.chars().count() < defaults::TEAM_NAME_MIN_LEN {
            return Err(CreateTeamError::Validation(format!(
                "Team name must be at least {} characters.",
                defaults::TEAM_NAME_MIN_LEN
            )));
        }
        Ok(())
    }
}

pub struct CreateTeamForm {
    procedures: Arc<dyn Procedures>,
    cache: Arc<QueryCache>,
    navigator: Arc<dyn Navigator>,
    initial: CreateTeamValues,
    switching: Pending,
}

impl CreateTeamForm {
    /// `detected_currency` preselects the base currency when it is a known
    /// code; otherwise the default currency is used.
    pub fn new(
        procedures: Arc<dyn Procedures>,
        cache: Arc<QueryCache>,
        navigator: Arc<dyn Navigator>,
        detected_currency: Option<&str>,
    ) -> Self {
        let base_currency = detected_currency
            .map(str::to_uppercase)
            .filter(|c| is_known_currency(c))
            .unwrap_or_else(|| defaults::DEFAULT_CURRENCY.to_string());
        Self {
            procedures,
            cache,
            navigator,
            initial: CreateTeamValues {
                name: String::new(),
                base_currency,
            },
            switching: Pending::default(),
        }
    }

    pub fn initial_values(&self) -> &CreateTeamValues {
        &self.initial
    }

    /// True while the switch to the new team is in flight.
    pub fn is_submitting(&self) -> bool {
        self.switching.is_pending()
    }

    /// Create the team and switch to it. Returns the new team's id.
    pub async fn submit(&self, values: CreateTeamValues) -> Result<Uuid, CreateTeamError> {
        values.validate()?;

        let team_id = self
            .procedures
            .create_team(&CreateTeamRequest {
                name: values.name,
                base_currency: values.base_currency,
            })
            .await
            .map_err(CreateTeamError::Create)?;
        self.cache.apply(&CreateTeam::invalidates());
        info!(subsystem = "dashboard", op = CreateTeam::PATH, team_id = %team_id, "Team created");

        let switched = {
            let _pending = self.switching.start();
            self.procedures
                .update_user(&UpdateUserRequest {
                    team_id: Some(team_id),
                    full_name: None,
                })
                .await
        };
        if let Err(source) = switched {
            warn!(
                subsystem = "dashboard",
                op = UpdateUser::PATH,
                team_id = %team_id,
                error = %source,
                "Team created but switch failed"
            );
            return Err(CreateTeamError::Switch { team_id, source });
        }

        self.cache.apply(&UpdateUser::invalidates());
        self.navigator.push(defaults::DASHBOARD_ROOT);
        Ok(team_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::fake::FakeProcedures;
    use crate::navigation::History;
    use crate::query::Invalidation;
    use tokio::sync::oneshot;

    struct Harness {
        fake: Arc<FakeProcedures>,
        cache: Arc<QueryCache>,
        history: Arc<History>,
        form: Arc<CreateTeamForm>,
    }

    fn harness(fake: FakeProcedures) -> Harness {
        let fake = Arc::new(fake);
        let cache = Arc::new(QueryCache::new());
        let history = Arc::new(History::new());
        let form = Arc::new(CreateTeamForm::new(
            fake.clone(),
            cache.clone(),
            history.clone(),
            None,
        ));
        Harness {
            fake,
            cache,
            history,
            form,
        }
    }

    fn acme() -> CreateTeamValues {
        CreateTeamValues {
            name: "Acme".to_string(),
            base_currency: "USD".to_string(),
        }
    }

    #[test]
    fn test_default_currency() {
        let h = harness(FakeProcedures::default());
        assert_eq!(h.form.initial_values().base_currency, "USD");
        assert!(h.form.initial_values().name.is_empty());

        let form = CreateTeamForm::new(h.fake.clone(), h.cache.clone(), h.history.clone(), Some("sek"));
        assert_eq!(form.initial_values().base_currency, "SEK");
        let form = CreateTeamForm::new(h.fake, h.cache, h.history, Some("XXX"));
        assert_eq!(form.initial_values().base_currency, "USD");
    }

    #[tokio::test]
    async fn test_short_name_never_calls_api() {
        let h = harness(FakeProcedures::default());
        let err = h
            .form
            .submit(CreateTeamValues {
                name: "A".to_string(),
                base_currency: "USD".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CreateTeamError::Validation(_)));
        assert!(err.to_string().contains("at least 2 characters"));
        assert!(h.fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_then_switch_then_navigate() {
        let h = harness(FakeProcedures::default());
        let team_id = h.form.submit(acme()).await.unwrap();

        assert_eq!(
            h.fake.calls(),
            vec![
                "team.create:Acme:USD".to_string(),
                format!("user.update:{:?}", Some(team_id)),
            ]
        );
        assert_eq!(h.cache.invalidations(), vec![Invalidation::All]);
        assert_eq!(h.history.paths(), vec!["/".to_string()]);
        assert!(!h.form.is_submitting());
    }

    #[tokio::test]
    async fn test_create_failure_skips_switch() {
        let h = harness(FakeProcedures {
            fail_create_team: true,
            ..Default::default()
        });
        let err = h.form.submit(acme()).await.unwrap_err();

        assert!(matches!(err, CreateTeamError::Create(_)));
        assert_eq!(h.fake.calls(), vec!["team.create:Acme:USD".to_string()]);
        assert!(h.cache.invalidations().is_empty());
        assert!(h.history.paths().is_empty());
    }

    #[tokio::test]
    async fn test_switch_failure_does_not_invalidate_or_navigate() {
        let h = harness(FakeProcedures {
            fail_update_user: true,
            ..Default::default()
        });
        let err = h.form.submit(acme()).await.unwrap_err();

        let CreateTeamError::Switch { source, .. } = err else {
            panic!("expected switch failure");
        };
        assert_eq!(source.status(), Some(403));
        assert_eq!(h.fake.calls().len(), 2);
        assert!(!h.cache.invalidations().contains(&Invalidation::All));
        assert!(h.history.current().is_none());
        assert!(!h.form.is_submitting());
    }

    #[tokio::test]
    async fn test_pending_while_switching() {
        let (release, gate) = oneshot::channel();
        let fake = FakeProcedures::default();
        *fake.switch_gate.lock().unwrap() = Some(gate);
        let h = harness(fake);

        let form = h.form.clone();
        let submit = tokio::spawn(async move { form.submit(acme()).await });

        while !h.form.is_submitting() {
            tokio::task::yield_now().await;
        }
        release.send(()).unwrap();
        submit.await.unwrap().unwrap();
        assert!(!h.form.is_submitting());
    }
}
