use std::sync::Arc;

use crates::domain::{
    entities::admin_logs::InsertAdminLogEntity,
    repositories::{
        admin_logs::AdminLogRepository,
        plan_meta::{PlanCreation, PlanMetaRepository, PlanUpdate},
    },
    value_objects::{
        admin_logs::{
            ACTION_CLEAR_PLAN_FILE, ACTION_CREATE_PLAN, ACTION_DELETE_PLAN, ACTION_SET_PLAN_ACTIVE,
            ACTION_SET_PLAN_FILE, ACTION_UPDATE_PLAN, plan_action,
        },
        enums::plan_names::PlanName,
        plans::{CreatePlanModel, FileSlot, PlanMetaModel, SetPlanFileModel, UpdatePlanModel},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PlanCatalogError {
    #[error("a plan with this name already exists")]
    NameTaken,
    #[error("plan not found")]
    PlanNotFound,
    #[error("the new plan name is already in use")]
    RenameCollision,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PlanCatalogError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PlanCatalogError::NameTaken | PlanCatalogError::RenameCollision => {
                StatusCode::CONFLICT
            }
            PlanCatalogError::PlanNotFound => StatusCode::NOT_FOUND,
            PlanCatalogError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PlanCatalogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PlanCatalogError>;

pub struct PlanCatalogUseCase<P, L>
where
    P: PlanMetaRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    plan_repo: Arc<P>,
    admin_log_repo: Arc<L>,
}

impl<P, L> PlanCatalogUseCase<P, L>
where
    P: PlanMetaRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    pub fn new(plan_repo: Arc<P>, admin_log_repo: Arc<L>) -> Self {
        Self {
            plan_repo,
            admin_log_repo,
        }
    }

    /// Full catalog for the admin screens, inactive tiers included.
    pub async fn list_plans(&self) -> UseCaseResult<Vec<PlanMetaModel>> {
        let plans = self.plan_repo.list_all().await.map_err(|err| {
            error!(db_error = ?err, "plan_catalog: failed to list plans");
            PlanCatalogError::Internal(err)
        })?;

        Ok(plans.into_iter().map(PlanMetaModel::from).collect())
    }

    pub async fn create_plan(
        &self,
        admin_id: Uuid,
        payload: CreatePlanModel,
    ) -> UseCaseResult<PlanMetaModel> {
        let name = payload.name.trim().to_uppercase();
        if PlanName::from_str(&name).is_none() {
            return Err(PlanCatalogError::Validation(format!(
                "Unknown tier name: {}",
                payload.name
            )));
        }
        validate_terms(
            Some(payload.price),
            Some(payload.duration_days),
            payload.features.as_ref(),
        )?;
        if payload.label.trim().is_empty() {
            return Err(PlanCatalogError::Validation(
                "Plan label is required".to_string(),
            ));
        }

        let creation = self
            .plan_repo
            .create(payload.to_entity())
            .await
            .map_err(|err| {
                error!(%name, db_error = ?err, "plan_catalog: failed to create plan");
                PlanCatalogError::Internal(err)
            })?;

        match creation {
            PlanCreation::Created(plan) => {
                info!(%admin_id, plan = %plan.name, "plan_catalog: plan created");
                self.audit(plan_action(
                    admin_id,
                    ACTION_CREATE_PLAN,
                    Some(format!("Created plan {}", plan.name)),
                ))
                .await;
                Ok(PlanMetaModel::from(plan))
            }
            PlanCreation::NameTaken => {
                let err = PlanCatalogError::NameTaken;
                warn!(
                    %admin_id,
                    %name,
                    status = err.status_code().as_u16(),
                    "plan_catalog: create hit an existing name"
                );
                Err(err)
            }
        }
    }

    pub async fn update_plan(
        &self,
        admin_id: Uuid,
        name: &str,
        payload: UpdatePlanModel,
    ) -> UseCaseResult<PlanMetaModel> {
        let name = name.trim().to_uppercase();
        if let Some(new_name) = &payload.name {
            let new_name = new_name.trim().to_uppercase();
            if PlanName::from_str(&new_name).is_none() {
                return Err(PlanCatalogError::Validation(format!(
                    "Unknown tier name: {}",
                    new_name
                )));
            }
        }
        validate_terms(payload.price, payload.duration_days, payload.features.as_ref())?;

        let update = self
            .plan_repo
            .update(&name, payload.to_entity())
            .await
            .map_err(|err| {
                error!(%name, db_error = ?err, "plan_catalog: failed to update plan");
                PlanCatalogError::Internal(err)
            })?;

        match update {
            PlanUpdate::Updated(plan) => {
                info!(%admin_id, plan = %plan.name, "plan_catalog: plan updated");
                self.audit(plan_action(
                    admin_id,
                    ACTION_UPDATE_PLAN,
                    Some(format!("Updated plan {}", plan.name)),
                ))
                .await;
                Ok(PlanMetaModel::from(plan))
            }
            PlanUpdate::NotFound => Err(PlanCatalogError::PlanNotFound),
            PlanUpdate::RenameCollision => {
                let err = PlanCatalogError::RenameCollision;
                warn!(
                    %admin_id,
                    %name,
                    status = err.status_code().as_u16(),
                    "plan_catalog: rename collided with another tier"
                );
                Err(err)
            }
        }
    }

    pub async fn set_plan_active(
        &self,
        admin_id: Uuid,
        name: &str,
        is_active: bool,
    ) -> UseCaseResult<PlanMetaModel> {
        let name = name.trim().to_uppercase();

        let plan = self
            .plan_repo
            .set_active(&name, is_active)
            .await
            .map_err(|err| {
                error!(%name, db_error = ?err, "plan_catalog: failed to toggle plan");
                PlanCatalogError::Internal(err)
            })?
            .ok_or(PlanCatalogError::PlanNotFound)?;

        info!(%admin_id, plan = %plan.name, is_active, "plan_catalog: plan toggled");
        let note = if is_active {
            format!("Activated plan {}", plan.name)
        } else {
            format!("Deactivated plan {}", plan.name)
        };
        self.audit(plan_action(admin_id, ACTION_SET_PLAN_ACTIVE, Some(note)))
            .await;

        Ok(PlanMetaModel::from(plan))
    }

    /// Hard delete of the catalog row. Grants keep their frozen snapshots, so
    /// members approved on this tier are untouched.
    pub async fn delete_plan(&self, admin_id: Uuid, name: &str) -> UseCaseResult<String> {
        let name = name.trim().to_uppercase();

        let deleted = self.plan_repo.delete(&name).await.map_err(|err| {
            error!(%name, db_error = ?err, "plan_catalog: failed to delete plan");
            PlanCatalogError::Internal(err)
        })?;

        if !deleted {
            return Err(PlanCatalogError::PlanNotFound);
        }

        info!(%admin_id, plan = %name, "plan_catalog: plan deleted");
        self.audit(plan_action(
            admin_id,
            ACTION_DELETE_PLAN,
            Some(format!("Deleted plan {}", name)),
        ))
        .await;

        Ok("Plan deleted.".to_string())
    }

    pub async fn set_plan_file(
        &self,
        admin_id: Uuid,
        name: &str,
        slot: &str,
        payload: SetPlanFileModel,
    ) -> UseCaseResult<PlanMetaModel> {
        let name = name.trim().to_uppercase();
        let slot = parse_slot(slot)?;
        if payload.path.trim().is_empty() {
            return Err(PlanCatalogError::Validation(
                "File path is required".to_string(),
            ));
        }
        if payload.name.trim().is_empty() {
            return Err(PlanCatalogError::Validation(
                "File name is required".to_string(),
            ));
        }

        let plan = self
            .plan_repo
            .set_file_slot(&name, slot, payload.path, payload.name)
            .await
            .map_err(|err| {
                error!(%name, db_error = ?err, "plan_catalog: failed to set plan file");
                PlanCatalogError::Internal(err)
            })?
            .ok_or(PlanCatalogError::PlanNotFound)?;

        info!(
            %admin_id,
            plan = %plan.name,
            slot = slot.as_str(),
            "plan_catalog: plan file set"
        );
        self.audit(plan_action(
            admin_id,
            ACTION_SET_PLAN_FILE,
            Some(format!("Set file slot {} on plan {}", slot.as_str(), plan.name)),
        ))
        .await;

        Ok(PlanMetaModel::from(plan))
    }

    pub async fn clear_plan_file(
        &self,
        admin_id: Uuid,
        name: &str,
        slot: &str,
    ) -> UseCaseResult<PlanMetaModel> {
        let name = name.trim().to_uppercase();
        let slot = parse_slot(slot)?;

        let plan = self
            .plan_repo
            .clear_file_slot(&name, slot)
            .await
            .map_err(|err| {
                error!(%name, db_error = ?err, "plan_catalog: failed to clear plan file");
                PlanCatalogError::Internal(err)
            })?
            .ok_or(PlanCatalogError::PlanNotFound)?;

        info!(
            %admin_id,
            plan = %plan.name,
            slot = slot.as_str(),
            "plan_catalog: plan file cleared"
        );
        self.audit(plan_action(
            admin_id,
            ACTION_CLEAR_PLAN_FILE,
            Some(format!(
                "Cleared file slot {} on plan {}",
                slot.as_str(),
                plan.name
            )),
        ))
        .await;

        Ok(PlanMetaModel::from(plan))
    }

    /// The catalog write has already committed at this point. A failed audit
    /// insert is logged and does not fail the call.
    async fn audit(&self, entry: InsertAdminLogEntity) {
        if let Err(err) = self.admin_log_repo.append(entry).await {
            error!(db_error = ?err, "plan_catalog: failed to append audit row");
        }
    }
}

fn parse_slot(slot: &str) -> UseCaseResult<FileSlot> {
    FileSlot::from_str(slot.trim().to_uppercase().as_str())
        .ok_or_else(|| PlanCatalogError::Validation(format!("Unknown file slot: {}", slot)))
}

fn validate_terms(
    price: Option<i32>,
    duration_days: Option<i32>,
    features: Option<&serde_json::Value>,
) -> UseCaseResult<()> {
    if price.is_some_and(|price| price < 0) {
        return Err(PlanCatalogError::Validation(
            "Price must not be negative".to_string(),
        ));
    }
    if duration_days.is_some_and(|days| days < 1) {
        return Err(PlanCatalogError::Validation(
            "Duration must be at least one day".to_string(),
        ));
    }
    if features.is_some_and(|features| !features.is_object()) {
        return Err(PlanCatalogError::Validation(
            "Plan features must be a JSON object".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crates::domain::{
        entities::plan_meta::PlanMetaEntity,
        repositories::{
            admin_logs::MockAdminLogRepository, plan_meta::MockPlanMetaRepository,
        },
        value_objects::plan_features::PlanFeatures,
    };
    use mockall::predicate::eq;
    use serde_json::json;

    fn sample_plan(name: &str) -> PlanMetaEntity {
        let now = Utc::now();
        PlanMetaEntity {
            id: Uuid::new_v4(),
            name: name.to_string(),
            label: format!("{name} plan"),
            description: None,
            price: 4900,
            duration_days: 30,
            features: PlanFeatures::default(),
            is_active: true,
            file_a_path: None,
            file_a_name: None,
            file_a_updated_at: None,
            file_b_path: None,
            file_b_name: None,
            file_b_updated_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn create_payload(name: &str) -> CreatePlanModel {
        CreatePlanModel {
            name: name.to_string(),
            label: format!("{name} plan"),
            description: None,
            price: 4900,
            duration_days: 30,
            features: Some(json!({"SIGNAL_CHARTS": true})),
            is_active: None,
        }
    }

    fn audit_log_expecting(action: &'static str) -> MockAdminLogRepository {
        let mut admin_log_repo = MockAdminLogRepository::new();
        admin_log_repo
            .expect_append()
            .withf(move |entry| entry.action == action)
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));
        admin_log_repo
    }

    #[tokio::test]
    async fn create_plan_stores_uppercased_name_and_audits() {
        let mut plan_repo = MockPlanMetaRepository::new();
        plan_repo
            .expect_create()
            .withf(|entity| entity.name == "BASIC" && entity.is_active)
            .times(1)
            .returning(|_| Box::pin(async { Ok(PlanCreation::Created(sample_plan("BASIC"))) }));

        let usecase = PlanCatalogUseCase::new(
            Arc::new(plan_repo),
            Arc::new(audit_log_expecting(ACTION_CREATE_PLAN)),
        );

        // Lowercase input must land as the canonical tier name.
        let plan = usecase
            .create_plan(Uuid::new_v4(), create_payload("basic"))
            .await
            .unwrap();

        assert_eq!(plan.name, "BASIC");
    }

    #[tokio::test]
    async fn create_plan_rejects_unknown_tier() {
        let usecase = PlanCatalogUseCase::new(
            Arc::new(MockPlanMetaRepository::new()),
            Arc::new(MockAdminLogRepository::new()),
        );

        let err = usecase
            .create_plan(Uuid::new_v4(), create_payload("PLATINUM"))
            .await
            .unwrap_err();

        assert!(matches!(err, PlanCatalogError::Validation(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn create_plan_surfaces_name_collision() {
        let mut plan_repo = MockPlanMetaRepository::new();
        plan_repo
            .expect_create()
            .returning(|_| Box::pin(async { Ok(PlanCreation::NameTaken) }));

        // No audit expectation: a refused create must not append a row.
        let usecase = PlanCatalogUseCase::new(
            Arc::new(plan_repo),
            Arc::new(MockAdminLogRepository::new()),
        );

        let err = usecase
            .create_plan(Uuid::new_v4(), create_payload("BASIC"))
            .await
            .unwrap_err();

        assert!(matches!(err, PlanCatalogError::NameTaken));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn rename_collision_is_a_conflict() {
        let mut plan_repo = MockPlanMetaRepository::new();
        plan_repo
            .expect_update()
            .withf(|name, changes| name == "BASIC" && changes.name.as_deref() == Some("PRO"))
            .returning(|_, _| Box::pin(async { Ok(PlanUpdate::RenameCollision) }));

        let usecase = PlanCatalogUseCase::new(
            Arc::new(plan_repo),
            Arc::new(MockAdminLogRepository::new()),
        );

        let payload = UpdatePlanModel {
            name: Some("pro".to_string()),
            label: None,
            description: None,
            price: None,
            duration_days: None,
            features: None,
            is_active: None,
        };

        let err = usecase
            .update_plan(Uuid::new_v4(), "basic", payload)
            .await
            .unwrap_err();

        assert!(matches!(err, PlanCatalogError::RenameCollision));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn update_rejects_a_rename_to_an_unknown_tier() {
        let usecase = PlanCatalogUseCase::new(
            Arc::new(MockPlanMetaRepository::new()),
            Arc::new(MockAdminLogRepository::new()),
        );

        let payload = UpdatePlanModel {
            name: Some("GOLD".to_string()),
            label: None,
            description: None,
            price: None,
            duration_days: None,
            features: None,
            is_active: None,
        };

        let err = usecase
            .update_plan(Uuid::new_v4(), "BASIC", payload)
            .await
            .unwrap_err();

        assert!(matches!(err, PlanCatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn toggling_a_missing_plan_is_not_found() {
        let mut plan_repo = MockPlanMetaRepository::new();
        plan_repo
            .expect_set_active()
            .with(eq("VIP"), eq(false))
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let usecase = PlanCatalogUseCase::new(
            Arc::new(plan_repo),
            Arc::new(MockAdminLogRepository::new()),
        );

        let err = usecase
            .set_plan_active(Uuid::new_v4(), "VIP", false)
            .await
            .unwrap_err();

        assert!(matches!(err, PlanCatalogError::PlanNotFound));
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_plan_appends_an_audit_row() {
        let mut plan_repo = MockPlanMetaRepository::new();
        plan_repo
            .expect_delete()
            .with(eq("BASIC"))
            .returning(|_| Box::pin(async { Ok(true) }));

        let usecase = PlanCatalogUseCase::new(
            Arc::new(plan_repo),
            Arc::new(audit_log_expecting(ACTION_DELETE_PLAN)),
        );

        let message = usecase.delete_plan(Uuid::new_v4(), "BASIC").await.unwrap();
        assert_eq!(message, "Plan deleted.");
    }

    #[tokio::test]
    async fn file_slot_accepts_lowercase_and_rejects_unknown() {
        let mut plan_repo = MockPlanMetaRepository::new();
        plan_repo
            .expect_set_file_slot()
            .withf(|name, slot, path, file_name| {
                name == "PRO"
                    && *slot == FileSlot::A
                    && path == "/files/pro/ea.zip"
                    && file_name == "ea.zip"
            })
            .returning(|_, _, _, _| Box::pin(async { Ok(Some(sample_plan("PRO"))) }));

        let usecase = PlanCatalogUseCase::new(
            Arc::new(plan_repo),
            Arc::new(audit_log_expecting(ACTION_SET_PLAN_FILE)),
        );

        let payload = SetPlanFileModel {
            path: "/files/pro/ea.zip".to_string(),
            name: "ea.zip".to_string(),
        };
        let plan = usecase
            .set_plan_file(Uuid::new_v4(), "pro", "a", payload)
            .await
            .unwrap();
        assert_eq!(plan.name, "PRO");

        let payload = SetPlanFileModel {
            path: "/files/pro/ea.zip".to_string(),
            name: "ea.zip".to_string(),
        };
        let err = usecase
            .set_plan_file(Uuid::new_v4(), "pro", "Z", payload)
            .await
            .unwrap_err();
        assert!(matches!(err, PlanCatalogError::Validation(_)));
    }
}
