use anyhow::Result;
use chrono::{DateTime, Utc};
use crates::domain::repositories::sweep::SweepRepository;
use crates::domain::value_objects::sweeps::{KIND_EXPIRE_ACCESS, expire_access_job};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, Default)]
pub struct ExpireAccessOutcome {
    pub jobs_run: usize,
    pub scanned: usize,
    pub demoted: usize,
    pub grants_revoked: usize,
    pub failed: usize,
}

pub struct ExpireAccessUseCase {
    sweep_repository: Arc<dyn SweepRepository + Send + Sync>,
}

impl ExpireAccessUseCase {
    pub fn new(sweep_repository: Arc<dyn SweepRepository + Send + Sync>) -> Self {
        Self { sweep_repository }
    }

    /// One sweep cycle: top up the queue, then work off every due job.
    ///
    /// A job that fails wholesale is marked FAILED and retried on the next
    /// cycle. A single user failing inside a job only bumps the `failed`
    /// counter; that user still matches the lapsed query next time.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<ExpireAccessOutcome> {
        if !self.sweep_repository.has_pending(KIND_EXPIRE_ACCESS).await? {
            let job_id = self
                .sweep_repository
                .enqueue(expire_access_job(now))
                .await?;
            info!(%job_id, "expire_access: sweep job enqueued");
        }

        let jobs = self.sweep_repository.due_jobs(now).await?;
        let mut outcome = ExpireAccessOutcome::default();

        for job in jobs {
            outcome.jobs_run += 1;

            match self.demote_lapsed_users(now).await {
                Ok(stats) => {
                    outcome.scanned += stats.scanned;
                    outcome.demoted += stats.demoted;
                    outcome.grants_revoked += stats.grants_revoked;
                    outcome.failed += stats.failed;

                    if let Err(err) = self.sweep_repository.mark_completed(job.id, now).await {
                        error!(
                            job_id = %job.id,
                            db_error = ?err,
                            "expire_access: failed to mark job completed"
                        );
                    }
                }
                Err(err) => {
                    error!(job_id = %job.id, error = ?err, "expire_access: sweep job failed");
                    if let Err(mark_err) = self
                        .sweep_repository
                        .mark_failed(job.id, &err.to_string(), now)
                        .await
                    {
                        error!(
                            job_id = %job.id,
                            db_error = ?mark_err,
                            "expire_access: failed to mark job failed"
                        );
                    }
                }
            }
        }

        info!(
            jobs_run = outcome.jobs_run,
            scanned = outcome.scanned,
            demoted = outcome.demoted,
            grants_revoked = outcome.grants_revoked,
            failed = outcome.failed,
            "expire_access: completed"
        );

        Ok(outcome)
    }

    async fn demote_lapsed_users(&self, now: DateTime<Utc>) -> Result<ExpireAccessOutcome> {
        let lapsed = self.sweep_repository.list_lapsed_users(now).await?;
        let mut stats = ExpireAccessOutcome {
            scanned: lapsed.len(),
            ..Default::default()
        };

        for user in lapsed {
            match self.sweep_repository.demote_lapsed_user(user.id, now).await {
                Ok(revoked) => {
                    stats.demoted += 1;
                    stats.grants_revoked += revoked;
                    info!(
                        user_id = %user.id,
                        grants_revoked = revoked,
                        "expire_access: demoted lapsed user"
                    );
                }
                Err(err) => {
                    stats.failed += 1;
                    error!(
                        user_id = %user.id,
                        db_error = ?err,
                        "expire_access: failed to demote user; continuing"
                    );
                }
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::Duration;
    use crates::domain::entities::{sweep_jobs::SweepJobEntity, users::UserEntity};
    use crates::domain::repositories::sweep::MockSweepRepository;
    use crates::domain::value_objects::enums::{
        approval_statuses::ApprovalStatus, payment_statuses::PaymentStatus,
        sweep_job_statuses::SweepJobStatus,
    };
    use mockall::predicate::eq;
    use uuid::Uuid;

    fn due_job(now: DateTime<Utc>) -> SweepJobEntity {
        SweepJobEntity {
            id: Uuid::new_v4(),
            kind: KIND_EXPIRE_ACCESS.to_string(),
            status: SweepJobStatus::Pending.to_string(),
            scheduled_at: now,
            processed_at: None,
            error: None,
            created_at: now,
        }
    }

    fn lapsed_user(email: &str, now: DateTime<Utc>) -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            user_number: 80001,
            email: email.to_string(),
            password_hash: "argon2-hash".to_string(),
            name: Some("Lapsed Member".to_string()),
            phone: None,
            membership_plan: Some("PRO".to_string()),
            payment_method: Some("BANK_TRANSFER".to_string()),
            payment_status: PaymentStatus::Completed.to_string(),
            approval_status: ApprovalStatus::Approved.to_string(),
            payment_proof_path: None,
            access_expires_at: Some(now - Duration::days(1)),
            account_number: None,
            refresh_token_hash: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
            is_deleted: false,
            deleted_at: None,
            created_at: now - Duration::days(40),
            updated_at: now - Duration::days(40),
        }
    }

    #[tokio::test]
    async fn a_quiet_queue_is_primed_and_swept() {
        let now = Utc::now();
        let job = due_job(now);
        let job_id = job.id;
        let first = lapsed_user("first@example.com", now);
        let second = lapsed_user("second@example.com", now);

        let mut sweep_repository = MockSweepRepository::new();
        sweep_repository
            .expect_has_pending()
            .with(eq(KIND_EXPIRE_ACCESS))
            .returning(|_| Box::pin(async { Ok(false) }));
        sweep_repository
            .expect_enqueue()
            .withf(move |entity| {
                entity.kind == KIND_EXPIRE_ACCESS && entity.scheduled_at == now
            })
            .times(1)
            .returning(move |_| Box::pin(async move { Ok(job_id) }));
        sweep_repository.expect_due_jobs().returning(move |_| {
            let job = job.clone();
            Box::pin(async move { Ok(vec![job]) })
        });
        sweep_repository.expect_list_lapsed_users().returning(move |_| {
            let users = vec![first.clone(), second.clone()];
            Box::pin(async move { Ok(users) })
        });
        sweep_repository
            .expect_demote_lapsed_user()
            .times(2)
            .returning(|_, _| Box::pin(async { Ok(1) }));
        sweep_repository
            .expect_mark_completed()
            .with(eq(job_id), eq(now))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let usecase = ExpireAccessUseCase::new(Arc::new(sweep_repository));
        let outcome = usecase.run(now).await.unwrap();

        assert_eq!(outcome.jobs_run, 1);
        assert_eq!(outcome.scanned, 2);
        assert_eq!(outcome.demoted, 2);
        assert_eq!(outcome.grants_revoked, 2);
        assert_eq!(outcome.failed, 0);
    }

    #[tokio::test]
    async fn a_pending_job_is_not_enqueued_twice() {
        let now = Utc::now();

        // No enqueue expectation: a primed queue must not grow.
        let mut sweep_repository = MockSweepRepository::new();
        sweep_repository
            .expect_has_pending()
            .returning(|_| Box::pin(async { Ok(true) }));
        sweep_repository
            .expect_due_jobs()
            .returning(|_| Box::pin(async { Ok(vec![]) }));

        let usecase = ExpireAccessUseCase::new(Arc::new(sweep_repository));
        let outcome = usecase.run(now).await.unwrap();

        assert_eq!(outcome.jobs_run, 0);
        assert_eq!(outcome.scanned, 0);
    }

    #[tokio::test]
    async fn one_failing_user_does_not_block_the_rest() {
        let now = Utc::now();
        let job = due_job(now);
        let job_id = job.id;
        let first = lapsed_user("first@example.com", now);
        let stuck = lapsed_user("stuck@example.com", now);
        let third = lapsed_user("third@example.com", now);
        let stuck_id = stuck.id;

        let mut sweep_repository = MockSweepRepository::new();
        sweep_repository
            .expect_has_pending()
            .returning(|_| Box::pin(async { Ok(true) }));
        sweep_repository.expect_due_jobs().returning(move |_| {
            let job = job.clone();
            Box::pin(async move { Ok(vec![job]) })
        });
        sweep_repository.expect_list_lapsed_users().returning(move |_| {
            let users = vec![first.clone(), stuck.clone(), third.clone()];
            Box::pin(async move { Ok(users) })
        });
        sweep_repository
            .expect_demote_lapsed_user()
            .times(3)
            .returning(move |user_id, _| {
                let failing = user_id == stuck_id;
                Box::pin(async move {
                    if failing {
                        Err(anyhow!("deadlock detected"))
                    } else {
                        Ok(1)
                    }
                })
            });
        // User failures do not fail the job; the lapsed query re-finds them next run.
        sweep_repository
            .expect_mark_completed()
            .with(eq(job_id), eq(now))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let usecase = ExpireAccessUseCase::new(Arc::new(sweep_repository));
        let outcome = usecase.run(now).await.unwrap();

        assert_eq!(outcome.scanned, 3);
        assert_eq!(outcome.demoted, 2);
        assert_eq!(outcome.grants_revoked, 2);
        assert_eq!(outcome.failed, 1);
    }

    #[tokio::test]
    async fn a_failing_scan_marks_the_job_failed() {
        let now = Utc::now();
        let job = due_job(now);
        let job_id = job.id;

        let mut sweep_repository = MockSweepRepository::new();
        sweep_repository
            .expect_has_pending()
            .returning(|_| Box::pin(async { Ok(true) }));
        sweep_repository.expect_due_jobs().returning(move |_| {
            let job = job.clone();
            Box::pin(async move { Ok(vec![job]) })
        });
        sweep_repository
            .expect_list_lapsed_users()
            .returning(|_| Box::pin(async { Err(anyhow!("connection reset")) }));
        sweep_repository
            .expect_mark_failed()
            .withf(move |id, error, _| *id == job_id && error.contains("connection reset"))
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let usecase = ExpireAccessUseCase::new(Arc::new(sweep_repository));
        let outcome = usecase.run(now).await.unwrap();

        assert_eq!(outcome.jobs_run, 1);
        assert_eq!(outcome.scanned, 0);
        assert_eq!(outcome.demoted, 0);
    }
}
