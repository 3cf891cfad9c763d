use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::auth::session::SessionStore;
use crate::errors::AppError;
use crate::jobs::session_sweep_job;

pub struct JobSchedulerService {
    scheduler: JobScheduler,
    sessions: SessionStore,
}

impl JobSchedulerService {
    pub async fn new(sessions: SessionStore) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::External(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            sessions,
        })
    }

    /// Register the maintenance schedule and start it.
    pub async fn start(&mut self) -> Result<(), AppError> {
        info!("🚀 Starting job scheduler...");

        let sessions = self.sessions.clone();

        // cron format: sec min hour day month weekday
        let job = Job::new_async("0 */15 * * * *", move |_uuid, _l| {
            let sessions = sessions.clone();
            Box::pin(async move {
                if let Err(e) = session_sweep_job::sweep_sessions(sessions).await {
                    error!("Session sweep failed: {}", e);
                }
            })
        })
        .map_err(|e| AppError::External(format!("Failed to create job session_sweep: {}", e)))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::External(format!("Failed to add job session_sweep: {}", e)))?;

        info!("📅 Scheduled: session_sweep - Every 15 minutes [cron: 0 */15 * * * *]");

        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::External(format!("Failed to start scheduler: {}", e)))?;

        info!("✅ Job scheduler started");
        Ok(())
    }

    /// Stop the scheduler gracefully.
    #[allow(dead_code)]
    pub async fn stop(&mut self) -> Result<(), AppError> {
        info!("🛑 Stopping job scheduler...");
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::External(format!("Failed to stop scheduler: {}", e)))?;
        Ok(())
    }
}
