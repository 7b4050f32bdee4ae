//! Subcommand implementations.

use crate::render::{self, Presenter};
use cf_core::client::{ApiClient, UploadArtifact};
use cf_core::config::models::AppConfig;
use cf_core::state::{SessionManager, Subscription};
use color_eyre::eyre::{eyre, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

fn attach_presenter(manager: &SessionManager) -> Subscription {
    let presenter = Arc::new(Mutex::new(Presenter::new()));
    manager.subscribe(move |session| {
        presenter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_state(session);
    })
}

/// Validate and upload a CV, then follow its pipeline.
pub async fn run(config: AppConfig, file: &Path, mime: Option<&str>) -> Result<()> {
    let artifact = UploadArtifact::from_path(file, mime).await?;

    let mut manager = SessionManager::new(config);
    let _subscription = attach_presenter(&manager);

    if manager.config().global.demo_mode {
        info!(file = artifact.file_name(), "demo_mode is set, simulating instead of uploading");
        manager.start_demo().await?;
        return follow(&mut manager).await;
    }

    if manager.check_health().await.is_none() {
        eprintln!("{}", render::offline_banner(manager.api().base_url()));
    }

    let upload = manager.start_upload(artifact).await?;
    render::print_upload(&upload);
    follow(&mut manager).await
}

/// Run the simulated pipeline.
pub async fn demo(config: AppConfig) -> Result<()> {
    let mut manager = SessionManager::new(config);
    let _subscription = attach_presenter(&manager);
    manager.start_demo().await?;
    follow(&mut manager).await
}

async fn follow(manager: &mut SessionManager) -> Result<()> {
    let metrics = manager.simulation();

    let interrupted = tokio::select! {
        _ = manager.run_to_completion() => false,
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        manager.reset();
        eprintln!("Interrupted");
        return Ok(());
    }

    let session = manager.session();
    render::print_summary(session, manager.config().global.log_display_limit);
    if let Some(metrics) = metrics {
        render::print_metrics(&metrics.borrow());
    }

    match &session.error {
        Some(error) => Err(eyre!("pipeline failed: {error}")),
        None => Ok(()),
    }
}

pub async fn health(config: AppConfig) -> Result<()> {
    let api = ApiClient::new(config.api_base_url());
    let health = api.check_health().await;
    render::print_health(api.base_url(), health.as_ref());
    Ok(())
}

pub async fn status(config: AppConfig, session_id: &str) -> Result<()> {
    let api = ApiClient::new(config.api_base_url());
    let status = api.session_status(session_id).await?;
    render::print_status(&status);
    Ok(())
}
