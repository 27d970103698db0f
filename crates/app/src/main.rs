use std::sync::Arc;

use anyhow::Context;
use perspecto_app::config::AppConfig;
use perspecto_app::prefs::{FileSessionStore, Preferences};
use perspecto_app::scope::ScreenScope;
use perspecto_app::telemetry;
use perspecto_app::viewmodel::{AuthViewModel, StartDestination, VideoListViewModel};
use perspecto_db::repositories::{AccountRepo, FolderRepo, VideoRepo};
use perspecto_db::Backend;
use perspecto_supabase::SupabaseClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    telemetry::init_tracing(json_logs);

    let config = AppConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        supabase_url = %config.supabase_url,
        data_dir = %config.data_dir.display(),
        "Configuration loaded"
    );

    let store = Arc::new(FileSessionStore::new(&config.data_dir));
    let client = SupabaseClient::new(
        &config.supabase_url,
        &config.supabase_anon_key,
        config.request_timeout(),
    )
    .context("Failed to build HTTP client")?
    .with_session_store(store);

    client
        .restore_session()
        .await
        .context("Failed to restore session")?;

    let backend: Arc<dyn Backend> = Arc::new(client);
    let auth = AuthViewModel::new(
        AccountRepo::new(backend.clone()),
        Preferences::new(&config.data_dir),
    );

    let destination = auth.start_destination();
    tracing::info!(?destination, "Start destination resolved");

    if destination == StartDestination::Main {
        let library = VideoListViewModel::new(
            VideoRepo::with_bucket(backend.clone(), config.video_bucket.clone()),
            FolderRepo::new(backend),
        );
        let scope = ScreenScope::new();
        let fetch = scope.launch({
            let library = library.clone();
            async move { library.fetch(false).await }
        });
        tokio::select! {
            joined = fetch => {
                if joined.context("Library task failed")?.is_none() {
                    tracing::info!("Library load cancelled");
                    return Ok(());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                scope.close();
                tracing::info!("Interrupted, library load cancelled");
                return Ok(());
            }
        }
        let state = library.snapshot();
        if let Some(error) = state.error {
            anyhow::bail!("Library fetch failed: {error}");
        }
        tracing::info!(
            folders = state.view.folders.len(),
            videos = state.view.videos.len(),
            "Library loaded"
        );
    }

    Ok(())
}
