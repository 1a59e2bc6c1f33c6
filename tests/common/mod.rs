use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use user_access_api::config::AppConfig;
use user_access_api::{app, AppState};

pub struct TestServer {
    pub base_url: String,
}

impl TestServer {
    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            // Any HTTP answer means the listener is up
            if reqwest::get(format!("{}/swagger-resources", self.base_url)).await.is_ok() {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

/// Serve the app in-process on a free port using the development preset
pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(AppConfig::development()).await
}

pub async fn spawn_server_with(config: AppConfig) -> Result<TestServer> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let state = AppState::from_config(&config).context("failed to build app state")?;
    let router = app(state, &config);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let server = TestServer { base_url };
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
