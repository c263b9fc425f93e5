use anyhow::{bail, Context, Result};
use log::{error, info, warn};
use rolefit_client::api::auth::Credentials;
use rolefit_client::api::devices::DeviceParams;
use rolefit_client::api::tasks::TaskParams;
use rolefit_client::{ApiClient, AuthGuard, MemoryTokenStore, Navigation, RouteName};
use std::sync::Arc;

// ===== Configuration =====
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

// Read-only walk over a live backend. Needs ROLEFIT_SMOKE_USER / ROLEFIT_SMOKE_PASSWORD.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("🚀 Starting RoleFit smoke run");

    let base_url = std::env::var("ROLEFIT_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let username = std::env::var("ROLEFIT_SMOKE_USER").context("ROLEFIT_SMOKE_USER is not set")?;
    let password = std::env::var("ROLEFIT_SMOKE_PASSWORD").context("ROLEFIT_SMOKE_PASSWORD is not set")?;

    let tokens = Arc::new(MemoryTokenStore::new());
    let client = ApiClient::new(&base_url, tokens.clone())?;
    let guard = AuthGuard::new(tokens.clone());

    if guard.check(RouteName::Dashboard) != Navigation::Redirect(RouteName::Login) {
        bail!("guard let an anonymous session through");
    }

    let session = client
        .auth()
        .login(&Credentials::new(username, password))
        .await
        .context("login failed")?;
    info!("🔑 Logged in as {} ({})", session.user.username, session.user.role);

    let mut failures = 0;
    failures += step("dashboard", async {
        let summary = client.stats().dashboard().await?;
        info!("📊 {} devices, {} tasks", summary.total_devices, summary.total_tasks);
        Ok::<_, anyhow::Error>(())
    })
    .await;
    failures += step("devices", async {
        let page = client.devices().list(&DeviceParams::default()).await?;
        info!("🖥️  {} devices (page {} of {})", page.total, page.page, page.page_count());
        if let Some(device) = page.items.first() {
            let rollup = client.devices().status(&device.id).await?;
            info!("   {} is {}", device.device_name, rollup.status);
        }
        Ok::<_, anyhow::Error>(())
    })
    .await;
    failures += step("tasks", async {
        let page = client.tasks().list(&TaskParams::default()).await?;
        info!("📋 {} tasks", page.total);
        Ok::<_, anyhow::Error>(())
    })
    .await;
    failures += step("ai reports", async {
        let reports = client.ai().reports(&Default::default()).await?;
        info!("🤖 {} analysis reports", reports.total);
        Ok::<_, anyhow::Error>(())
    })
    .await;

    client.auth().logout().await?;
    if tokens.clear_count() == 0 {
        warn!("⚠️ logout did not clear the session");
        failures += 1;
    }

    if failures > 0 {
        bail!("{failures} smoke step(s) failed");
    }
    info!("✅ Smoke run passed");
    Ok(())
}

async fn step<F>(name: &str, fut: F) -> usize
where
    F: std::future::Future<Output = Result<()>>,
{
    match fut.await {
        Ok(()) => 0,
        Err(e) => {
            error!("❌ {name}: {e:#}");
            1
        }
    }
}
