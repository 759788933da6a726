use anyhow::Context;
use leeslog_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load leeslog settings")?;
    leeslog_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        store = ?settings.store.backend,
        "leeslog bootstrap starting"
    );

    leeslog_app::app::serve(settings).await
}
