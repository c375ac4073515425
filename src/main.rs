use anyhow::Context;
use libris_app::App;
use libris_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load settings")?;
    libris_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.path,
        "libris-app bootstrap starting"
    );

    let app = App::new(settings)?;
    app.prepare().await?;

    tracing::info!("libris-app bootstrap complete");
    app.serve().await
}
