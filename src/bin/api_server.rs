use std::net::SocketAddr;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skyops_mission::api::create_router;
use skyops_mission::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("skyops_mission=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let config = Config::from_env();
    let app = create_router(&config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Mission API listening on http://{}", addr);
    tracing::info!("  GET  /health");
    tracing::info!("  GET  /api/convert/itm-to-wgs84?x=<x>&y=<y>");
    tracing::info!("  GET  /api/convert/wgs84-to-itm?lat=<lat>&lon=<lon>");
    tracing::info!("  POST /api/export/litchi (JSON: path, speed?, altitude?)");
    tracing::info!("  POST /api/overlay (multipart/form-data: image + geometry)");

    axum::serve(listener, app).await?;
    Ok(())
}
