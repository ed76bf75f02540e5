//! Research API - Entry Point

use core_config::tracing::install_color_eyre;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before any fallible operation so startup errors are rendered with color-eyre
    install_color_eyre();

    research_api::run().await
}
