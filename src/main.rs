//! blueprint-compiler CLI binary

use anyhow::Result;

use blueprint_compiler::cli::CliApp;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blueprint_compiler=info".into()),
        )
        .init();

    let matches = CliApp::app().get_matches();

    CliApp::run(&matches).await
}
