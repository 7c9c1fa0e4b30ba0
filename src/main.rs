//! mitos-rag CLI giriş noktası

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    // Log altyapısı
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // CLI çalıştır
    let cli = mitos_rag::cli::Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(mitos_rag::cli::run(cli))
}
