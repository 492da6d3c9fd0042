use crate::cli::Commands;
use crate::utils::{load_config, load_database_url};
use codarch_core::{CodarchError, Result, SnippetStore};
use tokio::runtime::Runtime;
use tracing::info;

pub fn handle_command(command: Option<Commands>) -> Result<()> {
    match command {
        Some(command) => handle_subcommand(command),
        None => handle_serve_command(None, None), // Default: serve with environment settings
    }
}

fn handle_subcommand(command: Commands) -> Result<()> {
    match command {
        Commands::Serve { port, database_url } => handle_serve_command(port, database_url),
        Commands::Ping { database_url } => handle_ping_command(database_url),
    }
}

fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CodarchError::from)
}

fn handle_serve_command(port: Option<u16>, database_url: Option<String>) -> Result<()> {
    let config = load_config(port, database_url)?;

    // Block the current thread with the server
    runtime()?.block_on(async {
        info!("Starting Codarch API on {}...", config.listen_address());
        codarch_server::run(config).await
    })
}

fn handle_ping_command(database_url: Option<String>) -> Result<()> {
    let url = load_database_url(database_url)?;

    runtime()?.block_on(async {
        let store = SnippetStore::open(&url)?;
        store.ping().await?;
        store.close()?;
        println!("Pinged snippet store at {url}, connection OK");
        Ok(())
    })
}
