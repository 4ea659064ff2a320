use std::sync::Arc;

use craft_ban::catalog::MaterialCatalog;
use craft_ban::commands::{self, CommandInvocation, CommandSender};
use craft_ban::{CraftBanConfig, Data, Error, PLUGIN_NAME, logging};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Main function to run the ban console
async fn async_main() -> Result<(), Error> {
    // Config first: it names the log directory
    let config = CraftBanConfig::load().await?;
    logging::init(&config.log_dir)?;

    let catalog = MaterialCatalog::vanilla().with_extra(&config.materials);
    let data = Data::load(config, Arc::new(catalog)).await?;

    logging::log_console(format!(
        "{PLUGIN_NAME} ready with {} registries, type `quit` to exit",
        data.registries.len()
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().eq_ignore_ascii_case("quit") {
            break;
        }
        let Some(invocation) = CommandInvocation::parse(&line, CommandSender::console()) else {
            continue;
        };
        let reply = commands::dispatch(&data, &invocation).await;
        if reply.is_error() {
            eprintln!("{reply}");
        } else {
            println!("{reply}");
        }
    }

    info!("Shutting down");
    Ok(())
}

fn main() {
    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(Error::from)
        .and_then(|runtime| runtime.block_on(async_main()));

    // Handle any errors that occurred during execution
    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
