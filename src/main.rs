use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Context;
use bytes::Bytes;
use lumadl::{FetchError, FetchRequest, Session};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const FIRMWARE_URL: &str = "https://files.wank.party/luma_latest.firm";
/// Relative to the root of the removable storage the program is started from.
const FIRMWARE_PATH: &str = "boot.firm";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "lumadl=info".into()),
        )
        .init();

    let request = FetchRequest::new(FIRMWARE_URL)?;

    let session = Session::init();
    let result = session.fetcher().fetch(&request).await;
    drop(session);

    match result {
        Ok(response) => {
            store_firmware(Path::new(FIRMWARE_PATH), &response.body);
        }
        Err(err) => report(&err),
    }

    println!("Press Enter to exit...");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    Ok(())
}

/// Writes the firmware and logs the outcome; a failed write never stops the program.
fn store_firmware(path: &Path, body: &Bytes) -> bool {
    info!("Writing {}", path.display());
    match write_firmware(path, body) {
        Ok(()) => {
            info!("Done!");
            true
        }
        Err(err) => {
            error!("{err:#}");
            false
        }
    }
}

fn write_firmware(path: &Path, body: &Bytes) -> anyhow::Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Unable to open {}", path.display()))?;
    file.write_all(body)
        .with_context(|| format!("Unable to write {}", path.display()))?;
    Ok(())
}

fn report(err: &FetchError) {
    match (err.diagnostic_code(), err.transport_code()) {
        (Some(code), _) | (None, Some(code)) => error!("{err}: {code:08X}"),
        (None, None) => error!("{err}"),
    }
}
