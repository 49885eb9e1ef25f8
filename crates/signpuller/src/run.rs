use std::{
    fs::File,
    io::{self, Read},
    path::PathBuf,
};

use shop_capture::{BlockPos, CaptureConfig, CaptureEvent, LineContext, LineIngestor, ShopCapture};
use tokio::{runtime::Handle, sync::mpsc::unbounded_channel};
use tracing::{info, warn};

use crate::{sidebar_file::SidebarFile, CliError};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Capture config (TOML). Defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Chat transcript to read instead of stdin.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Observer block position as `x,y,z`.
    #[arg(long, default_value = "0,0,0", allow_hyphen_values = true)]
    pub pos: BlockPos,

    /// Sidebar snapshot (TOML), re-read for every finalized shop.
    #[arg(long)]
    pub sidebar: Option<PathBuf>,

    /// Print events as JSON lines instead of chat text.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: Args) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => CaptureConfig::load(path)?,
        None => CaptureConfig::default(),
    };
    crate::init_tracing(&config.log_level)?;

    let input: Box<dyn Read + Send> = match &args.input {
        Some(path) => Box::new(File::open(path).map_err(|source| CliError::Input {
            path: path.clone(),
            source,
        })?),
        None => Box::new(io::stdin()),
    };

    info!(log = %config.log_path().display(), threshold = config.threshold, "starting capture");
    let (tx, mut rx) = unbounded_channel();
    let capture = ShopCapture::new(&config, SidebarFile::new(args.sidebar), tx)
        .with_runtime(Handle::current());

    let max_line_bytes = config.max_line_bytes;
    let pos = args.pos;
    let feeder = tokio::task::spawn_blocking(move || feed(capture, input, max_line_bytes, pos));

    // Closes once the feeder and every in-flight analysis have dropped their senders.
    while let Some(event) = rx.recv().await {
        print_event(&event, args.json)?;
    }

    let persisted = feeder.await.map_err(|err| CliError::Join(err.to_string()))?;
    info!(persisted, "capture finished");
    Ok(())
}

/// Feeds every line into `capture` and flushes the open record at the end.
/// Returns how many shops were persisted.
fn feed(capture: ShopCapture, input: impl Read, max_line_bytes: usize, pos: BlockPos) -> usize {
    let mut persisted = 0;
    for record in LineIngestor::new(input, max_line_bytes) {
        match record.outcome {
            Ok(line) => {
                if capture.on_chat_line(&line, &LineContext::now(pos)).is_some() {
                    persisted += 1;
                }
            }
            Err(err) => warn!(line_number = record.line_number, error = %err, "skipping chat line"),
        }
    }
    if capture.finish().is_some() {
        persisted += 1;
    }
    persisted
}

fn print_event(event: &CaptureEvent, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string(event)?);
    } else {
        for line in event.render_lines() {
            println!("{line}");
        }
    }
    Ok(())
}
