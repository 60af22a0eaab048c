//! Synthetic snapshot producer.
//!
//! Drives the snapshot writer without a camera or detector so a consumer
//! process can be developed against live-updating files. Writes one payload
//! per interval with an empty subject list and a moving timestamp.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rehab_tracker::record::{ImageSize, LogRecord, SnapshotPayload};
use rehab_tracker::{now_epoch_s_f64, SnapshotWriter, WriteStrategy};

#[derive(Parser, Debug)]
#[command(name = "writer_demo", about = "Synthetic snapshot producer")]
struct Args {
    /// Directory for latest.json / log.jsonl.
    #[arg(long, default_value = "./outputs")]
    output_dir: PathBuf,

    /// Milliseconds between writes.
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Number of writes; 0 runs until Ctrl-C.
    #[arg(long, default_value_t = 0)]
    count: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let writer = SnapshotWriter::new(
        args.output_dir.join("latest.json"),
        args.output_dir.join("log.jsonl"),
        WriteStrategy::platform_default(),
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))?;

    let mut written = 0u64;
    while !shutdown.load(Ordering::Relaxed) {
        let payload = SnapshotPayload {
            timestamp: now_epoch_s_f64()?,
            exercise: "demo".to_string(),
            side: "right".to_string(),
            image_size: ImageSize { w: 1280, h: 720 },
            subjects: Vec::new(),
        };
        writer.write_latest(&payload)?;
        writer.append_log(&LogRecord::new(payload))?;
        written += 1;
        log::info!("saved snapshot #{}", written);

        if args.count != 0 && written >= args.count {
            break;
        }
        std::thread::sleep(Duration::from_millis(args.interval_ms));
    }

    log::info!("writer_demo done: {} snapshots", written);
    Ok(())
}
