//! Thread Diagnostics - demonstration driver
//!
//! # Execution Flow
//!
//! 1. Load `Diagnostics.yaml` from the working directory (defaults if absent)
//! 2. Initialize internal logging → `<data folder>/logs/thread-diagnostics.<date>`
//! 3. Start the diagnostics service on the main thread (sweeps expired runs,
//!    creates `Diagnostics-<H>h<M>m<S>s`)
//! 4. Listen for change notifications on a tokio task
//! 5. Log from the main thread and a few named worker threads
//! 6. Release the service and shut the runtime down

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use thread_diagnostics::logging::{LoggingOptions, setup_logging};
use thread_diagnostics::services::folder::user_data_folder_path;
use thread_diagnostics::{APP_NAME, ConfigManager, Diagnostics, DiagnosticsChange, LogColor, VERSION};

const WORKER_COUNT: usize = 3;

fn main() -> Result<()> {
    let config_manager = ConfigManager::new(".")?;
    let config = config_manager.load_config()?;

    let log_dir = user_data_folder_path(&config)?.join("logs");
    let _guard = setup_logging(LoggingOptions {
        log_dir: &log_dir,
        log_prefix: APP_NAME,
        debug_mode: false,
        console_output: false,
    })?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(1)
        .thread_name("diagnostics-listener")
        .build()?;

    let diagnostics = Arc::new(Diagnostics::init(config)?);

    let mut changes = diagnostics.subscribe();
    let listener = runtime.spawn(async move {
        while let Ok(DiagnosticsChange::DataChanged { thread_id, name }) = changes.recv().await {
            tracing::info!("New diagnostics sink: {} (thread {})", name, thread_id);
        }
    });

    diagnostics.log_args("{0} v{1} started", &[&APP_NAME, &VERSION])?;
    diagnostics.log_with_color(
        &format!("Diagnostics folder: {}", diagnostics.folder_path()),
        LogColor::Cyan,
    )?;

    let workers: Vec<_> = (0..WORKER_COUNT)
        .map(|index| {
            let diagnostics = Arc::clone(&diagnostics);
            std::thread::Builder::new()
                .name("Worker".to_string())
                .spawn(move || -> Result<()> {
                    for step in 0..5 {
                        diagnostics.log_args("Worker {0} step {1}", &[&index, &step])?;
                        std::thread::sleep(Duration::from_millis(10));
                    }
                    Ok(())
                })
        })
        .collect::<std::io::Result<_>>()?;

    for worker in workers {
        match worker.join() {
            Ok(result) => result?,
            Err(_) => diagnostics.log_error("A worker thread panicked")?,
        }
    }

    for summary in diagnostics.data() {
        diagnostics.log_args(
            "{0}: {1} lines",
            &[&summary.name, &summary.line_count],
        )?;
    }

    diagnostics.release()?;

    // Dropping the last handle closes the channel and ends the listener
    drop(diagnostics);
    runtime.block_on(async {
        let _ = tokio::time::timeout(Duration::from_secs(1), listener).await;
    });
    runtime.shutdown_timeout(Duration::from_secs(5));

    tracing::info!("Shutdown complete");
    Ok(())
}
