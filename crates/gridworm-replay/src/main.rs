//! Replay a scripted input session and print the resulting canvas as JSON.

use gridworm_core::CanvasConfig;
use gridworm_replay::{ReplayError, ReplayResult, Script, load_config, run};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting Gridworm replay");

    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> ReplayResult<()> {
    let mut args = std::env::args().skip(1);
    let script_path = args
        .next()
        .ok_or_else(|| ReplayError::Usage("gridworm-replay <script.json> [config.json]".into()))?;
    let config = match args.next() {
        Some(path) => load_config(Path::new(&path))?,
        None => CanvasConfig::default(),
    };

    let script = Script::from_path(Path::new(&script_path))?;
    let report = run(script, config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
