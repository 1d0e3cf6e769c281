// Entry point for the Minesweeper TUI application
// Validates the fixed configuration, sets up the terminal and runs the session loop

use std::error::Error;
use std::process::ExitCode;

use log::error;
use tswpr::tsw_color::Palette;
use tswpr::tsw_config::Config;
use tswpr::tsw_lang::Lang;
use tswpr::tsw_log::init_logging;
use tswpr::tsw_session::Session;
use tswpr::tsw_ui::{TermGuard, TermInput, TermRenderer};

fn main() -> Result<ExitCode, Box<dyn Error>> {
    init_logging();

    let cfg = Config::default();
    let mut session = match Session::new(cfg.clone(), rand::thread_rng()) {
        Ok(session) => session,
        Err(e) => {
            error!("invalid configuration: {e}");
            eprintln!("tswpr: invalid configuration: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    // Detect colours and language before the alternate screen takes over stdout
    let palette = Palette::detect();
    let lang = Lang::detect();

    let _guard = TermGuard::enter()?;
    let mut renderer = TermRenderer::new(cfg, lang, palette)?;
    let mut input = TermInput::new()?;
    session.run(&mut renderer, &mut input)?;
    Ok(ExitCode::SUCCESS)
}
