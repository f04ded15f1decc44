use clap::Parser;
use wasm_bindgen::prelude::*;

mod game;
mod overlay;
mod scheduler;
mod utils;

#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    #[command(flatten)]
    game: game::GameProps,
}

/// Settings come from the location hash, e.g. `#-v&--difficulty=hard&--seed=42`.
fn parse_args(location_hash: &str) -> Result<Args, clap::Error> {
    Args::try_parse_from(location_hash.split(['#', '&']))
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::{document, window};

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window()
        .location()
        .hash()
        .unwrap_or_else(|_| "".to_string());

    let (args, parse_error) = match parse_args(&location_hash) {
        Ok(args) => (args, None),
        Err(err) => (Args::default(), Some(err)),
    };
    if let Some(log_level) = args.verbose.log_level() {
        console_log::init_with_level(log_level).expect("Error initializing logger");
    }
    if let Some(err) = parse_error {
        log::error!("ignoring settings from location hash: {}", err);
    }
    log::debug!("settings: {:?}", args.game);

    let root = document()
        .get_element_by_id("game")
        .expect("Could not find id=\"game\" element");

    log::debug!("App started");
    yew::Renderer::<game::GameView>::with_root_and_props(root, args.game).render();
}
