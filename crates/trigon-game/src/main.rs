use anyhow::Result;
use trigon_engine::logging::{init_logging, LoggingConfig};
use trigon_engine::{Game, InitError};

const GAME_NAME: &str = "Trigon: Hello Triangle";

fn main() {
    init_logging(LoggingConfig::default());

    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            if let Some(msg) = err.downcast_ref::<InitError>().and_then(InitError::user_message) {
                eprintln!("{msg}");
            }
            log::error!("{err:#}");
            1
        }
    };

    std::process::exit(code);
}

/// Everything the game owns is dropped before `main` exits the process.
fn run() -> Result<i32> {
    let mut game = Game::new(GAME_NAME);
    game.initialize()?;

    if let Some(renderer) = game.renderer() {
        let device = renderer.device();
        log::info!(
            "rendering on `{}` (driver `{}`, feature level `{}`)",
            device.adapter_info().name,
            device.driver_type(),
            device.feature_level()
        );
    }

    game.run()
}
