use anyhow::Context;

use crate::{abs::App, scene::CubeScene, settings::Settings};

mod abs;
mod cube;
mod error;
mod lifecycle;
mod logging;
mod other;
mod scene;
mod settings;
mod transform;

fn main() -> anyhow::Result<()> {
    logging::init_logging().context("failed to initialize logging")?;

    let settings = Settings::load().context("failed to load settings")?;
    log::debug!("{settings:?}");

    let mut app = App::new(
        &settings.title,
        settings.width,
        settings.height,
        settings.fullscreen,
    )
    .context("failed to open window")?;

    let (width, height) = app.window.drawable_size();
    let mut scene = CubeScene::new(settings, width, height);
    app.run(&mut scene).context("render loop failed")?;

    log::info!("exited in state {:?}", scene.state());
    Ok(())
}
