// What you SEE (with --verbose):
// • The camera frames the producer writes into shared memory.
// • A cyan spline through the fixed control points (blue rings; the two
//   red-ringed end points only shape the curve).
// • A green ring + crosshair at the latest aim point from the message bus.
//
// The bus here is the in-process `LocalSession`: nothing publishes into it and
// nothing stops it. Until a real bus backs `Session`, the aim point stays at
// (0,0) and the loop runs until the process is killed.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use spline_overlay::display::Drawer;
use spline_overlay::{
    direction_handler, Config, Direction, LocalSession, Overlay, RenderLoop, RunSummary,
    Session, SharedFrameSource, Spline, TargetChannel,
};

fn main() -> ExitCode {
    env_logger::init();
    let config = Config::parse();

    match run(&config) {
        Ok(summary) => {
            log::info!("rendered {} frames", summary.frames);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(unix)]
fn run(config: &Config) -> spline_overlay::Result<RunSummary> {
    use spline_overlay::shm::PosixSharedMemory;

    /* --- Aim point + message bus ---
       The dispatch thread writes the aim point; the loop below reads it. */
    let target = Arc::new(TargetChannel::new());
    let session = LocalSession::new(config.cid);
    session.data_trigger(Direction::ID, direction_handler(Arc::clone(&target)));

    /* --- Shared memory ---
       Fails here, before the loop, if the segment is missing or too small. */
    let memory = PosixSharedMemory::open(config.segment_name());
    let source = SharedFrameSource::new(memory, config.width, config.height)?;

    let mut render_loop = RenderLoop::new(source, target, Overlay::new(Spline::reference()));

    /* --- Optional window --- */
    if config.verbose {
        let title = format!("Spline overlay: {}", config.segment_name());
        let (w, h) = render_loop.source().resolution();
        match Drawer::new(&title, w as usize, h as usize) {
            Ok(drawer) => render_loop = render_loop.with_display(Box::new(drawer)),
            Err(err) => log::warn!("running without display: {err}"),
        }
    }

    Ok(render_loop.run(&session))
}

#[cfg(not(unix))]
fn run(config: &Config) -> spline_overlay::Result<RunSummary> {
    Err(spline_overlay::Error::SharedMemoryUnavailable { name: config.segment_name().to_owned() })
}
