use std::env;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context as _;
use calloop::generic::Generic;
use calloop::signals::{Signal, Signals};
use calloop::{EventLoop, Interest, PostAction};
use rustix::io::{Errno, retry_on_intr};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

mod app;
mod frame_clock;
mod parser;
mod playfield;
mod settings;
mod utils;

use app::App;
use settings::Settings;
use utils::TerminalGuard;

use crate::parser::Parser;

fn main() -> anyhow::Result<()> {
    init_logging()?;
    info!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    if env::var("RUST_BACKTRACE").is_err() {
        unsafe { env::set_var("RUST_BACKTRACE", "1") };
    }

    // Load settings before touching the terminal so that errors are readable.
    let settings = match env::args_os().nth(1) {
        Some(path) => settings::load(Path::new(&path))?,
        None => Settings::default(),
    };

    let _guard = TerminalGuard::enter()?;

    let mut event_loop: EventLoop<'_, App> = EventLoop::try_new()?;
    let handle = event_loop.handle();

    // Listen for signals.
    let signals = Signals::new(&[
        Signal::SIGINT,
        Signal::SIGTERM,
        Signal::SIGHUP,
        Signal::SIGWINCH,
    ])?;
    // Now signalfd is created, so we won't miss SIGWINCH, and can get the term size.

    let mut app = App::new(&event_loop, settings)?;

    handle.insert_source(signals, |event, _, app| {
        if event.signal() == Signal::SIGWINCH {
            let res = app.resized();
            app.stop_on_error(res);
        } else {
            app.signal_stop();
        }
    })?;

    let mut parser = Parser::new();
    let mut events = Vec::new();
    handle.insert_source(
        Generic::new(rustix::stdio::stdin(), Interest::READ, calloop::Mode::Level),
        move |_readiness, _fd, app| {
            let stdin = rustix::stdio::stdin();
            let mut buf = [0u8; 64];
            match retry_on_intr(|| rustix::io::read(stdin, &mut buf)) {
                // Stdin closed.
                Ok(0) => app.signal_stop(),
                Ok(n) => {
                    parser.advance(&buf[..n], &mut events);
                    for event in events.drain(..) {
                        let res = app.event(event);
                        app.stop_on_error(res);
                    }
                }
                Err(Errno::WOULDBLOCK) => (),
                Err(err) => Err(err)?,
            }
            Ok(PostAction::Continue)
        },
    )?;

    event_loop.run(None, &mut app, |app| {
        if !app.has_error() {
            let res = app.redraw().context("error redrawing");
            app.stop_on_error(res);
        }
    })?;

    app.into_result()
}

/// Sets up logging into the file named by `POPSTRIKE_LOG`.
///
/// The terminal belongs to the game, so without the variable nothing is logged.
fn init_logging() -> anyhow::Result<()> {
    let file_layer = match env::var_os("POPSTRIKE_LOG") {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("error creating log file {path:?}"))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false);
            Some(layer)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(LevelFilter::DEBUG)
        .init();

    Ok(())
}
