use std::cmp::max;
use std::io::{self, Write};

use anyhow::Context as _;
use calloop::{EventLoop, LoopHandle, LoopSignal};
use popstrike_core::simulation::Simulation;
use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};
use rustix::termios::{self, Winsize};
use tracing::{debug, info, warn};

use crate::frame_clock::FrameClock;
use crate::parser::{Event, Key, Modifier};
use crate::playfield::Playfield;
use crate::settings::Settings;

const QUIT_KEY: char = 'q';

/// Returns `true` for keys that can't be used as lane keys.
pub fn is_reserved_key(key: char) -> bool {
    matches!(key, QUIT_KEY | '\x1B' | '1'..='9')
}

pub struct App {
    _loop_handle: LoopHandle<'static, Self>,
    stop_signal: LoopSignal,
    error: Option<anyhow::Error>,

    // Pre-init.
    got_kitty_keyboard_support: bool,
    started: bool,

    size: Winsize,
    got_sync: bool,
    need_full_redraw: bool,

    frame_clock: FrameClock,
    simulation: Simulation<StdRng>,
    playfield: Playfield,
}

impl App {
    pub fn new(event_loop: &EventLoop<'static, Self>, settings: Settings) -> anyhow::Result<Self> {
        let size = termios::tcgetwinsize(rustix::stdio::stdout())?;

        let seed = settings.seed.unwrap_or_else(|| rand::rng().random());
        info!(seed, "starting");
        let simulation = Simulation::new(settings.game, StdRng::seed_from_u64(seed))
            .context("invalid game settings")?;

        Ok(Self {
            _loop_handle: event_loop.handle(),
            stop_signal: event_loop.get_signal(),
            error: None,
            got_kitty_keyboard_support: false,
            started: false,
            size,
            got_sync: false,
            need_full_redraw: true,
            frame_clock: FrameClock::new(),
            playfield: Playfield::new(settings.game, size),
            simulation,
        })
    }

    pub fn signal_stop(&self) {
        self.stop_signal.stop();
    }

    pub fn stop_on_error(&mut self, result: anyhow::Result<()>) {
        if let Err(err) = result {
            self.error = Some(err);
            self.signal_stop();
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_result(self) -> anyhow::Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn resized(&mut self) -> anyhow::Result<()> {
        let size = termios::tcgetwinsize(rustix::stdio::stdout())?;
        if self.size == size {
            return Ok(());
        }
        self.size = size;
        self.need_full_redraw = true;

        debug!(rows = size.ws_row, cols = size.ws_col, "resized");
        self.playfield.resize(size);

        Ok(())
    }

    pub fn event(&mut self, event: Event) -> anyhow::Result<()> {
        match event {
            Event::Key { key, mods, release } => {
                // Strikes fire on press, releases don't matter.
                if !release {
                    self.key(key, mods);
                }
            }
            Event::KittyKeyboardSupported => self.got_kitty_keyboard_support = true,
            Event::PrimaryDeviceAttributes => {
                if !self.started {
                    // This finishes initialization, we can do our first render.
                    self.started = true;
                    if !self.got_kitty_keyboard_support {
                        warn!("no Kitty keyboard protocol support, falling back to plain input");
                    }
                }

                self.got_sync = true;
            }
        }

        Ok(())
    }

    fn key(&mut self, key: Key, mods: Modifier) {
        let Key::Char(c) = key;
        match c {
            QUIT_KEY | '\x1B' => self.signal_stop(),
            'c' if mods == Modifier::Ctrl => self.signal_stop(),
            '1'..='9' => self.simulation.set_speed_tier(c as u8 - b'0'),
            _ => {
                if let Some(lane) = self.simulation.lane_for_key(c) {
                    self.simulation.key_press(lane);
                }
            }
        }
    }

    pub fn redraw(&mut self) -> io::Result<()> {
        if !self.got_sync {
            return Ok(());
        }

        let dt = self.frame_clock.frame().as_secs_f32();
        self.simulation.tick(dt);
        self.playfield.advance(dt);
        for event in self.simulation.drain_events() {
            self.playfield.event(&event);
        }

        let stdout = io::stdout();
        let mut stdout = stdout.lock();

        // Start synchronized update.
        stdout.write_all(b"\x1B[?2026h")?;

        if self.need_full_redraw {
            // Erase all.
            stdout.write_all(b"\x1B[2J")?;
            self.draw_binds(&mut stdout)?;
        }

        self.playfield.draw(&mut stdout, &self.simulation)?;

        self.draw_speed(&mut stdout)?;
        self.draw_fps(&mut stdout)?;

        // End synchronized update.
        stdout.write_all(b"\x1B[?2026l")?;

        self.request_sync(&mut stdout)?;
        stdout.flush()?;

        self.need_full_redraw = false;

        Ok(())
    }

    fn draw_binds(&self, stdout: &mut io::StdoutLock) -> io::Result<()> {
        let y = max(4, self.size.ws_row) - 3;
        write!(stdout, "\x1B[{y};0H")?;

        let [left, right] = self.simulation.config().lane_keys;
        write!(stdout, "{left}/{right} strike\x1B[E")?;
        write!(stdout, "1-9 speed\x1B[E")?;
        write!(stdout, "q   quit\x1B[E")?;

        Ok(())
    }

    fn draw_speed(&self, stdout: &mut io::StdoutLock) -> io::Result<()> {
        let speed = self.simulation.speed();
        write!(
            stdout,
            "\x1B[2;0HSpeed: {} (×{:.2})",
            speed.tier(),
            speed.fall_speed_multiplier()
        )
    }

    fn draw_fps(&self, stdout: &mut io::StdoutLock) -> io::Result<()> {
        if let Some(fps) = self.frame_clock.fps() {
            write!(stdout, "\x1B[HFPS: {fps:>5.0}")?;
        }

        Ok(())
    }

    // In order to avoid filling up the terminal buffer with several rendered
    // frames faster than it can read them, we request the primary device
    // attributes at the end of each frame, and don't render new frames until we
    // get a response.
    fn request_sync(&mut self, stdout: &mut io::StdoutLock) -> io::Result<()> {
        stdout.write_all(b"\x1B[c")?;
        self.got_sync = false;
        Ok(())
    }
}
