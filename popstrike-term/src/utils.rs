use std::io::{self, Write as _};
use std::panic;

use anyhow::{Context as _, ensure};
use rustix::termios::{self, Termios};

/// Enable alternate screen buffer, hide cursor.
const ENTER_SCREEN: &[u8] = b"\x1B[?1049h\x1B[?25l";
/// Pop Kitty keyboard flags, disable alternate screen buffer, show cursor.
///
/// The pop must come before leaving the alternate screen since main and alternate screens keep
/// separate flag stacks.
const LEAVE_SCREEN: &[u8] = b"\x1B[<u\x1B[?1049l\x1B[?25h";

/// Puts the terminal back the way it was on drop.
pub struct TerminalGuard(Termios);

impl TerminalGuard {
    /// Switches the terminal to raw mode and the alternate screen.
    ///
    /// The original mode is restored when the guard is dropped and when a panic occurs.
    pub fn enter() -> anyhow::Result<Self> {
        let fd = rustix::stdio::stdout();
        ensure!(termios::isatty(fd), "stdout is not a terminal");

        let mut ios = termios::tcgetattr(fd).context("error getting terminal mode")?;
        let guard = TerminalGuard(ios.clone());
        restore_on_panic(ios.clone());

        ios.make_raw();
        termios::tcsetattr(fd, termios::OptionalActions::Now, &ios)
            .context("error entering raw mode")?;

        let stdout = io::stdout();
        let mut stdout = stdout.lock();
        stdout.write_all(ENTER_SCREEN)?;
        // Request Kitty keyboard protocol progressive enhancement status, then primary device
        // attributes. Terminals without the protocol answer only the latter.
        stdout.write_all(b"\x1B[?u\x1B[c")?;
        // Push Kitty keyboard flags: disambiguate escape codes, report event types, report
        // alternate keys, report all keys as escape codes.
        stdout.write_all(b"\x1B[>15u")?;
        stdout.flush()?;

        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore(&self.0);
    }
}

fn restore(ios: &Termios) {
    let fd = rustix::stdio::stdout();
    if let Err(err) = termios::tcsetattr(fd, termios::OptionalActions::Now, ios) {
        eprintln!("error restoring terminal mode: {err:?}");
    };

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    let _ = stdout.write_all(LEAVE_SCREEN);
    let _ = stdout.flush();
}

fn restore_on_panic(ios: Termios) {
    let hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Restore before running the default hook so the message is readable.
        restore(&ios);

        hook(info);
    }));
}
