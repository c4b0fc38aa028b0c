use bitflags::bitflags;
use tracing::{trace, warn};

pub struct Parser {
    vte: vte::Parser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    Key {
        key: Key,
        mods: Modifier,
        release: bool,
    },
    KittyKeyboardSupported,
    PrimaryDeviceAttributes,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modifier : u16 {
        const Shift = 1;
        const Alt = 1 << 1;
        const Ctrl = 1 << 2;
        const Super = 1 << 3;
        const Hyper = 1 << 4;
        const Meta = 1 << 5;

        // We don't care about these two.
        // const CapsLock = 1 << 6;
        // const NumLock = 1 << 7;
    }
}

struct Performer<'a>(&'a mut Vec<Event>);

impl Parser {
    pub fn new() -> Self {
        Self {
            vte: vte::Parser::new(),
        }
    }

    /// Parses terminal input, appending the recognized events to `events`.
    pub fn advance(&mut self, bytes: &[u8], events: &mut Vec<Event>) {
        self.vte.advance(&mut Performer(events), bytes);
    }
}

impl vte::Perform for Performer<'_> {
    // Plain characters only arrive when the terminal lacks the Kitty keyboard protocol. There
    // are no releases or repeats in that mode, so every character counts as a press.
    fn print(&mut self, c: char) {
        self.0.push(Event::Key {
            key: Key::Char(c),
            mods: Modifier::empty(),
            release: false,
        });
    }

    fn execute(&mut self, byte: u8) {
        // Ctrl+C in raw mode without the Kitty keyboard protocol.
        if byte == 0x03 {
            self.0.push(Event::Key {
                key: Key::Char('c'),
                mods: Modifier::Ctrl,
                release: false,
            });
        }
    }

    fn hook(&mut self, _params: &vte::Params, _intermediates: &[u8], _ignore: bool, _action: char) {
    }

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}

    fn csi_dispatch(
        &mut self,
        params: &vte::Params,
        intermediates: &[u8],
        ignore: bool,
        action: char,
    ) {
        trace!(?params, ?intermediates, ignore, %action, "csi dispatch");

        if ignore {
            return;
        }

        let event = match action {
            'u' => {
                if intermediates == b"?" {
                    Event::KittyKeyboardSupported
                } else if intermediates.is_empty() {
                    // Key event.
                    let mut params = params.iter();
                    let Some(key) = params.next() else {
                        warn!("no unicode-key-code param");
                        return;
                    };

                    // Try to get base-layout-key, fall back to unicode-key-code.
                    let Some(code) = key.get(2).or(key.get(0)) else {
                        warn!("no unicode-key-code argument");
                        return;
                    };
                    let Ok(key) = char::try_from(u32::from(*code)) else {
                        warn!("invalid codepoint {code}");
                        return;
                    };

                    let Some((mods, release)) = parse_mods_release(params.next()) else {
                        return;
                    };

                    Event::Key {
                        key: Key::Char(key),
                        mods,
                        release,
                    }
                } else {
                    return;
                }
            }
            'c' => {
                if intermediates == b"?" {
                    Event::PrimaryDeviceAttributes
                } else {
                    return;
                }
            }
            _ => return,
        };

        self.0.push(event);
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}

    fn terminated(&self) -> bool {
        false
    }
}

fn parse_mods_release(opts: Option<&[u16]>) -> Option<(Modifier, bool)> {
    let mut mods = Modifier::empty();
    let mut release = false;
    if let Some(opts) = opts {
        if let Some(x) = opts.get(0) {
            if *x == 0 {
                warn!("invalid key modifier = 0");
            } else {
                mods = Modifier::from_bits_truncate(x - 1);
            }
        }

        match opts.get(1) {
            // Key repeat.
            Some(2) => return None,
            // Key release.
            Some(3) => release = true,
            // Key press.
            Some(1) | None => (),
            // Unrecognized.
            Some(x) => {
                warn!("unrecognized event type: {x}");
                return None;
            }
        }
    }
    Some((mods, release))
}
