use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::warn;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{self, ConnectionExt as _};
use x11rb::protocol::xtest::{self, ConnectionExt as _};
use x11rb::rust_connection::RustConnection;

use crate::keycodes::{
    self, keystroke_for_char, KEY_BACKSPACE, KEY_LEFTALT, KEY_LEFTCTRL, KEY_LEFTMETA,
    KEY_LEFTSHIFT, KEY_RIGHTALT, KEY_RIGHTCTRL, KEY_RIGHTSHIFT,
};
use crate::sink::{InjectionSink, MouseSink};

// On stock Xorg setups, X11 keycodes are evdev + 8.
fn evdev_to_x11_keycode(evdev_keycode: u32) -> Result<u8> {
    let x11 = evdev_keycode
        .checked_add(8)
        .ok_or_else(|| anyhow!("evdev keycode overflow"))?;
    u8::try_from(x11).map_err(|_| anyhow!("evdev keycode {evdev_keycode} out of range for X11"))
}

fn query_xtest(conn: &impl Connection) -> Result<()> {
    let ext = conn
        .extension_information(xtest::X11_EXTENSION_NAME)
        .context("failed to query X11 extension info")?;

    if ext.is_none() {
        return Err(anyhow!(
            "X11 backend requires the XTEST extension (not present on this X server)"
        ));
    }

    let _ = conn
        .xtest_get_version(2, 2)
        .ok()
        .and_then(|cookie| cookie.reply().ok());

    Ok(())
}

fn keysym_for_keycode(conn: &impl Connection, keycode: u8, index: usize) -> Option<xproto::Keysym> {
    let reply = conn.get_keyboard_mapping(keycode, 1).ok()?.reply().ok()?;
    reply.keysyms.get(index).copied()
}

/// Probe a few representative keys and warn if the server keymap does not
/// look like US QWERTY. Injection assumes evdev+8 keycodes with a US map;
/// on a mismatch characters come out wrong, but per the degrade-and-continue
/// policy this is a warning, not a refusal to run.
fn probe_us_keymap(conn: &impl Connection) {
    // For Latin-1, X11 keysyms equal the character code.
    let checks: &[(char, char)] = &[('a', 'A'), ('q', 'Q'), ('1', '!')];

    for (plain, with_shift) in checks {
        let Some(stroke) = keystroke_for_char(*plain) else {
            continue;
        };
        let Ok(keycode) = evdev_to_x11_keycode(stroke.keycode) else {
            continue;
        };
        let got0 = keysym_for_keycode(conn, keycode, 0);
        let got1 = keysym_for_keycode(conn, keycode, 1);
        if got0 != Some(*plain as u32) || got1 != Some(*with_shift as u32) {
            warn!(
                keycode,
                "X server keymap does not look like US QWERTY; injected characters may be wrong (try `setxkbmap us`)"
            );
            return;
        }
    }
}

struct X11Connection {
    conn: RustConnection,
    root: xproto::Window,
}

impl X11Connection {
    fn open() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("failed to connect to X11")?;
        query_xtest(&conn)?;

        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| anyhow!("invalid X11 screen index"))?
            .root;

        Ok(Self { conn, root })
    }

    fn fake_key(&self, keycode: u8, press: bool) -> Result<()> {
        let event_type = if press {
            xproto::KEY_PRESS_EVENT
        } else {
            xproto::KEY_RELEASE_EVENT
        };
        self.conn
            .xtest_fake_input(event_type, keycode, x11rb::CURRENT_TIME, self.root, 0, 0, 0)
            .context("failed to send XTEST fake input")?;
        self.conn.flush().context("failed to flush X11 connection")?;
        Ok(())
    }

    fn fake_button(&self, button: u8, press: bool) -> Result<()> {
        let event_type = if press {
            xproto::BUTTON_PRESS_EVENT
        } else {
            xproto::BUTTON_RELEASE_EVENT
        };
        self.conn
            .xtest_fake_input(event_type, button, x11rb::CURRENT_TIME, self.root, 0, 0, 0)
            .context("failed to send XTEST fake input")?;
        self.conn.flush().context("failed to flush X11 connection")?;
        Ok(())
    }

    fn fake_relative_motion(&self, dx: i16, dy: i16) -> Result<()> {
        // detail != 0 marks the motion event as relative.
        self.conn
            .xtest_fake_input(
                xproto::MOTION_NOTIFY_EVENT,
                1,
                x11rb::CURRENT_TIME,
                self.root,
                dx,
                dy,
                0,
            )
            .context("failed to send XTEST fake motion")?;
        self.conn.flush().context("failed to flush X11 connection")?;
        Ok(())
    }
}

/// XTEST keyboard sink. Shifted strokes get an explicit Shift press and
/// release around them with a short settle on either side, the way a real
/// keyboard driver sees them.
pub struct X11Keyboard {
    x11: X11Connection,
}

impl X11Keyboard {
    pub fn connect() -> Result<Self> {
        let x11 = X11Connection::open()?;
        probe_us_keymap(&x11.conn);
        Ok(Self { x11 })
    }

    fn send_stroke(&self, stroke: keycodes::KeyStroke, hold_ms: u64) -> Result<()> {
        let keycode = evdev_to_x11_keycode(stroke.keycode)?;
        let shift = evdev_to_x11_keycode(KEY_LEFTSHIFT)?;

        if stroke.shift {
            self.x11.fake_key(shift, true)?;
            thread::sleep(Duration::from_millis(5));
        }

        self.x11.fake_key(keycode, true)?;
        thread::sleep(Duration::from_millis(hold_ms));
        self.x11.fake_key(keycode, false)?;

        if stroke.shift {
            thread::sleep(Duration::from_millis(5));
            self.x11.fake_key(shift, false)?;
        }

        Ok(())
    }
}

impl InjectionSink for X11Keyboard {
    fn type_character(&mut self, c: char, hold_ms: u64) {
        let Some(stroke) = keystroke_for_char(c) else {
            // `supports` filters these out; anything slipping through is
            // dropped like any other injection failure.
            warn!(?c, "no keystroke mapping for character");
            return;
        };
        if let Err(err) = self.send_stroke(stroke, hold_ms) {
            warn!(?c, "failed to inject key event: {err:#}");
        }
    }

    fn press_backspace(&mut self) {
        let stroke = keycodes::KeyStroke {
            keycode: KEY_BACKSPACE,
            shift: false,
        };
        if let Err(err) = self.send_stroke(stroke, 10) {
            warn!("failed to inject backspace: {err:#}");
        }
    }

    fn release_all_keys(&mut self) {
        // Best-effort: releases may be sent for keys that are not down.
        for keycode in [
            KEY_LEFTSHIFT,
            KEY_RIGHTSHIFT,
            KEY_LEFTCTRL,
            KEY_RIGHTCTRL,
            KEY_LEFTALT,
            KEY_RIGHTALT,
            KEY_LEFTMETA,
        ] {
            if let Ok(code) = evdev_to_x11_keycode(keycode) {
                let _ = self.x11.fake_key(code, false);
            }
        }
    }

    fn supports(&self, c: char) -> bool {
        keystroke_for_char(c).is_some()
    }
}

/// XTEST mouse sink, on its own display connection.
pub struct X11Mouse {
    x11: X11Connection,
}

impl X11Mouse {
    pub fn connect() -> Result<Self> {
        Ok(Self {
            x11: X11Connection::open()?,
        })
    }
}

const BUTTON_SCROLL_UP: u8 = 4;
const BUTTON_SCROLL_DOWN: u8 = 5;

impl MouseSink for X11Mouse {
    fn move_relative(&mut self, dx: i32, dy: i32) {
        let dx = dx.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        let dy = dy.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        if let Err(err) = self.x11.fake_relative_motion(dx, dy) {
            warn!("failed to move mouse: {err:#}");
        }
    }

    fn scroll(&mut self, amount: i32) {
        let button = if amount > 0 {
            BUTTON_SCROLL_DOWN
        } else {
            BUTTON_SCROLL_UP
        };

        for _ in 0..amount.unsigned_abs() {
            let result = self
                .x11
                .fake_button(button, true)
                .and_then(|()| self.x11.fake_button(button, false));
            if let Err(err) = result {
                warn!("failed to scroll: {err:#}");
                return;
            }
        }
    }
}
