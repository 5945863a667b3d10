use std::process::Command;
use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::keycodes::{
    KEY_BACKSPACE, KEY_ENTER, KEY_LEFTALT, KEY_LEFTCTRL, KEY_LEFTMETA, KEY_LEFTSHIFT,
    KEY_RIGHTALT, KEY_RIGHTCTRL, KEY_RIGHTSHIFT, KEY_TAB,
};
use crate::sink::{InjectionSink, MouseSink};

const YDOTOOL: &str = "ydotool";

fn run_ydotool(args: &[String]) {
    match Command::new(YDOTOOL).args(args).status() {
        Ok(status) if status.success() => {}
        Ok(status) => warn!(?args, "ydotool exited with {status}"),
        Err(err) => warn!(?args, "failed to run ydotool: {err}"),
    }
}

fn key_event(keycode: u32, press: bool) -> String {
    format!("{keycode}:{}", if press { 1 } else { 0 })
}

/// Keyboard sink that shells out to the external `ydotool` helper, which
/// injects uinput events through its daemon and therefore works on both
/// X11 and Wayland sessions. Text goes through `ydotool type`, which
/// handles arbitrary Unicode; Enter/Tab/Backspace are sent as held key
/// events so the hold time is honored.
pub struct YdotoolKeyboard;

impl YdotoolKeyboard {
    pub fn new() -> Self {
        Self
    }

    fn held_key(&self, keycode: u32, hold_ms: u64) {
        run_ydotool(&["key".to_string(), key_event(keycode, true)]);
        thread::sleep(Duration::from_millis(hold_ms));
        run_ydotool(&["key".to_string(), key_event(keycode, false)]);
    }
}

impl Default for YdotoolKeyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl InjectionSink for YdotoolKeyboard {
    fn type_character(&mut self, c: char, hold_ms: u64) {
        match c {
            '\n' => self.held_key(KEY_ENTER, hold_ms),
            '\t' => self.held_key(KEY_TAB, hold_ms),
            _ => {
                run_ydotool(&["type".to_string(), "--".to_string(), c.to_string()]);
                thread::sleep(Duration::from_millis(hold_ms));
            }
        }
    }

    fn press_backspace(&mut self) {
        self.held_key(KEY_BACKSPACE, 10);
    }

    fn release_all_keys(&mut self) {
        for keycode in [
            KEY_ENTER,
            KEY_LEFTSHIFT,
            KEY_RIGHTSHIFT,
            KEY_LEFTCTRL,
            KEY_RIGHTCTRL,
            KEY_LEFTALT,
            KEY_RIGHTALT,
            KEY_LEFTMETA,
        ] {
            run_ydotool(&["key".to_string(), key_event(keycode, false)]);
        }
    }
}

pub struct YdotoolMouse;

impl YdotoolMouse {
    pub fn new() -> Self {
        Self
    }
}

impl Default for YdotoolMouse {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseSink for YdotoolMouse {
    fn move_relative(&mut self, dx: i32, dy: i32) {
        run_ydotool(&[
            "mousemove".to_string(),
            "-x".to_string(),
            dx.to_string(),
            "-y".to_string(),
            dy.to_string(),
        ]);
    }

    fn scroll(&mut self, amount: i32) {
        // Wheel units: positive is up in uinput terms, so flip to keep
        // positive-scrolls-down.
        run_ydotool(&[
            "mousemove".to_string(),
            "--wheel".to_string(),
            "-x".to_string(),
            "0".to_string(),
            "-y".to_string(),
            (-amount).to_string(),
        ]);
    }
}
