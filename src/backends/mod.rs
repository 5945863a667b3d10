#[cfg(feature = "x11")]
pub mod x11;
pub mod ydotool;

use anyhow::{anyhow, Result};

use crate::sink::{InjectionSink, MouseSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Auto,
    X11,
    Ydotool,
}

fn env_is_set(name: &str) -> bool {
    std::env::var_os(name)
        .map(|v| !v.is_empty())
        .unwrap_or(false)
}

fn auto_backend() -> BackendKind {
    if env_is_set("DISPLAY") && cfg!(feature = "x11") {
        return BackendKind::X11;
    }
    // ydotool works on both Wayland and X11 sessions via its daemon.
    BackendKind::Ydotool
}

pub fn resolve_backend(requested: BackendKind) -> Result<BackendKind> {
    let resolved = match requested {
        BackendKind::Auto => auto_backend(),
        other => other,
    };

    if resolved == BackendKind::X11 && !cfg!(feature = "x11") {
        return Err(anyhow!(
            "X11 backend requested but disabled in this build (rebuild with `--features x11`)"
        ));
    }

    Ok(resolved)
}

/// Build the keyboard sink for the resolved backend. The engine itself
/// never branches on platform; it only sees the trait.
pub fn create_sink(kind: BackendKind) -> Result<Box<dyn InjectionSink + Send>> {
    match resolve_backend(kind)? {
        BackendKind::X11 => {
            #[cfg(feature = "x11")]
            {
                Ok(Box::new(x11::X11Keyboard::connect()?))
            }

            #[cfg(not(feature = "x11"))]
            {
                Err(anyhow!("X11 backend is disabled in this build"))
            }
        }
        BackendKind::Ydotool => Ok(Box::new(ydotool::YdotoolKeyboard::new())),
        BackendKind::Auto => Err(anyhow!("no backend resolved")),
    }
}

/// Build a mouse sink for the resolved backend, with its own connection,
/// independent of the keyboard sink. `None` when the backend has no mouse
/// support; the mouse features are optional everywhere.
pub fn create_mouse(kind: BackendKind) -> Result<Option<Box<dyn MouseSink + Send>>> {
    match resolve_backend(kind)? {
        BackendKind::X11 => {
            #[cfg(feature = "x11")]
            {
                Ok(Some(Box::new(x11::X11Mouse::connect()?)))
            }

            #[cfg(not(feature = "x11"))]
            {
                Err(anyhow!("X11 backend is disabled in this build"))
            }
        }
        BackendKind::Ydotool => Ok(Some(Box::new(ydotool::YdotoolMouse::new()))),
        BackendKind::Auto => Err(anyhow!("no backend resolved")),
    }
}
