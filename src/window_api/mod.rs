//! Contains logic for reading the focused window from different environments.
//! [GenericWindowManager] is the main artifact of this module that abstracts
//! the operations.

#[cfg(feature = "win")]
pub mod win;
#[cfg(feature = "x11")]
pub mod x11;

#[cfg(feature = "win")]
extern crate windows;

#[cfg(feature = "x11")]
extern crate xcb;

use anyhow::Result;
use tracing::error;

/// Intended to serve as a contract windows and linux systems must implement.
#[cfg_attr(test, mockall::automock)]
pub trait WindowManager {
    /// Title of the focused window. For example 'bash in hello' or 'Vibing in YouTube - Brave'.
    /// Returns an empty string when nothing has focus.
    fn active_window_title(&mut self) -> Result<String>;
}

/// Serves as a cross-compatible WindowManager implementation.
pub struct GenericWindowManager {
    inner: Box<dyn WindowManager>,
}

impl GenericWindowManager {
    pub fn new() -> Result<Self> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "win")] {
                use win::WindowsWindowManager;
                Ok(Self {
                    inner: Box::new(WindowsWindowManager::new()),
                })
            }
            else if #[cfg(feature = "x11")] {
                use x11::LinuxWindowManager;
                Ok(Self {
                    inner: Box::new(LinuxWindowManager::new()?),
                })
            }
            else {
                Err(anyhow::anyhow!(
                    "No window manager was compiled in. Rebuild with the `x11` or `win` feature"
                ))
            }
        }
    }
}

impl WindowManager for GenericWindowManager {
    fn active_window_title(&mut self) -> Result<String> {
        self.inner.active_window_title()
    }
}

/// Best-effort title query. Failures are logged and reported as an empty title.
pub fn read_active_title(manager: &mut dyn WindowManager) -> String {
    manager
        .active_window_title()
        .inspect_err(|e| error!("Failed to read active window {e:?}"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::{read_active_title, MockWindowManager};

    #[test]
    fn test_failures_become_empty_title() {
        let mut manager = MockWindowManager::new();
        manager
            .expect_active_window_title()
            .returning(|| Err(anyhow!("display is gone")));
        assert_eq!(read_active_title(&mut manager), "");
    }

    #[test]
    fn test_title_is_passed_through() {
        let mut manager = MockWindowManager::new();
        manager
            .expect_active_window_title()
            .returning(|| Ok("Inbox - Brave".into()));
        assert_eq!(read_active_title(&mut manager), "Inbox - Brave");
    }
}
