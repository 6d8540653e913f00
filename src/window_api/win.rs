use anyhow::Result;
use tracing::instrument;
use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowTextW};

use super::WindowManager;

#[instrument]
pub fn get_active_title() -> String {
    let window = unsafe { GetForegroundWindow() };

    // No focused window, for example while the desktop switches.
    if window.is_invalid() {
        return String::new();
    }

    let mut text: [u16; 4096] = [0; 4096];
    let len = unsafe { GetWindowTextW(window, &mut text) };
    String::from_utf16_lossy(&text[..len.max(0) as usize])
}

pub struct WindowsWindowManager {}

impl WindowsWindowManager {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for WindowsWindowManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowManager for WindowsWindowManager {
    fn active_window_title(&mut self) -> Result<String> {
        Ok(get_active_title())
    }
}
