//! My Laptop Specs Viewer
//!
//! Interactive terminal viewer for this machine's hardware and OS facts:
//! - a one-screen summary of every category
//! - per-category detail views (CPU, memory, disks, graphics, battery, network)

mod error;
mod format;
mod hardware;
mod menu;
mod render;
mod report;
mod settings;
#[cfg(test)]
mod testing;

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::*;
use tracing_subscriber::EnvFilter;

use crate::hardware::HostProbe;
use crate::menu::{ConsoleTerminal, Navigator};
use crate::settings::Settings;

#[cfg(target_os = "windows")]
use windows_sys::Win32::Foundation::INVALID_HANDLE_VALUE;
#[cfg(target_os = "windows")]
use windows_sys::Win32::System::Console::{
    GetConsoleMode, GetStdHandle, SetConsoleCP, SetConsoleMode, SetConsoleOutputCP,
    ENABLE_PROCESSED_OUTPUT, ENABLE_VIRTUAL_TERMINAL_PROCESSING, ENABLE_WRAP_AT_EOL_OUTPUT,
    STD_ERROR_HANDLE, STD_HANDLE, STD_OUTPUT_HANDLE,
};

/// My Laptop Specs Viewer - browse your system specifications
#[derive(Parser)]
#[command(name = "laptop-specs")]
#[command(version)]
#[command(about = "Browse this machine's hardware and OS specifications")]
struct Cli {}

/// The banner and the tables need UTF-8 box-drawing characters, and every
/// view is colored. A console that refuses VT processing on stdout gets plain
/// text instead of raw escape codes.
#[cfg(target_os = "windows")]
fn init_windows_console() {
    // SAFETY: plain Win32 calls on the process's own standard handles.
    unsafe {
        let _ = SetConsoleOutputCP(65001);
        let _ = SetConsoleCP(65001);
    }

    if !enable_virtual_terminal(STD_OUTPUT_HANDLE) {
        colored::control::set_override(false);
    }
    let _ = enable_virtual_terminal(STD_ERROR_HANDLE);
}

/// False when the handle is redirected or the console rejects the mode.
#[cfg(target_os = "windows")]
fn enable_virtual_terminal(handle_id: STD_HANDLE) -> bool {
    // SAFETY: the handle comes from GetStdHandle and is checked before use.
    unsafe {
        let handle = GetStdHandle(handle_id);
        if handle.is_null() || handle == INVALID_HANDLE_VALUE {
            return false;
        }

        let mut mode: u32 = 0;
        if GetConsoleMode(handle, &mut mode) == 0 {
            return false;
        }

        let wanted = mode
            | ENABLE_PROCESSED_OUTPUT
            | ENABLE_WRAP_AT_EOL_OUTPUT
            | ENABLE_VIRTUAL_TERMINAL_PROCESSING;
        SetConsoleMode(handle, wanted) != 0
    }
}

/// Diagnostics go to stderr. The default filter only lets through real
/// fallbacks, so a normal session prints nothing between the menu screens.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    #[cfg(target_os = "windows")]
    init_windows_console();

    let _cli = Cli::parse();
    init_tracing();

    let rt = tokio::runtime::Runtime::new()?;
    let settings = Settings::default();
    let terminal = ConsoleTerminal::new(settings.theme);
    let mut navigator = Navigator::new(Arc::new(HostProbe), &rt, terminal, settings);

    if let Err(err) = navigator.run() {
        tracing::debug!(error = ?err, "session failed");
        eprintln!("{} {}", err.context_label().red(), err);
        std::process::exit(1);
    }

    Ok(())
}
