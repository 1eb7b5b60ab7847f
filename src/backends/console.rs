// src/backends/console.rs

use crate::backends::{
    ClearStrategy, DriverEvent, Driver, ScreenClear, DEFAULT_WINDOW_HEIGHT_CHARS,
    DEFAULT_WINDOW_WIDTH_CHARS,
};
use crate::frame::FrameGrid;
use crate::projection::Viewport;

use anyhow::{Context, Result};
use libc::{winsize, STDIN_FILENO, STDOUT_FILENO, TIOCGWINSZ};
use std::io::{self, stdin, stdout, Read, Stdout, Write};
use std::mem;
use std::os::unix::io::RawFd;
use termios::{tcsetattr, Termios, ECHO, ICANON, ISIG, TCSANOW, VMIN, VTIME};

use log::{debug, error, info, trace, warn};

const CURSOR_HIDE: &str = "\x1b[?25l";
const CURSOR_SHOW: &str = "\x1b[?25h";
const CLEAR_SCREEN_AND_HOME: &str = "\x1b[2J\x1b[H";
const ROW_SEPARATOR: &[u8] = b"\r\n";

const KEY_CTRL_C: u8 = 0x03;
const KEY_CTRL_D: u8 = 0x04;
const KEY_ESCAPE: u8 = 0x1b;

/// Renders frames to a character terminal using plain ASCII and a handful of
/// escape sequences.
///
/// When attached to a real TTY the driver switches stdin to raw,
/// non-blocking mode so single key presses (`q`, `Esc`, Ctrl-C) can stop the
/// animation between frames, and follows the terminal size. The original
/// terminal attributes are restored on cleanup or drop.
pub struct ConsoleDriver<W: Write = Stdout> {
    out: W,
    clearer: Box<dyn ScreenClear>,
    original_termios: Option<Termios>,
    owns_terminal: bool,
    fixed_columns: Option<u16>,
    fixed_rows: Option<u16>,
    viewport: Viewport,
    needs_full_clear: bool,
    frame_buffer: Vec<u8>,
    input_buffer: [u8; 64],
    cleaned_up: bool,
}

impl ConsoleDriver<Stdout> {
    /// Attaches to the process's terminal.
    ///
    /// `columns`/`rows` pin the viewport; `None` follows the terminal size.
    pub fn new(clear: ClearStrategy, columns: Option<u16>, rows: Option<u16>) -> Result<Self> {
        info!("Creating new ConsoleDriver with {:?} clearing.", clear);
        let original_termios = match Termios::from_fd(STDIN_FILENO) {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!(
                    "Failed to get initial termios: {}. Proceeding without raw mode.",
                    e
                );
                None
            }
        };

        if let Some(ref ots) = original_termios {
            let mut raw_termios = *ots;
            raw_termios.c_lflag &= !(ECHO | ICANON | ISIG);
            raw_termios.c_iflag &=
                !(libc::IXON | libc::IXOFF | libc::ICRNL | libc::INLCR | libc::IGNCR);
            raw_termios.c_oflag &= !libc::OPOST;
            raw_termios.c_cc[VMIN] = 0;
            raw_termios.c_cc[VTIME] = 0;
            tcsetattr(STDIN_FILENO, TCSANOW, &raw_termios)
                .context("ConsoleDriver: Failed to set raw terminal attributes")?;
            debug!("ConsoleDriver: Terminal set to raw mode.");
        }

        let mut out = stdout();
        hide_cursor_or_restore(&mut out, original_termios, |ots| {
            tcsetattr(STDIN_FILENO, TCSANOW, &ots)
                .context("ConsoleDriver: Failed to restore original terminal attributes")
        })?;

        let terminal_size = query_terminal_size().unwrap_or_else(|e| {
            warn!(
                "ConsoleDriver: Failed to get terminal size: {}. Using {}x{}.",
                e, DEFAULT_WINDOW_WIDTH_CHARS, DEFAULT_WINDOW_HEIGHT_CHARS
            );
            (DEFAULT_WINDOW_WIDTH_CHARS, DEFAULT_WINDOW_HEIGHT_CHARS)
        });
        let viewport = resolve_viewport(columns, rows, terminal_size);
        info!(
            "ConsoleDriver: Initial viewport: {}x{} cells.",
            viewport.columns, viewport.rows
        );

        Ok(ConsoleDriver {
            out,
            clearer: clear.into_clearer(),
            original_termios,
            owns_terminal: true,
            fixed_columns: columns,
            fixed_rows: rows,
            viewport,
            needs_full_clear: true,
            frame_buffer: Vec::new(),
            input_buffer: [0u8; 64],
            cleaned_up: false,
        })
    }
}

impl<W: Write> ConsoleDriver<W> {
    /// Builds a driver over an arbitrary writer with a fixed viewport.
    ///
    /// No terminal state is touched: no raw mode, no size queries, no input.
    pub fn with_writer(out: W, clearer: Box<dyn ScreenClear>, viewport: Viewport) -> Self {
        ConsoleDriver {
            out,
            clearer,
            original_termios: None,
            owns_terminal: false,
            fixed_columns: Some(viewport.columns),
            fixed_rows: Some(viewport.rows),
            viewport,
            needs_full_clear: true,
            frame_buffer: Vec::new(),
            input_buffer: [0u8; 64],
            cleaned_up: false,
        }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    fn poll_resize(&mut self, events: &mut Vec<DriverEvent>) {
        if self.fixed_columns.is_some() && self.fixed_rows.is_some() {
            return;
        }
        match query_terminal_size() {
            Ok(size) => {
                let viewport = resolve_viewport(self.fixed_columns, self.fixed_rows, size);
                if viewport != self.viewport {
                    info!(
                        "ConsoleDriver: Terminal resized from {}x{} to {}x{} cells.",
                        self.viewport.columns, self.viewport.rows, viewport.columns, viewport.rows
                    );
                    self.viewport = viewport;
                    self.needs_full_clear = true;
                    events.push(DriverEvent::Resize(viewport));
                }
            }
            Err(e) => {
                warn!(
                    "ConsoleDriver: Failed to get terminal size: {}. Using last known.",
                    e
                );
            }
        }
    }

    fn poll_input(&mut self, events: &mut Vec<DriverEvent>) -> Result<()> {
        // Without raw mode a read on stdin would block until a full line.
        if self.original_termios.is_none() {
            return Ok(());
        }
        match stdin().read(&mut self.input_buffer) {
            Ok(0) => {}
            Ok(bytes_read) => {
                trace!("ConsoleDriver: Read {} bytes from stdin.", bytes_read);
                if is_quit_input(&self.input_buffer[..bytes_read]) {
                    info!("ConsoleDriver: Quit key pressed. Requesting close.");
                    events.push(DriverEvent::CloseRequested);
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                trace!("ConsoleDriver: stdin read WouldBlock.");
            }
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {
                trace!("ConsoleDriver: stdin read Interrupted.");
            }
            Err(e) => {
                return Err(e).context("ConsoleDriver: Error reading from stdin");
            }
        }
        Ok(())
    }
}

impl<W: Write> Driver for ConsoleDriver<W> {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn process_events(&mut self) -> Result<Vec<DriverEvent>> {
        let mut events = Vec::new();
        if self.owns_terminal {
            self.poll_resize(&mut events);
            self.poll_input(&mut events)?;
        }
        Ok(events)
    }

    fn clear(&mut self) -> Result<()> {
        if self.needs_full_clear {
            // Start-up and resizes leave stale glyphs outside the new frame.
            self.out
                .write_all(CLEAR_SCREEN_AND_HOME.as_bytes())
                .context("ConsoleDriver: Failed to clear screen")?;
            self.needs_full_clear = false;
            return Ok(());
        }
        self.clearer.clear(&mut self.out)
    }

    /// Writes the whole frame with a single `write_all`, rows joined by CRLF
    /// and no trailing newline so the terminal never scrolls.
    fn blit(&mut self, frame: &FrameGrid) -> Result<()> {
        self.frame_buffer.clear();
        self.frame_buffer
            .reserve(frame.width() * frame.height() + frame.height() * ROW_SEPARATOR.len());
        for (i, row) in frame.rows().enumerate() {
            if i > 0 {
                self.frame_buffer.extend_from_slice(ROW_SEPARATOR);
            }
            self.frame_buffer.extend_from_slice(row);
        }
        self.out
            .write_all(&self.frame_buffer)
            .context("ConsoleDriver: Failed to write frame")?;
        trace!(
            "ConsoleDriver: blitted {}x{} frame ({} bytes)",
            frame.width(),
            frame.height(),
            self.frame_buffer.len()
        );
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.out
            .flush()
            .context("ConsoleDriver: Failed to flush output during present")
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.cleaned_up {
            return Ok(());
        }
        self.cleaned_up = true;
        if !self.owns_terminal {
            return self.present();
        }
        info!("ConsoleDriver: Cleaning up...");
        self.out
            .write_all(ROW_SEPARATOR)
            .and_then(|_| self.out.write_all(CURSOR_SHOW.as_bytes()))
            .and_then(|_| self.out.flush())
            .context("ConsoleDriver: Failed to flush for CURSOR_SHOW cleanup")?;
        if let Some(original_termios) = self.original_termios.take() {
            debug!("ConsoleDriver: Restoring original terminal attributes.");
            tcsetattr(STDIN_FILENO, TCSANOW, &original_termios)
                .context("ConsoleDriver: Failed to restore original terminal attributes")?;
        }
        info!("ConsoleDriver: Cleanup complete.");
        Ok(())
    }
}

impl<W: Write> Drop for ConsoleDriver<W> {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            error!("ConsoleDriver: Error during cleanup in drop: {}", e);
        }
    }
}

/// Hides the cursor. On failure no driver exists yet to restore the terminal
/// on drop, so `restore` is handed the saved attributes first.
fn hide_cursor_or_restore<W: Write, T>(
    out: &mut W,
    saved: Option<T>,
    restore: impl FnOnce(T) -> Result<()>,
) -> Result<()> {
    if let Err(e) = out
        .write_all(CURSOR_HIDE.as_bytes())
        .and_then(|_| out.flush())
    {
        if let Some(saved) = saved {
            if let Err(restore_err) = restore(saved) {
                error!("ConsoleDriver: {:#}", restore_err);
            }
        }
        return Err(e).context("ConsoleDriver: Failed to hide cursor");
    }
    Ok(())
}

/// Whether a chunk of raw key input asks the animation to stop.
fn is_quit_input(bytes: &[u8]) -> bool {
    // A lone ESC is the Escape key; ESC followed by more bytes is a key sequence.
    if bytes == [KEY_ESCAPE] {
        return true;
    }
    bytes
        .iter()
        .any(|&b| matches!(b, b'q' | b'Q' | KEY_CTRL_C | KEY_CTRL_D))
}

/// Applies pinned dimensions over the measured terminal size.
fn resolve_viewport(columns: Option<u16>, rows: Option<u16>, terminal: (u16, u16)) -> Viewport {
    Viewport::new(columns.unwrap_or(terminal.0), rows.unwrap_or(terminal.1))
}

/// Size of the controlling terminal in cells, trying stdout then stdin.
fn query_terminal_size() -> Result<(u16, u16)> {
    get_terminal_size_cells(STDOUT_FILENO).or_else(|_| get_terminal_size_cells(STDIN_FILENO))
}

fn get_terminal_size_cells(fd: RawFd) -> Result<(u16, u16)> {
    unsafe {
        let mut winsz: winsize = mem::zeroed();
        if libc::ioctl(fd, TIOCGWINSZ, &mut winsz) == -1 {
            return Err(anyhow::Error::from(std::io::Error::last_os_error())
                .context("ConsoleDriver: ioctl(TIOCGWINSZ) failed"));
        }
        let cols = if winsz.ws_col == 0 {
            DEFAULT_WINDOW_WIDTH_CHARS
        } else {
            winsz.ws_col
        };
        let rows = if winsz.ws_row == 0 {
            DEFAULT_WINDOW_HEIGHT_CHARS
        } else {
            winsz.ws_row
        };
        Ok((cols, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::clear::EscapeHome;
    use test_log::test;

    fn driver(viewport: Viewport) -> ConsoleDriver<Vec<u8>> {
        ConsoleDriver::with_writer(Vec::new(), Box::new(EscapeHome), viewport)
    }

    #[test]
    fn first_clear_wipes_screen_then_homes() {
        let mut console = driver(Viewport::new(2, 2));
        console.clear().unwrap();
        console.clear().unwrap();
        assert_eq!(console.writer().as_slice(), b"\x1b[2J\x1b[H\x1b[H");
    }

    #[test]
    fn blit_writes_rows_without_trailing_newline() {
        let viewport = Viewport::new(3, 2);
        let mut frame = FrameGrid::blank(viewport);
        frame.set(0, 0, b'@');
        frame.set(2, 1, b'.');
        let mut console = driver(viewport);
        console.blit(&frame).unwrap();
        console.present().unwrap();
        assert_eq!(console.writer().as_slice(), b"@  \r\n  .");
    }

    #[test]
    fn writer_backed_driver_reports_no_events() {
        let mut console = driver(Viewport::new(10, 4));
        assert!(console.process_events().unwrap().is_empty());
        assert_eq!(console.viewport(), Viewport::new(10, 4));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_cursor_hide_restores_saved_attributes() {
        let mut restored = None;
        let result = hide_cursor_or_restore(&mut BrokenPipe, Some(7u32), |saved| {
            restored = Some(saved);
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(restored, Some(7));
    }

    #[test]
    fn hidden_cursor_keeps_raw_mode() {
        let mut out = Vec::new();
        let mut restored = false;
        hide_cursor_or_restore(&mut out, Some(()), |_| {
            restored = true;
            Ok(())
        })
        .unwrap();
        assert!(!restored);
        assert_eq!(out, CURSOR_HIDE.as_bytes());
    }

    #[test]
    fn quit_keys_are_recognized() {
        assert!(is_quit_input(b"q"));
        assert!(is_quit_input(&[KEY_CTRL_C]));
        assert!(is_quit_input(&[KEY_ESCAPE]));
        assert!(!is_quit_input(b"\x1b[A"));
        assert!(!is_quit_input(b"x"));
    }

    #[test]
    fn pinned_dimensions_override_terminal_size() {
        assert_eq!(resolve_viewport(None, None, (120, 40)), Viewport::new(120, 40));
        assert_eq!(resolve_viewport(Some(60), None, (120, 40)), Viewport::new(60, 40));
        assert_eq!(resolve_viewport(Some(60), Some(20), (120, 40)), Viewport::new(60, 20));
    }
}
