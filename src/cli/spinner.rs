//! Scan progress spinner on stderr.
//!
//! A background thread repaints `frame + latest status` every tick. Status
//! updates arrive over a bounded channel with `try_send`, so a slow terminal
//! never stalls the walk.

#![allow(missing_docs)]

use std::io::{self, IsTerminal, Write};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TICK: Duration = Duration::from_millis(80);
const CHANNEL_CAPACITY: usize = 64;

enum SpinnerMsg {
    Status(String),
    Stop,
}

/// Cloneable sender side used by the scan progress callback.
#[derive(Clone)]
pub struct SpinnerHandle {
    tx: Option<Sender<SpinnerMsg>>,
}

impl SpinnerHandle {
    /// Queue a new status line. Dropped silently when the channel is full.
    pub fn set_status(&self, status: &str) {
        if let Some(tx) = &self.tx {
            let _ = tx.try_send(SpinnerMsg::Status(status.to_string()));
        }
    }
}

/// Running spinner. Stops and clears its line on [`Spinner::stop`] or drop.
pub struct Spinner {
    handle: SpinnerHandle,
    thread: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Start a spinner when `enabled` and stderr is a terminal; otherwise a no-op.
    #[must_use]
    pub fn start(enabled: bool) -> Self {
        if !enabled || !io::stderr().is_terminal() {
            return Self::disabled();
        }
        let (tx, rx) = bounded(CHANNEL_CAPACITY);
        let thread = thread::Builder::new()
            .name("asw-spinner".to_string())
            .spawn(move || spin(&rx))
            .ok();
        if thread.is_none() {
            return Self::disabled();
        }
        Self {
            handle: SpinnerHandle { tx: Some(tx) },
            thread,
        }
    }

    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            handle: SpinnerHandle { tx: None },
            thread: None,
        }
    }

    #[must_use]
    pub fn handle(&self) -> SpinnerHandle {
        self.handle.clone()
    }

    pub fn is_active(&self) -> bool {
        self.thread.is_some()
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.handle.tx.take() {
            let _ = tx.send(SpinnerMsg::Stop);
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spin(rx: &Receiver<SpinnerMsg>) {
    let mut stderr = io::stderr();
    let mut status = String::from("scanning");
    let mut frame = 0usize;
    loop {
        let width = terminal::size().map_or(80, |(cols, _)| usize::from(cols));
        let _ = paint(&mut stderr, Some(&render_line(frame, &status, width)));
        frame = frame.wrapping_add(1);

        match rx.recv_timeout(TICK) {
            Ok(SpinnerMsg::Status(next)) => status = next,
            Ok(SpinnerMsg::Stop) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
    let _ = paint(&mut stderr, None);
}

/// Clear the current line and optionally draw `line` in its place.
fn paint<W: Write>(out: &mut W, line: Option<&str>) -> io::Result<()> {
    queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    if let Some(line) = line {
        queue!(out, Print(line))?;
    }
    out.flush()
}

/// One spinner line, clipped to `width` columns.
fn render_line(frame: usize, status: &str, width: usize) -> String {
    let glyph = FRAMES[frame % FRAMES.len()];
    let budget = width.saturating_sub(3);
    let clipped: String = if status.chars().count() > budget {
        let tail: Vec<char> = status.chars().rev().take(budget.saturating_sub(3)).collect();
        format!("...{}", tail.into_iter().rev().collect::<String>())
    } else {
        status.to_string()
    };
    format!("{glyph} {clipped}")
}
