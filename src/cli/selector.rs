//! Interactive artifact selector.
//!
//! A blocking read-and-decode loop over a raw-mode terminal. All records start
//! selected; the operator moves a cursor, toggles rows and confirms or quits.
//! State transitions live in [`SelectionState`] and rendering writes to any
//! [`Write`], so both are testable without a terminal.

#![allow(missing_docs)]

use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, SystemTime};

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use crate::cli::interrupt::InterruptFlag;
use crate::cli::terminal_guard::TerminalGuard;
use crate::core::config::MIN_VISIBLE_ROWS_FLOOR;
use crate::core::errors::{Result, SweepError};
use crate::core::format::{format_age, format_bytes, format_file_count};
use crate::scanner::engine::ArtifactRecord;

/// Lines outside the list: title, help, blank, two scroll indicators, blank, summary, spare.
pub const RESERVED_LINES: usize = 8;

/// How often the loop wakes to check the interrupt flag.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

const MIN_PATH_WIDTH: usize = 20;

/// Narrower than this, the description column is dropped instead of shown.
const MIN_DESCRIPTION_WIDTH: usize = 4;

/// `"> [x] "` in front of every row.
const ROW_PREFIX_WIDTH: usize = 6;

/// Gap between columns.
const GAP: usize = 2;

/// Final result of a selection session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Selected records, in original order. May be empty.
    Confirmed(Vec<ArtifactRecord>),
    Cancelled,
    Interrupted,
}

impl SelectionOutcome {
    /// Short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Confirmed(_) => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Interrupted => "interrupted",
        }
    }
}

/// Decoded operator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorAction {
    Interrupt,
    Quit,
    Up,
    Down,
    Toggle,
    SelectAll,
    SelectNone,
    Confirm,
}

/// How a session ended, before records are handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Confirmed,
    Cancelled,
    Interrupted,
}

/// Map a key press to an action. Unbound keys yield `None`.
#[must_use]
pub fn resolve_key(key: &KeyEvent) -> Option<SelectorAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c' | 'C') => Some(SelectorAction::Interrupt),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(SelectorAction::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(SelectorAction::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(SelectorAction::Down),
        KeyCode::Char(' ') => Some(SelectorAction::Toggle),
        KeyCode::Char('a') => Some(SelectorAction::SelectAll),
        KeyCode::Char('n') => Some(SelectorAction::SelectNone),
        KeyCode::Enter => Some(SelectorAction::Confirm),
        _ => None,
    }
}

/// Cursor, per-row selection flags and scroll position.
#[derive(Debug, Clone)]
pub struct SelectionState {
    records: Vec<ArtifactRecord>,
    selected: Vec<bool>,
    cursor: usize,
    scroll_offset: usize,
}

impl SelectionState {
    /// Every record starts selected with the cursor on the first row.
    #[must_use]
    pub fn new(records: Vec<ArtifactRecord>) -> Self {
        let selected = vec![true; records.len()];
        Self {
            records,
            selected,
            cursor: 0,
            scroll_offset: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub const fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    #[must_use]
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn records(&self) -> &[ArtifactRecord] {
        &self.records
    }

    /// Apply one action. Returns a resolution when the session should end.
    pub fn apply(&mut self, action: SelectorAction) -> Option<Resolution> {
        let last = self.records.len().saturating_sub(1);
        match action {
            SelectorAction::Interrupt => return Some(Resolution::Interrupted),
            SelectorAction::Quit => return Some(Resolution::Cancelled),
            SelectorAction::Confirm => return Some(Resolution::Confirmed),
            SelectorAction::Up => self.cursor = self.cursor.saturating_sub(1),
            SelectorAction::Down => self.cursor = (self.cursor + 1).min(last),
            SelectorAction::Toggle => {
                if let Some(flag) = self.selected.get_mut(self.cursor) {
                    *flag = !*flag;
                }
            }
            SelectorAction::SelectAll => self.selected.fill(true),
            SelectorAction::SelectNone => self.selected.fill(false),
        }
        None
    }

    /// Consume the state into the caller-facing outcome.
    #[must_use]
    pub fn finish(self, resolution: Resolution) -> SelectionOutcome {
        match resolution {
            Resolution::Cancelled => SelectionOutcome::Cancelled,
            Resolution::Interrupted => SelectionOutcome::Interrupted,
            Resolution::Confirmed => SelectionOutcome::Confirmed(
                self.records
                    .into_iter()
                    .zip(self.selected)
                    .filter_map(|(record, keep)| keep.then_some(record))
                    .collect(),
            ),
        }
    }

    /// Selected count, cumulative bytes and cumulative file count.
    #[must_use]
    pub fn selection_totals(&self) -> (usize, u64, u64) {
        self.records
            .iter()
            .zip(&self.selected)
            .filter(|(_, keep)| **keep)
            .fold((0, 0u64, 0u64), |(n, bytes, files), (record, _)| {
                (
                    n + 1,
                    bytes.saturating_add(record.size_bytes),
                    files.saturating_add(record.file_count),
                )
            })
    }

    /// Move the scroll window so the cursor row is inside a viewport of `height` rows.
    pub fn scroll_to_cursor(&mut self, height: usize) {
        self.scroll_offset = clamp_scroll(self.cursor, self.scroll_offset, height, self.len());
    }
}

/// Scroll offset that keeps `cursor` visible and never scrolls past the end.
#[must_use]
pub fn clamp_scroll(cursor: usize, offset: usize, height: usize, len: usize) -> usize {
    let height = height.max(1);
    let mut offset = offset;
    if cursor < offset {
        offset = cursor;
    } else if cursor >= offset + height {
        offset = cursor + 1 - height;
    }
    offset.min(len.saturating_sub(height))
}

/// Rows available for the list on a terminal with `rows` lines.
#[must_use]
pub fn viewport_height(rows: u16, min_visible_rows: usize) -> usize {
    usize::from(rows)
        .saturating_sub(RESERVED_LINES)
        .max(min_visible_rows.max(MIN_VISIBLE_ROWS_FLOOR))
}

/// Keep the tail of `path`, prefixing `...` when it does not fit in `width` chars.
#[must_use]
pub fn truncate_path(path: &str, width: usize) -> String {
    let count = path.chars().count();
    if count <= width {
        return path.to_string();
    }
    if width <= 3 {
        return ".".repeat(width);
    }
    let keep = width - 3;
    let tail: String = path.chars().skip(count - keep).collect();
    format!("...{tail}")
}

/// Column widths measured across every record, not just the visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidths {
    pub size: usize,
    pub files: usize,
    pub age: usize,
    pub description: usize,
}

impl ColumnWidths {
    #[must_use]
    pub fn measure(records: &[ArtifactRecord], now: SystemTime) -> Self {
        let mut widths = Self {
            size: 0,
            files: 0,
            age: 0,
            description: 0,
        };
        for record in records {
            widths.size = widths.size.max(format_bytes(record.size_bytes).len());
            widths.files = widths.files.max(format_file_count(record.file_count).len());
            widths.age = widths.age.max(age_label(record, now).chars().count());
            widths.description = widths
                .description
                .max(record.description.chars().count());
        }
        widths
    }

    /// Fit the columns into `cols`.
    ///
    /// The path keeps at least `MIN_PATH_WIDTH` chars while anything else can
    /// give way: the description shrinks first, then the age column goes.
    #[must_use]
    pub fn fit(&self, cols: u16) -> RowLayout {
        let cols = usize::from(cols);
        let base = ROW_PREFIX_WIDTH + GAP + self.size + GAP + self.files;
        let with_age = base + GAP + self.age;
        let mut layout = RowLayout {
            cols,
            path: 0,
            size: self.size,
            files: self.files,
            age: Some(self.age),
            description: 0,
        };

        let full = with_age + GAP + self.description;
        if cols >= full + MIN_PATH_WIDTH {
            layout.path = cols - full;
            layout.description = self.description;
        } else if cols >= with_age + MIN_PATH_WIDTH {
            let spare = (cols - with_age - MIN_PATH_WIDTH).saturating_sub(GAP);
            if spare >= MIN_DESCRIPTION_WIDTH {
                layout.description = spare;
                layout.path = MIN_PATH_WIDTH;
            } else {
                layout.path = cols - with_age;
            }
        } else {
            layout.age = None;
            layout.path = cols.saturating_sub(base).max(1);
        }
        layout
    }
}

/// Column widths resolved for one terminal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    pub cols: usize,
    pub path: usize,
    pub size: usize,
    pub files: usize,
    /// `None` when the age column was dropped to make room.
    pub age: Option<usize>,
    /// Zero when the description column was dropped.
    pub description: usize,
}

impl RowLayout {
    /// One list row, never wider than the terminal.
    #[must_use]
    pub fn row(
        &self,
        record: &ArtifactRecord,
        is_cursor: bool,
        is_selected: bool,
        now: SystemTime,
    ) -> String {
        let mut line = format!(
            "{} [{}] {:<pw$}  {:>sw$}  {:>fw$}",
            if is_cursor { '>' } else { ' ' },
            if is_selected { 'x' } else { ' ' },
            truncate_path(&record.relative_path.display().to_string(), self.path),
            format_bytes(record.size_bytes),
            format_file_count(record.file_count),
            pw = self.path,
            sw = self.size,
            fw = self.files,
        );
        if let Some(aw) = self.age {
            line.push_str(&format!("  {:>aw$}", age_label(record, now)));
        }
        if self.description > 0 {
            line.push_str("  ");
            line.push_str(&truncate_end(&record.description, self.description));
        }
        clip(&line, self.cols)
    }
}

/// Keep the head of `text`, ending with `...` when it does not fit in `width` chars.
fn truncate_end(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width <= 3 {
        return ".".repeat(width);
    }
    let head: String = text.chars().take(width - 3).collect();
    format!("{head}...")
}

/// Cut `text` to at most `cols` chars so it never wraps.
fn clip(text: &str, cols: usize) -> String {
    text.chars().take(cols).collect()
}

fn age_label(record: &ArtifactRecord, now: SystemTime) -> String {
    record
        .last_modified
        .and_then(|modified| now.duration_since(modified).ok())
        .map_or_else(|| "-".to_string(), format_age)
}

/// Summary line for the current selection.
#[must_use]
pub fn summary_line(state: &SelectionState) -> String {
    let (count, bytes, files) = state.selection_totals();
    if count == 0 {
        "Nothing selected".to_string()
    } else {
        format!(
            "Selected {count} of {} | {} | {}",
            state.len(),
            format_bytes(bytes),
            format_file_count(files)
        )
    }
}

/// Static view parameters for one render pass.
#[derive(Debug, Clone, Copy)]
pub struct FrameLayout<'a> {
    pub root: &'a Path,
    pub cols: u16,
    pub rows: u16,
    pub min_visible_rows: usize,
    pub now: SystemTime,
}

/// Clear the screen and redraw the whole selector.
pub fn render_frame<W: Write>(
    out: &mut W,
    state: &mut SelectionState,
    layout: &FrameLayout<'_>,
) -> io::Result<()> {
    let height = viewport_height(layout.rows, layout.min_visible_rows);
    state.scroll_to_cursor(height);
    let columns = ColumnWidths::measure(&state.records, layout.now).fit(layout.cols);
    let cols = usize::from(layout.cols);
    let total: u64 = state
        .records
        .iter()
        .fold(0, |acc, r| acc.saturating_add(r.size_bytes));

    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;

    let mut row: u16 = 0;
    queue!(
        out,
        MoveTo(0, row),
        SetAttribute(Attribute::Bold),
        Print(clip(
            &format!(
                "Found {} artifacts in {} ({})",
                state.len(),
                layout.root.display(),
                format_bytes(total)
            ),
            cols
        )),
        SetAttribute(Attribute::Reset)
    )?;
    row += 1;
    queue!(
        out,
        MoveTo(0, row),
        SetForegroundColor(Color::DarkGrey),
        Print(clip(
            "↑/k ↓/j move  space toggle  a all  n none  enter delete  q/esc quit",
            cols
        )),
        SetAttribute(Attribute::Reset)
    )?;
    row += 2;

    let start = state.scroll_offset;
    let end = (start + height).min(state.len());

    if start > 0 {
        queue!(
            out,
            MoveTo(0, row),
            SetForegroundColor(Color::DarkGrey),
            Print(clip(&format!("  ↑ {start} more above"), cols)),
            SetAttribute(Attribute::Reset)
        )?;
    }
    row += 1;

    for index in start..end {
        let record = &state.records[index];
        let is_cursor = index == state.cursor;
        let is_selected = state.selected[index];
        let line = columns.row(record, is_cursor, is_selected, layout.now);
        queue!(out, MoveTo(0, row))?;
        if is_cursor {
            queue!(out, SetAttribute(Attribute::Reverse))?;
        }
        let color = if is_selected {
            Color::Green
        } else {
            Color::DarkGrey
        };
        queue!(
            out,
            SetForegroundColor(color),
            Print(line),
            SetAttribute(Attribute::Reset)
        )?;
        row += 1;
    }

    let below = state.len() - end;
    if below > 0 {
        queue!(
            out,
            MoveTo(0, row),
            SetForegroundColor(Color::DarkGrey),
            Print(clip(&format!("  ↓ {below} more below"), cols)),
            SetAttribute(Attribute::Reset)
        )?;
    }
    row += 2;

    queue!(
        out,
        MoveTo(0, row),
        SetAttribute(Attribute::Bold),
        Print(clip(&summary_line(state), cols)),
        SetAttribute(Attribute::Reset)
    )?;
    out.flush()
}

/// Runs a selection session on the real terminal.
pub struct Selector<'a> {
    root: &'a Path,
    min_visible_rows: usize,
    interrupt: Option<InterruptFlag>,
}

impl<'a> Selector<'a> {
    #[must_use]
    pub const fn new(root: &'a Path) -> Self {
        Self {
            root,
            min_visible_rows: MIN_VISIBLE_ROWS_FLOOR,
            interrupt: None,
        }
    }

    #[must_use]
    pub const fn min_visible_rows(mut self, rows: usize) -> Self {
        self.min_visible_rows = rows;
        self
    }

    /// Resolve as interrupted once this flag is raised.
    #[must_use]
    pub fn interrupt_flag(mut self, flag: InterruptFlag) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Block until the operator confirms, quits or interrupts.
    ///
    /// The terminal is restored before this returns on every path.
    pub fn run(&self, records: Vec<ArtifactRecord>) -> Result<SelectionOutcome> {
        if records.is_empty() {
            return Ok(SelectionOutcome::Confirmed(Vec::new()));
        }

        let guard = TerminalGuard::new().map_err(|source| SweepError::Terminal { source })?;
        let mut state = SelectionState::new(records);
        let resolution = self
            .event_loop(&mut state)
            .map_err(|source| SweepError::Terminal { source });
        drop(guard);
        Ok(state.finish(resolution?))
    }

    fn event_loop(&self, state: &mut SelectionState) -> io::Result<Resolution> {
        let mut stdout = io::stdout();
        let now = SystemTime::now();
        let mut redraw = true;

        loop {
            if self.interrupt.as_ref().is_some_and(InterruptFlag::is_raised) {
                return Ok(Resolution::Interrupted);
            }

            if redraw {
                let (cols, rows) = TerminalGuard::terminal_size();
                let layout = FrameLayout {
                    root: self.root,
                    cols,
                    rows,
                    min_visible_rows: self.min_visible_rows,
                    now,
                };
                render_frame(&mut stdout, state, &layout)?;
                redraw = false;
            }

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(action) = resolve_key(&key) {
                        if let Some(resolution) = state.apply(action) {
                            return Ok(resolution);
                        }
                        redraw = true;
                    }
                }
                Event::Resize(..) => redraw = true,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use proptest::prelude::*;

    fn record(rel: &str, size: u64, files: u64) -> ArtifactRecord {
        ArtifactRecord {
            absolute_path: PathBuf::from("/work").join(rel),
            relative_path: PathBuf::from(rel),
            basename: "node_modules".to_string(),
            description: "Node.js dependencies".to_string(),
            size_bytes: size,
            file_count: files,
            last_modified: None,
        }
    }

    fn three() -> Vec<ArtifactRecord> {
        vec![
            record("a/node_modules", 3 * 1024 * 1024, 30),
            record("b/node_modules", 2 * 1024 * 1024, 20),
            record("c/node_modules", 1024 * 1024, 10),
        ]
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn render_to_string(state: &mut SelectionState, cols: u16, rows: u16) -> String {
        let mut buf = Vec::new();
        let layout = FrameLayout {
            root: Path::new("/work"),
            cols,
            rows,
            min_visible_rows: 5,
            now: SystemTime::now(),
        };
        render_frame(&mut buf, state, &layout).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn key_bindings() {
        assert_eq!(resolve_key(&key(KeyCode::Char('q'))), Some(SelectorAction::Quit));
        assert_eq!(resolve_key(&key(KeyCode::Esc)), Some(SelectorAction::Quit));
        assert_eq!(resolve_key(&key(KeyCode::Up)), Some(SelectorAction::Up));
        assert_eq!(resolve_key(&key(KeyCode::Char('k'))), Some(SelectorAction::Up));
        assert_eq!(resolve_key(&key(KeyCode::Down)), Some(SelectorAction::Down));
        assert_eq!(resolve_key(&key(KeyCode::Char('j'))), Some(SelectorAction::Down));
        assert_eq!(resolve_key(&key(KeyCode::Char(' '))), Some(SelectorAction::Toggle));
        assert_eq!(resolve_key(&key(KeyCode::Char('a'))), Some(SelectorAction::SelectAll));
        assert_eq!(resolve_key(&key(KeyCode::Char('n'))), Some(SelectorAction::SelectNone));
        assert_eq!(resolve_key(&key(KeyCode::Enter)), Some(SelectorAction::Confirm));
        assert_eq!(
            resolve_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(SelectorAction::Interrupt)
        );
        assert_eq!(resolve_key(&key(KeyCode::Char('x'))), None);
        assert_eq!(resolve_key(&key(KeyCode::Char('c'))), None);
        assert_eq!(resolve_key(&key(KeyCode::Tab)), None);
    }

    #[test]
    fn starts_all_selected() {
        let state = SelectionState::new(three());
        assert!((0..3).all(|i| state.is_selected(i)));
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn select_none_then_toggle_first_yields_first_only() {
        let records = three();
        let mut state = SelectionState::new(records.clone());
        assert_eq!(state.apply(SelectorAction::SelectNone), None);
        assert_eq!(state.apply(SelectorAction::Toggle), None);
        let resolution = state.apply(SelectorAction::Confirm).unwrap();
        assert_eq!(
            state.finish(resolution),
            SelectionOutcome::Confirmed(vec![records[0].clone()])
        );
    }

    #[test]
    fn confirm_preserves_original_order() {
        let records = three();
        let mut state = SelectionState::new(records.clone());
        state.apply(SelectorAction::Down);
        state.apply(SelectorAction::Toggle);
        let resolution = state.apply(SelectorAction::Confirm).unwrap();
        assert_eq!(
            state.finish(resolution),
            SelectionOutcome::Confirmed(vec![records[0].clone(), records[2].clone()])
        );
    }

    #[test]
    fn quit_and_interrupt_select_nothing() {
        let mut state = SelectionState::new(three());
        let r = state.apply(SelectorAction::Quit).unwrap();
        assert_eq!(state.finish(r), SelectionOutcome::Cancelled);

        let mut state = SelectionState::new(three());
        let r = state.apply(SelectorAction::Interrupt).unwrap();
        assert_eq!(state.finish(r), SelectionOutcome::Interrupted);
    }

    #[test]
    fn confirm_with_nothing_selected_is_empty() {
        let mut state = SelectionState::new(three());
        state.apply(SelectorAction::SelectNone);
        let r = state.apply(SelectorAction::Confirm).unwrap();
        assert_eq!(state.finish(r), SelectionOutcome::Confirmed(Vec::new()));
    }

    #[test]
    fn single_item_list_stays_in_bounds() {
        let mut state = SelectionState::new(vec![record("node_modules", 200_000, 2)]);
        for action in [
            SelectorAction::Up,
            SelectorAction::Down,
            SelectorAction::Down,
            SelectorAction::Toggle,
            SelectorAction::SelectAll,
            SelectorAction::SelectNone,
        ] {
            assert_eq!(state.apply(action), None);
            assert_eq!(state.cursor(), 0);
        }
        assert!(!state.is_selected(0));
    }

    #[test]
    fn cursor_saturates_at_both_ends() {
        let mut state = SelectionState::new(three());
        state.apply(SelectorAction::Up);
        assert_eq!(state.cursor(), 0);
        for _ in 0..10 {
            state.apply(SelectorAction::Down);
        }
        assert_eq!(state.cursor(), 2);
    }

    #[test]
    fn summary_reports_totals_or_nothing() {
        let mut state = SelectionState::new(three());
        assert_eq!(summary_line(&state), "Selected 3 of 3 | 6.0 MB | 60 files");
        state.apply(SelectorAction::SelectNone);
        assert_eq!(summary_line(&state), "Nothing selected");
    }

    #[test]
    fn clamp_scroll_follows_cursor() {
        assert_eq!(clamp_scroll(0, 0, 5, 20), 0);
        assert_eq!(clamp_scroll(5, 0, 5, 20), 1);
        assert_eq!(clamp_scroll(19, 0, 5, 20), 15);
        assert_eq!(clamp_scroll(3, 10, 5, 20), 3);
        assert_eq!(clamp_scroll(2, 4, 5, 3), 0);
    }

    #[test]
    fn viewport_never_below_floor() {
        assert_eq!(viewport_height(6, 5), 5);
        assert_eq!(viewport_height(40, 5), 32);
        assert_eq!(viewport_height(10, 9), 9);
        assert_eq!(viewport_height(10, 1), 5);
    }

    #[test]
    fn truncate_path_keeps_tail() {
        assert_eq!(truncate_path("short", 10), "short");
        assert_eq!(truncate_path("a/b/c/node_modules", 15), "...node_modules");
        assert_eq!(truncate_path("ünïcödé/path/target", 9), "...target");
        assert_eq!(truncate_path("abcdef", 2), "..");
    }

    #[test]
    fn column_widths_span_all_records() {
        let mut records = three();
        records.push(record("z", 5 * 1024 * 1024 * 1024, 123_456));
        let widths = ColumnWidths::measure(&records, SystemTime::now());
        assert_eq!(widths.size, "5.0 GB".len());
        assert_eq!(widths.files, "123456 files".len());
        assert_eq!(widths.age, 1);
        assert_eq!(widths.fit(200).description, widths.description);
    }

    /// Visible text of each screen line, split at cursor moves.
    fn visible_lines(raw: &str) -> Vec<String> {
        let mut lines = vec![String::new()];
        for (i, segment) in raw.split("\x1b[").enumerate() {
            if i == 0 {
                lines.last_mut().unwrap().push_str(segment);
                continue;
            }
            let end = segment
                .find(|c: char| c.is_ascii_alphabetic())
                .unwrap_or(segment.len());
            if segment[end..].starts_with('H') {
                lines.push(String::new());
            }
            let text = segment.get(end + 1..).unwrap_or("");
            lines.last_mut().unwrap().push_str(text);
        }
        lines
    }

    fn terraform_record() -> ArtifactRecord {
        ArtifactRecord {
            relative_path: PathBuf::from("infra/envs/production/.terraform"),
            absolute_path: PathBuf::from("/work/infra/envs/production/.terraform"),
            basename: ".terraform".to_string(),
            description: "Terraform providers and modules".to_string(),
            size_bytes: 900 * 1024 * 1024,
            file_count: 12_345,
            last_modified: Some(SystemTime::now() - Duration::from_secs(40 * 86_400)),
        }
    }

    #[test]
    fn rows_never_exceed_terminal_width() {
        for cols in [20u16, 40, 60, 80, 100] {
            let mut records = three();
            records.insert(0, terraform_record());
            let mut state = SelectionState::new(records);
            let screen = render_to_string(&mut state, cols, 24);
            let lines = visible_lines(&screen);
            assert!(lines.iter().any(|l| l.contains("[x]")));
            for line in lines {
                assert!(
                    line.chars().count() <= usize::from(cols),
                    "{} chars on a {cols}-col terminal: {line:?}",
                    line.chars().count()
                );
            }
        }
    }

    #[test]
    fn narrow_terminal_shrinks_description_then_drops_age() {
        let widths = ColumnWidths::measure(&[terraform_record()], SystemTime::now());

        let wide = widths.fit(120);
        assert_eq!(wide.description, "Terraform providers and modules".len());
        assert!(wide.path >= MIN_PATH_WIDTH);

        let medium = widths.fit(80);
        assert_eq!(medium.path, MIN_PATH_WIDTH);
        assert!(medium.description >= MIN_DESCRIPTION_WIDTH);
        assert!(medium.description < wide.description);
        assert!(medium.age.is_some());
        let row = medium.row(&terraform_record(), true, true, SystemTime::now());
        assert_eq!(row.chars().count(), 80);
        assert!(row.ends_with("..."));

        let narrow = widths.fit(40);
        assert_eq!(narrow.description, 0);
        assert!(narrow.age.is_none());
    }

    #[test]
    fn render_shows_rows_and_summary() {
        let mut state = SelectionState::new(three());
        let screen = render_to_string(&mut state, 120, 30);
        assert!(screen.contains("Found 3 artifacts in /work (6.0 MB)"));
        assert!(screen.contains("> [x] a/node_modules"));
        assert!(screen.contains("  [x] b/node_modules"));
        assert!(screen.contains("Selected 3 of 3"));
        assert!(!screen.contains("more above"));
        assert!(!screen.contains("more below"));
    }

    #[test]
    fn render_scrolls_with_indicators() {
        let records: Vec<_> = (0..20)
            .map(|i| record(&format!("p{i:02}/node_modules"), 200_000, 1))
            .collect();
        let mut state = SelectionState::new(records);
        for _ in 0..12 {
            state.apply(SelectorAction::Down);
        }
        state.apply(SelectorAction::Toggle);
        let screen = render_to_string(&mut state, 100, 13);

        assert_eq!(state.scroll_offset(), 8);
        assert!(screen.contains("8 more above"));
        assert!(screen.contains("7 more below"));
        assert!(screen.contains("> [ ] p12/node_modules"));
        assert!(!screen.contains("p07/node_modules"));
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(SelectionOutcome::Cancelled.label(), "cancelled");
        assert_eq!(SelectionOutcome::Interrupted.label(), "interrupted");
        assert_eq!(SelectionOutcome::Confirmed(Vec::new()).label(), "confirmed");
    }

    fn any_action() -> impl Strategy<Value = SelectorAction> {
        prop_oneof![
            Just(SelectorAction::Up),
            Just(SelectorAction::Down),
            Just(SelectorAction::Toggle),
            Just(SelectorAction::SelectAll),
            Just(SelectorAction::SelectNone),
        ]
    }

    proptest! {
        #[test]
        fn cursor_and_scroll_stay_in_bounds(
            len in 1usize..40,
            actions in prop::collection::vec(any_action(), 0..200),
            height in 1usize..15,
        ) {
            let records: Vec<_> = (0..len)
                .map(|i| record(&format!("p{i}/target"), 200_000, 1))
                .collect();
            let mut state = SelectionState::new(records);
            for action in actions {
                prop_assert_eq!(state.apply(action), None);
                state.scroll_to_cursor(height);
                prop_assert!(state.cursor() < len);
                prop_assert!(state.scroll_offset() <= state.cursor());
                prop_assert!(state.cursor() < state.scroll_offset() + height);
            }
        }

        #[test]
        fn confirmed_subset_is_ordered_subsequence(
            len in 1usize..20,
            actions in prop::collection::vec(any_action(), 0..80),
        ) {
            let records: Vec<_> = (0..len)
                .map(|i| record(&format!("p{i:02}/target"), 200_000, 1))
                .collect();
            let mut state = SelectionState::new(records.clone());
            let mut expected = vec![true; len];
            for action in actions {
                let cursor = state.cursor();
                state.apply(action);
                match action {
                    SelectorAction::Toggle => expected[cursor] = !expected[cursor],
                    SelectorAction::SelectAll => expected.fill(true),
                    SelectorAction::SelectNone => expected.fill(false),
                    _ => {}
                }
            }
            let resolution = state.apply(SelectorAction::Confirm).unwrap();
            let want: Vec<_> = records
                .into_iter()
                .zip(expected)
                .filter_map(|(r, keep)| keep.then_some(r))
                .collect();
            prop_assert_eq!(state.finish(resolution), SelectionOutcome::Confirmed(want));
        }
    }
}
