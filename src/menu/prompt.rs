//! Terminal side effects: screen clearing, output and interactive prompts.
//!
//! Interactive terminals get an arrow-key list prompt in raw mode. When stdin
//! or stdout is not a TTY the prompts fall back to numbered, line-based input.

use std::io::{self, BufRead, IsTerminal, Write};
use std::ops::Range;

use colored::Colorize;
use crossterm::cursor::{Hide, MoveToColumn, MoveUp, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType};

use crate::render::{Theme, Tone};

const SEPARATOR: &str = "──────────────";
const POINTER: &str = "❯";

/// One line of a list prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry<'a> {
    Choice(&'a str),
    Separator,
}

impl Entry<'_> {
    fn is_selectable(&self) -> bool {
        matches!(self, Entry::Choice(_))
    }
}

/// Everything the menu does to the terminal.
pub trait Terminal {
    fn clear_screen(&mut self) -> io::Result<()>;

    /// Print `text` followed by a newline on stdout.
    fn write_line(&mut self, text: &str) -> io::Result<()>;

    /// Print `text` followed by a newline on stderr.
    fn write_error(&mut self, text: &str) -> io::Result<()>;

    /// Terminal width in columns, if known.
    fn width(&self) -> Option<u16>;

    /// Ask the user to pick one entry; returns its index in `entries`.
    /// Separators are never returned.
    fn select(&mut self, message: &str, entries: &[Entry<'_>], page_size: usize)
        -> io::Result<usize>;

    fn confirm(&mut self, message: &str, default: bool) -> io::Result<bool>;
}

/// The process's own stdin/stdout.
pub struct ConsoleTerminal {
    theme: Theme,
    interactive: bool,
}

impl ConsoleTerminal {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            interactive: io::stdin().is_terminal() && io::stdout().is_terminal(),
        }
    }
}

impl Terminal for ConsoleTerminal {
    fn clear_screen(&mut self) -> io::Result<()> {
        let mut out = io::stdout();
        execute!(
            out,
            Clear(ClearType::All),
            Clear(ClearType::Purge),
            crossterm::cursor::MoveTo(0, 0)
        )?;
        out.flush()
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{text}")?;
        out.flush()
    }

    fn write_error(&mut self, text: &str) -> io::Result<()> {
        let mut err = io::stderr().lock();
        writeln!(err, "{text}")?;
        err.flush()
    }

    fn width(&self) -> Option<u16> {
        terminal::size().ok().map(|(cols, _)| cols)
    }

    fn select(
        &mut self,
        message: &str,
        entries: &[Entry<'_>],
        page_size: usize,
    ) -> io::Result<usize> {
        let Some(first) = first_selectable(entries) else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "menu has no selectable entries",
            ));
        };

        if self.interactive {
            self.select_raw(message, entries, first, page_size)
        } else {
            self.select_numbered(message, entries)
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> io::Result<bool> {
        if self.interactive {
            self.confirm_raw(message, default)
        } else {
            self.confirm_line(message, default)
        }
    }
}

/// Leaves raw mode and shows the cursor again, even on early return.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), Hide)?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), Show);
    }
}

enum Key {
    Up,
    Down,
    Enter,
    Char(char),
    Interrupt,
    Other,
}

fn read_key() -> io::Result<Key> {
    loop {
        // Windows reports key releases too.
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(classify_key(key));
            }
        }
    }
}

fn classify_key(key: KeyEvent) -> Key {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Key::Interrupt;
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Key::Up,
        KeyCode::Down | KeyCode::Char('j') => Key::Down,
        KeyCode::Enter => Key::Enter,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    }
}

fn interrupted() -> io::Error {
    io::Error::new(io::ErrorKind::Interrupted, "prompt interrupted")
}

fn no_more_input() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "no more input on stdin")
}

impl ConsoleTerminal {
    fn question(&self, message: &str) -> String {
        format!("{} {}", "?".green().bold(), message.bold())
    }

    fn select_raw(
        &mut self,
        message: &str,
        entries: &[Entry<'_>],
        first: usize,
        page_size: usize,
    ) -> io::Result<usize> {
        let _guard = RawModeGuard::enter()?;
        let mut out = io::stdout();
        let mut cursor = first;
        let mut drawn = 0u16;

        loop {
            if drawn > 0 {
                execute!(out, MoveUp(drawn), MoveToColumn(0), Clear(ClearType::FromCursorDown))?;
            }
            drawn = self.draw_list(&mut out, message, entries, cursor, page_size)?;

            match read_key()? {
                Key::Up => cursor = step_cursor(entries, cursor, false),
                Key::Down => cursor = step_cursor(entries, cursor, true),
                Key::Enter => break,
                Key::Interrupt => return Err(interrupted()),
                Key::Char(_) | Key::Other => {}
            }
        }

        execute!(out, MoveUp(drawn), MoveToColumn(0), Clear(ClearType::FromCursorDown))?;
        if let Entry::Choice(label) = entries[cursor] {
            write!(
                out,
                "{} {}\r\n",
                self.question(message),
                self.theme.paint(Tone::Cursor, label)
            )?;
        }
        out.flush()?;
        tracing::debug!(cursor, "menu selection");
        Ok(cursor)
    }

    /// Returns the number of lines written.
    fn draw_list(
        &self,
        out: &mut impl Write,
        message: &str,
        entries: &[Entry<'_>],
        cursor: usize,
        page_size: usize,
    ) -> io::Result<u16> {
        let window = visible_window(entries.len(), cursor, page_size);
        let mut lines = 1u16;
        write!(out, "{}\r\n", self.question(message))?;
        for index in window.clone() {
            let line = match entries[index] {
                Entry::Choice(label) if index == cursor => self
                    .theme
                    .paint(Tone::Cursor, &format!("{POINTER} {label}"))
                    .to_string(),
                Entry::Choice(label) => format!("  {label}"),
                Entry::Separator => self.theme.paint(Tone::Muted, &format!(" {SEPARATOR}")).to_string(),
            };
            write!(out, "{line}\r\n")?;
            lines += 1;
        }
        if window.len() < entries.len() {
            write!(
                out,
                "{}\r\n",
                self.theme.paint(Tone::Muted, "(Move up and down to reveal more choices)")
            )?;
            lines += 1;
        }
        out.flush()?;
        Ok(lines)
    }

    fn confirm_raw(&mut self, message: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "(Y/n)" } else { "(y/N)" };
        let answer = {
            let _guard = RawModeGuard::enter()?;
            let mut out = io::stdout();
            write!(out, "{} {} ", self.question(message), hint.bright_black())?;
            out.flush()?;

            loop {
                match read_key()? {
                    Key::Char('y' | 'Y') => break true,
                    Key::Char('n' | 'N') => break false,
                    Key::Enter => break default,
                    Key::Interrupt => return Err(interrupted()),
                    _ => {}
                }
            }
        };

        let word = if answer { "Yes" } else { "No" };
        self.write_line(&self.theme.paint(Tone::Cursor, word).to_string())?;
        Ok(answer)
    }

    fn select_numbered(&mut self, message: &str, entries: &[Entry<'_>]) -> io::Result<usize> {
        let choices: Vec<(usize, &str)> = entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| match entry {
                Entry::Choice(label) => Some((i, *label)),
                Entry::Separator => None,
            })
            .collect();

        loop {
            write_numbered_menu(&mut io::stdout().lock(), message, &choices)?;

            let input = read_line()?;
            let retry = match parse_choice_number(&input, choices.len()) {
                Some(n) => return Ok(choices[n].0),
                None if input.is_empty() => format!("{}", "Please enter a number.".bright_yellow()),
                None => format!("{}\n", "Invalid choice. Try again.".bright_red()),
            };
            writeln!(io::stdout().lock(), "{retry}")?;
        }
    }

    fn confirm_line(&mut self, message: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        write!(io::stdout().lock(), "{message} {hint}: ")?;
        let input = read_line()?;
        Ok(parse_yes_no(&input, default))
    }
}

fn write_numbered_menu<W: Write>(
    out: &mut W,
    message: &str,
    choices: &[(usize, &str)],
) -> io::Result<()> {
    writeln!(out, "{}", message.bright_white())?;
    for (n, (_, label)) in choices.iter().enumerate() {
        writeln!(out, "  {} {}", format!("{:>2}.", n + 1).bright_black(), label)?;
    }
    write!(out, "{} ", "Enter a number:".bright_yellow())?;
    out.flush()
}

/// Read one trimmed line from stdin. End of input is an error so a closed
/// pipe cannot spin the menu forever.
fn read_line() -> io::Result<String> {
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        return Err(no_more_input());
    }
    Ok(input.trim().to_string())
}

/// 1-based answer to a numbered list; `None` when out of range.
fn parse_choice_number(input: &str, count: usize) -> Option<usize> {
    let n = input.trim().parse::<usize>().ok()?;
    (1..=count).contains(&n).then(|| n - 1)
}

fn parse_yes_no(input: &str, default: bool) -> bool {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}

fn first_selectable(entries: &[Entry<'_>]) -> Option<usize> {
    entries.iter().position(Entry::is_selectable)
}

/// Move to the next selectable entry in the given direction, wrapping around.
fn step_cursor(entries: &[Entry<'_>], cursor: usize, forward: bool) -> usize {
    let len = entries.len();
    if len == 0 {
        return cursor;
    }
    let mut next = cursor;
    for _ in 0..len {
        next = if forward {
            (next + 1) % len
        } else {
            (next + len - 1) % len
        };
        if entries[next].is_selectable() {
            return next;
        }
    }
    cursor
}

/// Rows of the list shown for a given cursor, keeping the cursor roughly
/// centered once the list is longer than a page.
fn visible_window(len: usize, cursor: usize, page_size: usize) -> Range<usize> {
    let page = page_size.max(1);
    if len <= page {
        return 0..len;
    }
    let start = cursor.saturating_sub(page / 2).min(len - page);
    start..start + page
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: [Entry<'static>; 4] = [
        Entry::Choice("View All Specifications"),
        Entry::Choice("Detailed View (By Category)"),
        Entry::Separator,
        Entry::Choice("Exit"),
    ];

    #[test]
    fn cursor_skips_separators() {
        assert_eq!(step_cursor(&MAIN, 1, true), 3);
        assert_eq!(step_cursor(&MAIN, 3, false), 1);
    }

    #[test]
    fn cursor_wraps_around() {
        assert_eq!(step_cursor(&MAIN, 3, true), 0);
        assert_eq!(step_cursor(&MAIN, 0, false), 3);
    }

    #[test]
    fn first_selectable_skips_leading_separator() {
        let entries = [Entry::Separator, Entry::Choice("Exit")];
        assert_eq!(first_selectable(&entries), Some(1));
        assert_eq!(first_selectable(&[Entry::Separator]), None);
    }

    #[test]
    fn short_lists_are_fully_visible() {
        assert_eq!(visible_window(8, 7, 10), 0..8);
        assert_eq!(visible_window(10, 0, 10), 0..10);
    }

    #[test]
    fn long_lists_scroll_with_the_cursor() {
        assert_eq!(visible_window(20, 0, 10), 0..10);
        assert_eq!(visible_window(20, 12, 10), 7..17);
        assert_eq!(visible_window(20, 19, 10), 10..20);
    }

    #[test]
    fn zero_page_size_shows_one_row() {
        assert_eq!(visible_window(5, 3, 0), 3..4);
    }

    #[test]
    fn numbered_answers() {
        assert_eq!(parse_choice_number("1", 3), Some(0));
        assert_eq!(parse_choice_number(" 3 ", 3), Some(2));
        assert_eq!(parse_choice_number("0", 3), None);
        assert_eq!(parse_choice_number("4", 3), None);
        assert_eq!(parse_choice_number("two", 3), None);
    }

    #[test]
    fn yes_no_answers() {
        assert!(parse_yes_no("", true));
        assert!(!parse_yes_no("", false));
        assert!(parse_yes_no("YES", false));
        assert!(!parse_yes_no("n", true));
        assert!(parse_yes_no("maybe", true));
    }

    #[test]
    fn ctrl_c_interrupts() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(classify_key(key), Key::Interrupt));
        let key = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        assert!(matches!(classify_key(key), Key::Down));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn numbered_menu_lists_choices_only() {
        colored::control::set_override(false);
        let choices = [(0, "View All Specifications"), (3, "Exit")];
        let mut out = Vec::new();
        write_numbered_menu(&mut out, "Select an option:", &choices).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Select an option:\n   1. View All Specifications\n   2. Exit\nEnter a number: "
        );
    }

    #[test]
    fn closed_stdout_is_an_error_not_a_panic() {
        let err = write_numbered_menu(&mut ClosedPipe, "Select an option:", &[(0, "Exit")])
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
