//! Menu navigation.
//!
//! The menus form a small state machine driven by an explicit loop. Every
//! trip back to a menu clears the screen and redraws the banner first.

mod prompt;

pub use prompt::{ConsoleTerminal, Entry, Terminal};

use std::io;
use std::sync::Arc;

use tokio::runtime::Runtime;

use crate::error::AppError;
use crate::hardware::{fetch_summary, SystemProbe};
use crate::render::{self, SummaryRenderer, Tone};
use crate::report::{self, Category};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuState {
    MainMenu,
    DetailMenu,
    ShowingAll,
    ShowingDetail(Category),
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainChoice {
    All,
    Detailed,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailChoice {
    Show(Category),
    Back,
}

struct MenuChoice<K> {
    label: &'static str,
    key: K,
}

enum MenuItem<K> {
    Choice(MenuChoice<K>),
    Separator,
}

impl<K> MenuItem<K> {
    fn choice(label: &'static str, key: K) -> Self {
        MenuItem::Choice(MenuChoice { label, key })
    }
}

fn main_menu_items() -> Vec<MenuItem<MainChoice>> {
    vec![
        MenuItem::choice("View All Specifications", MainChoice::All),
        MenuItem::choice("Detailed View (By Category)", MainChoice::Detailed),
        MenuItem::Separator,
        MenuItem::choice("Exit", MainChoice::Exit),
    ]
}

fn detail_menu_items() -> Vec<MenuItem<DetailChoice>> {
    let mut items: Vec<_> = Category::ALL
        .iter()
        .map(|c| MenuItem::choice(c.label(), DetailChoice::Show(*c)))
        .collect();
    items.push(MenuItem::Separator);
    items.push(MenuItem::choice("Return to Main Menu", DetailChoice::Back));
    items
}

/// Runs menu sessions against a probe and a terminal.
pub struct Navigator<'rt, P: ?Sized, T> {
    probe: Arc<P>,
    runtime: &'rt Runtime,
    terminal: T,
    settings: Settings,
    summary_renderer: SummaryRenderer,
}

impl<'rt, P, T> Navigator<'rt, P, T>
where
    P: SystemProbe + ?Sized + 'static,
    T: Terminal,
{
    pub fn new(probe: Arc<P>, runtime: &'rt Runtime, terminal: T, settings: Settings) -> Self {
        Self {
            probe,
            runtime,
            terminal,
            settings,
            summary_renderer: render::summary_table,
        }
    }

    #[cfg(test)]
    pub fn with_summary_renderer(mut self, renderer: SummaryRenderer) -> Self {
        self.summary_renderer = renderer;
        self
    }

    /// Run until the user exits. Returns an error for any failure that ends
    /// the session early.
    pub fn run(&mut self) -> Result<(), AppError> {
        let mut state = MenuState::MainMenu;
        loop {
            tracing::debug!(?state, "menu state");
            state = match state {
                MenuState::MainMenu => self.main_menu()?,
                MenuState::DetailMenu => self.detail_menu()?,
                MenuState::ShowingAll => self.show_all()?,
                MenuState::ShowingDetail(category) => self.show_detail(category)?,
                MenuState::Exit => {
                    let farewell = self.settings.farewell();
                    let line = self.settings.theme.paint(Tone::Farewell, &farewell);
                    self.terminal.write_line(&line.to_string())?;
                    return Ok(());
                }
            };
        }
    }

    #[cfg(test)]
    pub fn into_terminal(self) -> T {
        self.terminal
    }

    fn show_banner(&mut self) -> Result<(), AppError> {
        self.terminal.clear_screen()?;
        let banner = render::render_banner(&self.settings.theme, self.terminal.width());
        self.terminal.write_line(&banner)?;
        Ok(())
    }

    fn prompt<K: Copy>(&mut self, message: &str, items: &[MenuItem<K>]) -> Result<K, AppError> {
        let entries: Vec<Entry<'_>> = items
            .iter()
            .map(|item| match item {
                MenuItem::Choice(choice) => Entry::Choice(choice.label),
                MenuItem::Separator => Entry::Separator,
            })
            .collect();

        let index = self
            .terminal
            .select(message, &entries, self.settings.page_size)?;
        match items.get(index) {
            Some(MenuItem::Choice(choice)) => Ok(choice.key),
            _ => Err(AppError::Prompt(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("selection {index} is not a menu choice"),
            ))),
        }
    }

    fn main_menu(&mut self) -> Result<MenuState, AppError> {
        self.show_banner()?;
        let next = match self.prompt("Select an option:", &main_menu_items())? {
            MainChoice::All => MenuState::ShowingAll,
            MainChoice::Detailed => MenuState::DetailMenu,
            MainChoice::Exit => MenuState::Exit,
        };
        Ok(next)
    }

    fn detail_menu(&mut self) -> Result<MenuState, AppError> {
        self.show_banner()?;
        let next = match self.prompt("Select detailed view:", &detail_menu_items())? {
            DetailChoice::Show(category) => MenuState::ShowingDetail(category),
            DetailChoice::Back => MenuState::MainMenu,
        };
        Ok(next)
    }

    fn show_all(&mut self) -> Result<MenuState, AppError> {
        let snapshot = self
            .runtime
            .block_on(fetch_summary(Arc::clone(&self.probe)))?;
        let rows = report::summary_rows(&snapshot, self.settings.byte_decimals);

        // A table that cannot be drawn still leaves the session usable.
        match (self.summary_renderer)(&self.settings.theme, &rows) {
            Ok(table) => self.terminal.write_line(&table)?,
            Err(err) => {
                tracing::debug!(error = %err, "summary table failed to render");
                let label = self.settings.theme.paint(Tone::Error, "Error displaying specs:");
                self.terminal.write_error(&format!("{label} {err}"))?;
            }
        }

        let next = if self.terminal.confirm("Return to main menu?", true)? {
            MenuState::MainMenu
        } else {
            MenuState::Exit
        };
        Ok(next)
    }

    fn show_detail(&mut self, category: Category) -> Result<MenuState, AppError> {
        let view = report::detail_view(&*self.probe, category, self.settings.byte_decimals)?;
        let title = self.settings.theme.paint(Tone::Title, view.title);
        self.terminal.write_line(&format!("\n{title}"))?;
        let table = render::detail_table(&self.settings.theme, &view.rows)?;
        self.terminal.write_line(&table)?;

        let next = if self.terminal.confirm("View another detailed section?", true)? {
            MenuState::DetailMenu
        } else {
            MenuState::MainMenu
        };
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::render::Theme;
    use crate::report::DisplayRow;
    use crate::testing::{Answer, FakeProbe, ScriptedTerminal, TermEvent};

    const ALL: &str = "View All Specifications";
    const DETAILED: &str = "Detailed View (By Category)";
    const BACK: &str = "Return to Main Menu";

    type Session = (Result<(), AppError>, Arc<FakeProbe>, ScriptedTerminal);

    fn run_session(probe: FakeProbe, script: Vec<Answer>) -> Session {
        run_session_with(probe, script, render::summary_table)
    }

    fn run_session_with(probe: FakeProbe, script: Vec<Answer>, renderer: SummaryRenderer) -> Session {
        colored::control::set_override(false);
        let runtime = Runtime::new().unwrap();
        let probe = Arc::new(probe);
        let mut navigator = Navigator::new(
            Arc::clone(&probe),
            &runtime,
            ScriptedTerminal::new(script),
            Settings::default(),
        )
        .with_summary_renderer(renderer);
        let result = navigator.run();
        (result, probe, navigator.into_terminal())
    }

    fn farewell() -> String {
        Settings::default().farewell()
    }

    #[test]
    fn exit_from_main_menu() {
        let (result, probe, term) = run_session(FakeProbe::new(), vec![Answer::Pick("Exit")]);
        result.unwrap();
        assert_eq!(probe.total_calls(), 0);
        assert_eq!(term.events.last(), Some(&TermEvent::Out(farewell())));
    }

    #[test]
    fn menu_redraw_clears_before_banner_and_prompt() {
        let (result, _, term) = run_session(FakeProbe::new(), vec![Answer::Pick("Exit")]);
        result.unwrap();
        assert_eq!(term.events[0], TermEvent::Clear);
        assert!(matches!(&term.events[1], TermEvent::Out(text) if text.contains("|____/")));
        assert_eq!(
            term.events[2],
            TermEvent::Select("Select an option:".to_string())
        );
    }

    #[test]
    fn detailed_then_back_issues_no_queries() {
        let (result, probe, term) = run_session(
            FakeProbe::new(),
            vec![
                Answer::Pick(DETAILED),
                Answer::Pick(BACK),
                Answer::Pick("Exit"),
            ],
        );
        result.unwrap();
        assert_eq!(probe.total_calls(), 0);
        assert_eq!(term.clear_count(), 3);
        assert_eq!(
            term.selects(),
            vec!["Select an option:", "Select detailed view:", "Select an option:"]
        );
        assert!(term.confirms().is_empty());
    }

    #[test]
    fn view_all_then_decline_exits() {
        let (result, probe, term) = run_session(
            FakeProbe::new(),
            vec![Answer::Pick(ALL), Answer::Confirm(false)],
        );
        result.unwrap();
        assert_eq!(probe.total_calls(), 8);
        assert_eq!(term.confirms(), vec!["Return to main menu?"]);

        let output = term.stdout();
        assert!(output.contains("SPECIFICATION"));
        assert!(output.contains("LENOVO 20QV00CWUS"));
        assert!(output.ends_with(&format!("{}\n", farewell())));
    }

    #[test]
    fn view_all_is_repeatable() {
        let (result, _, term) = run_session(
            FakeProbe::new(),
            vec![
                Answer::Pick(ALL),
                Answer::Confirm(true),
                Answer::Pick(ALL),
                Answer::Default,
                Answer::Pick("Exit"),
            ],
        );
        result.unwrap();

        let tables: Vec<&String> = term
            .events
            .iter()
            .filter_map(|e| match e {
                TermEvent::Out(text) if text.contains("CATEGORY") => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0], tables[1]);
    }

    #[test]
    fn detail_views_loop_until_declined() {
        let (result, probe, term) = run_session(
            FakeProbe::new(),
            vec![
                Answer::Pick(DETAILED),
                Answer::Pick("Battery Details"),
                Answer::Confirm(true),
                Answer::Pick("Disk Details"),
                Answer::Confirm(false),
                Answer::Pick("Exit"),
            ],
        );
        result.unwrap();
        assert_eq!(probe.calls("battery"), 1);
        assert_eq!(probe.calls("disk"), 1);
        assert_eq!(probe.total_calls(), 2);
        assert_eq!(
            term.confirms(),
            vec!["View another detailed section?", "View another detailed section?"]
        );

        let output = term.stdout();
        assert!(output.contains("\nBattery Details\n"));
        assert!(output.contains("\nStorage Details\n"));
        assert!(output.contains("PROPERTY"));
    }

    fn broken_summary(_: &Theme, _: &[DisplayRow]) -> Result<String, RenderError> {
        Err(RenderError::ShapeMismatch {
            expected: 2,
            found: 1,
            row: 0,
        })
    }

    #[test]
    fn summary_render_failure_still_offers_return() {
        let (result, probe, term) = run_session_with(
            FakeProbe::new(),
            vec![Answer::Pick(ALL), Answer::Confirm(false)],
            broken_summary,
        );
        result.unwrap();
        assert_eq!(probe.total_calls(), 8);

        let after_pick = term
            .events
            .iter()
            .position(|e| *e == TermEvent::Select("Select an option:".to_string()))
            .unwrap();
        match &term.events[after_pick + 1] {
            TermEvent::Err(text) => assert!(text.starts_with("Error displaying specs:"), "{text}"),
            other => panic!("expected the render error, got {other:?}"),
        }
        assert_eq!(
            term.events[after_pick + 2],
            TermEvent::Confirm("Return to main menu?".to_string())
        );
        assert!(!term.stdout().contains("SPECIFICATION"));
        assert!(term.stdout().ends_with(&format!("{}\n", farewell())));
    }

    #[test]
    fn summary_query_failure_ends_session() {
        let (result, _, term) = run_session(
            FakeProbe::new().failing("memory"),
            vec![Answer::Pick(ALL)],
        );
        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Query(_)));
        assert_eq!(err.context_label(), "Error fetching system info:");
        assert!(!term.stdout().contains("Thank you"));
    }

    #[test]
    fn detail_query_failure_ends_session() {
        let (result, _, _) = run_session(
            FakeProbe::new().failing("network"),
            vec![Answer::Pick(DETAILED), Answer::Pick("Network Details")],
        );
        assert!(matches!(result, Err(AppError::Query(_))));
    }

    #[test]
    fn closed_input_is_a_prompt_error() {
        let (result, _, _) = run_session(FakeProbe::new(), Vec::new());
        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Prompt(_)));
        assert_eq!(err.context_label(), "An error occurred:");
    }

    #[test]
    fn detail_menu_lists_every_category() {
        let labels: Vec<&str> = detail_menu_items()
            .iter()
            .filter_map(|item| match item {
                MenuItem::Choice(choice) => Some(choice.label),
                MenuItem::Separator => None,
            })
            .collect();
        assert_eq!(
            labels,
            vec![
                "CPU Details",
                "Memory Details",
                "Disk Details",
                "Graphics Details",
                "Battery Details",
                "Network Details",
                "Return to Main Menu",
            ]
        );
    }
}
