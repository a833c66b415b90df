use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::widgets::ListState;

use crate::domain::{MagazineIssue, MagazinePage};
use crate::reader::{MagazineReader, Phase, ReaderAction, SwipeConfig, SwipeTracker};
use crate::tui::event::Action;

pub struct TuiApp {
    pub issue: MagazineIssue,
    /// Pages in reading order; indices match the reader's page index.
    pub pages: Vec<MagazinePage>,
    pub reader: MagazineReader,
    pub contents_open: bool,
    pub contents_state: ListState,
    pub page_scroll: u16,
    pub should_quit: bool,
    pub status_message: Option<String>,
    swipe: SwipeTracker,
}

impl TuiApp {
    pub fn new(issue: MagazineIssue, reader: MagazineReader) -> Self {
        let pages = issue.sorted_pages();
        let mut contents_state = ListState::default();
        contents_state.select(Some(reader.current_page()));

        Self {
            issue,
            pages,
            reader,
            contents_open: false,
            contents_state,
            page_scroll: 0,
            should_quit: false,
            status_message: None,
            swipe: SwipeTracker::default(),
        }
    }

    pub fn current_page(&self) -> Option<&MagazinePage> {
        self.pages.get(self.reader.current_page())
    }

    pub fn in_cover_reveal(&self) -> bool {
        self.reader.phase() == Phase::CoverReveal
    }

    /// Link the open-link action should launch, if the current page has one.
    pub fn link_to_open(&self) -> Option<&str> {
        if self.in_cover_reveal() {
            return None;
        }
        self.current_page().and_then(|p| p.primary_link())
    }

    pub fn handle_action(&mut self, action: Action) {
        self.status_message = None;

        if self.contents_open {
            self.handle_contents_action(action);
            return;
        }

        let reader_action = match action {
            Action::Quit => {
                self.should_quit = true;
                return;
            }
            Action::ToggleContents => {
                self.open_contents();
                return;
            }
            Action::MoveUp => {
                self.page_scroll = self.page_scroll.saturating_sub(1);
                return;
            }
            Action::MoveDown => {
                self.page_scroll = self.page_scroll.saturating_add(1);
                return;
            }
            Action::NextPage | Action::Select => ReaderAction::Next,
            Action::PrevPage => ReaderAction::Prev,
            Action::FirstPage => ReaderAction::First,
            Action::LastPage => ReaderAction::Last,
            Action::ToggleFullscreen => ReaderAction::ToggleFullscreen,
            Action::ExitFullscreen => ReaderAction::ExitFullscreen,
            Action::OpenLink | Action::None => return,
        };

        if self.reader.apply(reader_action) {
            self.page_scroll = 0;
        }
    }

    fn handle_contents_action(&mut self, action: Action) {
        let last = self.pages.len().saturating_sub(1);
        let selected = self.contents_state.selected().unwrap_or(0);

        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleContents | Action::ExitFullscreen => self.contents_open = false,
            Action::MoveUp | Action::PrevPage => {
                self.contents_state.select(Some(selected.saturating_sub(1)))
            }
            Action::MoveDown | Action::NextPage => {
                self.contents_state.select(Some((selected + 1).min(last)))
            }
            Action::FirstPage => self.contents_state.select(Some(0)),
            Action::LastPage => self.contents_state.select(Some(last)),
            Action::Select => {
                self.contents_open = false;
                self.reader.finish_reveal();
                if self.reader.apply(ReaderAction::GoTo(selected)) {
                    self.page_scroll = 0;
                }
            }
            Action::ToggleFullscreen | Action::OpenLink | Action::None => {}
        }
    }

    fn open_contents(&mut self) {
        if self.pages.is_empty() {
            self.set_status("This issue has no pages".to_string());
            return;
        }
        self.contents_state.select(Some(self.reader.current_page()));
        self.contents_open = true;
    }

    /// Left-button press and release pairs are treated as swipes.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, config: &SwipeConfig) {
        let (x, y) = (f32::from(mouse.column), f32::from(mouse.row));

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.swipe.begin(x, y),
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(swipe) = self.swipe.end(x, y, config) {
                    if !self.contents_open && self.reader.apply_swipe(swipe) {
                        self.page_scroll = 0;
                    }
                }
            }
            MouseEventKind::ScrollDown => self.page_scroll = self.page_scroll.saturating_add(1),
            MouseEventKind::ScrollUp => self.page_scroll = self.page_scroll.saturating_sub(1),
            _ => {}
        }
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }
}
