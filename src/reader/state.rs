use crate::reader::{ReadingPositions, Swipe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Intro screen shown before the first page turn.
    CoverReveal,
    Reading,
}

/// Which way the last page turn went; only used to pick a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderAction {
    Next,
    Prev,
    First,
    Last,
    GoTo(usize),
    ToggleFullscreen,
    ExitFullscreen,
}

pub struct MagazineReader {
    issue_slug: String,
    total_pages: usize,
    current_page: usize,
    direction: Direction,
    phase: Phase,
    fullscreen: bool,
    positions: Option<ReadingPositions>,
}

impl MagazineReader {
    pub fn new(issue_slug: impl Into<String>, total_pages: usize) -> Self {
        Self {
            issue_slug: issue_slug.into(),
            total_pages,
            current_page: 0,
            direction: Direction::Forward,
            phase: Phase::CoverReveal,
            fullscreen: false,
            positions: None,
        }
    }

    /// Attach persistence and resume from the saved page when it is valid.
    ///
    /// A resumed reader skips the cover reveal.
    pub fn with_positions(mut self, positions: ReadingPositions) -> Self {
        match positions.load(&self.issue_slug, self.total_pages) {
            Ok(Some(index)) => {
                tracing::debug!("Resuming {} at page {}", self.issue_slug, index);
                self.current_page = index;
                if index > 0 {
                    self.phase = Phase::Reading;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Could not load reading position: {}", e),
        }
        self.positions = Some(positions);
        self
    }

    pub fn issue_slug(&self) -> &str {
        &self.issue_slug
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_first(&self) -> bool {
        self.current_page == 0
    }

    pub fn is_last(&self) -> bool {
        self.current_page + 1 >= self.total_pages
    }

    pub fn finish_reveal(&mut self) {
        self.phase = Phase::Reading;
    }

    /// The single place `current_page` changes.
    ///
    /// Out-of-range targets and the current page are no-ops. Returns whether
    /// the page changed.
    pub fn go_to_page(&mut self, index: usize) -> bool {
        if index >= self.total_pages || index == self.current_page {
            return false;
        }

        self.direction = if index > self.current_page {
            Direction::Forward
        } else {
            Direction::Backward
        };
        self.current_page = index;
        self.phase = Phase::Reading;
        self.persist();
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        match self.current_page.checked_sub(1) {
            Some(index) => self.go_to_page(index),
            None => false,
        }
    }

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
    }

    pub fn exit_fullscreen(&mut self) {
        self.fullscreen = false;
    }

    /// Apply an input. During the cover reveal, page-turning input only ends
    /// the reveal.
    pub fn apply(&mut self, action: ReaderAction) -> bool {
        if self.phase == Phase::CoverReveal
            && matches!(
                action,
                ReaderAction::Next | ReaderAction::Prev | ReaderAction::First | ReaderAction::Last
            )
        {
            self.finish_reveal();
            return false;
        }

        match action {
            ReaderAction::Next => self.next_page(),
            ReaderAction::Prev => self.prev_page(),
            ReaderAction::First => self.go_to_page(0),
            ReaderAction::Last => self.go_to_page(self.total_pages.saturating_sub(1)),
            ReaderAction::GoTo(index) => self.go_to_page(index),
            ReaderAction::ToggleFullscreen => {
                self.toggle_fullscreen();
                false
            }
            ReaderAction::ExitFullscreen => {
                self.exit_fullscreen();
                false
            }
        }
    }

    pub fn apply_swipe(&mut self, swipe: Swipe) -> bool {
        match swipe {
            Swipe::Left => self.apply(ReaderAction::Next),
            Swipe::Right => self.apply(ReaderAction::Prev),
        }
    }

    fn persist(&self) {
        if let Some(positions) = &self.positions {
            if let Err(e) = positions.save(&self.issue_slug, self.current_page) {
                tracing::warn!("Could not save reading position: {}", e);
            }
        }
    }
}
