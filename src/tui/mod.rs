pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::{AppContext, Result};
use crate::domain::MagazineIssue;
use crate::reader::MagazineReader;

use self::app::TuiApp;
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Open `issue` in the terminal reader, resuming from the saved position.
pub fn run(ctx: &AppContext, issue: MagazineIssue) -> Result<()> {
    let reader = MagazineReader::new(issue.slug.clone(), issue.pages.len())
        .with_positions(ctx.positions());
    let mut tui_app = TuiApp::new(issue, reader);

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut tui_app, ctx);
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app(terminal: &mut Tui, tui_app: &mut TuiApp, ctx: &AppContext) -> Result<()> {
    let config = &ctx.config;
    let event_handler = EventHandler::new(Duration::from_millis(100));

    loop {
        terminal.draw(|frame| layout::render(frame, tui_app, &config.colors))?;

        match event_handler.next()? {
            AppEvent::Key(key) => match config.keybindings.get_action(&key) {
                Action::OpenLink => open_link(tui_app),
                action => tui_app.handle_action(action),
            },
            AppEvent::Mouse(mouse) => tui_app.handle_mouse(mouse, &config.swipe),
            AppEvent::Resize | AppEvent::Tick => {}
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

fn open_link(tui_app: &mut TuiApp) {
    let Some(link) = tui_app.link_to_open().map(str::to_string) else {
        tui_app.set_status("No link on this page".to_string());
        return;
    };

    match open::that(&link) {
        Ok(()) => tui_app.set_status(format!("Opened {}", link)),
        Err(e) => tui_app.set_status(format!("Failed to open browser: {}", e)),
    }
}
