use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::domain::{MagazinePage, PageField, PageType};
use crate::parser::clean_text;
use crate::reader;
use crate::tui::app::TuiApp;

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    let area = frame.area();

    if app.in_cover_reveal() {
        render_cover_reveal(frame, app, area, colors);
        return;
    }

    if app.reader.is_fullscreen() {
        render_page(frame, app, area, colors);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Masthead
                Constraint::Min(5),    // Page
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        render_masthead(frame, app, chunks[0], colors);
        render_page(frame, app, chunks[1], colors);
        render_status_bar(frame, app, chunks[2], colors);
    }

    if app.contents_open {
        render_contents(frame, app, colors);
    }
}

fn render_cover_reveal(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let issue = &app.issue;
    let accent = Style::default().fg(colors.accent);

    let mut lines = vec![Line::from(""); (area.height / 3) as usize];
    if let Some(n) = issue.issue_number {
        lines.push(Line::styled(format!("ISSUE {}", n), accent));
        lines.push(Line::from(""));
    }
    lines.push(Line::styled(
        issue.title.to_uppercase(),
        Style::default()
            .fg(colors.title)
            .add_modifier(Modifier::BOLD),
    ));
    if let Some(description) = &issue.description {
        lines.push(Line::from(""));
        lines.push(Line::styled(description.clone(), Style::default().fg(colors.subtitle)));
    }
    lines.push(Line::from(""));
    lines.push(Line::styled("─".repeat(24), accent));
    lines.push(Line::from(""));

    let hint = if app.pages.is_empty() {
        "This issue has no pages yet".to_string()
    } else {
        format!("{} pages  ·  press → or Space to open", app.pages.len())
    };
    lines.push(Line::styled(hint, Style::default().fg(colors.credits)));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(accent);
    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_masthead(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let kind = app
        .current_page()
        .map(|p| p.page_type.as_str())
        .unwrap_or("");

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", app.issue.title),
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {}", kind), Style::default().fg(colors.credits)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_page(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let border_style = Style::default().fg(colors.border);

    let (title, text) = match app.current_page() {
        Some(page) => (
            format!(" {} ", page.page_number),
            Text::from(page_lines(page, colors)),
        ),
        None => (String::new(), Text::from("This issue has no pages")),
    };

    let mut block = Block::default().borders(Borders::ALL).border_style(border_style);
    if !app.reader.is_fullscreen() {
        block = block.title(title);
    }

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.page_scroll, 0));

    frame.render_widget(paragraph, area);
}

/// Lines for one page, laid out in the order its template declares fields.
pub fn page_lines(page: &MagazinePage, colors: &ColorConfig) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if page.page_type == PageType::Unknown {
        lines.push(Line::styled(
            format!("Page {} uses a template this reader cannot display", page.page_number),
            Style::default().fg(colors.credits),
        ));
        return lines;
    }

    for field in page.page_type.fields() {
        let before = lines.len();
        push_field(&mut lines, page, *field, colors);
        if lines.len() > before {
            lines.push(Line::from(""));
        }
    }

    if lines.is_empty() {
        lines.push(Line::styled(
            format!("Empty {} page", page.page_type),
            Style::default().fg(colors.credits),
        ));
    }
    lines
}

fn push_field(lines: &mut Vec<Line<'static>>, page: &MagazinePage, field: PageField, colors: &ColorConfig) {
    match field {
        PageField::TocEntries => {
            for entry in page.toc_entries.iter().flatten() {
                lines.push(Line::from(vec![
                    Span::styled(format!("{:>3}  ", entry.page), Style::default().fg(colors.accent)),
                    Span::raw(entry.title.clone()),
                ]));
            }
        }
        PageField::ArtistLinks => {
            for link in page.artist_links.iter().flatten() {
                lines.push(Line::from(vec![
                    Span::raw(format!("{}: ", link.label)),
                    Span::styled(link.url.clone(), Style::default().fg(colors.link)),
                ]));
            }
        }
        PageField::GalleryImages => {
            for image in page.gallery_images.iter().flatten() {
                lines.push(Line::styled(format!("[image] {}", image.url), Style::default().fg(colors.link)));
                if let Some(caption) = &image.caption {
                    lines.push(Line::styled(format!("        {}", caption), Style::default().fg(colors.subtitle)));
                }
            }
        }
        _ => {
            let Some(value) = page.text(field).filter(|v| !v.trim().is_empty()) else {
                return;
            };
            push_text_field(lines, field, value, colors);
        }
    }
}

fn push_text_field(lines: &mut Vec<Line<'static>>, field: PageField, value: &str, colors: &ColorConfig) {
    match field {
        PageField::Title => lines.push(Line::styled(
            clean_text(value),
            Style::default()
                .fg(colors.title)
                .add_modifier(Modifier::BOLD),
        )),
        PageField::Subtitle => lines.push(Line::styled(
            clean_text(value),
            Style::default()
                .fg(colors.subtitle)
                .add_modifier(Modifier::ITALIC),
        )),
        PageField::PullQuote => lines.push(Line::styled(
            format!("“{}”", clean_text(value)),
            Style::default()
                .fg(colors.pull_quote)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        )),
        PageField::Credits => lines.push(Line::styled(
            clean_text(value),
            Style::default().fg(colors.credits),
        )),
        PageField::ImageUrl => lines.push(Line::styled(
            format!("[image] {}", value.trim()),
            Style::default().fg(colors.link),
        )),
        PageField::VideoUrl => lines.push(Line::styled(
            format!("▶ {}", value.trim()),
            Style::default().fg(colors.link),
        )),
        PageField::LinkUrl => lines.push(Line::styled(
            format!("→ {}", value.trim()),
            Style::default().fg(colors.link),
        )),
        _ => {
            for (i, paragraph) in paragraphs(value).into_iter().enumerate() {
                if i > 0 {
                    lines.push(Line::from(""));
                }
                lines.push(Line::from(paragraph));
            }
        }
    }
}

/// Split body copy on paragraph and line-break tags or blank lines.
fn paragraphs(content: &str) -> Vec<String> {
    let marked = content
        .replace("</p>", "\n\n")
        .replace("<br>", "\n\n")
        .replace("<br/>", "\n\n")
        .replace("<br />", "\n\n");

    marked
        .split("\n\n")
        .map(clean_text)
        .filter(|p| !p.is_empty())
        .collect()
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let status = if let Some(ref msg) = app.status_message {
        msg.clone()
    } else {
        let arrow = match app.reader.direction() {
            reader::Direction::Forward => "→",
            reader::Direction::Backward => "←",
        };
        format!(
            "Page {}/{} {}  ←/→:Turn  t:Contents  f:Fullscreen  o:Open link  q:Quit",
            app.reader.current_page() + 1,
            app.reader.total_pages().max(1),
            arrow
        )
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}

fn render_contents(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    let area = centered_rect(60, 70, frame.area());

    let items: Vec<ListItem> = app
        .pages
        .iter()
        .map(|page| {
            ListItem::new(format!(
                "{:>3}  {:<11} {}",
                page.page_number,
                page.page_type,
                page.display_title()
            ))
        })
        .collect();

    let block = Block::default()
        .title(" Contents ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.accent));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(colors.selection_bg)
                .fg(colors.selection_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut app.contents_state);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IssueStatus, MagazineIssue, PageType, TocEntry};
    use crate::reader::MagazineReader;
    use crate::tui::event::Action;
    use ratatui::{backend::TestBackend, Terminal};

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn screen(app: &mut TuiApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|frame| render(frame, app, &ColorConfig::default()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app() -> TuiApp {
        let mut toc = MagazinePage::new("p1", 1, PageType::Toc);
        toc.title = Some("Inside".into());
        toc.toc_entries = Some(vec![TocEntry {
            title: "Night Drive".into(),
            page: 2,
        }]);
        let issue = MagazineIssue {
            id: "iss-1".into(),
            slug: "midnight".into(),
            title: "Midnight".into(),
            issue_number: Some(2),
            description: None,
            cover_image_url: None,
            status: IssueStatus::Published,
            published_at: None,
            pages: vec![toc],
        };
        let reader = MagazineReader::new("midnight", 1);
        TuiApp::new(issue, reader)
    }

    #[test]
    fn test_article_lines_follow_template_order() {
        let mut page = MagazinePage::new("a", 2, PageType::Article);
        page.title = Some("Night Drive".into());
        page.content = Some("<p>First &amp; loud.</p><p>Second.</p>".into());
        page.pull_quote = Some("Turn it up".into());
        page.video_url = Some("https://ignored.test".into());

        let text: Vec<String> = page_lines(&page, &ColorConfig::default())
            .iter()
            .map(line_text)
            .filter(|l| !l.is_empty())
            .collect();

        assert_eq!(text, ["Night Drive", "First & loud.", "Second.", "“Turn it up”"]);
    }

    #[test]
    fn test_every_template_renders_only_declared_fields() {
        for page_type in PageType::ALL {
            let mut page = MagazinePage::new("x", 1, page_type);
            page.title = Some("field:title".into());
            page.subtitle = Some("field:subtitle".into());
            page.content = Some("field:content".into());
            page.image_url = Some("field:image_url".into());
            page.video_url = Some("field:video_url".into());
            page.link_url = Some("field:link_url".into());
            page.pull_quote = Some("field:pull_quote".into());
            page.credits = Some("field:credits".into());

            let rendered: String = page_lines(&page, &ColorConfig::default())
                .iter()
                .map(line_text)
                .collect::<Vec<_>>()
                .join("\n");

            for field in PageField::ALL.into_iter().filter(|f| !f.is_list()) {
                let marker = format!("field:{}", field.key());
                assert_eq!(
                    rendered.contains(&marker),
                    page_type.allows(field),
                    "{} page, field {}",
                    page_type,
                    field
                );
            }
        }
    }

    #[test]
    fn test_empty_page_placeholder() {
        let page = MagazinePage::new("x", 5, PageType::Ad);
        let lines = page_lines(&page, &ColorConfig::default());
        assert_eq!(line_text(&lines[0]), "Empty ad page");
    }

    #[test]
    fn test_unknown_template_renders_placeholder() {
        let mut page = MagazinePage::new("x", 7, PageType::Unknown);
        page.title = Some("field:title".into());
        let lines = page_lines(&page, &ColorConfig::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(
            line_text(&lines[0]),
            "Page 7 uses a template this reader cannot display"
        );
    }

    #[test]
    fn test_cover_reveal_then_page() {
        let mut app = app();
        let cover = screen(&mut app);
        assert!(cover.contains("MIDNIGHT"));
        assert!(cover.contains("ISSUE 2"));

        app.handle_action(Action::NextPage);
        let page = screen(&mut app);
        assert!(page.contains("Night Drive"));
        assert!(page.contains("Page 1/1"));
    }

    #[test]
    fn test_fullscreen_hides_status_bar() {
        let mut app = app();
        app.handle_action(Action::NextPage);
        app.handle_action(Action::ToggleFullscreen);
        assert!(!screen(&mut app).contains("Page 1/1"));
    }
}
