//! Rendering for the splash and main screens.

use ratatui::layout::Flex;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};

use crate::app::{App, BannerState, Screen};

const PANEL_WIDTH: u16 = 56;
const PANEL_HEIGHT: u16 = 9;

pub fn draw(frame: &mut Frame, app: &App) {
    match app.screen() {
        Screen::Splash => draw_splash(frame, app),
        Screen::Main => draw_main(frame, app),
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [panel] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    panel
}

fn banner_line(banner: &BannerState) -> Line<'static> {
    match banner {
        BannerState::Disabled => Line::from("no banner configured").dark_gray(),
        BannerState::Loading { url } => Line::from(format!("downloading {url}")).yellow(),
        BannerState::Ready { format, bytes } => {
            Line::from(format!("banner ready: {format}, {bytes} bytes")).green()
        }
        BannerState::NotLoaded(reason) => Line::from(format!("banner {reason}")).red(),
    }
}

fn draw_splash(frame: &mut Frame, app: &App) {
    let panel = centered(frame.area(), PANEL_WIDTH, PANEL_HEIGHT);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" splash ")
        .title_alignment(Alignment::Center);
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    let [title, status, gauge, _, prompt] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    frame.render_widget(
        Paragraph::new(Line::from(concat!("splash v", env!("CARGO_PKG_VERSION")).bold()))
            .alignment(Alignment::Center),
        title,
    );
    frame.render_widget(
        Paragraph::new(banner_line(app.banner())).alignment(Alignment::Center),
        status,
    );

    let label = if app.is_counting() {
        format!("{:.0}%", app.progress() * 100.0)
    } else {
        "paused".to_string()
    };
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(app.progress())
            .label(label),
        gauge,
    );

    frame.render_widget(
        Paragraph::new("Press any key to continue...")
            .dark_gray()
            .alignment(Alignment::Center),
        prompt,
    );
}

fn draw_main(frame: &mut Frame, app: &App) {
    let panel = centered(frame.area(), PANEL_WIDTH, 5);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" main ");

    let text = vec![
        Line::from("Welcome to the main screen.").bold(),
        banner_line(app.banner()),
        Line::from("q / Esc to quit").dark_gray(),
    ];
    frame.render_widget(
        Paragraph::new(text).block(block).alignment(Alignment::Center),
        panel,
    );
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use ratatui::buffer::Cell;
    use ratatui::{Terminal, backend::TestBackend};
    use splash_config::SplashSettings;

    use super::draw;
    use crate::app::App;

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .iter()
            .map(Cell::symbol)
            .collect()
    }

    fn app() -> App {
        App::new(&SplashSettings {
            duration: Duration::from_millis(2500),
            fetch: None,
        })
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn splash_shows_prompt_and_banner_state() {
        let mut app = app();
        app.start();
        let screen = render(&app);
        assert!(screen.contains("Press any key to continue..."));
        assert!(screen.contains("no banner configured"));
    }

    #[tokio::test(start_paused = true)]
    async fn main_screen_after_dismiss() {
        let mut app = app();
        app.start();
        app.handle_event(Event::Key(KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::NONE,
        )));
        let screen = render(&app);
        assert!(screen.contains("Welcome to the main screen."));
        assert!(!screen.contains("Press any key"));
    }
}
