use chatbox::core::message::{Message, MessageStatus};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::app::App;

const BANNER: &str = "Build your own ChatGPT3!";
const BOT_MARKER: &str = "[~] ";
/// The input box grows with the draft up to this many rows.
const MAX_INPUT_ROWS: u16 = 5;

pub fn render(app: &mut App, frame: &mut Frame) {
    let input_rows =
        draft_rows(app.chat().draft()).clamp(1, MAX_INPUT_ROWS as usize) as u16;
    let [list_area, input_area, footer_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(input_rows + 2),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_messages(app, frame, list_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_messages(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::bordered().title(" Chat ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.chat().messages().is_empty() {
        render_empty_state(frame, inner);
        return;
    }

    let lines = message_lines(
        app.chat().messages(),
        &app.identity().avatar_glyph(),
        inner.width,
    );
    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let max_scroll = total.saturating_sub(inner.height);
    let scroll = if app.take_scroll_to_bottom() {
        max_scroll
    } else {
        app.scroll().min(max_scroll)
    };
    app.set_scroll(scroll);

    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

fn render_empty_state(frame: &mut Frame, area: Rect) {
    let [_, center, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(area);
    let text = vec![
        Line::from(BANNER.bold()),
        Line::from("Type a message and press Enter".dark_gray()),
    ];
    frame.render_widget(Paragraph::new(text).centered(), center);
}

fn message_lines(
    messages: &[Message],
    avatar_glyph: &str,
    width: u16,
) -> Vec<Line<'static>> {
    let user_marker = if avatar_glyph.is_empty() {
        "[ ] ".to_owned()
    } else {
        format!("[{avatar_glyph}] ")
    };
    let gutter = BOT_MARKER.chars().count();
    let text_width = (width as usize).saturating_sub(gutter).max(1);

    let mut lines = Vec::new();
    for (index, message) in messages.iter().enumerate() {
        if index > 0 {
            lines.push(Line::default());
        }

        let (marker, marker_style) = if message.is_user_message() {
            (user_marker.clone(), Style::new().fg(Color::Cyan).bold())
        } else {
            (BOT_MARKER.to_owned(), Style::new().fg(Color::Green).bold())
        };
        let text_style = match message.status() {
            MessageStatus::Complete => Style::new(),
            MessageStatus::Pending => {
                Style::new().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
            }
            MessageStatus::Failed => Style::new().fg(Color::Red),
        };

        let text = message.display_text();
        let mut wrapped = textwrap::wrap(&text, text_width).into_iter();
        let first = wrapped.next().map(|line| line.into_owned()).unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(marker, marker_style),
            Span::styled(first, text_style),
        ]));
        for line in wrapped {
            lines.push(Line::from(vec![
                Span::raw(" ".repeat(gutter)),
                Span::styled(line.into_owned(), text_style),
            ]));
        }
    }
    lines
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::bordered().title(" Message ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let draft = app.chat().draft();
    let before_cursor: String = draft.chars().take(app.cursor()).collect();
    let cursor_row =
        u16::try_from(before_cursor.matches('\n').count()).unwrap_or(u16::MAX);
    let cursor_col = before_cursor
        .rsplit('\n')
        .next()
        .map_or(0, |line| line.chars().count());
    let cursor_col = u16::try_from(cursor_col).unwrap_or(u16::MAX);
    // Scroll both ways so that the cursor stays inside the box.
    let scroll_y = cursor_row.saturating_sub(inner.height.saturating_sub(1));
    let scroll_x = cursor_col.saturating_sub(inner.width.saturating_sub(1));

    if draft.is_empty() {
        frame.render_widget(
            Paragraph::new("Type a message...".dark_gray()),
            inner,
        );
    } else {
        let lines: Vec<Line<'_>> = draft.split('\n').map(Line::raw).collect();
        frame.render_widget(
            Paragraph::new(lines).scroll((scroll_y, scroll_x)),
            inner,
        );
    }

    let x = inner.x.saturating_add(cursor_col - scroll_x);
    let y = inner.y.saturating_add(cursor_row - scroll_y);
    frame.set_cursor_position(Position::new(x, y));
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = Paragraph::new(
        " Enter send · Shift+Enter newline · Ctrl+L clear · Esc quit",
    )
    .dark_gray();

    let pending = app.chat().controller().pending_count();
    if pending == 0 {
        frame.render_widget(hints, area);
        return;
    }

    // The indicator keeps its room, the hints get cut instead.
    let noun = if pending == 1 { "reply" } else { "replies" };
    let indicator = format!("waiting for {pending} {noun} ");
    let indicator_width =
        u16::try_from(indicator.chars().count()).unwrap_or(u16::MAX);
    let [hints_area, indicator_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(indicator_width),
    ])
    .areas(area);
    frame.render_widget(hints, hints_area);
    frame.render_widget(
        Paragraph::new(Span::styled(indicator, Style::new().fg(Color::Yellow)))
            .right_aligned(),
        indicator_area,
    );
}

fn draft_rows(draft: &str) -> usize {
    draft.split('\n').count()
}

#[cfg(test)]
mod tests {
    use chatbox::core::ChatBuilder;
    use chatbox::core::identity::UserIdentity;
    use chatbox_test_model::{PresetFailure, PresetReply, TestCompletionProvider};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;

    fn app_with(provider: TestCompletionProvider) -> App {
        let chat = ChatBuilder::with_completion_provider(provider).build();
        App::new(chat, UserIdentity::new(Some("Ada".to_owned())))
    }

    fn draw(terminal: &mut Terminal<TestBackend>, app: &mut App) -> String {
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn send(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    }

    #[tokio::test]
    async fn test_empty_state() {
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        let mut app = app_with(TestCompletionProvider::default());

        let screen = draw(&mut terminal, &mut app);
        assert!(screen.contains(BANNER));
        assert!(screen.contains("Type a message..."));
        assert!(!screen.contains("waiting for"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_then_resolved() {
        let mut provider = TestCompletionProvider::default();
        provider.add_reply("hello", PresetReply::with_text("  hi there\n"));
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        let mut app = app_with(provider);

        send(&mut app, "hello");
        let screen = draw(&mut terminal, &mut app);
        assert!(!screen.contains(BANNER));
        assert!(screen.contains("[A] hello"));
        assert!(screen.contains("[~] Loading..."));
        assert!(screen.contains("waiting for 1 reply"));

        app.chat_mut().settle().await;
        let screen = draw(&mut terminal, &mut app);
        assert!(screen.contains("[~] hi there"));
        assert!(!screen.contains("Loading..."));
        assert!(!screen.contains("waiting for"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reply_is_highlighted() {
        let mut provider = TestCompletionProvider::default();
        provider.add_reply("hello", PresetReply::failing(PresetFailure::Timeout));
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        let mut app = app_with(provider);

        send(&mut app, "hello");
        app.chat_mut().settle().await;
        let screen = draw(&mut terminal, &mut app);
        assert!(screen.contains("Something went wrong."));

        let buffer = terminal.backend().buffer();
        let failed_row = (0..buffer.area.height)
            .find(|&y| buffer[(1, y)].symbol() == "[" && buffer[(5, y)].symbol() == "S")
            .unwrap();
        assert_eq!(buffer[(5, failed_row)].fg, Color::Red);
    }

    #[tokio::test]
    async fn test_list_sticks_to_bottom() {
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        let mut app = app_with(TestCompletionProvider::default());

        for n in 0..12 {
            send(&mut app, &format!("msg {n}"));
        }
        let screen = draw(&mut terminal, &mut app);
        assert!(screen.contains("msg 11"));
        assert!(!screen.contains("msg 0"));
        let bottom = app.scroll();
        assert!(bottom > 0);

        app.handle_key(KeyEvent::new(KeyCode::PageUp, KeyModifiers::NONE));
        draw(&mut terminal, &mut app);
        assert!(app.scroll() < bottom);

        // Scrolling past the end is clamped.
        app.set_scroll(u16::MAX);
        draw(&mut terminal, &mut app);
        assert_eq!(app.scroll(), bottom);
    }

    #[tokio::test]
    async fn test_input_grows_with_draft() {
        let mut terminal = Terminal::new(TestBackend::new(40, 16)).unwrap();
        let mut app = app_with(TestCompletionProvider::default());
        let newline = KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT);

        for n in 0..7 {
            if n > 0 {
                app.handle_key(newline);
            }
            app.handle_key(KeyEvent::new(
                KeyCode::Char(char::from(b'a' + n)),
                KeyModifiers::NONE,
            ));
        }
        let screen = draw(&mut terminal, &mut app);
        let rows: Vec<&str> = screen.lines().collect();
        // Only the last five draft lines fit, following the cursor.
        assert!(rows.iter().any(|row| row.starts_with("│g")));
        assert!(rows.iter().any(|row| row.starts_with("│c")));
        assert!(!rows.iter().any(|row| row.starts_with("│b")));
        assert_eq!(terminal.get_cursor_position().unwrap().x, 2);
    }

    #[tokio::test]
    async fn test_input_follows_cursor_on_long_lines() {
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        let mut app = app_with(TestCompletionProvider::default());
        let text = "0123456789".repeat(6);

        for c in text.chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        let screen = draw(&mut terminal, &mut app);
        // 38 columns inside the borders, the last one holds the cursor.
        assert!(screen.contains(&format!("│{}", &text[23..])));
        assert_eq!(terminal.get_cursor_position().unwrap().x, 38);

        app.handle_key(KeyEvent::new(KeyCode::Home, KeyModifiers::NONE));
        let screen = draw(&mut terminal, &mut app);
        assert!(screen.contains(&format!("│{}", &text[..38])));
        assert_eq!(terminal.get_cursor_position().unwrap().x, 1);
    }

    #[tokio::test]
    async fn test_footer_keeps_indicator_on_narrow_terminals() {
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        let mut app = app_with(TestCompletionProvider::default());

        send(&mut app, "one");
        send(&mut app, "two");
        let screen = draw(&mut terminal, &mut app);
        let footer = screen.lines().last().unwrap();
        assert!(footer.ends_with("waiting for 2 replies "));
        assert!(footer.starts_with(" Enter send"));
    }
}
