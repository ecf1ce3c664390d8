use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use crate::app::App;
use crate::controller::Phase;
use crate::message::{Message, Role, Strings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleKind {
    User,
    Bot,
    Typing,
}

/// View record for one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub meta: &'static str,
    pub text: String,
    pub kind: BubbleKind,
}

/// Project the message sequence onto bubbles, one per message, in order
pub fn bubbles(messages: &[Message], placeholder: Option<usize>, strings: &Strings) -> Vec<Bubble> {
    messages
        .iter()
        .enumerate()
        .map(|(idx, msg)| {
            let kind = match msg.role {
                Role::User => BubbleKind::User,
                Role::Bot if placeholder == Some(idx) => BubbleKind::Typing,
                Role::Bot => BubbleKind::Bot,
            };
            Bubble {
                meta: strings.label(msg.role),
                text: msg.text.clone(),
                kind,
            }
        })
        .collect()
}

/// Split a line into alternating runs of whitespace and non-whitespace
fn whitespace_runs(s: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut prev: Option<bool> = None;

    for (i, c) in s.char_indices() {
        let is_space = c.is_whitespace();
        if prev.is_some_and(|p| p != is_space) {
            runs.push(&s[start..i]);
            start = i;
        }
        prev = Some(is_space);
    }
    if start < s.len() {
        runs.push(&s[start..]);
    }

    runs
}

/// Wrap text to fit within `width` terminal columns, returning multiple lines.
/// Breaks on word boundaries and keeps explicit newlines, indentation and
/// inner runs of spaces; only the whitespace at a break is dropped. Words
/// wider than the line are split on their own.
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        // Terminals render tabs inconsistently
        let paragraph = paragraph.trim_end_matches('\r').replace('\t', "    ");
        let mut current_line = String::new();
        let mut current_width = 0;

        for run in whitespace_runs(&paragraph) {
            let run_width = run.width();

            if current_width + run_width <= width {
                current_line.push_str(run);
                current_width += run_width;
                continue;
            }

            if current_width > 0 {
                let trimmed_len = current_line.trim_end().len();
                current_line.truncate(trimmed_len);
                // Indentation alone is not worth a line of its own
                if !current_line.is_empty() {
                    lines.push(std::mem::take(&mut current_line));
                }
                current_width = 0;
            }

            if run.starts_with(char::is_whitespace) {
                continue;
            }

            if run_width <= width {
                current_line.push_str(run);
                current_width = run_width;
            } else {
                // Hard-split words that can never fit
                for c in run.chars() {
                    let char_width = c.width().unwrap_or(0);
                    if current_width + char_width > width && !current_line.is_empty() {
                        lines.push(std::mem::take(&mut current_line));
                        current_width = 0;
                    }
                    current_line.push(c);
                    current_width += char_width;
                }
            }
        }

        // Blank paragraphs still take a line
        lines.push(current_line);
    }

    lines
}

/// Visible slice of the input line and the cursor column inside it, both in
/// terminal columns so wide characters keep the cursor on the caret.
fn input_viewport(text: &str, cursor: usize, inner_width: usize) -> (String, usize) {
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());
    let char_width = |c: &char| c.width().unwrap_or(0);

    let mut start = 0;
    let mut cursor_col: usize = chars[..cursor].iter().map(char_width).sum();
    while cursor_col >= inner_width && start < cursor {
        cursor_col -= char_width(&chars[start]);
        start += 1;
    }

    let mut visible = String::new();
    let mut used = 0;
    for c in &chars[start..] {
        let w = char_width(c);
        if used + w > inner_width {
            break;
        }
        visible.push(*c);
        used += w;
    }

    (visible, cursor_col)
}

/// Typing text with an animated ellipsis: cycles through ".", "..", "..."
fn typing_text(text: &str, frame: u8) -> String {
    format!("{}{}", text.trim_end_matches('.'), ".".repeat(frame as usize + 1))
}

/// Lay bubbles out as terminal lines for a chat area `width` columns wide
fn bubble_lines(bubbles: &[Bubble], width: usize, animation_frame: u8) -> Vec<Line<'static>> {
    // Bubbles take at most 80% of the row, like chat apps do
    let text_width = (width * 4 / 5).max(1);
    let mut lines = Vec::new();

    for bubble in bubbles {
        let (alignment, meta_color, text_style) = match bubble.kind {
            BubbleKind::User => (Alignment::Right, Color::Cyan, Style::default().fg(Color::Cyan)),
            BubbleKind::Bot => (Alignment::Left, Color::Yellow, Style::default()),
            BubbleKind::Typing => (
                Alignment::Left,
                Color::Yellow,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        };

        lines.push(
            Line::from(Span::styled(
                bubble.meta,
                Style::default().fg(meta_color).add_modifier(Modifier::BOLD),
            ))
            .alignment(alignment),
        );

        let text = if bubble.kind == BubbleKind::Typing {
            typing_text(&bubble.text, animation_frame)
        } else {
            bubble.text.clone()
        };
        for wrapped in wrap_text_to_width(&text, text_width) {
            lines.push(Line::from(Span::styled(wrapped, text_style)).alignment(alignment));
        }
        lines.push(Line::default());
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status_color = match app.chat.phase() {
        Phase::Idle => Color::Green,
        Phase::Sending => Color::Yellow,
    };

    let title = Line::from(vec![
        Span::styled(" Chatbot ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("● {} ", app.chat.status_label()), Style::default().fg(status_color)),
        Span::styled(app.client.endpoint(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    let border_color = if app.chat.input_focused() { Color::DarkGray } else { Color::Cyan };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2);

    let text = if app.chat.messages().is_empty() {
        app.update_scroll_bounds(0, inner_height);
        let hint = app.chat.strings().empty_hint;
        Text::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
    } else {
        let bubbles = bubbles(app.chat.messages(), app.chat.placeholder_index(), app.chat.strings());
        let lines = bubble_lines(&bubbles, inner_width, app.animation_frame);
        let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        app.update_scroll_bounds(total, inner_height);
        Text::from(lines)
    };

    let chat = Paragraph::new(text)
        .block(block)
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.chat.input_focused();
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };

    let title = if app.chat.send_enabled() {
        format!(" {} ", app.chat.strings().input_title)
    } else {
        format!(" {} ({}) ", app.chat.strings().input_title, app.chat.status_label())
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_col) =
        input_viewport(app.chat.input.text(), app.chat.input.cursor(), inner_width);

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    if focused && inner_width > 0 {
        let cursor_x = cursor_col.min(inner_width - 1) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let disabled_style = Style::default().bg(Color::Black).fg(Color::DarkGray);

    let hints = if app.chat.input_focused() {
        let send_style = if app.chat.send_enabled() { label_style } else { disabled_style };
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", send_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" history ", label_style),
            Span::styled(" PgUp/PgDn ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" ^L ", key_style),
            Span::styled(" clear ", label_style),
            Span::styled(" ^C ", key_style),
            Span::styled(" quit ", label_style),
        ]
    } else {
        vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" g/G ", key_style),
            Span::styled(" top/bottom ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" c ", key_style),
            Span::styled(" clear ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ]
    };

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}
