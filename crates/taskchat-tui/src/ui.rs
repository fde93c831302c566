use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use taskchat_core::markup::{self, FormattedLine, Inline};
use taskchat_core::{ChatRole, ChatTurn, ConversationState};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use crate::app::App;

/// Bubbles take at most this share of the transcript width
const BUBBLE_WIDTH_PERCENT: usize = 70;
const MIN_BUBBLE_INNER: usize = 12;
const LIST_BULLET: &str = "  • ";

type StyledChar = (char, Style);

fn border_style(role: ChatRole) -> Style {
    match role {
        ChatRole::User => Style::default().fg(Color::Cyan),
        ChatRole::Assistant => Style::default().fg(Color::Yellow),
    }
}

fn inline_style(inline: &Inline) -> Style {
    match inline {
        Inline::Plain(_) => Style::default(),
        Inline::Bold(_) => Style::default().add_modifier(Modifier::BOLD),
        Inline::Code(_) => Style::default().fg(Color::LightMagenta).bg(Color::DarkGray),
    }
}

fn styled_chars(text: &str, style: Style) -> Vec<StyledChar> {
    text.chars().map(|c| (c, style)).collect()
}

fn inline_chars(spans: &[Inline]) -> Vec<StyledChar> {
    spans
        .iter()
        .flat_map(|span| styled_chars(span.text(), inline_style(span)))
        .collect()
}

fn formatted_line_chars(line: &FormattedLine) -> Vec<StyledChar> {
    match line {
        FormattedLine::Text(spans) => inline_chars(spans),
        FormattedLine::ListItem(spans) => {
            let mut chars = styled_chars(LIST_BULLET, Style::default().fg(Color::Yellow));
            chars.extend(inline_chars(spans));
            chars
        }
        FormattedLine::Blank => Vec::new(),
    }
}

/// Unwrapped bubble body: markup for the assistant, verbatim text for the user
fn turn_body(turn: &ChatTurn) -> Vec<Vec<StyledChar>> {
    match turn.role {
        ChatRole::User => turn
            .content
            .split('\n')
            .map(|line| styled_chars(line, Style::default()))
            .collect(),
        ChatRole::Assistant => markup::format(&turn.content)
            .iter()
            .map(formatted_line_chars)
            .collect(),
    }
}

fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

/// Terminal cells taken by a run of chars
fn cells(chars: &[StyledChar]) -> usize {
    chars.iter().map(|(c, _)| char_width(*c)).sum()
}

/// Wrap one line to `width` cells, preferring to break at the last space
fn wrap_chars(line: &[StyledChar], width: usize) -> Vec<Vec<StyledChar>> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut row: Vec<StyledChar> = Vec::new();
    let mut row_width = 0;

    for &(c, style) in line {
        let w = char_width(c);

        if row_width + w > width && !row.is_empty() {
            if c == ' ' {
                // A space at the edge is a clean break and is dropped
                rows.push(std::mem::take(&mut row));
                row_width = 0;
                continue;
            }

            match row.iter().rposition(|(c, _)| *c == ' ').filter(|&i| i > 0) {
                Some(i) => {
                    let rest = row.split_off(i + 1);
                    row.pop();
                    rows.push(std::mem::replace(&mut row, rest));
                    row_width = cells(&row);
                }
                None => {
                    rows.push(std::mem::take(&mut row));
                    row_width = 0;
                }
            }
        }

        row.push((c, style));
        row_width += w;
    }

    rows.push(row);
    rows
}

/// Merge runs of identically styled chars back into spans
fn to_spans(chars: &[StyledChar]) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    for &(c, style) in chars {
        match spans.last_mut() {
            Some(last) if last.style == style => last.content.to_mut().push(c),
            _ => spans.push(Span::styled(c.to_string(), style)),
        }
    }
    spans
}

/// Draw a rounded bubble, right-aligned for the user and left-aligned otherwise
fn bubble_lines(role: ChatRole, body: &[Vec<StyledChar>], chat_width: usize) -> Vec<Line<'static>> {
    let border = border_style(role);
    let title = format!(" {} ", role.display_name());
    let title_width = UnicodeWidthStr::width(title.as_str());

    let max_inner = (chat_width * BUBBLE_WIDTH_PERCENT / 100)
        .saturating_sub(4)
        .max(MIN_BUBBLE_INNER);
    let rows: Vec<Vec<StyledChar>> = body
        .iter()
        .flat_map(|line| wrap_chars(line, max_inner))
        .collect();
    let widest = rows.iter().map(|row| cells(row)).max().unwrap_or(0);
    let inner = widest.min(max_inner).max(title_width + 1);

    let indent = match role {
        ChatRole::User => " ".repeat(chat_width.saturating_sub(inner + 4)),
        ChatRole::Assistant => String::new(),
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);

    lines.push(Line::from(vec![
        Span::raw(indent.clone()),
        Span::styled("╭─", border),
        Span::styled(title, border.add_modifier(Modifier::BOLD)),
        Span::styled(format!("{}╮", "─".repeat(inner + 1 - title_width)), border),
    ]));

    for row in &rows {
        let mut spans = vec![Span::raw(indent.clone()), Span::styled("│ ", border)];
        spans.extend(to_spans(row));
        spans.push(Span::raw(" ".repeat(inner.saturating_sub(cells(row)))));
        spans.push(Span::styled(" │", border));
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(vec![
        Span::raw(indent),
        Span::styled(format!("╰{}╯", "─".repeat(inner + 2)), border),
    ]));

    lines
}

/// All transcript lines for a given width, including the pending placeholder
pub fn transcript_lines(state: &ConversationState, width: u16, animation_frame: u8) -> Vec<Line<'static>> {
    let width = width as usize;
    let mut lines = Vec::new();

    for turn in &state.turns {
        lines.extend(bubble_lines(turn.role, &turn_body(turn), width));
        lines.push(Line::default());
    }

    if state.pending {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((animation_frame as usize % 3) + 1);
        let thinking = styled_chars(
            &format!("Thinking{:<3}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        );
        lines.extend(bubble_lines(ChatRole::Assistant, &[thinking], width));
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let banner_height = if app.conversation.state().last_error.is_some() { 3 } else { 0 };

    // Main layout: header, error banner, transcript, input, footer
    let [header_area, banner_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(banner_height),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    if banner_height > 0 {
        render_error_banner(app, frame, banner_area);
    }
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" AI Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("Manage your tasks with natural language", Style::default().fg(Color::White)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_error_banner(app: &App, frame: &mut Frame, area: Rect) {
    let Some(error) = app.conversation.state().last_error.as_deref() else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Error (Ctrl-L to dismiss) ");

    let banner = Paragraph::new(error.to_string())
        .style(Style::default().fg(Color::Red))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(banner, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");
    let inner = block.inner(area);

    // Store area for mouse hit-testing
    app.chat_area = Some(area);

    let state = app.conversation.state();
    if state.turns.is_empty() && !state.pending {
        app.update_scroll_bounds(0, inner.height);

        let mut lines = vec![Line::default(); (inner.height.saturating_sub(2) / 2) as usize];
        lines.push(Line::from(Span::styled(
            "Start a conversation",
            Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            "Try: \"Add buy groceries with high priority\"",
            Style::default().fg(Color::DarkGray),
        )));

        let hint = Paragraph::new(lines).alignment(Alignment::Center).block(block);
        frame.render_widget(hint, area);
        return;
    }

    let lines = transcript_lines(state, inner.width, app.animation_frame);
    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    app.update_scroll_bounds(total_lines, inner.height);

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.scroll, 0));

    frame.render_widget(chat, area);
}

/// Horizontal scrolling for the input box, measured in terminal cells.
///
/// Returns the visible slice of `input` and the cursor column within it.
fn input_viewport(input: &str, cursor: usize, inner_width: usize) -> (String, u16) {
    let chars: Vec<char> = input.chars().collect();
    let cursor = cursor.min(chars.len());
    let width_between = |from: usize, to: usize| -> usize {
        chars[from..to].iter().map(|c| char_width(*c)).sum()
    };

    // Drop chars from the left until the cursor cell fits
    let mut offset = 0;
    while offset < cursor && width_between(offset, cursor) + 1 > inner_width {
        offset += 1;
    }

    let mut used = 0;
    let visible: String = chars[offset..]
        .iter()
        .take_while(|c| {
            used += char_width(**c);
            used <= inner_width
        })
        .collect();

    (visible, width_between(offset, cursor) as u16)
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let enabled = app.input_enabled();

    let (border_color, title) = if enabled {
        (Color::Yellow, " Message (Enter to send) ")
    } else {
        (Color::DarkGray, " Waiting for reply... ")
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = input_viewport(&app.input, app.cursor, inner_width);

    let input = if app.input.is_empty() && enabled {
        Paragraph::new(Span::styled(
            "Type a message...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let text_color = if enabled { Color::Cyan } else { Color::DarkGray };
        Paragraph::new(visible_text).style(Style::default().fg(text_color))
    };

    frame.render_widget(input.block(input_block), area);

    // Show cursor only while the input accepts text
    if enabled {
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let (mode_text, mode_style) = if app.conversation.is_pending() {
        (" WAITING ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        (" CHAT ", Style::default().bg(Color::Blue).fg(Color::White))
    };

    let mut hints = vec![
        Span::styled(mode_text, mode_style),
        Span::styled(" ", label_style),
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" ↑/↓ PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
    ];
    if app.conversation.state().last_error.is_some() {
        hints.extend(vec![
            Span::styled(" Ctrl-L ", key_style),
            Span::styled(" dismiss ", label_style),
        ]);
    }
    hints.extend(vec![
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    let footer = Paragraph::new(Line::from(hints)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
