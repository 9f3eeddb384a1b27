use std::collections::HashMap;
use std::io;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyCode, KeyEvent,
    KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use tokio::time::MissedTickBehavior;

use coder_core::config::Config;
use coder_core::{
    ClientAction, ClientState, CoderEffect, FocusPane, IngestFlow, IngestStatus, InputField,
    LogLevel, LogSource, MessageId, NoticeKind, RuntimeAction, Sender, UserAction,
};
use coder_exec::{HttpBackend, Session};

use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

const FALLBACK_THEME: &str = "base16-ocean.dark";
const SPINNER_TICK: Duration = Duration::from_millis(100);
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

fn get_syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn get_theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableBracketedPaste,
            crossterm::cursor::Show
        );
    }
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let backend = Arc::new(HttpBackend::new(&config.backend)?);
    let session = Session::new(ClientState::new(config), backend);

    enable_raw_mode()?;
    let _guard = TuiGuard; // Ensures terminal is restored on exit or panic
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        crossterm::cursor::Hide
    )?;

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    run_app(&mut terminal, session).await
}

enum Wake {
    Settled(Option<ClientAction>),
    Terminal(Option<io::Result<Event>>),
    Tick,
}

#[derive(Debug, PartialEq)]
enum KeyOutcome {
    Actions(Vec<UserAction>),
    Exit,
}

/// Per-run render state that is not part of `ClientState`.
#[derive(Default)]
struct View {
    tick: usize,
    highlighted: HashMap<MessageId, Vec<Line<'static>>>,
    clipboard: Option<arboard::Clipboard>,
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut session: Session<HttpBackend>,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(SPINNER_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut view = View::default();
    let mut dirty = true;
    tracing::info!(base_url = session.state().base_url(), "terminal UI started");

    loop {
        if dirty {
            terminal.draw(|f| ui(f, session.state(), &mut view))?;
            dirty = false;
        }

        let wake = tokio::select! {
            action = session.next_action() => Wake::Settled(action),
            event = events.next() => Wake::Terminal(event),
            _ = ticker.tick() => Wake::Tick,
        };

        let effects = match wake {
            Wake::Settled(Some(action)) => session.apply(action),
            Wake::Settled(None) | Wake::Terminal(None) => break,
            Wake::Terminal(Some(Err(err))) => return Err(err.into()),
            Wake::Terminal(Some(Ok(event))) => {
                dirty = true;
                match map_event(&event, session.state()) {
                    KeyOutcome::Exit => break,
                    KeyOutcome::Actions(actions) => actions
                        .into_iter()
                        .flat_map(|action| session.user(action))
                        .collect(),
                }
            }
            Wake::Tick => {
                view.tick = view.tick.wrapping_add(1);
                dirty |= is_waiting(session.state());
                Vec::new()
            }
        };

        for effect in effects {
            match effect {
                CoderEffect::CopyToClipboard(text) => {
                    if let Err(message) = copy_to_clipboard(&mut view, text) {
                        session.apply(ClientAction::Runtime(RuntimeAction::AppendLog {
                            level: LogLevel::Warn,
                            source: LogSource::Client,
                            message,
                        }));
                    }
                    dirty = true;
                }
                CoderEffect::RequestFrame => dirty = true,
                _ => {}
            }
        }
    }

    tracing::info!(
        outstanding = session.outstanding(),
        "terminal UI closed"
    );
    Ok(())
}

fn is_waiting(state: &ClientState) -> bool {
    state.conversation.in_flight
        || [IngestFlow::Text, IngestFlow::File]
            .into_iter()
            .any(|flow| state.ingestion.status(flow).is_in_progress())
}

fn copy_to_clipboard(view: &mut View, text: String) -> Result<(), String> {
    if view.clipboard.is_none() {
        let clipboard = arboard::Clipboard::new()
            .map_err(|err| format!("clipboard unavailable: {err}"))?;
        view.clipboard = Some(clipboard);
    }
    match view.clipboard.as_mut() {
        Some(clipboard) => clipboard
            .set_text(text)
            .map_err(|err| format!("copy failed: {err}")),
        None => Err("clipboard unavailable".to_string()),
    }
}

fn map_event(event: &Event, state: &ClientState) -> KeyOutcome {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => map_key(*key, state),
        Event::Paste(text) => {
            let actions = match state.interaction.focus.input_field() {
                Some(InputField::IngestText) => vec![UserAction::InputPaste {
                    field: InputField::IngestText,
                    text: text.clone(),
                }],
                // Single-line fields.
                Some(field) => vec![UserAction::InputPaste {
                    field,
                    text: text.replace(['\r', '\n'], " "),
                }],
                None => Vec::new(),
            };
            KeyOutcome::Actions(actions)
        }
        _ => KeyOutcome::Actions(Vec::new()),
    }
}

fn map_key(key: KeyEvent, state: &ClientState) -> KeyOutcome {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let focus = state.interaction.focus;

    let actions = match key.code {
        KeyCode::Char('c') if ctrl => return KeyOutcome::Exit,
        KeyCode::Char('l') if ctrl && state.interaction.show_activity => {
            vec![UserAction::ClearActivity]
        }
        KeyCode::Char('s') if ctrl => match focus {
            FocusPane::IngestText => vec![UserAction::SubmitIngestText],
            FocusPane::FilePath => vec![
                UserAction::SelectFileFromInput,
                UserAction::SubmitIngestFile,
            ],
            FocusPane::Query | FocusPane::History => Vec::new(),
        },
        KeyCode::Tab => vec![UserAction::FocusNext],
        KeyCode::BackTab => vec![UserAction::FocusPrev],
        KeyCode::F(2) => vec![UserAction::ToggleActivity],
        KeyCode::Esc => vec![UserAction::DismissNotice],
        _ => match focus.input_field() {
            Some(field) => map_input_key(key, field, ctrl),
            None => map_history_key(key),
        },
    };
    KeyOutcome::Actions(actions)
}

fn map_input_key(key: KeyEvent, field: InputField, ctrl: bool) -> Vec<UserAction> {
    match key.code {
        KeyCode::Enter => match field {
            InputField::IngestText => vec![UserAction::InputChar { field, ch: '\n' }],
            InputField::FilePath => vec![UserAction::SelectFileFromInput],
            InputField::Query => vec![UserAction::SubmitQuery],
        },
        KeyCode::Backspace => vec![UserAction::InputBackspace { field }],
        KeyCode::Char(ch) if !ctrl => vec![UserAction::InputChar { field, ch }],
        _ => Vec::new(),
    }
}

fn map_history_key(key: KeyEvent) -> Vec<UserAction> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => vec![UserAction::SelectPrevAnswer],
        KeyCode::Down | KeyCode::Char('j') => vec![UserAction::SelectNextAnswer],
        KeyCode::Char('+') | KeyCode::Char('=') => vec![UserAction::RateSelected { upvoted: true }],
        KeyCode::Char('-') => vec![UserAction::RateSelected { upvoted: false }],
        KeyCode::Char('y') => vec![UserAction::CopySelected],
        _ => Vec::new(),
    }
}

#[derive(Clone, Copy)]
struct UiPalette {
    text: Color,
    muted: Color,
    accent: Color,
    accent_alt: Color,
    border: Color,
    focus_border: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

const PALETTE: UiPalette = UiPalette {
    text: Color::Rgb(220, 223, 228),
    muted: Color::Rgb(120, 128, 140),
    accent: Color::Rgb(222, 165, 132),
    accent_alt: Color::Rgb(152, 195, 121),
    border: Color::Rgb(70, 76, 88),
    focus_border: Color::Rgb(229, 192, 123),
    success: Color::Rgb(152, 195, 121),
    warning: Color::Rgb(229, 192, 123),
    danger: Color::Rgb(224, 108, 117),
};

fn spinner(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

fn card_block(title: String, focused: bool, palette: UiPalette) -> Block<'static> {
    let border = if focused {
        palette.focus_border
    } else {
        palette.border
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            title,
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ))
}

fn with_cursor(text: &str, focused: bool) -> String {
    if focused {
        format!("{text}▏")
    } else {
        text.to_string()
    }
}

fn ui(f: &mut Frame, state: &ClientState, view: &mut View) {
    let palette = PALETTE;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, rows[0], state, palette);
    if state.interaction.show_activity {
        render_activity(f, rows[1], state, palette);
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[1]);
        let cards = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(6)])
            .split(columns[0]);
        let conversation = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(columns[1]);

        render_text_card(f, cards[0], state, view.tick, palette);
        render_file_card(f, cards[1], state, view.tick, palette);
        render_history(f, conversation[0], state, view, palette);
        render_query_input(f, conversation[1], state, view.tick, palette);
    }
    render_key_hints(f, rows[2], state, palette);

    if let Some(notice) = &state.interaction.notice {
        let color = match notice.kind {
            NoticeKind::Info => palette.success,
            NoticeKind::Error => palette.danger,
        };
        let area = centered_rect(40, 20, f.area());
        let text = vec![
            Line::from(Span::styled(
                notice.message.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(Span::styled(
                "Esc to dismiss",
                Style::default().fg(palette.muted),
            )),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
    }
}

fn render_header(f: &mut Frame, area: Rect, state: &ClientState, palette: UiPalette) {
    let line = Line::from(vec![
        Span::styled(
            "Rust Coder",
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  backend ", Style::default().fg(palette.muted)),
        Span::styled(state.base_url().to_string(), Style::default().fg(palette.text)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn status_line(status: &IngestStatus, flow: IngestFlow, tick: usize, palette: UiPalette) -> Line<'static> {
    let message = status.message(flow);
    match status {
        IngestStatus::Idle => Line::default(),
        IngestStatus::InProgress { .. } => Line::from(vec![
            Span::styled(format!("{} ", spinner(tick)), Style::default().fg(palette.warning)),
            Span::styled(message, Style::default().fg(palette.warning)),
        ]),
        IngestStatus::Succeeded => {
            Line::from(Span::styled(message, Style::default().fg(palette.success)))
        }
        IngestStatus::Rejected(_) | IngestStatus::Failed => {
            Line::from(Span::styled(message, Style::default().fg(palette.danger)))
        }
    }
}

fn render_text_card(f: &mut Frame, area: Rect, state: &ClientState, tick: usize, palette: UiPalette) {
    let focused = state.interaction.focus == FocusPane::IngestText;
    let block = card_block(FocusPane::IngestText.label().to_string(), focused, palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let buffer = &state.ingestion.text_buffer;
    let body = if buffer.is_empty() && !focused {
        Paragraph::new(Span::styled(
            "Paste documentation or notes to add to the knowledge base.",
            Style::default().fg(palette.muted),
        ))
    } else {
        Paragraph::new(with_cursor(buffer, focused)).style(Style::default().fg(palette.text))
    };
    f.render_widget(body.wrap(Wrap { trim: false }), parts[0]);

    let status = state.ingestion.status(IngestFlow::Text);
    f.render_widget(
        Paragraph::new(status_line(status, IngestFlow::Text, tick, palette)),
        parts[1],
    );
}

fn render_file_card(f: &mut Frame, area: Rect, state: &ClientState, tick: usize, palette: UiPalette) {
    let focused = state.interaction.focus == FocusPane::FilePath;
    let block = card_block(FocusPane::FilePath.label().to_string(), focused, palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let ingestion = &state.ingestion;
    let selected = match &ingestion.pending_file {
        Some(file) => Line::from(vec![
            Span::styled("Selected: ", Style::default().fg(palette.muted)),
            Span::styled(file.name.clone(), Style::default().fg(palette.accent_alt)),
        ]),
        None => Line::from(Span::styled(
            "No file selected",
            Style::default().fg(palette.muted),
        )),
    };
    let lines = vec![
        Line::from(vec![
            Span::styled("Path: ", Style::default().fg(palette.muted)),
            Span::styled(
                with_cursor(&ingestion.file_path_input, focused),
                Style::default().fg(palette.text),
            ),
        ]),
        selected,
        Line::default(),
        status_line(ingestion.status(IngestFlow::File), IngestFlow::File, tick, palette),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

/// Assistant code rendered with the configured syntect theme, indented two columns.
fn highlight_code(code: &str, theme_name: &str, palette: UiPalette) -> Vec<Line<'static>> {
    let ps = get_syntax_set();
    let ts = get_theme_set();
    let Some(theme) = ts
        .themes
        .get(theme_name)
        .or_else(|| ts.themes.get(FALLBACK_THEME))
    else {
        return plain_lines(code, Style::default().fg(palette.text));
    };
    let syntax = ps
        .find_syntax_by_token("rust")
        .unwrap_or_else(|| ps.find_syntax_plain_text());
    let mut h = HighlightLines::new(syntax, theme);

    let mut lines = Vec::new();
    for raw in LinesWithEndings::from(code) {
        let ranges = h.highlight_line(raw, ps).unwrap_or_default();
        let mut spans = vec![Span::raw("  ")];
        for (style, text) in ranges {
            let text = text.trim_end_matches(['\r', '\n']);
            if text.is_empty() {
                continue;
            }
            let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
            spans.push(Span::styled(text.to_string(), Style::default().fg(fg)));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn plain_lines(text: &str, style: Style) -> Vec<Line<'static>> {
    text.lines()
        .map(|line| Line::from(Span::styled(format!("  {line}"), style)))
        .collect()
}

/// Returns the history lines and the line index where the selected answer starts.
fn history_lines(
    state: &ClientState,
    view: &mut View,
    palette: UiPalette,
) -> (Vec<Line<'static>>, Option<usize>) {
    let mut lines = Vec::new();
    let mut selected_start = None;

    for message in state.conversation.history() {
        let selected = state.interaction.selected_answer == Some(message.id);
        if selected {
            selected_start = Some(lines.len());
        }
        let marker = if selected { "▶ " } else { "  " };
        let color = match message.sender {
            Sender::User => palette.accent,
            Sender::Assistant => palette.accent_alt,
        };
        let mut header = vec![Span::styled(
            format!("{marker}{}", message.sender.label()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )];
        if selected {
            header.push(Span::styled(
                "  + / - rate  y copy",
                Style::default().fg(palette.muted),
            ));
        }
        lines.push(Line::from(header));

        match message.sender {
            Sender::User => {
                lines.extend(plain_lines(&message.text, Style::default().fg(palette.text)))
            }
            Sender::Assistant if message.is_rateable() => {
                let theme = &state.config.ui.syntax_theme;
                let code = view
                    .highlighted
                    .entry(message.id)
                    .or_insert_with(|| highlight_code(&message.text, theme, palette));
                lines.extend(code.iter().cloned());
            }
            Sender::Assistant => {
                lines.extend(plain_lines(&message.text, Style::default().fg(palette.danger)))
            }
        }
        lines.push(Line::default());
    }

    (lines, selected_start)
}

fn render_history(
    f: &mut Frame,
    area: Rect,
    state: &ClientState,
    view: &mut View,
    palette: UiPalette,
) {
    let focused = state.interaction.focus == FocusPane::History;
    let block = card_block(FocusPane::History.label().to_string(), focused, palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if state.conversation.history().is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "Ask a question to generate Rust code.",
                Style::default().fg(palette.muted),
            )),
            inner,
        );
        return;
    }

    let (lines, selected_start) = history_lines(state, view, palette);
    let height = usize::from(inner.height);
    let bottom = lines.len().saturating_sub(height);
    let scroll = selected_start.map_or(bottom, |start| start.min(bottom));
    let scroll = u16::try_from(scroll).unwrap_or(u16::MAX);
    f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

fn render_query_input(
    f: &mut Frame,
    area: Rect,
    state: &ClientState,
    tick: usize,
    palette: UiPalette,
) {
    let focused = state.interaction.focus == FocusPane::Query;
    let conversation = &state.conversation;
    let title = if conversation.in_flight {
        format!("{} {} waiting for answer", FocusPane::Query.label(), spinner(tick))
    } else {
        FocusPane::Query.label().to_string()
    };
    let block = card_block(title, focused, palette);
    let style = if conversation.in_flight {
        Style::default().fg(palette.muted)
    } else {
        Style::default().fg(palette.text)
    };
    let input = Paragraph::new(with_cursor(&conversation.query_buffer, focused))
        .style(style)
        .block(block);
    f.render_widget(input, area);
}

fn render_activity(f: &mut Frame, area: Rect, state: &ClientState, palette: UiPalette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.focus_border))
        .title(Span::styled(
            format!("Activity ({} entries)", state.logs.len()),
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let height = usize::from(inner.height);
    let mut lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(height)
        .map(|entry| {
            let level_color = match entry.level {
                LogLevel::Debug => palette.muted,
                LogLevel::Info => palette.accent_alt,
                LogLevel::Warn => palette.warning,
                LogLevel::Error => palette.danger,
            };
            Line::from(vec![
                Span::styled(format!("{:>5} ", entry.seq), Style::default().fg(palette.muted)),
                Span::styled(
                    format!("{:<5} ", entry.level.label()),
                    Style::default().fg(level_color),
                ),
                Span::styled(
                    format!("{:<12} ", entry.source.label()),
                    Style::default().fg(palette.accent),
                ),
                Span::styled(entry.message.clone(), Style::default().fg(palette.text)),
            ])
        })
        .collect();
    lines.reverse();
    f.render_widget(Paragraph::new(lines), inner);
}

fn render_key_hints(f: &mut Frame, area: Rect, state: &ClientState, palette: UiPalette) {
    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(key, Style::default().fg(palette.accent)),
            Span::styled(label, Style::default().fg(palette.muted)),
        ]
    };
    let contextual = match state.interaction.focus {
        _ if state.interaction.show_activity => hint("^L", " clear  "),
        FocusPane::IngestText => hint("^S", " ingest  "),
        FocusPane::FilePath => hint("Enter", " select  ^S ingest  "),
        FocusPane::Query => hint("Enter", " ask  "),
        FocusPane::History => hint("↑↓", " select  +/- rate  y copy  "),
    };
    let mut spans: Vec<Span> = Vec::new();
    spans.extend(hint("Tab", " focus  "));
    spans.extend(contextual);
    spans.extend(hint("F2", " activity  "));
    spans.extend(hint("^C", " quit"));
    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
