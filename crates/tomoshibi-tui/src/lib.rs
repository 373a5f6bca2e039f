// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::macros::format_description;
use tomoshibi_app::{
    Addressing, AppCommand, AppEvent, AppMode, AppState, Catalog, Catalogs, FragmentChanged,
    GalleryItem, ImageItem, ItemId, ListenerSet, Location, OverlayKey, Status, StatusCard,
    Subscription, ViewCommand, ViewEvent, ViewKind, card_fragment,
};

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const DEFAULT_VIEWPORT_WIDTH: u16 = 80;
const GRID_TAG_LIMIT: usize = 3;
const GRID_STATUS_LIMIT: usize = 3;
const GRID_BAR_WIDTH: usize = 10;
const DETAIL_BAR_WIDTH: usize = 24;
const STATUS_LABEL_WIDTH: usize = 10;
const IMAGE_CELL_HEIGHT: u16 = 4;
const CARD_CELL_HEIGHT: u16 = 7;
const ALL_TAGS_LABEL: &str = "all";
const MEMO_PLACEHOLDER: &str = "what they love, what they avoid, how to work with them";

pub trait AppRuntime {
    fn load_images(&mut self) -> Result<Vec<ImageItem>>;
    fn load_cards(&mut self) -> Result<Vec<StatusCard>>;

    /// Fragment the card view starts from, e.g. `card-akari`.
    fn initial_fragment(&mut self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug)]
struct OverlayListener {
    view: ViewKind,
    rx: Receiver<OverlayKey>,
    _subscription: Subscription,
}

#[derive(Debug)]
struct FragmentListener {
    rx: Receiver<FragmentChanged>,
    _subscription: Subscription,
}

#[derive(Debug)]
struct ViewData {
    catalogs: Catalogs,
    location: Location,
    fragment_listener: Option<FragmentListener>,
    overlay_keys: ListenerSet<OverlayKey>,
    overlay_listener: Option<OverlayListener>,
    image_cursor: usize,
    card_cursor: usize,
    viewport_width: u16,
    help_visible: bool,
    status_token: u64,
}

impl Default for ViewData {
    fn default() -> Self {
        Self {
            catalogs: Catalogs::default(),
            location: Location::default(),
            fragment_listener: None,
            overlay_keys: ListenerSet::default(),
            overlay_listener: None,
            image_cursor: 0,
            card_cursor: 0,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            help_visible: false,
            status_token: 0,
        }
    }
}

impl ViewData {
    fn cursor(&self, kind: ViewKind) -> usize {
        match kind {
            ViewKind::Images => self.image_cursor,
            ViewKind::Cards => self.card_cursor,
        }
    }

    fn cursor_mut(&mut self, kind: ViewKind) -> &mut usize {
        match kind {
            ViewKind::Images => &mut self.image_cursor,
            ViewKind::Cards => &mut self.card_cursor,
        }
    }
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    let (internal_tx, internal_rx) = mpsc::channel();
    let mut view_data = ViewData::default();
    mount(state, runtime, &mut view_data, &internal_tx)?;

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    if let Ok(size) = terminal.size() {
        view_data.viewport_width = size.width;
    }

    let result = event_loop(
        &mut terminal,
        state,
        &mut view_data,
        &internal_tx,
        &internal_rx,
    );
    unmount(&mut view_data);

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    internal_rx: &Receiver<InternalEvent>,
) -> Result<()> {
    loop {
        process_internal_events(state, view_data, internal_rx);
        pump_listeners(state, view_data, internal_tx);

        terminal
            .draw(|frame| render(frame, state, view_data))
            .context("draw frame")?;

        if !event::poll(Duration::from_millis(120)).context("poll event")? {
            continue;
        }
        match event::read().context("read event")? {
            Event::Key(key) => {
                if handle_key_event(state, view_data, internal_tx, key) {
                    return Ok(());
                }
            }
            Event::Resize(width, _) => {
                view_data.viewport_width = width;
            }
            _ => {}
        }
    }
}

/// Loads both collections and subscribes to fragment changes for the
/// lifetime of the UI.
fn mount<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) -> Result<()> {
    let images = runtime.load_images().context("load image gallery")?;
    let cards = runtime.load_cards().context("load status cards")?;
    view_data.catalogs = Catalogs {
        images: Catalog::new(images),
        cards: Catalog::new(cards),
    };

    let (subscription, rx) = view_data.location.subscribe();
    view_data.fragment_listener = Some(FragmentListener {
        rx,
        _subscription: subscription,
    });

    if let Some(fragment) = runtime.initial_fragment() {
        view_data.location.replace(&fragment);
    }
    let fragment = view_data.location.fragment().to_owned();
    let events = state.dispatch_view(
        &view_data.catalogs,
        fragment_view(),
        ViewCommand::SyncFragment(fragment),
    );
    after_view_events(state, view_data, internal_tx, &events, false);
    Ok(())
}

fn unmount(view_data: &mut ViewData) {
    view_data.overlay_listener = None;
    view_data.fragment_listener = None;
}

fn fragment_view() -> ViewKind {
    ViewKind::ALL
        .into_iter()
        .find(|view| view.addressing() == Addressing::Fragment)
        .unwrap_or(ViewKind::Cards)
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

/// Drains fragment changes and overlay keys into the state machine.
fn pump_listeners(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let changes = view_data
        .fragment_listener
        .as_ref()
        .map(|listener| listener.rx.try_iter().collect::<Vec<_>>())
        .unwrap_or_default();
    for change in changes {
        let events = state.dispatch_view(
            &view_data.catalogs,
            fragment_view(),
            ViewCommand::SyncFragment(change.fragment),
        );
        after_view_events(state, view_data, internal_tx, &events, false);
    }

    let keys = view_data
        .overlay_listener
        .as_ref()
        .map(|listener| {
            listener
                .rx
                .try_iter()
                .map(|key| (listener.view, key))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    for (view, key) in keys {
        let events = state.dispatch_overlay_key(&view_data.catalogs, view, key);
        after_view_events(state, view_data, internal_tx, &events, true);
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn dispatch_view_command(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: ViewCommand,
) {
    let events = state.dispatch_view(&view_data.catalogs, state.active_view, command);
    after_view_events(state, view_data, internal_tx, &events, true);
}

fn dispatch_app_command(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    after_view_events(state, view_data, internal_tx, &events, true);
}

/// Keeps cursors, the fragment and the overlay listener in step with the
/// state machine after every transition.
fn after_view_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: &[AppEvent],
    mirror_fragment: bool,
) {
    for event in events {
        match event {
            AppEvent::View(view, ViewEvent::SelectionChanged(selection)) => {
                if mirror_fragment && view.addressing() == Addressing::Fragment {
                    mirror_selection(&mut view_data.location, selection.as_ref());
                }
                if let Some(index) = open_index(state, &view_data.catalogs, *view) {
                    *view_data.cursor_mut(*view) = index;
                }
            }
            AppEvent::View(view, ViewEvent::QueryChanged(_) | ViewEvent::TagChanged(_)) => {
                clamp_cursor(state, view_data, *view);
            }
            _ => {}
        }
    }

    sync_overlay_listener(state, view_data);

    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn mirror_selection(location: &mut Location, selection: Option<&ItemId>) {
    match selection {
        Some(id) => {
            location.assign(&card_fragment(id));
        }
        None => location.replace(""),
    }
}

/// The overlay listens for keys only while the active view has an item open.
fn sync_overlay_listener(state: &AppState, view_data: &mut ViewData) {
    let wanted = state
        .active()
        .selection
        .is_open()
        .then_some(state.active_view);
    let current = view_data
        .overlay_listener
        .as_ref()
        .map(|listener| listener.view);
    if wanted == current {
        return;
    }

    view_data.overlay_listener = None;
    if let Some(view) = wanted {
        let (subscription, rx) = view_data.overlay_keys.subscribe();
        view_data.overlay_listener = Some(OverlayListener {
            view,
            rx,
            _subscription: subscription,
        });
    }
}

fn filtered_len(state: &AppState, catalogs: &Catalogs, kind: ViewKind) -> usize {
    match kind {
        ViewKind::Images => state.images.filtered(&catalogs.images).len(),
        ViewKind::Cards => state.cards.filtered(&catalogs.cards).len(),
    }
}

fn open_index(state: &AppState, catalogs: &Catalogs, kind: ViewKind) -> Option<usize> {
    match kind {
        ViewKind::Images => state.images.open_index(&catalogs.images),
        ViewKind::Cards => state.cards.open_index(&catalogs.cards),
    }
}

fn selected_tags(state: &AppState, catalogs: &Catalogs) -> Vec<String> {
    match state.active_view {
        ViewKind::Images => state
            .images
            .selected(&catalogs.images)
            .map(|item| item.tags.clone()),
        ViewKind::Cards => state
            .cards
            .selected(&catalogs.cards)
            .map(|card| card.tags.clone()),
    }
    .unwrap_or_default()
}

fn clamp_cursor(state: &AppState, view_data: &mut ViewData, kind: ViewKind) {
    let len = filtered_len(state, &view_data.catalogs, kind);
    let cursor = view_data.cursor_mut(kind);
    *cursor = (*cursor).min(len.saturating_sub(1));
}

fn move_cursor(state: &AppState, view_data: &mut ViewData, delta: isize) {
    let kind = state.active_view;
    let len = filtered_len(state, &view_data.catalogs, kind);
    if len == 0 {
        return;
    }
    let cursor = view_data.cursor_mut(kind);
    let next = (*cursor as isize + delta).clamp(0, len as isize - 1);
    *cursor = next as usize;
}

fn handle_key_event(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    // Echoes of our own fragment writes must land before the key does.
    pump_listeners(state, view_data, internal_tx);

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if state.active().selection.is_open() {
        handle_overlay_key(state, view_data, internal_tx, key);
        return false;
    }

    match state.mode {
        AppMode::Search => handle_search_key(state, view_data, internal_tx, key),
        AppMode::Browse => handle_browse_key(state, view_data, internal_tx, key),
    }
    false
}

fn handle_overlay_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let overlay_key = match key.code {
        KeyCode::Esc => Some(OverlayKey::Escape),
        KeyCode::Left | KeyCode::Char('h') => Some(OverlayKey::ArrowLeft),
        KeyCode::Right | KeyCode::Char('l') => Some(OverlayKey::ArrowRight),
        _ => None,
    };
    if let Some(overlay_key) = overlay_key {
        view_data.overlay_keys.emit(&overlay_key);
        pump_listeners(state, view_data, internal_tx);
        return;
    }

    if let KeyCode::Char(ch) = key.code
        && let Some(position) = ch.to_digit(10).filter(|digit| *digit > 0)
    {
        let tags = selected_tags(state, &view_data.catalogs);
        match tags.get(position as usize - 1) {
            Some(tag) => dispatch_view_command(
                state,
                view_data,
                internal_tx,
                ViewCommand::SelectTagFromOverlay(tag.clone()),
            ),
            None => emit_status(state, view_data, internal_tx, format!("no tag #{position}")),
        }
    }
}

fn handle_search_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Enter | KeyCode::Esc, _) => {
            dispatch_app_command(state, view_data, internal_tx, AppCommand::ExitSearch);
        }
        (KeyCode::Backspace, _) => {
            dispatch_view_command(state, view_data, internal_tx, ViewCommand::PopQuery);
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            dispatch_view_command(state, view_data, internal_tx, ViewCommand::ClearQuery);
        }
        (KeyCode::Char(ch), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
            dispatch_view_command(state, view_data, internal_tx, ViewCommand::PushQuery(ch));
        }
        _ => {}
    }
}

fn handle_browse_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let columns = grid_columns(state.active_view, view_data.viewport_width) as isize;
    match key.code {
        KeyCode::Char('/') => {
            dispatch_app_command(state, view_data, internal_tx, AppCommand::EnterSearch);
        }
        KeyCode::Tab => dispatch_app_command(state, view_data, internal_tx, AppCommand::NextView),
        KeyCode::BackTab => {
            dispatch_app_command(state, view_data, internal_tx, AppCommand::PrevView);
        }
        KeyCode::Char('t') => {
            dispatch_view_command(state, view_data, internal_tx, ViewCommand::CycleTag(1));
        }
        KeyCode::Char('T') => {
            dispatch_view_command(state, view_data, internal_tx, ViewCommand::CycleTag(-1));
        }
        KeyCode::Char('a') => {
            dispatch_view_command(state, view_data, internal_tx, ViewCommand::SetTag(None));
        }
        KeyCode::Left | KeyCode::Char('h') => move_cursor(state, view_data, -1),
        KeyCode::Right | KeyCode::Char('l') => move_cursor(state, view_data, 1),
        KeyCode::Up | KeyCode::Char('k') => move_cursor(state, view_data, -columns),
        KeyCode::Down | KeyCode::Char('j') => move_cursor(state, view_data, columns),
        KeyCode::Enter => {
            let cursor = view_data.cursor(state.active_view);
            dispatch_view_command(state, view_data, internal_tx, ViewCommand::OpenAt(cursor));
        }
        KeyCode::Char('[') if history_applies(state) => {
            if !view_data.location.back() {
                emit_status(state, view_data, internal_tx, "history start");
            }
            pump_listeners(state, view_data, internal_tx);
        }
        KeyCode::Char(']') if history_applies(state) => {
            if !view_data.location.forward() {
                emit_status(state, view_data, internal_tx, "history end");
            }
            pump_listeners(state, view_data, internal_tx);
        }
        KeyCode::Char('?') => view_data.help_visible = true,
        _ => {}
    }
}

/// Fragment history belongs to the view that is addressed by fragment.
fn history_applies(state: &AppState) -> bool {
    state.active_view.addressing() == Addressing::Fragment
}

/// Column count per view and terminal width, mirroring the two, three and
/// four column breakpoints of the web layout.
fn grid_columns(kind: ViewKind, width: u16) -> usize {
    let step = match width {
        0..60 => 0,
        60..100 => 1,
        _ => 2,
    };
    match kind {
        ViewKind::Images => 2 + step,
        ViewKind::Cards => 1 + step,
    }
}

fn cell_height(kind: ViewKind) -> u16 {
    match kind {
        ViewKind::Images => IMAGE_CELL_HEIGHT,
        ViewKind::Cards => CARD_CELL_HEIGHT,
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = ViewKind::ALL
        .iter()
        .position(|view| *view == state.active_view)
        .unwrap_or(0);
    let titles = ViewKind::ALL
        .iter()
        .map(|view| view_title(*view, &view_data.catalogs))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("tomoshibi").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let tags = match state.active_view {
        ViewKind::Images => view_data.catalogs.images.tags(),
        ViewKind::Cards => view_data.catalogs.cards.tags(),
    };
    let filter_bar = Paragraph::new(vec![
        search_line(state),
        tag_chip_line(tags, state.active().active_tag.as_deref()),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(filter_bar, layout[1]);

    render_grid(frame, layout[2], state, view_data);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[3]);

    if let Some((title, body)) = overlay_text(state, &view_data.catalogs) {
        let area = centered_rect(80, 80, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(overlay, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn view_title(view: ViewKind, catalogs: &Catalogs) -> String {
    let count = match view {
        ViewKind::Images => catalogs.images.len(),
        ViewKind::Cards => catalogs.cards.len(),
    };
    format!("{} ({count})", view.label())
}

fn search_line(state: &AppState) -> Line<'static> {
    let query = state.active().query.clone();
    let caret = if state.mode == AppMode::Search {
        "▏"
    } else {
        ""
    };
    Line::from(vec![
        Span::styled("search ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{query}{caret}")),
    ])
}

fn tag_chip_line(tags: &[String], active: Option<&str>) -> Line<'static> {
    let chip = |label: &str, is_active: bool| {
        let style = if is_active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Span::styled(format!(" {label} "), style)
    };

    let mut spans = vec![chip(ALL_TAGS_LABEL, active.is_none())];
    for tag in tags {
        spans.push(Span::raw(" "));
        spans.push(chip(tag, active == Some(tag.as_str())));
    }
    Line::from(spans)
}

fn render_grid(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let kind = state.active_view;
    let (cells, total) = grid_cells(state, &view_data.catalogs);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} {}/{total}", kind.label(), cells.len()));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if cells.is_empty() || inner.height == 0 {
        return;
    }

    let columns = grid_columns(kind, area.width);
    let height = cell_height(kind);
    let visible_rows = usize::from((inner.height / height).max(1));
    let cursor = view_data.cursor(kind).min(cells.len() - 1);
    let first_row = (cursor / columns).saturating_sub(visible_rows - 1);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(height); visible_rows])
        .split(inner);
    for (offset, row_area) in rows.iter().enumerate() {
        let columns_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(*row_area);
        for (column, cell_area) in columns_area.iter().enumerate() {
            let index = (first_row + offset) * columns + column;
            let Some((title, body)) = cells.get(index) else {
                continue;
            };
            let border = if index == cursor {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let label = truncate_label(title, usize::from(cell_area.width.saturating_sub(4)));
            let widget = Paragraph::new(body.as_str()).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(label),
            );
            frame.render_widget(widget, *cell_area);
        }
    }
}

fn grid_cells(state: &AppState, catalogs: &Catalogs) -> (Vec<(String, String)>, usize) {
    match state.active_view {
        ViewKind::Images => (
            titled_cells(state.images.filtered(&catalogs.images), image_cell_text),
            catalogs.images.len(),
        ),
        ViewKind::Cards => (
            titled_cells(state.cards.filtered(&catalogs.cards), card_cell_text),
            catalogs.cards.len(),
        ),
    }
}

fn titled_cells<T: GalleryItem>(
    items: Vec<&T>,
    body: fn(&T) -> String,
) -> Vec<(String, String)> {
    items
        .into_iter()
        .map(|item| (item.title().to_owned(), body(item)))
        .collect()
}

fn hashtags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn numbered_hashtags(tags: &[String]) -> String {
    tags.iter()
        .enumerate()
        .map(|(index, tag)| format!("{} #{tag}", index + 1))
        .collect::<Vec<_>>()
        .join("  ")
}

fn image_cell_text(item: &ImageItem) -> String {
    let tags = &item.tags[..item.tags.len().min(GRID_TAG_LIMIT)];
    format!("[{}]\n{}", item.alt_text(), hashtags(tags))
}

fn card_cell_text(card: &StatusCard) -> String {
    let mut lines = vec![card.activities.join("・")];
    lines.extend(
        card.statuses
            .iter()
            .take(GRID_STATUS_LIMIT)
            .map(|status| stat_line(status, GRID_BAR_WIDTH)),
    );
    lines.push(hashtags(&card.tags));
    lines.join("\n")
}

/// `label  ██████░░░░ 62%`. The bar uses the clamped value, the number
/// shows the source value.
fn stat_line(status: &Status, width: usize) -> String {
    let filled = ((status.clamped_value() / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!(
        "{:<label_width$} {}{} {}%",
        truncate_label(&status.label, STATUS_LABEL_WIDTH),
        "█".repeat(filled),
        "░".repeat(width - filled),
        status.value,
        label_width = STATUS_LABEL_WIDTH,
    )
}

fn overlay_text(state: &AppState, catalogs: &Catalogs) -> Option<(String, String)> {
    let kind = state.active_view;
    let len = filtered_len(state, catalogs, kind);
    let index = open_index(state, catalogs, kind)?;
    let position = format!("{}/{len}", index + 1);
    match kind {
        ViewKind::Images => {
            let item = state.images.selected(&catalogs.images)?;
            Some((
                format!("{} · {position}", item.title()),
                render_image_detail_text(item),
            ))
        }
        ViewKind::Cards => {
            let card = state.cards.selected(&catalogs.cards)?;
            Some((
                format!("{} · {position}", card.title()),
                render_card_detail_text(card),
            ))
        }
    }
}

fn render_image_detail_text(item: &ImageItem) -> String {
    let mut lines = vec![format!("[{}]  {}", item.alt_text(), item.src), String::new()];
    if let Some(owner) = &item.owner {
        lines.push(format!("owner: {owner}"));
    }
    if let Some(created) = item
        .created
        .and_then(|date| date.format(format_description!("[year]-[month]-[day]")).ok())
    {
        lines.push(format!("created: {created}"));
    }
    if let Some(notes) = &item.notes {
        lines.push(String::new());
        lines.push(notes.clone());
    }
    lines.push(String::new());
    lines.push(format!("tags: {}", numbered_hashtags(&item.tags)));
    lines.push(String::new());
    lines.push(overlay_hint().to_owned());
    lines.join("\n")
}

fn render_card_detail_text(card: &StatusCard) -> String {
    let mut lines = vec![card.activities.join("・")];
    if let Some(tone) = card.tone {
        lines.push(format!("tone: {}", tone.as_str()));
    }
    if let Some(bio) = &card.bio {
        lines.push(String::new());
        lines.push(bio.clone());
    }
    lines.push(String::new());
    lines.extend(
        card.statuses
            .iter()
            .map(|status| stat_line(status, DETAIL_BAR_WIDTH)),
    );
    if let Some(instagram) = &card.instagram {
        lines.push(String::new());
        lines.push(format!("instagram: {instagram}"));
    }
    lines.push(String::new());
    lines.push(format!("GOOD  {}", card.good.as_deref().unwrap_or("-")));
    lines.push(format!("WEAK  {}", card.weak.as_deref().unwrap_or("-")));
    lines.push(format!("tags  {}", numbered_hashtags(&card.tags)));
    lines.push(format!("memo  {MEMO_PLACEHOLDER}"));
    lines.push(String::new());
    lines.push(overlay_hint().to_owned());
    lines.join("\n")
}

fn overlay_hint() -> &'static str {
    "←/→ browse | 1-9 filter by tag | esc close"
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }

    let mode = match state.mode {
        AppMode::Browse => "BROWSE",
        AppMode::Search => "SEARCH",
    };
    let hints = if state.active().selection.is_open() {
        overlay_hint()
    } else if state.mode == AppMode::Search {
        "type to filter | backspace | ctrl+u clear | enter/esc done"
    } else {
        "hjkl move | enter open | / search | t/T tag | a all | tab view | [/] history | ? help | ctrl+q"
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn help_overlay_text() -> &'static str {
    "browse\n  h/j/k/l, arrows   move through the grid\n  enter             open the highlighted item\n  /                 search (enter or esc to finish)\n  t / T             next / previous tag\n  a                 show all tags\n  tab / shift+tab   switch between images and cards\n  [ / ]             back / forward through opened cards\n\noverlay\n  ← / →             previous / next item\n  1-9               filter by the item's Nth tag\n  esc               close\n\nctrl+q quits"
}

fn truncate_label(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_owned();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut truncated = value.chars().take(max_chars - 1).collect::<String>();
    truncated.push('…');
    truncated
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}
