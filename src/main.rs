use std::collections::HashMap;
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use props_terminal::emr::RiskLevel;
use props_terminal::state::{
    self, apply_delta, AppState, MarketKey, ParlayRole, ProviderCommand, Screen,
};
use props_terminal::{fake_feed, feed, persist};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    games_refresh: Duration,
    last_games_refresh: Instant,
    odds_refresh: Duration,
    last_odds_refresh: HashMap<MarketKey, Instant>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        let games_refresh = std::env::var("GAMES_POLL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(300)
            .max(60);
        let odds_refresh = std::env::var("ODDS_POLL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(120)
            .max(60);
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
            games_refresh: Duration::from_secs(games_refresh),
            last_games_refresh: Instant::now(),
            odds_refresh: Duration::from_secs(odds_refresh),
            last_odds_refresh: HashMap::new(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            match key.code {
                KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => {
                    self.state.help_overlay = false;
                }
                _ => {}
            }
            return;
        }
        match self.state.screen {
            Screen::ApiKeySetup => self.on_key_setup(key),
            Screen::GamesList => self.on_key_games(key),
            Screen::GameDetail => self.on_key_detail(key),
        }
    }

    fn on_key_setup(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_key(),
            KeyCode::Backspace => {
                self.state.key_input.pop();
            }
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(c) if !c.is_control() => {
                self.state.key_error = None;
                self.state.key_input.push(c);
            }
            _ => {}
        }
    }

    fn on_key_games(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Enter | KeyCode::Char('d') => self.open_detail(),
            KeyCode::Char('r') => self.request_games(true),
            KeyCode::Char('L') => self.logout(),
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn on_key_detail(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                self.state.screen = Screen::GamesList;
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_props_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_props_up(),
            KeyCode::Tab | KeyCode::Char(']') | KeyCode::Right => {
                self.state.cycle_market(1);
                self.ensure_current_odds(false);
            }
            KeyCode::BackTab | KeyCode::Char('[') | KeyCode::Left => {
                self.state.cycle_market(-1);
                self.ensure_current_odds(false);
            }
            KeyCode::Char('b') => self.state.cycle_bookmaker(),
            KeyCode::Char('r') => self.request_current_odds(true),
            KeyCode::Char('a') => self.request_insights(),
            KeyCode::Char('L') => self.logout(),
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn submit_key(&mut self) {
        let key = self.state.key_input.trim().to_string();
        if key.is_empty() {
            self.state.key_error = Some("Enter an API key".to_string());
            return;
        }
        self.state.api_key = Some(key);
        self.state.key_input.clear();
        self.state.key_error = None;
        self.state.screen = Screen::GamesList;
        self.request_games(true);
    }

    fn logout(&mut self) {
        self.state.clear_key();
        self.state.push_log("[INFO] API key cleared");
    }

    fn open_detail(&mut self) {
        if !self.state.open_selected_game() {
            return;
        }
        self.request_markets();
        self.ensure_current_odds(true);
    }

    fn api_key(&self) -> Option<String> {
        self.state.api_key.clone()
    }

    fn request_games(&mut self, announce: bool) {
        let Some(tx) = &self.cmd_tx else {
            return;
        };
        let Some(api_key) = self.api_key() else {
            return;
        };
        if tx.send(ProviderCommand::FetchGames { api_key }).is_ok() {
            self.state.games_loading = true;
            self.last_games_refresh = Instant::now();
            if announce {
                self.state.push_log("[INFO] Fetching upcoming games");
            }
        } else if announce {
            self.state.push_log("[WARN] Games request failed to send");
        }
    }

    fn request_markets(&mut self) {
        let Some(tx) = &self.cmd_tx else {
            return;
        };
        let Some(api_key) = self.api_key() else {
            return;
        };
        let Some(game) = self.state.selected_game() else {
            return;
        };
        // Discovery runs once per event; the cached list survives re-entry.
        if self.state.available_markets.contains_key(&game.id) {
            return;
        }
        let event_id = game.id.clone();
        let _ = tx.send(ProviderCommand::FetchMarkets { api_key, event_id });
    }

    /// Fetch odds for the current (event, market) unless a request is in
    /// flight or one was sent within the refresh window. Failed markets wait
    /// out the same window before an automatic retry; r retries immediately.
    fn ensure_current_odds(&mut self, announce: bool) {
        let Some(key) = self.state.current_key() else {
            return;
        };
        if self.state.market_loading.as_ref() == Some(&key) {
            return;
        }
        let recently_requested = self
            .last_odds_refresh
            .get(&key)
            .map(|t| t.elapsed() < self.odds_refresh)
            .unwrap_or(false);
        if recently_requested {
            return;
        }
        self.request_current_odds(announce);
    }

    fn request_current_odds(&mut self, announce: bool) {
        let Some(tx) = &self.cmd_tx else {
            return;
        };
        let Some(api_key) = self.api_key() else {
            return;
        };
        let Some(key) = self.state.current_key() else {
            return;
        };
        let cmd = ProviderCommand::FetchMarketOdds {
            api_key,
            event_id: key.0.clone(),
            market: key.1.clone(),
        };
        if tx.send(cmd).is_ok() {
            if announce {
                self.state.push_log(format!("[INFO] Fetching {}", key.1));
            }
            self.last_odds_refresh.insert(key.clone(), Instant::now());
            self.state.market_loading = Some(key);
        }
    }

    fn request_insights(&mut self) {
        let Some(tx) = &self.cmd_tx else {
            return;
        };
        let Some(key) = self.state.current_key() else {
            return;
        };
        if self.state.props.is_empty() {
            self.state.push_log("[INFO] No props to analyze yet");
            return;
        }
        if self.state.insights_loading {
            return;
        }
        let cmd = ProviderCommand::GenerateInsights {
            event_id: key.0,
            market: key.1,
            bookmaker_title: self.state.selected_bookmaker_title(),
            props: self.state.props.clone(),
        };
        if tx.send(cmd).is_ok() {
            self.state.insights_loading = true;
            self.state.push_log("[INFO] Requesting AI parlay analysis");
        }
    }

    fn maybe_refresh_games(&mut self) {
        if self.state.screen != Screen::GamesList {
            return;
        }
        if self.state.api_key.is_none() || self.state.games_loading {
            return;
        }
        if self.last_games_refresh.elapsed() >= self.games_refresh {
            self.request_games(false);
        }
    }

    fn maybe_refresh_odds(&mut self) {
        if self.state.screen != Screen::GameDetail {
            return;
        }
        self.ensure_current_odds(false);
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let demo = std::env::var("PROPS_DEMO").map(|v| v == "1").unwrap_or(false);
    if demo {
        fake_feed::spawn_fake_provider(tx, cmd_rx);
    } else {
        feed::spawn_provider(tx, cmd_rx);
    }

    let mut app = App::new(Some(cmd_tx));
    if demo && app.state.api_key.is_none() {
        // The demo feed ignores the key; any value unlocks the UI.
        app.state.api_key = Some("demo".to_string());
        app.state.screen = Screen::GamesList;
    } else {
        persist::load_into_state(&mut app.state);
    }
    if app.state.api_key.is_some() {
        app.request_games(false);
    }

    let res = run_app(&mut terminal, &mut app, rx);

    // Demo sessions hold a placeholder key and synthetic data; persisting
    // them would pollute the real cache.
    if !demo {
        persist::save_from_state(&app.state);
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.maybe_refresh_games();
        app.maybe_refresh_odds();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::ApiKeySetup => render_key_setup(frame, chunks[1], &app.state),
        Screen::GamesList => render_games_list(frame, chunks[1], &app.state),
        Screen::GameDetail => render_game_detail(frame, chunks[1], &app.state),
    }

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    match state.screen {
        Screen::ApiKeySetup => "PROPS TERMINAL | Setup".to_string(),
        Screen::GamesList => {
            let loading = if state.games_loading { " | loading..." } else { "" };
            format!("PROPS TERMINAL | NBA Games{loading}")
        }
        Screen::GameDetail => {
            let matchup = state
                .selected_game()
                .map(|g| format!("{} @ {}", g.away_team, g.home_team))
                .unwrap_or_else(|| "-".to_string());
            format!(
                "PROPS TERMINAL | {matchup} | {} | Book: {}",
                state.selected_market,
                state.selected_bookmaker_title()
            )
        }
    }
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::ApiKeySetup => "Type key | Enter Save | Esc Quit".to_string(),
        Screen::GamesList => {
            "j/k/↑/↓ Move | Enter Open | r Refresh | L Logout | ? Help | q Quit".to_string()
        }
        Screen::GameDetail => {
            "j/k Scroll | Tab/[/] Market | b Book | a AI | r Refresh | Esc Back | ? Help | q Quit"
                .to_string()
        }
    }
}

fn render_key_setup(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup = centered_rect(60, 40, area);
    let block = Block::default()
        .title("The Odds API key")
        .borders(Borders::ALL);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

    let intro = Paragraph::new(
        "Paste your the-odds-api.com key to load NBA player props.\nThe key is stored locally.",
    );
    frame.render_widget(intro, rows[0]);

    let masked: String = state.key_input.chars().map(|_| '*').collect();
    let input = Paragraph::new(format!("> {masked}"))
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(input, rows[1]);

    if let Some(err) = &state.key_error {
        let error = Paragraph::new(err.as_str()).style(Style::default().fg(Color::Red));
        frame.render_widget(error, rows[2]);
    }
}

fn render_games_list(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let widths = games_columns();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(sections[0]);
    let style = Style::default().add_modifier(Modifier::BOLD);
    render_cell_text(frame, cols[0], "Tipoff (UTC)", style);
    render_cell_text(frame, cols[1], "Away", style);
    render_cell_text(frame, cols[2], "Home", style);

    let list_area = sections[1];
    if state.games.is_empty() {
        let message = if state.games_loading {
            "Loading games..."
        } else {
            "No upcoming games. Press r to refresh."
        };
        let empty = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, state.games.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let selected = idx == state.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let game = &state.games[idx];
        render_cell_text(frame, cols[0], &format_tipoff(&game.commence_time), row_style);
        render_cell_text(frame, cols[1], &game.away_team, row_style);
        render_cell_text(frame, cols[2], &game.home_team, row_style);
    }
}

fn games_columns() -> [Constraint; 3] {
    [
        Constraint::Length(18),
        Constraint::Min(20),
        Constraint::Min(20),
    ]
}

fn render_game_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(area);

    render_market_tabs(frame, rows[0], state);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(60), Constraint::Length(38)])
        .split(rows[1]);

    render_props_table(frame, columns[0], state);
    render_side_panel(frame, columns[1], state);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, rows[2]);
}

fn render_market_tabs(frame: &mut Frame, area: Rect, state: &AppState) {
    let markets = state.markets_for_selected();
    let mut spans: Vec<Span> = Vec::new();
    for (idx, market) in markets.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        let label = market.strip_prefix("player_").unwrap_or(market);
        if *market == state.selected_market {
            spans.push(Span::styled(
                format!("[{label}]"),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(format!(" {label} ")));
        }
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_props_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Player Props").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    if let Some(err) = state.current_error() {
        let message = Paragraph::new(format!("Market unavailable: {err}"))
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(message, inner);
        return;
    }
    if state.props.is_empty() {
        let message = if state.market_loading.is_some() {
            "Loading odds..."
        } else {
            "No player props in this market. Try another tab."
        };
        let empty = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let widths = props_columns();
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(sections[0]);
    let style = Style::default().add_modifier(Modifier::BOLD);
    render_cell_text(frame, header_cols[0], " ", style);
    render_cell_text(frame, header_cols[1], "Player", style);
    render_cell_text(frame, header_cols[2], "Line", style);
    render_cell_text(frame, header_cols[3], "Over", style);
    render_cell_text(frame, header_cols[4], "Under", style);
    render_cell_text(frame, header_cols[5], "Lean", style);
    render_cell_text(frame, header_cols[6], "Cons", style);
    render_cell_text(frame, header_cols[7], "Role", style);
    render_cell_text(frame, header_cols[8], "EMR", style);
    render_cell_text(frame, header_cols[9], "Risk", style);

    let list_area = sections[1];
    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.prop_scroll, state.props.len(), visible);
    for (i, (prop, emr)) in state.props[start..end]
        .iter()
        .zip(state.prop_emrs[start..end].iter())
        .enumerate()
    {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let offer = prop.offer_for(&state.selected_bookmaker);
        let over = offer.and_then(|o| o.over_price).map(format_price);
        let under = offer.and_then(|o| o.under_price).map(format_price);

        let star_style = Style::default().fg(Color::Yellow);
        let role_style = role_style(prop.role);
        let risk_style = risk_style(emr.level);

        render_cell_text(frame, cols[0], if prop.notable { "★" } else { " " }, star_style);
        render_cell_text(frame, cols[1], &prop.player_name, Style::default());
        render_cell_text(frame, cols[2], &format_line(prop.line), Style::default());
        render_cell_text(frame, cols[3], over.as_deref().unwrap_or("  -"), Style::default());
        render_cell_text(frame, cols[4], under.as_deref().unwrap_or("  -"), Style::default());
        render_cell_text(
            frame,
            cols[5],
            prop.lean.map(|l| l.label()).unwrap_or("-"),
            Style::default(),
        );
        render_cell_text(frame, cols[6], prop.consensus.label(), Style::default());
        render_cell_text(frame, cols[7], prop.role.label(), role_style);
        render_cell_text(frame, cols[8], &format!("{}%", emr.value), risk_style);
        render_cell_text(frame, cols[9], emr.level.label(), risk_style);
    }
}

fn props_columns() -> [Constraint; 10] {
    [
        Constraint::Length(2),
        Constraint::Min(18),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(5),
        Constraint::Length(7),
        Constraint::Length(9),
        Constraint::Length(5),
        Constraint::Length(18),
    ]
}

fn render_side_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(1)])
        .split(area);

    let parlay = Paragraph::new(parlay_text(state))
        .block(Block::default().title("Notable Parlay").borders(Borders::ALL));
    frame.render_widget(parlay, sections[0]);

    let insights = Paragraph::new(insights_text(state))
        .wrap(ratatui::widgets::Wrap { trim: true })
        .block(Block::default().title("AI Analysis").borders(Borders::ALL));
    frame.render_widget(insights, sections[1]);
}

fn parlay_text(state: &AppState) -> String {
    let legs = state.props.iter().filter(|p| p.notable).count();
    match state.notable_parlay_miss_rate() {
        Some(rate) => format!(
            "Legs: {legs}\nCombined miss rate: {rate}%\nHit estimate: {}%",
            100u8.saturating_sub(rate)
        ),
        None => "No notable selections yet.\nPick a two-sided book with b.".to_string(),
    }
}

fn insights_text(state: &AppState) -> String {
    if state.insights_loading {
        return "Analyzing...".to_string();
    }
    match state.current_insights() {
        Some(insights) if !insights.is_empty() => insights
            .iter()
            .map(|insight| {
                format!(
                    "{} {} - {}",
                    insight.prediction.as_deref().unwrap_or("?"),
                    insight.player_name,
                    insight.reason
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(_) => "Generator returned nothing usable.".to_string(),
        None => "Press a to generate parlay analysis.".to_string(),
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No log entries yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(2)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, area);
}

fn role_style(role: ParlayRole) -> Style {
    match role {
        ParlayRole::Anchor => Style::default().fg(Color::Green),
        ParlayRole::Support => Style::default().fg(Color::Cyan),
        ParlayRole::Volatile => Style::default().fg(Color::Magenta),
    }
}

fn risk_style(level: RiskLevel) -> Style {
    match level {
        RiskLevel::Lower => Style::default().fg(Color::Green),
        RiskLevel::Moderate => Style::default().fg(Color::Yellow),
        RiskLevel::Elevated => Style::default().fg(Color::LightRed),
        RiskLevel::High => Style::default().fg(Color::Red),
    }
}

fn format_price(price: f64) -> String {
    if price > 0.0 {
        format!("+{:.0}", price)
    } else {
        format!("{:.0}", price)
    }
}

fn format_line(line: f64) -> String {
    if line.fract() == 0.0 {
        format!("{:.0}", line)
    } else {
        format!("{:.1}", line)
    }
}

fn format_tipoff(raw: &str) -> String {
    if raw.is_empty() {
        return "TBD".to_string();
    }
    let cleaned = raw.trim().trim_end_matches('Z');
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return dt.format("%m-%d %H:%M").to_string();
        }
    }
    if cleaned.len() >= 16 {
        return cleaned[..16].replace('T', " ");
    }
    cleaned.replace('T', " ")
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Props Terminal - Help",
        "",
        "Games:",
        "  j/k or ↑/↓   Move",
        "  Enter / d    Open game",
        "  r            Refresh games",
        "",
        "Game detail:",
        "  j/k or ↑/↓   Scroll props",
        "  Tab / ] / →  Next market",
        "  BackTab / [  Previous market",
        "  b            Cycle bookmaker",
        "  a            AI parlay analysis",
        "  r            Refresh odds",
        "  Esc          Back",
        "",
        "Global:",
        "  L            Logout (clear key)",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
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

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
