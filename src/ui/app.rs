use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tracing::{error, info};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::api_client::{AnalysisStatus, ApiClient};
use crate::config::Config;
use crate::export::export_stocks_csv;
use crate::poller::AnalysisPoller;
use crate::session::SessionStore;
use crate::ui::detail::{render_detail, AnalysisUi, DetailState};
use crate::ui::forms::{self, InputForm};
use crate::ui::tables::StockTable;

/// The screens the app can show, mirroring the original client's routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Login,
    Register,
    Screen,
    Watchlist,
    Detail,
}

impl View {
    /// Screener and watchlist need a logged-in session; everything else
    /// is reachable anonymously.
    pub fn requires_auth(&self) -> bool {
        matches!(self, View::Screen | View::Watchlist)
    }

    fn title(&self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Login => "Login",
            View::Register => "Register",
            View::Screen => "Screener",
            View::Watchlist => "Watchlist",
            View::Detail => "Stock Detail",
        }
    }
}

/// Where an attempted navigation actually lands: protected views redirect
/// unauthenticated visitors to Login.
pub fn resolve_route(target: View, authenticated: bool) -> View {
    if target.requires_auth() && !authenticated {
        View::Login
    } else {
        target
    }
}

#[derive(PartialEq)]
enum ScreenFocus {
    Form,
    Results,
}

pub struct TuiApp {
    client: ApiClient,
    session: SessionStore,
    config: Config,

    view: View,
    prev_view: View,

    login_form: InputForm,
    register_form: InputForm,
    screen_form: InputForm,
    screen_focus: ScreenFocus,
    screen_results: StockTable,
    watchlist: StockTable,

    lookup: Input,
    lookup_active: bool,

    detail: Option<DetailState>,
    poller: Option<AnalysisPoller>,

    status: String,
    show_help: bool,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(client: ApiClient, session: SessionStore, config: Config) -> Self {
        let status = match session.username() {
            Some(user) => format!("Welcome back, {}", user),
            None => "Not logged in - press 'l' to login".to_string(),
        };
        Self {
            client,
            session,
            config,
            view: View::Home,
            prev_view: View::Home,
            login_form: forms::login_form(),
            register_form: forms::register_form(),
            screen_form: forms::screen_form(),
            screen_focus: ScreenFocus::Form,
            screen_results: StockTable::new(),
            watchlist: StockTable::new(),
            lookup: Input::default(),
            lookup_active: false,
            detail: None,
            poller: None,
            status,
            show_help: false,
            should_quit: false,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        if self.session.is_authenticated() && self.config.behavior.auto_load_watchlist {
            self.load_watchlist();
        }

        while !self.should_quit {
            terminal.draw(|f| self.ui(f))?;

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            self.on_tick();
        }
        Ok(())
    }

    // --- navigation ---------------------------------------------------

    /// Route to a view, redirecting to Login when a session is required.
    pub fn navigate(&mut self, target: View) {
        let resolved = resolve_route(target, self.session.is_authenticated());
        if resolved != target {
            self.status = format!("Please login to open the {}", target.title().to_lowercase());
        }
        if resolved == View::Watchlist {
            self.load_watchlist();
        }
        self.prev_view = self.view;
        self.view = resolved;
    }

    fn go_back(&mut self) {
        self.view = self.prev_view;
        self.prev_view = View::Home;
    }

    // --- key handling -------------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if key.code == KeyCode::F(1) {
            self.show_help = !self.show_help;
            return;
        }
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }

        match self.view {
            View::Home => self.handle_home_key(key),
            View::Login => self.handle_login_key(key),
            View::Register => self.handle_register_key(key),
            View::Screen => self.handle_screen_key(key),
            View::Watchlist => self.handle_watchlist_key(key),
            View::Detail => self.handle_detail_key(key),
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        if self.lookup_active {
            match key.code {
                KeyCode::Esc => {
                    self.lookup_active = false;
                    self.lookup = Input::default();
                }
                KeyCode::Enter => {
                    let symbol = self.lookup.value().trim().to_string();
                    self.lookup_active = false;
                    self.lookup = Input::default();
                    if !symbol.is_empty() {
                        self.open_detail(&symbol);
                    }
                }
                _ => {
                    self.lookup.handle_event(&Event::Key(key));
                }
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('s') => self.navigate(View::Screen),
            KeyCode::Char('w') => self.navigate(View::Watchlist),
            KeyCode::Char('l') => self.navigate(View::Login),
            KeyCode::Char('r') => self.navigate(View::Register),
            KeyCode::Char('o') => self.logout(),
            KeyCode::Char('p') => self.populate(),
            KeyCode::Char('/') | KeyCode::Char('f') => self.lookup_active = true,
            _ => {}
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.navigate(View::Home),
            KeyCode::Tab | KeyCode::Down => self.login_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.login_form.prev_field(),
            KeyCode::Enter => self.submit_login(),
            _ => self.login_form.handle_key(key),
        }
    }

    fn handle_register_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.navigate(View::Home),
            KeyCode::Tab | KeyCode::Down => self.register_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.register_form.prev_field(),
            KeyCode::Enter => self.submit_register(),
            _ => self.register_form.handle_key(key),
        }
    }

    fn handle_screen_key(&mut self, key: KeyEvent) {
        match self.screen_focus {
            ScreenFocus::Form => match key.code {
                KeyCode::Esc => self.navigate(View::Home),
                KeyCode::Tab | KeyCode::Down => self.screen_form.next_field(),
                KeyCode::BackTab | KeyCode::Up => self.screen_form.prev_field(),
                KeyCode::Enter => self.run_screen(),
                KeyCode::Right if !self.screen_results.is_empty() => {
                    self.screen_focus = ScreenFocus::Results;
                }
                _ => self.screen_form.handle_key(key),
            },
            ScreenFocus::Results => match key.code {
                KeyCode::Esc | KeyCode::Left => self.screen_focus = ScreenFocus::Form,
                KeyCode::Down | KeyCode::Char('j') => self.screen_results.next_row(),
                KeyCode::Up | KeyCode::Char('k') => self.screen_results.prev_row(),
                KeyCode::Enter => {
                    if let Some(stock) = self.screen_results.selected_stock() {
                        let symbol = stock.symbol.clone();
                        self.open_detail(&symbol);
                    }
                }
                KeyCode::Char('a') => {
                    if let Some(stock) = self.screen_results.selected_stock() {
                        let symbol = stock.symbol.clone();
                        self.add_to_watchlist(&symbol);
                    }
                }
                KeyCode::Char('e') => self.export_results(),
                _ => {}
            },
        }
    }

    fn handle_watchlist_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.navigate(View::Home),
            KeyCode::Down | KeyCode::Char('j') => self.watchlist.next_row(),
            KeyCode::Up | KeyCode::Char('k') => self.watchlist.prev_row(),
            KeyCode::Char('r') => {
                self.load_watchlist();
                self.status = "Watchlist refreshed".to_string();
            }
            KeyCode::Enter => {
                if let Some(stock) = self.watchlist.selected_stock() {
                    let symbol = stock.symbol.clone();
                    self.open_detail(&symbol);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(stock) = self.watchlist.selected_stock() {
                    let symbol = stock.symbol.clone();
                    self.remove_from_watchlist(&symbol);
                }
            }
            KeyCode::Char('e') => {
                let stocks = self.watchlist.stocks().to_vec();
                self.export(&stocks, "watchlist.csv");
            }
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.poller = None;
                self.detail = None;
                self.go_back();
            }
            KeyCode::Char('a') => {
                if let Some(detail) = &self.detail {
                    let symbol = detail.symbol.clone();
                    self.add_to_watchlist(&symbol);
                }
            }
            KeyCode::Char('r') => {
                if let Some(detail) = &self.detail {
                    let symbol = detail.symbol.clone();
                    self.request_analysis(&symbol);
                }
            }
            _ => {}
        }
    }

    // --- actions ------------------------------------------------------

    fn submit_login(&mut self) {
        let username = self.login_form.value(0).trim().to_string();
        let password = self.login_form.value(1).to_string();
        if username.is_empty() || password.is_empty() {
            self.status = "Username and password are required".to_string();
            return;
        }

        match self.client.login(&username, &password) {
            Ok(token) => {
                if let Err(e) = self.session.store(&username, &token.access_token) {
                    error!(target: "session", "failed to persist session: {}", e);
                }
                self.client.set_token(Some(token.access_token));
                self.login_form.clear();
                self.status = format!("Logged in as {}", username);
                if self.config.behavior.auto_load_watchlist {
                    self.load_watchlist();
                }
                self.navigate(View::Home);
            }
            Err(e) => {
                self.status = format!("Login failed: {}", e);
            }
        }
    }

    fn submit_register(&mut self) {
        let email = self.register_form.value(0).trim().to_string();
        let username = self.register_form.value(1).trim().to_string();
        let password = self.register_form.value(2).to_string();
        if email.is_empty() || username.is_empty() || password.is_empty() {
            self.status = "Email, username and password are required".to_string();
            return;
        }

        match self.client.register(&email, &username, &password) {
            Ok(user) => {
                info!(target: "auth", "registered account {}", user.username);
                self.register_form.clear();
                // Auto-login after registration, as the original client did
                self.login_form.set_value(0, &username);
                self.login_form.set_value(1, &password);
                self.submit_login();
            }
            Err(e) => {
                self.status = format!("Registration failed: {}", e);
            }
        }
    }

    fn logout(&mut self) {
        if !self.session.is_authenticated() {
            self.status = "Not logged in".to_string();
            return;
        }
        if let Err(e) = self.session.clear() {
            error!(target: "session", "failed to clear session: {}", e);
        }
        self.client.set_token(None);
        self.watchlist.set_stocks(Vec::new());
        self.status = "Logged out".to_string();
    }

    fn run_screen(&mut self) {
        let filters = match forms::parse_screen_filters(&self.screen_form.values()) {
            Ok(filters) => filters,
            Err(message) => {
                self.status = message;
                return;
            }
        };

        match self.client.screen_stocks(&filters) {
            Ok(stocks) => {
                self.status = format!("Screen matched {} stocks", stocks.len());
                self.screen_results.set_stocks(stocks);
                if !self.screen_results.is_empty() {
                    self.screen_focus = ScreenFocus::Results;
                }
            }
            Err(e) => self.report_error("Screening failed", e),
        }
    }

    fn load_watchlist(&mut self) {
        match self.client.get_watchlist() {
            Ok(stocks) => self.watchlist.set_stocks(stocks),
            Err(e) => self.report_error("Failed to load watchlist", e),
        }
    }

    fn add_to_watchlist(&mut self, symbol: &str) {
        match self.client.add_to_watchlist(symbol) {
            Ok(()) => self.status = format!("{} added to watchlist", symbol),
            Err(e) => self.report_error("Failed to add to watchlist", e),
        }
    }

    /// DELETE on the server, then drop the row locally - no reload.
    fn remove_from_watchlist(&mut self, symbol: &str) {
        match self.client.remove_from_watchlist(symbol) {
            Ok(()) => {
                self.watchlist.remove_symbol(symbol);
                self.status = format!("{} removed from watchlist", symbol);
            }
            Err(e) => self.report_error("Failed to remove from watchlist", e),
        }
    }

    fn populate(&mut self) {
        match self.client.populate_stocks() {
            Ok(()) => self.status = "Server-side data refresh triggered".to_string(),
            Err(e) => self.report_error("Populate failed", e),
        }
    }

    fn open_detail(&mut self, symbol: &str) {
        match self.client.search_stock(symbol) {
            Ok(stock) => {
                let symbol = stock.symbol.clone();
                let mut detail = DetailState::new(&symbol);
                detail.stock = Some(stock);
                self.detail = Some(detail);
                self.prev_view = self.view;
                self.view = View::Detail;
                self.status = format!("Loaded {}", symbol);
                self.request_analysis(&symbol);
            }
            Err(e) => self.report_error("Failed to load stock data", e),
        }
    }

    /// Issue the first analysis request; a 202 arms the poller.
    fn request_analysis(&mut self, symbol: &str) {
        match self.client.get_analysis(symbol) {
            Ok(AnalysisStatus::Ready(analysis)) => {
                if let Some(detail) = &mut self.detail {
                    detail.analysis = AnalysisUi::Ready(Box::new(analysis));
                }
                self.poller = None;
            }
            Ok(AnalysisStatus::Processing) => {
                if let Some(detail) = &mut self.detail {
                    detail.analysis = AnalysisUi::Polling { attempts: 0 };
                }
                self.poller = Some(AnalysisPoller::new(
                    symbol,
                    self.config.poll_interval(),
                    self.config.server.poll_max_attempts,
                ));
            }
            Err(e) => {
                if let Some(detail) = &mut self.detail {
                    detail.analysis = AnalysisUi::Failed(format!("Analysis unavailable: {}", e));
                }
                self.poller = None;
            }
        }
    }

    /// Runs on every loop pass; re-polls the analysis endpoint once the
    /// configured interval has elapsed since the last 202.
    fn on_tick(&mut self) {
        if self.view != View::Detail {
            return;
        }
        let Some(poller) = &mut self.poller else {
            return;
        };
        if !poller.is_due() {
            return;
        }

        let symbol = poller.symbol().to_string();
        match self.client.get_analysis(&symbol) {
            Ok(AnalysisStatus::Ready(analysis)) => {
                if let Some(detail) = &mut self.detail {
                    detail.analysis = AnalysisUi::Ready(Box::new(analysis));
                }
                self.poller = None;
                self.status = format!("AI analysis for {} ready", symbol);
            }
            Ok(AnalysisStatus::Processing) => {
                let outcome = self
                    .poller
                    .as_mut()
                    .map(|p| p.record_processing().map(|_| p.attempts()));
                match outcome {
                    Some(Ok(attempts)) => {
                        if let Some(detail) = &mut self.detail {
                            detail.analysis = AnalysisUi::Polling { attempts };
                        }
                    }
                    Some(Err(e)) => {
                        if let Some(detail) = &mut self.detail {
                            detail.analysis = AnalysisUi::Failed(e.to_string());
                        }
                        self.poller = None;
                    }
                    None => {}
                }
            }
            Err(e) => {
                if let Some(detail) = &mut self.detail {
                    detail.analysis = AnalysisUi::Failed(format!("Analysis failed: {}", e));
                }
                self.poller = None;
            }
        }
    }

    fn export_results(&mut self) {
        let stocks = self.screen_results.stocks().to_vec();
        self.export(&stocks, "screen_results.csv");
    }

    fn export(&mut self, stocks: &[crate::api_client::Stock], filename: &str) {
        if stocks.is_empty() {
            self.status = "Nothing to export".to_string();
            return;
        }
        match export_stocks_csv(stocks, filename) {
            Ok(()) => self.status = format!("Exported {} rows to {}", stocks.len(), filename),
            Err(e) => self.status = format!("Export failed: {}", e),
        }
    }

    fn report_error(&mut self, context: &str, err: crate::error::ApiError) {
        error!(target: "ui", "{}: {}", context, err);
        self.status = format!("{}: {}", context, err);
        if err.needs_login() {
            self.navigate(View::Login);
        }
    }

    // --- rendering ----------------------------------------------------

    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_title_bar(f, chunks[0]);

        match self.view {
            View::Home => self.render_home(f, chunks[1]),
            View::Login => {
                let area = form_area(chunks[1], 40, 6);
                self.login_form.render(f, area, true);
            }
            View::Register => {
                let area = form_area(chunks[1], 40, 9);
                self.register_form.render(f, area, true);
            }
            View::Screen => self.render_screen(f, chunks[1]),
            View::Watchlist => {
                self.watchlist
                    .render(f, chunks[1], "My Watchlist", self.config.display.compact_mode);
                if self.watchlist.is_empty() {
                    self.render_empty_watchlist_hint(f, chunks[1]);
                }
            }
            View::Detail => {
                if let Some(detail) = &self.detail {
                    render_detail(f, chunks[1], detail);
                }
            }
        }

        self.render_status_bar(f, chunks[2]);

        if self.lookup_active {
            self.render_lookup_popup(f);
        }
        if self.show_help {
            self.render_help_popup(f);
        }
    }

    fn render_title_bar(&self, f: &mut Frame, area: Rect) {
        let user = self.session.username().unwrap_or("anonymous");
        let title = Line::from(vec![
            Span::styled(
                " Stock Screener ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" {} ", self.view.title())),
            Span::styled(
                format!(" [{}] ", user),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        f.render_widget(Paragraph::new(title), area);
    }

    fn render_home(&self, f: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                "Find undervalued stocks with AI-powered analysis",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("  s  - Stock screener (filter by fundamentals)"),
            Line::from("  w  - My watchlist"),
            Line::from("  /  - Look up a symbol"),
            Line::from(""),
            Line::from("  l  - Login    r - Register    o - Logout"),
            Line::from("  p  - Trigger server-side data refresh"),
            Line::from(""),
            Line::from("  F1 - Help     q - Quit"),
        ];
        let home = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Home"))
            .wrap(Wrap { trim: false });
        f.render_widget(home, area);
    }

    fn render_screen(&mut self, f: &mut Frame, area: Rect) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(30)])
            .split(area);

        let form_block = Block::default()
            .borders(Borders::ALL)
            .title("Screening Filters")
            .border_style(if self.screen_focus == ScreenFocus::Form {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            });
        let inner = form_block.inner(halves[0]);
        f.render_widget(form_block, halves[0]);
        self.screen_form
            .render(f, inner, self.screen_focus == ScreenFocus::Form);

        self.screen_results.render(
            f,
            halves[1],
            "Results",
            self.config.display.compact_mode,
        );
    }

    fn render_empty_watchlist_hint(&self, f: &mut Frame, area: Rect) {
        let hint_area = form_area(area, 60, 4);
        let hint = Paragraph::new(vec![
            Line::from("Your watchlist is empty."),
            Line::from("Use the stock screener to find interesting stocks."),
        ])
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray));
        f.render_widget(Clear, hint_area);
        f.render_widget(hint, hint_area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let hints = if self.config.display.show_help_hints {
            match self.view {
                View::Home => " | F1=Help q=Quit",
                View::Login | View::Register => " | Tab=Next field Enter=Submit Esc=Back",
                View::Screen => " | Enter=Run a=Watch e=Export Esc=Back",
                View::Watchlist => " | d=Remove r=Refresh Enter=Detail Esc=Back",
                View::Detail => " | a=Watch r=Re-check Esc=Back",
            }
        } else {
            ""
        };
        let status = Paragraph::new(Line::from(vec![
            Span::styled(&self.status, Style::default().fg(Color::White)),
            Span::styled(hints, Style::default().fg(Color::DarkGray)),
        ]))
        .style(Style::default().bg(Color::DarkGray));
        f.render_widget(status, area);
    }

    fn render_lookup_popup(&self, f: &mut Frame) {
        let area = form_area(f.area(), 30, 3);
        f.render_widget(Clear, area);
        let input = Paragraph::new(self.lookup.value())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title("Symbol"));
        f.render_widget(input, area);
        f.set_cursor_position((
            area.x + self.lookup.visual_cursor() as u16 + 1,
            area.y + 1,
        ));
    }

    fn render_help_popup(&self, f: &mut Frame) {
        let area = centered_rect(70, 70, f.area());
        f.render_widget(Clear, area);

        let help_text = vec![
            Line::from(vec![Span::styled(
                "Stock Screener Help",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from("Home:"),
            Line::from("  s/w       - Screener / Watchlist (login required)"),
            Line::from("  /         - Look up a symbol"),
            Line::from("  l/r/o     - Login / Register / Logout"),
            Line::from("  p         - Trigger server-side data refresh"),
            Line::from(""),
            Line::from("Screener:"),
            Line::from("  Tab/Up/Down - Move between filter fields"),
            Line::from("  Enter       - Run the screen"),
            Line::from("  Right/Left  - Switch between form and results"),
            Line::from("  a           - Add selected stock to watchlist"),
            Line::from("  e           - Export results to CSV"),
            Line::from(""),
            Line::from("Watchlist:"),
            Line::from("  d/Delete  - Remove selected stock (no reload)"),
            Line::from("  r         - Refresh from server"),
            Line::from(""),
            Line::from("Stock detail:"),
            Line::from("  a         - Add to watchlist"),
            Line::from("  r         - Re-request the AI analysis"),
            Line::from(""),
            Line::from("AI analysis polls every few seconds while the server"),
            Line::from("generates the report (HTTP 202 = still processing)."),
        ];

        let help_popup = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: true });

        f.render_widget(help_popup, area);
    }
}

/// Fixed-size centered area for forms and popups.
fn form_area(parent: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(parent.width);
    let height = height.min(parent.height);
    Rect {
        x: parent.x + (parent.width - width) / 2,
        y: parent.y + (parent.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

// Helper function to create a centered rect
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

pub fn run_tui(
    config: Config,
    client: ApiClient,
    session: SessionStore,
    initial_symbol: Option<String>,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = TuiApp::new(client, session, config);
    if let Some(symbol) = initial_symbol {
        app.open_detail(&symbol);
    }
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_views() {
        assert!(View::Screen.requires_auth());
        assert!(View::Watchlist.requires_auth());
        assert!(!View::Home.requires_auth());
        assert!(!View::Detail.requires_auth());
        assert!(!View::Login.requires_auth());
    }

    #[test]
    fn test_unauthenticated_redirects_to_login() {
        assert_eq!(resolve_route(View::Screen, false), View::Login);
        assert_eq!(resolve_route(View::Watchlist, false), View::Login);
        assert_eq!(resolve_route(View::Home, false), View::Home);
    }

    #[test]
    fn test_authenticated_passes_through() {
        assert_eq!(resolve_route(View::Screen, true), View::Screen);
        assert_eq!(resolve_route(View::Watchlist, true), View::Watchlist);
    }
}
