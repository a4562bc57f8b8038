use anyhow::Result;
use crossterm::style::Stylize;
use reedline::{
    default_emacs_keybindings, ColumnarMenu, Emacs, FileBackedHistory, KeyCode, KeyModifiers,
    MenuBuilder, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline,
    ReedlineEvent, ReedlineMenu, Signal,
};
use std::borrow::Cow;

mod completer;
mod table_display;

use completer::CommandCompleter;
use screener_cli::api_client::{AiAnalysis, AnalysisStatus, ApiClient, ScreeningFilters, Stock};
use screener_cli::config::Config;
use screener_cli::error::ApiError;
use screener_cli::export::export_stocks_csv;
use screener_cli::poller::AnalysisPoller;
use screener_cli::session::SessionStore;
use screener_cli::utils::app_paths::AppPaths;
use table_display::{display_analysis, display_stock_detail, display_stocks};

struct ScreenerPrompt {
    username: Option<String>,
}

impl Prompt for ScreenerPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        match &self.username {
            Some(user) => Cow::Owned(format!("{}@screener> ", user)),
            None => Cow::Borrowed("screener> "),
        }
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("> ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse search: {})",
            prefix, history_search.term
        ))
    }
}

fn print_help() {
    println!("{}", "screener-cli - Stock screening terminal client".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  screener-cli [OPTIONS] [SYMBOL]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}     - Use classic REPL mode", "--classic".green());
    println!(
        "  {} - Write a commented default config file",
        "--generate-config".green()
    );
    println!("  {}        - Show this help", "--help".green());
    println!();
    println!("{}", "Classic mode commands:".yellow());
    println!("  login <user> <pass>              - Authenticate");
    println!("  register <email> <user> <pass>   - Create an account (auto-login)");
    println!("  logout                           - Clear the saved session");
    println!("  search <SYMBOL>                  - One stock's fundamentals");
    println!("  screen [field=value ...]         - Screen by thresholds");
    println!("      e.g. screen min_pe_ratio=5 max_pe_ratio=20 sectors=Technology");
    println!("  watchlist                        - Show the watchlist");
    println!("  watch <SYMBOL> / unwatch <SYMBOL>");
    println!("  analysis <SYMBOL>                - AI analysis (polls until ready)");
    println!("  populate                         - Trigger server-side refresh");
    println!("  \\export <file>                   - Last results to CSV");
    println!("  \\help  \\clear  \\quit");
    println!();
}

/// Fetch an analysis, sleeping between polls while the server answers 202.
fn fetch_analysis_blocking(
    client: &ApiClient,
    config: &Config,
    symbol: &str,
) -> Result<AiAnalysis, ApiError> {
    if let AnalysisStatus::Ready(analysis) = client.get_analysis(symbol)? {
        return Ok(analysis);
    }

    println!(
        "{}",
        format!(
            "Generating AI analysis for {} (checking every {}s)...",
            symbol,
            config.server.poll_interval_secs
        )
        .cyan()
    );

    let mut poller = AnalysisPoller::new(
        symbol,
        config.poll_interval(),
        config.server.poll_max_attempts,
    );
    loop {
        std::thread::sleep(poller.interval());
        match client.get_analysis(symbol)? {
            AnalysisStatus::Ready(analysis) => return Ok(analysis),
            AnalysisStatus::Processing => {
                poller.record_processing()?;
                println!("  still processing (attempt {})", poller.attempts());
            }
        }
    }
}

fn run_classic(config: Config, mut client: ApiClient, mut session: SessionStore) -> Result<()> {
    print_help();

    let history_file = AppPaths::history_file()
        .unwrap_or_else(|_| dirs::home_dir().unwrap().join(".screener_cli_history"));
    let history = Box::new(
        FileBackedHistory::with_file(100, history_file).expect("Error configuring history"),
    );

    let completer = Box::new(CommandCompleter::new());

    let completion_menu = Box::new(
        ColumnarMenu::default()
            .with_name("command_completion")
            .with_columns(1)
            .with_column_width(None)
            .with_column_padding(2),
    );

    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Menu("command_completion".to_string()),
    );

    let edit_mode = Box::new(Emacs::new(keybindings));

    let mut line_editor = Reedline::create()
        .with_completer(completer)
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_history(history)
        .with_edit_mode(edit_mode);

    println!(
        "{}",
        format!("Connected to API: {}", client.base_url()).cyan()
    );
    if let Some(user) = session.username() {
        println!("{}", format!("Logged in as {}", user).green());
    }

    let mut last_results: Option<Vec<Stock>> = None;

    loop {
        let prompt = ScreenerPrompt {
            username: session.username().map(String::from),
        };
        let sig = line_editor.read_line(&prompt)?;
        match sig {
            Signal::Success(buffer) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if matches!(trimmed, "\\quit" | "quit" | "exit") {
                    println!("Goodbye!");
                    break;
                }
                if matches!(trimmed, "\\help" | "help") {
                    print_help();
                    continue;
                }
                if trimmed == "\\clear" {
                    print!("{esc}[2J{esc}[1;1H", esc = 27 as char);
                    continue;
                }
                if let Some(rest) = trimmed.strip_prefix("\\export") {
                    let filename = rest.trim();
                    if filename.is_empty() {
                        eprintln!("{}", "Usage: \\export <filename>".red());
                        continue;
                    }
                    match &last_results {
                        Some(results) => match export_stocks_csv(results, filename) {
                            Ok(()) => {
                                println!("Exported {} rows to {}", results.len(), filename)
                            }
                            Err(e) => eprintln!("{}", format!("Export error: {}", e).red()),
                        },
                        None => {
                            eprintln!("{}", "No results to export. Run a screen first.".red())
                        }
                    }
                    continue;
                }

                match run_command(trimmed, &config, &mut client, &mut session) {
                    Ok(results) => {
                        if let Some(results) = results {
                            last_results = Some(results);
                        }
                    }
                    Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                }
            }
            Signal::CtrlD | Signal::CtrlC => {
                println!("\nGoodbye!");
                break;
            }
        }
    }

    Ok(())
}

/// Dispatch one REPL command. Returns rows when the command produced a
/// stock list, so \export can pick them up.
fn run_command(
    line: &str,
    config: &Config,
    client: &mut ApiClient,
    session: &mut SessionStore,
) -> Result<Option<Vec<Stock>>> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let require_login = |session: &SessionStore| -> Result<()> {
        if session.is_authenticated() {
            Ok(())
        } else {
            anyhow::bail!("please login first")
        }
    };

    match parts[0] {
        "login" => {
            if parts.len() != 3 {
                anyhow::bail!("usage: login <username> <password>");
            }
            let token = client.login(parts[1], parts[2])?;
            session.store(parts[1], &token.access_token)?;
            client.set_token(Some(token.access_token));
            println!("{}", format!("Logged in as {}", parts[1]).green());
            Ok(None)
        }
        "register" => {
            if parts.len() != 4 {
                anyhow::bail!("usage: register <email> <username> <password>");
            }
            let user = client.register(parts[1], parts[2], parts[3])?;
            println!("{}", format!("Account {} created", user.username).green());
            // Auto-login after registration
            let token = client.login(parts[2], parts[3])?;
            session.store(parts[2], &token.access_token)?;
            client.set_token(Some(token.access_token));
            println!("{}", format!("Logged in as {}", parts[2]).green());
            Ok(None)
        }
        "logout" => {
            session.clear()?;
            client.set_token(None);
            println!("Logged out");
            Ok(None)
        }
        "search" => {
            if parts.len() != 2 {
                anyhow::bail!("usage: search <symbol>");
            }
            let stock = client.search_stock(parts[1])?;
            display_stock_detail(&stock);
            Ok(Some(vec![stock]))
        }
        "screen" => {
            require_login(session)?;
            let filters = ScreeningFilters::from_key_values(parts[1..].iter().copied())?;
            let stocks = client.screen_stocks(&filters)?;
            display_stocks(&stocks);
            Ok(Some(stocks))
        }
        "watchlist" => {
            require_login(session)?;
            let stocks = client.get_watchlist()?;
            if stocks.is_empty() {
                println!("Your watchlist is empty - use 'screen' to find stocks.");
            } else {
                display_stocks(&stocks);
            }
            Ok(Some(stocks))
        }
        "watch" => {
            if parts.len() != 2 {
                anyhow::bail!("usage: watch <symbol>");
            }
            require_login(session)?;
            client.add_to_watchlist(parts[1])?;
            println!("{}", format!("{} added to watchlist", parts[1].to_uppercase()).green());
            Ok(None)
        }
        "unwatch" => {
            if parts.len() != 2 {
                anyhow::bail!("usage: unwatch <symbol>");
            }
            require_login(session)?;
            client.remove_from_watchlist(parts[1])?;
            println!(
                "{}",
                format!("{} removed from watchlist", parts[1].to_uppercase()).green()
            );
            Ok(None)
        }
        "analysis" => {
            if parts.len() != 2 {
                anyhow::bail!("usage: analysis <symbol>");
            }
            let analysis = fetch_analysis_blocking(client, config, parts[1])?;
            display_analysis(&analysis);
            Ok(None)
        }
        "populate" => {
            client.populate_stocks()?;
            println!("Server-side data refresh triggered");
            Ok(None)
        }
        other => anyhow::bail!("unknown command '{}' - try \\help", other),
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|a| a == "--generate-config") {
        let path = Config::get_config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, Config::create_default_with_comments())?;
        println!("Configuration file created at: {:?}", path);
        return Ok(());
    }

    match screener_cli::utils::logging::init_tracing() {
        Ok(log_path) => {
            eprintln!("Logs: {}", log_path.display());
        }
        Err(e) => eprintln!("Warning: could not set up log file: {}", e),
    }

    let config = Config::load()?;
    let mut client = ApiClient::with_timeout(&config.server.api_url, config.timeout())?;
    let session = SessionStore::load()?;
    client.set_token(session.token().map(String::from));

    // A bare SYMBOL argument opens the detail view directly
    let symbol = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(|s| s.to_string());

    if args.iter().any(|a| a == "--classic") {
        run_classic(config, client, session)
    } else {
        screener_cli::ui::app::run_tui(config, client, session, symbol)
    }
}
