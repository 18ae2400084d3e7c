mod view;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use backoffice::{
    ApiClient, Batch, Category, ChainedTokens, ControllerError, Expense, GatewayError,
    HttpGateway, Notice, NoticeLevel, Outcome, SessionFile, StaticToken, TokenSource,
};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
    ui::{self, keymap::AppAction},
};

pub use view::{KeyResult, Phase, ResourceView};

const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Token,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Batches,
    Categories,
    Expenses,
}

impl Section {
    pub const ALL: [Section; 3] = [Self::Batches, Self::Categories, Self::Expenses];

    pub fn label(self) -> &'static str {
        match self {
            Self::Batches => "Batches",
            Self::Categories => "Categories",
            Self::Expenses => "Expenses",
        }
    }

    fn from_digit(ch: char) -> Option<Self> {
        match ch {
            '1' => Some(Self::Batches),
            '2' => Some(Self::Categories),
            '3' => Some(Self::Expenses),
            _ => None,
        }
    }
}

/// A finished remote call, tagged with the tab that issued it.
#[derive(Debug)]
pub enum Completion {
    Batches(Outcome<Batch>),
    Categories(Outcome<Category>),
    Expenses(Outcome<Expense>),
}

#[derive(Debug, Default)]
pub struct TokenState {
    pub input: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub level: NoticeLevel,
    pub message: String,
    shown_at: Instant,
}

impl From<Notice> for ToastState {
    fn from(notice: Notice) -> Self {
        Self {
            level: notice.level,
            message: notice.message,
            shown_at: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConnectionState {
    pub ok: bool,
}

/// What a finished call says about the server, for the info bar.
enum Health {
    Refreshed,
    Reachable,
    Unreachable,
    SignedOut,
}

fn health<R>(outcome: &Outcome<R>) -> Health {
    let err = match outcome {
        Outcome::Listed { result: Ok(_), .. } => return Health::Refreshed,
        Outcome::Listed { result: Err(err), .. }
        | Outcome::References { result: Err(err), .. }
        | Outcome::Fetched { result: Err(err), .. }
        | Outcome::Created { result: Err(err), .. }
        | Outcome::Updated { result: Err(err), .. }
        | Outcome::Deleted { result: Err(err), .. } => err,
        _ => return Health::Reachable,
    };
    match err {
        GatewayError::Transport(_) => Health::Unreachable,
        GatewayError::Auth => Health::SignedOut,
        _ => Health::Reachable,
    }
}

pub struct AppState {
    pub screen: Screen,
    pub section: Section,
    pub batches: ResourceView<Batch>,
    pub categories: ResourceView<Category>,
    pub expenses: ResourceView<Expense>,
    pub token: TokenState,
    pub toast: Option<ToastState>,
    pub last_refresh: Option<DateTime<Local>>,
    pub connection: ConnectionState,
    pub base_url: String,
}

impl AppState {
    pub fn phase(&self) -> Phase {
        match self.section {
            Section::Batches => self.batches.phase(),
            Section::Categories => self.categories.phase(),
            Section::Expenses => self.expenses.phase(),
        }
    }
}

pub struct App {
    session: SessionFile,
    tokens: Arc<dyn TokenSource>,
    pub state: AppState,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let session = SessionFile::new(&config.session_file);
        // A token typed at the prompt lands in the session file, so it wins
        // over one from config.
        let sources: Vec<Box<dyn TokenSource>> = vec![
            Box::new(session.clone()),
            Box::new(StaticToken(config.token.clone())),
        ];
        let tokens: Arc<dyn TokenSource> = Arc::new(ChainedTokens(sources));
        let client = ApiClient::new(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            tokens.clone(),
        )?;
        let (tx, rx) = mpsc::unbounded_channel();

        let state = AppState {
            screen: Screen::Token,
            section: Section::Batches,
            batches: ResourceView::new(HttpGateway::new(client.clone()), Completion::Batches),
            categories: ResourceView::new(
                HttpGateway::new(client.clone()),
                Completion::Categories,
            ),
            expenses: ResourceView::new(HttpGateway::new(client.clone()), Completion::Expenses),
            token: TokenState::default(),
            toast: None,
            last_refresh: None,
            connection: ConnectionState { ok: true },
            base_url: client.base_url().to_string(),
        };

        Ok(Self {
            session,
            tokens,
            state,
            tx,
            rx,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        if self.tokens.bearer_token().is_some() {
            self.enter_main();
        }

        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(100);

        while !self.should_quit {
            self.drain_completions();
            self.expire_toast();

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    _ => {}
                }
            }
        }

        Ok(())
    }

    fn enter_main(&mut self) {
        self.state.screen = Screen::Main;
        self.state.token = TokenState::default();
        self.mount_current();
    }

    fn mount_current(&mut self) {
        match self.state.section {
            Section::Batches => self.state.batches.mount(&self.tx),
            Section::Categories => self.state.categories.mount(&self.tx),
            Section::Expenses => self.state.expenses.mount(&self.tx),
        }
    }

    fn switch_section(&mut self, section: Section) {
        if self.state.section != section {
            tracing::debug!("switching to {}", section.label());
        }
        self.state.section = section;
        self.mount_current();
    }

    fn drain_completions(&mut self) {
        while let Ok(completion) = self.rx.try_recv() {
            self.on_completion(completion);
        }
    }

    fn on_completion(&mut self, completion: Completion) {
        let (health, notice) = match completion {
            Completion::Batches(outcome) => {
                let health = health(&outcome);
                self.state.batches.resolve(outcome);
                (health, self.state.batches.take_notice())
            }
            Completion::Categories(outcome) => {
                let health = health(&outcome);
                self.state.categories.resolve(outcome);
                (health, self.state.categories.take_notice())
            }
            Completion::Expenses(outcome) => {
                let health = health(&outcome);
                self.state.expenses.resolve(outcome);
                (health, self.state.expenses.take_notice())
            }
        };

        match health {
            Health::Refreshed => {
                self.state.last_refresh = Some(Local::now());
                self.state.connection.ok = true;
            }
            Health::Reachable => self.state.connection.ok = true,
            Health::Unreachable => self.state.connection.ok = false,
            Health::SignedOut => {
                self.state.connection.ok = true;
                if self.state.screen == Screen::Main {
                    tracing::warn!("bearer token rejected, prompting for a new one");
                    self.state.screen = Screen::Token;
                    self.state.token.message = notice.as_ref().map(|n| n.message.clone());
                }
            }
        }

        if let Some(notice) = notice {
            self.state.toast = Some(notice.into());
        }
    }

    fn expire_toast(&mut self) {
        if self
            .state
            .toast
            .as_ref()
            .is_some_and(|toast| toast.shown_at.elapsed() >= TOAST_TTL)
        {
            self.state.toast = None;
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let action = ui::keymap::map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }
        match self.state.screen {
            Screen::Token => self.handle_token_key(action),
            Screen::Main => self.handle_main_key(action),
        }
    }

    fn handle_token_key(&mut self, action: AppAction) {
        let token = &mut self.state.token;
        match action {
            AppAction::Input(ch) => token.input.push(ch),
            AppAction::Backspace => {
                token.input.pop();
            }
            AppAction::Cancel => self.should_quit = true,
            AppAction::Submit => {
                let input = token.input.trim().to_string();
                if input.is_empty() {
                    token.message = Some("Enter a bearer token.".to_string());
                    return;
                }
                match self.session.save(&input) {
                    Ok(()) => {
                        tracing::info!("token saved to {}", self.session.path().display());
                        self.enter_main();
                    }
                    Err(err) => {
                        tracing::warn!("saving session failed: {err}");
                        token.message = Some(format!("Could not save token: {err}"));
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_main_key(&mut self, action: AppAction) {
        let tx = &self.tx;
        let (result, notice) = match self.state.section {
            Section::Batches => {
                let view = &mut self.state.batches;
                (view.handle_key(action, tx), view.take_notice())
            }
            Section::Categories => {
                let view = &mut self.state.categories;
                (view.handle_key(action, tx), view.take_notice())
            }
            Section::Expenses => {
                let view = &mut self.state.expenses;
                (view.handle_key(action, tx), view.take_notice())
            }
        };

        match result {
            Ok(KeyResult::Handled) => {}
            Ok(KeyResult::Unhandled(action)) => self.handle_global_key(action),
            Err(err) => self.report(err),
        }
        if let Some(notice) = notice {
            self.state.toast = Some(notice.into());
        }
    }

    fn handle_global_key(&mut self, action: AppAction) {
        match action {
            AppAction::Input('q') => self.should_quit = true,
            AppAction::Input(ch) => {
                if let Some(section) = Section::from_digit(ch) {
                    self.switch_section(section);
                }
            }
            _ => {}
        }
    }

    fn report(&mut self, err: ControllerError) {
        tracing::debug!("key rejected: {err}");
        let text = err.to_string();
        let mut chars = text.chars();
        let message = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        self.state.toast = Some(ToastState::from(Notice {
            level: NoticeLevel::Error,
            message,
        }));
    }
}
