use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use engine::{
    Applied, Client, ClientError, Credentials, ListView, Listing, OrderAction, OrderStatus, Pager,
    Session, Ticket, loader,
    views::{GiftRow, GroupRow, OrderRow, UserRow, gift_categories},
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
    local_state::LocalState,
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

pub mod form;

pub use form::{FormField, GiftFormState};

const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Orders,
    Gifts,
    Users,
    Groups,
}

impl Section {
    pub const ALL: [Section; 4] = [Self::Orders, Self::Gifts, Self::Users, Self::Groups];

    pub fn label(self) -> &'static str {
        match self {
            Self::Orders => "Ordini",
            Self::Gifts => "Regali",
            Self::Users => "Utenti",
            Self::Groups => "Gruppi",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Orders => Self::Gifts,
            Self::Gifts => Self::Users,
            Self::Users => Self::Groups,
            Self::Groups => Self::Orders,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Debug)]
pub struct LoginState {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    pub message: Option<String>,
    pub pending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    pub expires_at: Instant,
}

#[derive(Debug)]
pub struct GiftsState {
    pub list: ListView<GiftRow>,
    /// Gift name used as category filter.
    pub category: Option<String>,
    pub pending_delete: Option<i64>,
}

impl GiftsState {
    fn new(page_size: u32) -> Self {
        Self {
            list: ListView::new(page_size),
            category: None,
            pending_delete: None,
        }
    }

    pub fn visible(&self) -> Vec<&GiftRow> {
        self.list
            .items
            .iter()
            .filter(|gift| {
                self.category
                    .as_deref()
                    .is_none_or(|category| gift.name.trim() == category)
            })
            .collect()
    }

    pub fn selected_row(&self) -> Option<&GiftRow> {
        self.visible().get(self.list.selected).copied()
    }

    fn select_next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        self.list.selected = (self.list.selected + 1).min(len - 1);
    }

    fn select_prev(&mut self) {
        self.list.selected = self.list.selected.saturating_sub(1);
    }

    pub fn categories(&self) -> Vec<String> {
        gift_categories(self.list.items.iter().map(|gift| gift.name.as_str()))
    }

    /// All → first category → … → last category → all.
    fn cycle_category(&mut self) {
        let categories = self.categories();
        self.category = match &self.category {
            None => categories.first().cloned(),
            Some(current) => categories
                .iter()
                .position(|category| category == current)
                .and_then(|idx| categories.get(idx + 1))
                .cloned(),
        };
        self.list.selected = 0;
    }

    /// Drops a filter whose gift is gone and keeps the selection inside the
    /// filtered rows.
    fn retain_category(&mut self) {
        if let Some(current) = &self.category {
            if !self.categories().contains(current) {
                self.category = None;
            }
        }
        let visible = self.visible().len();
        self.list.selected = self.list.selected.min(visible.saturating_sub(1));
    }

    fn reset(&mut self) {
        self.list.reset();
        self.category = None;
        self.pending_delete = None;
    }
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub section: Section,
    pub login: LoginState,
    pub user_label: String,
    pub orders: ListView<OrderRow>,
    pub gifts: GiftsState,
    pub users: ListView<UserRow>,
    pub groups: ListView<GroupRow>,
    pub gift_form: Option<GiftFormState>,
    pub toast: Option<ToastState>,
    pub base_url: String,
}

impl AppState {
    pub fn is_loading(&self, section: Section) -> bool {
        match section {
            Section::Orders => self.orders.loading,
            Section::Gifts => self.gifts.list.loading,
            Section::Users => self.users.loading,
            Section::Groups => self.groups.loading,
        }
    }
}

/// Results of background tasks, delivered to the event loop.
#[derive(Debug)]
pub enum AppEvent {
    Login {
        credentials: Credentials,
        result: std::result::Result<(), ClientError>,
    },
    Orders(Ticket, std::result::Result<Listing<OrderRow>, ClientError>),
    Gifts(Ticket, std::result::Result<Listing<GiftRow>, ClientError>),
    Users(Ticket, std::result::Result<Listing<UserRow>, ClientError>),
    Groups(Ticket, std::result::Result<Listing<GroupRow>, ClientError>),
    OrderUpdated {
        order_id: i64,
        status: OrderStatus,
        result: std::result::Result<(), ClientError>,
    },
    GiftSaved(std::result::Result<i64, ClientError>),
    GiftDeleted {
        present_id: i64,
        result: std::result::Result<(), ClientError>,
    },
}

pub struct App {
    config: AppConfig,
    client: Client,
    session: Session,
    local: LocalState,
    pub state: AppState,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url)?;
        let mut local = LocalState::load(&config.state_path)?;

        if config.token.is_some() && local.token != config.token {
            local.token = config.token.clone();
            local.save(&config.state_path)?;
        }

        let session = Session::new(local.token.clone().map(Credentials::bearer));
        let username = if config.username.is_empty() {
            local.username.clone().unwrap_or_default()
        } else {
            config.username.clone()
        };
        let screen = if session.is_authenticated() {
            Screen::Home
        } else {
            Screen::Login
        };
        let focus = if username.is_empty() {
            LoginField::Username
        } else {
            LoginField::Password
        };
        let user_label = if session.is_authenticated() {
            "token".to_string()
        } else {
            username.clone()
        };

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let page_size = config.page_size;
        let state = AppState {
            screen,
            section: Section::Orders,
            login: LoginState {
                username,
                password: String::new(),
                focus,
                message: None,
                pending: false,
            },
            user_label,
            orders: ListView::new(page_size),
            gifts: GiftsState::new(page_size),
            users: ListView::new(page_size),
            groups: ListView::new(page_size),
            gift_form: None,
            toast: None,
            base_url: client.base_url().to_string(),
        };

        Ok(Self {
            config,
            client,
            session,
            local,
            state,
            events_tx,
            events_rx,
            should_quit: false,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        if self.session.is_authenticated() {
            self.load(self.state.section);
        }
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        ui::restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(100);

        while !self.should_quit {
            self.drain_events();
            self.expire_toast();

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    pub(crate) fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Login {
                credentials,
                result,
            } => self.finish_login(credentials, result),
            AppEvent::Orders(ticket, result) => {
                let applied = self.state.orders.apply(ticket, result);
                self.after_load(Section::Orders, applied);
            }
            AppEvent::Gifts(ticket, result) => {
                let applied = self.state.gifts.list.apply(ticket, result);
                if matches!(applied, Applied::Updated | Applied::PageMoved) {
                    self.state.gifts.retain_category();
                }
                self.after_load(Section::Gifts, applied);
            }
            AppEvent::Users(ticket, result) => {
                let applied = self.state.users.apply(ticket, result);
                self.after_load(Section::Users, applied);
            }
            AppEvent::Groups(ticket, result) => {
                let applied = self.state.groups.apply(ticket, result);
                self.after_load(Section::Groups, applied);
            }
            AppEvent::OrderUpdated {
                order_id,
                status,
                result,
            } => match result {
                Ok(()) => {
                    self.toast(
                        ToastLevel::Success,
                        format!("Ordine #{order_id}: {}", status.label()),
                    );
                    self.load(Section::Orders);
                }
                Err(err) => self.report_failure(err),
            },
            AppEvent::GiftSaved(result) => {
                if let Some(form) = self.state.gift_form.as_mut() {
                    form.saving = false;
                }
                match result {
                    Ok(present_id) => {
                        self.state.gift_form = None;
                        self.toast(ToastLevel::Success, format!("Regalo #{present_id} salvato."));
                        self.load(Section::Gifts);
                    }
                    Err(err) if err.is_unauthorized() => self.expire_session(),
                    Err(ClientError::UploadFailed {
                        present_id,
                        uploaded,
                        source,
                    }) => {
                        tracing::warn!(
                            present_id,
                            uploaded,
                            err = %source,
                            "gift saved without all photos"
                        );
                        if let Some(form) = self.state.gift_form.as_mut() {
                            form.mark_saved(present_id, uploaded);
                            form.message = Some(message_for_error(&source));
                        }
                        self.toast(
                            ToastLevel::Error,
                            format!("Regalo #{present_id} salvato, immagini incomplete."),
                        );
                        self.load(Section::Gifts);
                    }
                    Err(err) => match self.state.gift_form.as_mut() {
                        Some(form) => form.message = Some(message_for_error(&err)),
                        None => self.toast(ToastLevel::Error, message_for_error(&err)),
                    },
                }
            }
            AppEvent::GiftDeleted { present_id, result } => match result {
                Ok(()) => {
                    self.toast(
                        ToastLevel::Success,
                        format!("Regalo #{present_id} eliminato."),
                    );
                    self.load(Section::Gifts);
                }
                Err(err) => self.report_failure(err),
            },
        }
    }

    fn after_load(&mut self, section: Section, applied: Applied) {
        match applied {
            Applied::Updated | Applied::Stale => {}
            Applied::PageMoved => self.load(section),
            Applied::Failed(ClientError::Unauthorized) => self.expire_session(),
            Applied::Failed(err) => {
                tracing::warn!(section = section.label(), %err, "list load failed");
                let message = message_for_error(&err);
                match section {
                    Section::Orders => self.state.orders.set_error(message),
                    Section::Gifts => self.state.gifts.list.set_error(message),
                    Section::Users => self.state.users.set_error(message),
                    Section::Groups => self.state.groups.set_error(message),
                }
            }
        }
    }

    fn report_failure(&mut self, err: ClientError) {
        if err.is_unauthorized() {
            self.expire_session();
        } else {
            self.toast(ToastLevel::Error, message_for_error(&err));
        }
    }

    /// Starts a background fetch for `section`. Overlapping fetches are
    /// allowed; only the latest ticket is applied.
    fn load(&mut self, section: Section) {
        let Some(credentials) = self.session.credentials().cloned() else {
            self.expire_session();
            return;
        };
        let client = self.client.clone();
        let tx = self.events_tx.clone();

        match section {
            Section::Orders => {
                let ticket = self.state.orders.begin();
                tokio::spawn(async move {
                    let result = loader::load_orders(&client, &credentials, ticket.query).await;
                    let _ = tx.send(AppEvent::Orders(ticket, result));
                });
            }
            Section::Gifts => {
                let ticket = self.state.gifts.list.begin();
                tokio::spawn(async move {
                    let result = loader::load_gifts(&client, &credentials, ticket.query).await;
                    let _ = tx.send(AppEvent::Gifts(ticket, result));
                });
            }
            Section::Users => {
                let ticket = self.state.users.begin();
                tokio::spawn(async move {
                    let result = loader::load_users(&client, &credentials, ticket.query).await;
                    let _ = tx.send(AppEvent::Users(ticket, result));
                });
            }
            Section::Groups => {
                let ticket = self.state.groups.begin();
                tokio::spawn(async move {
                    let result = loader::load_groups(&client, &credentials, ticket.query).await;
                    let _ = tx.send(AppEvent::Groups(ticket, result));
                });
            }
        }
    }

    fn pager_mut(&mut self, section: Section) -> &mut Pager {
        match section {
            Section::Orders => &mut self.state.orders.pager,
            Section::Gifts => &mut self.state.gifts.list.pager,
            Section::Users => &mut self.state.users.pager,
            Section::Groups => &mut self.state.groups.pager,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let action = map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }

        match self.state.screen {
            Screen::Login => self.handle_login_key(action),
            Screen::Home if self.state.gift_form.is_some() => self.handle_form_key(action),
            Screen::Home => self.handle_home_key(action),
        }
    }

    fn handle_login_key(&mut self, action: AppAction) {
        match action {
            AppAction::Cancel => self.should_quit = true,
            AppAction::NextField | AppAction::PrevField | AppAction::Up | AppAction::Down => {
                self.state.login.focus = match self.state.login.focus {
                    LoginField::Username => LoginField::Password,
                    LoginField::Password => LoginField::Username,
                };
            }
            AppAction::Submit => self.attempt_login(),
            AppAction::Backspace => {
                self.active_login_field().pop();
            }
            AppAction::Input(ch) => self.active_login_field().push(ch),
            _ => {}
        }
    }

    fn active_login_field(&mut self) -> &mut String {
        match self.state.login.focus {
            LoginField::Username => &mut self.state.login.username,
            LoginField::Password => &mut self.state.login.password,
        }
    }

    fn attempt_login(&mut self) {
        if self.state.login.pending {
            return;
        }
        let username = self.state.login.username.trim().to_string();
        let password = self.state.login.password.clone();
        if username.is_empty() || password.is_empty() {
            self.state.login.message = Some("Compila tutti i campi.".to_string());
            return;
        }

        let credentials = Credentials::basic(username, password);
        self.state.login.pending = true;
        self.state.login.message = None;

        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.verify(&credentials).await;
            let _ = tx.send(AppEvent::Login {
                credentials,
                result,
            });
        });
    }

    fn finish_login(
        &mut self,
        credentials: Credentials,
        result: std::result::Result<(), ClientError>,
    ) {
        self.state.login.pending = false;
        match result {
            Ok(()) => {
                if let Some(username) = credentials.username() {
                    tracing::info!(username, "signed in");
                    self.local.username = Some(username.to_string());
                    self.state.user_label = username.to_string();
                }
                self.local.token = None;
                self.persist_local_state();

                self.session.sign_in(credentials);
                self.state.login.password.clear();
                self.state.login.message = None;
                self.state.screen = Screen::Home;
                self.state.section = Section::Orders;
                self.load(Section::Orders);
            }
            Err(ClientError::Unauthorized) => {
                self.state.login.message = Some("Credenziali errate.".to_string());
            }
            Err(err) => {
                self.state.login.message = Some(message_for_error(&err));
            }
        }
    }

    fn logout(&mut self) {
        tracing::info!("signed out");
        self.end_session(None);
    }

    fn expire_session(&mut self) {
        tracing::info!("credentials rejected, back to login");
        self.end_session(Some("Sessione scaduta: effettua di nuovo l'accesso."));
    }

    fn end_session(&mut self, message: Option<&str>) {
        self.session.clear();
        self.local.clear_credentials();
        self.persist_local_state();

        self.state.orders.reset();
        self.state.gifts.reset();
        self.state.users.reset();
        self.state.groups.reset();
        self.state.gift_form = None;

        let login = &mut self.state.login;
        login.password.clear();
        login.pending = false;
        login.message = message.map(str::to_string);
        login.focus = if login.username.is_empty() {
            LoginField::Username
        } else {
            LoginField::Password
        };
        self.state.user_label = login.username.clone();
        self.state.screen = Screen::Login;
    }

    fn persist_local_state(&self) {
        if let Err(err) = self.local.save(&self.config.state_path) {
            tracing::warn!(%err, path = %self.config.state_path, "failed to persist local state");
        }
    }

    fn handle_form_key(&mut self, action: AppAction) {
        let Some(form) = self.state.gift_form.as_mut() else {
            return;
        };
        if form.saving {
            return;
        }

        match action {
            AppAction::Cancel => self.state.gift_form = None,
            AppAction::NextField | AppAction::Down => form.next_field(),
            AppAction::PrevField | AppAction::Up => form.prev_field(),
            AppAction::Backspace => {
                form.active_mut().pop();
            }
            AppAction::Input(ch) => form.active_mut().push(ch),
            AppAction::Submit => self.submit_gift_form(),
            _ => {}
        }
    }

    fn submit_gift_form(&mut self) {
        let Some(credentials) = self.session.credentials().cloned() else {
            self.expire_session();
            return;
        };
        let Some(form) = self.state.gift_form.as_mut() else {
            return;
        };
        let Some(valid) = form.submit() else {
            return;
        };
        form.saving = true;
        form.message = None;
        let present_id = form.present_id;

        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client
                .save_gift(&credentials, present_id, &valid)
                .await
                .map(|present| present.id);
            let _ = tx.send(AppEvent::GiftSaved(result));
        });
    }

    fn handle_home_key(&mut self, action: AppAction) {
        let section = self.state.section;
        match action {
            AppAction::Cancel => self.dismiss_banner(section),
            AppAction::NextField => self.switch_section(section.next()),
            AppAction::Up => self.select_prev(section),
            AppAction::Down => self.select_next(section),
            AppAction::Left => self.prev_page(section),
            AppAction::Right => self.next_page(section),
            AppAction::Input(ch) => self.handle_home_input(section, ch),
            _ => {}
        }
    }

    fn handle_home_input(&mut self, section: Section, ch: char) {
        if ch != 'D' {
            self.state.gifts.pending_delete = None;
        }

        match ch {
            'q' => self.should_quit = true,
            '1' => self.switch_section(Section::Orders),
            '2' => self.switch_section(Section::Gifts),
            '3' => self.switch_section(Section::Users),
            '4' => self.switch_section(Section::Groups),
            'j' => self.select_next(section),
            'k' => self.select_prev(section),
            'n' => self.next_page(section),
            'p' => self.prev_page(section),
            'a' => {
                self.pager_mut(section).toggle_show_all();
                self.load(section);
            }
            'r' => self.load(section),
            'L' => self.logout(),
            _ => match section {
                Section::Orders => match ch {
                    'c' => self.order_action(OrderAction::Confirm),
                    'd' => self.order_action(OrderAction::Deliver),
                    'x' => self.order_action(OrderAction::Cancel),
                    _ => {}
                },
                Section::Gifts => match ch {
                    '+' => self.state.gift_form = Some(GiftFormState::create()),
                    'e' => {
                        if let Some(row) = self.state.gifts.selected_row() {
                            self.state.gift_form = Some(GiftFormState::edit(row));
                        }
                    }
                    'D' => self.delete_selected_gift(),
                    'f' => self.state.gifts.cycle_category(),
                    _ => {}
                },
                Section::Users | Section::Groups => {}
            },
        }
    }

    /// Every visit refetches the current page of the section.
    fn switch_section(&mut self, section: Section) {
        self.state.section = section;
        self.state.gifts.pending_delete = None;
        self.load(section);
    }

    fn next_page(&mut self, section: Section) {
        if self.pager_mut(section).next_page() {
            self.load(section);
        }
    }

    fn prev_page(&mut self, section: Section) {
        if self.pager_mut(section).prev_page() {
            self.load(section);
        }
    }

    fn select_next(&mut self, section: Section) {
        match section {
            Section::Orders => self.state.orders.select_next(),
            Section::Gifts => self.state.gifts.select_next(),
            Section::Users => self.state.users.select_next(),
            Section::Groups => self.state.groups.select_next(),
        }
    }

    fn select_prev(&mut self, section: Section) {
        match section {
            Section::Orders => self.state.orders.select_prev(),
            Section::Gifts => self.state.gifts.select_prev(),
            Section::Users => self.state.users.select_prev(),
            Section::Groups => self.state.groups.select_prev(),
        }
    }

    fn dismiss_banner(&mut self, section: Section) {
        match section {
            Section::Orders => self.state.orders.dismiss_error(),
            Section::Gifts => self.state.gifts.list.dismiss_error(),
            Section::Users => self.state.users.dismiss_error(),
            Section::Groups => self.state.groups.dismiss_error(),
        }
    }

    fn order_action(&mut self, action: OrderAction) {
        let Some(row) = self.state.orders.selected_item() else {
            return;
        };
        let order_id = row.id;
        let status = match row.status.apply(action) {
            Ok(status) => status,
            Err(err) => {
                self.toast(ToastLevel::Error, err.to_string());
                return;
            }
        };
        let Some(credentials) = self.session.credentials().cloned() else {
            self.expire_session();
            return;
        };

        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client
                .update_order_status(&credentials, order_id, status)
                .await;
            let _ = tx.send(AppEvent::OrderUpdated {
                order_id,
                status,
                result,
            });
        });
        self.toast(
            ToastLevel::Info,
            format!("{} ordine #{order_id}…", action.label()),
        );
    }

    fn delete_selected_gift(&mut self) {
        let Some(present_id) = self.state.gifts.selected_row().map(|row| row.id) else {
            return;
        };
        if self.state.gifts.pending_delete != Some(present_id) {
            self.state.gifts.pending_delete = Some(present_id);
            self.toast(
                ToastLevel::Info,
                format!("Premi D di nuovo per eliminare il regalo #{present_id}."),
            );
            return;
        }
        self.state.gifts.pending_delete = None;

        let Some(credentials) = self.session.credentials().cloned() else {
            self.expire_session();
            return;
        };
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.delete_present(&credentials, present_id).await;
            let _ = tx.send(AppEvent::GiftDeleted { present_id, result });
        });
    }

    fn toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.state.toast = Some(ToastState {
            message: message.into(),
            level,
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    fn expire_toast(&mut self) {
        if self
            .state
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= Instant::now())
        {
            self.state.toast = None;
        }
    }
}

fn message_for_error(err: &ClientError) -> String {
    match err {
        ClientError::Unauthorized => "Credenziali errate o sessione scaduta.".to_string(),
        ClientError::Http { status, message } => match status.as_u16() {
            403 => "Permesso negato.".to_string(),
            404 => format!("Non trovato: {message}"),
            409 => format!("Conflitto: {message}"),
            400 | 422 => format!("Errore di validazione: {message}"),
            _ => format!("Errore server ({}): {message}", status.as_u16()),
        },
        ClientError::Transport(err) => format!("Server non raggiungibile: {err}"),
        ClientError::InvalidUrl(url) => format!("URL del server non valido: {url}"),
        ClientError::Io(err) => format!("Errore di lettura file: {err}"),
        ClientError::UploadFailed {
            present_id,
            source,
            ..
        } => format!(
            "Regalo #{present_id} salvato, invio immagini fallito: {}",
            message_for_error(source)
        ),
    }
}
