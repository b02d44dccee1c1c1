use std::future::Future;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::action::{Action, InputMode};
use crate::config::Config;
use crate::detail::DetailLoader;
use crate::list::{ListOrchestrator, ListView};
use crate::tui::Event;
use crate::types::{FetchParams, Pokemon};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Detail,
}

pub struct App {
    pub screen: Screen,
    pub input_mode: InputMode,
    pub input: String,
    /// Last snapshot read from the list; rendering never locks the list.
    pub view: ListView,
    pub selected: usize,
    pub detail: Option<Pokemon>,
    pub detail_loading: bool,
    pub detail_error: Option<String>,
    pub scroll_offset: usize,
    /// Local messages (bad page number, browser failure), cleared on next key.
    pub notice: Option<String>,
    pub should_quit: bool,
    list: Arc<ListOrchestrator>,
    details: Arc<DetailLoader>,
    config: Config,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        list: Arc<ListOrchestrator>,
        details: Arc<DetailLoader>,
        config: Config,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            screen: Screen::List,
            input_mode: InputMode::Normal,
            input: String::new(),
            view: list.snapshot(),
            selected: 0,
            detail: None,
            detail_loading: false,
            detail_error: None,
            scroll_offset: 0,
            notice: None,
            should_quit: false,
            list,
            details,
            config,
            action_tx,
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::Load,
            Event::Tick => Action::Tick,
            Event::Key(key) => self.handle_key(key),
            Event::Render => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        if self.input_mode != InputMode::Normal {
            return match key.code {
                KeyCode::Enter => Action::InputSubmit,
                KeyCode::Esc => Action::InputCancel,
                KeyCode::Backspace => Action::InputBackspace,
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Action::InputChar(c)
                }
                _ => Action::None,
            };
        }

        match self.screen {
            Screen::Detail => match key.code {
                KeyCode::Char('q') | KeyCode::Esc | KeyCode::Backspace => Action::Back,
                KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
                KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
                KeyCode::Char('o') => Action::OpenImage,
                KeyCode::Char('r') => Action::Refresh,
                KeyCode::Char('x') => Action::DismissError,
                _ => Action::None,
            },
            // Paging keys would only disturb the search result's pagination.
            Screen::List
                if self.view.is_search_active
                    && matches!(
                        key.code,
                        KeyCode::Char('n' | 'p' | 'g' | '+' | '=' | '-')
                            | KeyCode::Right
                            | KeyCode::Left
                    ) =>
            {
                Action::None
            }
            Screen::List => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
                KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
                KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
                KeyCode::Home => Action::GoToTop,
                KeyCode::End => Action::GoToBottom,
                KeyCode::Enter => Action::Select,
                KeyCode::Char('n') | KeyCode::Right => Action::NextPage,
                KeyCode::Char('p') | KeyCode::Left => Action::PreviousPage,
                KeyCode::Char('+') | KeyCode::Char('=') => Action::GrowPageSize,
                KeyCode::Char('-') => Action::ShrinkPageSize,
                KeyCode::Char('/') => Action::BeginInput(InputMode::Search),
                KeyCode::Char('g') => Action::BeginInput(InputMode::GoToPage),
                KeyCode::Char('c') => Action::ClearSearch,
                KeyCode::Char('r') => Action::Refresh,
                KeyCode::Char('x') => Action::DismissError,
                _ => Action::None,
            },
        }
    }

    pub fn update(&mut self, action: Action) {
        if !matches!(action, Action::Tick | Action::None) {
            self.notice = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Back => match self.screen {
                Screen::List => self.should_quit = true,
                Screen::Detail => {
                    self.screen = Screen::List;
                    self.detail = None;
                    self.detail_error = None;
                    self.scroll_offset = 0;
                    self.details.clear();
                }
            },
            Action::Tick | Action::ListUpdated => self.sync_view(),
            Action::DetailUpdated => self.sync_detail(),

            Action::ScrollUp => match self.screen {
                Screen::List => self.selected = self.selected.saturating_sub(1),
                Screen::Detail => self.scroll_offset = self.scroll_offset.saturating_sub(1),
            },
            Action::ScrollDown => match self.screen {
                Screen::List => {
                    if self.selected + 1 < self.view.entities.len() {
                        self.selected += 1;
                    }
                }
                Screen::Detail => self.scroll_offset += 1,
            },
            Action::GoToTop => self.selected = 0,
            Action::GoToBottom => self.selected = self.view.entities.len().saturating_sub(1),
            Action::Select => {
                if let Some(pokemon) = self.view.entities.get(self.selected).cloned() {
                    self.screen = Screen::Detail;
                    self.scroll_offset = 0;
                    self.detail_loading = true;
                    self.detail_error = None;
                    let id = pokemon.id;
                    self.detail = Some(pokemon);
                    self.spawn_load_detail(id);
                }
            }

            Action::Load => {
                self.spawn_list(|list| async move { list.fetch_page(FetchParams::default()).await });
            }
            Action::NextPage => {
                self.spawn_list(|list| async move { list.load_next_page().await });
            }
            Action::PreviousPage => {
                self.spawn_list(|list| async move { list.load_previous_page().await });
            }
            Action::GrowPageSize => {
                let size = self.config.next_page_size(self.list.browse_limit());
                self.spawn_list(move |list| async move { list.change_limit(size).await });
            }
            Action::ShrinkPageSize => {
                let size = self.config.previous_page_size(self.list.browse_limit());
                self.spawn_list(move |list| async move { list.change_limit(size).await });
            }
            Action::Refresh => match self.screen {
                Screen::List => {
                    self.spawn_list(|list| async move { list.refresh().await });
                }
                Screen::Detail => {
                    self.detail_loading = true;
                    let tx = self.action_tx.clone();
                    let details = Arc::clone(&self.details);
                    tokio::spawn(async move {
                        details.refetch().await;
                        tx.send(Action::DetailUpdated).ok();
                    });
                }
            },
            Action::ClearSearch => {
                self.spawn_list(|list| async move { list.clear_search_and_reload().await });
            }

            Action::BeginInput(mode) => {
                self.input_mode = mode;
                self.input = match mode {
                    InputMode::Search => self.view.search_query.clone(),
                    _ => String::new(),
                };
            }
            Action::InputChar(c) => {
                if self.input_mode == InputMode::GoToPage && !c.is_ascii_digit() {
                    return;
                }
                self.input.push(c);
            }
            Action::InputBackspace => {
                self.input.pop();
            }
            Action::InputCancel => {
                self.input_mode = InputMode::Normal;
                self.input.clear();
            }
            Action::InputSubmit => self.submit_input(),

            Action::DismissError => match self.screen {
                Screen::List => {
                    self.list.clear_error();
                    self.sync_view();
                }
                Screen::Detail => {
                    self.details.clear_error();
                    self.detail_error = None;
                }
            },
            Action::OpenImage => {
                let image = self.detail.as_ref().and_then(|p| p.image.clone());
                match image {
                    Some(url) => {
                        if let Err(e) = open::that(&url) {
                            self.notice = Some(format!("Could not open image: {}", e));
                        }
                    }
                    None => self.notice = Some("No image for this entry".to_string()),
                }
            }

            Action::None => {}
        }
    }

    fn submit_input(&mut self) {
        let mode = self.input_mode;
        let input = std::mem::take(&mut self.input);
        self.input_mode = InputMode::Normal;

        match mode {
            InputMode::Search => {
                self.selected = 0;
                self.spawn_list(move |list| async move { list.search_entities(&input).await });
            }
            InputMode::GoToPage => match input.parse::<u32>() {
                Ok(page) if page >= 1 => {
                    self.selected = 0;
                    self.spawn_list(move |list| async move { list.go_to_page(page - 1).await });
                }
                _ => self.notice = Some(format!("Not a page number: {:?}", input)),
            },
            InputMode::Normal => {}
        }
    }

    fn sync_view(&mut self) {
        self.view = self.list.snapshot();
        if self.selected >= self.view.entities.len() {
            self.selected = self.view.entities.len().saturating_sub(1);
        }
    }

    fn sync_detail(&mut self) {
        if self.screen != Screen::Detail {
            return;
        }
        self.detail_loading = self.details.loading();
        self.detail_error = self.details.error();
        if let Some(pokemon) = self.details.pokemon() {
            self.detail = Some(pokemon);
        }
    }

    /// Run a list intent in the background and re-read the list when it ends.
    fn spawn_list<F, Fut>(&mut self, intent: F)
    where
        F: FnOnce(Arc<ListOrchestrator>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let tx = self.action_tx.clone();
        let list = Arc::clone(&self.list);
        tokio::spawn(async move {
            intent(list).await;
            tx.send(Action::ListUpdated).ok();
        });
        self.sync_view();
    }

    fn spawn_load_detail(&self, id: u64) {
        let tx = self.action_tx.clone();
        let details = Arc::clone(&self.details);
        tokio::spawn(async move {
            details.load(id).await;
            tx.send(Action::DetailUpdated).ok();
        });
    }
}
