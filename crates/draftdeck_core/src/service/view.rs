//! Screen navigation.
//!
//! The current screen is a pure function of the previous screen and the
//! event that just happened; `ViewController` only stores the result and
//! publishes it to subscribers.

use crate::model::project::ProjectId;
use std::sync::Mutex;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Dashboard,
    Editor { project_id: ProjectId },
}

/// Which form the Auth screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

/// State changes the navigator reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    /// Login or restore succeeded.
    Authenticated,
    /// A project was opened or just created.
    ProjectOpened(ProjectId),
    /// Explicit back navigation from the editor.
    Back,
    ProjectDeleted(ProjectId),
    /// Logout or a terminal auth failure.
    AuthLost,
}

/// Next screen for `event` on `current`.
pub fn transition(current: Screen, event: ViewEvent) -> Screen {
    match (current, event) {
        (_, ViewEvent::AuthLost) => Screen::Auth,
        (Screen::Auth, ViewEvent::Authenticated) => Screen::Dashboard,
        (Screen::Auth, _) => Screen::Auth,
        (_, ViewEvent::Authenticated) => current,
        (_, ViewEvent::ProjectOpened(project_id)) => Screen::Editor { project_id },
        (Screen::Editor { .. }, ViewEvent::Back) => Screen::Dashboard,
        (Screen::Editor { project_id }, ViewEvent::ProjectDeleted(deleted)) if project_id == deleted => {
            Screen::Dashboard
        }
        (screen, ViewEvent::Back | ViewEvent::ProjectDeleted(_)) => screen,
    }
}

pub struct ViewController {
    screen: watch::Sender<Screen>,
    auth_mode: Mutex<AuthMode>,
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewController {
    pub fn new() -> Self {
        let (screen, _) = watch::channel(Screen::Auth);
        Self {
            screen,
            auth_mode: Mutex::new(AuthMode::Login),
        }
    }

    pub fn screen(&self) -> Screen {
        *self.screen.borrow()
    }

    /// Receiver that observes every screen change.
    pub fn subscribe(&self) -> watch::Receiver<Screen> {
        self.screen.subscribe()
    }

    /// Applies `event`; returns the resulting screen.
    pub fn apply(&self, event: ViewEvent) -> Screen {
        self.screen.send_if_modified(|screen| {
            let next = transition(*screen, event);
            let changed = next != *screen;
            *screen = next;
            changed
        });
        if event == ViewEvent::AuthLost {
            self.set_auth_mode(AuthMode::Login);
        }
        self.screen()
    }

    pub fn auth_mode(&self) -> AuthMode {
        *self
            .auth_mode
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_auth_mode(&self, mode: AuthMode) {
        *self
            .auth_mode
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = mode;
    }

    pub fn toggle_auth_mode(&self) -> AuthMode {
        let next = match self.auth_mode() {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.set_auth_mode(next);
        next
    }
}
