use crate::api::ApiClient;
use crate::models::{AuthStatus, DashboardConfig, LinkMode};
use crate::sortable::{CommitError, PersistFuture};
use crate::storage::{load_active_dashboard, load_link_mode, save_active_dashboard};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::future;

/// How long a notice stays up before it clears itself.
pub(crate) const NOTICE_MS: i32 = 2000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NoticeKind {
    Success,
    Danger,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,

    /// What the page renders. `None` until the first load finishes.
    pub config: RwSignal<Option<DashboardConfig>>,
    /// Last copy the server acknowledged; failed saves roll back to it.
    pub last_saved: RwSignal<Option<DashboardConfig>>,
    /// Bumped on every config replacement; editor views key on it so the
    /// whole list is rebuilt rather than patched in place.
    pub revision: RwSignal<u64>,
    pub load_error: RwSignal<Option<String>>,

    pub active_dashboard: RwSignal<String>,
    pub link_mode: RwSignal<LinkMode>,
    pub auth: RwSignal<Option<AuthStatus>>,
    pub notice: RwSignal<Option<Notice>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            api_client: RwSignal::new(ApiClient::from_env()),
            config: RwSignal::new(None),
            last_saved: RwSignal::new(None),
            revision: RwSignal::new(0),
            load_error: RwSignal::new(None),
            active_dashboard: RwSignal::new(load_active_dashboard()),
            link_mode: RwSignal::new(load_link_mode()),
            auth: RwSignal::new(None),
            notice: RwSignal::new(None),
        }
    }

    /// Fetch the config once; later calls are no-ops.
    pub fn ensure_loaded(&self) {
        if self.config.get_untracked().is_some() {
            return;
        }
        let state = *self;
        spawn_local(async move {
            let api = state.api_client.get_untracked();
            match api.load_config().await {
                Ok(config) => state.adopt(config),
                Err(e) => {
                    log::error!("failed to load dashboard config: {e}");
                    state.load_error.set(Some(e.to_string()));
                }
            }
        });
    }

    fn adopt(&self, config: DashboardConfig) {
        self.last_saved.set(Some(config.clone()));
        self.replace_config(Some(config));
        self.ensure_active_dashboard();
    }

    fn replace_config(&self, config: Option<DashboardConfig>) {
        self.config.set(config);
        self.revision.update(|r| *r += 1);
    }

    /// Keep `active_dashboard` pointing at an existing tab and remember it.
    pub fn ensure_active_dashboard(&self) {
        let Some(first) = self.config.with_untracked(|c| {
            c.as_ref()
                .and_then(|c| c.dashboards.first())
                .map(|d| d.id.clone())
        }) else {
            return;
        };
        let current = self.active_dashboard.get_untracked();
        let exists = self.config.with_untracked(|c| {
            c.as_ref().is_some_and(|c| c.dashboard(&current).is_some())
        });
        let next = if exists { current } else { first };
        save_active_dashboard(&next);
        self.active_dashboard.set(next);
    }

    pub fn select_dashboard(&self, id: &str) {
        save_active_dashboard(id);
        self.active_dashboard.set(id.to_string());
    }

    /// Apply `mutate` optimistically, then persist.
    ///
    /// The returned future resolves once the server has stored the new config
    /// and its normalized copy has been adopted.
    pub fn commit(
        &self,
        mutate: impl FnOnce(&mut DashboardConfig) -> Result<(), CommitError>,
    ) -> Option<PersistFuture> {
        let Some(mut next) = self.config.get_untracked() else {
            return Some(Box::pin(future::ready(Err(
                "Dashboard config not loaded.".to_string()
            ))));
        };
        if let Err(e) = mutate(&mut next) {
            // Re-render so the DOM the drag moved matches the data again.
            self.replace_config(Some(next));
            return Some(Box::pin(future::ready(Err(e.to_string()))));
        }
        self.replace_config(Some(next.clone()));

        let state = *self;
        Some(Box::pin(async move {
            let api = state.api_client.get_untracked();
            let saved = api.save_config(&next).await.map_err(|e| e.to_string())?;
            state.adopt(saved);
            Ok(())
        }))
    }

    /// [`AppState::commit`] for edits made outside a drag: run the save and
    /// report its outcome.
    pub fn save(
        &self,
        failure: &'static str,
        success: Option<&'static str>,
        mutate: impl FnOnce(&mut DashboardConfig) -> Result<(), CommitError>,
    ) {
        let Some(pending) = self.commit(mutate) else {
            return;
        };
        let state = *self;
        spawn_local(async move {
            match pending.await {
                Ok(()) => {
                    if let Some(message) = success {
                        state.notify(NoticeKind::Success, message);
                    }
                }
                Err(cause) => state.report_failure(failure, &cause),
            }
        });
    }

    /// Show `message` and roll the page back to the last saved config.
    pub fn report_failure(&self, message: &str, cause: &str) {
        log::error!("{message} {cause}");
        self.notify(NoticeKind::Danger, message);
        let saved = self.last_saved.get_untracked();
        self.replace_config(saved);
        self.ensure_active_dashboard();
    }

    pub fn notify(&self, kind: NoticeKind, message: &str) {
        self.notice.set(Some(Notice {
            kind,
            message: message.to_string(),
        }));
    }

    pub fn refresh_auth(&self) {
        let state = *self;
        spawn_local(async move {
            let api = state.api_client.get_untracked();
            match api.auth_status().await {
                Ok(status) => state.auth.set(Some(status)),
                Err(e) => {
                    log::warn!("auth status unavailable: {e}");
                    state.auth.set(Some(AuthStatus::default()));
                }
            }
        });
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);
