use crate::models::LinkMode;
use std::str::FromStr;

pub(crate) const LINK_MODE_KEY: &str = "homelabDashboardLinkMode";
pub(crate) const ACTIVE_DASHBOARD_KEY: &str = "homelabDashboardActiveDashboard";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

/// Anything but `"internal"` reads as external.
pub(crate) fn parse_link_mode(raw: Option<&str>) -> LinkMode {
    raw.and_then(|v| LinkMode::from_str(v).ok())
        .unwrap_or_default()
}

pub(crate) fn load_link_mode() -> LinkMode {
    let stored = local_storage().and_then(|s| s.get_item(LINK_MODE_KEY).ok().flatten());
    parse_link_mode(stored.as_deref())
}

pub(crate) fn save_link_mode(mode: LinkMode) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(LINK_MODE_KEY, mode.as_ref());
    }
}

pub(crate) fn load_active_dashboard() -> String {
    local_storage()
        .and_then(|s| s.get_item(ACTIVE_DASHBOARD_KEY).ok().flatten())
        .unwrap_or_default()
}

pub(crate) fn save_active_dashboard(id: &str) {
    let Some(storage) = local_storage() else {
        return;
    };
    if id.is_empty() {
        let _ = storage.remove_item(ACTIVE_DASHBOARD_KEY);
    } else {
        let _ = storage.set_item(ACTIVE_DASHBOARD_KEY, id);
    }
}
