use crate::sortable::{move_between, move_item, pair_mut, CommitError};
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_TITLE: &str = "KISS this dashboard";
pub(crate) const DEFAULT_HUE_STEP: f64 = 15.0;
pub(crate) const DEFAULT_SATURATION: f64 = 70.0;
pub(crate) const DEFAULT_LIGHTNESS: f64 = 74.0;
pub(crate) const DEFAULT_SOLID_COLOR: &str = "#93c5fd";

/// Whole document stored by `/api/config`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DashboardConfig {
    pub title: String,
    pub dashboards: Vec<Dashboard>,
}

/// How a dashboard paints its link buttons.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub(crate) enum ButtonColorMode {
    #[default]
    CycleCustom,
    SolidAll,
    SolidPerGroup,
}

/// One tab of the dashboard.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Dashboard {
    pub id: String,
    pub label: String,
    pub show_link_mode_toggle: bool,
    pub enable_internal_links: bool,
    pub text_color: String,
    pub button_text_color: String,
    pub tab_color: String,
    pub active_tab_color: String,
    pub tab_text_color: String,
    pub active_tab_text_color: String,
    pub background_color: String,
    pub group_background_color: String,
    pub button_color_mode: ButtonColorMode,
    pub button_cycle_hue_step: f64,
    pub button_cycle_saturation: f64,
    pub button_cycle_lightness: f64,
    pub button_solid_color: String,
    pub groups: Vec<Group>,

    /// Fields this client does not edit (theme presets and the like).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Dashboard {
    pub fn new(id: String, label: String) -> Self {
        Self {
            id,
            label,
            show_link_mode_toggle: true,
            enable_internal_links: false,
            text_color: String::new(),
            button_text_color: String::new(),
            tab_color: String::new(),
            active_tab_color: String::new(),
            tab_text_color: String::new(),
            active_tab_text_color: String::new(),
            background_color: String::new(),
            group_background_color: String::new(),
            button_color_mode: ButtonColorMode::default(),
            button_cycle_hue_step: DEFAULT_HUE_STEP,
            button_cycle_saturation: DEFAULT_SATURATION,
            button_cycle_lightness: DEFAULT_LIGHTNESS,
            button_solid_color: DEFAULT_SOLID_COLOR.to_string(),
            groups: vec![],
            extra: serde_json::Map::new(),
        }
    }

    fn group_index(&self, group_id: &str) -> Result<usize, CommitError> {
        self.groups
            .iter()
            .position(|g| g.id == group_id)
            .ok_or_else(|| CommitError::MissingContainer("Group".to_string()))
    }

    pub fn group_mut(&mut self, group_id: &str) -> Result<&mut Group, CommitError> {
        let at = self.group_index(group_id)?;
        Ok(&mut self.groups[at])
    }

    pub fn remove_group(&mut self, group_id: &str) -> Result<Group, CommitError> {
        let at = self.group_index(group_id)?;
        Ok(self.groups.remove(at))
    }
}

impl Group {
    pub fn new(id: String, title: String) -> Self {
        Self {
            id,
            title,
            group_end: false,
            button_solid_color: String::new(),
            entries: vec![],
        }
    }

    pub fn entry_mut(&mut self, entry_id: &str) -> Result<&mut ButtonEntry, CommitError> {
        self.entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| CommitError::MissingContainer("Button".to_string()))
    }

    pub fn remove_entry(&mut self, entry_id: &str) -> Result<ButtonEntry, CommitError> {
        let at = self
            .entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or_else(|| CommitError::MissingContainer("Button".to_string()))?;
        Ok(self.entries.remove(at))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Group {
    pub id: String,
    pub title: String,
    pub group_end: bool,
    pub button_solid_color: String,
    pub entries: Vec<ButtonEntry>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ButtonEntry {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub icon_data: String,
    pub links: Links,
}

impl ButtonEntry {
    /// Image source for the button: inline data first, then the bundled icon.
    pub fn icon_source(&self) -> Option<String> {
        if !self.icon_data.is_empty() {
            return Some(self.icon_data.clone());
        }
        if !self.icon.is_empty() {
            return Some(format!("icons/{}", self.icon));
        }
        None
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Links {
    pub external: String,
    pub internal: String,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum LinkMode {
    #[default]
    External,
    Internal,
}

/// `GET /api/auth/status`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthStatus {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub setup_required: bool,
    #[serde(default)]
    pub username: Option<String>,
}

// Mutations behind the editor's drag handlers.
impl DashboardConfig {
    pub fn dashboard(&self, id: &str) -> Option<&Dashboard> {
        self.dashboards.iter().find(|d| d.id == id)
    }

    pub fn dashboard_mut(&mut self, id: &str) -> Result<&mut Dashboard, CommitError> {
        self.dashboards
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| CommitError::MissingContainer("Dashboard".to_string()))
    }

    pub fn reorder_dashboards(&mut self, from: usize, to: usize) -> Result<(), CommitError> {
        check_indices(from, to, self.dashboards.len())?;
        move_item(&mut self.dashboards, from, to);
        Ok(())
    }

    pub fn reorder_groups(
        &mut self,
        dashboard_id: &str,
        from: usize,
        to: usize,
    ) -> Result<(), CommitError> {
        let dashboard = self.dashboard_mut(dashboard_id)?;
        check_indices(from, to, dashboard.groups.len())?;
        move_item(&mut dashboard.groups, from, to);
        Ok(())
    }

    pub fn reorder_buttons(
        &mut self,
        dashboard_id: &str,
        group_id: &str,
        from: usize,
        to: usize,
    ) -> Result<(), CommitError> {
        let dashboard = self.dashboard_mut(dashboard_id)?;
        let g = dashboard.group_index(group_id)?;
        let entries = &mut dashboard.groups[g].entries;
        check_indices(from, to, entries.len())?;
        move_item(entries, from, to);
        Ok(())
    }

    /// Move a button between two groups of one dashboard.
    pub fn move_button(
        &mut self,
        dashboard_id: &str,
        from_group: &str,
        from: usize,
        to_group: &str,
        to: usize,
    ) -> Result<(), CommitError> {
        if from_group == to_group {
            return self.reorder_buttons(dashboard_id, from_group, from, to);
        }
        let dashboard = self.dashboard_mut(dashboard_id)?;
        let source = dashboard.group_index(from_group)?;
        let target = dashboard.group_index(to_group)?;
        let (source, target) = pair_mut(&mut dashboard.groups, source, target)
            .ok_or_else(|| CommitError::MissingContainer("Group".to_string()))?;
        move_between(&mut source.entries, from, &mut target.entries, to)?;
        Ok(())
    }
}

/// Both ends of a reorder must address an existing element.
fn check_indices(from: usize, to: usize, len: usize) -> Result<(), CommitError> {
    if from >= len {
        return Err(CommitError::SourceOutOfRange { index: from, len });
    }
    if to >= len {
        return Err(CommitError::TargetOutOfRange { index: to, len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(id: &str) -> ButtonEntry {
        ButtonEntry {
            id: id.to_string(),
            name: id.to_uppercase(),
            ..ButtonEntry::default()
        }
    }

    fn group(id: &str, entries: &[&str]) -> Group {
        let mut g = Group::new(id.to_string(), id.to_string());
        g.entries = entries.iter().map(|e| entry(e)).collect();
        g
    }

    fn sample() -> DashboardConfig {
        let mut home = Dashboard::new("home".to_string(), "Home".to_string());
        home.groups = vec![group("media", &["a1", "a2", "a3"]), group("infra", &["b1", "b2"])];
        DashboardConfig {
            title: DEFAULT_TITLE.to_string(),
            dashboards: vec![home, Dashboard::new("lab".to_string(), "Lab".to_string())],
        }
    }

    fn ids(g: &Group) -> Vec<&str> {
        g.entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_move_button_between_groups() {
        let mut cfg = sample();
        cfg.move_button("home", "media", 1, "infra", 1).expect("move");
        let home = cfg.dashboard("home").expect("home");
        assert_eq!(ids(&home.groups[0]), vec!["a1", "a3"]);
        assert_eq!(ids(&home.groups[1]), vec!["b1", "a2", "b2"]);
    }

    #[test]
    fn test_move_button_into_later_group_then_back() {
        let mut cfg = sample();
        cfg.move_button("home", "infra", 0, "media", 0).expect("move");
        let home = cfg.dashboard("home").expect("home");
        assert_eq!(ids(&home.groups[0]), vec!["b1", "a1", "a2", "a3"]);
        assert_eq!(ids(&home.groups[1]), vec!["b2"]);
    }

    #[test]
    fn test_move_button_rejects_unknown_group() {
        let mut cfg = sample();
        let err = cfg.move_button("home", "media", 0, "ghost", 0).unwrap_err();
        assert_eq!(err.to_string(), "Group not found.");
        assert_eq!(cfg, sample());
    }

    #[test]
    fn test_reorder_dashboards_and_groups() {
        let mut cfg = sample();
        cfg.reorder_dashboards(1, 0).expect("tabs");
        assert_eq!(cfg.dashboards[0].id, "lab");
        cfg.reorder_groups("home", 0, 1).expect("groups");
        assert_eq!(cfg.dashboard("home").expect("home").groups[0].id, "infra");
    }

    #[test]
    fn test_reorder_rejects_stale_source() {
        let mut cfg = sample();
        assert_eq!(
            cfg.reorder_buttons("home", "infra", 5, 0),
            Err(CommitError::SourceOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_reorder_rejects_stale_destination() {
        let mut cfg = sample();
        assert_eq!(
            cfg.reorder_dashboards(0, 2),
            Err(CommitError::TargetOutOfRange { index: 2, len: 2 })
        );
        let err = cfg.reorder_groups("home", 1, 9).unwrap_err();
        assert_eq!(err.to_string(), "Cannot move to position 9 (list has 2)");
        assert!(cfg.reorder_buttons("home", "media", 2, 3).is_err());
        assert_eq!(cfg, sample());
        assert_eq!(cfg.reorder_buttons("home", "media", 1, 1), Ok(()));
    }

    #[test]
    fn test_dashboard_keeps_unknown_fields() {
        let json = serde_json::json!({
            "id": "home", "label": "Home", "showLinkModeToggle": true,
            "enableInternalLinks": false, "textColor": "", "buttonTextColor": "",
            "tabColor": "", "activeTabColor": "", "tabTextColor": "",
            "activeTabTextColor": "", "backgroundColor": "", "groupBackgroundColor": "",
            "buttonColorMode": "solid-per-group", "buttonCycleHueStep": 15.0,
            "buttonCycleSaturation": 70.0, "buttonCycleLightness": 74.0,
            "buttonSolidColor": "#93c5fd", "groups": [],
            "themePresets": [{"id": "theme-1", "name": "Night"}]
        });
        let dashboard: Dashboard = serde_json::from_value(json.clone()).expect("parse");
        assert_eq!(dashboard.button_color_mode, ButtonColorMode::SolidPerGroup);
        assert!(dashboard.extra.contains_key("themePresets"));
        assert_eq!(serde_json::to_value(&dashboard).expect("serialize"), json);
    }

    #[test]
    fn test_group_and_entry_lookup() {
        let mut cfg = sample();
        let home = cfg.dashboard_mut("home").expect("home");
        home.group_mut("infra").expect("infra").entry_mut("b2").expect("b2").name = "Router".to_string();
        let removed = home.group_mut("media").expect("media").remove_entry("a1").expect("a1");
        assert_eq!(removed.id, "a1");
        assert_eq!(
            home.remove_group("ghost").unwrap_err().to_string(),
            "Group not found."
        );
        assert_eq!(home.groups[1].entries[1].name, "Router");
        assert_eq!(ids(&home.groups[0]), vec!["a2", "a3"]);
    }

    #[test]
    fn test_icon_source_prefers_inline_data() {
        let mut e = entry("x");
        assert_eq!(e.icon_source(), None);
        e.icon = "plex.svg".to_string();
        assert_eq!(e.icon_source().as_deref(), Some("icons/plex.svg"));
        e.icon_data = "data:image/png;base64,AA==".to_string();
        assert_eq!(e.icon_source().as_deref(), Some("data:image/png;base64,AA=="));
    }
}
