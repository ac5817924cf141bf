//! Loose JSON (server payloads, bundled defaults, legacy layouts) into a
//! well-formed [`DashboardConfig`].

use crate::models::{
    ButtonColorMode, ButtonEntry, Dashboard, DashboardConfig, Group, Links, DEFAULT_HUE_STEP,
    DEFAULT_LIGHTNESS, DEFAULT_SATURATION, DEFAULT_SOLID_COLOR, DEFAULT_TITLE,
};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

const TAB_ID_MAX: usize = 32;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Dashboard keys read into typed fields; everything else lands in `extra`.
const DASHBOARD_FIELDS: &[&str] = &[
    "id",
    "label",
    "showLinkModeToggle",
    "enableInternalLinks",
    "textColor",
    "buttonTextColor",
    "tabColor",
    "activeTabColor",
    "tabTextColor",
    "activeTabTextColor",
    "backgroundColor",
    "groupBackgroundColor",
    "buttonColorMode",
    "buttonCycleHueStep",
    "buttonCycleSaturation",
    "buttonCycleLightness",
    "buttonSolidColor",
    "groups",
    "themePresets",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LinkKind {
    External,
    Internal,
}

/// Tab id of the old per-tab link layout mapped to the link it feeds, if any.
type TabKinds = HashMap<String, Option<LinkKind>>;

pub(crate) fn config(input: &Value) -> DashboardConfig {
    let empty = Map::new();
    let obj = input.as_object().unwrap_or(&empty);

    let tabs = migration_tabs(obj.get("tabs"));
    DashboardConfig {
        title: title(obj.get("title")),
        dashboards: dashboards(obj, &tabs),
    }
}

fn migration_tabs(v: Option<&Value>) -> TabKinds {
    v.and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|tab| {
            let raw = tab
                .get("id")
                .filter(|id| truthy(id))
                .or_else(|| tab.get("label"))
                .map(id_string)
                .unwrap_or_default();
            let id = safe_tab_id(&raw);
            let label = tab
                .get("label")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .unwrap_or(id.as_str())
                .to_string();
            let kind = match id.as_str() {
                "external" => Some(LinkKind::External),
                "internal" => Some(LinkKind::Internal),
                _ => kind_from_text(&format!("{id} {label}")),
            };
            (id, kind)
        })
        .collect()
}

fn dashboards(obj: &Map<String, Value>, tabs: &TabKinds) -> Vec<Dashboard> {
    let listed = obj
        .get("dashboards")
        .and_then(Value::as_array)
        .filter(|list| !list.is_empty());

    let Some(listed) = listed else {
        let legacy = obj.get("groups").cloned().unwrap_or(Value::Array(vec![]));
        let mut raw = Map::new();
        raw.insert("id".to_string(), Value::from("dashboard-1"));
        raw.insert("label".to_string(), Value::from("Dashboard 1"));
        raw.insert("groups".to_string(), legacy);
        return vec![dashboard(&Value::Object(raw), "Dashboard 1", tabs)];
    };

    let mut used: HashSet<String> = HashSet::new();
    listed
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let mut d = dashboard(raw, &format!("Dashboard {}", i + 1), tabs);
            let base = d.id.clone();
            let mut counter = 2;
            while used.contains(&d.id) {
                d.id = format!("{base}-{counter}");
                counter += 1;
            }
            used.insert(d.id.clone());
            d
        })
        .collect()
}

fn dashboard(raw: &Value, fallback_label: &str, tabs: &TabKinds) -> Dashboard {
    let field = |k: &str| raw.get(k);
    let text = |k: &str| field(k).and_then(Value::as_str).unwrap_or_default();

    let id = match field("id").map(id_string).filter(|s| !s.is_empty()) {
        Some(id) => safe_tab_id(&id),
        None => create_id("dashboard"),
    };
    let label = match text("label").trim() {
        "" => fallback_label.to_string(),
        s => s.to_string(),
    };

    let mut d = Dashboard::new(id, label);
    d.show_link_mode_toggle = field("showLinkModeToggle").map_or(true, truthy);
    d.enable_internal_links = field("enableInternalLinks").is_some_and(truthy);
    d.text_color = hex_color(field("textColor"));
    d.button_text_color = hex_color(field("buttonTextColor"));
    d.tab_color = hex_color(field("tabColor"));
    d.active_tab_color = hex_color(field("activeTabColor"));
    d.tab_text_color = hex_color(field("tabTextColor"));
    d.active_tab_text_color = hex_color(field("activeTabTextColor"));
    d.background_color = hex_color(field("backgroundColor"));
    d.group_background_color = hex_color(field("groupBackgroundColor"));
    d.button_color_mode = button_color_mode(field("buttonColorMode"));
    d.button_cycle_hue_step = clamp_number(field("buttonCycleHueStep"), 1.0, 180.0, DEFAULT_HUE_STEP);
    d.button_cycle_saturation =
        clamp_number(field("buttonCycleSaturation"), 0.0, 100.0, DEFAULT_SATURATION);
    d.button_cycle_lightness =
        clamp_number(field("buttonCycleLightness"), 0.0, 100.0, DEFAULT_LIGHTNESS);
    d.button_solid_color = non_empty_or(hex_color(field("buttonSolidColor")), DEFAULT_SOLID_COLOR);
    d.groups = field("groups")
        .and_then(Value::as_array)
        .map(|gs| gs.iter().map(|g| group(g, tabs)).collect())
        .unwrap_or_default();
    if let Some(presets) = field("themePresets").filter(|v| v.is_array()) {
        d.extra.insert("themePresets".to_string(), presets.clone());
    }
    if let Some(obj) = raw.as_object() {
        for (key, value) in obj {
            if !DASHBOARD_FIELDS.contains(&key.as_str()) {
                d.extra.insert(key.clone(), value.clone());
            }
        }
    }
    d
}

fn group(raw: &Value, tabs: &TabKinds) -> Group {
    Group {
        id: raw
            .get("id")
            .map(id_string)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| create_id("group")),
        title: raw
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("New Group")
            .to_string(),
        group_end: raw.get("groupEnd").is_some_and(truthy),
        button_solid_color: hex_color(raw.get("buttonSolidColor")),
        entries: raw
            .get("entries")
            .and_then(Value::as_array)
            .map(|es| es.iter().map(|e| button(e, tabs)).collect())
            .unwrap_or_default(),
    }
}

fn button(raw: &Value, tabs: &TabKinds) -> ButtonEntry {
    let text = |k: &str| raw.get(k).and_then(Value::as_str).map(str::to_string);
    ButtonEntry {
        id: raw
            .get("id")
            .map(id_string)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| create_id("button")),
        name: text("name").unwrap_or_else(|| "New Button".to_string()),
        icon: text("icon").unwrap_or_default(),
        icon_data: text("iconData").unwrap_or_default(),
        links: links(raw, tabs),
    }
}

/// Nested `external`/`internal` first, then the flat legacy fields. Links
/// stored under other keys fill whatever is still empty, classified by tab,
/// by key name, then by host.
fn links(raw: &Value, tabs: &TabKinds) -> Links {
    let trimmed = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };
    let mut links = Links::default();
    let mut others: Vec<(&str, String)> = vec![];
    if let Some(nested) = raw.get("links").and_then(Value::as_object) {
        for (key, value) in nested {
            let value = trimmed(Some(value));
            match key.as_str() {
                "external" => links.external = value,
                "internal" => links.internal = value,
                _ => others.push((key.as_str(), value)),
            }
        }
    }
    if links.external.is_empty() {
        links.external = trimmed(raw.get("external"));
    }
    if links.internal.is_empty() {
        links.internal = trimmed(raw.get("internal"));
    }

    others.retain(|(_, value)| !value.is_empty());
    for (key, value) in &others {
        let kind = tabs.get(*key).copied().flatten().or_else(|| kind_from_text(key));
        if let Some(kind) = kind {
            let target = slot(&mut links, kind);
            if target.is_empty() {
                *target = value.clone();
            }
        }
    }
    for (_, value) in &others {
        let detected = kind_from_url(value).filter(|kind| slot(&mut links, *kind).is_empty());
        let target = match detected {
            Some(kind) => slot(&mut links, kind),
            None if links.external.is_empty() => &mut links.external,
            None => &mut links.internal,
        };
        if target.is_empty() {
            *target = value.clone();
        }
    }
    links
}

fn slot(links: &mut Links, kind: LinkKind) -> &mut String {
    match kind {
        LinkKind::External => &mut links.external,
        LinkKind::Internal => &mut links.internal,
    }
}

fn kind_from_text(text: &str) -> Option<LinkKind> {
    let text = text.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| text.contains(w));
    if mentions(&["extern", "public", "internet", "wan"]) {
        Some(LinkKind::External)
    } else if mentions(&["intern", "local", "lan", "private"]) {
        Some(LinkKind::Internal)
    } else {
        None
    }
}

/// Absolute URLs only; a private host means the link is internal.
fn kind_from_url(value: &str) -> Option<LinkKind> {
    let url = reqwest::Url::parse(value.trim()).ok()?;
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    Some(if is_private_host(&host) {
        LinkKind::Internal
    } else {
        LinkKind::External
    })
}

/// `localhost`, `*.local` and the RFC 1918 ranges.
fn is_private_host(host: &str) -> bool {
    if host == "localhost" || host.ends_with(".local") {
        return true;
    }
    if host.starts_with("10.") || host.starts_with("192.168.") {
        return true;
    }
    host.strip_prefix("172.")
        .and_then(|rest| rest.split_once('.'))
        .filter(|(octet, _)| octet.len() == 2)
        .and_then(|(octet, _)| octet.parse::<u8>().ok())
        .is_some_and(|octet| (16..=31).contains(&octet))
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn id_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

pub(crate) fn title(v: Option<&Value>) -> String {
    let trimmed = v.and_then(Value::as_str).map(str::trim).unwrap_or_default();
    non_empty_or(trimmed.to_string(), DEFAULT_TITLE)
}

/// `#rrggbb`, lower-cased; anything else is `""`.
pub(crate) fn hex_color(v: Option<&Value>) -> String {
    v.and_then(Value::as_str).map(hex_str).unwrap_or_default()
}

pub(crate) fn hex_str(s: &str) -> String {
    let s = s.trim();
    let valid = s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        s.to_ascii_lowercase()
    } else {
        String::new()
    }
}

pub(crate) fn clamp_number(v: Option<&Value>, min: f64, max: f64, fallback: f64) -> f64 {
    let numeric = match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match numeric {
        Some(n) if n.is_finite() => n.clamp(min, max),
        _ => fallback,
    }
}

pub(crate) fn button_color_mode(v: Option<&Value>) -> ButtonColorMode {
    let raw = v
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ButtonColorMode::from_str(&raw).unwrap_or_default()
}

/// Lowercase, dash-separated, at most 32 characters; never empty.
pub(crate) fn safe_tab_id(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut out = String::new();
    let mut pending_dash = false;
    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out.truncate(TAB_ID_MAX);
    non_empty_or(out, "tab")
}

/// `<prefix>-<8 random base36 chars>`.
pub(crate) fn create_id(prefix: &str) -> String {
    let mut bytes = [0u8; 8];
    if getrandom::getrandom(&mut bytes).is_err() {
        log::warn!("getrandom unavailable, falling back to clock-derived id");
        let seed = (js_sys::Date::now() as u64).to_le_bytes();
        bytes = seed;
    }
    let suffix: String = bytes
        .iter()
        .map(|b| ID_ALPHABET[usize::from(*b) % ID_ALPHABET.len()] as char)
        .collect();
    format!("{prefix}-{suffix}")
}

/// Turn what a user typed into something an `<a href>` can follow.
pub(crate) fn external_href(value: &str) -> String {
    let text = value.trim();
    if text.is_empty() {
        return String::new();
    }
    if has_scheme(text) {
        return text.to_string();
    }
    if let Some(rest) = text.strip_prefix("//") {
        return format!("https://{rest}");
    }
    if ["/", "./", "../", "#"].iter().any(|p| text.starts_with(p)) {
        return text.to_string();
    }
    if looks_like_host(text) {
        return format!("https://{text}");
    }
    text.to_string()
}

fn has_scheme(text: &str) -> bool {
    let Some((scheme, _)) = text.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

/// `localhost`, a dotted quad or `name.tld`, optionally with a port and a
/// path/query/fragment.
fn looks_like_host(text: &str) -> bool {
    let end = text.find(['/', '?', '#']).unwrap_or(text.len());
    let authority = &text[..end];
    let (host, port) = match authority.split_once(':') {
        Some((h, p)) => (h, Some(p)),
        None => (authority, None),
    };
    if port.is_some_and(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) {
        return false;
    }

    let host = host.to_ascii_lowercase();
    if host == "localhost" {
        return true;
    }
    let parts: Vec<&str> = host.split('.').collect();
    let dotted_quad = parts.len() == 4
        && parts
            .iter()
            .all(|p| (1..=3).contains(&p.len()) && p.chars().all(|c| c.is_ascii_digit()));
    if dotted_quad {
        return true;
    }
    let Some((name, tld)) = host.rsplit_once('.') else {
        return false;
    };
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_str(" #A1B2C3 "), "#a1b2c3");
        assert_eq!(hex_str("#abc"), "");
        assert_eq!(hex_str("a1b2c3"), "");
        assert_eq!(hex_str("#gg0000"), "");
        assert_eq!(hex_color(Some(&json!(12))), "");
    }

    #[test]
    fn test_safe_tab_id() {
        assert_eq!(safe_tab_id("  My Home Lab!  "), "my-home-lab");
        assert_eq!(safe_tab_id("--a__b--"), "a-b");
        assert_eq!(safe_tab_id("!!!"), "tab");
        assert_eq!(safe_tab_id(&"x".repeat(40)).len(), 32);
    }

    #[test]
    fn test_clamp_number() {
        assert_eq!(clamp_number(Some(&json!(500)), 1.0, 180.0, 15.0), 180.0);
        assert_eq!(clamp_number(Some(&json!("42")), 1.0, 180.0, 15.0), 42.0);
        assert_eq!(clamp_number(Some(&json!("nope")), 1.0, 180.0, 15.0), 15.0);
        assert_eq!(clamp_number(None, 0.0, 100.0, 70.0), 70.0);
    }

    #[test]
    fn test_button_color_mode_aliases() {
        assert_eq!(button_color_mode(Some(&json!("cycle-default"))), ButtonColorMode::CycleCustom);
        assert_eq!(button_color_mode(Some(&json!(" Solid-All "))), ButtonColorMode::SolidAll);
        assert_eq!(button_color_mode(Some(&json!("rainbow"))), ButtonColorMode::CycleCustom);
    }

    #[test]
    fn test_external_href() {
        assert_eq!(external_href("https://x.io"), "https://x.io");
        assert_eq!(external_href("mailto:a@b.c"), "mailto:a@b.c");
        assert_eq!(external_href("//cdn.example.com/a"), "https://cdn.example.com/a");
        assert_eq!(external_href("/grafana"), "/grafana");
        assert_eq!(external_href("#top"), "#top");
        assert_eq!(external_href("plex.example.com:32400/web"), "plex.example.com:32400/web");
        assert_eq!(external_href("plex.example.com/web"), "https://plex.example.com/web");
        assert_eq!(external_href("192.168.1.10:8080"), "https://192.168.1.10:8080");
        assert_eq!(external_href("localhost"), "https://localhost");
        assert_eq!(external_href("just words"), "just words");
        assert_eq!(external_href("   "), "");
    }

    #[test]
    fn test_legacy_groups_become_first_dashboard() {
        let cfg = config(&json!({
            "title": "  ",
            "groups": [{"id": "g1", "title": "Media", "entries": [
                {"id": "b1", "name": "Plex", "external": " https://plex.tv ", "links": {"internal": "http://10.0.0.2"}}
            ]}]
        }));
        assert_eq!(cfg.title, DEFAULT_TITLE);
        assert_eq!(cfg.dashboards.len(), 1);
        let d = &cfg.dashboards[0];
        assert_eq!(d.id, "dashboard-1");
        assert_eq!(d.label, "Dashboard 1");
        assert!(d.show_link_mode_toggle);
        assert_eq!(d.button_solid_color, DEFAULT_SOLID_COLOR);
        let b = &d.groups[0].entries[0];
        assert_eq!(b.links.external, "https://plex.tv");
        assert_eq!(b.links.internal, "http://10.0.0.2");
    }

    #[test]
    fn test_tab_keyed_links_fill_external_and_internal() {
        let cfg = config(&json!({
            "tabs": [{"id": "lan", "label": "LAN"}, {"id": "wan", "label": "WAN"}],
            "groups": [{"entries": [
                {"links": {"lan": " http://192.168.1.5 ", "wan": "https://plex.example.com"}}
            ]}]
        }));
        let links = &cfg.dashboards[0].groups[0].entries[0].links;
        assert_eq!(links.internal, "http://192.168.1.5");
        assert_eq!(links.external, "https://plex.example.com");
    }

    #[test]
    fn test_unlabeled_links_are_sorted_by_host() {
        let cfg = config(&json!({
            "groups": [{"entries": [
                {"links": {"a": "http://172.20.0.4:9000", "b": "https://grafana.example.com"}},
                {"links": {"home": "http://nas.local", "x": "not a url"}},
                {"external": "https://kept.example.com", "links": {"public": "https://other.example.com"}}
            ]}]
        }));
        let entries = &cfg.dashboards[0].groups[0].entries;
        assert_eq!(entries[0].links.internal, "http://172.20.0.4:9000");
        assert_eq!(entries[0].links.external, "https://grafana.example.com");
        assert_eq!(entries[1].links.internal, "http://nas.local");
        assert_eq!(entries[1].links.external, "not a url");
        assert_eq!(entries[2].links.external, "https://kept.example.com");
        assert_eq!(entries[2].links.internal, "https://other.example.com");
    }

    #[test]
    fn test_private_hosts() {
        assert!(is_private_host("localhost"));
        assert!(is_private_host("10.0.0.2"));
        assert!(is_private_host("172.31.255.1"));
        assert!(!is_private_host("172.32.0.1"));
        assert!(!is_private_host("172.1.0.1"));
        assert!(!is_private_host("example.com"));
        assert_eq!(kind_from_url("http://192.168.0.9/admin"), Some(LinkKind::Internal));
        assert_eq!(kind_from_url("plex.example.com"), None);
    }

    #[test]
    fn test_unknown_dashboard_fields_survive_a_save() {
        let cfg = config(&json!({
            "dashboards": [{"id": "main", "label": "Main", "customLayout": {"cols": 4}, "pinned": true}]
        }));
        let d = &cfg.dashboards[0];
        assert_eq!(d.extra.get("customLayout"), Some(&json!({"cols": 4})));
        assert_eq!(d.extra.get("pinned"), Some(&json!(true)));
        assert!(!d.extra.contains_key("label"));

        let wire = serde_json::to_value(&cfg).expect("serialize");
        assert_eq!(wire["dashboards"][0]["customLayout"]["cols"], 4);
        assert_eq!(config(&wire), cfg);
    }

    #[test]
    fn test_duplicate_dashboard_ids_get_suffixes() {
        let cfg = config(&json!({
            "dashboards": [
                {"id": "Home", "label": ""},
                {"id": "home", "label": "Second"},
                {"id": "home", "label": "Third", "themePresets": [{"id": "t"}]}
            ]
        }));
        let ids: Vec<&str> = cfg.dashboards.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["home", "home-2", "home-3"]);
        assert_eq!(cfg.dashboards[0].label, "Dashboard 1");
        assert!(cfg.dashboards[2].extra.contains_key("themePresets"));
    }

    #[test]
    fn test_missing_ids_are_generated() {
        let cfg = config(&json!({"dashboards": [{"groups": [{"entries": [{}]}]}]}));
        let d = &cfg.dashboards[0];
        assert!(d.id.starts_with("dashboard-"));
        let g = &d.groups[0];
        assert!(g.id.starts_with("group-"));
        assert_eq!(g.title, "New Group");
        assert!(g.entries[0].id.starts_with("button-"));
        assert_eq!(g.entries[0].name, "New Button");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = config(&json!({
            "title": "Lab",
            "dashboards": [{"id": "a", "label": "A", "buttonCycleHueStep": 999,
                "groups": [{"id": "g", "title": "G", "buttonSolidColor": "#FFFFFF",
                    "entries": [{"id": "b", "name": "B", "links": {"external": "x.io"}}]}]}]
        }));
        let again = config(&serde_json::to_value(&once).expect("serialize"));
        assert_eq!(once, again);
        assert_eq!(once.dashboards[0].button_cycle_hue_step, 180.0);
        assert_eq!(once.dashboards[0].groups[0].button_solid_color, "#ffffff");
    }
}
