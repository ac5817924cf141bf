//! Read-only dashboard at `/`.

use crate::components::ui::Spinner;
use crate::models::{ButtonEntry, Dashboard, DashboardConfig, Group, LinkMode};
use crate::normalize::external_href;
use crate::state::AppContext;
use crate::storage::save_link_mode;
use crate::theme::{button_color_pair, button_text_color, contrast_text};
use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

const EMPTY_TEXT: &str = "No groups configured yet. Open the Admin Panel to add one.";

/// The dashboard to show: the requested one, else the remembered one, else
/// the first.
pub(crate) fn resolve_dashboard_id(
    config: &DashboardConfig,
    requested: Option<&str>,
    saved: &str,
) -> Option<String> {
    [requested.unwrap_or_default(), saved]
        .into_iter()
        .find(|id| !id.is_empty() && config.dashboard(id).is_some())
        .or_else(|| config.dashboards.first().map(|d| d.id.as_str()))
        .map(str::to_string)
}

/// Internal links only apply where the dashboard turns them on.
pub(crate) fn effective_link_mode(dashboard: &Dashboard, mode: LinkMode) -> LinkMode {
    if dashboard.enable_internal_links {
        mode
    } else {
        LinkMode::External
    }
}

/// Empty when the button has no link for `mode`.
pub(crate) fn resolve_href(entry: &ButtonEntry, mode: LinkMode) -> String {
    match mode {
        LinkMode::External => external_href(&entry.links.external),
        LinkMode::Internal => entry.links.internal.trim().to_string(),
    }
}

pub(crate) fn dashboard_href(id: &str) -> String {
    format!("/?dashboard={}", urlencoding::encode(id))
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

#[component]
pub fn ViewerPage() -> impl IntoView {
    let AppContext(state) = expect_context::<AppContext>();
    let query = use_query_map();
    state.ensure_loaded();
    state.refresh_auth();

    Effect::new(move |_| {
        if state.auth.get().is_some_and(|a| a.setup_required) {
            let _ = window().location().set_href("/edit?setup=1");
        }
    });

    Effect::new(move |_| {
        if let Some(title) = state.config.with(|c| c.as_ref().map(|c| c.title.clone())) {
            document().set_title(&title);
        }
    });

    let active = Memo::new(move |_| {
        let requested = query.with(|q| q.get("dashboard"));
        let saved = state.active_dashboard.get();
        state.config.with(|c| {
            c.as_ref().and_then(|c| {
                let id = resolve_dashboard_id(c, requested.as_deref(), &saved)?;
                c.dashboard(&id).cloned()
            })
        })
    });

    Effect::new(move |_| {
        if let Some(dashboard) = active.get() {
            if dashboard.id != state.active_dashboard.get_untracked() {
                state.select_dashboard(&dashboard.id);
            }
        }
    });

    view! {
        {move || {
            if let Some(e) = state.load_error.get() {
                return view! { <p class="p-6 text-sm text-destructive">{e}</p> }.into_any();
            }
            let Some(dashboard) = active.get() else {
                return view! {
                    <div class="flex min-h-screen items-center justify-center"><Spinner /></div>
                }
                .into_any();
            };
            let title = state.config.with(|c| c.as_ref().map(|c| c.title.clone()).unwrap_or_default());
            let tabs: Vec<(String, String)> = state.config.with(|c| {
                c.as_ref()
                    .map(|c| c.dashboards.iter().map(|d| (d.id.clone(), d.label.clone())).collect())
                    .unwrap_or_default()
            });
            view! { <DashboardView title=title tabs=tabs dashboard=dashboard /> }.into_any()
        }}
    }
}

#[component]
fn DashboardView(title: String, tabs: Vec<(String, String)>, dashboard: Dashboard) -> impl IntoView {
    let AppContext(state) = expect_context::<AppContext>();
    let background = or_default(&dashboard.background_color, "#f8fafc").to_string();
    let text_color = if dashboard.text_color.is_empty() {
        contrast_text(&background).to_string()
    } else {
        dashboard.text_color.clone()
    };

    let tab_strip = (tabs.len() > 1).then(|| {
        let items = tabs
            .into_iter()
            .map(|(id, label)| {
                let is_active = id == dashboard.id;
                let (bg, fg) = if is_active {
                    (
                        or_default(&dashboard.active_tab_color, "#ffffff").to_string(),
                        or_default(&dashboard.active_tab_text_color, "#0f172a").to_string(),
                    )
                } else {
                    (
                        or_default(&dashboard.tab_color, "transparent").to_string(),
                        or_default(&dashboard.tab_text_color, &text_color).to_string(),
                    )
                };
                view! {
                    <li>
                        <a
                            class="inline-flex rounded-t-md px-3 py-2 text-sm"
                            class:font-semibold=is_active
                            href=dashboard_href(&id)
                            style:background-color=bg
                            style:color=fg
                            aria-current=is_active.then_some("page")
                        >
                            {label}
                        </a>
                    </li>
                }
            })
            .collect_view();
        view! { <ul class="flex flex-wrap gap-1 border-b">{items}</ul> }
    });

    let link_toggle = dashboard.enable_internal_links.then(|| {
        view! {
            <label class="flex items-center gap-2 text-sm">
                <input
                    type="checkbox"
                    prop:checked=move || state.link_mode.get() == LinkMode::Internal
                    on:change=move |ev| {
                        let mode = if event_target_checked(&ev) {
                            LinkMode::Internal
                        } else {
                            LinkMode::External
                        };
                        save_link_mode(mode);
                        state.link_mode.set(mode);
                    }
                />
                "use internal links"
            </label>
        }
    });

    let content = if dashboard.groups.is_empty() {
        view! { <div class="empty-state py-10 text-center text-sm">{EMPTY_TEXT}</div> }.into_any()
    } else {
        let mut color_index = 0;
        dashboard
            .groups
            .iter()
            .map(|group| {
                let start = color_index;
                color_index += group.entries.len();
                view! { <GroupSection dashboard=dashboard.clone() group=group.clone() color_start=start /> }
            })
            .collect_view()
            .into_any()
    };

    view! {
        <div
            class="min-h-screen"
            style:background-color=background
            style:color=text_color
        >
            <div class="mx-auto flex w-full max-w-5xl flex-col gap-4 px-4 py-6">
                <header class="flex flex-wrap items-center justify-between gap-3">
                    <h1 class="text-xl font-semibold">{title}</h1>
                    <div class="flex items-center gap-4">
                        {link_toggle}
                        <a class="text-sm underline-offset-4 hover:underline" href="/edit">"Admin Panel"</a>
                    </div>
                </header>
                {tab_strip}
                {content}
            </div>
        </div>
    }
}

#[component]
fn GroupSection(dashboard: Dashboard, group: Group, color_start: usize) -> impl IntoView {
    let AppContext(state) = expect_context::<AppContext>();
    let group_bg = dashboard.group_background_color.clone();
    let text = button_text_color(&dashboard);
    let title = or_default(&group.title, "Untitled Group").to_string();

    let shown = StoredValue::new(dashboard.clone());
    let mode = Memo::new(move |_| {
        let selected = state.link_mode.get();
        shown.with_value(|d| effective_link_mode(d, selected))
    });

    let buttons = group
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let pair = button_color_pair(&dashboard, &group, color_start + i);
            let hovered = RwSignal::new(false);
            let name = or_default(entry.name.trim(), "Unnamed").to_string();
            let icon = entry.icon_source().map(|src| {
                view! { <img class="size-5" src=src alt=format!("{name} icon") /> }
            });
            let entry = entry.clone();
            let href = Memo::new(move |_| resolve_href(&entry, mode.get()));
            let (base, hover) = (pair.base, pair.hover);
            view! {
                <a
                    class="entry-button inline-flex w-full items-center gap-2 rounded-md px-3 py-2 text-sm"
                    class:is-static=move || href.with(String::is_empty)
                    href=move || href.with(|h| if h.is_empty() { "#".to_string() } else { h.clone() })
                    target=move || href.with(|h| (!h.is_empty()).then_some("_blank"))
                    rel=move || href.with(|h| (!h.is_empty()).then_some("noopener noreferrer"))
                    style:background-color=move || if hovered.get() { hover.clone() } else { base.clone() }
                    style:color=text.clone()
                    on:mouseenter=move |_| hovered.set(true)
                    on:mouseleave=move |_| hovered.set(false)
                    on:click=move |ev: web_sys::MouseEvent| {
                        if href.with_untracked(String::is_empty) {
                            ev.prevent_default();
                        }
                    }
                >
                    <span class="entry-icon">{icon}</span>
                    <span class="entry-label truncate">{name}</span>
                </a>
            }
        })
        .collect_view();

    view! {
        <section
            class="group-box rounded-lg p-3"
            class:group-end=group.group_end
            style:background-color=group_bg
        >
            <h2 class="group-title mb-2 text-sm font-semibold">{title}</h2>
            <div class="grid grid-cols-2 gap-2 sm:grid-cols-3 lg:grid-cols-4">{buttons}</div>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Links;
    use pretty_assertions::assert_eq;

    fn config() -> DashboardConfig {
        DashboardConfig {
            title: "Home".to_string(),
            dashboards: vec![
                Dashboard::new("main".to_string(), "Main".to_string()),
                Dashboard::new("lab".to_string(), "Lab".to_string()),
            ],
        }
    }

    fn entry(external: &str, internal: &str) -> ButtonEntry {
        ButtonEntry {
            id: "b".to_string(),
            name: "B".to_string(),
            links: Links {
                external: external.to_string(),
                internal: internal.to_string(),
            },
            ..ButtonEntry::default()
        }
    }

    #[test]
    fn test_resolve_dashboard_prefers_query_then_saved() {
        let c = config();
        assert_eq!(resolve_dashboard_id(&c, Some("lab"), "main").as_deref(), Some("lab"));
        assert_eq!(resolve_dashboard_id(&c, Some("gone"), "lab").as_deref(), Some("lab"));
        assert_eq!(resolve_dashboard_id(&c, None, "gone").as_deref(), Some("main"));
        assert_eq!(resolve_dashboard_id(&c, Some(""), "").as_deref(), Some("main"));
    }

    #[test]
    fn test_resolve_dashboard_empty_config() {
        let c = DashboardConfig {
            title: String::new(),
            dashboards: vec![],
        };
        assert_eq!(resolve_dashboard_id(&c, Some("main"), "main"), None);
    }

    #[test]
    fn test_internal_mode_needs_dashboard_opt_in() {
        let mut d = Dashboard::new("d".to_string(), "D".to_string());
        d.enable_internal_links = false;
        assert_eq!(effective_link_mode(&d, LinkMode::Internal), LinkMode::External);
        d.enable_internal_links = true;
        assert_eq!(effective_link_mode(&d, LinkMode::Internal), LinkMode::Internal);
    }

    #[test]
    fn test_resolve_href() {
        let e = entry("example.com", " http://10.0.0.2:8080 ");
        assert_eq!(resolve_href(&e, LinkMode::External), "https://example.com");
        assert_eq!(resolve_href(&e, LinkMode::Internal), "http://10.0.0.2:8080");
        assert_eq!(resolve_href(&entry("", ""), LinkMode::External), "");
    }

    #[test]
    fn test_dashboard_href_is_encoded() {
        assert_eq!(dashboard_href("lab"), "/?dashboard=lab");
        assert_eq!(dashboard_href("a b&c"), "/?dashboard=a%20b%26c");
    }
}
