//! Admin editor mounted at `/edit`.
//!
//! Every list is rebuilt from the config after each change (see
//! [`AppState::revision`]), so DOM moved by a drag never outlives the drop.

use crate::api::Credentials;
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardHeader, CardTitle, Input, Label, Spinner,
};
use crate::models::{ButtonColorMode, ButtonEntry, Dashboard, Group};
use crate::normalize::{create_id, hex_str};
use crate::sortable::dom::drag_phase;
use crate::sortable::{
    bind_sortable, cancel_active_drag, Axis, DragPhase, MoveContext, SortableConfig,
};
use crate::state::{AppContext, AppState, Notice, NoticeKind, NOTICE_MS};
use crate::theme::{button_color_pair, button_text_color};
use icons::X;
use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Element;

pub(crate) const TAB_ITEM: &str = "[data-tab-sort-item]";
pub(crate) const GROUP_ITEM: &str = "[data-group-sort-item]";
pub(crate) const BUTTON_ITEM: &str = "[data-button-sort-item]";
pub(crate) const BUTTON_CONTAINER: &str = "[data-button-sort-container]";
pub(crate) const GROUP_ID_ATTR: &str = "data-group-id";

const FIELD_CLASS: &str = "border-input flex h-8 w-full min-w-0 rounded-md border bg-transparent px-3 py-1 text-sm shadow-xs outline-none focus-visible:border-ring focus-visible:ring-2 focus-visible:ring-ring/50";

const COLOR_MODES: [(ButtonColorMode, &str); 3] = [
    (ButtonColorMode::CycleCustom, "Color cycle"),
    (ButtonColorMode::SolidAll, "One color"),
    (ButtonColorMode::SolidPerGroup, "Color per group"),
];

pub(crate) fn tab_sortable() -> SortableConfig<Element> {
    SortableConfig::new(TAB_ITEM, ".tab-drag-handle")
        .axis(Axis::Horizontal)
        .end_before(".add-tab")
        .error_message("Failed to reorder tabs.")
}

pub(crate) fn group_sortable() -> SortableConfig<Element> {
    SortableConfig::new(GROUP_ITEM, ".group-drag-handle")
        .axis(Axis::Vertical)
        .error_message("Failed to reorder groups.")
}

pub(crate) fn button_sortable() -> SortableConfig<Element> {
    SortableConfig::new(BUTTON_ITEM, ".button-drag-handle")
        .axis(Axis::Grid)
        .cross_container(BUTTON_CONTAINER)
        .end_before("[data-entry-add-slot]")
        .error_message("Failed to reorder buttons.")
}

fn group_id_of(container: &Element) -> String {
    container.get_attribute(GROUP_ID_ATTR).unwrap_or_default()
}

/// Escape abandons a drag in progress.
fn cancels_drag(key: &str, phase: DragPhase) -> bool {
    key == "Escape" && phase != DragPhase::Idle
}

/// Number typed into a settings field, clamped to `min..=max`.
fn parse_clamped(raw: &str, min: f64, max: f64) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| n.clamp(min, max))
}

/// A group without its own color shows the dashboard's.
fn group_color(dashboard: &Dashboard, group: &Group) -> String {
    if group.button_solid_color.is_empty() {
        dashboard.button_solid_color.clone()
    } else {
        group.button_solid_color.clone()
    }
}

/// Which button, if any, has its edit fields open.
#[derive(Clone, Copy)]
struct EditorUi {
    editing_button: RwSignal<Option<String>>,
}

#[component]
pub fn AdminPage() -> impl IntoView {
    let AppContext(state) = expect_context::<AppContext>();
    state.refresh_auth();

    let key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if cancels_drag(&ev.key(), drag_phase()) {
            ev.prevent_default();
            cancel_active_drag();
        }
    });
    on_cleanup(move || {
        key_handle.remove();
        cancel_active_drag();
    });

    view! {
        <div class="min-h-screen bg-background">
            {move || match state.auth.get() {
                None => view! {
                    <div class="flex min-h-screen items-center justify-center">
                        <Spinner />
                    </div>
                }
                .into_any(),
                Some(status) if status.authenticated => view! { <Editor /> }.into_any(),
                Some(status) => view! { <LoginPanel setup_required=status.setup_required /> }.into_any(),
            }}
        </div>
    }
}

#[component]
fn LoginPanel(setup_required: bool) -> impl IntoView {
    let AppContext(state) = expect_context::<AppContext>();
    let username: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let credentials = Credentials {
            username: username.get_untracked().trim().to_string(),
            password: password.get_untracked(),
        };
        let api_client = state.api_client.get_untracked();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            let result = if setup_required {
                api_client.bootstrap_admin(&credentials).await
            } else {
                api_client.login(&credentials).await
            };
            match result {
                Ok(_) => state.refresh_auth(),
                Err(e) => error.set(Some(e.to_string())),
            }
            loading.set(false);
        });
    };

    let password_autocomplete = if setup_required {
        "new-password"
    } else {
        "current-password"
    };
    let (title, intro, submit) = if setup_required {
        (
            "First-Time Setup",
            "Create the first admin account for KISS this dashboard.",
            "Create admin",
        )
    } else {
        (
            "KISS this dashboard Admin",
            "Log in to manage your dashboard.",
            "Log in",
        )
    };

    view! {
        <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
            <Card>
                <CardHeader>
                    <CardTitle class="text-lg">{title}</CardTitle>
                    <CardDescription class="text-xs">{intro}</CardDescription>
                </CardHeader>

                <CardContent>
                    <form class="flex flex-col gap-3" on:submit=on_submit>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="username" class="text-xs">"Username"</Label>
                            <Input id="username" autocomplete="username" bind_value=username required=true class="h-8 text-sm" />
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="password" class="text-xs">"Password"</Label>
                            <Input
                                id="password"
                                r#type="password"
                                autocomplete=password_autocomplete
                                bind_value=password
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>

                        <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                            {move || {
                                error.get().map(|e| {
                                    view! {
                                        <Alert class="border-destructive/30">
                                            <AlertDescription class="text-destructive text-xs">
                                                {e}
                                            </AlertDescription>
                                        </Alert>
                                    }
                                })
                            }}
                        </Show>

                        <Button class="w-full" size=ButtonSize::Sm attr:disabled=move || loading.get()>
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || loading.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {submit}
                            </span>
                        </Button>
                    </form>
                </CardContent>
            </Card>
        </div>
    }
}

#[component]
fn Editor() -> impl IntoView {
    let AppContext(state) = expect_context::<AppContext>();
    provide_context(EditorUi {
        editing_button: RwSignal::new(None),
    });
    state.ensure_loaded();

    let on_logout = move |_| {
        let api_client = state.api_client.get_untracked();
        spawn_local(async move {
            if let Err(e) = api_client.logout().await {
                log::warn!("logout failed: {e}");
            }
            state.refresh_auth();
        });
    };

    view! {
        <div class="mx-auto flex w-full max-w-5xl flex-col gap-4 px-4 py-6">
            <header class="flex items-center gap-3">
                <TitleField />
                <a class="text-sm text-primary underline-offset-4 hover:underline" href="/">"View dashboard"</a>
                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_logout>
                    "Log out"
                </Button>
            </header>

            <NoticeBar />

            {move || {
                state.load_error.get().map(|e| {
                    view! {
                        <Alert class="border-destructive/30">
                            <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                        </Alert>
                    }
                })
            }}

            <Show
                when=move || state.config.with(Option::is_some)
                fallback=|| view! { <div class="flex justify-center py-10"><Spinner /></div> }
            >
                <For
                    each=move || [(state.revision.get(), state.active_dashboard.get())]
                    key=|k| k.clone()
                    children=move |_| {
                        on_cleanup(cancel_active_drag);
                        view! {
                            <TabStrip />
                            <DashboardPanel />
                        }
                    }
                />
            </Show>
        </div>
    }
}

#[component]
fn TitleField() -> impl IntoView {
    let AppContext(state) = expect_context::<AppContext>();
    let title = move || {
        state
            .config
            .with(|c| c.as_ref().map(|c| c.title.clone()).unwrap_or_default())
    };

    view! {
        <input
            class=format!("{FIELD_CLASS} max-w-md text-base font-semibold")
            aria-label="Dashboard title"
            prop:value=title
            on:change=move |ev| {
                let next = event_target_value(&ev);
                state.save("Failed to update title.", None, move |c| {
                    c.title = next;
                    Ok(())
                });
            }
        />
    }
}

#[component]
fn NoticeBar() -> impl IntoView {
    let AppContext(state) = expect_context::<AppContext>();

    Effect::new(move |_| {
        let Some(shown) = state.notice.get() else {
            return;
        };
        let clear = Closure::once_into_js(move || {
            if state.notice.get_untracked().as_ref() == Some(&shown) {
                state.notice.set(None);
            }
        });
        let _ = window().set_timeout_with_callback_and_timeout_and_arguments_0(
            clear.unchecked_ref(),
            NOTICE_MS,
        );
    });

    view! {
        {move || {
            state.notice.get().map(|Notice { kind, message }| {
                let tone = match kind {
                    NoticeKind::Success => "border-green-600/30 text-green-700",
                    NoticeKind::Danger => "border-destructive/30 text-destructive",
                };
                view! {
                    <Alert class=tone attr:role="status">
                        <AlertDescription class="text-xs">{message}</AlertDescription>
                    </Alert>
                }
            })
        }}
    }
}

#[component]
fn DragHandle(#[prop(into)] class: String, #[prop(into)] label: String) -> impl IntoView {
    view! {
        <span
            class=format!("drag-handle {class} cursor-grab select-none touch-none px-1 text-muted-foreground")
            title=label.clone()
            aria-label=label
            on:click=move |ev: web_sys::MouseEvent| {
                ev.prevent_default();
                ev.stop_propagation();
            }
        >
            "⋮⋮"
        </span>
    }
}

fn add_dashboard(state: AppState) {
    let count = state
        .config
        .with_untracked(|c| c.as_ref().map_or(0, |c| c.dashboards.len()));
    let dashboard = Dashboard::new(create_id("dashboard"), format!("Dashboard {}", count + 1));
    let id = dashboard.id.clone();
    state.save("Failed to add dashboard.", Some("Dashboard added."), move |c| {
        c.dashboards.push(dashboard);
        Ok(())
    });
    state.select_dashboard(&id);
}

#[component]
fn TabStrip() -> impl IntoView {
    let AppContext(state) = expect_context::<AppContext>();
    let list_ref: NodeRef<html::Ul> = NodeRef::new();
    let active = state.active_dashboard.get_untracked();
    let tabs: Vec<(String, String)> = state.config.with_untracked(|c| {
        c.as_ref()
            .map(|c| {
                c.dashboards
                    .iter()
                    .map(|d| (d.id.clone(), d.label.clone()))
                    .collect()
            })
            .unwrap_or_default()
    });

    Effect::new(move |_| {
        let Some(list) = list_ref.get() else {
            return;
        };
        let config = tab_sortable()
            .on_reorder(move |from, to| state.commit(move |c| c.reorder_dashboards(from, to)))
            .on_error(move |message, cause| state.report_failure(message, cause));
        bind_sortable(&list, config);
    });

    view! {
        <ul class="flex flex-wrap items-end gap-1 border-b" data-tab-sort-container="" node_ref=list_ref>
            {tabs
                .into_iter()
                .map(|(id, label)| {
                    let tone = if id == active {
                        "border-b-2 border-primary font-medium"
                    } else {
                        "text-muted-foreground"
                    };
                    let handle_label = format!("Drag to reorder tab {label}");
                    let select_id = id.clone();
                    view! {
                        <li class=format!("tab-sort-item {tone}") data-tab-sort-item="" data-dashboard-id=id>
                            <a
                                href="#"
                                role="button"
                                class="inline-flex items-center gap-1 px-3 py-2 text-sm"
                                on:click=move |ev: web_sys::MouseEvent| {
                                    ev.prevent_default();
                                    state.select_dashboard(&select_id);
                                }
                            >
                                <DragHandle class="tab-drag-handle" label=handle_label />
                                <span class="tab-link-label">{label}</span>
                            </a>
                        </li>
                    }
                })
                .collect_view()}
            <li class="add-tab">
                <a
                    href="#"
                    class="inline-flex px-3 py-2 text-sm"
                    title="Add dashboard"
                    aria-label="Add dashboard"
                    on:click=move |ev: web_sys::MouseEvent| {
                        ev.prevent_default();
                        add_dashboard(state);
                    }
                >
                    "+"
                </a>
            </li>
        </ul>
    }
}

/// Apply `edit` to the dashboard `id` and persist.
fn edit_dashboard(
    state: AppState,
    id: String,
    failure: &'static str,
    edit: impl FnOnce(&mut Dashboard) + 'static,
) {
    state.save(failure, None, move |c| {
        edit(c.dashboard_mut(&id)?);
        Ok(())
    });
}

fn edit_group(
    state: AppState,
    group_id: String,
    failure: &'static str,
    edit: impl FnOnce(&mut Group) + 'static,
) {
    let dashboard_id = state.active_dashboard.get_untracked();
    state.save(failure, None, move |c| {
        edit(c.dashboard_mut(&dashboard_id)?.group_mut(&group_id)?);
        Ok(())
    });
}

fn edit_button(
    state: AppState,
    group_id: String,
    button_id: String,
    edit: impl FnOnce(&mut ButtonEntry) + 'static,
) {
    let dashboard_id = state.active_dashboard.get_untracked();
    state.save("Failed to save button.", None, move |c| {
        let group = c.dashboard_mut(&dashboard_id)?.group_mut(&group_id)?;
        edit(group.entry_mut(&button_id)?);
        Ok(())
    });
}

#[component]
fn DashboardPanel() -> impl IntoView {
    let AppContext(state) = expect_context::<AppContext>();
    let active = state.active_dashboard.get_untracked();
    let Some((dashboard, dashboard_count)) = state.config.with_untracked(|c| {
        c.as_ref()
            .and_then(|c| c.dashboard(&active).map(|d| (d.clone(), c.dashboards.len())))
    }) else {
        return view! { <p class="text-sm text-muted-foreground">"No dashboard selected."</p> }
            .into_any();
    };

    let groups_ref: NodeRef<html::Div> = NodeRef::new();
    Effect::new(move |_| {
        let Some(el) = groups_ref.get() else {
            return;
        };
        let config = group_sortable()
            .on_reorder(move |from, to| {
                let id = state.active_dashboard.get_untracked();
                state.commit(move |c| c.reorder_groups(&id, from, to))
            })
            .on_error(move |message, cause| state.report_failure(message, cause));
        bind_sortable(&el, config);
    });

    let mut color_start = 0;
    let groups = dashboard
        .groups
        .iter()
        .map(|group| {
            let start = color_start;
            color_start += group.entries.len();
            view! { <GroupCard dashboard=dashboard.clone() group=group.clone() color_start=start /> }
        })
        .collect_view();

    let add_group = move |_| {
        let id = state.active_dashboard.get_untracked();
        let group = Group::new(create_id("group"), "New Group".to_string());
        state.save("Failed to add group.", Some("Group added."), move |c| {
            c.dashboard_mut(&id)?.groups.push(group);
            Ok(())
        });
    };

    let removable = dashboard_count > 1;

    view! {
        <DashboardSettings dashboard=dashboard.clone() removable=removable />
        <div class="flex flex-col gap-3" data-group-sort-container="" node_ref=groups_ref>
            {groups}
        </div>
        <div>
            <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=add_group>
                "Add group"
            </Button>
        </div>
    }
    .into_any()
}

#[component]
fn DashboardSettings(dashboard: Dashboard, removable: bool) -> impl IntoView {
    let AppContext(state) = expect_context::<AppContext>();
    let id = StoredValue::new(dashboard.id.clone());
    let mode = dashboard.button_color_mode;

    let cycle_fields = (mode == ButtonColorMode::CycleCustom).then(|| {
        view! {
            <CycleField
                label="Hue step"
                value=dashboard.button_cycle_hue_step
                min=1.0
                max=180.0
                dashboard_id=id
                apply=|d, n| d.button_cycle_hue_step = n
            />
            <CycleField
                label="Saturation %"
                value=dashboard.button_cycle_saturation
                min=0.0
                max=100.0
                dashboard_id=id
                apply=|d, n| d.button_cycle_saturation = n
            />
            <CycleField
                label="Lightness %"
                value=dashboard.button_cycle_lightness
                min=0.0
                max=100.0
                dashboard_id=id
                apply=|d, n| d.button_cycle_lightness = n
            />
        }
    });

    let on_remove = move |_| {
        let id = id.get_value();
        state.save("Failed to delete dashboard.", Some("Dashboard deleted."), move |c| {
            c.dashboards.retain(|d| d.id != id);
            Ok(())
        });
        state.ensure_active_dashboard();
    };

    view! {
        <section class="grid grid-cols-1 gap-3 rounded-lg border p-4 sm:grid-cols-2">
            <label class="flex flex-col gap-1 text-xs">
                "Tab label"
                <input
                    class=FIELD_CLASS
                    prop:value=dashboard.label.clone()
                    on:change=move |ev| {
                        let label = event_target_value(&ev).trim().to_string();
                        edit_dashboard(state, id.get_value(), "Failed to update tab title.", move |d| {
                            if !label.is_empty() {
                                d.label = label;
                            }
                        });
                    }
                />
            </label>

            <label class="flex flex-col gap-1 text-xs">
                "Button colors"
                <select
                    class=FIELD_CLASS
                    on:change=move |ev| {
                        let raw = event_target_value(&ev);
                        let Ok(next) = raw.parse::<ButtonColorMode>() else {
                            return;
                        };
                        edit_dashboard(state, id.get_value(), "Failed to update tab settings.", move |d| {
                            d.button_color_mode = next;
                        });
                    }
                >
                    {COLOR_MODES
                        .into_iter()
                        .map(|(value, text)| {
                            view! {
                                <option value=value.as_ref().to_string() selected={value == mode}>
                                    {text}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
            </label>

            {cycle_fields}

            <label class="flex items-center gap-2 text-xs">
                <input
                    type="checkbox"
                    prop:checked=dashboard.enable_internal_links
                    on:change=move |ev| {
                        let on = event_target_checked(&ev);
                        edit_dashboard(state, id.get_value(), "Failed to update tab settings.", move |d| {
                            d.enable_internal_links = on;
                        });
                    }
                />
                "Enable internal links"
            </label>

            <label class="flex items-center gap-2 text-xs">
                <input
                    type="checkbox"
                    prop:checked=dashboard.show_link_mode_toggle
                    on:change=move |ev| {
                        let on = event_target_checked(&ev);
                        edit_dashboard(state, id.get_value(), "Failed to update tab settings.", move |d| {
                            d.show_link_mode_toggle = on;
                        });
                    }
                />
                "Show link mode toggle"
            </label>

            <label class="flex items-center gap-2 text-xs">
                <input
                    type="color"
                    prop:value=dashboard.button_solid_color.clone()
                    on:change=move |ev| {
                        let color = hex_str(&event_target_value(&ev));
                        if color.is_empty() {
                            return;
                        }
                        edit_dashboard(state, id.get_value(), "Failed to update tab settings.", move |d| {
                            d.button_solid_color = color;
                        });
                    }
                />
                "Solid button color"
            </label>

            <Show when=move || removable fallback=|| ().into_view()>
                <div>
                    <Button variant=ButtonVariant::Destructive size=ButtonSize::Sm on:click=on_remove>
                        "Delete tab"
                    </Button>
                </div>
            </Show>
        </section>
    }
}

#[component]
fn CycleField(
    label: &'static str,
    value: f64,
    min: f64,
    max: f64,
    dashboard_id: StoredValue<String>,
    apply: fn(&mut Dashboard, f64),
) -> impl IntoView {
    let AppContext(state) = expect_context::<AppContext>();

    view! {
        <label class="flex flex-col gap-1 text-xs">
            {label}
            <input
                class=FIELD_CLASS
                type="number"
                min=min.to_string()
                max=max.to_string()
                prop:value=value.to_string()
                on:change=move |ev| {
                    let Some(n) = parse_clamped(&event_target_value(&ev), min, max) else {
                        return;
                    };
                    edit_dashboard(state, dashboard_id.get_value(), "Failed to update tab settings.", move |d| {
                        apply(d, n);
                    });
                }
            />
        </label>
    }
}

#[component]
fn GroupCard(dashboard: Dashboard, group: Group, color_start: usize) -> impl IntoView {
    let AppContext(state) = expect_context::<AppContext>();
    let group_id = StoredValue::new(group.id.clone());
    let grid_ref: NodeRef<html::Div> = NodeRef::new();

    Effect::new(move |_| {
        let Some(el) = grid_ref.get() else {
            return;
        };
        let config = button_sortable()
            .on_reorder(move |from, to| {
                let dashboard_id = state.active_dashboard.get_untracked();
                let gid = group_id.get_value();
                state.commit(move |c| c.reorder_buttons(&dashboard_id, &gid, from, to))
            })
            .on_move_between(move |from, to, ctx: &MoveContext<Element>| {
                let dashboard_id = state.active_dashboard.get_untracked();
                let from_group = group_id_of(&ctx.from_container);
                let to_group = group_id_of(&ctx.to_container);
                state.commit(move |c| c.move_button(&dashboard_id, &from_group, from, &to_group, to))
            })
            .on_error(move |message, cause| state.report_failure(message, cause));
        bind_sortable(&el, config);
    });

    let buttons = group
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let pair = button_color_pair(&dashboard, &group, color_start + i);
            view! {
                <ButtonCard
                    group_id=group.id.clone()
                    entry=entry.clone()
                    base=pair.base
                    hover=pair.hover
                    text=button_text_color(&dashboard)
                />
            }
        })
        .collect_view();

    let ui = expect_context::<EditorUi>();
    let on_add = move |_| {
        let entry = ButtonEntry {
            id: create_id("button"),
            name: "New Button".to_string(),
            ..ButtonEntry::default()
        };
        ui.editing_button.set(Some(entry.id.clone()));
        edit_group(state, group_id.get_value(), "Failed to save button.", move |g| {
            g.entries.push(entry);
        });
    };

    let on_remove = move |_| {
        let dashboard_id = state.active_dashboard.get_untracked();
        let gid = group_id.get_value();
        state.save("Failed to delete group.", Some("Group deleted."), move |c| {
            c.dashboard_mut(&dashboard_id)?.remove_group(&gid)?;
            Ok(())
        });
    };

    let group_color_input = (dashboard.button_color_mode == ButtonColorMode::SolidPerGroup).then(|| {
        view! {
            <input
                type="color"
                class="h-8 w-10 shrink-0 cursor-pointer rounded-md border"
                title="Group button color"
                aria-label="Group button color"
                prop:value=group_color(&dashboard, &group)
                on:change=move |ev| {
                    let color = hex_str(&event_target_value(&ev));
                    if color.is_empty() {
                        return;
                    }
                    edit_group(state, group_id.get_value(), "Failed to update group.", move |g| {
                        g.button_solid_color = color;
                    });
                }
            />
        }
    });

    let handle_label = format!("Drag to reorder group {}", group.title);

    view! {
        <section class="rounded-lg border p-3" data-group-sort-item="" data-group-id=group.id.clone()>
            <div class="mb-2 flex items-center gap-2">
                <DragHandle class="group-drag-handle" label=handle_label />
                <input
                    class=format!("{FIELD_CLASS} font-medium")
                    aria-label="Group title"
                    prop:value=group.title.clone()
                    on:change=move |ev| {
                        let title = event_target_value(&ev);
                        edit_group(state, group_id.get_value(), "Failed to update group title.", move |g| {
                            g.title = title;
                        });
                    }
                />
                {group_color_input}
                <label class="flex shrink-0 items-center gap-1 text-xs" title="Start a new row after this group">
                    <input
                        type="checkbox"
                        prop:checked=group.group_end
                        on:change=move |ev| {
                            let on = event_target_checked(&ev);
                            edit_group(state, group_id.get_value(), "Failed to update group.", move |g| {
                                g.group_end = on;
                            });
                        }
                    />
                    "Row end"
                </label>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Icon
                    class="h-7 w-7 text-destructive"
                    attr:title="Delete group"
                    on:click=on_remove
                >
                    <X />
                </Button>
            </div>

            <div
                class="grid grid-cols-2 gap-2 sm:grid-cols-3 lg:grid-cols-4"
                data-button-sort-container=""
                data-group-id=group.id.clone()
                node_ref=grid_ref
            >
                {buttons}
                <div data-entry-add-slot="">
                    <button
                        type="button"
                        class="h-full min-h-10 w-full rounded-md border border-dashed text-muted-foreground"
                        title="Add button"
                        aria-label="Add button"
                        on:click=on_add
                    >
                        "+"
                    </button>
                </div>
            </div>
        </section>
    }
}

#[component]
fn ButtonCard(
    group_id: String,
    entry: ButtonEntry,
    base: String,
    hover: String,
    text: String,
) -> impl IntoView {
    let AppContext(state) = expect_context::<AppContext>();
    let ui = expect_context::<EditorUi>();
    let hovered = RwSignal::new(false);
    let ButtonEntry {
        id,
        name,
        icon,
        links,
        ..
    } = entry.clone();
    let ids = StoredValue::new((group_id, id.clone()));

    let editing = {
        let id = id.clone();
        move || ui.editing_button.with(|e| e.as_deref() == Some(id.as_str()))
    };
    let toggle = {
        let id = id.clone();
        move |_| {
            ui.editing_button.update(|e| {
                *e = if e.as_deref() == Some(id.as_str()) {
                    None
                } else {
                    Some(id.clone())
                };
            })
        }
    };

    let field = move |label: &'static str, value: String, apply: fn(&mut ButtonEntry, String)| {
        view! {
            <label class="flex flex-col gap-1 text-xs">
                {label}
                <input
                    class=FIELD_CLASS
                    prop:value=value
                    on:change=move |ev| {
                        let next = event_target_value(&ev);
                        let (gid, bid) = ids.get_value();
                        edit_button(state, gid, bid, move |b| apply(b, next));
                    }
                />
            </label>
        }
    };

    let on_remove = move |_| {
        let dashboard_id = state.active_dashboard.get_untracked();
        let (gid, bid) = ids.get_value();
        state.save("Failed to delete button.", Some("Button deleted."), move |c| {
            c.dashboard_mut(&dashboard_id)?.group_mut(&gid)?.remove_entry(&bid)?;
            Ok(())
        });
    };

    let icon_img = entry.icon_source().map(|src| {
        view! { <img class="size-5" src=src alt=format!("{name} icon") /> }
    });
    let handle_label = format!("Drag to reorder button {name}");
    let edit_label = format!("Edit button {name}");
    let fields = StoredValue::new((name.clone(), icon, links));

    view! {
        <div data-button-sort-item="" data-button-id=id>
            <div class="flex flex-col gap-2">
                <button
                    type="button"
                    class="inline-flex w-full items-center gap-2 rounded-md px-2 py-2 text-sm"
                    style:background-color=move || if hovered.get() { hover.clone() } else { base.clone() }
                    style:color=text
                    title=edit_label.clone()
                    aria-label=edit_label
                    on:mouseenter=move |_| hovered.set(true)
                    on:mouseleave=move |_| hovered.set(false)
                    on:click=toggle
                >
                    <DragHandle class="button-drag-handle" label=handle_label />
                    {icon_img}
                    <span class="truncate">{name}</span>
                </button>

                <Show when=editing fallback=|| ().into_view()>
                    {move || {
                        let (name, icon, links) = fields.get_value();
                        view! {
                            <div class="flex flex-col gap-2 rounded-md border p-2">
                                {field("Name", name, |b, v| b.name = v)}
                                {field("Icon", icon, |b, v| b.icon = v.trim().to_string())}
                                {field("External link", links.external, |b, v| {
                                    b.links.external = v.trim().to_string()
                                })}
                                {field("Internal link", links.internal, |b, v| {
                                    b.links.internal = v.trim().to_string()
                                })}
                                <Button
                                    variant=ButtonVariant::Destructive
                                    size=ButtonSize::Sm
                                    on:click=on_remove
                                >
                                    "Delete button"
                                </Button>
                            </div>
                        }
                    }}
                </Show>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tab_binding() {
        let config = tab_sortable();
        assert_eq!(config.item_selector, TAB_ITEM);
        assert_eq!(config.handle_selector, ".tab-drag-handle");
        assert_eq!(config.axis, Axis::Horizontal);
        assert_eq!(config.end_before_selector.as_deref(), Some(".add-tab"));
        assert!(!config.allows_cross_container());
        assert_eq!(config.error_message, "Failed to reorder tabs.");
    }

    #[test]
    fn test_group_binding() {
        let config = group_sortable();
        assert_eq!(config.axis, Axis::Vertical);
        assert_eq!(config.end_before_selector, None);
        assert_eq!(config.error_message, "Failed to reorder groups.");
    }

    #[test]
    fn test_button_binding_accepts_sibling_grids() {
        let config = button_sortable();
        assert_eq!(config.axis, Axis::Grid);
        assert_eq!(config.cross_container_selector.as_deref(), Some(BUTTON_CONTAINER));
        assert!(config.shares_selectors(&button_sortable()));
        assert!(!config.shares_selectors(&group_sortable()));
    }

    #[test]
    fn test_escape_cancels_only_a_live_drag() {
        assert!(cancels_drag("Escape", DragPhase::Dragging));
        assert!(cancels_drag("Escape", DragPhase::Armed));
        assert!(!cancels_drag("Escape", DragPhase::Idle));
        assert!(!cancels_drag("Enter", DragPhase::Dragging));
    }

    #[test]
    fn test_parse_clamped() {
        assert_eq!(parse_clamped(" 42 ", 1.0, 180.0), Some(42.0));
        assert_eq!(parse_clamped("500", 1.0, 180.0), Some(180.0));
        assert_eq!(parse_clamped("-3", 0.0, 100.0), Some(0.0));
        assert_eq!(parse_clamped("", 0.0, 100.0), None);
        assert_eq!(parse_clamped("NaN", 0.0, 100.0), None);
    }

    #[test]
    fn test_group_color_falls_back_to_dashboard() {
        let mut dashboard = Dashboard::new("d".to_string(), "D".to_string());
        dashboard.button_solid_color = "#93c5fd".to_string();
        let mut group = Group::new("g".to_string(), "G".to_string());
        assert_eq!(group_color(&dashboard, &group), "#93c5fd");
        group.button_solid_color = "#ff0000".to_string();
        assert_eq!(group_color(&dashboard, &group), "#ff0000");
    }

    #[test]
    fn test_color_modes_parse_back() {
        for (mode, _) in COLOR_MODES {
            assert_eq!(mode.as_ref().parse::<ButtonColorMode>(), Ok(mode));
        }
    }
}
