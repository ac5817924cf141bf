use crate::editor::AdminPage;
use crate::state::{AppContext, AppState};
use crate::viewer::ViewerPage;
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new()));

    // Router hooks (`use_query_map` in the viewer) need the <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("edit") view=AdminPage />
                <Route path=path!("") view=ViewerPage />
            </Routes>
        </Router>
    }
}
