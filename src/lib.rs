mod api;
mod app;
mod components;
mod editor;
mod logging;
mod models;
mod normalize;
pub mod sortable;
mod state;
mod storage;
mod theme;
mod viewer;

use crate::app::App;
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use crate::api::EnvConfig;
    use crate::models::LinkMode;
    use crate::storage::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_link_mode_storage_roundtrip() {
        save_link_mode(LinkMode::Internal);
        assert_eq!(load_link_mode(), LinkMode::Internal);
        save_link_mode(LinkMode::External);
        assert_eq!(load_link_mode(), LinkMode::External);
    }

    #[wasm_bindgen_test]
    fn test_active_dashboard_storage_roundtrip() {
        save_active_dashboard("lab");
        assert_eq!(load_active_dashboard(), "lab");
        save_active_dashboard("");
        assert_eq!(load_active_dashboard(), "");
    }

    #[wasm_bindgen_test]
    fn test_env_config_defaults_to_page_origin() {
        let origin = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default();
        assert_eq!(EnvConfig::new().api_url, origin.trim_end_matches('/'));
    }
}

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    logging::init();
    console_error_panic_hook::set_once();
    mount_to_body(App);
}
