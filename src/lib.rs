// ============================================================================
// TREASURE HUNT CLIENT - capa de datos de la app de viajes treasure hunt
// ============================================================================
// - storage:  almacenamiento clave/valor local (localStorage en el navegador)
// - services: pipeline de requests autenticados, endpoints tipados, query cache
// - state:    credenciales, slice de UI persistido, contexto de la app
// - routing:  pantallas y deep links (callbacks de pago)
// ============================================================================

pub mod config;
pub mod models;
pub mod routing;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::{AppConfig, CONFIG};
pub use state::AppContext;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    if CONFIG.is_logging_enabled() {
        wasm_logger::init(wasm_logger::Config::default());
    }
    log::info!("🚀 Cliente Treasure Hunt ({})", CONFIG.environment);

    Ok(())
}

/// Resuelve un deep link al path interno de su pantalla (llamable desde JavaScript)
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn resolve_deep_link(uri: &str) -> Result<String, JsValue> {
    let scheme = CONFIG
        .deep_link_scheme()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    routing::DeepLinkRouter::new(scheme)
        .route(uri)
        .map(|route| route.path())
        .map_err(|e| {
            log::warn!("⚠️ {}", e);
            JsValue::from_str(&e.to_string())
        })
}
