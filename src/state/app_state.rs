// ============================================================================
// APP CONTEXT - todo lo que necesita una pantalla, pasado explícitamente
// ============================================================================

use std::rc::Rc;

use crate::config::{AppConfig, ConfigError};
use crate::models::{Credential, HomeSelection};
use crate::routing::{DeepLinkError, DeepLinkRouter, Route};
use crate::services::{ApiClient, AuthError, AuthService, HttpTransport, ResourceClient};
use crate::state::auth_state::CredentialStore;
use crate::state::persisted::PersistedSlice;
use crate::storage::{KeyValueStorage, StorageError};
use crate::utils::constants::STORAGE_KEY_HOME;

#[derive(Clone)]
pub struct AppContext {
    credentials: CredentialStore,
    resources: ResourceClient,
    auth: AuthService,
    home: PersistedSlice<HomeSelection>,
    router: DeepLinkRouter,
}

impl AppContext {
    /// Conecta storage y transporte al stack del cliente. El slice "home"
    /// persistido se rehidrata antes de volver.
    pub fn new(
        config: &AppConfig,
        storage: Rc<dyn KeyValueStorage>,
        transport: Rc<dyn HttpTransport>,
    ) -> Result<Self, ConfigError> {
        let base_url = config.base_url()?;
        let router = DeepLinkRouter::new(config.deep_link_scheme()?);

        let credentials = CredentialStore::new(storage.clone());
        let api = ApiClient::new(base_url, transport, credentials.clone());
        let resources = ResourceClient::new(api);
        let auth = AuthService::new(resources.clone(), credentials.clone());
        let home = PersistedSlice::rehydrate(storage, STORAGE_KEY_HOME);

        log::info!("🚀 Cliente listo contra {}", config.backend_url());
        Ok(Self {
            credentials,
            resources,
            auth,
            home,
            router,
        })
    }

    /// Stack nativo: reqwest con el timeout de red configurado
    #[cfg(not(target_arch = "wasm32"))]
    pub fn native(config: &AppConfig, storage: Rc<dyn KeyValueStorage>) -> Result<Self, ConfigError> {
        let transport = crate::services::ReqwestTransport::new(config.network_timeout())
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Self::new(config, storage, Rc::new(transport))
    }

    /// Stack del navegador: localStorage + fetch
    #[cfg(target_arch = "wasm32")]
    pub fn browser(config: &AppConfig) -> Result<Self, ConfigError> {
        Self::new(
            config,
            Rc::new(crate::storage::BrowserStorage),
            Rc::new(crate::services::GlooTransport),
        )
    }

    pub fn resources(&self) -> &ResourceClient {
        &self.resources
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn home(&self) -> &PersistedSlice<HomeSelection> {
        &self.home
    }

    pub fn router(&self) -> &DeepLinkRouter {
        &self.router
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_authenticated()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Credential, AuthError> {
        self.auth.login(email, password).await
    }

    pub fn logout(&self) -> Result<(), StorageError> {
        self.auth.logout()
    }

    pub fn select_home(&self, home: HomeSelection) -> Result<(), StorageError> {
        self.home.set(home)
    }

    pub fn route_deep_link(&self, uri: &str) -> Result<Route, DeepLinkError> {
        self.router.route(uri)
    }
}
