use super::endpoints::Login;
use super::error::AuthError;
use super::resource_client::ResourceClient;
use crate::models::Credential;
use crate::state::auth_state::CredentialStore;
use crate::storage::StorageError;

/// Login / logout sobre el resource client y el credential store
#[derive(Clone)]
pub struct AuthService {
    resources: ResourceClient,
    credentials: CredentialStore,
}

impl AuthService {
    pub fn new(resources: ResourceClient, credentials: CredentialStore) -> Self {
        Self {
            resources,
            credentials,
        }
    }

    /// Cambia email/password por tokens y reemplaza la credencial guardada.
    /// Los datos en caché eran del usuario anterior y se descartan.
    pub async fn login(&self, email: &str, password: &str) -> Result<Credential, AuthError> {
        log::info!("🔐 Iniciando sesión para {}", email);
        let response = self
            .resources
            .mutate(&Login {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        let credential = Credential::from(response);
        let saved = self.credentials.save(&credential);
        // Los datos del usuario anterior se van aunque la credencial nueva no se haya guardado
        self.resources.reset();
        saved?;
        log::info!("✅ Sesión iniciada como {}", credential.role);
        Ok(credential)
    }

    pub fn logout(&self) -> Result<(), StorageError> {
        self.credentials.clear()?;
        self.resources.reset();
        log::info!("👋 Sesión cerrada");
        Ok(())
    }

    pub fn current(&self) -> Option<Credential> {
        self.credentials.load()
    }
}
