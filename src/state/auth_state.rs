// ============================================================================
// AUTH STATE - credencial persistida en el storage local
// ============================================================================

use std::rc::Rc;

use crate::models::Credential;
use crate::storage::{KeyValueStorage, StorageError};
use crate::utils::constants::{STORAGE_KEY_ACCESS_TOKEN, STORAGE_KEY_REFRESH_TOKEN, STORAGE_KEY_ROLE};

/// Credencial única del proceso. Guardar sobrescribe las tres keys.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Rc<dyn KeyValueStorage>,
}

impl CredentialStore {
    pub fn new(storage: Rc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Escribe las tres keys. Si alguna escritura falla se borran todas, así una
    /// credencial a medias nunca se mezcla con la anterior.
    pub fn save(&self, credential: &Credential) -> Result<(), StorageError> {
        if let Err(e) = self.write_all(credential) {
            log::error!("❌ No se pudo guardar la credencial: {}", e);
            if let Err(cleanup) = self.clear() {
                log::error!("❌ No se pudo borrar la credencial parcial: {}", cleanup);
            }
            return Err(e);
        }
        log::info!("🔐 Credencial guardada (rol: {})", credential.role);
        Ok(())
    }

    fn write_all(&self, credential: &Credential) -> Result<(), StorageError> {
        self.storage.set(STORAGE_KEY_ACCESS_TOKEN, &credential.access_token)?;
        self.storage.set(STORAGE_KEY_REFRESH_TOKEN, &credential.refresh_token)?;
        self.storage.set(STORAGE_KEY_ROLE, &credential.role)
    }

    pub fn load(&self) -> Option<Credential> {
        let access_token = self.access_token()?;
        let refresh_token = self.read(STORAGE_KEY_REFRESH_TOKEN).unwrap_or_default();
        let role = self.read(STORAGE_KEY_ROLE).unwrap_or_default();
        Some(Credential {
            access_token,
            refresh_token,
            role,
        })
    }

    /// Token para el header Authorization. Un error de lectura cuenta como "sin token".
    pub fn access_token(&self) -> Option<String> {
        self.read(STORAGE_KEY_ACCESS_TOKEN)
            .filter(|token| !token.is_empty())
    }

    pub fn role(&self) -> Option<String> {
        self.read(STORAGE_KEY_ROLE)
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Logout. Intenta todas las keys aunque falle una; devuelve el primer error.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut result = Ok(());
        for key in [STORAGE_KEY_ACCESS_TOKEN, STORAGE_KEY_REFRESH_TOKEN, STORAGE_KEY_ROLE] {
            if let Err(e) = self.storage.remove(key) {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        if result.is_ok() {
            log::info!("🔓 Credencial borrada");
        }
        result
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("⚠️ No se pudo leer {}: {}", key, e);
                None
            }
        }
    }
}
