// ============================================================================
// PERSISTED SLICE - trozo de estado de UI reflejado en el storage local
// ============================================================================
// Se rehidrata antes de entregarse y se escribe en cada cambio.
// Sin versiones: el contenido que ya no decodifica se descarta.
// ============================================================================

use std::rc::Rc;

use serde::{de::DeserializeOwned, Serialize};

use super::reactivity::{ReactiveState, SubscriptionId};
use crate::storage::{load_json, remove_key, save_json, KeyValueStorage, StorageError};

pub struct PersistedSlice<T> {
    key: String,
    storage: Rc<dyn KeyValueStorage>,
    state: ReactiveState<Option<T>>,
}

impl<T> PersistedSlice<T>
where
    T: Serialize + DeserializeOwned + Clone + 'static,
{
    /// Lee el valor guardado (si hay) y devuelve el slice listo
    pub fn rehydrate(storage: Rc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let restored = load_json::<T>(storage.as_ref(), &key);
        if restored.is_some() {
            log::info!("📋 Rehidratado {}", key);
        }
        Self {
            key,
            storage,
            state: ReactiveState::new(restored),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> Option<T> {
        self.state.get()
    }

    /// Escribe el valor en storage y luego lo publica. Si la escritura falla,
    /// el valor en memoria no cambia.
    pub fn set(&self, value: T) -> Result<(), StorageError> {
        save_json(self.storage.as_ref(), &self.key, &value)?;
        self.state.set(Some(value));
        Ok(())
    }

    pub fn update<F>(&self, updater: F) -> Result<(), StorageError>
    where
        F: FnOnce(Option<T>) -> Option<T>,
    {
        match updater(self.get()) {
            Some(value) => self.set(value),
            None => self.clear(),
        }
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        remove_key(self.storage.as_ref(), &self.key)?;
        self.state.set(None);
        Ok(())
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Option<T>) + 'static,
    {
        self.state.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }
}

impl<T> Clone for PersistedSlice<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            storage: self.storage.clone(),
            state: self.state.clone(),
        }
    }
}
