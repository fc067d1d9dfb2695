use thiserror::Error;

use crate::storage::StorageError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Fallo de una llamada al backend, clasificado una vez por el pipeline
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    /// Sin respuesta (DNS, conexión rechazada, timeout, URL inválida)
    #[error("network error: {message}")]
    Transport { message: String },

    /// Llegó respuesta pero el body no se pudo decodificar
    #[error("could not decode response (HTTP {original_status}): {message}")]
    Parse { original_status: u16, message: String },

    /// El servidor respondió con un status no-2xx
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("request failed"))]
    Http {
        status: u16,
        message: Option<String>,
        body: Option<serde_json::Value>,
    },
}

impl ApiError {
    /// Status HTTP del fallo. Los errores de parseo usan el status de la
    /// respuesta cuyo body no se pudo decodificar.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { .. } => None,
            Self::Parse {
                original_status, ..
            } => Some(*original_status),
            Self::Http { status, .. } => Some(*status),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|status| status >= 500)
    }

    /// Fallos que merecen log: transporte y 5xx
    pub fn is_reportable(&self) -> bool {
        self.is_transport() || self.is_server_error()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// Mensaje legible para mostrar en pantalla
    pub fn message(&self) -> String {
        match self {
            Self::Http {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("could not store credentials: {0}")]
    Storage(#[from] StorageError),
}
