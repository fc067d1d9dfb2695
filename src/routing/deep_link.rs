use std::fmt;
use std::str::FromStr;

use percent_encoding::{percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::utils::constants::{PATH_SEGMENT_ENCODE_SET, PAYMENT_CALLBACK_HOST};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeepLinkError {
    #[error("invalid deep link {uri}: {message}")]
    Invalid { uri: String, message: String },

    #[error("unexpected scheme {found}, expected {expected}")]
    Scheme { expected: String, found: String },

    #[error("no route for deep link {0}")]
    UnknownRoute(String),

    #[error("unsupported payment status {0}")]
    UnsupportedStatus(String),
}

/// Estados aceptados como último segmento del path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DeepLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(DeepLinkError::UnsupportedStatus(other.to_string())),
        }
    }
}

/// Parámetros reenviados a la pantalla de resultado de pago, tal como vienen en el link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCallback {
    pub status: Option<String>,
    pub transaction_id: Option<String>,
    pub amount: Option<String>,
    pub order_id: Option<String>,
}

impl PaymentCallback {
    /// Estado conocido, si el reenviado es uno de los valores literales
    pub fn payment_status(&self) -> Option<PaymentStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }

    /// Parámetros presentes, re-codificados para la pantalla de resultado
    pub fn query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        let pairs = [
            ("status", &self.status),
            ("transactionId", &self.transaction_id),
            ("amount", &self.amount),
            ("orderId", &self.order_id),
        ];
        for (name, value) in pairs {
            if let Some(value) = value {
                serializer.append_pair(name, value);
            }
        }
        serializer.finish()
    }

    fn from_query(url: &Url) -> Self {
        let mut callback = Self::default();
        for (name, value) in url.query_pairs() {
            let slot = match name.as_ref() {
                "status" => &mut callback.status,
                "transactionId" => &mut callback.transaction_id,
                "amount" => &mut callback.amount,
                "orderId" => &mut callback.order_id,
                _ => continue,
            };
            // Gana la primera aparición
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        callback
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Packages,
    PackageDetail { package_id: String },
    Clues { city_id: String },
    SideQuests { city_id: String },
    Chat { room_id: String },
    Leaderboard,
    Profile,
    PaymentResult(PaymentCallback),
}

impl Route {
    /// Path interno de la pantalla
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Packages => "/packages".to_string(),
            Self::PackageDetail { package_id } => format!("/packages/{}", encode(package_id)),
            Self::Clues { city_id } => format!("/clues/{}", encode(city_id)),
            Self::SideQuests { city_id } => format!("/side-quests/{}", encode(city_id)),
            Self::Chat { room_id } => format!("/chat/{}", encode(room_id)),
            Self::Leaderboard => "/leaderboard".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::PaymentResult(callback) => {
                let query = callback.query_string();
                if query.is_empty() {
                    "/payment-result".to_string()
                } else {
                    format!("/payment-result?{}", query)
                }
            }
        }
    }
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT_ENCODE_SET).to_string()
}

/// Mapea links `<scheme>://...` a pantallas
#[derive(Debug, Clone)]
pub struct DeepLinkRouter {
    scheme: String,
}

impl DeepLinkRouter {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn route(&self, uri: &str) -> Result<Route, DeepLinkError> {
        let url = Url::parse(uri.trim()).map_err(|e| DeepLinkError::Invalid {
            uri: uri.to_string(),
            message: e.to_string(),
        })?;
        if url.scheme() != self.scheme {
            return Err(DeepLinkError::Scheme {
                expected: self.scheme.clone(),
                found: url.scheme().to_string(),
            });
        }

        // `scheme://a/b` y `scheme:///a/b` dan ["a", "b"]
        let decoded = url
            .host_str()
            .into_iter()
            .chain(url.path_segments().into_iter().flatten())
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                percent_decode_str(segment)
                    .decode_utf8()
                    .map(|s| s.into_owned())
                    .map_err(|e| DeepLinkError::Invalid {
                        uri: uri.to_string(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<String>, _>>()?;
        let segments: Vec<&str> = decoded.iter().map(String::as_str).collect();

        let route = match segments.as_slice() {
            [] => Route::Home,
            [PAYMENT_CALLBACK_HOST] => Route::PaymentResult(PaymentCallback::from_query(&url)),
            [PAYMENT_CALLBACK_HOST, "payment-status", status] => {
                let status: PaymentStatus = status.parse()?;
                Route::PaymentResult(PaymentCallback {
                    status: Some(status.as_str().to_string()),
                    ..PaymentCallback::default()
                })
            }
            ["packages"] => Route::Packages,
            ["packages", id] => Route::PackageDetail {
                package_id: id.to_string(),
            },
            ["clues", city] => Route::Clues {
                city_id: city.to_string(),
            },
            ["side-quests", city] => Route::SideQuests {
                city_id: city.to_string(),
            },
            ["chat", room] => Route::Chat {
                room_id: room.to_string(),
            },
            ["leaderboard"] => Route::Leaderboard,
            ["profile"] => Route::Profile,
            _ => return Err(DeepLinkError::UnknownRoute(uri.to_string())),
        };

        log::info!("🔗 Deep link {} → {}", uri, route.path());
        Ok(route)
    }
}
