use serde::{Deserialize, Serialize};

use crate::services::error::{ApiError, ApiResult};

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Clue {
    pub id: String,
    pub city_id: String,
    pub title: String,
    pub hint: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub position: u32,
    #[serde(default)]
    pub solved: bool,
    /// Solo llega cuando la pista se ha revelado in situ
    #[serde(default)]
    pub secret_code: Option<String>,
}

impl Clue {
    /// Compara el código introducido con el secreto revelado, sin distinguir
    /// mayúsculas ni espacios alrededor. Una pista sin revelar nunca coincide.
    pub fn matches_code(&self, code: &str) -> bool {
        self.secret_code
            .as_deref()
            .is_some_and(|secret| secret.trim().eq_ignore_ascii_case(code.trim()))
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerifyClueResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub points_awarded: u32,
    #[serde(default)]
    pub next_clue_id: Option<String>,
}

#[derive(Clone, PartialEq, Debug)]
pub enum ClueVerification {
    Correct(VerifyClueResponse),
    Incorrect { message: Option<String> },
}

impl ClueVerification {
    /// Los códigos incorrectos vuelven como 400/422; cualquier otro fallo sigue siendo error.
    pub fn from_result(result: ApiResult<VerifyClueResponse>) -> ApiResult<Self> {
        match result {
            Ok(response) => Ok(Self::Correct(response)),
            Err(ApiError::Http {
                status: 400 | 422,
                message,
                ..
            }) => Ok(Self::Incorrect { message }),
            Err(e) => Err(e),
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct(_))
    }
}
