use serde::{Deserialize, Serialize};

use crate::services::error::{ApiError, ApiResult};

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SideQuest {
    pub id: String,
    pub city_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub points: u32,
    pub media_kind: MediaKind,
    #[serde(default)]
    pub submitted: bool,
}

/// Foto o vídeo que prueba que se hizo una side quest
#[derive(Clone, PartialEq, Debug)]
pub struct Evidence {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Evidence {
    pub fn media_kind(&self) -> Option<MediaKind> {
        if self.mime_type.starts_with("image/") {
            Some(MediaKind::Photo)
        } else if self.mime_type.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SideQuestSubmission {
    pub id: String,
    pub quest_id: String,
    pub status: String,
    #[serde(default)]
    pub media_url: Option<String>,
}

#[derive(Clone, PartialEq, Debug)]
pub enum SubmissionOutcome {
    Accepted(SideQuestSubmission),
    /// El backend respondió 409: esta quest ya tiene un envío
    AlreadySubmitted,
}

impl SubmissionOutcome {
    pub fn from_result(result: ApiResult<SideQuestSubmission>) -> ApiResult<Self> {
        match result {
            Ok(submission) => Ok(Self::Accepted(submission)),
            Err(e) if e.is_conflict() => Ok(Self::AlreadySubmitted),
            Err(e) => Err(e),
        }
    }
}
