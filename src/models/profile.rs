use serde::{Deserialize, Serialize};

/// Ciudad "home" elegida por el usuario; se refleja en el storage local
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct HomeSelection {
    pub id: String,
    pub name: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub points: u64,
    pub role: String,
    #[serde(default)]
    pub home: Option<HomeSelection>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}
