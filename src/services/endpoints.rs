// ============================================================================
// ENDPOINTS - un tipo por operación del backend
// ============================================================================
// Las queries declaran los tags que proveen, las mutations los que invalidan.
// ============================================================================

use serde_json::json;

use super::http::{ApiRequest, FormPart};
use super::resource_client::{Mutation, Query};
use crate::models::{
    ChatMessage, ChatRoom, Clue, Evidence, Friend, HomeSelection, LeaderboardEntry, LoginRequest, LoginResponse, Profile,
    ProfileUpdate, PurchaseResponse, SideQuest, SideQuestSubmission, TravelPackage, VerifyClueResponse,
};
use crate::state::tags::{CacheTag, QueryKey};

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub struct Packages;

impl Query for Packages {
    type Output = Vec<TravelPackage>;

    fn key(&self) -> QueryKey {
        QueryKey::Packages
    }

    fn request(&self) -> ApiRequest {
        ApiRequest::get(["packages"])
    }

    fn provides(&self) -> Vec<CacheTag> {
        vec![CacheTag::Packages]
    }
}

pub struct PackageDetail {
    pub package_id: String,
}

impl Query for PackageDetail {
    type Output = TravelPackage;

    fn key(&self) -> QueryKey {
        QueryKey::PackageDetail {
            package_id: self.package_id.clone(),
        }
    }

    fn request(&self) -> ApiRequest {
        ApiRequest::get(["packages", self.package_id.as_str()])
    }

    fn provides(&self) -> Vec<CacheTag> {
        vec![CacheTag::Package(self.package_id.clone())]
    }
}

pub struct CluesForCity {
    pub city_id: String,
}

impl Query for CluesForCity {
    type Output = Vec<Clue>;

    fn key(&self) -> QueryKey {
        QueryKey::CluesForCity {
            city_id: self.city_id.clone(),
        }
    }

    fn request(&self) -> ApiRequest {
        ApiRequest::get(["cities", self.city_id.as_str(), "clues"])
    }

    fn provides(&self) -> Vec<CacheTag> {
        vec![CacheTag::Clues(self.city_id.clone())]
    }
}

pub struct SideQuests {
    pub city_id: String,
}

impl Query for SideQuests {
    type Output = Vec<SideQuest>;

    fn key(&self) -> QueryKey {
        QueryKey::SideQuests {
            city_id: self.city_id.clone(),
        }
    }

    fn request(&self) -> ApiRequest {
        ApiRequest::get(["cities", self.city_id.as_str(), "side-quests"])
    }

    fn provides(&self) -> Vec<CacheTag> {
        vec![CacheTag::SideQuests(self.city_id.clone())]
    }
}

pub struct ChatRooms;

impl Query for ChatRooms {
    type Output = Vec<ChatRoom>;

    fn key(&self) -> QueryKey {
        QueryKey::ChatRooms
    }

    fn request(&self) -> ApiRequest {
        ApiRequest::get(["chat", "rooms"])
    }

    fn provides(&self) -> Vec<CacheTag> {
        vec![CacheTag::ChatRooms]
    }
}

pub struct ChatMessages {
    pub room_id: String,
}

impl Query for ChatMessages {
    type Output = Vec<ChatMessage>;

    fn key(&self) -> QueryKey {
        QueryKey::ChatMessages {
            room_id: self.room_id.clone(),
        }
    }

    fn request(&self) -> ApiRequest {
        ApiRequest::get(["chat", "rooms", self.room_id.as_str(), "messages"])
    }

    fn provides(&self) -> Vec<CacheTag> {
        vec![CacheTag::ChatMessages(self.room_id.clone())]
    }
}

pub struct Friends;

impl Query for Friends {
    type Output = Vec<Friend>;

    fn key(&self) -> QueryKey {
        QueryKey::Friends
    }

    fn request(&self) -> ApiRequest {
        ApiRequest::get(["friends"])
    }

    fn provides(&self) -> Vec<CacheTag> {
        vec![CacheTag::Friends]
    }
}

pub struct Leaderboard;

impl Query for Leaderboard {
    type Output = Vec<LeaderboardEntry>;

    fn key(&self) -> QueryKey {
        QueryKey::Leaderboard
    }

    fn request(&self) -> ApiRequest {
        ApiRequest::get(["leaderboard"])
    }

    fn provides(&self) -> Vec<CacheTag> {
        vec![CacheTag::Leaderboard]
    }
}

pub struct MyProfile;

impl Query for MyProfile {
    type Output = Profile;

    fn key(&self) -> QueryKey {
        QueryKey::Profile
    }

    fn request(&self) -> ApiRequest {
        ApiRequest::get(["users", "me"])
    }

    fn provides(&self) -> Vec<CacheTag> {
        vec![CacheTag::Profile]
    }
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

pub struct Login {
    pub email: String,
    pub password: String,
}

impl Mutation for Login {
    type Output = LoginResponse;

    fn request(&self) -> ApiRequest {
        ApiRequest::post(["auth", "login"]).json(json!(LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        }))
    }

    // En login se resetea toda la caché
    fn invalidates(&self) -> Vec<CacheTag> {
        Vec::new()
    }
}

pub struct VerifyClue {
    pub city_id: String,
    pub clue_id: String,
    pub code: String,
}

impl Mutation for VerifyClue {
    type Output = VerifyClueResponse;

    fn request(&self) -> ApiRequest {
        ApiRequest::post(["clues", self.clue_id.as_str(), "verify"]).json(json!({
            "code": self.code.trim(),
        }))
    }

    fn invalidates(&self) -> Vec<CacheTag> {
        vec![
            CacheTag::Clues(self.city_id.clone()),
            CacheTag::Leaderboard,
            CacheTag::Profile,
        ]
    }
}

/// Evidencia foto/vídeo de una side quest, enviada como multipart/form-data
pub struct SubmitSideQuest {
    pub city_id: String,
    pub quest_id: String,
    pub caption: Option<String>,
    pub evidence: Evidence,
}

impl Mutation for SubmitSideQuest {
    type Output = SideQuestSubmission;

    fn request(&self) -> ApiRequest {
        let mut parts = vec![FormPart::file(
            "media",
            self.evidence.file_name.clone(),
            self.evidence.mime_type.clone(),
            self.evidence.bytes.clone(),
        )];
        if let Some(caption) = &self.caption {
            parts.push(FormPart::text("caption", caption.clone()));
        }
        ApiRequest::post(["side-quests", self.quest_id.as_str(), "submissions"]).multipart(parts)
    }

    fn invalidates(&self) -> Vec<CacheTag> {
        vec![
            CacheTag::SideQuests(self.city_id.clone()),
            CacheTag::Leaderboard,
            CacheTag::Profile,
        ]
    }
}

pub struct CreateChatRoom {
    pub name: String,
    pub member_ids: Vec<String>,
}

impl Mutation for CreateChatRoom {
    type Output = ChatRoom;

    fn request(&self) -> ApiRequest {
        ApiRequest::post(["chat", "rooms"]).json(json!({
            "name": self.name,
            "memberIds": self.member_ids,
        }))
    }

    fn invalidates(&self) -> Vec<CacheTag> {
        vec![CacheTag::ChatRooms]
    }
}

pub struct SendMessage {
    pub room_id: String,
    pub body: String,
}

impl Mutation for SendMessage {
    type Output = ChatMessage;

    fn request(&self) -> ApiRequest {
        ApiRequest::post(["chat", "rooms", self.room_id.as_str(), "messages"]).json(json!({
            "body": self.body,
        }))
    }

    fn invalidates(&self) -> Vec<CacheTag> {
        vec![
            CacheTag::ChatMessages(self.room_id.clone()),
            CacheTag::ChatRooms,
        ]
    }
}

pub struct AddFriend {
    pub user_id: String,
}

impl Mutation for AddFriend {
    type Output = Friend;

    fn request(&self) -> ApiRequest {
        ApiRequest::post(["friends"]).json(json!({ "userId": self.user_id }))
    }

    fn invalidates(&self) -> Vec<CacheTag> {
        vec![CacheTag::Friends]
    }
}

pub struct PurchasePackage {
    pub package_id: String,
}

impl Mutation for PurchasePackage {
    type Output = PurchaseResponse;

    fn request(&self) -> ApiRequest {
        ApiRequest::post(["packages", self.package_id.as_str(), "purchase"])
    }

    fn invalidates(&self) -> Vec<CacheTag> {
        vec![
            CacheTag::Packages,
            CacheTag::Package(self.package_id.clone()),
            CacheTag::Profile,
        ]
    }
}

pub struct UpdateProfile {
    pub update: ProfileUpdate,
}

impl Mutation for UpdateProfile {
    type Output = Profile;

    fn request(&self) -> ApiRequest {
        ApiRequest::patch(["users", "me"]).json(json!(self.update))
    }

    // El nombre visible también sale en el leaderboard
    fn invalidates(&self) -> Vec<CacheTag> {
        vec![CacheTag::Profile, CacheTag::Leaderboard]
    }
}

pub struct SetHome {
    pub home: HomeSelection,
}

impl Mutation for SetHome {
    type Output = ();

    fn request(&self) -> ApiRequest {
        ApiRequest::put(["users", "me", "home"]).json(json!(self.home))
    }

    fn invalidates(&self) -> Vec<CacheTag> {
        vec![CacheTag::Profile]
    }
}
