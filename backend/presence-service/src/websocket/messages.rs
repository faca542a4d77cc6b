/// WebSocket message types for presence and notifications
use crate::models::{DirectMessage, PostId, UserId, UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NOTIFICATION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Events pushed from server to client
///
/// Framed as `{"event": "<name>", "data": <payload>}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum OutboundEvent {
    /// Full roster of online users, sent to every endpoint
    #[serde(rename = "getOnlineUsers")]
    PresenceUpdate(Vec<UserId>),

    /// Social interaction aimed at one user
    #[serde(rename = "notification")]
    Notification(NotificationEvent),

    /// Direct message pushed to its receiver
    #[serde(rename = "newMessage")]
    NewMessage(DirectMessage),
}

impl OutboundEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::PresenceUpdate(_) => "getOnlineUsers",
            OutboundEvent::Notification(_) => "notification",
            OutboundEvent::NewMessage(_) => "newMessage",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Events a client may send; none are required
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum InboundEvent {
    #[serde(rename = "ping")]
    Ping,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Dislike,
    Comment,
    Follow,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Dislike => "dislike",
            NotificationKind::Comment => "comment",
            NotificationKind::Follow => "follow",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actor snapshot taken when the event is created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActorDetails {
    pub username: String,
    pub profile_picture: String,
}

impl From<&UserProfile> for ActorDetails {
    fn from(profile: &UserProfile) -> Self {
        Self {
            username: profile.username.clone(),
            profile_picture: profile.profile_picture.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub id: String,
    pub kind: NotificationKind,
    /// Who triggered the event
    pub user_id: UserId,
    pub user_details: ActorDetails,
    pub post_id: Option<PostId>,
    pub target_user_id: UserId,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn new(
        kind: NotificationKind,
        actor: &UserProfile,
        target_user_id: UserId,
        post_id: Option<PostId>,
        message: String,
    ) -> Self {
        let timestamp = Utc::now();
        Self {
            id: next_notification_id(timestamp),
            kind,
            user_id: actor.id.clone(),
            user_details: ActorDetails::from(actor),
            post_id,
            target_user_id,
            message,
            timestamp,
        }
    }

    pub fn like(actor: &UserProfile, post_author: UserId, post_id: PostId) -> Self {
        let message = format!("{} liked your post", actor.username);
        Self::new(NotificationKind::Like, actor, post_author, Some(post_id), message)
    }

    pub fn dislike(actor: &UserProfile, post_author: UserId, post_id: PostId) -> Self {
        let message = format!("{} removed their like from your post", actor.username);
        Self::new(NotificationKind::Dislike, actor, post_author, Some(post_id), message)
    }

    pub fn comment(actor: &UserProfile, post_author: UserId, post_id: PostId, text: &str) -> Self {
        let message = format!("{} commented on your post: {}", actor.username, text);
        Self::new(NotificationKind::Comment, actor, post_author, Some(post_id), message)
    }

    /// Follow events never carry a post reference
    pub fn follow(actor: &UserProfile, followed: UserId) -> Self {
        let message = format!("{} started following you", actor.username);
        Self::new(NotificationKind::Follow, actor, followed, None, message)
    }

    /// Whether the actor and recipient are the same account
    pub fn is_self_notification(&self) -> bool {
        self.user_id == self.target_user_id
    }
}

/// Millisecond timestamp plus a process-wide sequence, so ids sort by
/// creation time and stay distinct within the same millisecond.
fn next_notification_id(at: DateTime<Utc>) -> String {
    let seq = NOTIFICATION_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}-{:06}", at.timestamp_millis(), seq % 1_000_000)
}
