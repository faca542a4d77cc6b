//! Document store boundary
//!
//! Users, posts, comments and messages live in an external document database.
//! The service only needs the handful of calls below; `InMemoryStore` backs
//! local runs and tests.

use crate::models::{
    Comment, DirectMessage, FollowChange, Post, PostId, UserId, UserProfile,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait SocialStore: Send + Sync {
    async fn find_post(&self, post_id: &PostId) -> StoreResult<Post>;

    async fn user_profile(&self, user_id: &UserId) -> StoreResult<UserProfile>;

    /// Add `user_id` to the post's likes; liking twice is a no-op
    async fn like_post(&self, post_id: &PostId, user_id: &UserId) -> StoreResult<Post>;

    async fn dislike_post(&self, post_id: &PostId, user_id: &UserId) -> StoreResult<Post>;

    async fn create_comment(
        &self,
        post_id: &PostId,
        author: &UserId,
        text: &str,
    ) -> StoreResult<Comment>;

    /// Follow `target` if not already following, otherwise unfollow
    async fn toggle_follow(&self, follower: &UserId, target: &UserId)
        -> StoreResult<FollowChange>;

    async fn create_message(
        &self,
        sender: &UserId,
        receiver: &UserId,
        text: &str,
    ) -> StoreResult<DirectMessage>;
}

#[derive(Default)]
struct Collections {
    users: HashMap<UserId, UserProfile>,
    following: HashMap<UserId, HashSet<UserId>>,
    followers: HashMap<UserId, HashSet<UserId>>,
    posts: HashMap<PostId, Post>,
    comments: Vec<Comment>,
    messages: Vec<DirectMessage>,
}

/// Initial users and posts for a local `InMemoryStore`
///
/// ```json
/// { "users": [{ "id": "A", "username": "alice", "profilePicture": "" }],
///   "posts": [{ "id": "p1", "author": "A", "caption": "beach" }] }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub posts: Vec<SeedPost>,
}

#[derive(Debug, Deserialize)]
pub struct SeedPost {
    pub id: PostId,
    pub author: UserId,
    #[serde(default)]
    pub caption: String,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, id: &str, username: &str, profile_picture: &str) -> UserProfile {
        let profile = UserProfile {
            id: UserId::new(id),
            username: username.to_string(),
            profile_picture: profile_picture.to_string(),
        };
        self.inner
            .write()
            .users
            .insert(profile.id.clone(), profile.clone());
        profile
    }

    pub fn insert_post(&self, id: &str, author: &str, caption: &str) -> Post {
        let post = Post {
            id: PostId::new(id),
            author: UserId::new(author),
            caption: caption.to_string(),
            likes: HashSet::new(),
        };
        self.inner
            .write()
            .posts
            .insert(post.id.clone(), post.clone());
        post
    }

    pub fn from_seed_json(raw: &str) -> StoreResult<Self> {
        let seed: SeedData = serde_json::from_str(raw)
            .map_err(|e| StoreError::Invalid(format!("seed data: {e}")))?;
        Self::from_seed(seed)
    }

    /// Build a store from seed data; every post author must be a seeded user
    pub fn from_seed(seed: SeedData) -> StoreResult<Self> {
        let store = Self::new();
        {
            let mut guard = store.inner.write();
            for user in seed.users {
                guard.users.insert(user.id.clone(), user);
            }
            for post in seed.posts {
                if !guard.users.contains_key(&post.author) {
                    return Err(StoreError::Invalid(format!(
                        "post {} has unknown author {}",
                        post.id, post.author
                    )));
                }
                guard.posts.insert(
                    post.id.clone(),
                    Post {
                        id: post.id,
                        author: post.author,
                        caption: post.caption,
                        likes: HashSet::new(),
                    },
                );
            }
        }
        Ok(store)
    }

    pub fn user_count(&self) -> usize {
        self.inner.read().users.len()
    }

    pub fn post_count(&self) -> usize {
        self.inner.read().posts.len()
    }

    pub fn followers_of(&self, user_id: &UserId) -> HashSet<UserId> {
        self.inner
            .read()
            .followers
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn comments_on(&self, post_id: &PostId) -> Vec<Comment> {
        self.inner
            .read()
            .comments
            .iter()
            .filter(|c| &c.post == post_id)
            .cloned()
            .collect()
    }

    pub fn message_count(&self) -> usize {
        self.inner.read().messages.len()
    }
}

#[async_trait]
impl SocialStore for InMemoryStore {
    async fn find_post(&self, post_id: &PostId) -> StoreResult<Post> {
        self.inner
            .read()
            .posts
            .get(post_id)
            .cloned()
            .ok_or(StoreError::NotFound("Post"))
    }

    async fn user_profile(&self, user_id: &UserId) -> StoreResult<UserProfile> {
        self.inner
            .read()
            .users
            .get(user_id)
            .cloned()
            .ok_or(StoreError::NotFound("User"))
    }

    async fn like_post(&self, post_id: &PostId, user_id: &UserId) -> StoreResult<Post> {
        let mut guard = self.inner.write();
        let post = guard
            .posts
            .get_mut(post_id)
            .ok_or(StoreError::NotFound("Post"))?;
        post.likes.insert(user_id.clone());
        Ok(post.clone())
    }

    async fn dislike_post(&self, post_id: &PostId, user_id: &UserId) -> StoreResult<Post> {
        let mut guard = self.inner.write();
        let post = guard
            .posts
            .get_mut(post_id)
            .ok_or(StoreError::NotFound("Post"))?;
        post.likes.remove(user_id);
        Ok(post.clone())
    }

    async fn create_comment(
        &self,
        post_id: &PostId,
        author: &UserId,
        text: &str,
    ) -> StoreResult<Comment> {
        let mut guard = self.inner.write();
        if !guard.posts.contains_key(post_id) {
            return Err(StoreError::NotFound("Post"));
        }
        let author = guard
            .users
            .get(author)
            .cloned()
            .ok_or(StoreError::NotFound("User"))?;

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            author,
            post: post_id.clone(),
            created_at: Utc::now(),
        };
        guard.comments.push(comment.clone());
        Ok(comment)
    }

    async fn toggle_follow(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> StoreResult<FollowChange> {
        let mut guard = self.inner.write();
        if !guard.users.contains_key(follower) || !guard.users.contains_key(target) {
            return Err(StoreError::NotFound("User"));
        }

        let following = guard.following.entry(follower.clone()).or_default();
        let change = if following.remove(target) {
            FollowChange::Unfollowed
        } else {
            following.insert(target.clone());
            FollowChange::Followed
        };

        let followers = guard.followers.entry(target.clone()).or_default();
        match change {
            FollowChange::Followed => {
                followers.insert(follower.clone());
            }
            FollowChange::Unfollowed => {
                followers.remove(follower);
            }
        }
        Ok(change)
    }

    async fn create_message(
        &self,
        sender: &UserId,
        receiver: &UserId,
        text: &str,
    ) -> StoreResult<DirectMessage> {
        let mut guard = self.inner.write();
        if !guard.users.contains_key(receiver) {
            return Err(StoreError::NotFound("User"));
        }
        let message = DirectMessage {
            id: Uuid::new_v4().to_string(),
            sender_id: sender.clone(),
            receiver_id: receiver.clone(),
            message: text.to_string(),
            created_at: Utc::now(),
        };
        guard.messages.push(message.clone());
        Ok(message)
    }
}
