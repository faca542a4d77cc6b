//! Social interactions that emit realtime events
//!
//! Every operation commits its storage write first and only then hands an
//! event to the router. Routing never fails the operation: an offline
//! recipient, a missing actor profile or a closed socket only cost the live
//! notification.

use super::store::SocialStore;
use crate::error::{AppError, AppResult};
use crate::models::{Comment, DirectMessage, FollowChange, Post, PostId, UserId, UserProfile};
use crate::websocket::{DeliveryOutcome, NotificationEvent, NotificationRouter, OutboundEvent};
use std::sync::Arc;

#[derive(Clone)]
pub struct InteractionService {
    store: Arc<dyn SocialStore>,
    router: NotificationRouter,
}

impl InteractionService {
    pub fn new(store: Arc<dyn SocialStore>, router: NotificationRouter) -> Self {
        Self { store, router }
    }

    pub async fn like_post(&self, actor: &UserId, post_id: &PostId) -> AppResult<Post> {
        let post = self.store.like_post(post_id, actor).await?;

        if let Some(profile) = self.actor_snapshot(actor, &post.author).await {
            let event = NotificationEvent::like(&profile, post.author.clone(), post.id.clone());
            self.notify(event);
        }
        Ok(post)
    }

    pub async fn dislike_post(&self, actor: &UserId, post_id: &PostId) -> AppResult<Post> {
        let post = self.store.dislike_post(post_id, actor).await?;

        if let Some(profile) = self.actor_snapshot(actor, &post.author).await {
            let event = NotificationEvent::dislike(&profile, post.author.clone(), post.id.clone());
            self.notify(event);
        }
        Ok(post)
    }

    pub async fn add_comment(
        &self,
        actor: &UserId,
        post_id: &PostId,
        text: &str,
    ) -> AppResult<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::BadRequest("Text is required".into()));
        }

        let post = self.store.find_post(post_id).await?;
        let comment = self.store.create_comment(post_id, actor, text).await?;

        if actor != &post.author {
            // Comment already carries the author snapshot
            let event = NotificationEvent::comment(
                &comment.author,
                post.author.clone(),
                post.id.clone(),
                text,
            );
            self.notify(event);
        }
        Ok(comment)
    }

    pub async fn follow_or_unfollow(
        &self,
        actor: &UserId,
        target: &UserId,
    ) -> AppResult<FollowChange> {
        if actor == target {
            return Err(AppError::BadRequest(
                "You cannot follow/unfollow yourself".into(),
            ));
        }

        let change = self.store.toggle_follow(actor, target).await?;

        if change == FollowChange::Followed {
            if let Some(profile) = self.actor_snapshot(actor, target).await {
                self.notify(NotificationEvent::follow(&profile, target.clone()));
            }
        }
        Ok(change)
    }

    pub async fn send_message(
        &self,
        sender: &UserId,
        receiver: &UserId,
        text: &str,
    ) -> AppResult<DirectMessage> {
        if text.trim().is_empty() {
            return Err(AppError::BadRequest("Message text is required".into()));
        }

        let message = self.store.create_message(sender, receiver, text).await?;

        if sender != receiver {
            let outcome = self
                .router
                .deliver(receiver, OutboundEvent::NewMessage(message.clone()));
            tracing::debug!(
                receiver = %receiver,
                outcome = outcome.as_str(),
                "direct message pushed"
            );
        }
        Ok(message)
    }

    /// Profile of the actor for the event payload, or `None` when no event
    /// should be sent (self-interaction or profile lookup failed)
    async fn actor_snapshot(
        &self,
        actor: &UserId,
        recipient: &UserId,
    ) -> Option<UserProfile> {
        if actor == recipient {
            return None;
        }
        match self.store.user_profile(actor).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(
                    actor = %actor,
                    error = %e,
                    "skipping notification: actor profile unavailable"
                );
                None
            }
        }
    }

    fn notify(&self, event: NotificationEvent) {
        if event.is_self_notification() {
            return;
        }
        // Offline recipients simply miss the live event
        let _: DeliveryOutcome = self.router.route_notification(event);
    }
}
