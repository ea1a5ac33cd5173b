// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Private topic actions: index, show, new, create, edit and update.
//!
//! Every action takes the acting user explicitly. Authorization is asked of
//! the [`Authorizer`] before any data is returned or written.

use std::sync::Arc;

use parley_config::model::{ForumConfig, NotificationsConfig, ParleyConfig};
use parley_core::types::{NewPrivateTopic, PrivateTopic};
use parley_core::{
    Authorizer, JobQueue, ParleyError, PrivateTopicId, ReadProgress, ReadStateStore, TopicStore,
    UserId,
};
use tracing::{debug, info, warn};

use crate::decorator::UserPrivateTopicView;
use crate::form::PrivateTopicForm;
use crate::jobs::NotifyPrivateTopicUsersJob;
use crate::pagination::{Page, PageRequest};
use crate::posts_page_view::PostsPageView;
use crate::tracker::ReadStateTracker;

/// The topic listing for one user.
#[derive(Debug, Clone)]
pub struct IndexPage {
    pub topics: Vec<UserPrivateTopicView>,
    pub page: Page,
    /// Blank form for starting a new topic from the listing.
    pub form: PrivateTopicForm,
}

/// One page of a topic.
#[derive(Debug, Clone)]
pub struct ShowPage {
    pub view: PostsPageView,
    pub participants: Vec<UserId>,
}

/// Result of submitting a new topic form.
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    Created(PrivateTopic),
    /// The form failed validation; its errors are set.
    Invalid(PrivateTopicForm),
}

pub struct PrivateTopicsService {
    topics: Arc<dyn TopicStore>,
    jobs: Arc<dyn JobQueue>,
    authorizer: Arc<dyn Authorizer>,
    tracker: ReadStateTracker,
    forum: ForumConfig,
    notifications: NotificationsConfig,
}

impl PrivateTopicsService {
    pub fn new(
        config: &ParleyConfig,
        topics: Arc<dyn TopicStore>,
        read_states: Arc<dyn ReadStateStore>,
        jobs: Arc<dyn JobQueue>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            topics,
            jobs,
            authorizer,
            tracker: ReadStateTracker::new(read_states, config.read_state.write_policy),
            forum: config.forum.clone(),
            notifications: config.notifications.clone(),
        }
    }

    /// Build the service over one store that backs topics, read states and jobs.
    pub fn with_store<S>(
        config: &ParleyConfig,
        store: Arc<S>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self
    where
        S: TopicStore + ReadStateStore + JobQueue + 'static,
    {
        Self::new(config, store.clone(), store.clone(), store, authorizer)
    }

    pub fn tracker(&self) -> &ReadStateTracker {
        &self.tracker
    }

    /// Topics `user` participates in, most recently active first.
    pub async fn index(&self, user: UserId, page: PageRequest) -> Result<IndexPage, ParleyError> {
        let total = self.topics.count_topics_for_user(user).await?;
        let page = Page::new(page, self.forum.topics_per_page, total);
        let topics = self
            .topics
            .list_topics_for_user(user, page.per_page, page.offset())
            .await?;
        let topics = UserPrivateTopicView::decorate_all(&self.tracker, user, topics).await;
        Ok(IndexPage {
            topics,
            page,
            form: PrivateTopicForm::new(user),
        })
    }

    /// Show one page of a topic and record what `user` has now seen.
    ///
    /// Unread markers reflect the progress from before this visit. Read
    /// tracking is best-effort and never fails the page.
    pub async fn show(
        &self,
        user: UserId,
        topic_id: PrivateTopicId,
        page: PageRequest,
    ) -> Result<ShowPage, ParleyError> {
        let topic = self.find_topic(topic_id).await?;
        if !self.authorizer.can_read(user, &topic).await? {
            return Err(forbidden(user, "read this private topic"));
        }

        let page = Page::new(page, self.forum.posts_per_page, topic.posts_count.max(0) as u64);
        let posts = self
            .topics
            .list_posts(topic.id, page.per_page, page.offset())
            .await?;
        let prior = self
            .tracker
            .progress_for(user, topic.id)
            .await
            .unwrap_or_else(|e| {
                warn!(%user, %topic_id, error = %e, "read state lookup failed");
                ReadProgress::NeverRead
            });
        let participants = self.topics.participants(topic.id).await?;
        let view = PostsPageView::new(topic, page, posts, prior);

        if let Err(e) = self
            .tracker
            .touch(user, topic_id, view.last_visible_post(), page.number)
            .await
        {
            warn!(%user, %topic_id, page = page.number, error = %e, "failed to record read state");
        }

        Ok(ShowPage { view, participants })
    }

    /// A blank form, if `user` may start topics.
    pub async fn new_form(&self, user: UserId) -> Result<PrivateTopicForm, ParleyError> {
        let draft = NewPrivateTopic {
            title: String::new(),
            user_id: user,
            participant_ids: vec![user],
            content: String::new(),
            ip: None,
        };
        if !self.authorizer.can_create(user, &draft).await? {
            return Err(forbidden(user, "start a private topic"));
        }
        Ok(PrivateTopicForm::new(user))
    }

    /// Validate and save the form, then queue the participant notification.
    pub async fn create(&self, mut form: PrivateTopicForm) -> Result<CreateOutcome, ParleyError> {
        let user = form.user;
        let topic = match form
            .save(self.topics.as_ref(), self.authorizer.as_ref())
            .await
        {
            Ok(topic) => topic,
            Err(ParleyError::Invalid(errors)) => {
                debug!(%user, ?errors, "private topic form rejected");
                return Ok(CreateOutcome::Invalid(form));
            }
            Err(e) => return Err(e),
        };
        info!(topic_id = %topic.id, %user, "private topic created");

        if self.notifications.enabled {
            NotifyPrivateTopicUsersJob::new(topic.id)
                .enqueue(self.jobs.as_ref(), &self.notifications)
                .await?;
        }
        Ok(CreateOutcome::Created(topic))
    }

    /// The topic to edit, if `user` may update it.
    pub async fn edit(
        &self,
        user: UserId,
        topic_id: PrivateTopicId,
    ) -> Result<PrivateTopic, ParleyError> {
        let topic = self.find_topic(topic_id).await?;
        if !self.authorizer.can_update(user, &topic).await? {
            return Err(forbidden(user, "edit this private topic"));
        }
        Ok(topic)
    }

    /// Rename a topic.
    pub async fn update(
        &self,
        user: UserId,
        topic_id: PrivateTopicId,
        title: &str,
    ) -> Result<PrivateTopic, ParleyError> {
        self.edit(user, topic_id).await?;
        let title = title.trim();
        if title.is_empty() {
            return Err(ParleyError::Invalid(vec!["title can't be blank".to_string()]));
        }
        let topic = self.topics.update_topic_title(topic_id, title).await?;
        info!(%topic_id, %user, "private topic renamed");
        Ok(topic)
    }

    async fn find_topic(&self, id: PrivateTopicId) -> Result<PrivateTopic, ParleyError> {
        self.topics
            .get_topic(id)
            .await?
            .ok_or_else(|| ParleyError::not_found("private topic", id))
    }
}

fn forbidden(user: UserId, action: &'static str) -> ParleyError {
    ParleyError::Forbidden {
        user_id: user.0,
        action,
    }
}
