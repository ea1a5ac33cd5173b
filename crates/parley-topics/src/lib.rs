// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Private topics for Parley.
//!
//! The [`ReadStateTracker`] keeps each participant's read position per topic
//! and answers unread queries in bulk. [`PrivateTopicsService`] drives the
//! private topic actions on top of it, and [`NotificationWorker`] delivers
//! the new topic notifications the service queues.

pub mod decorator;
pub mod form;
pub mod jobs;
pub mod notifier;
pub mod pagination;
pub mod policy;
pub mod posts_page_view;
pub mod service;
pub mod tracker;

pub use decorator::UserPrivateTopicView;
pub use form::{PrivateTopicForm, PrivateTopicParams, UserIdsParam};
pub use jobs::{JobOutcome, NotificationWorker, NotifyPrivateTopicUsersJob};
pub use notifier::LogNotifier;
pub use pagination::{page_for_position, Page, PageRequest};
pub use policy::ParticipantPolicy;
pub use posts_page_view::{PostView, PostsPageView};
pub use service::{CreateOutcome, IndexPage, PrivateTopicsService, ShowPage};
pub use tracker::ReadStateTracker;
