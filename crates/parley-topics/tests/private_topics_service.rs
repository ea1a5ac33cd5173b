// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Private topic actions end to end over SQLite.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use parley_config::model::ParleyConfig;
use parley_core::types::{NewPost, PrivateTopic};
use parley_core::{
    AdapterType, HealthStatus, JobQueue, Notifier, ParleyError, PluginAdapter, PrivateTopicId,
    TopicStore, UserId,
};
use parley_topics::{
    CreateOutcome, JobOutcome, NotificationWorker, PageRequest, ParticipantPolicy,
    PrivateTopicForm, PrivateTopicParams, PrivateTopicsService, UserIdsParam,
};

use common::{fixture, Fixture};

fn config() -> ParleyConfig {
    let mut config = ParleyConfig::default();
    config.forum.posts_per_page = 10;
    config.forum.topics_per_page = 2;
    config
}

fn service(fx: &Fixture, config: &ParleyConfig) -> PrivateTopicsService {
    let policy = Arc::new(ParticipantPolicy::new(fx.storage.clone()));
    PrivateTopicsService::with_store(config, fx.storage.clone(), policy)
}

fn form(author: i64, title: &str, to: &str) -> PrivateTopicForm {
    PrivateTopicForm::from_params(
        UserId(author),
        PrivateTopicParams {
            title: title.into(),
            content: "first post".into(),
            user_ids: UserIdsParam::Csv(to.into()),
        },
        Some("10.0.0.1".into()),
    )
}

async fn create(svc: &PrivateTopicsService, author: i64, title: &str, to: &str) -> PrivateTopic {
    match svc.create(form(author, title, to)).await.unwrap() {
        CreateOutcome::Created(topic) => topic,
        CreateOutcome::Invalid(f) => panic!("unexpected form errors: {:?}", f.errors()),
    }
}

#[tokio::test]
async fn index_lists_participating_topics_with_unread_flags() {
    let fx = fixture().await;
    let svc = service(&fx, &config());

    let older = create(&svc, 1, "older", "2").await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let newer = create(&svc, 1, "newer", "2,3").await;

    let index = svc.index(UserId(2), PageRequest::default()).await.unwrap();
    let ids: Vec<_> = index.topics.iter().map(|v| v.topic.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
    assert!(index.topics.iter().all(|v| v.unread && v.last_read_page == 1));
    assert_eq!(index.form.user, UserId(2));

    svc.show(UserId(2), older.id, PageRequest::default())
        .await
        .unwrap();
    let index = svc.index(UserId(2), PageRequest::default()).await.unwrap();
    let older_row = index.topics.iter().find(|v| v.topic.id == older.id).unwrap();
    assert!(!older_row.unread);

    let only_newer = svc.index(UserId(3), PageRequest::default()).await.unwrap();
    assert_eq!(only_newer.topics.len(), 1);
    assert_eq!(only_newer.page.total_pages(), 1);
}

#[tokio::test]
async fn index_is_paginated_by_topics_per_page() {
    let fx = fixture().await;
    let svc = service(&fx, &config());
    for i in 0..3 {
        create(&svc, 1, &format!("t{i}"), "2").await;
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let first = svc.index(UserId(1), PageRequest::default()).await.unwrap();
    assert_eq!(first.topics.len(), 2);
    assert_eq!(first.page.total_pages(), 2);
    assert_eq!(first.page.next(), Some(2));

    let second = svc
        .index(UserId(1), PageRequest::parse(Some("2")))
        .await
        .unwrap();
    assert_eq!(second.topics.len(), 1);
    assert_eq!(second.topics[0].topic.title, "t0");
}

#[tokio::test]
async fn show_marks_posts_and_advances_read_state() {
    let fx = fixture().await;
    let svc = service(&fx, &config());
    let topic = create(&svc, 1, "long thread", "2").await;
    for i in 2..=25 {
        fx.storage
            .append_post(&NewPost {
                private_topic_id: topic.id,
                user_id: UserId(1),
                content: format!("post {i}"),
                ip: None,
            })
            .await
            .unwrap();
    }

    let page2 = svc
        .show(UserId(2), topic.id, PageRequest::from(2))
        .await
        .unwrap();
    let positions: Vec<_> = page2.view.posts.iter().map(|v| v.post.position).collect();
    assert_eq!(positions, (11..=20).collect::<Vec<_>>());
    assert_eq!(page2.view.unread_count(), 10);
    assert_eq!(page2.participants, vec![UserId(1), UserId(2)]);
    assert_eq!(svc.tracker().last_read_page_for(UserId(2), topic.id).await.unwrap(), 2);

    let page1 = svc
        .show(UserId(2), topic.id, PageRequest::from(1))
        .await
        .unwrap();
    assert_eq!(page1.view.unread_count(), 0);
    assert_eq!(
        svc.tracker().last_read_page_for(UserId(2), topic.id).await.unwrap(),
        2,
        "revisiting an earlier page keeps progress"
    );

    let page3 = svc
        .show(UserId(2), topic.id, PageRequest::from(3))
        .await
        .unwrap();
    assert_eq!(page3.view.posts.len(), 5);
    assert!(page3.view.page.is_last());
    let refreshed = fx.storage.get_topic(topic.id).await.unwrap().unwrap();
    assert!(!svc.tracker().is_unread_for(UserId(2), &refreshed).await.unwrap());

    let beyond = svc
        .show(UserId(2), topic.id, PageRequest::from(9))
        .await
        .unwrap();
    assert!(beyond.view.posts.is_empty());
    assert_eq!(svc.tracker().last_read_page_for(UserId(2), topic.id).await.unwrap(), 3);
}

#[tokio::test]
async fn non_participants_and_missing_topics_are_rejected() {
    let fx = fixture().await;
    let svc = service(&fx, &config());
    let topic = create(&svc, 1, "secret", "2").await;

    let err = svc
        .show(UserId(3), topic.id, PageRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ParleyError::Forbidden { user_id: 3, .. }), "got {err:?}");

    let err = svc
        .show(UserId(1), PrivateTopicId(404), PageRequest::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn only_the_creator_can_edit_and_update() {
    let fx = fixture().await;
    let svc = service(&fx, &config());
    let topic = create(&svc, 1, "draft", "2").await;

    assert_eq!(svc.edit(UserId(1), topic.id).await.unwrap().title, "draft");
    assert!(matches!(
        svc.edit(UserId(2), topic.id).await.unwrap_err(),
        ParleyError::Forbidden { .. }
    ));

    let renamed = svc.update(UserId(1), topic.id, "  final  ").await.unwrap();
    assert_eq!(renamed.title, "final");
    assert!(matches!(
        svc.update(UserId(1), topic.id, " ").await.unwrap_err(),
        ParleyError::Invalid(_)
    ));
    assert!(matches!(
        svc.update(UserId(2), topic.id, "hijack").await.unwrap_err(),
        ParleyError::Forbidden { .. }
    ));
}

#[tokio::test]
async fn invalid_form_is_returned_with_errors() {
    let fx = fixture().await;
    let svc = service(&fx, &config());

    let blank = svc.new_form(UserId(1)).await.unwrap();
    assert!(blank.title.is_empty());

    match svc.create(form(1, "", "1")).await.unwrap() {
        CreateOutcome::Invalid(f) => assert_eq!(f.errors().len(), 2),
        CreateOutcome::Created(_) => panic!("blank form must not create a topic"),
    }
    assert_eq!(fx.storage.count_topics_for_user(UserId(1)).await.unwrap(), 0);
    assert!(fx
        .storage
        .dequeue("notify_private_topic_users")
        .await
        .unwrap()
        .is_none());
}

#[derive(Default)]
struct RecordingNotifier {
    calls: Mutex<Vec<(PrivateTopicId, Vec<UserId>)>>,
}

#[async_trait]
impl PluginAdapter for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_private_topic_users(
        &self,
        topic: &PrivateTopic,
        recipients: &[UserId],
    ) -> Result<(), ParleyError> {
        self.calls
            .lock()
            .unwrap()
            .push((topic.id, recipients.to_vec()));
        Ok(())
    }
}

#[tokio::test]
async fn created_topics_notify_everyone_but_the_author() {
    let fx = fixture().await;
    let config = config();
    let svc = service(&fx, &config);
    let topic = create(&svc, 1, "party", "3,2").await;

    let notifier = Arc::new(RecordingNotifier::default());
    let worker = NotificationWorker::new(
        fx.storage.clone(),
        fx.storage.clone(),
        notifier.clone(),
        &config.notifications,
    );

    assert_eq!(
        worker.run_once().await.unwrap(),
        Some(JobOutcome::Delivered { recipients: 2 })
    );
    assert_eq!(worker.run_once().await.unwrap(), None);
    let calls = notifier.calls.lock().unwrap().clone();
    assert_eq!(calls, vec![(topic.id, vec![UserId(2), UserId(3)])]);
}

#[tokio::test]
async fn notifications_can_be_disabled() {
    let fx = fixture().await;
    let mut config = config();
    config.notifications.enabled = false;
    let svc = service(&fx, &config);
    create(&svc, 1, "quiet", "2").await;

    assert!(fx
        .storage
        .dequeue(&config.notifications.queue_name)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn bad_payloads_fail_until_parked() {
    let fx = fixture().await;
    let mut config = config();
    config.notifications.max_attempts = 1;
    fx.storage
        .enqueue(&config.notifications.queue_name, "garbage", 1)
        .await
        .unwrap();
    fx.storage
        .enqueue(
            &config.notifications.queue_name,
            r#"{"private_topic_id":777}"#,
            1,
        )
        .await
        .unwrap();

    let worker = NotificationWorker::new(
        fx.storage.clone(),
        fx.storage.clone(),
        Arc::new(parley_topics::LogNotifier),
        &config.notifications,
    );
    assert_eq!(worker.run_once().await.unwrap(), Some(JobOutcome::Failed));
    assert_eq!(worker.run_once().await.unwrap(), Some(JobOutcome::Skipped));
    assert_eq!(worker.drain().await.unwrap(), 0);
}
