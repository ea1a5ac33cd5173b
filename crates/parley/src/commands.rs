// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand handlers and their plain-text rendering.

use std::fmt::Write as _;

use parley_core::{ParleyError, PrivateTopicId, UserId};
use parley_topics::{
    CreateOutcome, IndexPage, PageRequest, PrivateTopicForm, PrivateTopicParams, ShowPage,
    UserIdsParam,
};

use crate::app::App;

pub async fn index(app: &App, user: i64, page: Option<&str>) -> Result<(), ParleyError> {
    let listing = app
        .service
        .index(UserId(user), PageRequest::parse(page))
        .await?;
    print!("{}", render_index(&listing));
    Ok(())
}

pub async fn show(
    app: &App,
    user: i64,
    topic: i64,
    page: Option<&str>,
) -> Result<(), ParleyError> {
    let shown = app
        .service
        .show(UserId(user), PrivateTopicId(topic), PageRequest::parse(page))
        .await?;
    print!("{}", render_show(&shown));
    Ok(())
}

pub async fn create(
    app: &App,
    user: i64,
    title: String,
    content: String,
    to: String,
) -> Result<(), ParleyError> {
    let form = PrivateTopicForm::from_params(
        UserId(user),
        PrivateTopicParams {
            title,
            content,
            user_ids: UserIdsParam::Csv(to),
        },
        None,
    );
    match app.service.create(form).await? {
        CreateOutcome::Created(topic) => {
            println!("created private topic #{} \"{}\"", topic.id, topic.title);
            Ok(())
        }
        CreateOutcome::Invalid(form) => Err(ParleyError::Invalid(form.errors().to_vec())),
    }
}

pub async fn update(app: &App, user: i64, topic: i64, title: &str) -> Result<(), ParleyError> {
    let topic = app
        .service
        .update(UserId(user), PrivateTopicId(topic), title)
        .await?;
    println!("renamed private topic #{} to \"{}\"", topic.id, topic.title);
    Ok(())
}

pub async fn notify(app: &App) -> Result<(), ParleyError> {
    let processed = app.worker.drain().await?;
    println!("processed {processed} notification job(s)");
    Ok(())
}

pub fn render_index(listing: &IndexPage) -> String {
    let mut out = String::new();
    if listing.topics.is_empty() {
        out.push_str("no private topics\n");
    }
    for row in &listing.topics {
        let marker = if row.unread { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker} #{:<6} {}  ({} posts, resume on page {})",
            row.topic.id.0, row.topic.title, row.topic.posts_count, row.last_read_page
        );
    }
    let _ = writeln!(
        out,
        "page {} of {}",
        listing.page.number,
        listing.page.total_pages()
    );
    out
}

pub fn render_show(shown: &ShowPage) -> String {
    let view = &shown.view;
    let mut out = String::new();
    let participants: Vec<String> = shown.participants.iter().map(|u| u.to_string()).collect();
    let _ = writeln!(out, "#{} {}", view.topic.id, view.topic.title);
    let _ = writeln!(out, "participants: {}", participants.join(", "));
    for entry in &view.posts {
        let marker = if entry.unread { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker} [{}] user {}: {}",
            entry.post.position, entry.post.user_id, entry.post.content
        );
    }
    let _ = writeln!(
        out,
        "page {} of {}",
        view.page.number,
        view.page.total_pages()
    );
    out
}
