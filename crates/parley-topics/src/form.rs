// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input form for starting a private topic.

use std::collections::BTreeSet;

use parley_core::types::{NewPrivateTopic, PrivateTopic};
use parley_core::{Authorizer, ParleyError, TopicStore, UserId};
use serde::{Deserialize, Serialize};

/// Recipient ids as submitted: a list, or one comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserIdsParam {
    List(Vec<UserIdItem>),
    Csv(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserIdItem {
    Number(i64),
    Text(String),
}

impl Default for UserIdsParam {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl UserIdsParam {
    /// Parse every item. Blank items are skipped; each non-numeric item
    /// yields one error message.
    pub fn parse(&self) -> Result<Vec<UserId>, Vec<String>> {
        let raw: Vec<String> = match self {
            Self::List(items) => items
                .iter()
                .map(|item| match item {
                    UserIdItem::Number(n) => n.to_string(),
                    UserIdItem::Text(s) => s.clone(),
                })
                .collect(),
            Self::Csv(s) => s.split(',').map(str::to_string).collect(),
        };

        let mut ids = Vec::new();
        let mut errors = Vec::new();
        for item in raw.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            match item.parse::<i64>() {
                Ok(id) if id > 0 => ids.push(UserId(id)),
                _ => errors.push(format!("`{item}` is not a valid user id")),
            }
        }
        if errors.is_empty() {
            Ok(ids)
        } else {
            Err(errors)
        }
    }
}

/// Fields submitted when creating a topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivateTopicParams {
    pub title: String,
    pub content: String,
    pub user_ids: UserIdsParam,
}

/// A private topic form bound to the submitting user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateTopicForm {
    pub user: UserId,
    pub title: String,
    pub content: String,
    pub user_ids: UserIdsParam,
    pub ip: Option<String>,
    errors: Vec<String>,
}

impl PrivateTopicForm {
    /// A blank form for `user`.
    pub fn new(user: UserId) -> Self {
        Self::from_params(user, PrivateTopicParams::default(), None)
    }

    pub fn from_params(user: UserId, params: PrivateTopicParams, ip: Option<String>) -> Self {
        Self {
            user,
            title: params.title,
            content: params.content,
            user_ids: params.user_ids,
            ip,
            errors: Vec::new(),
        }
    }

    /// Errors from the last [`validate`](Self::validate) or [`save`](Self::save).
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Check the form and build the topic to create.
    ///
    /// Participants are the author followed by the recipients in ascending
    /// id order, without duplicates.
    pub fn validate(&mut self) -> Result<NewPrivateTopic, ParleyError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("title can't be blank".to_string());
        }
        if self.content.trim().is_empty() {
            errors.push("content can't be blank".to_string());
        }

        let recipients = match self.user_ids.parse() {
            Ok(ids) => {
                let recipients: BTreeSet<UserId> =
                    ids.into_iter().filter(|id| *id != self.user).collect();
                if recipients.is_empty() {
                    errors.push(
                        "at least one recipient other than yourself is required".to_string(),
                    );
                }
                recipients
            }
            Err(mut parse_errors) => {
                errors.append(&mut parse_errors);
                BTreeSet::new()
            }
        };

        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(ParleyError::Invalid(errors));
        }
        self.errors.clear();

        let mut participant_ids = vec![self.user];
        participant_ids.extend(recipients);
        Ok(NewPrivateTopic {
            title: self.title.trim().to_string(),
            user_id: self.user,
            participant_ids,
            content: self.content.clone(),
            ip: self.ip.clone(),
        })
    }

    /// Validate, ask `authorizer`, then create the topic with its first post.
    pub async fn save(
        &mut self,
        store: &dyn TopicStore,
        authorizer: &dyn Authorizer,
    ) -> Result<PrivateTopic, ParleyError> {
        let topic = self.validate()?;
        if !authorizer.can_create(self.user, &topic).await? {
            return Err(ParleyError::Forbidden {
                user_id: self.user.0,
                action: "start a private topic",
            });
        }
        store.create_topic(&topic).await
    }
}
