// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One page of a topic's posts with per-post unread markers.

use parley_core::types::{Post, PrivateTopic};
use parley_core::ReadProgress;

use crate::pagination::Page;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub post: Post,
    pub unread: bool,
}

/// Posts of one page, marked against the read progress the viewer had
/// before opening the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostsPageView {
    pub topic: PrivateTopic,
    pub page: Page,
    pub posts: Vec<PostView>,
}

impl PostsPageView {
    pub fn new(topic: PrivateTopic, page: Page, posts: Vec<Post>, prior: ReadProgress) -> Self {
        let read_up_to = prior.position();
        let posts = posts
            .into_iter()
            .map(|post| PostView {
                unread: post.position > read_up_to,
                post,
            })
            .collect();
        Self { topic, page, posts }
    }

    /// The last post rendered on this page, if any.
    pub fn last_visible_post(&self) -> Option<&Post> {
        self.posts.last().map(|v| &v.post)
    }

    pub fn unread_count(&self) -> usize {
        self.posts.iter().filter(|v| v.unread).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PageRequest;
    use parley_core::{PostId, PrivateTopicId, UserId};

    fn topic() -> PrivateTopic {
        PrivateTopic {
            id: PrivateTopicId(1),
            title: "t".into(),
            user_id: UserId(1),
            last_user_id: UserId(1),
            last_post_position: 4,
            posts_count: 4,
            created_at: String::new(),
            updated_at: String::new(),
            last_post_at: String::new(),
        }
    }

    fn post(position: i64) -> Post {
        Post {
            id: PostId(100 + position),
            private_topic_id: PrivateTopicId(1),
            position,
            user_id: UserId(1),
            content: format!("post {position}"),
            ip: None,
            created_at: String::new(),
        }
    }

    #[test]
    fn marks_posts_after_prior_position() {
        let page = Page::new(PageRequest::default(), 10, 4);
        let prior = ReadProgress::ReadUpTo {
            position: 2,
            page: 1,
        };
        let view = PostsPageView::new(topic(), page, (1..=4).map(post).collect(), prior);

        let flags: Vec<_> = view.posts.iter().map(|v| v.unread).collect();
        assert_eq!(flags, vec![false, false, true, true]);
        assert_eq!(view.unread_count(), 2);
        assert_eq!(view.last_visible_post().map(|p| p.position), Some(4));
    }

    #[test]
    fn empty_page_has_no_last_post() {
        let page = Page::new(PageRequest::from(9), 10, 4);
        let view = PostsPageView::new(topic(), page, Vec::new(), ReadProgress::NeverRead);
        assert!(view.last_visible_post().is_none());
    }
}
