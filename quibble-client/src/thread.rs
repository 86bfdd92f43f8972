use std::cmp::Reverse;

use crate::{api::Comment, Order, SortField};

pub const DEFAULT_PAGE_SIZE: usize = 25;

/// The displayed state of the discussion: the top-level sequence under the
/// active sort, a page window over it, and every node's replies ordered
/// newest-first. Re-fetching the tree or changing the sort recomputes the
/// sequence; moving the page window never re-sorts.
#[derive(Clone, Debug)]
pub struct ThreadView {
    comments: Vec<Comment>,
    order: Order,
    page: usize,
    page_size: usize,
}

impl ThreadView {
    pub fn new(page_size: usize) -> ThreadView {
        ThreadView {
            comments: Vec::new(),
            order: Order::default(),
            page: 1,
            page_size,
        }
    }

    pub fn order(&self) -> Order {
        self.order
    }

    /// 1-based
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.comments.len().div_ceil(self.page_size).max(1)
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Replace the tree (typically after a re-fetch): replies get their
    /// newest-first order at every depth, then the top level is re-sorted
    /// and the page window is reset to the first page.
    pub fn set_comments(&mut self, mut comments: Vec<Comment>) {
        for comment in &mut comments {
            sort_replies_newest_first(comment);
        }
        self.comments = comments;
        self.page = 1;
        self.resort();
    }

    pub fn sort_clicked(&mut self, field: SortField) {
        self.order = self.order.clicked(field);
        self.resort();
    }

    /// Only moves the window; the sorted sequence stays as it is. The
    /// rendered pager keeps `page` in range, programmatic callers that
    /// leave it get an empty page, not a panic.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn visible_page(&self) -> &[Comment] {
        let start = self.page.saturating_sub(1) * self.page_size;
        if start >= self.comments.len() {
            return &[];
        }
        let end = (start + self.page_size).min(self.comments.len());
        &self.comments[start..end]
    }

    fn resort(&mut self) {
        self.order.sort(&mut self.comments);
    }
}

fn sort_replies_newest_first(comment: &mut Comment) {
    comment.replies.sort_by_key(|r| Reverse(r.created_at));
    for reply in &mut comment.replies {
        sort_replies_newest_first(reply);
    }
}
