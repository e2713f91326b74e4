//! Chronological feed assembly.
//!
//! Every feed variant (global, group, profile, follow) filters its own base
//! selection and hands the paginator to [`assemble`], which clamps the
//! requested page and returns one page of items plus pager metadata.

use sea_orm::{DatabaseConnection, DbErr, Paginator, SelectorTrait};

const PAGER_LOOK_AHEAD: usize = 2;

/// One page of a feed, with enough counts to render pagination controls.
pub struct FeedPage<M> {
    pub items: Vec<M>,
    pub page: usize,
    pub page_count: usize,
    pub item_count: usize,
    pub per_page: usize,
}

impl<M> FeedPage<M> {
    /// 1-based index of the first item on this page, 0 when the feed is empty.
    pub fn first_item(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.per_page + 1
        }
    }

    /// 1-based index of the last item on this page.
    pub fn last_item(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.first_item() + self.items.len() - 1
        }
    }
}

/// Out-of-range page requests clamp to the nearest valid page; they never 404.
pub fn clamp_page(requested: Option<usize>, page_count: usize) -> usize {
    match requested {
        None | Some(0) => 1,
        Some(page) if page > page_count => page_count,
        Some(page) => page,
    }
}

/// Fetches one page from an ordered selection.
///
/// The selection's ORDER BY is the caller's responsibility; feeds order posts
/// by created_at then id so that pages stay stable under timestamp ties.
pub async fn assemble<'db, S>(
    pages: Paginator<'db, DatabaseConnection, S>,
    per_page: usize,
    requested: Option<usize>,
) -> Result<FeedPage<S::Item>, DbErr>
where
    S: SelectorTrait + 'db,
{
    let item_count = pages.num_items().await?;
    let page_count = std::cmp::max(1, (item_count + per_page - 1) / per_page);
    let page = clamp_page(requested, page_count);
    let items = pages.fetch_page(page - 1).await?;

    Ok(FeedPage {
        items,
        page,
        page_count,
        item_count,
        per_page,
    })
}

/// Numbered page links with an ellipsis window around the current page.
///
/// [1] 2 3 ... 13
/// 1 ... 4 5 [6] 7 8 ... 13
/// 1 ... 11 12 [13]
#[derive(Debug)]
pub struct Pager {
    pub base_url: String,
    pub this_page: usize,
    pub page_count: usize,
    pub item_count: usize,
    pub first_item: usize,
    pub last_item: usize,
}

impl Pager {
    pub fn new<M>(base_url: &str, feed: &FeedPage<M>) -> Self {
        Self {
            base_url: base_url.to_owned(),
            this_page: feed.page,
            page_count: feed.page_count,
            item_count: feed.item_count,
            first_item: feed.first_item(),
            last_item: feed.last_item(),
        }
    }

    pub fn has_pages(&self) -> bool {
        self.page_count > 1
    }

    /// Page numbers to render, with 0 marking an ellipsis.
    pub fn pages(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let lo = std::cmp::max(1, self.this_page.saturating_sub(PAGER_LOOK_AHEAD));
        let hi = std::cmp::min(self.page_count, self.this_page + PAGER_LOOK_AHEAD);

        if lo > 1 {
            out.push(1);
            if lo > 2 {
                out.push(0);
            }
        }
        out.extend(lo..=hi);
        if hi < self.page_count {
            if hi + 1 < self.page_count {
                out.push(0);
            }
            out.push(self.page_count);
        }
        out
    }

    pub fn as_html(&self) -> String {
        if !self.has_pages() {
            return String::new();
        }

        let mut buffer = String::from("<nav class=\"pager\">");
        for page in self.pages() {
            if page == 0 {
                buffer.push_str("<span class=\"pager-gap\">…</span>");
            } else if page == self.this_page {
                buffer.push_str(&format!("<span class=\"pager-here\">{}</span>", page));
            } else {
                buffer.push_str(&format!(
                    "<a class=\"pager-page\" href=\"{}?page={}\">{}</a>",
                    self.base_url, page, page
                ));
            }
        }
        buffer.push_str("</nav>");
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(item_count: usize, per_page: usize, page: usize) -> FeedPage<i32> {
        let page_count = std::cmp::max(1, (item_count + per_page - 1) / per_page);
        let first = (page - 1) * per_page;
        let on_page = std::cmp::min(per_page, item_count.saturating_sub(first));
        FeedPage {
            items: vec![0; on_page],
            page,
            page_count,
            item_count,
            per_page,
        }
    }

    #[test]
    fn clamp_defaults_to_first_page() {
        assert_eq!(clamp_page(None, 5), 1);
        assert_eq!(clamp_page(Some(0), 5), 1);
    }

    #[test]
    fn clamp_limits_to_last_page() {
        assert_eq!(clamp_page(Some(9), 5), 5);
        assert_eq!(clamp_page(Some(3), 5), 3);
        assert_eq!(clamp_page(Some(7), 1), 1);
    }

    #[test]
    fn thirteen_posts_split_ten_three() {
        let first = page_of(13, 10, 1);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.first_item(), 1);
        assert_eq!(first.last_item(), 10);

        let second = page_of(13, 10, 2);
        assert_eq!(second.items.len(), 3);
        assert_eq!(second.first_item(), 11);
        assert_eq!(second.last_item(), 13);
    }

    #[test]
    fn empty_feed_is_one_empty_page() {
        let feed = page_of(0, 10, 1);
        assert_eq!(feed.page_count, 1);
        assert_eq!(feed.first_item(), 0);
        assert_eq!(feed.last_item(), 0);
    }

    #[test]
    fn pager_windows() {
        let pager = |this_page, page_count| Pager {
            base_url: "/".to_owned(),
            this_page,
            page_count,
            item_count: 0,
            first_item: 0,
            last_item: 0,
        };
        assert_eq!(pager(1, 3).pages(), vec![1, 2, 3]);
        assert_eq!(pager(1, 13).pages(), vec![1, 2, 3, 0, 13]);
        assert_eq!(pager(6, 13).pages(), vec![1, 0, 4, 5, 6, 7, 8, 0, 13]);
        assert_eq!(pager(13, 13).pages(), vec![1, 0, 11, 12, 13]);
        assert!(!pager(1, 1).has_pages());
    }

    #[test]
    fn pager_html_marks_current_page() {
        let html = Pager {
            base_url: "/groups/rust".to_owned(),
            this_page: 2,
            page_count: 3,
            item_count: 25,
            first_item: 11,
            last_item: 20,
        }
        .as_html();
        assert!(html.contains("<span class=\"pager-here\">2</span>"));
        assert!(html.contains("href=\"/groups/rust?page=3\""));
    }
}
