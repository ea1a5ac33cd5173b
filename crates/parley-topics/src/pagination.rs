// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! 1-based page arithmetic for topic listings and post pages.

/// A requested page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest(u32);

impl PageRequest {
    /// Parse a raw `page` parameter.
    ///
    /// Missing, non-numeric, zero and negative values all mean page 1.
    pub fn parse(raw: Option<&str>) -> Self {
        let number = raw
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|n| *n >= 1)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(1);
        Self(number)
    }

    pub fn number(self) -> u32 {
        self.0
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self(1)
    }
}

impl From<u32> for PageRequest {
    fn from(number: u32) -> Self {
        Self(number.max(1))
    }
}

/// One page over `total_items` items split into pages of `per_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub per_page: u32,
    pub total_items: u64,
}

impl Page {
    pub fn new(request: PageRequest, per_page: u32, total_items: u64) -> Self {
        Self {
            number: request.number(),
            per_page: per_page.max(1),
            total_items,
        }
    }

    /// Items to skip before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.per_page)
    }

    /// Number of pages, at least 1 so an empty listing still has a page.
    pub fn total_pages(&self) -> u32 {
        let pages = self.total_items.div_ceil(u64::from(self.per_page)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn is_last(&self) -> bool {
        self.number >= self.total_pages()
    }

    pub fn next(&self) -> Option<u32> {
        (!self.is_last()).then(|| self.number + 1)
    }

    pub fn prev(&self) -> Option<u32> {
        (self.number > 1).then(|| self.number - 1)
    }
}

/// The page a post at `position` lands on.
pub fn page_for_position(position: i64, per_page: u32) -> u32 {
    if position <= 0 {
        return 1;
    }
    let per_page = i64::from(per_page.max(1));
    u32::try_from((position - 1) / per_page + 1).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_lenient() {
        assert_eq!(PageRequest::parse(None).number(), 1);
        assert_eq!(PageRequest::parse(Some("")).number(), 1);
        assert_eq!(PageRequest::parse(Some("abc")).number(), 1);
        assert_eq!(PageRequest::parse(Some("0")).number(), 1);
        assert_eq!(PageRequest::parse(Some("-3")).number(), 1);
        assert_eq!(PageRequest::parse(Some(" 4 ")).number(), 4);
    }

    #[test]
    fn twenty_five_items_in_pages_of_ten() {
        let first = Page::new(PageRequest::default(), 10, 25);
        assert_eq!(first.total_pages(), 3);
        assert_eq!(first.offset(), 0);
        assert_eq!(first.prev(), None);
        assert_eq!(first.next(), Some(2));

        let last = Page::new(PageRequest::from(3), 10, 25);
        assert_eq!(last.offset(), 20);
        assert!(last.is_last());
        assert_eq!(last.next(), None);
        assert_eq!(last.prev(), Some(2));
    }

    #[test]
    fn empty_listing_has_one_page() {
        let page = Page::new(PageRequest::default(), 25, 0);
        assert_eq!(page.total_pages(), 1);
        assert!(page.is_last());
    }

    #[test]
    fn positions_map_to_pages() {
        assert_eq!(page_for_position(0, 10), 1);
        assert_eq!(page_for_position(1, 10), 1);
        assert_eq!(page_for_position(10, 10), 1);
        assert_eq!(page_for_position(11, 10), 2);
        assert_eq!(page_for_position(20, 10), 2);
        assert_eq!(page_for_position(25, 10), 3);
    }
}
