/// Tracks whether a feed has further pages.
///
/// Starts out `true`. Once it turns `false` it stays `false` until the feed
/// is reset into a new lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exhaustion {
    has_more: bool,
}

impl Default for Exhaustion {
    fn default() -> Self {
        Self::new()
    }
}

impl Exhaustion {
    pub const fn new() -> Self {
        Self { has_more: true }
    }

    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Fold one successful page into the state.
    ///
    /// - `stated`: the page's "has next page" flag, if it carried metadata
    /// - `returned`: items in the response
    /// - `new_items`: items left after de-duplication
    pub fn observe(&mut self, stated: Option<bool>, returned: usize, new_items: usize, page_size: usize) {
        if !self.has_more {
            return;
        }
        self.has_more = if new_items == 0 {
            false
        } else {
            stated.unwrap_or(returned >= page_size)
        };
    }

    pub fn finish(&mut self) {
        self.has_more = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_stated_flag() {
        let mut ex = Exhaustion::new();
        ex.observe(Some(true), 20, 20, 20);
        assert!(ex.has_more());
        ex.observe(Some(false), 20, 20, 20);
        assert!(!ex.has_more());
    }

    #[test]
    fn zero_new_items_wins_over_flag() {
        let mut ex = Exhaustion::new();
        ex.observe(Some(true), 0, 0, 20);
        assert!(!ex.has_more());
    }

    #[test]
    fn page_of_known_ids_counts_as_empty() {
        let mut ex = Exhaustion::new();
        ex.observe(Some(true), 20, 0, 20);
        assert!(!ex.has_more());
    }

    #[test]
    fn never_comes_back() {
        let mut ex = Exhaustion::new();
        ex.observe(Some(false), 5, 5, 20);
        ex.observe(Some(true), 20, 20, 20);
        assert!(!ex.has_more());
    }

    #[test]
    fn missing_metadata_uses_short_page_rule() {
        let mut ex = Exhaustion::new();
        ex.observe(None, 20, 20, 20);
        assert!(ex.has_more());
        ex.observe(None, 7, 7, 20);
        assert!(!ex.has_more());
    }
}
