use crate::{bookmarks::BookmarkStore, hydrator::ArticleHydrator, models::Article, Result};
use tracing::debug;

/// Where the saved-articles screen is in its load cycle
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready(Vec<Article>),
    /// Nothing to show, plus the reason
    Failed { error: String },
}

/// Identifies one load; results carrying an old ticket are thrown away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// State for one saved-articles screen instance.
///
/// Every focus starts a fresh load that fully replaces whatever was shown.
/// In-flight fetches are never cancelled; instead their results are
/// discarded if the screen has since re-focused or unmounted.
#[derive(Debug, Default)]
pub struct SavedArticles {
    state: LoadState,
    generation: u64,
    unmounted: bool,
}

impl SavedArticles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Articles to render; empty unless the last load succeeded
    pub fn articles(&self) -> &[Article] {
        match &self.state {
            LoadState::Ready(articles) => articles,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    pub fn is_mounted(&self) -> bool {
        !self.unmounted
    }

    /// Screen gained focus (or mounted). Always moves to `Loading`.
    pub fn focus(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        LoadTicket(self.generation)
    }

    /// Apply a finished load. Returns false when the result was stale.
    pub fn complete(&mut self, ticket: LoadTicket, result: Result<Vec<Article>>) -> bool {
        if self.unmounted {
            debug!("Dropping load result for unmounted screen");
            return false;
        }
        if ticket.0 != self.generation {
            debug!(
                "Dropping stale load result (ticket {}, current {})",
                ticket.0, self.generation
            );
            return false;
        }

        self.state = match result {
            Ok(articles) => LoadState::Ready(articles),
            Err(e) => LoadState::Failed {
                error: e.to_string(),
            },
        };
        true
    }

    /// Screen went away; anything still in flight lands nowhere
    pub fn unmount(&mut self) {
        self.unmounted = true;
    }

    /// Focus, read bookmarks, hydrate, apply
    pub async fn refresh(
        &mut self,
        bookmarks: &BookmarkStore,
        hydrator: &ArticleHydrator,
    ) -> &LoadState {
        let ticket = self.focus();
        let ids = bookmarks.list();
        let result = hydrator.hydrate(&ids).await;
        self.complete(ticket, result);
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_starts_idle() {
        let screen = SavedArticles::new();
        assert_eq!(screen.state(), &LoadState::Idle);
        assert!(screen.articles().is_empty());
    }

    #[test]
    fn test_focus_then_ready() {
        let mut screen = SavedArticles::new();
        let ticket = screen.focus();
        assert!(screen.is_loading());

        assert!(screen.complete(ticket, Ok(vec![Article::new("a", "A")])));
        assert_eq!(screen.articles().len(), 1);
        assert!(screen.error().is_none());
    }

    #[test]
    fn test_failure_shows_empty_list_and_error() {
        let mut screen = SavedArticles::new();
        let ticket = screen.focus();

        screen.complete(ticket, Err(Error::FetchFailed("timeout".into())));
        assert!(screen.articles().is_empty());
        assert!(screen.error().unwrap().contains("timeout"));
    }

    #[test]
    fn test_refocus_goes_back_to_loading() {
        let mut screen = SavedArticles::new();
        let first = screen.focus();
        screen.complete(first, Ok(vec![Article::new("a", "A")]));

        screen.focus();
        assert!(screen.is_loading());
        assert!(screen.articles().is_empty());

        let mut failed = SavedArticles::new();
        let t = failed.focus();
        failed.complete(t, Err(Error::FetchFailed("x".into())));
        failed.focus();
        assert!(failed.is_loading());
    }

    #[test]
    fn test_stale_result_is_ignored() {
        let mut screen = SavedArticles::new();
        let old = screen.focus();
        let new = screen.focus();

        assert!(screen.complete(new, Ok(vec![Article::new("new", "New")])));
        assert!(!screen.complete(old, Ok(vec![Article::new("old", "Old")])));
        assert_eq!(screen.articles()[0].id.as_str(), "new");
    }

    #[test]
    fn test_result_after_unmount_is_ignored() {
        let mut screen = SavedArticles::new();
        let ticket = screen.focus();
        screen.unmount();

        assert!(!screen.complete(ticket, Ok(vec![Article::new("a", "A")])));
        assert!(screen.is_loading());
        assert!(!screen.is_mounted());
    }
}
