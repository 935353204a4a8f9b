use std::sync::Arc;

use crate::api_models::SearchResponse;
use crate::follow::FollowingSet;
use crate::models::{Creator, Story, Verse};
use crate::projection::Projectable;

/// Search results, one section per kind. Entries are `Arc`s so list projection can
/// patch a single result without touching the rest.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub stories: Vec<Arc<Story>>,
    pub verses: Vec<Arc<Verse>>,
    pub creators: Vec<Arc<Creator>>,
}

impl From<SearchResponse> for SearchResults {
    fn from(value: SearchResponse) -> Self {
        SearchResults {
            stories: value
                .stories
                .into_iter()
                .map(|record| Arc::new(Story::from(record)))
                .collect(),
            verses: value
                .verses
                .into_iter()
                .map(|record| Arc::new(Verse::from(record)))
                .collect(),
            creators: value
                .creators
                .into_iter()
                .map(|record| Arc::new(Creator::from(record)))
                .collect(),
        }
    }
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty() && self.verses.is_empty() && self.creators.is_empty()
    }

    /// Derives every result's `following` flag from the viewer's following set.
    pub fn seed_following(&mut self, following: &FollowingSet) {
        self.stories.iter_mut().for_each(|story| seed(story, following));
        self.verses.iter_mut().for_each(|verse| seed(verse, following));
        self.creators
            .iter_mut()
            .for_each(|creator| seed(creator, following));
    }
}

// Only entries whose flag changes are copied.
fn seed<T: Projectable>(entry: &mut Arc<T>, following: &FollowingSet) {
    let target = entry.target();
    let derived = target
        .owner
        .as_deref()
        .is_some_and(|username| following.is_following(username));
    if derived != target.flags.following {
        Arc::make_mut(entry).target_mut().flags.following = derived;
    }
}

/// One page of a client-side paginated section.
#[derive(Debug, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based.
    pub page: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Slices `items` into 1-based pages of `per_page` (treated as at least 1).
/// Pages past the end are empty.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total_pages = items.len().div_ceil(per_page);
    let start = (page - 1).saturating_mul(per_page).min(items.len());
    let end = start.saturating_add(per_page).min(items.len());
    Page {
        items: &items[start..end],
        page,
        total_pages,
        has_next: page < total_pages,
        has_previous: page > 1 && total_pages > 0,
    }
}
