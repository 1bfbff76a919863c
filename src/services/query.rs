//! Filtering, ordering and statistics over destinations.
//!
//! These are the only implementations of the list predicates. The service
//! layer runs them over whatever the store returns, and the client mirror
//! runs them over its local copy, so both sides agree for the same filter.

use std::cmp::Ordering;
use std::collections::HashSet;

use mongodb::bson::oid::ObjectId;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::errors::ApiError;
use crate::models::destination::{Destination, DestinationQuery, TravelStatus, UserStats};
use crate::models::object_id::parse_object_id;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TravelStatus),
    /// A value that is not a known status. Matches nothing.
    Other(String),
}

impl StatusFilter {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "" | "all" => StatusFilter::All,
            other => match TravelStatus::parse(other) {
                Some(status) => StatusFilter::Only(status),
                None => StatusFilter::Other(other.to_string()),
            },
        }
    }

    pub fn as_query_value(&self) -> Option<&str> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(status.as_str()),
            StatusFilter::Other(raw) => Some(raw.as_str()),
        }
    }

    pub fn accepts(&self, status: TravelStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
            StatusFilter::Other(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Alphabetical,
}

impl SortKey {
    /// Unknown values fall back to newest-first.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "oldest" => SortKey::Oldest,
            "alphabetical" => SortKey::Alphabetical,
            _ => SortKey::Newest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::Alphabetical => "alphabetical",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationFilter {
    pub owner_id: Option<ObjectId>,
    pub status: StatusFilter,
    pub country: Option<String>,
    pub search: Option<String>,
    pub sort: SortKey,
}

impl DestinationFilter {
    pub fn from_query(query: DestinationQuery) -> Result<Self, ApiError> {
        let owner_id = match query.user_id.as_deref() {
            Some("") | None => None,
            Some(raw) => Some(parse_object_id(raw).map_err(|_| ApiError::invalid_id())?),
        };

        Ok(DestinationFilter {
            owner_id,
            status: query
                .status
                .as_deref()
                .map(StatusFilter::parse)
                .unwrap_or_default(),
            country: query.country.filter(|c| !c.is_empty()),
            search: query.search.filter(|s| !s.is_empty()),
            sort: query.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
        })
    }

    /// Query-string pairs that reproduce this filter on `GET /api/destinations`.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(owner) = &self.owner_id {
            pairs.push(("userId", owner.to_hex()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(status) = self.status.as_query_value() {
            pairs.push(("status", status.to_string()));
        }
        if let Some(country) = &self.country {
            pairs.push(("country", country.clone()));
        }
        pairs.push(("sort", self.sort.as_str().to_string()));
        pairs
    }

    pub fn without_owner(&self) -> Self {
        DestinationFilter {
            owner_id: None,
            ..self.clone()
        }
    }
}

/// The exact-match part of a filter: owner, status and country.
/// Stores may use this to narrow their reads.
pub fn in_scope(destination: &Destination, filter: &DestinationFilter) -> bool {
    if let Some(owner) = &filter.owner_id {
        if destination.user_id.as_ref() != Some(owner) {
            return false;
        }
    }
    if !filter.status.accepts(destination.status) {
        return false;
    }
    match filter.country.as_deref() {
        Some(country) if !country.is_empty() => destination.country == country,
        _ => true,
    }
}

/// `needle` must already be lower-cased.
fn matches_search(destination: &Destination, needle: &str) -> bool {
    destination.title.to_lowercase().contains(needle)
        || destination.country.to_lowercase().contains(needle)
        || destination.description.to_lowercase().contains(needle)
}

pub fn matches(destination: &Destination, filter: &DestinationFilter) -> bool {
    if !in_scope(destination, filter) {
        return false;
    }
    match filter.search.as_deref() {
        Some(search) if !search.is_empty() => matches_search(destination, &search.to_lowercase()),
        _ => true,
    }
}

fn newest_first(a: &Destination, b: &Destination) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.bytes().cmp(&a.id.bytes()))
}

/// Primary collation key for titles: case and diacritics are ignored, so
/// "Écija" sorts with the other E's instead of after "Z".
pub fn collation_key(title: &str) -> String {
    let mut key = String::with_capacity(title.len());
    for c in title.nfd().filter(|c| !is_combining_mark(*c)) {
        for lower in c.to_lowercase() {
            match lower {
                // Letters without a canonical decomposition.
                'ø' => key.push('o'),
                'ł' => key.push('l'),
                'đ' => key.push('d'),
                'ı' => key.push('i'),
                'ß' => key.push_str("ss"),
                'æ' => key.push_str("ae"),
                'œ' => key.push_str("oe"),
                'þ' => key.push_str("th"),
                other => key.push(other),
            }
        }
    }
    key
}

pub fn sort(destinations: &mut [Destination], key: SortKey) {
    match key {
        SortKey::Newest => destinations.sort_by(newest_first),
        SortKey::Oldest => destinations.sort_by(|a, b| newest_first(b, a)),
        // Ties on the folded key fall back to case, then the raw title, then
        // the id, so the order is total.
        SortKey::Alphabetical => destinations.sort_by_cached_key(|d| {
            (
                collation_key(&d.title),
                d.title.to_lowercase(),
                d.title.clone(),
                d.id.bytes(),
            )
        }),
    }
}

/// Keeps the records matching `filter` and orders them by its sort key.
pub fn apply(destinations: Vec<Destination>, filter: &DestinationFilter) -> Vec<Destination> {
    let needle = filter
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut kept: Vec<Destination> = destinations
        .into_iter()
        .filter(|d| in_scope(d, filter))
        .filter(|d| needle.as_deref().map_or(true, |n| matches_search(d, n)))
        .collect();
    sort(&mut kept, filter.sort);
    kept
}

/// Admin views (`viewer == None`) see everything; a user sees their own
/// destinations plus every admin-created one.
pub fn visible_to(destination: &Destination, viewer: Option<&ObjectId>) -> bool {
    match viewer {
        None => true,
        Some(viewer) => destination.user_id.as_ref() == Some(viewer) || destination.is_admin_created,
    }
}

/// Visibility for `viewer`, then the filter's search/status/country/sort.
pub fn project(
    destinations: &[Destination],
    filter: &DestinationFilter,
    viewer: Option<&ObjectId>,
) -> Vec<Destination> {
    let visible = destinations
        .iter()
        .filter(|d| visible_to(d, viewer))
        .cloned()
        .collect();
    apply(visible, &filter.without_owner())
}

/// A user's board: their personal copies, the admin destinations they have
/// not copied yet, then their own destinations.
pub fn board_for_user(destinations: &[Destination], user_id: &ObjectId) -> Vec<Destination> {
    let owned = |d: &&Destination| d.user_id.as_ref() == Some(user_id);

    let copies: Vec<&Destination> = destinations
        .iter()
        .filter(owned)
        .filter(|d| d.parent_destination_id.is_some())
        .collect();
    let copied: HashSet<ObjectId> = copies
        .iter()
        .filter_map(|d| d.parent_destination_id)
        .collect();
    let uncopied_admin = destinations
        .iter()
        .filter(|d| d.is_admin_created && !copied.contains(&d.id));
    let own = destinations
        .iter()
        .filter(owned)
        .filter(|d| d.parent_destination_id.is_none());

    copies
        .into_iter()
        .chain(uncopied_admin)
        .chain(own)
        .cloned()
        .collect()
}

/// `round(visited / total * 100)`, rounding halves up; 0 for an empty list.
pub fn progress_percent(visited: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    (visited * 200 + total) / (2 * total)
}

pub fn user_stats<'a, I>(destinations: I) -> UserStats
where
    I: IntoIterator<Item = &'a Destination>,
{
    let mut total = 0;
    let mut visited = 0;
    let mut countries = HashSet::new();

    for destination in destinations {
        total += 1;
        if destination.status == TravelStatus::Visited {
            visited += 1;
        }
        countries.insert(destination.country.as_str());
    }

    UserStats {
        total,
        visited,
        to_visit: total - visited,
        countries: countries.len(),
        progress: progress_percent(visited, total),
    }
}
