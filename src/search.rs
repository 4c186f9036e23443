use std::cmp::Ordering;

use reqwest::Url;
use tracing::{debug, warn};

use crate::api::JobBoardApi;
use crate::demo;
use crate::error::ApiError;
use crate::filters::{FilterState, FilterStore, PartialFilterState};
use crate::models::JobListing;
use crate::query;
use crate::render::{self, ListingView};
use crate::url_sync::UrlSync;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortOrder {
    /// Order received from the backend
    #[default]
    Relevance,
    MostRecent,
    SalaryHighToLow,
    SalaryLowToHigh,
    CompanyName,
}

/// Identifies one issued search. Only the latest ticket's response is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

pub struct SearchController {
    filters: FilterStore,
    url: UrlSync,
    generation: u64,
    status: RequestStatus,
    listings: Vec<JobListing>,
    sort: SortOrder,
    demo_fallback: bool,
}

impl SearchController {
    pub fn new(initial: FilterState, url: UrlSync, demo_fallback: bool) -> Self {
        Self {
            filters: FilterStore::new(initial),
            url,
            generation: 0,
            status: RequestStatus::Idle,
            listings: Vec::new(),
            sort: SortOrder::default(),
            demo_fallback,
        }
    }

    pub fn filters(&self) -> &FilterState {
        self.filters.state()
    }

    pub fn filter_store(&mut self) -> &mut FilterStore {
        &mut self.filters
    }

    pub fn status(&self) -> &RequestStatus {
        &self.status
    }

    pub fn address(&self) -> &Url {
        self.url.current()
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    /// Explicit search submission: updates the terms and the shareable address.
    pub fn submit(&mut self, keyword: &str, location: &str) -> &Url {
        self.filters.apply(PartialFilterState {
            keyword: Some(keyword.trim().to_string()),
            location: Some(location.trim().to_string()),
            ..Default::default()
        });
        self.url.on_submit(self.filters.state())
    }

    pub fn begin(&mut self) -> SearchTicket {
        self.generation += 1;
        self.status = RequestStatus::Loading;
        debug!(generation = self.generation, "search started");
        SearchTicket(self.generation)
    }

    /// Records the outcome of `ticket`'s request unless a newer search was issued since.
    pub fn complete(
        &mut self,
        ticket: SearchTicket,
        result: Result<Vec<JobListing>, ApiError>,
    ) -> Result<Completion, ApiError> {
        if ticket.0 != self.generation {
            warn!(
                generation = ticket.0,
                latest = self.generation,
                "discarding stale search response"
            );
            return Ok(Completion::Stale);
        }

        match result {
            Ok(listings) => {
                self.listings = listings;
                self.status = RequestStatus::Ready;
                Ok(Completion::Applied)
            }
            Err(e) if self.demo_fallback => {
                warn!(error = %e, "search failed; showing demo listings");
                self.listings = demo::listings();
                self.status = RequestStatus::Ready;
                Ok(Completion::Applied)
            }
            Err(e) => {
                self.listings.clear();
                self.status = RequestStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    pub fn run(&mut self, api: &dyn JobBoardApi) -> Result<Completion, ApiError> {
        let ticket = self.begin();
        let params = query::build(self.filters.state());
        let result = api.search_jobs(&params);
        self.complete(ticket, result)
    }

    /// Current result set in the selected order.
    pub fn listings(&self) -> Vec<JobListing> {
        let mut listings = self.listings.clone();
        sort_listings(&mut listings, self.sort);
        listings
    }

    pub fn view(&self) -> ListingView {
        render::view_state(&self.status, &self.listings())
    }
}

/// Stable client-side sort. Listings missing the sort key go last.
pub fn sort_listings(listings: &mut [JobListing], order: SortOrder) {
    match order {
        SortOrder::Relevance => {}
        SortOrder::MostRecent => {
            listings.sort_by(|a, b| none_last(a.posted_at, b.posted_at, |x, y| y.cmp(&x)));
        }
        SortOrder::SalaryHighToLow => listings.sort_by(|a, b| {
            none_last(a.salary_max.or(a.salary_min), b.salary_max.or(b.salary_min), |x, y| y.cmp(&x))
        }),
        SortOrder::SalaryLowToHigh => listings.sort_by(|a, b| {
            none_last(a.salary_min.or(a.salary_max), b.salary_min.or(b.salary_max), |x, y| x.cmp(&y))
        }),
        SortOrder::CompanyName => listings.sort_by(|a, b| {
            a.company.name.to_lowercase().cmp(&b.company.name.to_lowercase())
        }),
    }
}

fn none_last<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
