use reqwest::Url;

use crate::error::ApiError;
use crate::filters::FilterState;

/// Mirrors keyword/location into the shareable `/jobs` address.
///
/// The address seeds the initial terms once; afterwards the state only flows
/// outward, on explicit search submission.
#[derive(Debug, Clone)]
pub struct UrlSync {
    page: Url,
    current: Url,
}

impl UrlSync {
    pub fn new(web_url: &str) -> Result<Self, ApiError> {
        let page = Url::parse(&format!("{}/jobs", web_url.trim_end_matches('/')))
            .map_err(|e| ApiError::Url(format!("{}: {}", web_url, e)))?;
        Ok(Self {
            current: page.clone(),
            page,
        })
    }

    pub fn current(&self) -> &Url {
        &self.current
    }

    /// Reads the initial keyword/location from an address such as
    /// `https://host/jobs?keyword=rust&location=Remote`.
    pub fn initial_filters(&mut self, address: &str) -> Result<FilterState, ApiError> {
        let url = Url::parse(address).map_err(|e| ApiError::Url(format!("{}: {}", address, e)))?;
        let mut keyword = String::new();
        let mut location = String::new();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "keyword" => keyword = value.into_owned(),
                "location" => location = value.into_owned(),
                _ => {}
            }
        }
        self.current = self.address_for(&keyword, &location);
        Ok(FilterState::with_terms(&keyword, &location))
    }

    /// Called on explicit search submission only.
    pub fn on_submit(&mut self, filters: &FilterState) -> &Url {
        self.current = self.address_for(&filters.keyword, &filters.location);
        tracing::debug!(url = %self.current, "search address updated");
        &self.current
    }

    fn address_for(&self, keyword: &str, location: &str) -> Url {
        let mut url = self.page.clone();
        url.set_query(None);
        {
            let mut pairs = url.query_pairs_mut();
            if !keyword.is_empty() {
                pairs.append_pair("keyword", keyword);
            }
            if !location.is_empty() {
                pairs.append_pair("location", location);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterStore;

    #[test]
    fn test_initial_filters_from_address() {
        let mut sync = UrlSync::new("http://localhost:3000").unwrap();
        let state = sync
            .initial_filters("http://localhost:3000/jobs?keyword=react+dev&location=New%20York&skills=Go")
            .unwrap();
        assert_eq!(state.keyword, "react dev");
        assert_eq!(state.location, "New York");
        assert!(state.skills.is_empty());
    }

    #[test]
    fn test_submit_writes_only_terms() {
        let mut sync = UrlSync::new("http://localhost:3000/").unwrap();
        let mut store = FilterStore::new(FilterState::with_terms("rust", ""));
        store.toggle_skill("Docker");
        let url = sync.on_submit(store.state());
        assert_eq!(url.as_str(), "http://localhost:3000/jobs?keyword=rust");
    }

    #[test]
    fn test_submit_with_no_terms_has_no_query() {
        let mut sync = UrlSync::new("http://localhost:3000").unwrap();
        let url = sync.on_submit(&FilterState::default());
        assert_eq!(url.as_str(), "http://localhost:3000/jobs");
    }

    #[test]
    fn test_address_is_not_updated_without_submit() {
        let mut sync = UrlSync::new("http://localhost:3000").unwrap();
        sync.initial_filters("http://localhost:3000/jobs?keyword=go").unwrap();
        let mut store = FilterStore::new(FilterState::with_terms("go", ""));
        store.toggle_skill("AWS");
        assert_eq!(sync.current().as_str(), "http://localhost:3000/jobs?keyword=go");
    }

    #[test]
    fn test_rejects_garbage_address() {
        let mut sync = UrlSync::new("http://localhost:3000").unwrap();
        assert!(sync.initial_filters("not a url").is_err());
    }
}
