//! Paginated fetching from the launches query endpoint.
//!
//! One request per page, strictly in sequence, until the server stops
//! reporting `hasNextPage`. Records that fail validation are logged and
//! dropped; any transport failure aborts the whole fetch.

mod http;

pub use http::HttpTransport;

use jiff::Timestamp;

use crate::model::{
    DateAfter, LaunchFilter, LaunchRecord, QueryOptions, QueryPage, QueryRequest, SortOrder,
    SortSpec,
};
use crate::validate::validate;

/// Launches requested per page.
pub const PAGE_SIZE: u32 = 50;

/// Errors that abort a fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request for page {page} failed: {source}")]
    Request {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("page {page} returned HTTP {status}")]
    Status {
        page: u32,
        status: reqwest::StatusCode,
    },

    #[error("page {page} could not be decoded: {source}")]
    Decode {
        page: u32,
        #[source]
        source: reqwest::Error,
    },
}

/// Sends one page request and returns the decoded page.
pub trait Transport {
    fn post_query(&self, request: &QueryRequest) -> Result<QueryPage, FetchError>;
}

/// Anything that can produce the launches newer than a watermark.
pub trait LaunchSource {
    /// Fetch every launch, or only those dated after `since` when given.
    fn fetch(&self, since: Option<Timestamp>) -> Result<Vec<LaunchRecord>, FetchError>;
}

/// Walks every page of the query endpoint through a [`Transport`].
pub struct Fetcher<T> {
    transport: T,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

impl<T: Transport> LaunchSource for Fetcher<T> {
    fn fetch(&self, since: Option<Timestamp>) -> Result<Vec<LaunchRecord>, FetchError> {
        let mut request = build_request(since);
        match since {
            Some(since) => log::info!("Querying for launches since {since}"),
            None => log::info!("Querying for all launches (backfill)."),
        }

        let mut launches = Vec::new();
        loop {
            let page = request.options.page;
            log::info!("Fetching page {page} of launch data...");

            let QueryPage {
                docs,
                has_next_page,
            } = self.transport.post_query(&request).inspect_err(|e| {
                log::error!("API request failed on page {page}: {e}");
            })?;
            log::info!("Received {} launches on page {page}.", docs.len());

            for document in &docs {
                match validate(document) {
                    Ok(launch) => launches.push(launch),
                    Err(e) => log::error!("{e}"),
                }
            }

            if !has_next_page {
                break;
            }
            request.options.page += 1;
        }

        log::info!(
            "Finished fetching all pages. Total launches retrieved: {}",
            launches.len()
        );
        Ok(launches)
    }
}

/// The first-page request: ascending flight order, payloads populated,
/// and a strict `date_utc > since` filter when a watermark exists.
fn build_request(since: Option<Timestamp>) -> QueryRequest {
    QueryRequest {
        query: LaunchFilter {
            date_utc: since.map(|since| DateAfter {
                gt: since.to_string(),
            }),
        },
        options: QueryOptions {
            page: 1,
            limit: PAGE_SIZE,
            sort: SortSpec {
                flight_number: SortOrder::Asc,
            },
            populate: vec!["payloads".to_string()],
        },
    }
}
