//! Test doubles for the crawler

use crate::crawler::fetcher::Fetcher;
use crate::sites::Strategy;
use crate::FetchError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned responses in order and records every request
///
/// Once the script runs out every fetch fails with a 404.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<String, FetchError>>>,
    requests: Mutex<Vec<(String, Strategy)>>,
}

impl ScriptedFetcher {
    pub fn new(responses: Vec<Result<String, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn requested_strategies(&self) -> Vec<Strategy> {
        self.requests.lock().unwrap().iter().map(|(_, s)| *s).collect()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, strategy: Strategy) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push((url.to_string(), strategy));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            })
    }
}

/// A fetch failure for scripting
pub fn unavailable(url: &str) -> Result<String, FetchError> {
    Err(FetchError::Status {
        url: url.to_string(),
        status: 503,
    })
}
