//! Canned [`FeatureSource`] for unit tests.

use std::{
    collections::BTreeMap,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use serde_json::Value;

use crate::{FeatureCollection, FeatureQuery, FeatureSource, WfsError};

enum Canned {
    Ok(Value),
    Status(u16),
}

/// Answers queries by feature type, optionally after a delay.
#[derive(Default)]
pub struct MockSource {
    responses: Mutex<BTreeMap<String, Canned>>,
    delays: Mutex<Vec<(String, Duration)>>,
    queries: Mutex<Vec<FeatureQuery>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Responds to `type_name` with the given `FeatureCollection` JSON.
    pub fn respond(self, type_name: &str, body: Value) -> Self {
        self.replace(type_name, body);
        self
    }

    /// Swaps the response for `type_name` between queries.
    pub fn replace(&self, type_name: &str, body: Value) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(type_name.to_string(), Canned::Ok(body));
    }

    /// Fails queries for `type_name` with an HTTP status.
    pub fn fail(self, type_name: &str, status: u16) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(type_name.to_string(), Canned::Status(status));
        self
    }

    /// Delays the next query whose filter contains `needle`.
    pub fn delay_matching(self, needle: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((needle.to_string(), delay));
        self
    }

    /// Every query received so far.
    pub fn queries(&self) -> Vec<FeatureQuery> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn take_delay(&self, query: &FeatureQuery) -> Option<Duration> {
        let filter = query.cql_filter.as_deref().unwrap_or_default();
        let mut delays = self.delays.lock().unwrap_or_else(PoisonError::into_inner);
        let index = delays
            .iter()
            .position(|(needle, _)| filter.contains(needle.as_str()))?;
        Some(delays.remove(index).1)
    }
}

#[async_trait::async_trait]
impl FeatureSource for MockSource {
    async fn get_feature(&self, query: &FeatureQuery) -> Result<FeatureCollection, WfsError> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());

        if let Some(delay) = self.take_delay(query) {
            tokio::time::sleep(delay).await;
        }

        let canned = match self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&query.type_name)
        {
            Some(Canned::Ok(body)) => Some(Ok(body.clone())),
            Some(Canned::Status(status)) => Some(Err(*status)),
            None => None,
        };

        match canned {
            Some(Ok(body)) => Ok(serde_json::from_value(body)?),
            Some(Err(status)) => Err(WfsError::Status {
                status,
                type_name: query.type_name.clone(),
            }),
            None => Ok(FeatureCollection::default()),
        }
    }
}
