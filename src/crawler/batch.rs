//! The batch of product fetches for one run
//!
//! The target set is fixed when the batch is created. The batch is complete
//! once every target URL has exactly one outcome, success or failure.

use crate::crawler::fetcher::FetchError;
use crate::crawler::product::ProductRecord;
use url::Url;

/// Terminal result of one product fetch
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The page was fetched and scraped
    Scraped(ProductRecord),

    /// The page could not be fetched
    Failed { url: Url, error: FetchError },
}

impl Outcome {
    /// The product URL this outcome belongs to
    pub fn url(&self) -> &Url {
        match self {
            Self::Scraped(record) => &record.url,
            Self::Failed { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Scraped(_))
    }
}

/// Why an outcome was not recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordRejection {
    /// The URL is not part of the target set
    UnknownTarget(Url),

    /// The URL already has an outcome
    Duplicate(Url),
}

/// Target set plus the outcomes received so far
///
/// Outcomes are kept in the order they were recorded.
#[derive(Debug)]
pub struct CrawlBatch {
    targets: Vec<Url>,
    settled: Vec<bool>,
    outcomes: Vec<Outcome>,
}

impl CrawlBatch {
    /// Creates a batch over a set of distinct product URLs
    pub fn new(targets: Vec<Url>) -> Self {
        let settled = vec![false; targets.len()];
        let outcomes = Vec::with_capacity(targets.len());
        Self {
            targets,
            settled,
            outcomes,
        }
    }

    /// The target URLs, in listing order
    pub fn targets(&self) -> &[Url] {
        &self.targets
    }

    /// Size of the target set
    pub fn target_len(&self) -> usize {
        self.targets.len()
    }

    /// Number of outcomes recorded so far
    pub fn outcome_count(&self) -> usize {
        self.outcomes.len()
    }

    /// True once every target has an outcome
    pub fn is_complete(&self) -> bool {
        self.outcomes.len() == self.targets.len()
    }

    /// Records the outcome of one target
    ///
    /// Returns `Ok(true)` when this outcome completes the batch.
    pub fn record(&mut self, outcome: Outcome) -> Result<bool, RecordRejection> {
        let url = outcome.url();
        let index = self
            .targets
            .iter()
            .position(|target| target == url)
            .ok_or_else(|| RecordRejection::UnknownTarget(url.clone()))?;

        if self.settled[index] {
            return Err(RecordRejection::Duplicate(url.clone()));
        }

        self.settled[index] = true;
        self.outcomes.push(outcome);

        Ok(self.is_complete())
    }

    /// Targets that have no outcome yet
    pub fn pending(&self) -> Vec<Url> {
        self.targets
            .iter()
            .zip(&self.settled)
            .filter(|(_, settled)| !**settled)
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Number of successful outcomes
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of failed outcomes
    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    /// Splits the batch into scraped records and failures, both in recording order
    pub fn into_parts(self) -> (Vec<ProductRecord>, Vec<(Url, FetchError)>) {
        let mut records = Vec::new();
        let mut failures = Vec::new();

        for outcome in self.outcomes {
            match outcome {
                Outcome::Scraped(record) => records.push(record),
                Outcome::Failed { url, error } => failures.push((url, error)),
            }
        }

        (records, failures)
    }
}
