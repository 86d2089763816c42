//! Leaderboard client
//!
//! Keeps a cached top-3 snapshot for placement checks. The snapshot is
//! replaced wholesale on every successful fetch and left alone otherwise.

use std::cell::RefCell;

use super::transport::{
    ACTION_GET_RANKING, ACTION_PARAM, ACTION_SAVE_RECORD, HttpRequest, NAME_PARAM, SCORE_PARAM,
    Transport,
};
use super::{Leaderboard, RankingEntry, RawEntry, render_list, sorted_entries};
use crate::consts::PODIUM_SIZE;
use crate::error::{RankingError, TransportError};

/// Rank `score` would take on `podium` (sorted descending), 1-based.
///
/// Only a strictly higher score moves past an entry. `None` when the podium
/// is full and the score does not beat its last entry.
pub fn placement(podium: &[RankingEntry], score: u32) -> Option<usize> {
    let podium = &podium[..podium.len().min(PODIUM_SIZE)];
    match podium.iter().position(|entry| score > entry.score) {
        Some(i) => Some(i + 1),
        None if podium.len() < PODIUM_SIZE => Some(podium.len() + 1),
        None => None,
    }
}

pub struct RankingClient<T: Transport> {
    transport: T,
    url: String,
    podium: RefCell<Vec<RankingEntry>>,
}

impl<T: Transport> RankingClient<T> {
    pub fn new(transport: T, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
            podium: RefCell::new(Vec::new()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Cached top-3 snapshot
    pub fn podium(&self) -> Vec<RankingEntry> {
        self.podium.borrow().clone()
    }

    /// Fetch the board; any failure yields the offline sample board
    pub async fn fetch_top(&self, n: usize) -> Leaderboard {
        log::info!("Loading ranking...");
        match self.try_fetch().await {
            Ok(entries) => {
                let sorted = sorted_entries(&entries);
                *self.podium.borrow_mut() = sorted.iter().take(PODIUM_SIZE).cloned().collect();
                let board = Leaderboard::live(render_list(&entries, n));
                log::info!("Ranking loaded ({} rows)", board.rows.len());
                board
            }
            Err(e) => {
                log::warn!("Ranking unavailable ({}), showing sample data", e);
                Leaderboard::offline(n)
            }
        }
    }

    async fn try_fetch(&self) -> Result<Vec<RawEntry>, RankingError> {
        let request = HttpRequest::get(&self.url, &[(ACTION_PARAM, ACTION_GET_RANKING)]);
        let response = self.transport.send(&request).await?.into_success()?;
        log::debug!("Ranking payload: {}", response.body);
        let entries: Vec<RawEntry> = serde_json::from_str(&response.body)?;
        if entries.is_empty() {
            return Err(RankingError::Empty);
        }
        Ok(entries)
    }

    /// Rank a score would take against the cached podium
    pub fn check_top_placement(&self, score: u32) -> Option<usize> {
        let rank = placement(&self.podium.borrow(), score);
        match rank {
            Some(rank) => log::info!("{} rallies would place #{}", score, rank),
            None => log::info!("{} rallies not enough for the top {}", score, PODIUM_SIZE),
        }
        rank
    }

    /// Ordered submission attempts: query GET first, form POST as fallback
    pub fn submission_plan(&self, name: &str, score: u32) -> [HttpRequest; 2] {
        let score = score.to_string();
        let params = [
            (ACTION_PARAM, ACTION_SAVE_RECORD),
            (NAME_PARAM, name),
            (SCORE_PARAM, score.as_str()),
        ];
        [
            HttpRequest::get(&self.url, &params),
            HttpRequest::post_form(&self.url, &params),
        ]
    }

    /// Submit a score, then re-fetch the board.
    ///
    /// The first successful attempt wins; if every attempt fails the last
    /// failure is returned and nothing is re-fetched.
    pub async fn submit_score(
        &self,
        name: &str,
        score: u32,
        n: usize,
    ) -> Result<Leaderboard, RankingError> {
        log::info!("Submitting {} rallies for {}", score, name);
        let plan = self.submission_plan(name, score);
        let mut last = TransportError::Network("no attempt made".to_string());

        for (i, request) in plan.iter().enumerate() {
            match self.send_checked(request).await {
                Ok(body) => {
                    log::info!("Score submitted via {:?}: {}", request.method, body);
                    return Ok(self.fetch_top(n).await);
                }
                Err(e) => {
                    log::warn!("Submission attempt {} ({:?}) failed: {}", i + 1, request.method, e);
                    last = e;
                }
            }
        }

        log::error!("Score submission gave up after {} attempts", plan.len());
        Err(RankingError::Exhausted {
            attempts: plan.len(),
            last,
        })
    }

    async fn send_checked(&self, request: &HttpRequest) -> Result<String, TransportError> {
        let response = self.transport.send(request).await?.into_success()?;
        Ok(response.body)
    }
}
