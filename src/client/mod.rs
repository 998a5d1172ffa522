//! Odds data clients
//!
//! `SportsFeed` sits in front of a live `OddsProvider` and falls back to
//! generated demo data whenever the live source is missing or failing.

pub mod demo;
pub mod odds_api;

pub use odds_api::OddsApiClient;

use crate::config::Config;
use crate::error::Result;
use crate::types::{Match, Sport, SportMatches};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

/// Source of sports and odds
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OddsProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    async fn sports(&self) -> Result<Vec<Sport>>;

    /// Matches of `sport` starting within `days_ahead` days
    async fn upcoming_odds(&self, sport: &Sport, days_ahead: u32) -> Result<Vec<Match>>;
}

/// Live odds with demo fallback
pub struct SportsFeed {
    live: Option<Box<dyn OddsProvider>>,
    demo_mode: AtomicBool,
    /// Only these sport keys when non-empty
    sports_filter: Vec<String>,
}

impl SportsFeed {
    pub fn new(live: Box<dyn OddsProvider>, sports_filter: Vec<String>) -> Self {
        Self {
            live: Some(live),
            demo_mode: AtomicBool::new(false),
            sports_filter,
        }
    }

    /// Demo data only
    pub fn demo() -> Self {
        info!("Demo mode enabled - using generated data");
        Self {
            live: None,
            demo_mode: AtomicBool::new(true),
            sports_filter: Vec::new(),
        }
    }

    pub fn from_config(config: &Config, demo_requested: bool) -> Result<Self> {
        if demo_requested {
            return Ok(Self::demo());
        }

        match &config.odds_api.api_key {
            Some(key) => {
                let client = OddsApiClient::new(&config.odds_api, key)?;
                Ok(Self::new(Box::new(client), config.odds_api.sports.clone()))
            }
            None => {
                warn!("THE_ODDS_API_KEY missing - switching to demo mode");
                Ok(Self::demo())
            }
        }
    }

    pub fn is_demo(&self) -> bool {
        self.demo_mode.load(Ordering::Relaxed)
    }

    fn live(&self) -> Option<&dyn OddsProvider> {
        if self.is_demo() {
            return None;
        }
        self.live.as_deref()
    }

    /// Sports catalogue. A live failure switches the whole feed to demo mode.
    pub async fn sports(&self) -> Vec<Sport> {
        let Some(live) = self.live() else {
            return demo::sports();
        };

        match live.sports().await {
            Ok(sports) => sports,
            Err(e) => {
                error!("Failed to fetch sports from {}: {}", live.name(), e);
                info!("Switching to demo mode");
                self.demo_mode.store(true, Ordering::Relaxed);
                demo::sports()
            }
        }
    }

    pub async fn active_sports(&self) -> Vec<Sport> {
        let sports = self.sports().await;
        let restrict = !self.is_demo() && !self.sports_filter.is_empty();

        sports
            .into_iter()
            .filter(|s| s.active)
            .filter(|s| !restrict || self.sports_filter.contains(&s.key))
            .collect()
    }

    /// Upcoming matches of one sport. A live failure only affects this sport.
    pub async fn odds_for_sport(&self, sport: &Sport, days_ahead: u32) -> Vec<Match> {
        let Some(live) = self.live() else {
            return demo::generate_matches(&mut rand::rng(), sport, Utc::now());
        };

        match live.upcoming_odds(sport, days_ahead).await {
            Ok(matches) => matches,
            Err(e) => {
                error!("Failed to fetch odds for {}: {}", sport.key, e);
                info!("Using demo data for {}", sport.key);
                demo::generate_matches(&mut rand::rng(), sport, Utc::now())
            }
        }
    }

    /// Every active sport that has at least one upcoming match
    pub async fn sports_with_matches(&self, days_ahead: u32) -> Vec<SportMatches> {
        let active = self.active_sports().await;
        info!("Fetching matches for {} active sports", active.len());

        let mut result = Vec::new();
        for sport in active {
            let matches = self.odds_for_sport(&sport, days_ahead).await;
            if !matches.is_empty() {
                result.push(SportMatches { sport, matches });
            }
        }
        result
    }
}
