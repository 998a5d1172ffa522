//! The Odds API (v4) client
//!
//! Fetches the sports catalogue and head-to-head odds for upcoming matches.

use super::OddsProvider;
use crate::config::OddsApiConfig;
use crate::error::{BotError, Result};
use crate::types::{Match, Sport};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Response};
use tracing::{debug, info};

/// The Odds API client
#[derive(Clone)]
pub struct OddsApiClient {
    http: Client,
    base_url: String,
    api_key: String,
    regions: String,
    markets: String,
    odds_format: String,
}

impl OddsApiClient {
    pub fn new(config: &OddsApiConfig, api_key: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            regions: config.regions.clone(),
            markets: config.markets.clone(),
            odds_format: config.odds_format.clone(),
        })
    }

    /// All sports known to the provider, active or not
    pub async fn get_sports(&self) -> Result<Vec<Sport>> {
        let url = format!("{}/sports", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(strip_url)?;

        let sports: Vec<Sport> = Self::check(resp, "/sports")
            .await?
            .json()
            .await
            .map_err(strip_url)?;
        info!("Fetched {} available sports", sports.len());
        Ok(sports)
    }

    /// Head-to-head odds for every listed match of a sport
    pub async fn get_odds(&self, sport_key: &str) -> Result<Vec<Match>> {
        let path = format!("/sports/{}/odds", sport_key);
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", self.regions.as_str()),
                ("markets", self.markets.as_str()),
                ("oddsFormat", self.odds_format.as_str()),
                ("dateFormat", "iso"),
            ])
            .send()
            .await
            .map_err(strip_url)?;

        Self::check(resp, &path)
            .await?
            .json()
            .await
            .map_err(strip_url)
    }

    /// Turn a non-2xx answer into an error; the URL is not echoed since it
    /// carries the API key.
    async fn check(resp: Response, path: &str) -> Result<Response> {
        let status = resp.status();

        if let Some(remaining) = resp
            .headers()
            .get("x-requests-remaining")
            .and_then(|v| v.to_str().ok())
        {
            debug!("Odds API quota remaining: {}", remaining);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::Api(format!("{} returned {}: {}", path, status, body)));
        }

        Ok(resp)
    }
}

/// The query string carries the API key
fn strip_url(e: reqwest::Error) -> BotError {
    BotError::Http(e.without_url())
}

/// Keep matches starting between `now` and `now + days_ahead`
pub fn within_window(matches: Vec<Match>, now: DateTime<Utc>, days_ahead: u32) -> Vec<Match> {
    let end = now + Duration::days(i64::from(days_ahead));
    matches
        .into_iter()
        .filter(|m| m.commence_time >= now && m.commence_time <= end)
        .collect()
}

#[async_trait]
impl OddsProvider for OddsApiClient {
    fn name(&self) -> &'static str {
        "the-odds-api"
    }

    async fn sports(&self) -> Result<Vec<Sport>> {
        self.get_sports().await
    }

    async fn upcoming_odds(&self, sport: &Sport, days_ahead: u32) -> Result<Vec<Match>> {
        let matches = within_window(self.get_odds(&sport.key).await?, Utc::now(), days_ahead);
        info!(
            "Sport {}: {} matches in the next {} days",
            sport.key,
            matches.len(),
            days_ahead
        );
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_at(id: &str, commence_time: DateTime<Utc>) -> Match {
        Match {
            id: id.to_string(),
            sport_key: "basketball_nba".to_string(),
            sport_title: "NBA".to_string(),
            commence_time,
            home_team: "Lakers".to_string(),
            away_team: "Celtics".to_string(),
            bookmakers: Vec::new(),
        }
    }

    #[test]
    fn test_within_window_filters_past_and_far_matches() {
        let now = Utc::now();
        let matches = vec![
            match_at("past", now - Duration::hours(1)),
            match_at("today", now + Duration::hours(2)),
            match_at("edge", now + Duration::days(3)),
            match_at("far", now + Duration::days(3) + Duration::minutes(1)),
        ];

        let kept: Vec<String> = within_window(matches, now, 3)
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(kept, vec!["today".to_string(), "edge".to_string()]);
    }

    #[test]
    fn test_client_trims_base_url() {
        let config = OddsApiConfig {
            base_url: "https://api.the-odds-api.com/v4/".to_string(),
            ..Default::default()
        };
        let client = OddsApiClient::new(&config, "key").unwrap();
        assert_eq!(client.base_url, "https://api.the-odds-api.com/v4");
        assert_eq!(client.name(), "the-odds-api");
    }

    #[test]
    fn test_sports_response_parsing() {
        let json = r#"[
            {"key": "soccer_epl", "group": "Soccer", "title": "EPL",
             "description": "English Premier League", "active": true, "has_outcomes": false},
            {"key": "golf_masters_tournament_winner", "group": "Golf", "title": "Masters",
             "description": "2025 Winner", "active": false, "has_outcomes": true}
        ]"#;
        let sports: Vec<Sport> = serde_json::from_str(json).unwrap();
        assert_eq!(sports.len(), 2);
        assert!(sports[0].active);
        assert_eq!(sports[0].group.as_deref(), Some("Soccer"));
        assert!(!sports[1].active);
    }
}
