//! Request orchestration
//!
//! Glues the sports feed, the analyzer and the match cache together for the
//! chat and CLI front ends.

use crate::analyzer::{BettingAnalyzer, MIN_TIER_BETS};
use crate::cache::TtlCache;
use crate::client::SportsFeed;
use crate::config::Config;
use crate::error::Result;
use crate::types::{Combination, MatchAnalysis, Sport, SportMatches, Tier};
use std::time::Duration;
use tracing::info;

const ALL_MATCHES_KEY: &str = "all_matches";

/// Result of a combination request
#[derive(Debug, Clone, PartialEq)]
pub enum ComboOutcome<T> {
    /// No upcoming match at all
    NoMatches,
    /// Too few eligible bets
    NotEnough { found: usize, needed: usize },
    Ready(T),
}

pub struct BettingService {
    feed: SportsFeed,
    analyzer: BettingAnalyzer,
    cache: TtlCache<&'static str, Vec<SportMatches>>,
    days_ahead: u32,
    combo_size: usize,
}

impl BettingService {
    pub fn new(
        feed: SportsFeed,
        analyzer: BettingAnalyzer,
        cache_ttl: Duration,
        days_ahead: u32,
        combo_size: usize,
    ) -> Self {
        Self {
            feed,
            analyzer,
            cache: TtlCache::new(cache_ttl),
            days_ahead,
            combo_size,
        }
    }

    pub fn from_config(config: &Config, demo_requested: bool) -> Result<Self> {
        Ok(Self::new(
            SportsFeed::from_config(config, demo_requested)?,
            BettingAnalyzer::from_config(&config.analyzer),
            Duration::from_secs(config.cache.timeout_secs),
            config.analyzer.days_ahead,
            config.analyzer.combo_size,
        ))
    }

    pub fn is_demo(&self) -> bool {
        self.feed.is_demo()
    }

    pub fn days_ahead(&self) -> u32 {
        self.days_ahead
    }

    pub async fn sports(&self) -> Vec<Sport> {
        self.feed.active_sports().await
    }

    /// Fresh matches, grouped by sport
    pub async fn upcoming_matches(&self) -> Vec<SportMatches> {
        self.feed.sports_with_matches(self.days_ahead).await
    }

    /// Matches from the cache when still valid, fetched otherwise
    pub async fn cached_matches(&self) -> Vec<SportMatches> {
        if let Some(matches) = self.cache.get(&ALL_MATCHES_KEY) {
            info!("Using cached matches");
            return matches;
        }

        let matches = self.upcoming_matches().await;
        self.cache.insert(ALL_MATCHES_KEY, matches.clone());
        matches
    }

    /// Analyses with a non-zero confidence, most confident first
    pub fn analyze(&self, groups: &[SportMatches]) -> Vec<MatchAnalysis> {
        let mut analyses: Vec<MatchAnalysis> = groups
            .iter()
            .flat_map(|g| g.matches.iter())
            .filter_map(|m| self.analyzer.analyze_match(m))
            .filter(|a| a.confidence > 0)
            .collect();

        analyses.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        analyses
    }

    /// Bets eligible for a tier: confident enough and not priced too high
    pub fn tier_candidates(&self, groups: &[SportMatches], tier: Tier) -> Vec<MatchAnalysis> {
        groups
            .iter()
            .flat_map(|g| g.matches.iter())
            .filter_map(|m| self.analyzer.analyze_match(m))
            .filter(|a| a.confidence >= tier.min_confidence() && a.odds <= tier.max_odds())
            .collect()
    }

    /// One combination for `tier`, built from fresh matches
    pub async fn tier_combination(&self, tier: Tier) -> ComboOutcome<Combination> {
        let groups = self.upcoming_matches().await;
        if groups.is_empty() {
            return ComboOutcome::NoMatches;
        }

        let candidates = self.tier_candidates(&groups, tier);
        info!("{} candidate bets for a {} combination", candidates.len(), tier);

        let not_enough = ComboOutcome::NotEnough {
            found: candidates.len(),
            needed: MIN_TIER_BETS,
        };
        if candidates.len() < MIN_TIER_BETS {
            return not_enough;
        }

        match self.analyzer.generate_tier_combination(&candidates, tier) {
            Some(combination) => ComboOutcome::Ready(combination),
            None => not_enough,
        }
    }

    /// Classic Sûr / Value / Mixte combinations, built from fresh matches
    pub async fn classic_combinations(&self) -> ComboOutcome<Vec<Combination>> {
        let groups = self.upcoming_matches().await;
        if groups.is_empty() {
            return ComboOutcome::NoMatches;
        }

        let min_confidence = self.analyzer.min_confidence();
        let eligible: Vec<MatchAnalysis> = groups
            .iter()
            .flat_map(|g| g.matches.iter())
            .filter_map(|m| self.analyzer.analyze_match(m))
            .filter(|a| a.confidence >= min_confidence)
            .collect();

        let combinations =
            self.analyzer
                .generate_combinations(&eligible, self.combo_size, &mut rand::rng());

        if combinations.is_empty() {
            ComboOutcome::NotEnough {
                found: eligible.len(),
                needed: self.combo_size,
            }
        } else {
            ComboOutcome::Ready(combinations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockOddsProvider;
    use crate::types::{Bookmaker, BookmakerMarket, ComboKind, Match, OutcomePrice};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn priced_match(id: &str, home: Decimal, away: Decimal) -> Match {
        let home_team = format!("{} Home", id);
        let away_team = format!("{} Away", id);
        Match {
            id: id.to_string(),
            sport_key: "basketball_nba".to_string(),
            sport_title: "NBA".to_string(),
            commence_time: Utc::now() + chrono::Duration::hours(6),
            home_team: home_team.clone(),
            away_team: away_team.clone(),
            bookmakers: vec![Bookmaker {
                key: "unibet".to_string(),
                title: "Unibet".to_string(),
                markets: vec![BookmakerMarket {
                    key: "h2h".to_string(),
                    outcomes: vec![
                        OutcomePrice {
                            name: home_team,
                            price: home,
                        },
                        OutcomePrice {
                            name: away_team,
                            price: away,
                        },
                    ],
                }],
            }],
        }
    }

    /// `favourites` matches at 1.40 / 3.20 (confidence 99) and `even`
    /// matches at 2.00 / 2.00 (confidence 60)
    fn service_with(favourites: usize, even: usize) -> BettingService {
        let mut matches = Vec::new();
        for i in 0..favourites {
            matches.push(priced_match(&format!("fav{}", i), dec!(1.40), dec!(3.20)));
        }
        for i in 0..even {
            matches.push(priced_match(&format!("even{}", i), dec!(2.00), dec!(2.00)));
        }

        let mut live = MockOddsProvider::new();
        live.expect_name().return_const("mock");
        live.expect_sports()
            .returning(|| Ok(vec![Sport::new("basketball_nba", "NBA")]));
        live.expect_upcoming_odds()
            .returning(move |_, _| Ok(matches.clone()));

        BettingService::new(
            SportsFeed::new(Box::new(live), Vec::new()),
            BettingAnalyzer::default(),
            Duration::from_secs(300),
            3,
            3,
        )
    }

    #[tokio::test]
    async fn test_analyze_sorts_by_confidence() {
        let service = service_with(2, 2);
        let groups = service.upcoming_matches().await;
        let analyses = service.analyze(&groups);

        let confidences: Vec<u8> = analyses.iter().map(|a| a.confidence).collect();
        assert_eq!(confidences, vec![99, 99, 60, 60]);
        assert!(analyses.iter().all(|a| a.value_bet));
    }

    #[tokio::test]
    async fn test_safe_tier_combination() {
        let service = service_with(3, 2);

        match service.tier_combination(Tier::Safe).await {
            ComboOutcome::Ready(combo) => {
                assert_eq!(combo.kind, ComboKind::Tier(Tier::Safe));
                assert_eq!(combo.legs.len(), 3);
                assert!(combo.legs.iter().all(|l| l.confidence == 99));
                assert_eq!(combo.total_odds, dec!(2.74));
            }
            other => panic!("expected a combination, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_moyen_and_high_risk_tiers() {
        let service = service_with(3, 2);

        let ComboOutcome::Ready(moyen) = service.tier_combination(Tier::Moyen).await else {
            panic!("expected a MOYEN combination");
        };
        let confidences: Vec<u8> = moyen.legs.iter().map(|l| l.confidence).collect();
        assert_eq!(confidences, vec![99, 99, 99, 60]);

        let ComboOutcome::Ready(high) = service.tier_combination(Tier::HighRisk).await else {
            panic!("expected a HIGH RISK combination");
        };
        let odds: Vec<Decimal> = high.legs.iter().map(|l| l.odds).collect();
        assert_eq!(odds, vec![dec!(2.00), dec!(2.00), dec!(1.40), dec!(1.40), dec!(1.40)]);
    }

    #[tokio::test]
    async fn test_tier_not_enough_bets() {
        let service = service_with(2, 4);
        assert_eq!(
            service.tier_combination(Tier::Safe).await,
            ComboOutcome::NotEnough {
                found: 2,
                needed: 3
            }
        );
    }

    #[tokio::test]
    async fn test_tier_without_matches() {
        let service = service_with(0, 0);
        assert_eq!(
            service.tier_combination(Tier::Moyen).await,
            ComboOutcome::NoMatches
        );
    }

    #[tokio::test]
    async fn test_classic_combinations() {
        let service = service_with(3, 2);

        let ComboOutcome::Ready(combos) = service.classic_combinations().await else {
            panic!("expected classic combinations");
        };
        let kinds: Vec<ComboKind> = combos.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ComboKind::Sure, ComboKind::Value, ComboKind::Mixed]);
        assert!(combos.iter().all(|c| c.legs.len() == 3));
    }

    #[tokio::test]
    async fn test_cached_matches_reuse_first_fetch() {
        let service = BettingService::new(
            SportsFeed::demo(),
            BettingAnalyzer::default(),
            Duration::from_secs(300),
            3,
            3,
        );

        let first = service.cached_matches().await;
        let second = service.cached_matches().await;
        assert!(!first.is_empty());
        assert_eq!(first, second);
        assert!(service.is_demo());
    }
}
