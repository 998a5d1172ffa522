//! Bet scoring and combination building
//!
//! For each match the analyzer picks the best selection from the best
//! available odds, flags value bets, and scores a 0-100 confidence.
//! Analyses are then grouped into combinations, either the classic
//! Sûr / Value / Mixte trio or one combination per risk tier.


use crate::config::AnalyzerConfig;
use crate::types::{
    BestOdds, ComboKind, Combination, Match, MatchAnalysis, Probabilities, RiskLevel, Selection,
    Tier,
};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

/// A tier combination needs at least this many candidate bets
pub const MIN_TIER_BETS: usize = 3;

/// Candidate bet on one selection of a match
#[derive(Debug, Clone, Copy)]
struct Pick {
    selection: Selection,
    odds: Decimal,
    probability: Decimal,
    value_score: Decimal,
}

/// Confidence buckets used in the analysis summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    pub total: usize,
    /// confidence >= 70
    pub high_confidence: usize,
    /// 50 <= confidence < 70
    pub medium_confidence: usize,
    /// confidence < 50
    pub low_confidence: usize,
    pub value_bets: usize,
}

impl AnalysisStats {
    pub fn from_analyses(analyses: &[MatchAnalysis]) -> Self {
        let mut stats = Self {
            total: analyses.len(),
            ..Default::default()
        };
        for a in analyses {
            match a.confidence {
                70.. => stats.high_confidence += 1,
                50..=69 => stats.medium_confidence += 1,
                _ => stats.low_confidence += 1,
            }
            if a.value_bet {
                stats.value_bets += 1;
            }
        }
        stats
    }
}

/// Sports betting analyzer and combination generator
#[derive(Debug, Clone)]
pub struct BettingAnalyzer {
    min_odds: Decimal,
    max_odds: Decimal,
    min_confidence: u8,
}

impl Default for BettingAnalyzer {
    fn default() -> Self {
        Self::new(dec!(1.5), dec!(5.0))
    }
}

impl BettingAnalyzer {
    pub fn new(min_odds: Decimal, max_odds: Decimal) -> Self {
        Self {
            min_odds,
            max_odds,
            min_confidence: 50,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            min_odds: config.min_odds,
            max_odds: config.max_odds,
            min_confidence: config.min_confidence,
        }
    }

    pub fn min_confidence(&self) -> u8 {
        self.min_confidence
    }

    /// Score one match. `None` when there is no usable home price.
    pub fn analyze_match(&self, m: &Match) -> Option<MatchAnalysis> {
        let Some(best_odds) = m.best_odds() else {
            debug!("No odds available for {}", m.label());
            return None;
        };

        let probabilities = Self::probabilities(&best_odds);
        let pick = Self::best_pick(&best_odds, &probabilities)?;
        let value_bet = self.is_value_bet(&best_odds, &probabilities);
        let confidence = Self::confidence(&pick, value_bet);

        let pick_label = match pick.selection {
            Selection::Home => format!("Victoire {}", m.home_team),
            Selection::Away => format!("Victoire {}", m.away_team),
            Selection::Draw => "Match nul".to_string(),
        };

        Some(MatchAnalysis {
            match_id: m.id.clone(),
            label: m.label(),
            sport_title: m.sport_title.clone(),
            commence_time: m.commence_time,
            selection: pick.selection,
            pick: pick_label,
            odds: pick.odds,
            probability: pick.probability,
            value_score: pick.value_score,
            confidence,
            value_bet,
            risk_level: RiskLevel::from_odds(pick.odds),
            best_odds,
            probabilities,
        })
    }

    /// Implied probabilities (1/odds), normalised to remove the bookmaker margin
    pub fn probabilities(odds: &BestOdds) -> Probabilities {
        let mut probs = Probabilities::default();
        let mut total = Decimal::ZERO;

        for (selection, price) in odds.priced() {
            let raw = Decimal::ONE / price;
            probs.set(selection, raw);
            total += raw;
        }

        if total > Decimal::ZERO {
            for (selection, _) in odds.priced() {
                if let Some(raw) = probs.get(selection) {
                    probs.set(selection, raw / total);
                }
            }
        }

        probs
    }

    /// Weighted 60% probability, 40% positive value score; first wins on ties
    fn best_pick(odds: &BestOdds, probs: &Probabilities) -> Option<Pick> {
        let mut best: Option<(Decimal, Pick)> = None;

        for (selection, price) in odds.priced() {
            let probability = probs.get(selection).unwrap_or(Decimal::ZERO);
            let value_score = probability * price - Decimal::ONE;
            let combined = probability * dec!(0.6) + value_score.max(Decimal::ZERO) * dec!(0.4);
            let pick = Pick {
                selection,
                odds: price,
                probability,
                value_score,
            };

            if best.as_ref().map_or(true, |(score, _)| combined > *score) {
                best = Some((combined, pick));
            }
        }

        best.map(|(_, pick)| pick)
    }

    /// Any selection priced inside the odds window with a decent probability
    pub fn is_value_bet(&self, odds: &BestOdds, probs: &Probabilities) -> bool {
        odds.priced().any(|(selection, price)| {
            let threshold = match selection {
                Selection::Draw => dec!(0.25),
                Selection::Home | Selection::Away => dec!(0.30),
            };
            let probability = probs.get(selection).unwrap_or(Decimal::ZERO);
            price >= self.min_odds && price <= self.max_odds && probability > threshold
        })
    }

    fn confidence(pick: &Pick, value_bet: bool) -> u8 {
        let mut confidence = pick.probability * Decimal::ONE_HUNDRED;

        if value_bet {
            confidence += dec!(10);
        }

        // favourites get a bonus, outsiders a malus
        if pick.odds < dec!(1.5) {
            confidence += dec!(20);
        } else if pick.odds > dec!(4.0) {
            confidence -= dec!(15);
        }

        if pick.value_score > dec!(0.1) {
            confidence += dec!(15);
        } else if pick.value_score < dec!(-0.1) {
            confidence -= dec!(10);
        }

        confidence
            .trunc()
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
            .to_u8()
            .unwrap_or(0)
    }

    /// Classic combinations: Sûr (best confidence), Value (value bets only)
    /// and Mixte (random draw). Empty when there are not enough reliable bets.
    pub fn generate_combinations<R: Rng + ?Sized>(
        &self,
        analyses: &[MatchAnalysis],
        combo_size: usize,
        rng: &mut R,
    ) -> Vec<Combination> {
        if combo_size == 0 || analyses.len() < combo_size {
            warn!("Not enough matches for a combination of {}", combo_size);
            return Vec::new();
        }

        let mut good: Vec<&MatchAnalysis> = analyses
            .iter()
            .filter(|a| a.confidence >= self.min_confidence)
            .collect();

        if good.len() < combo_size {
            warn!("Not enough reliable bets for a combination of {}", combo_size);
            return Vec::new();
        }

        let mut combinations = Vec::with_capacity(3);

        let mut safest = good.clone();
        safest.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        safest.truncate(combo_size);
        combinations.push(Combination::build(ComboKind::Sure, &safest));

        let value: Vec<&MatchAnalysis> = good
            .iter()
            .copied()
            .filter(|a| a.value_bet)
            .take(combo_size)
            .collect();
        if value.len() >= combo_size {
            combinations.push(Combination::build(ComboKind::Value, &value));
        }

        good.shuffle(rng);
        good.truncate(combo_size);
        combinations.push(Combination::build(ComboKind::Mixed, &good));

        combinations
    }

    /// One combination for a risk tier. When fewer than three bets reach
    /// the tier's confidence, the best available ones are used instead.
    pub fn generate_tier_combination(
        &self,
        analyses: &[MatchAnalysis],
        tier: Tier,
    ) -> Option<Combination> {
        if analyses.len() < MIN_TIER_BETS {
            warn!("Not enough matches for a {} combination", tier);
            return None;
        }

        let mut selected: Vec<&MatchAnalysis> = analyses
            .iter()
            .filter(|a| a.confidence >= tier.min_confidence())
            .collect();

        if selected.len() < MIN_TIER_BETS {
            selected = analyses.iter().collect();
            selected.sort_by(|a, b| b.confidence.cmp(&a.confidence));
            selected.truncate(tier.legs());
        }

        if tier.sorts_by_odds() {
            selected.sort_by(|a, b| b.odds.cmp(&a.odds));
        } else {
            selected.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        }
        selected.truncate(tier.legs());

        Some(Combination::build(ComboKind::Tier(tier), &selected))
    }
}
