//! Core types: odds records, analyses, risk tiers and combinations

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market key for head-to-head (1X2) odds
pub const H2H_MARKET: &str = "h2h";

/// Outcome name used by bookmakers for a draw
pub const DRAW_OUTCOME: &str = "Draw";

/// A sport / league as listed by the odds provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sport {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub active: bool,
}

impl Sport {
    pub fn new(key: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            group: None,
            description: None,
            active: true,
        }
    }
}

/// A single priced outcome inside a bookmaker market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomePrice {
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmakerMarket {
    pub key: String,
    #[serde(default)]
    pub outcomes: Vec<OutcomePrice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmaker {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub markets: Vec<BookmakerMarket>,
}

/// An upcoming match with the bookmaker odds quoted for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub sport_key: String,
    pub sport_title: String,
    pub commence_time: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub bookmakers: Vec<Bookmaker>,
}

impl Match {
    pub fn label(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }

    /// Best price per selection across every bookmaker's h2h market.
    /// `None` when nobody quotes the home side.
    pub fn best_odds(&self) -> Option<BestOdds> {
        let mut home: Option<Decimal> = None;
        let mut away: Option<Decimal> = None;
        let mut draw: Option<Decimal> = None;

        let outcomes = self
            .bookmakers
            .iter()
            .flat_map(|b| b.markets.iter())
            .filter(|m| m.key == H2H_MARKET)
            .flat_map(|m| m.outcomes.iter());

        for outcome in outcomes {
            let slot = if outcome.name == self.home_team {
                &mut home
            } else if outcome.name == self.away_team {
                &mut away
            } else if outcome.name == DRAW_OUTCOME {
                &mut draw
            } else {
                continue;
            };
            if outcome.price > Decimal::ZERO {
                *slot = Some(slot.map_or(outcome.price, |best| best.max(outcome.price)));
            }
        }

        Some(BestOdds {
            home: home?,
            away,
            draw,
        })
    }
}

/// Matches of one sport, in provider order
#[derive(Debug, Clone, PartialEq)]
pub struct SportMatches {
    pub sport: Sport,
    pub matches: Vec<Match>,
}

/// Which side of a 1X2 market a bet is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    Home,
    Away,
    Draw,
}

/// Best available decimal odds for a match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestOdds {
    pub home: Decimal,
    pub away: Option<Decimal>,
    pub draw: Option<Decimal>,
}

impl BestOdds {
    pub fn get(&self, selection: Selection) -> Option<Decimal> {
        match selection {
            Selection::Home => Some(self.home),
            Selection::Away => self.away,
            Selection::Draw => self.draw,
        }
    }

    /// Priced selections, home first, then away, then draw
    pub fn priced(&self) -> impl Iterator<Item = (Selection, Decimal)> + '_ {
        [Selection::Home, Selection::Away, Selection::Draw]
            .into_iter()
            .filter_map(move |s| self.get(s).filter(|o| *o > Decimal::ZERO).map(|o| (s, o)))
    }
}

/// Implied probabilities with the bookmaker margin removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub home: Option<Decimal>,
    pub away: Option<Decimal>,
    pub draw: Option<Decimal>,
}

impl Probabilities {
    pub fn get(&self, selection: Selection) -> Option<Decimal> {
        match selection {
            Selection::Home => self.home,
            Selection::Away => self.away,
            Selection::Draw => self.draw,
        }
    }

    pub fn set(&mut self, selection: Selection, value: Decimal) {
        match selection {
            Selection::Home => self.home = Some(value),
            Selection::Away => self.away = Some(value),
            Selection::Draw => self.draw = Some(value),
        }
    }
}

/// Risk of a single bet, from its odds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_odds(odds: Decimal) -> Self {
        if odds < dec!(2.0) {
            RiskLevel::Low
        } else if odds < dec!(3.5) {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Faible"),
            RiskLevel::Medium => write!(f, "Moyen"),
            RiskLevel::High => write!(f, "Élevé"),
        }
    }
}

/// Risk tier of a combination, driven by confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Safe,
    Moyen,
    HighRisk,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Safe, Tier::Moyen, Tier::HighRisk];

    /// Tier for a confidence percentage. Lower bounds are inclusive;
    /// anything under 45 is not suggested at all.
    pub fn from_confidence(confidence: u8) -> Option<Tier> {
        match confidence {
            75.. => Some(Tier::Safe),
            60..=74 => Some(Tier::Moyen),
            45..=59 => Some(Tier::HighRisk),
            _ => None,
        }
    }

    /// Same rule for a fractional score in [0, 1]
    pub fn from_score(score: Decimal) -> Option<Tier> {
        let pct = (score * Decimal::ONE_HUNDRED)
            .floor()
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        pct.to_u8().and_then(Tier::from_confidence)
    }

    pub fn min_confidence(self) -> u8 {
        match self {
            Tier::Safe => 75,
            Tier::Moyen => 60,
            Tier::HighRisk => 45,
        }
    }

    /// Number of legs in the tier's combination
    pub fn legs(self) -> usize {
        match self {
            Tier::Safe => 3,
            Tier::Moyen => 4,
            Tier::HighRisk => 5,
        }
    }

    /// Bets priced above this are left out before building the combination
    pub fn max_odds(self) -> Decimal {
        match self {
            Tier::Safe => dec!(2.5),
            Tier::Moyen => dec!(4.0),
            Tier::HighRisk => dec!(10.0),
        }
    }

    /// HIGH RISK favours the biggest odds, the others the highest confidence
    pub fn sorts_by_odds(self) -> bool {
        matches!(self, Tier::HighRisk)
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Safe => "SAFE",
            Tier::Moyen => "MOYEN",
            Tier::HighRisk => "HIGH RISK",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Tier::Safe => "🛡️",
            Tier::Moyen => "⚖️",
            Tier::HighRisk => "🚀",
        }
    }

    /// Long name shown in headers
    pub fn title(self) -> &'static str {
        match self {
            Tier::HighRisk => "HIGH RISK / HIGH REWARD",
            other => other.label(),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tier::Safe => "Combinés sûrs - Petites cotes, très forte probabilité",
            Tier::Moyen => "Combinés équilibrés - Cotes moyennes, bon potentiel",
            Tier::HighRisk => "Combinés risqués - Grosses cotes, gros potentiel",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "safe" => Ok(Tier::Safe),
            "moyen" | "medium" => Ok(Tier::Moyen),
            "high_risk" | "high" => Ok(Tier::HighRisk),
            other => Err(format!("unknown tier '{}' (safe, moyen, high-risk)", other)),
        }
    }
}

/// Scoring result for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAnalysis {
    pub match_id: String,
    pub label: String,
    pub sport_title: String,
    pub commence_time: DateTime<Utc>,
    pub selection: Selection,
    /// "Victoire <team>" or "Match nul"
    pub pick: String,
    pub odds: Decimal,
    pub probability: Decimal,
    pub value_score: Decimal,
    /// 0-100
    pub confidence: u8,
    pub value_bet: bool,
    pub risk_level: RiskLevel,
    pub best_odds: BestOdds,
    pub probabilities: Probabilities,
}

impl MatchAnalysis {
    pub fn recommendation(&self) -> String {
        format!("{} (cote: {:.2})", self.pick, self.odds)
    }

    pub fn tier(&self) -> Option<Tier> {
        Tier::from_confidence(self.confidence)
    }
}

/// Kind of combination offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComboKind {
    /// Highest confidence bets
    Sure,
    /// Value bets only
    Value,
    /// Random draw among eligible bets
    Mixed,
    Tier(Tier),
}

impl fmt::Display for ComboKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComboKind::Sure => write!(f, "Combiné Sûr"),
            ComboKind::Value => write!(f, "Combiné Value"),
            ComboKind::Mixed => write!(f, "Combiné Mixte"),
            ComboKind::Tier(tier) => write!(f, "Combiné {} {}", tier.label(), tier.emoji()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboLeg {
    pub label: String,
    pub bet: String,
    pub odds: Decimal,
    pub confidence: u8,
}

/// A parlay: every leg must win
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combination {
    pub kind: ComboKind,
    pub legs: Vec<ComboLeg>,
    /// Product of the leg odds, 2dp
    pub total_odds: Decimal,
    /// Mean leg confidence, rounded half to even
    pub avg_confidence: u8,
}

impl Combination {
    pub fn build(kind: ComboKind, bets: &[&MatchAnalysis]) -> Self {
        let legs: Vec<ComboLeg> = bets
            .iter()
            .map(|a| ComboLeg {
                label: a.label.clone(),
                bet: a.recommendation(),
                odds: a.odds,
                confidence: a.confidence,
            })
            .collect();

        let total_odds = odds_product(&legs).round_dp(2);

        let avg_confidence = if legs.is_empty() {
            0
        } else {
            let sum: u32 = legs.iter().map(|l| u32::from(l.confidence)).sum();
            (Decimal::from(sum) / Decimal::from(legs.len()))
                .round()
                .to_u8()
                .unwrap_or(0)
        };

        Self {
            kind,
            legs,
            total_odds,
            avg_confidence,
        }
    }

    /// Payout if every leg wins, 2dp. Uses the exact leg product, not
    /// the rounded `total_odds`.
    pub fn potential_return(&self, stake: Decimal) -> Decimal {
        (odds_product(&self.legs) * stake).round_dp(2)
    }
}

fn odds_product(legs: &[ComboLeg]) -> Decimal {
    legs.iter().fold(Decimal::ONE, |acc, leg| acc * leg.odds)
}
