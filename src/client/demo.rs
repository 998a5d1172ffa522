//! Demo mode fixtures
//!
//! Generates plausible fake matches and bookmaker odds so the bot can be
//! used without an odds API key, or when the live API is unavailable.

use crate::types::{Bookmaker, BookmakerMarket, Match, OutcomePrice, Sport, DRAW_OUTCOME, H2H_MARKET};
use chrono::{DateTime, Duration, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use rust_decimal::Decimal;

pub const DEMO_SPORTS: &[(&str, &str)] = &[
    ("soccer_epl", "Premier League"),
    ("soccer_spain_la_liga", "La Liga"),
    ("soccer_champions_league", "Champions League"),
    ("americanfootball_nfl", "NFL"),
    ("basketball_nba", "NBA"),
    ("tennis_atp", "ATP Tennis"),
    ("baseball_mlb", "MLB"),
    ("icehockey_nhl", "NHL"),
];

pub const DEMO_BOOKMAKERS: &[&str] = &["Bet365", "William Hill", "Betfair", "Unibet", "888sport"];

const BOOKMAKERS_PER_MATCH: usize = 3;

const GENERIC_ROSTER: &[&str] = &["Équipe A", "Équipe B", "Équipe C", "Équipe D"];

fn roster(sport_key: &str) -> &'static [&'static str] {
    match sport_key {
        "soccer_epl" => &[
            "Manchester United", "Liverpool", "Manchester City", "Arsenal",
            "Chelsea", "Tottenham", "Newcastle", "Brighton",
        ],
        "soccer_spain_la_liga" => &[
            "Real Madrid", "Barcelona", "Atletico Madrid", "Sevilla",
            "Real Betis", "Villarreal", "Valencia", "Athletic Bilbao",
        ],
        "soccer_champions_league" => &[
            "PSG", "Bayern Munich", "Real Madrid", "Barcelona",
            "Manchester City", "Liverpool", "AC Milan", "Inter Milan",
        ],
        "americanfootball_nfl" => &[
            "Patriots", "Chiefs", "Cowboys", "Packers", "49ers", "Bills", "Dolphins", "Ravens",
        ],
        "basketball_nba" => &[
            "Lakers", "Warriors", "Celtics", "Heat", "Bucks", "Nuggets", "Suns", "Nets",
        ],
        "tennis_atp" => &[
            "Novak Djokovic", "Carlos Alcaraz", "Daniil Medvedev",
            "Jannik Sinner", "Andrey Rublev", "Stefanos Tsitsipas",
        ],
        "baseball_mlb" => &[
            "Yankees", "Dodgers", "Red Sox", "Giants", "Mets", "Phillies", "Braves", "Astros",
        ],
        "icehockey_nhl" => &[
            "Rangers", "Bruins", "Lightning", "Avalanche",
            "Golden Knights", "Oilers", "Panthers", "Maple Leafs",
        ],
        _ => GENERIC_ROSTER,
    }
}

/// Demo sports catalogue, all active
pub fn sports() -> Vec<Sport> {
    DEMO_SPORTS
        .iter()
        .map(|(key, title)| Sport::new(key, title))
        .collect()
}

/// Sports with a draw outcome
fn has_draw(sport_key: &str) -> bool {
    sport_key.contains("soccer") || sport_key.contains("football")
}

fn price(odds: f64) -> Decimal {
    Decimal::try_from(odds).unwrap_or(Decimal::ZERO).round_dp(2)
}

/// 3 to 6 matches for a sport, kicking off within the next few days
pub fn generate_matches<R: Rng + ?Sized>(rng: &mut R, sport: &Sport, now: DateTime<Utc>) -> Vec<Match> {
    let teams = roster(&sport.key);
    let count = rng.random_range(3..=6);
    let mut used: Vec<&str> = Vec::new();
    let mut matches = Vec::with_capacity(count);

    for i in 0..count {
        let mut available: Vec<&str> = teams.iter().copied().filter(|t| !used.contains(t)).collect();
        if available.len() < 2 {
            available = teams.to_vec();
            used.clear();
        }

        let home_team = available.swap_remove(rng.random_range(0..available.len()));
        let away_team = available[rng.random_range(0..available.len())];
        used.push(home_team);
        used.push(away_team);

        let commence_time = now
            + Duration::days(rng.random_range(0..=3))
            + Duration::hours(rng.random_range(12..=21))
            + Duration::minutes([0, 15, 30, 45][rng.random_range(0..4)]);

        let margin = rng.random_range(1.05..1.12);
        let home_odds = rng.random_range(1.5..4.0) * margin;
        let away_odds = rng.random_range(1.5..4.0) * margin;
        let draw_odds = if has_draw(&sport.key) {
            Some(rng.random_range(2.8..4.5) * margin)
        } else {
            None
        };

        let names: Vec<&str> = DEMO_BOOKMAKERS
            .choose_multiple(rng, BOOKMAKERS_PER_MATCH)
            .copied()
            .collect();

        let bookmakers = names
            .into_iter()
            .map(|name| {
                let variation = rng.random_range(0.95..1.05);
                let mut outcomes = vec![
                    OutcomePrice {
                        name: home_team.to_string(),
                        price: price(home_odds * variation),
                    },
                    OutcomePrice {
                        name: away_team.to_string(),
                        price: price(away_odds * variation),
                    },
                ];
                if let Some(draw) = draw_odds {
                    outcomes.push(OutcomePrice {
                        name: DRAW_OUTCOME.to_string(),
                        price: price(draw * variation),
                    });
                }

                Bookmaker {
                    key: name.to_lowercase().replace(' ', "_"),
                    title: name.to_string(),
                    markets: vec![BookmakerMarket {
                        key: H2H_MARKET.to_string(),
                        outcomes,
                    }],
                }
            })
            .collect();

        matches.push(Match {
            id: format!("demo_{}_{}_{}", sport.key, i, commence_time.timestamp()),
            sport_key: sport.key.clone(),
            sport_title: sport.title.clone(),
            commence_time,
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            bookmakers,
        });
    }

    matches
}
