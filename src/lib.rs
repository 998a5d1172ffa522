//! BetIQ sports betting assistant
//!
//! Fetches upcoming matches and bookmaker odds (The Odds API, or generated
//! demo data), scores every match and builds combinés by risk tier, then
//! serves it all through a Telegram bot.
//!
//! ## Architecture
//!
//! ```text
//! The Odds API / demo → SportsFeed → BettingService → render → Telegram
//!                                         ↑
//!                          BettingAnalyzer (value bets, confidence, tiers)
//! ```

pub mod analyzer;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod render;
pub mod service;
pub mod telegram;
pub mod types;
pub mod users;

#[cfg(test)]
mod config_tests;
