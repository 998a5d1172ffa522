//! BetIQ sports betting assistant
//!
//! Runs the Telegram bot, or prints sports, matches, analyses and
//! combinés straight to the terminal.

use betiq_bot::{
    analyzer::AnalysisStats,
    config::Config,
    render,
    service::{BettingService, ComboOutcome},
    telegram::BetIqBot,
    types::{Combination, Tier},
};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "betiq-bot")]
#[command(about = "Telegram sports betting assistant: odds, value bets and combinés")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: String,

    /// Use generated demo data instead of the live odds API
    #[arg(short, long, global = true)]
    demo: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot
    Run,
    /// List active sports
    Sports,
    /// List upcoming matches with their best odds
    Matches,
    /// Analyze every upcoming match
    Analyze {
        /// Number of analyses to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Build combinés
    Combos {
        /// Only this tier (safe, moyen, high-risk)
        #[arg(short, long)]
        tier: Option<Tier>,
        /// Classic Sûr / Value / Mixte combinations instead of tiers
        #[arg(long, conflicts_with = "tier")]
        classic: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    let demo = config.demo_mode(cli.demo);

    match cli.command {
        Commands::Run => run_bot(config, demo).await,
        Commands::Sports => show_sports(config, demo).await,
        Commands::Matches => show_matches(config, demo).await,
        Commands::Analyze { limit } => show_analysis(config, demo, limit).await,
        Commands::Combos { tier, classic } => show_combos(config, demo, tier, classic).await,
    }
}

async fn run_bot(config: Config, demo: bool) -> anyhow::Result<()> {
    if demo {
        println!("🎭 BetIQ 2.5 - Démarrage en mode DÉMO");
        println!("📊 Utilisation de données factices pour la démonstration");
        println!("⚠️  Les matchs et cotes affichés ne sont pas réels");
        println!("{}", "-".repeat(50));
    }

    let bot = Arc::new(BetIqBot::from_config(&config, demo).await?);
    tracing::info!("BetIQ started, press Ctrl+C to stop");

    tokio::select! {
        _ = bot.start_polling() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Bot stopped by user");
        }
    }

    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

async fn show_sports(config: Config, demo: bool) -> anyhow::Result<()> {
    let service = BettingService::from_config(&config, demo)?;
    let sports = service.sports().await;

    println!("\n⚽ {} active sports:\n", sports.len());
    println!("{:<40} {:<35}", "Title", "Key");
    println!("{}", "-".repeat(76));

    for sport in &sports {
        println!("{:<40} {:<35}", truncate(&sport.title, 40), sport.key);
    }

    if service.is_demo() {
        println!("\n⚠️  Demo data");
    }
    Ok(())
}

async fn show_matches(config: Config, demo: bool) -> anyhow::Result<()> {
    let service = BettingService::from_config(&config, demo)?;
    let groups = service.upcoming_matches().await;

    if groups.is_empty() {
        println!("No match in the next {} days", service.days_ahead());
        return Ok(());
    }

    for group in &groups {
        println!(
            "\n{} {} ({} matches)",
            render::sport_emoji(&group.sport.key),
            group.sport.title.to_uppercase(),
            group.matches.len()
        );
        println!("{:<45} {:>17} {:>7} {:>7} {:>7}", "Match", "Kick-off (UTC)", "1", "X", "2");
        println!("{}", "-".repeat(87));

        for m in &group.matches {
            let odds = m.best_odds();
            let fmt = |price: Option<rust_decimal::Decimal>| {
                price.map_or_else(|| "-".to_string(), |p| format!("{:.2}", p))
            };
            println!(
                "{:<45} {:>17} {:>7} {:>7} {:>7}",
                truncate(&m.label(), 45),
                m.commence_time.format("%d/%m/%Y %H:%M"),
                fmt(odds.map(|o| o.home)),
                fmt(odds.and_then(|o| o.draw)),
                fmt(odds.and_then(|o| o.away)),
            );
        }
    }
    Ok(())
}

async fn show_analysis(config: Config, demo: bool, limit: usize) -> anyhow::Result<()> {
    let service = BettingService::from_config(&config, demo)?;
    let groups = service.upcoming_matches().await;
    let analyses = service.analyze(&groups);

    if analyses.is_empty() {
        println!("No analysis available");
        return Ok(());
    }

    let stats = AnalysisStats::from_analyses(&analyses);
    println!("\n📊 {} matches analyzed", stats.total);
    println!(
        "   🟢 {} high | 🟡 {} medium | 🔴 {} low confidence | 💎 {} value bets\n",
        stats.high_confidence, stats.medium_confidence, stats.low_confidence, stats.value_bets
    );

    println!(
        "{:<40} {:<30} {:>6} {:>5} {:<7} {:>5}",
        "Match", "Pick", "Odds", "Conf", "Risk", "Value"
    );
    println!("{}", "-".repeat(98));

    for a in analyses.iter().take(limit) {
        println!(
            "{:<40} {:<30} {:>6.2} {:>4}% {:<7} {:>5}",
            truncate(&a.label, 40),
            truncate(&a.pick, 30),
            a.odds,
            a.confidence,
            a.risk_level.to_string(),
            if a.value_bet { "💎" } else { "" }
        );
    }
    Ok(())
}

fn print_combination(combo: &Combination) {
    println!("\n{}", render::combination(combo));
}

async fn show_combos(
    config: Config,
    demo: bool,
    tier: Option<Tier>,
    classic: bool,
) -> anyhow::Result<()> {
    let service = BettingService::from_config(&config, demo)?;

    if classic {
        match service.classic_combinations().await {
            ComboOutcome::Ready(combos) => combos.iter().for_each(print_combination),
            ComboOutcome::NoMatches => println!("No match available"),
            ComboOutcome::NotEnough { found, needed } => {
                println!("Not enough reliable bets ({} found, {} needed)", found, needed)
            }
        }
        return Ok(());
    }

    let tiers = match tier {
        Some(tier) => vec![tier],
        None => Tier::ALL.to_vec(),
    };

    for tier in tiers {
        println!("\n{} {} - {}", tier.emoji(), tier.title(), tier.description());
        match service.tier_combination(tier).await {
            ComboOutcome::Ready(combo) => print_combination(&combo),
            ComboOutcome::NoMatches => println!("No match available"),
            ComboOutcome::NotEnough { found, needed } => {
                println!("Not enough bets ({} found, {} needed)", found, needed)
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_after_subcommand() {
        let cli = Cli::try_parse_from(["betiq-bot", "run", "--config", "prod.toml"]).unwrap();
        assert_eq!(cli.config, "prod.toml");
        assert!(matches!(cli.command, Commands::Run));

        let cli = Cli::try_parse_from(["betiq-bot", "combos", "-c", "x.toml", "--demo"]).unwrap();
        assert_eq!(cli.config, "x.toml");
        assert!(cli.demo);
    }

    #[test]
    fn test_config_before_subcommand_and_default() {
        let cli = Cli::try_parse_from(["betiq-bot", "--config", "a.toml", "sports"]).unwrap();
        assert_eq!(cli.config, "a.toml");

        let cli = Cli::try_parse_from(["betiq-bot", "analyze"]).unwrap();
        assert_eq!(cli.config, "config.toml");
        assert!(matches!(cli.command, Commands::Analyze { limit: 20 }));
    }

    #[test]
    fn test_classic_conflicts_with_tier() {
        assert!(Cli::try_parse_from(["betiq-bot", "combos", "--classic", "--tier", "safe"]).is_err());
    }
}
