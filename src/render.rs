//! Chat messages
//!
//! Every text the bot sends, formatted for Telegram's HTML parse mode.
//! Team, sport and user names go through `escape_html`.

use crate::analyzer::AnalysisStats;
use crate::types::{Combination, Match, MatchAnalysis, Sport, SportMatches, Tier};
use chrono::{DateTime, Duration, Utc};
use rust_decimal_macros::dec;

/// Telegram rejects messages longer than this
pub const MESSAGE_LIMIT: usize = 4096;

/// Analyses per chat message
pub const ANALYSES_PER_MESSAGE: usize = 10;

const SPORTS_SHOWN: usize = 15;

const LOGO: &str = "\
╔══════════════════════════════════╗
║         🎯 BetIQ 2.5 🎯          ║
║    ┌─────────────────────────┐   ║
║    │  📊 AI BETTING BOT 🤖  │   ║
║    └─────────────────────────┘   ║
║  💎 Intelligence • Analytics 📈  ║
╚══════════════════════════════════╝";

pub const FETCHING_SPORTS: &str = "🔍 Récupération des sports disponibles...";
pub const NO_SPORTS: &str = "❌ Aucun sport disponible actuellement.";
pub const ANALYSIS_RUNNING: &str = "🧠 Analyse en cours...";
pub const NO_MATCHES_TO_ANALYZE: &str = "❌ Aucun match à analyser.";
pub const NO_ANALYSIS: &str = "❌ Aucune analyse disponible.";
pub const ALL_COMBOS_RUNNING: &str = "🎲 Génération de TOUS les types de combinés...";
pub const NO_MATCHES_FOR_COMBOS: &str = "❌ Aucun match disponible pour les combinés.";

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn welcome(first_name: &str, demo: bool) -> String {
    let mut text = format!(
        "<pre>{}</pre>\n\n\
        🎯 <b>BetIQ 2.5</b> 🎯\n\n\
        Bienvenue {} ! Votre assistant intelligent pour les paris sportifs.\n\n\
        <b>🚀 Fonctionnalités :</b>\n\
        • 🔍 Recherche automatique sur tous les sports\n\
        • 📊 Cotes en temps réel et analyses IA\n\
        • 🧠 Analyses automatiques avancées\n\
        • 🎲 Génération de combinés intelligents\n\
        • 💎 Détection des value bets\n\
        • 📈 Statistiques et recommandations\n\n\
        <b>Cliquez sur un bouton ci-dessous pour commencer :</b>",
        LOGO,
        escape_html(first_name)
    );

    if demo {
        text.push_str("\n\n⚠️ <b>Mode Démo</b> : Utilisation de données factices pour démonstration");
    }
    text
}

pub fn help() -> &'static str {
    "📖 <b>Aide détaillée - BetIQ 2.5</b>

<b>Commandes principales :</b>
• /start - Message d'accueil avec logo
• /matches - Liste tous les matchs à venir sur tous les sports
• /analysis - Analyse détaillée des meilleurs matchs
• /combos - Génère 3 types de combinés automatiquement
• /sports - Affiche tous les sports suivis

<b>Comment ça marche :</b>
1. BetIQ 2.5 cherche automatiquement les matchs de J+0 à J+3
2. Il analyse les cotes de tous les bookmakers avec IA
3. Il propose des recommandations basées sur les probabilités
4. Il génère des combinés optimisés par niveau de risque

<b>Types de combinés :</b>
🛡️ <b>SAFE</b> - Paris avec la plus haute confiance (≥75%)
⚖️ <b>MOYEN</b> - Paris équilibrés risque/rendement (≥60%)
🚀 <b>HIGH RISK</b> - Paris à fort potentiel (≥45%)

<b>Value Bets :</b> Paris où les cotes semblent sous-évaluées par les bookmakers."
}

/// Reply to free text from a known user
pub fn suggestion() -> &'static str {
    "❓ Je ne comprends pas ce message. Voici ce que je peux faire :

🔍 /matches - Voir tous les matchs à venir
📊 /analysis - Analyse complète des matchs
🎲 /combos - Générer des combinés
⚽ /sports - Sports disponibles
❓ /help - Aide détaillée

Tapez une commande pour commencer !"
}

pub fn sports_list(sports: &[Sport], demo: bool) -> String {
    let mut text = String::from("⚽ <b>Sports disponibles :</b>\n\n");
    for sport in sports.iter().take(SPORTS_SHOWN) {
        text.push_str(&format!(
            "• {} (<code>{}</code>)\n",
            escape_html(&sport.title),
            escape_html(&sport.key)
        ));
    }

    if sports.len() > SPORTS_SHOWN {
        text.push_str(&format!("\n... et {} autres sports", sports.len() - SPORTS_SHOWN));
    }
    if demo {
        text.push_str("\n\n⚠️ <b>Mode Démo</b> : Sports de démonstration");
    }
    text
}

pub fn sport_emoji(sport_key: &str) -> &'static str {
    const EMOJIS: &[(&str, &str)] = &[
        ("soccer", "⚽"),
        ("americanfootball", "🏈"),
        ("basketball", "🏀"),
        ("baseball", "⚾"),
        ("icehockey", "🏒"),
        ("tennis", "🎾"),
        ("golf", "⛳"),
        ("boxing", "🥊"),
    ];

    let key = sport_key.to_lowercase();
    EMOJIS
        .iter()
        .find(|(name, _)| key.contains(name))
        .map_or("🏆", |(_, emoji)| *emoji)
}

pub fn searching_matches(days_ahead: u32) -> String {
    format!(
        "🔍 Recherche de tous les matchs disponibles (J+0 à J+{})...",
        days_ahead
    )
}

pub fn no_matches(days_ahead: u32) -> String {
    format!("❌ Aucun match trouvé pour les {} prochains jours.", days_ahead)
}

/// One match: teams, kick-off (UTC) and best odds
pub fn match_info(m: &Match) -> String {
    let home = escape_html(&m.home_team);
    let away = escape_html(&m.away_team);

    let mut text = format!(
        "🆚 {} vs {}\n🕒 {}\n",
        home,
        away,
        m.commence_time.format("%d/%m/%Y %H:%M")
    );

    if let Some(best) = m.best_odds() {
        let mut parts = vec![format!("{} {:.2}", home, best.home)];
        if let Some(draw) = best.draw {
            parts.push(format!("Match nul {:.2}", draw));
        }
        if let Some(away_odds) = best.away {
            parts.push(format!("{} {:.2}", away, away_odds));
        }
        text.push_str(&format!("📊 Cotes: {}\n", parts.join(" | ")));
    }
    text
}

pub fn matches_overview(
    groups: &[SportMatches],
    now: DateTime<Utc>,
    days_ahead: u32,
    demo: bool,
) -> String {
    let total: usize = groups.iter().map(|g| g.matches.len()).sum();
    let end = now + Duration::days(i64::from(days_ahead));

    let mut text = format!(
        "📅 <b>MATCHS DISPONIBLES - {} matchs trouvés</b>\n\
        🗓️ Période : J+0 à J+{} (du {} au {})\n\
        🏆 Sports couverts : {}\n",
        total,
        days_ahead,
        now.format("%d/%m"),
        end.format("%d/%m"),
        groups.len()
    );

    if demo {
        text.push_str("⚠️ <b>Mode Démo</b> : Données factices pour démonstration\n");
    }
    text.push_str(&format!("\n{}\n\n", "=".repeat(40)));

    for group in groups {
        text.push_str(&format!(
            "{} <b>{}</b> ({} matchs)\n{}\n",
            sport_emoji(&group.sport.key),
            escape_html(&group.sport.title.to_uppercase()),
            group.matches.len(),
            "─".repeat(25)
        ));

        for (i, m) in group.matches.iter().enumerate() {
            text.push_str(&format!("{}. {}\n", i + 1, match_info(m)));
        }
        text.push('\n');
    }
    text
}

pub fn analysis_stats(stats: &AnalysisStats) -> String {
    format!(
        "📊 <b>ANALYSE COMPLÈTE DE {} MATCHS</b>\n\n\
        📈 <b>STATISTIQUES GLOBALES :</b>\n\
        • 🟢 {} paris haute confiance (≥70%)\n\
        • 🟡 {} paris moyenne confiance (50-69%)\n\
        • 🔴 {} paris faible confiance (&lt;50%)\n\
        • 💎 {} value bets détectées\n",
        stats.total,
        stats.high_confidence,
        stats.medium_confidence,
        stats.low_confidence,
        stats.value_bets
    )
}

fn confidence_emoji(confidence: u8) -> &'static str {
    match confidence {
        70.. => "🟢",
        50..=69 => "🟡",
        _ => "🔴",
    }
}

/// Analyses split in numbered messages of `ANALYSES_PER_MESSAGE`
pub fn analysis_chunks(analyses: &[MatchAnalysis]) -> Vec<String> {
    let total = analyses.len();

    analyses
        .chunks(ANALYSES_PER_MESSAGE)
        .enumerate()
        .map(|(n, chunk)| {
            let start = n * ANALYSES_PER_MESSAGE;
            let mut text = format!(
                "📋 <b>ANALYSES {}-{} sur {} :</b>\n\n",
                start + 1,
                start + chunk.len(),
                total
            );

            for (i, a) in chunk.iter().enumerate() {
                text.push_str(&format!(
                    "{}. {} {}\n   ➤ {}\n   📈 Confiance: {}% {}\n\n",
                    start + i + 1,
                    confidence_emoji(a.confidence),
                    escape_html(&a.label),
                    escape_html(&a.recommendation()),
                    a.confidence,
                    if a.value_bet { "💎" } else { "" }
                ));
            }
            text
        })
        .collect()
}

pub fn analysis_done(stats: &AnalysisStats) -> String {
    format!(
        "✅ <b>ANALYSE TERMINÉE !</b>\n\n\
        📊 {} matchs analysés au total\n\
        🏆 {} paris haute confiance disponibles\n\
        💎 {} value bets détectées\n\n\
        Vous pouvez maintenant générer des combinés :",
        stats.total, stats.high_confidence, stats.value_bets
    )
}

/// Combination body with a 10 € stake example
pub fn combination(combo: &Combination) -> String {
    let mut text = format!(
        "🎯 {}\n\
        📈 Cote totale: {}\n\
        🎲 Confiance moyenne: {}%\n\
        💰 Pour 10€ → {}€\n\n\
        📋 Détail des paris:\n",
        combo.kind,
        combo.total_odds.normalize(),
        combo.avg_confidence,
        combo.potential_return(dec!(10)).normalize()
    );

    for (i, leg) in combo.legs.iter().enumerate() {
        text.push_str(&format!(
            "{}. {}\n   ➤ {} (confiance: {}%)\n",
            i + 1,
            escape_html(&leg.label),
            escape_html(&leg.bet),
            leg.confidence
        ));
    }
    text
}

pub fn tier_generating(tier: Tier) -> String {
    format!("{} Génération de combinés {}...", tier.emoji(), tier.title())
}

pub fn tier_not_enough(tier: Tier, found: usize, needed: usize) -> String {
    format!(
        "❌ Pas assez de paris {} fiables (minimum {} requis, {} trouvés).",
        tier.title(),
        needed,
        found
    )
}

pub fn tier_combination(tier: Tier, combo: &Combination) -> String {
    format!(
        "{} <b>COMBINÉ {}</b>\n\n📋 {}\n\n{}",
        tier.emoji(),
        tier.title(),
        tier.description(),
        combination(combo)
    )
}

pub fn tier_advice(tier: Tier) -> &'static str {
    match tier {
        Tier::Safe => {
            "💡 <b>Conseil SAFE :</b> Combiné à faible risque, idéal pour préserver votre bankroll."
        }
        Tier::Moyen => {
            "💡 <b>Conseil MOYEN :</b> Bon équilibre risque/rendement, gérez votre mise prudemment."
        }
        Tier::HighRisk => {
            "💡 <b>Conseil HIGH RISK :</b> Mise très réduite recommandée ! Potentiel élevé mais risque maximal."
        }
    }
}

pub fn all_combos_done() -> &'static str {
    "🎯 <b>TOUS LES COMBINÉS GÉNÉRÉS !</b>

💡 <b>Conseils généraux :</b>
• 🛡️ SAFE : Mise standard (ex: 10€)
• ⚖️ MOYEN : Mise réduite (ex: 5€)
• 🚀 HIGH RISK : Mise minimale (ex: 1-2€)

⚠️ <b>Règles d'or :</b>
• Ne jamais miser plus que vous ne pouvez perdre
• Diversifiez vos mises selon les niveaux
• Les cotes peuvent changer rapidement

🔄 Utilisez /matches pour voir les nouveaux matchs"
}

/// Split a message on line boundaries so every part fits in `limit`
/// characters. A single line longer than `limit` is cut as is.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if limit == 0 || text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        let needed = if current.is_empty() {
            line_len
        } else {
            current_len + 1 + line_len
        };

        if needed <= limit {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            current_len = needed;
            continue;
        }

        if !current.is_empty() {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= limit {
            current.push_str(line);
            current_len = line_len;
        } else {
            let chars: Vec<char> = line.chars().collect();
            parts.extend(chars.chunks(limit).map(|c| c.iter().collect::<String>()));
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
