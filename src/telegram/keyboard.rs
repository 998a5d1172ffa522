//! Inline keyboards and their callback actions

use crate::types::Tier;
use serde::Serialize;

/// Action behind an inline button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Matches,
    Analysis,
    Combos,
    Sports,
    Help,
    AnalyzeAll,
    Tier(Tier),
    /// All three tiers in a row
    AllCombos,
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        let action = match data {
            "cmd_matches" => CallbackAction::Matches,
            "cmd_analysis" => CallbackAction::Analysis,
            "cmd_combos" => CallbackAction::Combos,
            "cmd_sports" => CallbackAction::Sports,
            "cmd_help" => CallbackAction::Help,
            "analyze_all" => CallbackAction::AnalyzeAll,
            "generate_safe" => CallbackAction::Tier(Tier::Safe),
            "generate_medium" => CallbackAction::Tier(Tier::Moyen),
            "generate_high_risk" => CallbackAction::Tier(Tier::HighRisk),
            "generate_combos" => CallbackAction::AllCombos,
            _ => return None,
        };
        Some(action)
    }

    pub fn as_data(self) -> &'static str {
        match self {
            CallbackAction::Matches => "cmd_matches",
            CallbackAction::Analysis => "cmd_analysis",
            CallbackAction::Combos => "cmd_combos",
            CallbackAction::Sports => "cmd_sports",
            CallbackAction::Help => "cmd_help",
            CallbackAction::AnalyzeAll => "analyze_all",
            CallbackAction::Tier(Tier::Safe) => "generate_safe",
            CallbackAction::Tier(Tier::Moyen) => "generate_medium",
            CallbackAction::Tier(Tier::HighRisk) => "generate_high_risk",
            CallbackAction::AllCombos => "generate_combos",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: &str, action: CallbackAction) -> Self {
        Self {
            text: text.to_string(),
            callback_data: action.as_data().to_string(),
        }
    }
}

/// `reply_markup` payload: rows of buttons
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    /// One button per row
    pub fn column(buttons: &[(&str, CallbackAction)]) -> Self {
        Self {
            inline_keyboard: buttons
                .iter()
                .map(|(text, action)| vec![InlineButton::new(text, *action)])
                .collect(),
        }
    }

    /// Main menu under the welcome message
    pub fn start() -> Self {
        Self::column(&[
            ("🔍 Voir tous les matchs", CallbackAction::Matches),
            ("📊 Analyse complète", CallbackAction::Analysis),
            ("🎲 Générer des combinés", CallbackAction::Combos),
            ("⚽ Sports disponibles", CallbackAction::Sports),
            ("❓ Aide détaillée", CallbackAction::Help),
        ])
    }

    /// Follow-ups under the matches overview
    pub fn matches() -> Self {
        Self::column(&[
            ("🧠 Analyser TOUS les matchs", CallbackAction::AnalyzeAll),
            ("🎲 Générer combinés SAFE", CallbackAction::Tier(Tier::Safe)),
            ("⚖️ Générer combinés MOYEN", CallbackAction::Tier(Tier::Moyen)),
            ("🚀 Générer combinés HIGH RISK", CallbackAction::Tier(Tier::HighRisk)),
        ])
    }

    pub fn analysis_done() -> Self {
        Self::column(&[("🎲 Générer des combinés", CallbackAction::AllCombos)])
    }
}
