//! Telegram bot front end
//!
//! Long-polls the Bot API and answers /start, /help, /sports, /matches,
//! /analysis and /combos plus the inline buttons attached to the replies.

pub mod api;
pub mod keyboard;

pub use api::TelegramApi;
pub use keyboard::{CallbackAction, InlineKeyboard};

use crate::analyzer::AnalysisStats;
use crate::config::Config;
use crate::error::Result;
use crate::render;
use crate::service::{BettingService, ComboOutcome};
use crate::types::Tier;
use crate::users::KnownUsers;
use api::{CallbackQuery, Message, Update};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Pause between analysis chunks
const CHUNK_DELAY: Duration = Duration::from_secs(1);
/// Pause between tier combinations in /combos
const TIER_DELAY: Duration = Duration::from_secs(2);

/// Slash commands understood by the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Sports,
    Matches,
    Analysis,
    Combos,
}

impl Command {
    /// Parse `/cmd`, `/cmd@botname` or `/cmd args`
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.trim().strip_prefix('/')?;
        let word = rest.split_whitespace().next().unwrap_or("");
        let name = word.split('@').next().unwrap_or(word);

        match name.to_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "sports" => Some(Command::Sports),
            "matches" => Some(Command::Matches),
            "analysis" => Some(Command::Analysis),
            "combos" => Some(Command::Combos),
            _ => None,
        }
    }
}

/// Work triggered by a command or a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Welcome,
    Help,
    Sports,
    Matches,
    Analysis,
    Tier(Tier),
    AllCombos,
}

impl From<Command> for Task {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Start => Task::Welcome,
            Command::Help => Task::Help,
            Command::Sports => Task::Sports,
            Command::Matches => Task::Matches,
            Command::Analysis => Task::Analysis,
            Command::Combos => Task::AllCombos,
        }
    }
}

impl From<CallbackAction> for Task {
    fn from(action: CallbackAction) -> Self {
        match action {
            CallbackAction::Matches => Task::Matches,
            CallbackAction::Analysis | CallbackAction::AnalyzeAll => Task::Analysis,
            CallbackAction::Combos | CallbackAction::AllCombos => Task::AllCombos,
            CallbackAction::Sports => Task::Sports,
            CallbackAction::Help => Task::Help,
            CallbackAction::Tier(tier) => Task::Tier(tier),
        }
    }
}

/// How to answer an incoming message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// First contact: welcome only, whatever was sent
    Welcome,
    Run(Task),
    /// Free text from a known user
    Suggest,
    Ignore,
}

pub fn route_message(is_new_user: bool, msg: &Message) -> Route {
    if !msg.is_greetable() {
        return Route::Ignore;
    }
    if is_new_user {
        return Route::Welcome;
    }

    match msg.text.as_deref().map(str::trim) {
        Some(text) if text.starts_with('/') => match Command::parse(text) {
            Some(cmd) => Route::Run(cmd.into()),
            None => Route::Ignore,
        },
        Some(_) => Route::Suggest,
        None => Route::Ignore,
    }
}

pub struct BetIqBot {
    api: TelegramApi,
    service: BettingService,
    users: KnownUsers,
    poll_timeout_secs: u64,
}

impl BetIqBot {
    pub fn new(
        api: TelegramApi,
        service: BettingService,
        users: KnownUsers,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            api,
            service,
            users,
            poll_timeout_secs,
        }
    }

    pub async fn from_config(config: &Config, demo_requested: bool) -> Result<Self> {
        let token = config.require_bot_token()?;
        let api = TelegramApi::new(&config.telegram, token)?;
        let service = BettingService::from_config(config, demo_requested)?;
        let users = KnownUsers::load(config.users_file()).await;
        info!("{} known users loaded", users.len());

        Ok(Self::new(api, service, users, config.telegram.poll_timeout_secs))
    }

    /// Poll for updates forever, one task per update
    pub async fn start_polling(self: Arc<Self>) {
        info!("Starting BetIQ Telegram bot...");
        let mut offset = 0;

        loop {
            match self.api.get_updates(offset, self.poll_timeout_secs).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        let bot = Arc::clone(&self);
                        tokio::spawn(async move {
                            bot.handle_update(update).await;
                        });
                    }
                }
                Err(e) => {
                    error!("Failed to poll Telegram updates: {}", e);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }

            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    }

    async fn handle_update(&self, update: Update) {
        if let Some(query) = update.callback_query {
            self.handle_callback(query).await;
        } else if let Some(msg) = update.message {
            self.handle_message(msg).await;
        }
    }

    async fn handle_message(&self, msg: Message) {
        let chat_id = msg.chat.id;
        let first_name = msg
            .from
            .as_ref()
            .map(|u| u.first_name.clone())
            .unwrap_or_else(|| "Utilisateur".to_string());
        let is_new = msg.from.as_ref().is_some_and(|u| self.users.is_new(u.id));

        match route_message(is_new, &msg) {
            Route::Welcome => {
                if let Some(user) = &msg.from {
                    info!("First contact with user {} ({})", user.id, user.first_name);
                    // a concurrent update from the same user already welcomed them
                    if !self.users.register(user.id).await {
                        return;
                    }
                }
                self.run(chat_id, Task::Welcome, &first_name).await;
            }
            Route::Run(task) => {
                info!("Command {:?} from chat {}", task, chat_id);
                self.run(chat_id, task, &first_name).await;
            }
            Route::Suggest => self.send(chat_id, render::suggestion()).await,
            Route::Ignore => {}
        }
    }

    async fn handle_callback(&self, query: CallbackQuery) {
        if let Err(e) = self.api.answer_callback_query(&query.id).await {
            warn!("Failed to answer callback query: {}", e);
        }

        let Some(chat_id) = query.message.as_ref().map(|m| m.chat.id) else {
            warn!("Callback query {} without a message", query.id);
            return;
        };

        match query.data.as_deref().and_then(CallbackAction::parse) {
            Some(action) => {
                info!("Button {} from chat {}", action.as_data(), chat_id);
                self.run(chat_id, action.into(), &query.from.first_name)
                    .await;
            }
            None => debug!("Ignoring callback data {:?}", query.data),
        }
    }

    async fn run(&self, chat_id: i64, task: Task, first_name: &str) {
        match task {
            Task::Welcome => {
                let text = render::welcome(first_name, self.service.is_demo());
                self.send_with(chat_id, &text, Some(&InlineKeyboard::start()))
                    .await;
            }
            Task::Help => self.send(chat_id, render::help()).await,
            Task::Sports => self.send_sports(chat_id).await,
            Task::Matches => self.send_matches(chat_id).await,
            Task::Analysis => self.send_analysis(chat_id).await,
            Task::Tier(tier) => self.send_tier(chat_id, tier).await,
            Task::AllCombos => self.send_all_combos(chat_id).await,
        }
    }

    async fn send_sports(&self, chat_id: i64) {
        self.send(chat_id, render::FETCHING_SPORTS).await;

        let sports = self.service.sports().await;
        if sports.is_empty() {
            self.send(chat_id, render::NO_SPORTS).await;
            return;
        }

        let text = render::sports_list(&sports, self.service.is_demo());
        self.send(chat_id, &text).await;
    }

    async fn send_matches(&self, chat_id: i64) {
        let days_ahead = self.service.days_ahead();
        self.send(chat_id, &render::searching_matches(days_ahead))
            .await;

        let groups = self.service.upcoming_matches().await;
        if groups.is_empty() {
            self.send(chat_id, &render::no_matches(days_ahead)).await;
            return;
        }

        let text =
            render::matches_overview(&groups, Utc::now(), days_ahead, self.service.is_demo());
        self.send_with(chat_id, &text, Some(&InlineKeyboard::matches()))
            .await;
    }

    async fn send_analysis(&self, chat_id: i64) {
        self.send(chat_id, render::ANALYSIS_RUNNING).await;

        let groups = self.service.cached_matches().await;
        if groups.is_empty() {
            self.send(chat_id, render::NO_MATCHES_TO_ANALYZE).await;
            return;
        }

        let analyses = self.service.analyze(&groups);
        if analyses.is_empty() {
            self.send(chat_id, render::NO_ANALYSIS).await;
            return;
        }

        let stats = AnalysisStats::from_analyses(&analyses);
        self.send(chat_id, &render::analysis_stats(&stats)).await;

        for chunk in render::analysis_chunks(&analyses) {
            self.send(chat_id, &chunk).await;
            tokio::time::sleep(CHUNK_DELAY).await;
        }

        self.send_with(
            chat_id,
            &render::analysis_done(&stats),
            Some(&InlineKeyboard::analysis_done()),
        )
        .await;
    }

    async fn send_tier(&self, chat_id: i64, tier: Tier) {
        self.send(chat_id, &render::tier_generating(tier)).await;

        match self.service.tier_combination(tier).await {
            ComboOutcome::NoMatches => self.send(chat_id, render::NO_MATCHES_FOR_COMBOS).await,
            ComboOutcome::NotEnough { found, needed } => {
                self.send(chat_id, &render::tier_not_enough(tier, found, needed))
                    .await
            }
            ComboOutcome::Ready(combo) => {
                self.send(chat_id, &render::tier_combination(tier, &combo))
                    .await;
                self.send(chat_id, render::tier_advice(tier)).await;
            }
        }
    }

    async fn send_all_combos(&self, chat_id: i64) {
        self.send(chat_id, render::ALL_COMBOS_RUNNING).await;

        for tier in Tier::ALL {
            self.send_tier(chat_id, tier).await;
            tokio::time::sleep(TIER_DELAY).await;
        }

        self.send(chat_id, render::all_combos_done()).await;
    }

    async fn send(&self, chat_id: i64, text: &str) {
        self.send_with(chat_id, text, None).await;
    }

    /// Send `text`, split if needed; the keyboard goes under the last part
    async fn send_with(&self, chat_id: i64, text: &str, keyboard: Option<&InlineKeyboard>) {
        let parts = render::split_message(text, render::MESSAGE_LIMIT);
        let last = parts.len().saturating_sub(1);

        for (i, part) in parts.iter().enumerate() {
            let markup = if i == last { keyboard } else { None };
            if let Err(e) = self.api.send_message(chat_id, part, markup).await {
                error!("Failed to send Telegram message to {}: {}", chat_id, e);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::api::{Chat, User};
    use super::*;

    fn message(text: Option<&str>, photo: bool) -> Message {
        Message {
            message_id: 1,
            from: Some(User {
                id: 42,
                first_name: "Léa".to_string(),
            }),
            chat: Chat { id: 42 },
            text: text.map(str::to_string),
            photo: photo.then(Vec::new),
            voice: None,
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/Matches"), Some(Command::Matches));
        assert_eq!(Command::parse("/combos@BetIQBot"), Some(Command::Combos));
        assert_eq!(Command::parse("  /analysis now  "), Some(Command::Analysis));
        assert_eq!(Command::parse("/status"), None);
        assert_eq!(Command::parse("start"), None);
        assert_eq!(Command::parse("/"), None);
    }

    #[test]
    fn test_new_user_always_gets_welcome() {
        assert_eq!(route_message(true, &message(Some("salut"), false)), Route::Welcome);
        assert_eq!(route_message(true, &message(Some("/combos"), false)), Route::Welcome);
        assert_eq!(route_message(true, &message(None, true)), Route::Welcome);
    }

    #[test]
    fn test_known_user_routing() {
        assert_eq!(
            route_message(false, &message(Some("/combos"), false)),
            Route::Run(Task::AllCombos)
        );
        assert_eq!(
            route_message(false, &message(Some("/start"), false)),
            Route::Run(Task::Welcome)
        );
        assert_eq!(route_message(false, &message(Some("salut"), false)), Route::Suggest);
        assert_eq!(route_message(false, &message(Some("/unknown"), false)), Route::Ignore);
        assert_eq!(route_message(false, &message(None, true)), Route::Ignore);
    }

    #[test]
    fn test_unsupported_message_kinds_are_ignored() {
        assert_eq!(route_message(true, &message(None, false)), Route::Ignore);
    }

    #[test]
    fn test_buttons_map_to_tasks() {
        assert_eq!(Task::from(CallbackAction::AnalyzeAll), Task::Analysis);
        assert_eq!(Task::from(CallbackAction::Combos), Task::AllCombos);
        assert_eq!(Task::from(CallbackAction::AllCombos), Task::AllCombos);
        assert_eq!(
            Task::from(CallbackAction::Tier(Tier::HighRisk)),
            Task::Tier(Tier::HighRisk)
        );
        assert_eq!(Task::from(CallbackAction::Help), Task::Help);
    }
}
