//! ClinicBot: per-turn dispatch and the finder dialog.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::CatalogHandle;
use crate::config::BotConfig;
use crate::dialog::activity::{Activity, ActivityKind};
use crate::dialog::prompts;
use crate::dialog::state::{FinderPhase, FinderPurpose, FinderState, UserProfile};
use crate::error::Result;
use crate::geo::GeoPoint;
use crate::intent::{Intent, IntentRecognizer};
use crate::store::{self, StateScope, StateStore, keys};

/// Words that abandon an active dialog.
const CANCEL_WORDS: [&str; 3] = ["cancel", "stop", "quit"];

/// Turn handler for the clinic finder.
///
/// Holds no per-conversation state; everything that must survive between
/// turns goes through the injected [`StateStore`].
pub struct ClinicBot {
    config: BotConfig,
    catalog: CatalogHandle,
    recognizer: Arc<dyn IntentRecognizer>,
    store: Arc<dyn StateStore>,
}

/// Keys for one turn's state.
struct Scopes {
    conversation: StateScope,
    user: StateScope,
}

impl ClinicBot {
    pub fn new(
        config: BotConfig,
        catalog: CatalogHandle,
        recognizer: Arc<dyn IntentRecognizer>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            config,
            catalog,
            recognizer,
            store,
        }
    }

    pub fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    /// Handle one activity and return the replies to send, in order.
    pub async fn on_turn(&self, activity: &Activity) -> Result<Vec<String>> {
        match &activity.kind {
            ActivityKind::Message { text } => self.on_message(activity, text.trim()).await,
            ActivityKind::ConversationUpdate { members_added } => Ok(members_added
                .iter()
                .filter(|member| **member != self.config.bot_id)
                .map(|_| prompts::WELCOME.to_string())
                .collect()),
            ActivityKind::Other(kind) => Ok(vec![prompts::event_detected(kind)]),
        }
    }

    async fn on_message(&self, activity: &Activity, text: &str) -> Result<Vec<String>> {
        let scopes = Scopes {
            conversation: StateScope::Conversation(activity.conversation_id.clone()),
            user: StateScope::User(activity.user_id.clone()),
        };

        let finder: Option<FinderState> =
            store::load(self.store.as_ref(), &scopes.conversation, keys::FINDER_STATE).await?;
        if let Some(state) = finder.filter(|s| s.phase.is_active()) {
            return self.continue_finder(state, &scopes, text).await;
        }

        if text.eq_ignore_ascii_case("welcome") {
            return Ok(vec![prompts::WELCOME.to_string()]);
        }

        let recognized = self.recognizer.recognize(text).await?;
        info!(
            conversation = %activity.conversation_id,
            recognizer = self.recognizer.name(),
            intent = %recognized.intent,
            score = recognized.score,
            "Recognized intent"
        );

        if recognized.score < self.config.intent_threshold {
            return Ok(vec![prompts::NOT_UNDERSTOOD.to_string()]);
        }

        match recognized.intent {
            Intent::ClinicFind => self.start_finder(FinderPurpose::Find, &scopes).await,
            Intent::ClinicSet => self.start_finder(FinderPurpose::Set, &scopes).await,
            Intent::Greeting => Ok(vec![prompts::WELCOME.to_string()]),
            Intent::None => Ok(vec![prompts::NOT_UNDERSTOOD.to_string()]),
        }
    }

    async fn start_finder(&self, purpose: FinderPurpose, scopes: &Scopes) -> Result<Vec<String>> {
        let profile = self.load_profile(&scopes.user).await?;

        let mut state = FinderState::new(purpose);
        if let Err(e) = state.advance() {
            warn!("Failed to start finder dialog: {}", e);
            return Ok(vec![prompts::NOT_UNDERSTOOD.to_string()]);
        }
        self.save_state(&scopes.conversation, &state).await?;

        debug!(?purpose, "Finder dialog started");
        Ok(vec![prompts::ask_location(&profile, purpose)])
    }

    async fn continue_finder(
        &self,
        state: FinderState,
        scopes: &Scopes,
        text: &str,
    ) -> Result<Vec<String>> {
        if CANCEL_WORDS.iter().any(|w| text.eq_ignore_ascii_case(w)) {
            self.clear_state(&scopes.conversation).await?;
            return Ok(vec![prompts::CANCELLED.to_string()]);
        }

        match state.phase {
            FinderPhase::AwaitingLocation => self.on_location(state, scopes, text).await,
            FinderPhase::AwaitingSelection => self.on_selection(state, scopes, text).await,
            FinderPhase::Idle | FinderPhase::Complete => {
                self.clear_state(&scopes.conversation).await?;
                Ok(vec![prompts::NOT_UNDERSTOOD.to_string()])
            }
        }
    }

    async fn on_location(
        &self,
        mut state: FinderState,
        scopes: &Scopes,
        text: &str,
    ) -> Result<Vec<String>> {
        let point = match GeoPoint::parse(text) {
            Ok(point) => point,
            Err(e) => {
                debug!(error = %e, "Unreadable location");
                return self
                    .reprompt(state, &scopes.conversation, prompts::location_reprompt(&e))
                    .await;
            }
        };

        let mut profile = self.load_profile(&scopes.user).await?;
        profile.location = Some(text.to_string());
        self.save_profile(&scopes.user, &profile).await?;

        let ranked = match self.catalog.rank(point, self.config.unit, self.config.top_k) {
            Ok(ranked) => ranked,
            Err(e) => {
                warn!(error = %e, "Ranking failed");
                self.clear_state(&scopes.conversation).await?;
                return Ok(vec![prompts::NO_CLINICS.to_string()]);
            }
        };

        state.candidates = ranked.into_iter().map(Into::into).collect();
        if let Err(e) = state.advance() {
            warn!("Failed to advance finder dialog: {}", e);
        }
        self.save_state(&scopes.conversation, &state).await?;

        info!(location = %point, offered = state.candidates.len(), "Offered clinic shortlist");
        Ok(vec![prompts::shortlist(&state.candidates)])
    }

    async fn on_selection(
        &self,
        state: FinderState,
        scopes: &Scopes,
        text: &str,
    ) -> Result<Vec<String>> {
        let count = state.candidates.len();
        let choice = text
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=count).contains(n));

        let Some(choice) = choice else {
            return self
                .reprompt(state, &scopes.conversation, prompts::selection_reprompt(count))
                .await;
        };

        let chosen = &state.candidates[choice - 1];
        let mut replies = vec![prompts::facility_details(&chosen.facility, &chosen.distance)];

        let mut profile = self.load_profile(&scopes.user).await?;
        profile.selected = Some(choice);
        if state.purpose == FinderPurpose::Set {
            profile.preferred_clinic = Some(chosen.facility.clone());
            replies.push(prompts::clinic_saved(&chosen.facility));
        }
        self.save_profile(&scopes.user, &profile).await?;
        self.clear_state(&scopes.conversation).await?;

        info!(choice, clinic = %chosen.facility.name, purpose = ?state.purpose, "Clinic selected");
        Ok(replies)
    }

    /// Count an invalid answer and either ask again or drop the dialog.
    async fn reprompt(
        &self,
        mut state: FinderState,
        conversation: &StateScope,
        message: String,
    ) -> Result<Vec<String>> {
        if state.record_reprompt() > self.config.max_reprompts {
            info!(phase = %state.phase, "Too many invalid answers, ending finder dialog");
            self.clear_state(conversation).await?;
            return Ok(vec![prompts::GAVE_UP.to_string()]);
        }
        self.save_state(conversation, &state).await?;
        Ok(vec![message])
    }

    async fn load_profile(&self, user: &StateScope) -> Result<UserProfile> {
        let profile = store::load(self.store.as_ref(), user, keys::USER_PROFILE).await?;
        Ok(profile.unwrap_or_default())
    }

    async fn save_profile(&self, user: &StateScope, profile: &UserProfile) -> Result<()> {
        store::save(self.store.as_ref(), user, keys::USER_PROFILE, profile).await?;
        Ok(())
    }

    async fn save_state(&self, conversation: &StateScope, state: &FinderState) -> Result<()> {
        store::save(self.store.as_ref(), conversation, keys::FINDER_STATE, state).await?;
        Ok(())
    }

    async fn clear_state(&self, conversation: &StateScope) -> Result<()> {
        self.store.delete(conversation, keys::FINDER_STATE).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{builtin, parse_catalog};
    use crate::intent::KeywordRecognizer;
    use crate::store::MemoryStateStore;

    fn bot_with(config: BotConfig) -> (ClinicBot, Arc<MemoryStateStore>) {
        let store = Arc::new(MemoryStateStore::new());
        let bot = ClinicBot::new(
            config,
            CatalogHandle::new(builtin()),
            Arc::new(KeywordRecognizer::default_rules().unwrap()),
            store.clone(),
        );
        (bot, store)
    }

    fn bot() -> (ClinicBot, Arc<MemoryStateStore>) {
        bot_with(BotConfig::default())
    }

    async fn say(bot: &ClinicBot, text: &str) -> Vec<String> {
        bot.on_turn(&Activity::message("conv-1", "user-1", text))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn welcome_keyword() {
        let (bot, _) = bot();
        assert_eq!(say(&bot, "welcome").await, vec![prompts::WELCOME]);
    }

    #[tokio::test]
    async fn low_confidence_falls_back() {
        let (bot, _) = bot();
        assert_eq!(say(&bot, "clinic").await, vec![prompts::NOT_UNDERSTOOD]);
        assert_eq!(say(&bot, "tell me a joke").await, vec![prompts::NOT_UNDERSTOOD]);
    }

    #[tokio::test]
    async fn conversation_update_welcomes_everyone_but_the_bot() {
        let (bot, _) = bot();
        let activity = Activity {
            conversation_id: "c".into(),
            user_id: "u".into(),
            kind: ActivityKind::ConversationUpdate {
                members_added: vec!["clinic-finder".into(), "alice".into(), "bob".into()],
            },
        };
        let replies = bot.on_turn(&activity).await.unwrap();
        assert_eq!(replies.len(), 2);
    }

    #[tokio::test]
    async fn other_events_are_echoed() {
        let (bot, _) = bot();
        let activity = Activity {
            conversation_id: "c".into(),
            user_id: "u".into(),
            kind: ActivityKind::Other("typing".into()),
        };
        assert_eq!(bot.on_turn(&activity).await.unwrap(), vec!["typing event detected"]);
    }

    #[tokio::test]
    async fn find_flow_end_to_end() {
        let (bot, store) = bot();

        let replies = say(&bot, "Find me a clinic").await;
        assert!(replies[0].starts_with("You do not have a pre-set clinic"));

        let replies = say(&bot, "-118.25|34.01").await;
        let list = &replies[0];
        let first = list.find("1. Stacy Medical Center").expect("Stacy first");
        let second = list.find("2. Southern Calif Medical Group").expect("Southern second");
        assert!(first < second);
        assert!(list.contains("3. "));
        assert!(!list.contains("4. "));

        let replies = say(&bot, "2").await;
        assert!(replies[0].contains("Southern Calif Medical Group"));
        assert_eq!(replies.len(), 1);

        let profile: UserProfile = store::load(
            &*store,
            &StateScope::User("user-1".into()),
            keys::USER_PROFILE,
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(profile.location.as_deref(), Some("-118.25|34.01"));
        assert_eq!(profile.selected, Some(2));
        assert!(profile.preferred_clinic.is_none());

        // Dialog is over; the next message is routed by intent again.
        assert_eq!(say(&bot, "welcome").await, vec![prompts::WELCOME]);
    }

    #[tokio::test]
    async fn set_flow_saves_preferred_clinic() {
        let (bot, _) = bot();
        say(&bot, "Set my clinic").await;
        say(&bot, "-118.25|34.01").await;
        let replies = say(&bot, "1").await;
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[1], "Done. Stacy Medical Center is now your clinic.");

        let replies = say(&bot, "find a clinic").await;
        assert!(replies[0].starts_with("Your clinic is Stacy Medical Center."));
    }

    #[tokio::test]
    async fn bad_location_reprompts_then_gives_up() {
        let (bot, _) = bot_with(BotConfig {
            max_reprompts: 2,
            ..BotConfig::default()
        });
        say(&bot, "find a clinic").await;

        for _ in 0..2 {
            let replies = say(&bot, "downtown LA").await;
            assert!(replies[0].starts_with("I couldn't read that location"));
        }
        assert_eq!(say(&bot, "downtown LA").await, vec![prompts::GAVE_UP]);
        assert_eq!(say(&bot, "welcome").await, vec![prompts::WELCOME]);
    }

    #[tokio::test]
    async fn out_of_range_selection_reprompts() {
        let (bot, _) = bot();
        say(&bot, "find a clinic").await;
        say(&bot, "-118.25|34.01").await;

        assert_eq!(say(&bot, "0").await, vec![prompts::selection_reprompt(3)]);
        assert_eq!(say(&bot, "4").await, vec![prompts::selection_reprompt(3)]);
        assert_eq!(say(&bot, "first").await, vec![prompts::selection_reprompt(3)]);

        let replies = say(&bot, "3").await;
        assert!(replies[0].starts_with("Here is the information about the selected clinic"));
    }

    #[tokio::test]
    async fn cancel_ends_dialog() {
        let (bot, store) = bot();
        say(&bot, "find a clinic").await;
        assert_eq!(say(&bot, "Cancel").await, vec![prompts::CANCELLED]);
        let state = store
            .get(&StateScope::Conversation("conv-1".into()), keys::FINDER_STATE)
            .await
            .unwrap();
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn conversations_are_independent() {
        let (bot, _) = bot();
        bot.on_turn(&Activity::message("a", "u", "find a clinic")).await.unwrap();

        let other = bot.on_turn(&Activity::message("b", "u", "-118.25|34.01")).await.unwrap();
        assert_eq!(other, vec![prompts::NOT_UNDERSTOOD]);

        let same = bot.on_turn(&Activity::message("a", "u", "-118.25|34.01")).await.unwrap();
        assert!(same[0].starts_with("Here are the clinics closest to you"));
    }

    #[tokio::test]
    async fn shortlist_survives_catalog_reload() {
        let (bot, _) = bot();
        say(&bot, "find a clinic").await;
        say(&bot, "-118.25|34.01").await;

        bot.catalog().replace(parse_catalog(
            "Elsewhere|BCC|Family Practice|1 Main St|Town|County|CA|90000|(000) 000-0000|-100.0|40.0",
        ));

        let replies = say(&bot, "1").await;
        assert!(replies[0].contains("Stacy Medical Center"));
    }

    #[tokio::test]
    async fn empty_catalog_reports_no_clinics() {
        let (bot, _) = bot();
        bot.catalog().replace(parse_catalog(""));
        say(&bot, "find a clinic").await;
        assert_eq!(say(&bot, "-118.25|34.01").await, vec![prompts::NO_CLINICS]);
    }
}
