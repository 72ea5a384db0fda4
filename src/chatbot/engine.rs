//! Menu-driven conversation state machine.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::chatbot::gemini::GeminiClient;
use crate::chatbot::registry::ContactRegistry;
use crate::chatbot::scheduler::ReminderScheduler;
use crate::chatbot::session::{ConvState, ConversationSession};
use crate::chatbot::texts;
use crate::chatbot::transport::MenuOption;

/// One inbound conversation event.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub contact_id: i64,
    pub display_name: Option<String>,
    pub text: String,
}

/// What should be sent back for one inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundAction {
    SendText(String),
    SendMenu {
        body: String,
        options: Vec<MenuOption>,
    },
    NoOp,
}

/// Routes inbound events through the transition table, mutating the
/// registry and scheduler as side effects.
pub struct ConversationEngine {
    /// Per-contact sessions; each `handle` call locks the contact's
    /// session for its whole duration, so events for one contact
    /// serialize while independent contacts proceed concurrently.
    sessions: Mutex<HashMap<i64, Arc<Mutex<ConversationSession>>>>,
    registry: Arc<ContactRegistry>,
    scheduler: Arc<ReminderScheduler>,
    /// Free-text answering capability; absent when unconfigured.
    answerer: Option<GeminiClient>,
    greeting: Regex,
}

impl ConversationEngine {
    pub fn new(
        registry: Arc<ContactRegistry>,
        scheduler: Arc<ReminderScheduler>,
        answerer: Option<GeminiClient>,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            registry,
            scheduler,
            answerer,
            greeting: Regex::new(r"(?i)^(olá|oi|bom dia|começar|menu|/start)$")
                .expect("greeting pattern is valid"),
        }
    }

    async fn session(&self, contact_id: i64) -> Arc<Mutex<ConversationSession>> {
        let mut sessions = self.sessions.lock().await;
        sessions.entry(contact_id).or_default().clone()
    }

    #[cfg(test)]
    pub(crate) async fn state_of(&self, contact_id: i64) -> ConvState {
        let session = self.session(contact_id).await;
        let state = session.lock().await.state;
        state
    }

    /// Route one inbound event.
    ///
    /// Every branch terminates in a defined action; at most one registry
    /// mutation and one scheduler mutation happen, both before the action
    /// is returned.
    pub async fn handle(&self, msg: &InboundMessage) -> OutboundAction {
        let session = self.session(msg.contact_id).await;
        let mut session = session.lock().await;

        let input = msg.text.trim();
        let normalized = input.to_lowercase();

        // A greeting restarts the dialogue from any state except the
        // name-collection step, where free text is the expected input.
        if session.state != ConvState::ReminderSetup && self.greeting.is_match(input) {
            session.state = ConvState::MainMenu;
            return main_menu();
        }

        match session.state {
            ConvState::Start => self.fallback(msg).await,

            ConvState::MainMenu => {
                if matches_option(&normalized, &texts::OPT_CUSTOMER) {
                    self.registry
                        .mark_customer(msg.contact_id, msg.display_name.clone())
                        .await;
                    session.state = ConvState::CustomerMenu;
                    OutboundAction::SendMenu {
                        body: texts::CUSTOMER_WELCOME.to_string(),
                        options: texts::CUSTOMER_MENU.to_vec(),
                    }
                } else if matches_option(&normalized, &texts::OPT_PROSPECT) {
                    let inserted = self
                        .registry
                        .upsert_prospect(msg.contact_id, msg.display_name.clone())
                        .await;
                    if inserted {
                        info!("Contact {} added to prospects", msg.contact_id);
                    }
                    session.state = ConvState::Start;
                    OutboundAction::SendText(texts::PROSPECT_ACK.to_string())
                } else if matches_option(&normalized, &texts::OPT_CONTRACT) {
                    match self.scheduler.get(msg.contact_id).await {
                        Some(reminder) => {
                            session.state = ConvState::ReminderActive;
                            OutboundAction::SendMenu {
                                body: texts::reminder_exists(&reminder.subject_name),
                                options: texts::REMINDER_MENU.to_vec(),
                            }
                        }
                        None => {
                            session.state = ConvState::ReminderSetup;
                            OutboundAction::SendText(texts::ASK_REMINDER_NAME.to_string())
                        }
                    }
                } else {
                    self.fallback(msg).await
                }
            }

            ConvState::CustomerMenu => {
                if matches_option(&normalized, &texts::OPT_SLA) {
                    session.state = ConvState::Start;
                    OutboundAction::SendText(texts::SLA_REPLY.to_string())
                } else if matches_option(&normalized, &texts::OPT_CONTRACT_MATTERS) {
                    session.state = ConvState::Start;
                    OutboundAction::SendText(texts::CONTRACT_REPLY.to_string())
                } else {
                    self.fallback(msg).await
                }
            }

            ConvState::ReminderSetup => {
                if input.is_empty() {
                    self.fallback(msg).await
                } else {
                    let reminder = self.scheduler.schedule(msg.contact_id, input).await;
                    let (hour, minute) = self.scheduler.fire_time();
                    session.state = ConvState::Start;
                    OutboundAction::SendText(texts::reminder_confirmed(
                        &reminder.subject_name,
                        hour,
                        minute,
                    ))
                }
            }

            ConvState::ReminderActive => {
                if matches_option(&normalized, &texts::OPT_REMOVE_REMINDER) {
                    let removed = self.scheduler.cancel(msg.contact_id).await;
                    session.state = ConvState::Start;
                    if removed {
                        OutboundAction::SendText(texts::REMINDER_REMOVED.to_string())
                    } else {
                        OutboundAction::SendText(texts::NO_ACTIVE_REMINDER.to_string())
                    }
                } else if matches_option(&normalized, &texts::OPT_BACK_TO_MENU) {
                    session.state = ConvState::MainMenu;
                    main_menu()
                } else {
                    self.fallback(msg).await
                }
            }
        }
    }

    /// Unrecognized input: defer to the answering capability, with the
    /// scripted apology on failure. Conversation state is left unchanged.
    async fn fallback(&self, msg: &InboundMessage) -> OutboundAction {
        let Some(ref answerer) = self.answerer else {
            return OutboundAction::SendText(texts::UNKNOWN_REPLY.to_string());
        };
        match answerer.answer(msg.text.trim()).await {
            Ok(text) => OutboundAction::SendText(text),
            Err(e) => {
                warn!("Answering capability failed for {}: {e}", msg.contact_id);
                OutboundAction::SendText(texts::APOLOGY.to_string())
            }
        }
    }
}

fn main_menu() -> OutboundAction {
    OutboundAction::SendMenu {
        body: texts::WELCOME.to_string(),
        options: texts::MAIN_MENU.to_vec(),
    }
}

/// Menu input matches either the option id or its visible title,
/// case-insensitively.
fn matches_option(normalized: &str, option: &MenuOption) -> bool {
    normalized == option.id || normalized == option.title.to_lowercase()
}
