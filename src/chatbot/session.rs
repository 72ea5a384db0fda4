//! Per-contact conversation state.

/// Position of a contact in the menu-driven dialogue.
///
/// Scripted replies re-arm the machine to `Start`, so any later unrelated
/// message begins a fresh dialogue; only `ReminderSetup` waits for input
/// (the follow-up subject name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvState {
    #[default]
    Start,
    MainMenu,
    CustomerMenu,
    /// Waiting for the contract follow-up subject name.
    ReminderSetup,
    /// An active reminder exists; waiting for remove/back.
    ReminderActive,
}

/// Transient dialogue state attached to one contact. Owned exclusively by
/// the conversation engine; events for the same contact serialize on the
/// lock wrapping this.
#[derive(Debug, Default)]
pub struct ConversationSession {
    pub state: ConvState,
}
