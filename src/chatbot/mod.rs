//! Assistant core: conversation engine, contact registry, reminder
//! scheduler, follow-up dispatcher and the seams to Telegram and Gemini.

pub mod console;
pub mod engine;
pub mod followup;
pub mod gemini;
pub mod registry;
pub mod scheduler;
pub mod session;
pub mod telegram;
pub mod texts;
pub mod transport;


pub use engine::{ConversationEngine, InboundMessage, OutboundAction};
pub use followup::FollowUpDispatcher;
pub use gemini::GeminiClient;
pub use registry::ContactRegistry;
pub use scheduler::ReminderScheduler;
pub use telegram::TelegramClient;
pub use transport::Transport;
