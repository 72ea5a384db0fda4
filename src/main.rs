mod chatbot;
mod config;

use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use chatbot::{
    ContactRegistry, ConversationEngine, FollowUpDispatcher, GeminiClient, InboundMessage,
    OutboundAction, ReminderScheduler, TelegramClient, Transport,
};
use config::Config;

struct BotState {
    engine: ConversationEngine,
    transport: Arc<dyn Transport>,
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "itacbot.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("itacbot.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting itacbot...");
    info!("Loaded config from {config_path}");
    info!(
        "Reminder time: {:02}:{:02} ({})",
        config.reminder_hour, config.reminder_minute, config.timezone
    );

    let bot = Bot::new(&config.telegram_bot_token);
    let transport: Arc<dyn Transport> = Arc::new(TelegramClient::new(bot.clone()));

    let registry = Arc::new(ContactRegistry::new());
    let scheduler = ReminderScheduler::new(
        transport.clone(),
        config.timezone,
        config.reminder_hour,
        config.reminder_minute,
    );

    let answerer = if config.gemini_api_key.is_empty() {
        info!("Answering capability disabled (no gemini_api_key)");
        None
    } else {
        Some(GeminiClient::new(
            config.gemini_api_key.clone(),
            Duration::from_secs(config.answer_timeout_secs),
        ))
    };

    let engine = ConversationEngine::new(registry.clone(), scheduler.clone(), answerer);
    let state = Arc::new(BotState {
        engine,
        transport: transport.clone(),
    });

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(scheduler.clone().run(shutdown_rx));

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));
    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build();

    // Operator console; exiting it stops the dispatcher and the scheduler.
    let shutdown_token = dispatcher.shutdown_token();
    let followup = FollowUpDispatcher::new(
        registry.clone(),
        transport.clone(),
        Duration::from_millis(config.follow_up_delay_ms),
    );
    let tz = config.timezone;
    tokio::spawn(async move {
        chatbot::console::run(registry, scheduler, followup, tz, shutdown_tx).await;
        if let Ok(stopped) = shutdown_token.shutdown() {
            stopped.await;
        }
    });

    dispatcher.dispatch().await;
    info!("itacbot stopped");
}

async fn handle_message(msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let display_name = msg
        .from
        .as_ref()
        .map(|user| user.username.clone().unwrap_or_else(|| user.first_name.clone()));

    let inbound = InboundMessage {
        contact_id: msg.chat.id.0,
        display_name,
        text: text.to_string(),
    };

    info!(
        "📨 {} ({}): \"{}\"",
        inbound.display_name.as_deref().unwrap_or("unknown"),
        inbound.contact_id,
        inbound.text.chars().take(50).collect::<String>()
    );

    let action = state.engine.handle(&inbound).await;
    deliver(&*state.transport, inbound.contact_id, action).await;
    Ok(())
}

async fn deliver(transport: &dyn Transport, contact_id: i64, action: OutboundAction) {
    let result = match action {
        OutboundAction::SendText(text) => transport.send_text(contact_id, &text).await,
        OutboundAction::SendMenu { body, options } => {
            transport.send_menu(contact_id, &body, &options).await
        }
        OutboundAction::NoOp => Ok(()),
    };
    if let Err(e) = result {
        warn!("Outbound delivery to {contact_id} failed: {e}");
    }
}
