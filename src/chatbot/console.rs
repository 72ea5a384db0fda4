//! Interactive operator console on stdin.

use std::sync::Arc;

use chrono_tz::Tz;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::info;

use crate::chatbot::followup::FollowUpDispatcher;
use crate::chatbot::registry::ContactRegistry;
use crate::chatbot::scheduler::ReminderScheduler;

const MENU: &str = "\n### Menu de Comandos ###\n\
    1. Enviar follow-up (prospects)\n\
    2. Mostrar lista de prospects\n\
    3. Mostrar agendamentos de contrato\n\
    4. Sair";

/// Command loop reading operator input from stdin. It touches the rest
/// of the system only through the registry, scheduler and dispatcher
/// contracts; exiting flips the shutdown channel.
pub async fn run(
    registry: Arc<ContactRegistry>,
    scheduler: Arc<ReminderScheduler>,
    dispatcher: FollowUpDispatcher,
    tz: Tz,
    shutdown: watch::Sender<bool>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{MENU}");

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            // stdin closed; park so the shutdown sender stays alive and
            // the bot keeps running without a console.
            Ok(None) | Err(_) => {
                info!("Console stdin closed; continuing without console");
                std::future::pending::<()>().await;
                return;
            }
        };

        match line.trim() {
            "" => println!("{MENU}"),
            "1" => {
                let sent = dispatcher.run_follow_up().await;
                println!("--- Follow-up concluído: {sent} enviado(s) ---");
            }
            "2" => {
                let prospects = registry.list_prospects().await;
                if prospects.is_empty() {
                    println!("- Nenhuma entrada na lista.");
                }
                for contact in prospects {
                    println!(
                        "- ID: {}, Nome: {}",
                        contact.contact_id,
                        contact.display_name.as_deref().unwrap_or("(sem nome)")
                    );
                }
            }
            "3" => {
                let reminders = scheduler.list().await;
                if reminders.is_empty() {
                    println!("- Nenhum agendamento ativo.");
                }
                for reminder in reminders {
                    println!(
                        "- ID: {}, Nome: {}, Próximo envio: {}",
                        reminder.contact_id,
                        reminder.subject_name,
                        reminder
                            .next_fire_at
                            .with_timezone(&tz)
                            .format("%Y-%m-%d %H:%M")
                    );
                }
            }
            "4" | "sair" => {
                println!("Encerrando o bot...");
                break;
            }
            other => println!("Comando inválido: '{other}'. Tente novamente."),
        }
    }

    info!("Operator console exited, requesting shutdown");
    let _ = shutdown.send(true);
}
