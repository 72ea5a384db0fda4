//! Prospect reinvitation sweep.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::chatbot::registry::ContactRegistry;
use crate::chatbot::texts;
use crate::chatbot::transport::Transport;

/// Sends the scripted reinvitation to every prospect on demand.
pub struct FollowUpDispatcher {
    registry: Arc<ContactRegistry>,
    transport: Arc<dyn Transport>,
    /// Courtesy pause between sends.
    delay: Duration,
}

impl FollowUpDispatcher {
    pub fn new(
        registry: Arc<ContactRegistry>,
        transport: Arc<dyn Transport>,
        delay: Duration,
    ) -> Self {
        Self {
            registry,
            transport,
            delay,
        }
    }

    /// One pass over the prospect snapshot in insertion order. A failed
    /// send is logged and the sweep continues; the returned count
    /// reflects successful sends only.
    pub async fn run_follow_up(&self) -> usize {
        let prospects = self.registry.list_prospects().await;
        if prospects.is_empty() {
            info!("No prospects to follow up");
            return 0;
        }

        info!("Starting follow-up for {} prospect(s)", prospects.len());
        let mut sent = 0;
        for contact in &prospects {
            match self
                .transport
                .send_text(contact.contact_id, texts::FOLLOW_UP)
                .await
            {
                Ok(()) => sent += 1,
                Err(e) => warn!("Follow-up to {} failed: {e}", contact.contact_id),
            }
            tokio::time::sleep(self.delay).await;
        }
        info!("Follow-up finished: {}/{} sent", sent, prospects.len());
        sent
    }
}
