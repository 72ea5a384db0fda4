//! Outbound send capability.

use async_trait::async_trait;

/// One selectable row in an interactive menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuOption {
    pub id: &'static str,
    pub title: &'static str,
}

/// Channel-agnostic outbound sends. The conversation core only needs
/// plain text and labeled option menus; the wire payload is up to the
/// implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, contact_id: i64, text: &str) -> Result<(), String>;

    async fn send_menu(
        &self,
        contact_id: i64,
        body: &str,
        options: &[MenuOption],
    ) -> Result<(), String>;
}
