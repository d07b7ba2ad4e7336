//! Host loop: feeds channel messages to the bot and sends its replies back.
//!
//! Besides ordinary messages the loop understands two commands:
//! `/reload` re-reads the catalog file and `/quit` stops the loop.

use std::path::PathBuf;

use futures::StreamExt;
use tracing::{error, info, warn};

use crate::channels::{Channel, IncomingMessage, OutgoingResponse};
use crate::dialog::{Activity, ClinicBot};
use crate::error::Result;

const SOMETHING_WENT_WRONG: &str = "Sorry, something went wrong. Please try again.";

/// Drives a [`ClinicBot`] from a [`Channel`] until the stream ends or
/// `/quit` is received.
pub struct Host {
    bot: ClinicBot,
    /// Catalog file used by `/reload`; `None` when running on the built-in catalog.
    catalog_path: Option<PathBuf>,
}

impl Host {
    pub fn new(bot: ClinicBot, catalog_path: Option<PathBuf>) -> Self {
        Self { bot, catalog_path }
    }

    pub async fn run(&self, channel: &dyn Channel) -> Result<()> {
        let mut messages = channel.start().await?;
        info!(channel = channel.name(), "Host started");

        while let Some(msg) = messages.next().await {
            match msg.content.trim() {
                "/quit" => break,
                "/reload" => {
                    let reply = self.reload().await;
                    channel.respond(&msg, OutgoingResponse::text(reply)).await?;
                }
                _ => self.handle(channel, &msg).await?,
            }
        }

        info!(channel = channel.name(), "Host stopped");
        Ok(())
    }

    async fn handle(&self, channel: &dyn Channel, msg: &IncomingMessage) -> Result<()> {
        let activity = Activity::from(msg);
        let replies = match self.bot.on_turn(&activity).await {
            Ok(replies) => replies,
            Err(e) => {
                error!(message_id = %msg.id, error = %e, "Turn failed");
                vec![SOMETHING_WENT_WRONG.to_string()]
            }
        };

        for reply in replies {
            channel.respond(msg, OutgoingResponse::text(reply)).await?;
        }
        Ok(())
    }

    async fn reload(&self) -> String {
        let Some(path) = self.catalog_path.as_deref() else {
            return "Using the built-in catalog; there is no file to reload.".to_string();
        };
        match self.bot.catalog().reload_from(path).await {
            Ok(count) => format!("Catalog reloaded: {count} clinics."),
            Err(e) => {
                warn!(error = %e, "Catalog reload failed");
                format!("Catalog reload failed, keeping the current one: {e}")
            }
        }
    }
}
