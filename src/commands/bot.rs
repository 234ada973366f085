//! Telegram chat front end, long polling against the Bot API.
//!
//! The conversational flow is deliberately tiny: `/report` puts a chat into
//! the awaiting-date state, the next message is read as a `DD/MM/YYYY` date
//! and answered with the ward summary, `/cancel` backs out. Fetch errors are
//! replied verbatim; the loop itself never dies over a single bad poll.

use crate::args::BotArgs;
use crate::commands::Out;
use crate::model::{QueryWindow, WardReport};
use crate::{Collector, Config, Result};
use anyhow::{ensure, Context};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const POLL_TIMEOUT_SECS: u64 = 50;
const RETRY_DELAY: Duration = Duration::from_secs(5);

const PROMPT_REPLY: &str = "Which date should I report on? Send it as DD/MM/YYYY.";
const CANCEL_REPLY: &str = "Cancelled.";
const HELP_REPLY: &str = "Send /report to get a daily collection summary, /cancel to abort.";
const BAD_DATE_REPLY: &str =
    "That doesn't look like a date. Send it as DD/MM/YYYY, or /cancel to abort.";

/// Runs the chat front end until the process is stopped.
pub async fn bot(config: Config, args: &BotArgs) -> Result<Out<()>> {
    let client = BotClient::new(args.token())?;
    let collector = Collector::new(config);
    // Chats that have been prompted and owe us a date.
    let mut awaiting: HashSet<i64> = HashSet::new();
    let mut offset: i64 = 0;

    info!("Chat front end started, long polling for updates");
    loop {
        let updates = match client.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("getUpdates failed: {e:#}");
                tokio::time::sleep(RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(message) = update.message else {
                continue;
            };
            let chat_id = message.chat.id;
            let text = message.text.unwrap_or_default();

            let reply = match dispatch(awaiting.contains(&chat_id), &text) {
                Action::Prompt => {
                    awaiting.insert(chat_id);
                    PROMPT_REPLY.to_string()
                }
                Action::Cancel => {
                    awaiting.remove(&chat_id);
                    CANCEL_REPLY.to_string()
                }
                Action::Help => HELP_REPLY.to_string(),
                Action::BadDate => BAD_DATE_REPLY.to_string(),
                Action::Report(window) => {
                    awaiting.remove(&chat_id);
                    match collector.fetch_and_group(&window).await {
                        Ok(report) => render_summary(&window, &report),
                        Err(e) => e.to_string(),
                    }
                }
            };

            if let Err(e) = client.send_message(chat_id, &reply).await {
                warn!("sendMessage to chat {chat_id} failed: {e:#}");
            }
        }
    }
}

/// What a message means given whether the chat owes us a date.
#[derive(Debug, PartialEq)]
enum Action {
    Prompt,
    Cancel,
    Report(QueryWindow),
    BadDate,
    Help,
}

fn dispatch(awaiting: bool, text: &str) -> Action {
    match text.trim() {
        "/start" | "/report" => Action::Prompt,
        "/cancel" => Action::Cancel,
        other if awaiting => other
            .parse::<QueryWindow>()
            .map(Action::Report)
            .unwrap_or(Action::BadDate),
        _ => Action::Help,
    }
}

/// The ward summary as a chat message.
fn render_summary(window: &QueryWindow, report: &WardReport) -> String {
    if report.is_empty() {
        return format!("No data found for {window}.");
    }
    let mut lines = vec![format!("Collection report for {window}:")];
    for (ward, summary) in report.iter() {
        lines.push(format!(
            "{ward}: {} bills, \u{20b9}{:.2}",
            summary.count, summary.total_amount
        ));
    }
    lines.push(format!(
        "Total: {} bills, \u{20b9}{:.2}",
        report.total_bills(),
        report.total_amount()
    ));
    lines.join("\n")
}

/// A minimal Bot API client: getUpdates long polling and sendMessage.
struct BotClient {
    http: reqwest::Client,
    base: String,
}

#[derive(Debug, Deserialize)]
struct UpdatesEnvelope {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

impl BotClient {
    fn new(token: &str) -> Result<Self> {
        // The client timeout must outlast the long-poll window.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .build()
            .context("Unable to build the Bot API client")?;
        Ok(Self {
            http,
            base: format!("{TELEGRAM_API_BASE}/bot{token}"),
        })
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let body = self
            .http
            .get(format!("{}/getUpdates", self.base))
            .query(&[
                ("timeout", POLL_TIMEOUT_SECS.to_string()),
                ("offset", offset.to_string()),
            ])
            .send()
            .await
            .context("getUpdates request failed")?
            .error_for_status()
            .context("getUpdates returned an error status")?
            .text()
            .await
            .context("Unable to read getUpdates body")?;
        let envelope: UpdatesEnvelope =
            serde_json::from_str(&body).context("Unable to parse getUpdates response")?;
        ensure!(envelope.ok, "Bot API reported not ok");
        Ok(envelope.result)
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.http
            .post(format!("{}/sendMessage", self.base))
            .form(&[("chat_id", chat_id.to_string()), ("text", text.to_string())])
            .send()
            .await
            .context("sendMessage request failed")?
            .error_for_status()
            .context("sendMessage returned an error status")?;
        Ok(())
    }
}
