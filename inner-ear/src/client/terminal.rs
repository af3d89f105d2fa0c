//! Interactive terminal front-end for `inner-ear chat`.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use crate::config::ClientConfig;

use super::credential::CredentialStore;
use super::relay::RelayClient;
use super::session::{ChatSession, TurnOutcome};

const HELP: &str = "Commands: /key to enter a new API key, /clear-key to forget the stored key, /quit to leave.";

/// A chat loop over any line source and sink.
pub struct Terminal<R, W> {
    lines: Lines<R>,
    out: W,
    relay: RelayClient,
    store: CredentialStore,
    session: ChatSession,
}

impl<R, W> Terminal<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// The stored key, when present, is loaded once here.
    pub fn new(input: R, out: W, relay: RelayClient, store: CredentialStore) -> Self {
        let session = ChatSession::new(store.load());
        Self {
            lines: input.lines(),
            out,
            relay,
            store,
            session,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    async fn say(&mut self, text: &str) -> std::io::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await
    }

    /// Run until `/quit` or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        if let Some(greeting) = self.session.messages().first() {
            let text = format!("{}\n", greeting.content);
            self.say(&text).await?;
        }
        self.say(HELP).await?;

        if !self.session.has_credential() && !self.prompt_for_key().await? {
            return Ok(());
        }

        while let Some(line) = self.lines.next_line().await? {
            match line.trim() {
                "" => continue,
                "/quit" | "/exit" => break,
                "/help" => self.say(HELP).await?,
                "/key" => {
                    if !self.prompt_for_key().await? {
                        break;
                    }
                }
                "/clear-key" => {
                    self.store.clear()?;
                    self.session.clear_api_key();
                    self.say("Stored API key removed.").await?;
                }
                text => {
                    let text = text.to_string();
                    self.turn(&text).await?;
                }
            }
        }

        Ok(())
    }

    async fn turn(&mut self, text: &str) -> anyhow::Result<()> {
        let had_key = self.session.has_credential();
        match self.session.send(text, &self.relay).await {
            TurnOutcome::Replied | TurnOutcome::Failed(_) => {
                if let Some(last) = self.session.messages().last() {
                    let reply = format!("\n{}\n", last.content);
                    self.say(&reply).await?;
                }
            }
            TurnOutcome::NeedsCredential => {
                if had_key {
                    // Rejected by the relay; never reload it on the next launch.
                    self.store.clear()?;
                }
                self.say("Your API key needs to be entered again.").await?;
                if self.prompt_for_key().await? && self.session.has_credential() {
                    self.say("Key saved. Please send your message again.").await?;
                }
            }
            TurnOutcome::Ignored => {}
        }
        Ok(())
    }

    /// Ask for a key until one validates. Returns `false` when input ends.
    /// A blank answer cancels and leaves the session without a key.
    async fn prompt_for_key(&mut self) -> anyhow::Result<bool> {
        loop {
            self.say("Enter your Gemini API key (blank to cancel):").await?;
            let Some(line) = self.lines.next_line().await? else {
                return Ok(false);
            };
            let candidate = line.trim().to_string();
            if candidate.is_empty() {
                return Ok(true);
            }

            self.say("Testing key...").await?;
            let outcome = self.relay.validate_api_key(&candidate).await;
            if outcome.valid {
                self.store.save(&candidate)?;
                self.session.set_api_key(candidate);
                self.say("Key verified and saved.").await?;
                return Ok(true);
            }

            let reason = outcome
                .error
                .unwrap_or_else(|| "Invalid API Key".to_string());
            self.say(&format!("Connection failed: {reason}")).await?;
        }
    }
}

/// Entry point for `inner-ear chat` on the process's stdin and stdout.
pub async fn run(config: &ClientConfig) -> anyhow::Result<()> {
    let relay = RelayClient::new(&config.server_url)?;
    let store = CredentialStore::new(config.key_file.clone());
    tracing::debug!(server = %relay.base_url(), key_file = %store.path().display(), "Starting chat client");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut terminal = Terminal::new(stdin, tokio::io::stdout(), relay, store);
    terminal.run().await
}
