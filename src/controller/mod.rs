pub mod notices;
pub mod readiness;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::desk::{AgentDesk, DeskError, DeskSlot, EntryPoint};
use crate::providers::{CompletionError, CompletionMessage, CompletionProvider};
use crate::types::{Author, ChannelMode, ConversationView, Message, MessageId, SessionId};

use readiness::ReadinessWatch;

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub greeting: String,
    pub system_prompt: String,
    pub poll_interval: Duration,
}

impl ControllerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.agent_poll_ms.max(1)),
            ..Self::default()
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            greeting: notices::GREETING.to_string(),
            system_prompt: notices::SYSTEM_PROMPT.to_string(),
            poll_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Default)]
struct ConversationState {
    transcript: Vec<Message>,
    mode: ChannelMode,
    pending_replies: usize,
    agent_ready: bool,
    initialized: bool,
    pending_seed: Option<String>,
    next_id: u64,
}

impl ConversationState {
    fn append(&mut self, author: Author, text: impl Into<String>) -> MessageId {
        self.next_id += 1;
        let id = MessageId(self.next_id);
        self.transcript.push(Message::new(id, author, text));
        id
    }

    fn view(&self) -> ConversationView {
        ConversationView {
            transcript: self.transcript.clone(),
            mode: self.mode,
            typing: self.pending_replies > 0,
            agent_ready: self.agent_ready,
        }
    }
}

/// What happened to a submitted message after it was recorded.
#[derive(Debug)]
pub enum SendOutcome {
    /// Blank input; nothing recorded.
    Ignored,
    AwaitingReply(JoinHandle<()>),
    ForwardingToAgent(JoinHandle<()>),
    /// Recorded, but the agent channel is not ready so nothing left the page.
    AgentConnecting,
}

impl SendOutcome {
    pub fn is_recorded(&self) -> bool {
        !matches!(self, SendOutcome::Ignored)
    }

    /// Waits for the background delivery, if any, to finish.
    pub async fn settled(self) {
        match self {
            SendOutcome::AwaitingReply(handle) | SendOutcome::ForwardingToAgent(handle) => {
                if let Err(e) = handle.await {
                    log::error!("Delivery task ended abnormally: {}", e);
                }
            }
            SendOutcome::Ignored | SendOutcome::AgentConnecting => {}
        }
    }
}

enum Dispatch {
    Assistant(Vec<Message>),
    Agent(String),
    Held,
}

struct Inner {
    session: SessionId,
    config: ControllerConfig,
    state: watch::Sender<ConversationState>,
    completions: Arc<dyn CompletionProvider>,
    desk: DeskSlot,
    readiness: ReadinessWatch,
}

/// Owns one transcript and routes visitor text to either the assistant
/// channel or the human-agent desk.
///
/// Handles are cheap to clone and all share the same conversation. Every
/// mutation goes through a single `watch` sender, so writers are serialized
/// and the transcript only ever grows at its end. Channel I/O runs on
/// spawned tasks; the sending methods never wait for it, which means
/// they must be called from within a tokio runtime.
#[derive(Clone)]
pub struct ConversationController {
    inner: Arc<Inner>,
}

impl ConversationController {
    pub fn new(
        config: ControllerConfig,
        completions: Arc<dyn CompletionProvider>,
        desk: DeskSlot,
    ) -> Self {
        let (state, _) = watch::channel(ConversationState::default());
        Self {
            inner: Arc::new(Inner {
                session: SessionId::new_v4(),
                config,
                state,
                completions,
                desk,
                readiness: ReadinessWatch::new(),
            }),
        }
    }

    pub fn session(&self) -> SessionId {
        self.inner.session
    }

    /// Greets the visitor on the first call and starts watching for the
    /// agent desk. Later calls only consume a seed that arrived meanwhile.
    pub fn open(&self) {
        let mut first_open = false;
        let mut seed = None;

        self.inner.state.send_modify(|state| {
            if !state.initialized {
                state.initialized = true;
                state.append(Author::Assistant, self.inner.config.greeting.clone());
                first_open = true;
            }
            seed = state.pending_seed.take();
        });

        if first_open {
            log::info!("Conversation {} opened", self.inner.session);
            self.start_readiness_watch();
        }

        if let Some(seed) = seed {
            self.send_user_message(&seed);
        }
    }

    /// Text handed over by page navigation. Sent as soon as the conversation
    /// is open, and only once.
    pub fn supply_seed(&self, text: impl Into<String>) {
        let text = text.into();
        let mut send_now = None;

        self.inner.state.send_modify(|state| {
            if state.initialized {
                send_now = Some(text);
            } else {
                state.pending_seed = Some(text);
            }
        });

        if let Some(text) = send_now {
            self.send_user_message(&text);
        }
    }

    pub fn send_user_message(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            log::debug!("Ignoring blank submission");
            return SendOutcome::Ignored;
        }

        let mut dispatch = Dispatch::Held;
        self.inner.state.send_modify(|state| {
            state.append(Author::User, text);
            dispatch = match state.mode {
                ChannelMode::Assistant => Dispatch::Assistant(state.transcript.clone()),
                ChannelMode::Agent if state.agent_ready => Dispatch::Agent(text.to_string()),
                ChannelMode::Agent => {
                    state.append(Author::SystemNotice, notices::AGENT_CONNECTING);
                    Dispatch::Held
                }
            };
        });

        match dispatch {
            Dispatch::Assistant(history) => {
                let typing = TypingGuard::acquire(self.clone());
                let controller = self.clone();
                SendOutcome::AwaitingReply(tokio::spawn(async move {
                    controller.reply_with(history, typing).await;
                }))
            }
            Dispatch::Agent(text) => {
                let controller = self.clone();
                SendOutcome::ForwardingToAgent(tokio::spawn(async move {
                    controller.forward_to_agent(&text).await;
                }))
            }
            Dispatch::Held => {
                log::info!("Agent channel not ready; holding message in transcript");
                SendOutcome::AgentConnecting
            }
        }
    }

    pub fn switch_mode(&self) -> ChannelMode {
        let mut mode = ChannelMode::Assistant;
        let mut agent_ready = false;

        self.inner.state.send_modify(|state| {
            state.mode = state.mode.toggled();
            let notice = match state.mode {
                ChannelMode::Agent => notices::AGENT_MODE,
                ChannelMode::Assistant => notices::ASSISTANT_MODE,
            };
            state.append(Author::SystemNotice, notice);
            mode = state.mode;
            agent_ready = state.agent_ready;
        });

        log::info!("Conversation {} switched to {} mode", self.inner.session, mode.as_str());

        if mode == ChannelMode::Agent && agent_ready {
            if let Some(desk) = self.inner.desk.get() {
                tokio::spawn(surface_agent_window(desk));
            }
        }

        mode
    }

    /// Asks the assistant channel to answer `messages_so_far` and appends the
    /// outcome. Holds the typing indicator for the duration of the call.
    pub async fn request_assistant_reply(&self, messages_so_far: Vec<Message>) {
        let typing = TypingGuard::acquire(self.clone());
        self.reply_with(messages_so_far, typing).await;
    }

    async fn reply_with(&self, history: Vec<Message>, typing: TypingGuard) {
        let mut prompt = Vec::with_capacity(history.len() + 1);
        prompt.push(CompletionMessage::system(self.inner.config.system_prompt.clone()));
        prompt.extend(history.iter().map(CompletionMessage::from));

        let outcome = match self.inner.completions.complete(prompt).await {
            Ok(reply) if reply.trim().is_empty() => {
                Err(CompletionError::Malformed("empty completion".to_string()))
            }
            other => other,
        };

        match outcome {
            Ok(reply) => {
                self.append(Author::Assistant, reply);
            }
            Err(e) => {
                log::warn!("Assistant reply failed for {}: {}", self.inner.session, e);
                let notice = if e.is_connectivity() {
                    notices::TROUBLE_CONNECTING
                } else {
                    notices::TECHNICAL_DIFFICULTIES
                };
                self.append(Author::SystemNotice, notice);
            }
        }

        drop(typing);
    }

    async fn forward_to_agent(&self, text: &str) {
        let delivered = match self.inner.desk.get() {
            Some(desk) => deliver_to_desk(desk.as_ref(), text).await,
            None => Err(DeskError::Unsupported(EntryPoint::SendMessage)),
        };

        match delivered {
            Ok(()) => {
                self.append(Author::SystemNotice, notices::SENT_TO_AGENT);
            }
            Err(e) => {
                log::warn!("Forwarding to human agent failed: {}", e);
                self.append(Author::SystemNotice, notices::AGENT_UNREACHABLE);
            }
        }
    }

    /// Records a message pushed by the human-agent desk, whatever the
    /// current mode.
    pub fn ingest_agent_message(&self, text: &str) {
        if text.trim().is_empty() {
            log::debug!("Dropping blank agent push");
            return;
        }
        self.append(Author::HumanAgent, text);
    }

    pub fn view(&self) -> ConversationView {
        self.inner.state.borrow().view()
    }

    pub fn subscribe(&self) -> ViewWatcher {
        ViewWatcher {
            rx: self.inner.state.subscribe(),
        }
    }

    pub fn mode(&self) -> ChannelMode {
        self.inner.state.borrow().mode
    }

    pub fn is_typing(&self) -> bool {
        self.inner.state.borrow().pending_replies > 0
    }

    pub fn agent_ready(&self) -> bool {
        self.inner.state.borrow().agent_ready
    }

    /// Stops background work tied to this conversation.
    pub fn shutdown(&self) {
        self.stop_readiness_poll();
    }

    fn append(&self, author: Author, text: impl Into<String>) -> MessageId {
        let text = text.into();
        let mut id = MessageId(0);
        self.inner.state.send_modify(|state| {
            id = state.append(author, text);
        });
        id
    }
}

async fn deliver_to_desk(desk: &dyn AgentDesk, text: &str) -> Result<(), DeskError> {
    let live = if desk.supports(EntryPoint::SendMessage) {
        desk.send_message(text).await
    } else {
        Err(DeskError::Unsupported(EntryPoint::SendMessage))
    };

    match live {
        Ok(()) => Ok(()),
        Err(e) if desk.supports(EntryPoint::OfflineMessage) => {
            log::debug!("Live send unavailable ({}); leaving offline message", e);
            desk.send_offline_message(text).await
        }
        Err(e) => Err(e),
    }
}

async fn surface_agent_window(desk: Arc<dyn AgentDesk>) {
    if desk.supports(EntryPoint::StartChat) {
        if let Err(e) = desk.start_chat().await {
            log::warn!("Could not start agent chat session: {}", e);
        }
    }
    if desk.supports(EntryPoint::ShowWindow) {
        if let Err(e) = desk.show_window().await {
            log::warn!("Could not show agent window: {}", e);
        }
    }
}

/// Keeps the typing indicator on while alive.
struct TypingGuard {
    controller: ConversationController,
}

impl TypingGuard {
    fn acquire(controller: ConversationController) -> Self {
        controller.inner.state.send_modify(|state| state.pending_replies += 1);
        Self { controller }
    }
}

impl Drop for TypingGuard {
    fn drop(&mut self) {
        self.controller
            .inner
            .state
            .send_modify(|state| state.pending_replies = state.pending_replies.saturating_sub(1));
    }
}

/// Read side handed to a display surface.
pub struct ViewWatcher {
    rx: watch::Receiver<ConversationState>,
}

impl ViewWatcher {
    pub fn current(&mut self) -> ConversationView {
        self.rx.borrow_and_update().view()
    }

    /// Resolves after the next change. Returns `false` once the controller
    /// is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Waits until `predicate` holds, returning the view that satisfied it
    /// (or the last view, if the controller went away first).
    pub async fn wait_for<F>(&mut self, predicate: F) -> ConversationView
    where
        F: Fn(&ConversationView) -> bool,
    {
        loop {
            let view = self.current();
            if predicate(&view) || !self.changed().await {
                return view;
            }
        }
    }
}
