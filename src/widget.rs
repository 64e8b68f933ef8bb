use crate::controller::{ConversationController, SendOutcome, ViewWatcher};
use crate::types::ConversationView;

/// What a display surface may ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetIntent {
    Send(String),
    SwitchMode,
    Close,
}

/// The chat window as the page composes it: a controller plus whether the
/// window is currently shown. The conversation outlives closing; only
/// [`ChatWidget::teardown`] stops its background work.
pub struct ChatWidget {
    controller: ConversationController,
    open: bool,
}

impl ChatWidget {
    pub fn new(controller: ConversationController) -> Self {
        Self {
            controller,
            open: false,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
        self.controller.open();
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Intents arriving while the window is closed are dropped, except
    /// `Close` which is a no-op.
    pub fn dispatch(&mut self, intent: WidgetIntent) -> Option<SendOutcome> {
        if !self.open {
            log::debug!("Widget closed; ignoring {:?}", intent);
            return None;
        }

        match intent {
            WidgetIntent::Send(text) => Some(self.controller.send_user_message(&text)),
            WidgetIntent::SwitchMode => {
                self.controller.switch_mode();
                None
            }
            WidgetIntent::Close => {
                self.close();
                None
            }
        }
    }

    pub fn view(&self) -> ConversationView {
        self.controller.view()
    }

    pub fn watch(&self) -> ViewWatcher {
        self.controller.subscribe()
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    pub fn teardown(self) {
        self.controller.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerConfig;
    use crate::desk::DeskSlot;
    use crate::providers::{CompletionError, CompletionMessage, CompletionProvider};
    use crate::types::{Author, ChannelMode};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Echo;

    #[async_trait]
    impl CompletionProvider for Echo {
        async fn complete(&self, messages: Vec<CompletionMessage>) -> Result<String, CompletionError> {
            Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
        }
    }

    fn widget() -> ChatWidget {
        ChatWidget::new(ConversationController::new(
            ControllerConfig::default(),
            Arc::new(Echo),
            DeskSlot::new(),
        ))
    }

    #[tokio::test]
    async fn test_intents_ignored_while_closed() {
        let mut widget = widget();
        assert!(widget.dispatch(WidgetIntent::Send("hi".to_string())).is_none());
        assert!(widget.view().transcript.is_empty());
    }

    #[tokio::test]
    async fn test_close_and_reopen_keeps_transcript() {
        let mut widget = widget();
        widget.open();

        let outcome = widget.dispatch(WidgetIntent::Send("Hello".to_string())).unwrap();
        outcome.settled().await;
        widget.dispatch(WidgetIntent::Close);
        assert!(!widget.is_open());

        widget.open();
        let view = widget.view();
        assert_eq!(view.transcript.len(), 3);
        assert_eq!(view.transcript[2].author, Author::Assistant);
        assert_eq!(view.transcript[2].text, "Hello");
        widget.teardown();
    }

    #[tokio::test]
    async fn test_switch_intent() {
        let mut widget = widget();
        widget.open();
        widget.dispatch(WidgetIntent::SwitchMode);

        assert_eq!(widget.view().mode, ChannelMode::Agent);
        assert!(widget.view().last().unwrap().is_notice());
        widget.teardown();
    }
}
