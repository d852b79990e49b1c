//! [`ConversationalModel`] implementation backed by [`GeminiClient`].

use crate::client::GeminiClient;
use nexus_types::{ConversationalModel, Message, ModelFuture};

impl ConversationalModel for GeminiClient {
    fn send_message<'a>(&'a self, context: &'a [Message], new_text: &'a str) -> ModelFuture<'a> {
        Box::pin(self.generate(context, new_text))
    }

    fn name(&self) -> &str {
        self.model()
    }
}
