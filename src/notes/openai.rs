//! OpenAI chat-completion note generator.

use super::{build_prompt, NoteGenerator, NoteStyle};
use crate::config::{NotePrompts, NotesSettings};
use crate::error::{LecternError, Result};
use crate::openai::create_client_with_timeout;
use crate::transcript::Transcript;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Generates notes with an OpenAI chat model.
pub struct OpenAiNoteGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    prompts: NotePrompts,
}

impl OpenAiNoteGenerator {
    pub fn new(settings: &NotesSettings, prompts: NotePrompts) -> Result<Self> {
        Ok(Self {
            client: create_client_with_timeout(Duration::from_secs(settings.timeout_secs))?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            prompts,
        })
    }
}

#[async_trait]
impl NoteGenerator for OpenAiNoteGenerator {
    #[instrument(skip(self, transcript), fields(style = %style))]
    async fn generate(&self, transcript: &Transcript, style: NoteStyle) -> Result<String> {
        let prompt = build_prompt(&self.prompts, transcript, style);
        info!(
            "Generating notes with {} from {} words",
            self.model,
            transcript.word_count()
        );

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| LecternError::Generation(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| LecternError::Generation(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            LecternError::OpenAI(format!("Failed to generate notes: {}", e))
        })?;

        let notes = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LecternError::Generation("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated {} characters of notes", notes.len());
        Ok(notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_settings() {
        let settings = NotesSettings {
            model: "gpt-4.1".to_string(),
            temperature: 0.2,
            ..Default::default()
        };
        let generator = OpenAiNoteGenerator::new(&settings, NotePrompts::default()).unwrap();
        assert_eq!(generator.model, "gpt-4.1");
        assert_eq!(generator.temperature, 0.2);
    }
}
