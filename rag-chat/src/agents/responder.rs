// Responder Agent: Grounded answer generation from the retrieved chunks

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{Responder, TOP_K};
use crate::error::ApiError;
use crate::models::{ChatAnswer, ChatMessage, RetrievedDocument};
use crate::openai::AzureOpenAiClient;

pub const TEMPERATURE: f32 = 0.8;

pub fn system_prompt() -> String {
    format!(
        "Você deve atuar como um chatbot especializado em responder perguntas com base em um banco de \
dados de avaliações de estudos de mercado. Responda exclusivamente com o conteúdo do contexto \
fornecido, sem acrescentar informações que não estejam nele. Caso não haja uma resposta disponível \
para a consulta, informe educadamente ao usuário.\n\n\
O contexto é uma lista de objetos, cada um representando uma avaliação de estudo de mercado, com os campos:\n\
\"chunk\": conteúdo da avaliação.\n\
\"score\": pontuação de relevância da avaliação.\n\
A lista traz até {} avaliações, da mais relevante para a menos relevante, segundo a similaridade \
entre a pergunta do usuário e o conteúdo das avaliações.\n\n\
Responda de forma profissional e natural, sem que o usuário perceba que o sistema recupera \
informações automaticamente. A conversa deve soar como uma conversa com um especialista humano.",
        TOP_K
    )
}

pub fn user_prompt(query: &str, context: &[RetrievedDocument]) -> Result<String, ApiError> {
    let context = serde_json::to_string(context)?;
    Ok(format!(
        "A consulta do usuário é: {}\nO contexto é: {}",
        query, context
    ))
}

pub struct AzureResponder {
    client: Arc<AzureOpenAiClient>,
    model: String,
}

impl AzureResponder {
    pub fn new(client: Arc<AzureOpenAiClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl Responder for AzureResponder {
    async fn answer(
        &self,
        query: &str,
        context: &[RetrievedDocument],
    ) -> Result<ChatAnswer, ApiError> {
        info!(context_len = context.len(), "Responder: requesting completion");

        let messages = [
            ChatMessage::system(system_prompt()),
            ChatMessage::user(user_prompt(query, context)?),
        ];

        self.client
            .chat_completion(&self.model, &messages, TEMPERATURE)
            .await
    }
}
