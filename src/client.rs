use openai_api_rust::{
    chat::{ChatApi as _, ChatBody},
    OpenAI, Role,
};

use crate::error::{CompanionError, Result};
use crate::types::Sentiment;

static INSTRUCTION: &str = "Classify the sentiment of the user's message. \
Answer with POSITIVE or NEGATIVE and your confidence from 0 to 100 (Example: \"POSITIVE, 97\")";

/// Anything that can label a piece of text with a sentiment.
pub(crate) trait SentimentClassifier {
    fn classify(&self, text: &str) -> Result<Sentiment>;
}

pub(crate) struct OpenAiClassifier {
    openai: OpenAI,
    model: String,
    max_tokens: i32,
}

impl OpenAiClassifier {
    pub(crate) fn new(openai: OpenAI, model: String, max_tokens: i32) -> Self {
        Self {
            openai,
            model,
            max_tokens,
        }
    }
}

impl SentimentClassifier for OpenAiClassifier {
    fn classify(&self, text: &str) -> Result<Sentiment> {
        let body = ChatBody {
            model: self.model.clone(),
            max_tokens: Some(self.max_tokens),
            temperature: Some(0_f32),
            top_p: Some(0_f32),
            n: Some(1),
            stream: Some(false),
            stop: None,
            presence_penalty: None,
            frequency_penalty: None,
            logit_bias: None,
            user: None,
            messages: vec![
                openai_api_rust::Message {
                    role: Role::System,
                    content: INSTRUCTION.to_string(),
                },
                openai_api_rust::Message {
                    role: Role::User,
                    content: text.to_string(),
                },
            ],
        };
        tracing::debug!(model = %self.model, "requesting sentiment");

        let completion = self
            .openai
            .chat_completion_create(&body)
            .map_err(|e| CompanionError::ClassifierUnavailable(format!("{:?}", e)))?;
        let answer = completion
            .choices
            .first()
            .and_then(|choise| choise.message.as_ref())
            .map(|message| message.content.clone())
            .ok_or_else(|| CompanionError::MalformedClassification("empty completion".into()))?;

        tracing::debug!(answer = %answer, "sentiment answer");
        parse_sentiment(&answer)
    }
}

/// Parses `"LABEL, LEVEL"` where level is a percentage.
pub(crate) fn parse_sentiment(answer: &str) -> Result<Sentiment> {
    let malformed = || CompanionError::MalformedClassification(answer.to_string());

    let mut parts = answer.trim().trim_matches('"').split(',').map(str::trim);
    let label = parts
        .next()
        .filter(|label| !label.is_empty())
        .ok_or_else(malformed)?
        .to_uppercase();
    let level = parts
        .next()
        .and_then(|level| level.trim_end_matches('%').parse::<f64>().ok())
        .filter(|level| (0. ..=100.).contains(level))
        .ok_or_else(malformed)?;

    Ok(Sentiment {
        label,
        score: level / 100.,
    })
}
