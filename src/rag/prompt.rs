//! Prompt assembly and the structured reply contract.
//!
//! Every prompt opens with the system role, optionally carries a retrieved
//! context block, and always closes with a fixed instruction demanding a
//! two-field JSON reply. The template strings are load-bearing: clients
//! consume the JSON shape the trailing instruction promises.

use serde::{Deserialize, Serialize};

use crate::types::{AppError, Result, SearchResult, Turn};

/// Separator between chunk texts inside the context block.
const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Trailing instruction appended to every prompt. Downstream consumers
/// depend on the exact JSON shape this demands.
const RESPONSE_CONTRACT: &str = r#"Generate a response to the following user query in clear and concise language.

Then, create exactly three follow-up questions that help the user can ask the bot again to better understand the topic.

Your response **must** be formatted as **valid JSON** with the **exact** structure shown below and don't add any additional fields:

```json
{
  "response": "<your_answer_here>",
  "questions": [
    "<follow_up_question_1>",
    "<follow_up_question_2>",
    "<follow_up_question_3>"
  ]
}"#;

/// Builds one prompt string per query.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    system_role: String,
}

impl PromptAssembler {
    /// Create an assembler with the given system role line.
    pub fn new(system_role: impl Into<String>) -> Self {
        Self {
            system_role: system_role.into(),
        }
    }

    /// Assemble the full prompt for `query` given retrieved `results`.
    ///
    /// With no results the prompt asks for a short, context-free answer;
    /// otherwise the chunk texts are concatenated into a context block.
    /// Both branches end with the JSON response contract.
    pub fn assemble(&self, results: &[SearchResult], query: &str) -> String {
        let mut prompt = self.system_role.clone();

        if results.is_empty() {
            prompt.push_str(query);
            prompt.push_str(", give a short answer.");
        } else {
            let context: Vec<&str> = results.iter().map(|r| r.document.content.as_str()).collect();
            prompt.push_str(&format!(
                "\nAnswer the question based only on the following context:\n\n{}\n\n---\n\nAnswer the question based on the above context in a concise manner: {}\n",
                context.join(CONTEXT_SEPARATOR),
                query
            ));
        }

        prompt.push_str(RESPONSE_CONTRACT);
        prompt
    }
}

/// Build the conversation replay string fed to the retrieval pipeline.
///
/// The whole history (which already includes the just-appended user turn)
/// is replayed oldest-first, then the raw query is repeated after a
/// `Now answer:` marker.
pub fn replay_context(history: &[Turn], query: &str) -> String {
    let lines: Vec<String> = history
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.text))
        .collect();
    format!(
        "This is the conversation so far:\n{}\nNow answer:\n{}",
        lines.join("\n"),
        query
    )
}

/// The reply shape the response contract demands from the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotReply {
    /// The answer text.
    pub response: String,
    /// Exactly three follow-up questions.
    pub questions: Vec<String>,
}

/// Parse and validate a model reply against [`BotReply`].
///
/// Models frequently wrap JSON in a markdown fence; that wrapping is
/// stripped before parsing.
///
/// # Errors
///
/// Returns [`AppError::Llm`] when the reply is not valid JSON, carries
/// extra fields, or does not contain exactly three questions.
pub fn parse_bot_reply(raw: &str) -> Result<BotReply> {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    text = text.strip_suffix("```").unwrap_or(text).trim();

    let reply: BotReply = serde_json::from_str(text)
        .map_err(|e| AppError::Llm(format!("model reply is not the expected JSON shape: {}", e)))?;

    if reply.questions.len() != 3 {
        return Err(AppError::Llm(format!(
            "model reply must contain exactly 3 follow-up questions, got {}",
            reply.questions.len()
        )));
    }

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Document, DocumentMetadata};

    fn result(content: &str) -> SearchResult {
        SearchResult {
            document: Document {
                id: "c1".to_string(),
                content: content.to_string(),
                metadata: DocumentMetadata::default(),
                embedding: None,
            },
            score: 0.9,
        }
    }

    #[test]
    fn test_no_context_branch() {
        let assembler = PromptAssembler::new("You are a docs bot.");
        let prompt = assembler.assemble(&[], "what is Move?");

        assert!(prompt.starts_with("You are a docs bot.what is Move?, give a short answer."));
        assert!(prompt.contains("exactly three follow-up questions"));
        assert!(prompt.contains("\"questions\": ["));
        assert!(!prompt.contains("based only on the following context"));
    }

    #[test]
    fn test_context_branch_joins_chunks_with_separator() {
        let assembler = PromptAssembler::new("You are a docs bot.");
        let prompt = assembler.assemble(
            &[result("chunk one"), result("chunk two")],
            "what is Move?",
        );

        assert!(prompt.contains("Answer the question based only on the following context:"));
        assert!(prompt.contains("chunk one\n\n---\n\nchunk two"));
        assert!(prompt.contains("in a concise manner: what is Move?"));
        assert!(prompt.ends_with("}"));
    }

    #[test]
    fn test_replay_context_includes_all_turns_and_query() {
        let history = vec![
            Turn::user("I am using macos"),
            Turn::bot("Noted."),
            Turn::user("What is the system i am using"),
        ];
        let context = replay_context(&history, "What is the system i am using");

        assert!(context.starts_with("This is the conversation so far:\n"));
        assert!(context.contains("User: I am using macos\nBot: Noted.\nUser: What is the system i am using"));
        assert!(context.ends_with("Now answer:\nWhat is the system i am using"));
    }

    #[test]
    fn test_parse_valid_reply() {
        let raw = r#"{"response": "Move is a language.", "questions": ["a?", "b?", "c?"]}"#;
        let reply = parse_bot_reply(raw).unwrap();
        assert_eq!(reply.response, "Move is a language.");
        assert_eq!(reply.questions.len(), 3);
    }

    #[test]
    fn test_parse_strips_markdown_fence() {
        let raw = "```json\n{\"response\": \"ok\", \"questions\": [\"a?\", \"b?\", \"c?\"]}\n```";
        let reply = parse_bot_reply(raw).unwrap();
        assert_eq!(reply.response, "ok");
    }

    #[test]
    fn test_parse_rejects_wrong_question_count() {
        let raw = r#"{"response": "ok", "questions": ["a?", "b?"]}"#;
        assert!(matches!(parse_bot_reply(raw), Err(AppError::Llm(_))));
    }

    #[test]
    fn test_parse_rejects_extra_fields() {
        let raw = r#"{"response": "ok", "questions": ["a?", "b?", "c?"], "sources": []}"#;
        assert!(matches!(parse_bot_reply(raw), Err(AppError::Llm(_))));
    }

    #[test]
    fn test_parse_rejects_plain_text() {
        assert!(parse_bot_reply("Sorry, I can't help with that.").is_err());
    }
}
