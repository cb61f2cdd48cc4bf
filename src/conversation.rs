use crate::error::StatementAnalystError;
use crate::prompts::ADVISOR_PROMPT;
use crate::statement::{StatementDocument, StatementSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

/// Question/answer pairs in the order they happened. Turns are never edited or removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.push(ConversationTurn {
            question: question.into(),
            answer: answer.into(),
            asked_at: Utc::now(),
        });
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// How much of the history is resent with each question.
///
/// `All` grows without bound: every turn is resent forever, so long sessions
/// eventually exceed the model's context window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryWindow {
    #[default]
    All,
    Recent(usize),
}

impl HistoryWindow {
    pub fn select<'a>(&self, turns: &'a [ConversationTurn]) -> &'a [ConversationTurn] {
        match *self {
            HistoryWindow::All => turns,
            HistoryWindow::Recent(n) => &turns[turns.len().saturating_sub(n)..],
        }
    }
}

impl FromStr for HistoryWindow {
    type Err = StatementAnalystError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(HistoryWindow::All);
        }
        s.parse::<usize>().map(HistoryWindow::Recent).map_err(|_| {
            StatementAnalystError::InvalidConfig(format!(
                "history window must be 'all' or a number of turns, got '{}'",
                s
            ))
        })
    }
}

/// Everything sent with a follow-up question.
#[derive(Debug, Clone)]
pub struct QuestionContext<'a> {
    pub prompt: String,
    pub documents: &'a [StatementDocument],
    pub turns_included: usize,
    pub turns_omitted: usize,
}

/// Build the grounding prompt for `question`: advisor instructions, a manifest of
/// every loaded statement, the dialogue so far and finally the new question.
pub fn build_question_context<'a>(
    statements: &'a StatementSet,
    history: &ConversationHistory,
    question: &str,
    window: HistoryWindow,
) -> QuestionContext<'a> {
    let turns = window.select(history.turns());
    let turns_omitted = history.len() - turns.len();

    let mut prompt = String::from(ADVISOR_PROMPT.trim());
    prompt.push_str("\n\n### ATTACHED STATEMENTS\n");
    for (i, name) in statements.names().enumerate() {
        let _ = writeln!(prompt, "Document {}: \"{}\"", i + 1, name);
    }

    if !turns.is_empty() {
        prompt.push_str("\n### CONVERSATION SO FAR\n");
        if turns_omitted > 0 {
            let _ = writeln!(prompt, "({} earlier exchanges omitted)", turns_omitted);
        }
        for turn in turns {
            let _ = writeln!(prompt, "Human: {}", turn.question.trim());
            let _ = writeln!(prompt, "Assistant: {}", turn.answer.trim());
        }
    }

    let _ = write!(prompt, "\nHuman: {}", question.trim());

    QuestionContext {
        prompt,
        documents: statements.documents(),
        turns_included: turns.len(),
        turns_omitted,
    }
}
