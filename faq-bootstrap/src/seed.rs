//! Seed data for the `faqs` table
//!
//! Holds the literal seed row and builds the statements that create the
//! table and insert it under a given [`SchemaPolicy`].

use crate::error::BootstrapError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Name of the seeded relation
pub const FAQ_TABLE: &str = "faqs";

pub const QUESTION_MAX_CHARS: usize = 250;
pub const ANSWER_MAX_CHARS: usize = 2000;

pub const CREATE_TABLE: &str =
    "CREATE TABLE faqs (question VARCHAR(250), answer VARCHAR(2000))";

pub const CREATE_TABLE_IF_NOT_EXISTS: &str =
    "CREATE TABLE IF NOT EXISTS faqs (question VARCHAR(250), answer VARCHAR(2000))";

pub const INSERT_ROW: &str = "INSERT INTO faqs (question, answer) VALUES ($1, $2)";

pub const INSERT_ROW_IF_ABSENT: &str = "INSERT INTO faqs (question, answer) \
     SELECT $1, $2 WHERE NOT EXISTS (SELECT 1 FROM faqs WHERE question = $1)";

const SAMPLE_QUESTION: &str = "What is text embeddings pipeline?";
const SAMPLE_ANSWER: &str = "Text embeddings pipeline allows you to create embeddings of \
     your contextual knowledge and store it in a vector store.";

/// One row of the `faqs` relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqRow {
    pub question: String,
    pub answer: String,
}

impl FaqRow {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// The row every bootstrap inserts.
    pub fn sample() -> Self {
        Self::new(SAMPLE_QUESTION, SAMPLE_ANSWER)
    }

    /// Check the row fits the column bounds. Bounds count characters, as
    /// `VARCHAR(n)` does, not bytes.
    pub fn validate(&self) -> Result<(), BootstrapError> {
        let question_len = self.question.chars().count();
        if question_len > QUESTION_MAX_CHARS {
            return Err(BootstrapError::InvalidSeed {
                reason: format!(
                    "question has {} characters, limit is {}",
                    question_len, QUESTION_MAX_CHARS
                ),
            });
        }

        let answer_len = self.answer.chars().count();
        if answer_len > ANSWER_MAX_CHARS {
            return Err(BootstrapError::InvalidSeed {
                reason: format!(
                    "answer has {} characters, limit is {}",
                    answer_len, ANSWER_MAX_CHARS
                ),
            });
        }

        Ok(())
    }
}

/// How the bootstrap treats an already-initialized database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaPolicy {
    /// Create the table unconditionally. A second run fails with a schema conflict.
    #[default]
    Strict,
    /// Create the table and the seed row only when they are missing.
    IfNotExists,
}

impl FromStr for SchemaPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "if-not-exists" | "if_not_exists" => Ok(Self::IfNotExists),
            other => Err(format!(
                "unknown schema policy {:?} (expected strict or if-not-exists)",
                other
            )),
        }
    }
}

impl fmt::Display for SchemaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::IfNotExists => f.write_str("if-not-exists"),
        }
    }
}

/// A SQL statement with positional text parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: &'static str,
    pub params: Vec<String>,
}

impl Statement {
    pub fn new(sql: &'static str) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }
}

/// Statements that create `faqs` and insert `row`, in execution order.
pub fn seed_statements(policy: SchemaPolicy, row: &FaqRow) -> Vec<Statement> {
    let (create, insert) = match policy {
        SchemaPolicy::Strict => (CREATE_TABLE, INSERT_ROW),
        SchemaPolicy::IfNotExists => (CREATE_TABLE_IF_NOT_EXISTS, INSERT_ROW_IF_ABSENT),
    };

    vec![
        Statement::new(create),
        Statement::new(insert)
            .bind(row.question.as_str())
            .bind(row.answer.as_str()),
    ]
}
