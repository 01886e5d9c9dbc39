//! Scripted decision provider for tests and unattended runs.

use super::{Choice, DecisionProvider};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// One prepared answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedAnswer {
    /// Answer to `yes_no`.
    YesNo(bool),
    /// Answer to `choose`.
    Choose(Choice),
    /// Answer to `search_text`.
    Search(Option<String>),
}

/// Replays prepared answers in order and records every prompt asked.
///
/// An unexpected question (wrong kind, or script exhausted) fails with
/// [`Error::Decision`].
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    answers: Mutex<VecDeque<ScriptedAnswer>>,
    prompts: Mutex<Vec<String>>,
    offered: Mutex<Vec<Vec<String>>>,
}

impl ScriptedDecisions {
    /// Create a provider with a script.
    pub fn new(answers: Vec<ScriptedAnswer>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            prompts: Mutex::new(Vec::new()),
            offered: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that must never be asked anything.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Prompts asked so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Number of prompts asked so far.
    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Option lists passed to each `choose`, in order.
    pub fn offered(&self) -> Vec<Vec<String>> {
        self.offered.lock().map(|o| o.clone()).unwrap_or_default()
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.lock().map(|a| a.len()).unwrap_or(0)
    }

    fn next(&self, prompt: &str, cancel: &CancellationToken) -> Result<ScriptedAnswer> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.answers
            .lock()
            .map_err(|_| Error::other("script lock poisoned"))?
            .pop_front()
            .ok_or_else(|| Error::Decision(format!("no scripted answer for: {}", prompt)))
    }
}

#[async_trait]
impl DecisionProvider for ScriptedDecisions {
    async fn yes_no(&self, prompt: &str, cancel: &CancellationToken) -> Result<bool> {
        match self.next(prompt, cancel)? {
            ScriptedAnswer::YesNo(answer) => Ok(answer),
            other => Err(Error::Decision(format!(
                "expected yes/no answer for {:?}, script has {:?}",
                prompt, other
            ))),
        }
    }

    async fn choose(
        &self,
        prompt: &str,
        options: &[String],
        cancel: &CancellationToken,
    ) -> Result<Choice> {
        let answer = self.next(prompt, cancel)?;
        if let Ok(mut offered) = self.offered.lock() {
            offered.push(options.to_vec());
        }
        match answer {
            ScriptedAnswer::Choose(Choice::Selected(index)) if index >= options.len() => {
                Err(Error::Decision(format!(
                    "scripted choice {} out of range for {} options",
                    index,
                    options.len()
                )))
            }
            ScriptedAnswer::Choose(choice) => Ok(choice),
            other => Err(Error::Decision(format!(
                "expected choice for {:?}, script has {:?}",
                prompt, other
            ))),
        }
    }

    async fn search_text(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        match self.next(prompt, cancel)? {
            ScriptedAnswer::Search(text) => Ok(text),
            other => Err(Error::Decision(format!(
                "expected search text for {:?}, script has {:?}",
                prompt, other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order() {
        let cancel = CancellationToken::new();
        let decisions = ScriptedDecisions::new(vec![
            ScriptedAnswer::YesNo(false),
            ScriptedAnswer::Choose(Choice::Selected(1)),
            ScriptedAnswer::Search(None),
        ]);
        let options = vec!["a".to_string(), "b".to_string()];

        assert!(!decisions.yes_no("Ignore?", &cancel).await.unwrap());
        assert_eq!(
            decisions.choose("Pick", &options, &cancel).await.unwrap(),
            Choice::Selected(1)
        );
        assert_eq!(decisions.search_text("Search", &cancel).await.unwrap(), None);
        assert_eq!(decisions.prompt_count(), 3);
        assert_eq!(decisions.offered(), vec![options]);
        assert_eq!(decisions.remaining(), 0);
    }

    #[tokio::test]
    async fn test_unexpected_question_fails() {
        let cancel = CancellationToken::new();
        let decisions = ScriptedDecisions::silent();
        assert!(matches!(
            decisions.yes_no("Ignore?", &cancel).await,
            Err(Error::Decision(_))
        ));

        let decisions = ScriptedDecisions::new(vec![ScriptedAnswer::YesNo(true)]);
        assert!(decisions.search_text("Search", &cancel).await.is_err());
    }

    #[tokio::test]
    async fn test_cancelled_before_asking() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let decisions = ScriptedDecisions::new(vec![ScriptedAnswer::YesNo(true)]);
        assert!(matches!(
            decisions.yes_no("Ignore?", &cancel).await,
            Err(Error::Cancelled)
        ));
        assert_eq!(decisions.remaining(), 1);
    }
}
