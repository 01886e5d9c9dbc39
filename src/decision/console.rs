//! Terminal decision provider.

use super::{Choice, DecisionProvider};
use crate::{Error, Result};
use async_trait::async_trait;
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Asks questions on stdout and reads answers from stdin.
pub struct ConsoleDecisions {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleDecisions {
    /// Create a provider on the process's stdin.
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Print a prompt (no newline) and wait for one line.
    async fn read_line(&self, prompt: &str, cancel: &CancellationToken) -> Result<String> {
        print!("{} ", prompt);
        std::io::stdout().flush()?;

        let mut lines = self.lines.lock().await;
        tokio::select! {
            _ = cancel.cancelled() => Err(Error::Cancelled),
            line = lines.next_line() => match line? {
                Some(line) => Ok(line.trim().to_string()),
                None => Err(Error::Decision("input closed".to_string())),
            },
        }
    }
}

impl Default for ConsoleDecisions {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DecisionProvider for ConsoleDecisions {
    async fn yes_no(&self, prompt: &str, cancel: &CancellationToken) -> Result<bool> {
        let question = format!("{} (y/n)?", prompt);
        loop {
            let answer = self.read_line(&question, cancel).await?;
            if let Some(value) = parse_yes_no(&answer) {
                return Ok(value);
            }
        }
    }

    async fn choose(
        &self,
        prompt: &str,
        options: &[String],
        cancel: &CancellationToken,
    ) -> Result<Choice> {
        println!("{}", prompt.bold());
        for (i, option) in options.iter().enumerate() {
            println!("  {}: {}", (i + 1).to_string().cyan(), option);
        }

        loop {
            let answer = self.read_line("Select (0 to skip):", cancel).await?;
            if let Some(choice) = parse_choice(&answer, options.len()) {
                return Ok(choice);
            }
            println!("{}", "Enter one of the numbers above.".yellow());
        }
    }

    async fn search_text(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        println!("{}", prompt.bold());
        loop {
            let answer = self.read_line("Search for series (0 to skip):", cancel).await?;
            if answer == "0" {
                return Ok(None);
            }
            if !answer.is_empty() {
                return Ok(Some(answer));
            }
        }
    }
}

/// Parse a y/n answer (case-insensitive).
fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.to_uppercase().as_str() {
        "Y" => Some(true),
        "N" => Some(false),
        _ => None,
    }
}

/// Parse a 1-based selection; 0 skips.
fn parse_choice(answer: &str, count: usize) -> Option<Choice> {
    match answer.parse::<usize>().ok()? {
        0 => Some(Choice::Skipped),
        n if n <= count => Some(Choice::Selected(n - 1)),
        _ => None,
    }
}
