//! Interactive choices: disambiguation, branch picking, update prompts and
//! multi-selection for removal.
//!
//! The pipeline only sees the [`Chooser`] trait so tests can script answers.
//! [`TerminalChooser`] is the real implementation: single choices go through
//! `fzf` when it is installed and fall back to a numbered prompt otherwise.

use crate::core::error::Result;
use crate::core::index_parser::IndexParser;
use crate::core::output::print_warning;
use colored::*;
use std::io::{self, BufRead, Write};
use std::process::{Command, Stdio};

/// Answer to "the local branch is behind, what now?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
    /// Default: switch to the branch as it is locally.
    CheckoutOnly,
    /// Fetch and fast-forward before launching.
    Update,
}

pub trait Chooser {
    /// Pick one of `lines`; `None` when the user cancels.
    fn choose(&self, prompt: &str, lines: &[String]) -> Result<Option<usize>>;

    /// Pick any subset of `lines`, starting from `preselected`; `None` when the
    /// user cancels.
    fn choose_many(
        &self,
        prompt: &str,
        lines: &[String],
        preselected: &[bool],
    ) -> Result<Option<Vec<usize>>>;

    fn prompt_update(&self, branch: &str, behind: usize) -> Result<UpdateAction>;
}

/// fzf exits 130 on Esc/Ctrl-C and 1 when nothing matched.
const FZF_CANCEL_CODES: [i32; 2] = [1, 130];

pub struct TerminalChooser {
    finder: String,
}

impl Default for TerminalChooser {
    fn default() -> Self {
        Self {
            finder: "fzf".to_string(),
        }
    }
}

impl TerminalChooser {
    pub fn with_finder(finder: impl Into<String>) -> Self {
        Self {
            finder: finder.into(),
        }
    }

    /// `Ok(None)` when the finder binary is not available.
    fn choose_with_finder(&self, prompt: &str, lines: &[String]) -> Result<Option<Option<usize>>> {
        let spawned = Command::new(&self.finder)
            .args(["--height", "40%", "--reverse", "--prompt"])
            .arg(format!("{prompt} > "))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("{} not found, using numbered prompt", self.finder);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(lines.join("\n").as_bytes())?;
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            let code = output.status.code();
            if !code.is_some_and(|c| FZF_CANCEL_CODES.contains(&c)) {
                log::warn!("{} exited with {:?}", self.finder, code);
            }
            return Ok(Some(None));
        }

        let picked = String::from_utf8_lossy(&output.stdout);
        let picked = picked.trim_end_matches(['\r', '\n']);
        Ok(Some(lines.iter().position(|line| line == picked)))
    }

    fn print_numbered(lines: &[String], marks: Option<&[bool]>) {
        for (i, line) in lines.iter().enumerate() {
            let mark = match marks {
                Some(marks) if marks.get(i).copied().unwrap_or(false) => "[x] ",
                Some(_) => "[ ] ",
                None => "",
            };
            eprintln!(
                "{}{}{} {}{}",
                "[".bright_black(),
                (i + 1).to_string().white(),
                "]".bright_black(),
                mark,
                line
            );
        }
    }
}

fn read_answer(prompt: &str) -> Result<Option<String>> {
    eprint!("\n{} ", prompt.blue());
    io::stderr().flush()?;

    let mut input = String::new();
    let read = io::stdin().lock().read_line(&mut input)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

impl Chooser for TerminalChooser {
    fn choose(&self, prompt: &str, lines: &[String]) -> Result<Option<usize>> {
        if lines.is_empty() {
            return Ok(None);
        }
        if let Some(choice) = self.choose_with_finder(prompt, lines)? {
            return Ok(choice);
        }

        eprintln!("\n{}:\n", prompt.white());
        Self::print_numbered(lines, None);
        loop {
            let answer = match read_answer("Number (empty to cancel):")? {
                Some(answer) if !answer.is_empty() => answer,
                _ => return Ok(None),
            };
            match IndexParser::selection(&answer, lines.len()) {
                Ok(picked) if picked.len() == 1 => return Ok(Some(picked[0])),
                Ok(_) => print_warning("Pick exactly one entry"),
                Err(e) => print_warning(&e.to_string()),
            }
        }
    }

    fn choose_many(
        &self,
        prompt: &str,
        lines: &[String],
        preselected: &[bool],
    ) -> Result<Option<Vec<usize>>> {
        if lines.is_empty() {
            return Ok(None);
        }

        eprintln!("\n{}:\n", prompt.white());
        Self::print_numbered(lines, Some(preselected));
        loop {
            let answer = match read_answer("Numbers like '1 3-5' (Enter keeps [x], q cancels):")? {
                Some(answer) => answer,
                None => return Ok(None),
            };
            if answer.eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            if answer.is_empty() {
                let marked = preselected
                    .iter()
                    .enumerate()
                    .filter(|&(i, &marked)| marked && i < lines.len())
                    .map(|(i, _)| i)
                    .collect();
                return Ok(Some(marked));
            }
            match IndexParser::selection(&answer, lines.len()) {
                Ok(picked) => return Ok(Some(picked)),
                Err(e) => print_warning(&e.to_string()),
            }
        }
    }

    fn prompt_update(&self, branch: &str, behind: usize) -> Result<UpdateAction> {
        let plural = if behind == 1 { "commit" } else { "commits" };
        eprintln!(
            "{} {} is {} {} behind {}",
            "↓".yellow(),
            branch.blue(),
            behind.to_string().white(),
            plural,
            "origin".bright_black()
        );
        let answer = read_answer("[Enter] open as-is, [u] update first:")?;
        Ok(match answer.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("u") | Some("update") => UpdateAction::Update,
            _ => UpdateAction::CheckoutOnly,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_is_canceled() -> Result<()> {
        let chooser = TerminalChooser::default();
        assert_eq!(chooser.choose("Pick", &[])?, None);
        assert_eq!(chooser.choose_many("Pick", &[], &[])?, None);
        Ok(())
    }

    #[test]
    fn test_missing_finder_is_detected() -> Result<()> {
        let chooser = TerminalChooser::with_finder("definitely-not-a-real-finder-binary");
        let lines = vec!["a".to_string()];
        assert_eq!(chooser.choose_with_finder("Pick", &lines)?, None);
        Ok(())
    }
}
