use std::{
    fmt,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use crate::cli::core::{CliError, CliMode, LoopControl, ShellContext};
use crate::cli::output::info as output_info;

/// Set to run the shell non-interactively over commands read from stdin.
pub const SCRIPT_ENV: &str = "SITE_LEDGER_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<LedgerCompleter, DefaultHistory>::new()?;
    editor.set_helper(Some(LedgerCompleter::new(context.command_names())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    loop {
        if !context.running {
            break;
        }
        if let Some(helper) = editor.helper_mut() {
            helper.subjects = context.subject_names();
        }
        let prompt = context.prompt();
        let line = editor.readline(&prompt);

        match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                editor.add_history_entry(trimmed).ok();

                match context.process_line(trimmed) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => context.report_error(err),
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match context.process_line(trimmed) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err),
        }
    }
    Ok(())
}

/// Tab completion: command names for the first word, then active worker names and
/// vehicle labels.
struct LedgerCompleter {
    commands: Vec<String>,
    subjects: Vec<String>,
}

impl LedgerCompleter {
    fn new(names: Vec<&'static str>) -> Self {
        let mut commands: Vec<String> = names.into_iter().map(str::to_string).collect();
        commands.sort();
        commands.dedup();
        Self {
            commands,
            subjects: Vec::new(),
        }
    }

    fn candidates(&self, word: &str, first_word: bool) -> Vec<Pair> {
        let needle = word.to_lowercase();
        let pool = if first_word { &self.commands } else { &self.subjects };
        pool.iter()
            .filter(|name| name.to_lowercase().starts_with(&needle))
            .map(|name| Pair {
                display: name.clone(),
                replacement: shell_words::quote(name).into_owned(),
            })
            .collect()
    }
}

impl Helper for LedgerCompleter {}
impl Hinter for LedgerCompleter {
    type Hint = String;
}
impl Highlighter for LedgerCompleter {}
impl Validator for LedgerCompleter {}

impl Completer for LedgerCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = &line[..pos];
        let start = before
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let first_word = before[..start].trim().is_empty();
        Ok((start, self.candidates(&before[start..], first_word)))
    }
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_commands_first_then_subjects() {
        let mut completer = LedgerCompleter::new(vec!["hire", "help", "attend", "hire"]);
        completer.subjects = vec!["João Silva".into(), "Hilux".into()];

        let commands: Vec<String> = completer
            .candidates("H", true)
            .into_iter()
            .map(|pair| pair.replacement)
            .collect();
        assert_eq!(commands, vec!["help", "hire"]);

        let subjects: Vec<String> = completer
            .candidates("jo", false)
            .into_iter()
            .map(|pair| pair.replacement)
            .collect();
        assert_eq!(subjects, vec!["'João Silva'"]);
    }

    #[test]
    fn quoted_names_stay_together() {
        let tokens = parse_command_line(r#"hire "João Silva" 150 --role Mason"#).unwrap();
        assert_eq!(tokens, vec!["hire", "João Silva", "150", "--role", "Mason"]);
    }

    #[test]
    fn unbalanced_quotes_are_reported() {
        assert!(parse_command_line("hire \"Ana 100").is_err());
    }
}
