//! Text extraction and line-count-aware reinjection over event commands

use super::commands::{CODE_SHOW_CHOICES, CODE_SHOW_TEXT, CommandList};
use super::replacements::Replacements;
use crate::error::Result;
use crate::model::BlockKind;

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Collect the `parameters[0]` lines of the 401 run starting at `start`.
fn read_run<L: CommandList + ?Sized>(list: &L, start: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut index = start;
    while index < list.len() && list.code(index) == Some(CODE_SHOW_TEXT) {
        lines.push(list.text(index).unwrap_or_default());
        index += 1;
    }
    lines
}

/// Scan a command list and report every translatable block.
///
/// A run of consecutive 401 commands is reported once, lines joined with
/// `\n`. Each non-blank choice of a 102 command is reported on its own.
pub fn extract_commands<L, F>(list: &L, mut emit: F)
where
    L: CommandList + ?Sized,
    F: FnMut(BlockKind, String),
{
    let mut index = 0;
    while index < list.len() {
        match list.code(index) {
            Some(CODE_SHOW_TEXT) => {
                let lines = read_run(list, index);
                index += lines.len();
                let text = lines.join("\n");
                if !is_blank(&text) {
                    emit(BlockKind::ShowText, text);
                }
            }
            Some(CODE_SHOW_CHOICES) => {
                for choice in list.choices(index).into_iter().flatten().flatten() {
                    if !is_blank(&choice) {
                        emit(BlockKind::Choice, choice);
                    }
                }
                index += 1;
            }
            _ => index += 1,
        }
    }
}

/// Rewrite a command list in place from `replacements`.
///
/// Returns the number of blocks and choices rewritten.
pub fn apply_commands<L>(list: &mut L, replacements: &mut Replacements) -> Result<usize>
where
    L: CommandList + ?Sized,
{
    let mut rewritten = 0;
    let mut index = 0;

    while index < list.len() {
        match list.code(index) {
            Some(CODE_SHOW_TEXT) => {
                let lines = read_run(list, index);
                let run = lines.len();
                let original = lines.join("\n");
                let replacement = if is_blank(&original) {
                    None
                } else {
                    replacements.take(BlockKind::ShowText, &original)
                };

                let Some(replacement) = replacement else {
                    index += run;
                    continue;
                };

                let normalized = replacement.replace("\r\n", "\n");
                let new_lines: Vec<&str> = normalized.split('\n').collect();
                let count = new_lines.len();

                for (offset, line) in new_lines.iter().take(run).enumerate() {
                    list.set_text(index + offset, line)?;
                }
                if count > run {
                    // Extra lines are copies of the run's last command
                    let template = index + run - 1;
                    for (offset, line) in new_lines.iter().enumerate().skip(run) {
                        list.insert_clone(template, index + offset)?;
                        list.set_text(index + offset, line)?;
                    }
                } else {
                    for _ in count..run {
                        list.remove(index + count)?;
                    }
                }

                rewritten += 1;
                index += count;
            }
            Some(CODE_SHOW_CHOICES) => {
                let choices = list.choices(index).unwrap_or_default();
                for (position, choice) in choices.iter().enumerate() {
                    if let Some(choice) = choice
                        && !is_blank(choice)
                        && let Some(replacement) = replacements.take(BlockKind::Choice, choice)
                    {
                        list.set_choice(index, position, &replacement)?;
                        rewritten += 1;
                    }
                }
                index += 1;
            }
            _ => index += 1,
        }
    }

    Ok(rewritten)
}
