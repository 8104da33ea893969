//! Command lists stored as JSON arrays (RPG Maker MV/MZ)

use super::commands::CommandList;
use crate::error::{Error, Result};
use serde_json::Value;

fn parameters(command: &Value) -> Option<&Vec<Value>> {
    command.get("parameters")?.as_array()
}

fn parameters_mut(list: &mut [Value], index: usize) -> Result<&mut Vec<Value>> {
    list.get_mut(index)
        .and_then(|command| command.get_mut("parameters"))
        .and_then(Value::as_array_mut)
        .ok_or(Error::MalformedCommand {
            index,
            reason: "missing parameters array",
        })
}

impl CommandList for Vec<Value> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn code(&self, index: usize) -> Option<i64> {
        self.get(index)?.get("code")?.as_i64()
    }

    fn text(&self, index: usize) -> Option<String> {
        parameters(self.get(index)?)?
            .first()?
            .as_str()
            .map(str::to_string)
    }

    fn set_text(&mut self, index: usize, text: &str) -> Result<()> {
        let params = parameters_mut(self, index)?;
        match params.first_mut() {
            Some(first) => *first = Value::String(text.to_string()),
            None => params.push(Value::String(text.to_string())),
        }
        Ok(())
    }

    fn choices(&self, index: usize) -> Option<Vec<Option<String>>> {
        let choices = parameters(self.get(index)?)?.first()?.as_array()?;
        Some(
            choices
                .iter()
                .map(|choice| choice.as_str().map(str::to_string))
                .collect(),
        )
    }

    fn set_choice(&mut self, index: usize, choice: usize, text: &str) -> Result<()> {
        let slot = parameters_mut(self, index)?
            .first_mut()
            .and_then(Value::as_array_mut)
            .and_then(|choices| choices.get_mut(choice))
            .ok_or(Error::MalformedCommand {
                index,
                reason: "choice index out of range",
            })?;
        *slot = Value::String(text.to_string());
        Ok(())
    }

    fn insert_clone(&mut self, template: usize, at: usize) -> Result<()> {
        let command = self.get(template).cloned().ok_or(Error::MalformedCommand {
            index: template,
            reason: "template command out of range",
        })?;
        if at > Vec::len(self) {
            return Err(Error::MalformedCommand {
                index: at,
                reason: "insert position out of range",
            });
        }
        self.insert(at, command);
        Ok(())
    }

    fn remove(&mut self, index: usize) -> Result<()> {
        if index >= Vec::len(self) {
            return Err(Error::MalformedCommand {
                index,
                reason: "remove position out of range",
            });
        }
        Vec::remove(self, index);
        Ok(())
    }
}
