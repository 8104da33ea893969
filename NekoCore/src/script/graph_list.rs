//! Command lists stored as Marshal arrays of `RPG::EventCommand` (VX/VX Ace)

use super::commands::CommandList;
use crate::error::{Error, Result};
use crate::formats::marshal::{Graph, NodeId, Value};

const CODE_FIELD: &str = "@code";
const PARAMETERS_FIELD: &str = "@parameters";

/// A `@list` array inside a decoded graph.
pub struct GraphCommandList<'g> {
    graph: &'g mut Graph,
    list: NodeId,
}

impl<'g> GraphCommandList<'g> {
    /// Wrap the array node `list`. Fails when `list` is not an array.
    pub fn new(graph: &'g mut Graph, list: &Value) -> Option<Self> {
        let list = list.node_id()?;
        graph.array_mut(list)?;
        Some(GraphCommandList { graph, list })
    }

    fn items(&self) -> &[Value] {
        self.graph
            .as_array(&Value::Node(self.list))
            .unwrap_or_default()
    }

    fn parameters(&self, index: usize) -> Option<&[Value]> {
        let command = self.graph.as_object(self.items().get(index)?)?;
        self.graph.as_array(command.get(PARAMETERS_FIELD)?)
    }

    fn first_parameter(&self, index: usize) -> Result<Value> {
        self.parameters(index)
            .and_then(|params| params.first())
            .cloned()
            .ok_or(Error::MalformedCommand {
                index,
                reason: "missing parameters array",
            })
    }
}

impl CommandList for GraphCommandList<'_> {
    fn len(&self) -> usize {
        self.items().len()
    }

    fn code(&self, index: usize) -> Option<i64> {
        self.graph
            .as_object(self.items().get(index)?)?
            .get(CODE_FIELD)?
            .as_int()
    }

    fn text(&self, index: usize) -> Option<String> {
        self.graph.text(self.parameters(index)?.first()?)
    }

    fn set_text(&mut self, index: usize, text: &str) -> Result<()> {
        let first = self.first_parameter(index)?;
        if self.graph.set_text(&first, text) {
            Ok(())
        } else {
            Err(Error::MalformedCommand {
                index,
                reason: "first parameter is not a string",
            })
        }
    }

    fn choices(&self, index: usize) -> Option<Vec<Option<String>>> {
        let choices = self.graph.as_array(self.parameters(index)?.first()?)?;
        Some(choices.iter().map(|choice| self.graph.text(choice)).collect())
    }

    fn set_choice(&mut self, index: usize, choice: usize, text: &str) -> Result<()> {
        let first = self.first_parameter(index)?;
        let target = self
            .graph
            .as_array(&first)
            .and_then(|choices| choices.get(choice))
            .cloned()
            .ok_or(Error::MalformedCommand {
                index,
                reason: "choice index out of range",
            })?;
        if self.graph.set_text(&target, text) {
            Ok(())
        } else {
            Err(Error::MalformedCommand {
                index,
                reason: "choice is not a string",
            })
        }
    }

    fn insert_clone(&mut self, template: usize, at: usize) -> Result<()> {
        let command = self.items().get(template).cloned().ok_or(Error::MalformedCommand {
            index: template,
            reason: "template command out of range",
        })?;
        let copy = self.graph.deep_clone(&command);
        let items = self
            .graph
            .array_mut(self.list)
            .filter(|items| at <= items.len())
            .ok_or(Error::MalformedCommand {
                index: at,
                reason: "insert position out of range",
            })?;
        items.insert(at, copy);
        Ok(())
    }

    fn remove(&mut self, index: usize) -> Result<()> {
        let items = self
            .graph
            .array_mut(self.list)
            .filter(|items| index < items.len())
            .ok_or(Error::MalformedCommand {
                index,
                reason: "remove position out of range",
            })?;
        items.remove(index);
        Ok(())
    }
}
