//! RGSS class registry
//!
//! Maps Ruby class names found in VX/VX Ace data files to how their text is
//! extracted and rewritten. Supporting another class is one more entry here.

use crate::error::Result;
use crate::formats::marshal::{Graph, MarshalDocument, Node, NodeId, Value, walk_mut};
use crate::model::{BlockKind, GameData};
use crate::script::{GraphCommandList, Replacements, apply_commands, extract_commands};
use std::collections::HashMap;
use std::sync::LazyLock;

/// How a registered class carries text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassHandler {
    /// The field holds an event command array run through the reconciler.
    CommandList(&'static str),
    /// Plain string fields, each with the kind it is reported as.
    TextFields(&'static [(&'static str, BlockKind)]),
}

const BASE_ITEM_FIELDS: &[(&str, BlockKind)] = &[
    ("@name", BlockKind::Name),
    ("@description", BlockKind::Description),
];

static REGISTRY: LazyLock<HashMap<&'static str, ClassHandler>> = LazyLock::new(|| {
    let mut registry = HashMap::new();
    for class in ["RPG::Event::Page", "RPG::CommonEvent", "RPG::Troop::Page"] {
        registry.insert(class, ClassHandler::CommandList("@list"));
    }
    registry.insert(
        "RPG::Map",
        ClassHandler::TextFields(&[("@display_name", BlockKind::MapName)]),
    );
    for class in [
        "RPG::Actor",
        "RPG::Class",
        "RPG::Skill",
        "RPG::Item",
        "RPG::Weapon",
        "RPG::Armor",
        "RPG::Enemy",
        "RPG::State",
    ] {
        registry.insert(class, ClassHandler::TextFields(BASE_ITEM_FIELDS));
    }
    registry
});

/// Handler registered for a class name.
#[must_use]
pub fn handler_for(class: &str) -> Option<ClassHandler> {
    REGISTRY.get(class).copied()
}

/// Visit every object with a registered class, in traversal order.
///
/// The callback sees the object's handler and field values; it may mutate
/// the graph. The first error stops the walk.
fn for_each_handled<F>(doc: &mut MarshalDocument, mut visit: F) -> Result<()>
where
    F: FnMut(&mut Graph, ClassHandler, NodeId) -> Result<()>,
{
    let mut outcome = Ok(());
    let root = doc.root.clone();
    walk_mut(&mut doc.graph, &root, |graph, id| {
        if outcome.is_err() {
            return;
        }
        let handler = match graph.node(id) {
            Some(Node::Object(object)) => handler_for(object.class.as_str()),
            _ => None,
        };
        if let Some(handler) = handler {
            outcome = visit(graph, handler, id);
        }
    });
    outcome
}

fn field(graph: &Graph, id: NodeId, name: &str) -> Option<Value> {
    match graph.node(id)? {
        Node::Object(object) => object.get(name).cloned(),
        _ => None,
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Append every translatable block of one decoded file to `data`.
pub fn extract_document(doc: &mut MarshalDocument, file: &str, data: &mut GameData) -> Result<()> {
    for_each_handled(doc, |graph, handler, id| {
        match handler {
            ClassHandler::CommandList(name) => {
                if let Some(list) = field(graph, id, name)
                    && let Some(view) = GraphCommandList::new(graph, &list)
                {
                    extract_commands(&view, |kind, text| data.push(file, kind, text));
                }
            }
            ClassHandler::TextFields(fields) => {
                for (name, kind) in fields {
                    if let Some(text) = field(graph, id, name).and_then(|v| graph.text(&v))
                        && !is_blank(&text)
                    {
                        data.push(file, *kind, text);
                    }
                }
            }
        }
        Ok(())
    })
}

/// Rewrite one decoded file in place. Returns the number of blocks changed.
pub fn apply_document(doc: &mut MarshalDocument, replacements: &mut Replacements) -> Result<usize> {
    let mut rewritten = 0;
    for_each_handled(doc, |graph, handler, id| {
        match handler {
            ClassHandler::CommandList(name) => {
                if let Some(list) = field(graph, id, name)
                    && let Some(mut view) = GraphCommandList::new(graph, &list)
                {
                    rewritten += apply_commands(&mut view, replacements)?;
                }
            }
            ClassHandler::TextFields(fields) => {
                for (name, kind) in fields {
                    let Some(value) = field(graph, id, name) else {
                        continue;
                    };
                    if let Some(text) = graph.text(&value)
                        && !is_blank(&text)
                        && let Some(replacement) = replacements.take(*kind, &text)
                        && graph.set_text(&value, &replacement)
                    {
                        rewritten += 1;
                    }
                }
            }
        }
        Ok(())
    })?;
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        assert_eq!(handler_for("RPG::CommonEvent"), Some(ClassHandler::CommandList("@list")));
        assert!(matches!(handler_for("RPG::Weapon"), Some(ClassHandler::TextFields(_))));
        assert_eq!(handler_for("RPG::EventCommand"), None);
        assert_eq!(handler_for("RPG::System"), None);
    }

    #[test]
    fn test_extract_map_and_items() {
        let mut graph = Graph::new();
        let display = graph.utf8_string("Forest");
        let map = graph.object("RPG::Map", [("@display_name", display)]);
        let sword_name = graph.utf8_string("Sword");
        let sword_desc = graph.utf8_string("  ");
        let sword = graph.object(
            "RPG::Weapon",
            [("@name", sword_name), ("@description", sword_desc)],
        );
        let root = graph.array(vec![Value::Nil, map, sword]);
        let mut doc = MarshalDocument::new(graph, root);

        let mut data = GameData::new();
        extract_document(&mut doc, "Data.rvdata2", &mut data).unwrap();
        let found: Vec<_> = data
            .units
            .iter()
            .map(|u| (u.context.as_str(), u.original_text.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![("Data.rvdata2 (Map Name)", "Forest"), ("Data.rvdata2 (Name)", "Sword")]
        );
    }
}
