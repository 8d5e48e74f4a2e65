//! Ordered command registry
//!
//! Resolution walks commands in registration order and the first matcher
//! that accepts the text wins. There is no scoring and no conflict
//! detection, so registration order is part of the observable behavior.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::command::context::CommandContext;
use crate::command::params::CommandParams;
use crate::core::error::Result;

/// A named matcher + handler pair
#[async_trait]
pub trait Command: Send + Sync {
    /// Unique id within a registry
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Example phrases, for help text and docs only
    fn examples(&self) -> &'static [&'static str];

    fn tags(&self) -> &'static [&'static str] {
        &[]
    }

    /// Total matcher: fully populated params or `None`, never a partial match
    fn matches(&self, text: &str, now: DateTime<Utc>) -> Option<CommandParams>;

    async fn handle(&self, ctx: &CommandContext<'_>, params: &CommandParams) -> Result<String>;
}

/// A matched command paired with the parameters it extracted
pub struct ResolvedCommand<'a> {
    pub command: &'a dyn Command,
    pub params: CommandParams,
}

impl std::fmt::Debug for ResolvedCommand<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCommand")
            .field("command", &self.command.id())
            .field("params", &self.params)
            .finish()
    }
}

/// Read-only projection of a registered command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub description: &'static str,
    pub examples: Vec<&'static str>,
    pub tags: Vec<&'static str>,
}

/// Immutable ordered list of commands, built once at startup
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new(commands: Vec<Box<dyn Command>>) -> Self {
        Self { commands }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Resolve against the current time
    pub fn resolve(&self, text: &str) -> Option<ResolvedCommand<'_>> {
        self.resolve_at(text, Utc::now())
    }

    /// Resolve with an explicit clock; pure in `text` and `now`
    pub fn resolve_at(&self, text: &str, now: DateTime<Utc>) -> Option<ResolvedCommand<'_>> {
        self.commands.iter().find_map(|command| {
            command.matches(text, now).map(|params| ResolvedCommand {
                command: command.as_ref(),
                params,
            })
        })
    }

    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.commands
            .iter()
            .map(|command| CatalogEntry {
                id: command.id(),
                description: command.description(),
                examples: command.examples().to_vec(),
                tags: command.tags().to_vec(),
            })
            .collect()
    }

    /// Reply shown when nothing matches
    pub fn help_text(&self) -> String {
        let lines: Vec<String> = self
            .catalog()
            .iter()
            .map(|entry| format!("- {}: {}", entry.description, entry.examples.join(", ")))
            .collect();
        format!("지원 명령:\n{}", lines.join("\n"))
    }

    /// Markdown table for docs/COMMANDS.md
    pub fn catalog_markdown(&self) -> String {
        let mut lines = vec![
            "# Command Catalog".to_string(),
            String::new(),
            "자동 생성된 명령어 목록입니다. (calendar-dispatch catalog --format markdown)".to_string(),
            String::new(),
            "| ID | Description | Examples | Tags |".to_string(),
            "| --- | --- | --- | --- |".to_string(),
        ];
        for entry in self.catalog() {
            lines.push(format!(
                "| {} | {} | {} | {} |",
                entry.id,
                entry.description,
                entry.examples.join("<br/>"),
                entry.tags.join(", ")
            ));
        }
        lines.join("\n")
    }
}
