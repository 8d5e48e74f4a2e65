//! Command pipeline
//!
//! text -> CommandRegistry (first match wins) -> ResolvedCommand
//!      -> TokenSource -> Command::handle -> reply

pub mod context;
pub mod create_event;
pub mod executor;
pub mod list_events;
pub mod params;
pub mod parse;
pub mod registry;

pub use context::CommandContext;
pub use create_event::CreateEvent;
pub use executor::CommandExecutor;
pub use list_events::ListEvents;
pub use params::{CommandParams, ListLabel, ListQuery, NewEvent};
pub use registry::{CatalogEntry, Command, CommandRegistry, ResolvedCommand};

/// Built-in commands in resolution order
///
/// The structured create pattern goes first: "오늘 3시 일정 추가" also
/// satisfies the list keywords and must still create an event.
pub fn builtin_registry() -> CommandRegistry {
    CommandRegistry::new(vec![Box::new(CreateEvent), Box::new(ListEvents)])
}
