//! Domain layer: outline entities and conversion logic
//!
//! This layer is independent of external concerns (no file I/O, no CLI, no config loading).
//! It reads lopdf object graphs handed to it but never opens or saves documents.

pub mod arena;
pub mod builder;
pub mod destination;
pub mod display;
pub mod entities;
pub mod error;
pub mod names;
pub mod objects;
pub mod parser;
pub mod serializer;

pub use arena::{NodeData, TreeArena, TreeNode};
pub use builder::TreeBuilder;
pub use destination::{DestinationResolver, PageLookup};
pub use display::ToTreeString;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use names::{NamesCollector, DEFAULT_MAX_NAME_TREE_DEPTH};
pub use parser::{IndentParser, ParsedLine};
pub use serializer::serialize;
