pub mod config;
pub mod error;
pub mod db;
pub mod store;
pub mod graph;
pub mod resolver;
pub mod layout;
pub mod session;
pub mod http;

pub use config::Config;
pub use error::{LoregraphError, Result};
pub use graph::{EntityKind, GraphDelta, GraphEdge, GraphNode, NodeKind};
pub use resolver::Resolver;
pub use session::GraphSession;
