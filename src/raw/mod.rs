mod arena;
mod node;
mod tree;

pub(crate) use arena::NodeId;
pub(crate) use tree::{DEFAULT_ORDER, MIN_ORDER, RawRankTree};
