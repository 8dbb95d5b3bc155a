mod queue_item;
mod store;

pub use queue_item::*;
pub use store::*;
