mod document;
mod entry;
mod exchange;
mod money;
mod plan;
mod totals;

pub use document::*;
pub use entry::*;
pub use exchange::*;
pub use money::*;
pub use plan::*;
pub use totals::*;
