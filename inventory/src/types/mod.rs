//! Value types shared by the store, the listing code and the binary.

mod ids;
mod record;

pub use ids::ItemId;
pub use record::{Field, Record, RecordError};
