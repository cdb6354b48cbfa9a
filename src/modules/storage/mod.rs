pub mod store;

pub use store::{RecordStore, Slot, SlotGuard, StoreError};
