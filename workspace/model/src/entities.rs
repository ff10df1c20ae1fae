//! SeaORM entities backing the local key-value storage.

pub mod kv_entry;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::kv_entry::Entity as KvEntry;
}
