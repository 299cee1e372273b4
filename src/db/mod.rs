//! Database layer (Firestore).

pub mod firestore;

pub use firestore::{SavedListOp, UserStore};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
}
