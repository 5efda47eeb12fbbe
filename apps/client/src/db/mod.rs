//! Local SQLite cache and the content provider that fronts it.

pub mod contract;
pub mod error;
pub mod mapping;
pub mod notify;
pub mod provider;
pub mod schema;
pub mod store;
pub mod uri;
pub mod values;

pub use contract::{ConflictPolicy, Resource, ROW_ID};
pub use error::DbError;
pub use mapping::{decode_all, Mapped};
pub use notify::ChangeNotifier;
pub use provider::{Batch, ContentProvider};
pub use store::LocalStore;
pub use uri::ContentUri;
pub use values::{ContentValues, Cursor, CursorRow, Value};
