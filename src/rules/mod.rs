//! Pure field rules applied by the migrations.

pub mod host;
pub mod timestamp;
pub mod url;

pub use self::host::normalize_host;
pub use self::timestamp::{upgrade_to_millis, Upgrade};
pub use self::url::derive_url;
