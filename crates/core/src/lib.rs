pub mod error;
pub mod model;
pub mod schema;

pub use error::{AssetUrlError, Result};
pub use model::{AssetUrlBranch, AssetUrlChain, Kv};
pub use model::{MAX_KEY_CHARS, MAX_PATH_DEPTH, MAX_VALUE_CHARS};
pub use schema::{AssetUrlSchema, BranchId, ResolvedBranch};
