pub mod db;
pub mod preview;

pub use db::DbAdapter;
pub use preview::HttpPreviewAdapter;
