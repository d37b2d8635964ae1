//! Data models

pub mod user;
pub mod session;
pub mod scan;
pub mod vote;
pub mod comment;
pub mod post;

pub use user::*;
pub use session::*;
pub use scan::*;
pub use vote::*;
pub use comment::*;
pub use post::*;
