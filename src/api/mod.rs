//! Request builders for the content API's collections.
//!
//! Nothing here keeps state or catches errors: every failure from the
//! transport or the server goes straight back to the caller.

mod article_requests;
mod auth_requests;
mod category_requests;
mod upload_requests;

pub use article_requests::*;
pub use auth_requests::*;
pub use category_requests::*;
pub use upload_requests::*;
