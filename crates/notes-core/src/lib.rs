pub mod error;
pub mod models;
pub mod page;
pub mod service;
#[cfg(test)]
mod testutil;
pub mod traits;
pub mod validation;

pub use error::AppError;
pub use models::{NewNote, Note};
pub use page::{Page, PageLimits, PageRequest};
pub use service::NoteService;
pub use traits::NoteStore;
pub use validation::{Validate, Violation};
