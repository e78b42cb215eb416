pub mod announcement;
pub mod form;
pub mod role;

pub use announcement::*;
pub use form::*;
pub use role::*;
