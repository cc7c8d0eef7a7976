//! grant-ecr core API interface

mod grant_access;
pub mod model;
pub use grant_access::grant_access;
