pub mod github;
pub mod traits;
