//! A narrow VCS commit adapter: stage, commit, and status, with a commit
//! message templating engine. Push and pull are intentionally out of scope.

pub mod repo;
pub mod template;

pub use repo::VcsAdapter;
pub use template::{render, standard_placeholders, Action};
