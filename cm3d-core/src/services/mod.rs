pub mod study_service;

pub use study_service::*;
