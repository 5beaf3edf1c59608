pub mod biological_replicas;
pub mod groups;
pub mod measurements;
pub mod studies;
