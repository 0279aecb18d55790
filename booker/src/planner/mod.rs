pub mod chunker;
pub mod quota;
pub mod types;
