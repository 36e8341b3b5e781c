pub mod plan;
pub mod search;
