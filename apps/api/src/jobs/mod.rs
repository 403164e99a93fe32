pub mod handlers;
pub mod queries;
pub mod recommend;
pub mod stats;
