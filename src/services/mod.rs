pub mod link_id;
pub mod link_service;
pub mod stats_service;
