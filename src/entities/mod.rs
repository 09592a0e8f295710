pub mod prelude;

pub mod companies;
pub mod documents;
pub mod share_link_logs;
pub mod share_links;
pub mod users;
