pub use super::companies::Entity as Companies;
pub use super::documents::Entity as Documents;
pub use super::share_link_logs::Entity as ShareLinkLogs;
pub use super::share_links::Entity as ShareLinks;
pub use super::users::Entity as Users;
