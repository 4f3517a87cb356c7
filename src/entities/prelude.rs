pub use super::site_content::Entity as SiteContent;
pub use super::users::Entity as Users;
