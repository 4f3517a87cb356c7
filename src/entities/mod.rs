pub mod prelude;

pub mod site_content;
pub mod users;
