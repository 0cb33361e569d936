pub mod check_email;
pub mod city;
pub mod dashboard;
pub mod home;
pub mod listing;
pub mod login;
pub mod state;

pub use check_email::check_email_content;
pub use city::city_page;
pub use dashboard::{dashboard_page, listing_editor, DashboardVm};
pub use home::{home_page, HomeVm};
pub use listing::{listing_page, ListingVm};
pub use login::login_page;
pub use state::{state_page, states_index_page};
