pub mod components;
pub mod layouts;
pub mod pages;

pub use components::{card, email_cta_form, error_page, listing_card};
pub use layouts::desktop::desktop_layout;
