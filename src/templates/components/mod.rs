use crate::domain::laundromat::Laundromat;
use maud::{html, Markup};

pub mod email_cta;
pub mod error;
pub mod listing;

pub use email_cta::email_cta_form;
pub use error::error_page;
pub use listing::{listing_card, rating_badge};

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        div class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

pub fn listing_list(listings: &[Laundromat]) -> Markup {
    html! {
        @if listings.is_empty() {
            p class="muted" { "No laundromats found." }
        } @else {
            ul class="listing-list" {
                @for l in listings {
                    li { (listing_card(l, None)) }
                }
            }
        }
    }
}
