use crate::domain::laundromat::Laundromat;
use maud::{html, Markup};

pub fn rating_badge(rating: Option<f64>, review_count: i64) -> Markup {
    html! {
        @match rating {
            Some(r) => span class="rating" { (format!("{r:.1}")) " ★ (" (review_count) ")" },
            None => span class="rating muted" { "No reviews yet" },
        }
    }
}

/// Summary card used by search results, city pages and the home page.
pub fn listing_card(l: &Laundromat, distance_miles: Option<f64>) -> Markup {
    html! {
        article class=(if l.is_featured { "listing-card featured" } else { "listing-card" }) {
            h3 {
                a href=(format!("/laundromats/{}", l.slug)) { (l.name) }
                @if l.is_featured {
                    span class="badge" { "Featured" }
                } @else if l.is_premium {
                    span class="badge" { "Verified" }
                }
            }
            p class="address" { (l.full_address()) }
            (rating_badge(l.rating, l.review_count))
            @if let Some(d) = distance_miles {
                p class="distance" { (format!("{d:.1} mi away")) }
            }
            @if let Some(phone) = &l.phone {
                p class="phone" { a href=(format!("tel:{}", phone)) { (phone) } }
            }
        }
    }
}
