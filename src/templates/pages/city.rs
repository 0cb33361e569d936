use crate::domain::laundromat::Laundromat;
use crate::seo::{CityStats, PageMeta};
use crate::templates::components::{listing_card, rating_badge};
use crate::templates::layouts::desktop::{desktop_layout, Head};
use maud::{html, Markup};
use serde_json::Value;

pub fn city_page(
    stats: &CityStats,
    meta: &PageMeta,
    schema: &Value,
    listings: &[Laundromat],
    canonical: String,
    signed_in: bool,
) -> Markup {
    desktop_layout(
        Head {
            title: &meta.title,
            description: Some(&meta.description),
            canonical: Some(canonical),
            json_ld: Some(schema),
            signed_in,
        },
        html! {
            main class="container" {
                nav class="breadcrumbs" {
                    a href="/" { "Home" } " › "
                    a href=(format!("/states/{}", stats.city.state.to_lowercase())) { (stats.state_name) }
                }
                h1 { (meta.heading) }
                p class="lead" { (meta.intro) }
                p { (rating_badge(stats.average_rating, stats.laundry_count)) }

                @if !stats.top_services.is_empty() {
                    p class="muted" { "Popular services: " (stats.top_services.join(", ")) }
                }

                div class="grid" {
                    @for l in listings {
                        (listing_card(l, None))
                    }
                }
            }
        },
    )
}
