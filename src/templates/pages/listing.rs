use crate::domain::directory::Review;
use crate::domain::hours::{hours_text, weekday_name};
use crate::domain::laundromat::Laundromat;
use crate::seo::PageMeta;
use crate::templates::components::rating_badge;
use crate::templates::layouts::desktop::{desktop_layout, Head};
use chrono::Weekday;
use maud::{html, Markup};
use serde_json::Value;

pub struct ListingVm<'a> {
    pub listing: &'a Laundromat,
    pub meta: &'a PageMeta,
    pub schema: &'a Value,
    pub canonical: String,
    pub open_now: Option<bool>,
    pub reviews: &'a [Review],
    pub signed_in: bool,
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn listing_page(vm: &ListingVm<'_>) -> Markup {
    let l = vm.listing;
    desktop_layout(
        Head {
            title: &vm.meta.title,
            description: Some(&vm.meta.description),
            canonical: Some(vm.canonical.clone()),
            json_ld: Some(vm.schema),
            signed_in: vm.signed_in,
        },
        html! {
            main class="container" {
                nav class="breadcrumbs" {
                    a href="/" { "Home" } " › "
                    a href=(format!("/states/{}", l.state.to_lowercase())) { (l.state) } " › "
                    a href=(format!("/cities/{}", l.city_slug)) { (l.city) }
                }
                h1 { (vm.meta.heading) }
                p class="lead" { (vm.meta.intro) }

                section class="card" {
                    p class="address" { (l.full_address()) }
                    (rating_badge(l.rating, l.review_count))
                    @match vm.open_now {
                        Some(true) => p class="open" { "Open now" },
                        Some(false) => p class="closed" { "Closed now" },
                        None => {},
                    }
                    @if let Some(phone) = &l.phone {
                        p { a href=(format!("tel:{}", phone)) { (phone) } }
                    }
                    @if let Some(site) = &l.website {
                        p { a href=(site) rel="nofollow noopener" { "Website" } }
                    }
                }

                @if let Some(desc) = &l.description {
                    section class="card" { p { (desc) } }
                }

                @if let Some(hours) = &l.hours {
                    section class="card" {
                        h2 { "Hours" }
                        table class="hours" {
                            @for day in WEEK {
                                @if let Some(text) = hours_text(hours, day) {
                                    tr { th { (weekday_name(day)) } td { (text) } }
                                }
                            }
                        }
                    }
                }

                @if !l.services.is_empty() {
                    section class="card" {
                        h2 { "Services" }
                        ul { @for s in &l.services { li { (s) } } }
                    }
                }

                @if vm.signed_in && l.owner_id.is_none() {
                    form method="post" action=(format!("/dashboard/listings/{}/claim", l.id)) class="claim" {
                        button type="submit" { "Claim this listing" }
                    }
                }

                section class="card" id="reviews" {
                    h2 { "Reviews" }
                    @if vm.reviews.is_empty() {
                        p class="muted" { "Be the first to review " (l.name) "." }
                    }
                    @for r in vm.reviews {
                        blockquote {
                            strong { (r.rating) "/5" }
                            @if let Some(c) = &r.comment { " " (c) }
                        }
                    }
                }
            }
        },
    )
}
