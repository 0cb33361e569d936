use crate::domain::directory::State;
use crate::seo::{PageMeta, StateStats};
use crate::templates::components::card;
use crate::templates::layouts::desktop::{desktop_layout, Head};
use maud::{html, Markup};
use serde_json::Value;

pub fn state_page(
    stats: &StateStats,
    cities: &[crate::domain::directory::City],
    meta: &PageMeta,
    schema: &Value,
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
                nav class="breadcrumbs" { a href="/" { "Home" } }
                h1 { (meta.heading) }
                p class="lead" { (meta.intro) }

                (card(&format!("Cities in {}", stats.state.name), html! {
                    ul class="columns" {
                        @for c in cities {
                            li {
                                a href=(format!("/cities/{}", c.slug)) { (c.name) }
                                " (" (c.laundry_count) ")"
                            }
                        }
                    }
                }))
            }
        },
    )
}

pub fn states_index_page(states: &[State], signed_in: bool) -> Markup {
    desktop_layout(
        Head {
            title: "Laundromats by state",
            description: Some("Browse laundromat listings in every US state."),
            signed_in,
            ..Head::default()
        },
        html! {
            main class="container" {
                h1 { "Laundromats by state" }
                ul class="columns" {
                    @for s in states {
                        li {
                            a href=(format!("/states/{}", s.abbr.to_lowercase())) { (s.name) }
                            " (" (s.laundry_count) ")"
                        }
                    }
                }
            }
        },
    )
}
