// templates/pages/home.rs

use crate::domain::directory::State;
use crate::domain::laundromat::Laundromat;
use crate::templates::components::{card, listing_card, listing_list};
use crate::templates::layouts::desktop::{desktop_layout, Head};
use maud::{html, Markup};

pub struct HomeVm<'a> {
    pub query: Option<&'a str>,
    pub results: &'a [Laundromat],
    pub featured: &'a [Laundromat],
    pub states: &'a [State],
    pub signed_in: bool,
}

pub fn home_page(vm: &HomeVm<'_>) -> Markup {
    desktop_layout(
        Head {
            title: "Find a laundromat near you",
            description: Some("Search laundromats by name, city or ZIP code, or find the closest ones to you."),
            signed_in: vm.signed_in,
            ..Head::default()
        },
        html! {
            main class="container" {
                h1 { "Find a laundromat near you" }

                form method="get" action="/" class="search" {
                    input type="search" name="q" value=[vm.query] placeholder="Name, city or ZIP";
                    button type="submit" class="primary" { "Search" }
                }

                @if let Some(q) = vm.query {
                    section id="results" {
                        h2 { "Results for “" (q) "”" }
                        (listing_list(vm.results))
                    }
                }

                @if !vm.featured.is_empty() {
                    (card("Featured laundromats", html! {
                        div class="grid" {
                            @for l in vm.featured {
                                (listing_card(l, None))
                            }
                        }
                    }))
                }

                (card("Browse by state", html! {
                    ul class="columns" {
                        @for s in vm.states {
                            li {
                                a href=(format!("/states/{}", s.abbr.to_lowercase())) { (s.name) }
                                " (" (s.laundry_count) ")"
                            }
                        }
                    }
                }))
            }
        },
    )
}
