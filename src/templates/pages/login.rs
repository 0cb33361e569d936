use crate::templates::components::email_cta_form;
use crate::templates::layouts::desktop::{desktop_layout, Head};
use maud::{html, Markup};

pub fn login_page(link_ttl_minutes: i64) -> Markup {
    desktop_layout(
        Head {
            title: "Owner sign in",
            ..Head::default()
        },
        html! {
            main class="container narrow" {
                h1 { "Sign in" }
                p class="lead" {
                    "Laundromat owners can claim listings, keep hours and services up to date, and upgrade to a premium placement."
                }

                (email_cta_form(link_ttl_minutes))
            }
        },
    )
}
