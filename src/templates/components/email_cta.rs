use maud::{html, Markup};

/// Owner sign-in form. Posts through htmx and swaps the confirmation into
/// `#auth-result`; without JavaScript it falls back to a full page post.
pub fn email_cta_form(link_ttl_minutes: i64) -> Markup {
    html! {
        section class="card" {
            form class="search" method="post" action="/auth/request-link"
                hx-post="/auth/request-link" hx-target="#auth-result" hx-disabled-elt="button"
            {
                label class="sr-only" for="email" { "Owner email" }
                input type="email" id="email" name="email" autocomplete="email"
                    placeholder="owner@yourlaundromat.com" required;
                button type="submit" class="primary" { "Send sign-in link" }
            }
            p class="microcopy" {
                "New owners get an account automatically. Links expire after "
                (link_ttl_minutes) " minutes and work once."
            }
            div id="auth-result" {}
        }
    }
}
