use maud::{html, Markup};

/// Partial swapped into `#auth-result` after a sign-in link is requested.
pub fn check_email_content(email: &str) -> Markup {
    html! {
        div class="notice" role="status" {
            p { "Sign-in link sent to " strong { (email) } "." }
            p class="microcopy" { "Open it in this browser to reach your dashboard." }
            a href="/login" { "Use a different email" }
        }
    }
}
