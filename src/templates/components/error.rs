use maud::{html, Markup, DOCTYPE};

/// Standalone error page; it does not use the site layout so it can render
/// even when nothing else can.
pub fn error_page(status: u16, message: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Error " (status) }
                link rel="stylesheet" href="/static/main.css";
            }
            body class="error-page" {
                h1 { "Error " (status) }
                p { (message) }
                p { a href="/" { "← Back to the laundromat finder" } }
            }
        }
    }
}
