use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde_json::Value;

/// What goes into `<head>` besides the static assets.
#[derive(Default)]
pub struct Head<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub canonical: Option<String>,
    pub json_ld: Option<&'a Value>,
    pub signed_in: bool,
}

pub fn desktop_layout(head: Head<'_>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (head.title) " | Laundry Finder" }
                @if let Some(desc) = head.description {
                    meta name="description" content=(desc);
                }
                @if let Some(href) = &head.canonical {
                    link rel="canonical" href=(href);
                }
                link rel="stylesheet" href="/static/main.css";
                script src="https://unpkg.com/htmx.org@1.9.12" defer {};
                @if let Some(ld) = head.json_ld {
                    // serde_json escapes '<' only inside strings, so guard the closing tag
                    script type="application/ld+json" {
                        (PreEscaped(ld.to_string().replace("</", "<\\/")))
                    }
                }
            }
            body {
              header class="flex items-center justify-between px-6 py-3 shadow" {
                  a href="/" class="brand" { "Laundry Finder" }
                  nav {
                      ul {
                          li { a href="/" { "Find a laundromat" } }
                          li { a href="/states" { "Browse by state" } }
                      }
                  }
                  @if head.signed_in {
                      div class="inline" {
                          a href="/dashboard" class="text-base font-medium" { "Dashboard" }
                          form method="post" action="/logout" class="inline" {
                              button type="submit" class="link" { "Sign out" }
                          }
                      }
                  } @else {
                      a href="/login" class="text-base font-medium hover:text-blue-600" { "Owner sign in" }
                  }
              }
                (content)
              footer class="px-6 py-4 text-sm" {
                  "Own a laundromat? " a href="/login" { "Claim your listing" } "."
              }
            }
        }
    }
}
