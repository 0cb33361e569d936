use crate::domain::laundromat::Laundromat;
use crate::domain::subscription::{Subscription, Tier};
use crate::templates::layouts::desktop::{desktop_layout, Head};
use chrono::DateTime;
use maud::{html, Markup};

pub struct DashboardVm {
    pub email: String,
    pub listings: Vec<(Laundromat, Option<Subscription>)>,
}

fn format_date(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

pub fn dashboard_page(vm: &DashboardVm) -> Markup {
    desktop_layout(
        Head {
            title: "Dashboard",
            signed_in: true,
            ..Head::default()
        },
        html! {
            main class="container" {
                h1 { "Your listings" }
                p { "Signed in as " strong { (vm.email) } }

                @if vm.listings.is_empty() {
                    p class="muted" {
                        "You don't manage any laundromats yet. Find yours on the "
                        a href="/" { "search page" }
                        " and claim it, or add a new one below."
                    }
                }

                @for (listing, sub) in &vm.listings {
                    (listing_editor(listing, sub.as_ref(), None))
                }

                (new_listing_form())
            }
        },
    )
}

/// One owned listing with its edit and upgrade forms. Returned on its own
/// after an HTMX save so the section swaps in place.
pub fn listing_editor(l: &Laundromat, sub: Option<&Subscription>, notice: Option<&str>) -> Markup {
    let services = l.services.iter().cloned().collect::<Vec<_>>().join(", ");
    html! {
        section class="card" id=(format!("listing-{}", l.id)) {
            h3 {
                a href=(format!("/laundromats/{}", l.slug)) { (l.name) }
            }
            p class="muted" { (l.full_address()) }
            @if let Some(msg) = notice {
                p class="notice" { (msg) }
            }

            form
                method="post"
                action=(format!("/dashboard/listings/{}", l.id))
                hx-post=(format!("/dashboard/listings/{}", l.id))
                hx-target=(format!("#listing-{}", l.id))
                hx-swap="outerHTML"
            {
                label { "Phone" input type="tel" name="phone" value=[l.phone.as_deref()]; }
                label { "Website" input type="url" name="website" value=[l.website.as_deref()]; }
                label { "Services (comma separated)" input type="text" name="services" value=(services); }
                label { "Description" textarea name="description" { (l.description.as_deref().unwrap_or("")) } }
                button type="submit" { "Save" }
            }

            div class="plan" {
                @match sub {
                    Some(s) => p {
                        "Plan: " strong { (s.tier.label()) }
                        " until " (format_date(s.end_date))
                        @if s.auto_renew { " (renews automatically)" }
                    },
                    None => p { "Plan: " strong { (Tier::Basic.label()) } },
                }
                ul class="muted" {
                    @for perk in sub.map(|s| s.tier).unwrap_or(Tier::Basic).perks() {
                        li { (perk) }
                    }
                }
                form method="post" action=(format!("/dashboard/listings/{}/subscribe", l.id)) {
                    select name="tier" {
                        @for tier in Tier::ALL {
                            option value=(tier.as_str()) selected[sub.map(|s| s.tier) == Some(tier)] {
                                (tier.label()) " ($" (tier.price_cents() / 100) "." (format!("{:02}", tier.price_cents() % 100)) ")"
                            }
                        }
                    }
                    label { input type="checkbox" name="auto_renew" value="1"; " Renew automatically" }
                    button type="submit" { "Update plan" }
                }
            }
        }
    }
}

fn new_listing_form() -> Markup {
    html! {
        section class="card" {
            h3 { "Add a laundromat" }
            form method="post" action="/dashboard/listings" {
                label { "Name" input type="text" name="name" required; }
                label { "Street address" input type="text" name="address" required; }
                label { "City" input type="text" name="city" required; }
                label { "State" input type="text" name="state" maxlength="2" required; }
                label { "ZIP" input type="text" name="zip"; }
                label { "Phone" input type="tel" name="phone"; }
                label { "Website" input type="url" name="website"; }
                label { "Latitude" input type="text" name="latitude"; }
                label { "Longitude" input type="text" name="longitude"; }
                button type="submit" class="primary" { "Create listing" }
            }
        }
    }
}
