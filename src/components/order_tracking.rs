//! Order Tracking Components
//!
//! Guest order lookup by order number + PIN or emailed magic link,
//! with status timeline and invoice view.

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde_json::{Map, Value};
use storefront_core::UserData;

use crate::api;
use crate::browser;
use crate::components::NavLink;
use crate::context::View;
use crate::models::{format_price, OrderStatus, TrackedOrder};
use crate::tracking;

#[component]
pub fn TrackOrderPage() -> impl IntoView {
    let order = RwSignal::new(None::<TrackedOrder>);
    let (error, set_error) = signal::<Option<String>>(None);
    let (loading, set_loading) = signal(false);
    let (order_number, set_order_number) = signal(String::new());
    let (pin, set_pin) = signal(String::new());

    // Emailed links land here with ?token=
    if let Some(token) = browser::query_param("token") {
        set_loading.set(true);
        spawn_local(async move {
            match api::track_order_by_token(&token).await {
                Ok(found) => order.set(Some(found)),
                Err(e) => set_error.set(Some(format!("This link is invalid or has expired. {}", e))),
            }
            set_loading.set(false);
        });
    }

    let lookup = move |ev: SubmitEvent| {
        ev.prevent_default();
        let number = order_number.get();
        let code = pin.get();
        if number.trim().is_empty() || code.trim().is_empty() {
            set_error.set(Some("Enter your order number and PIN.".to_string()));
            return;
        }
        set_loading.set(true);
        set_error.set(None);
        spawn_local(async move {
            match api::track_order_by_pin(&number, &code).await {
                Ok(found) => order.set(Some(found)),
                Err(e) => {
                    order.set(None);
                    set_error.set(Some(e));
                }
            }
            set_loading.set(false);
        });
    };

    view! {
        <section class="track-order">
            <h1>"Track your order"</h1>
            <Show
                when=move || order.with(Option::is_some)
                fallback=move || view! {
                    <form class="track-form" on:submit=lookup>
                        <label class="field">
                            <span>"Order number"</span>
                            <input
                                type="text"
                                placeholder="OT-10234"
                                prop:value=move || order_number.get()
                                on:input=move |ev| set_order_number.set(event_target_value(&ev))
                            />
                        </label>
                        <label class="field">
                            <span>"Tracking PIN"</span>
                            <input
                                type="text"
                                inputmode="numeric"
                                prop:value=move || pin.get()
                                on:input=move |ev| set_pin.set(event_target_value(&ev))
                            />
                        </label>
                        <button type="submit" class="btn btn-primary" disabled=move || loading.get()>
                            {move || if loading.get() { "Looking up..." } else { "Track" }}
                        </button>
                    </form>
                    {move || error.get().map(|e| view! { <p class="error">{e}</p> })}
                    <MagicLinkForm />
                }
            >
                {move || order.get().map(|o| view! { <OrderStatusView order=o /> })}
                <button class="link-btn" on:click=move |_| order.set(None)>"Track another order"</button>
            </Show>
        </section>
    }
}

/// "Forgot your PIN?" - emails a one-time tracking link
#[component]
fn MagicLinkForm() -> impl IntoView {
    let (email, set_email) = signal(String::new());
    let (order_number, set_order_number) = signal(String::new());
    let (message, set_message) = signal::<Option<String>>(None);
    let (sending, set_sending) = signal(false);

    let request = move |ev: SubmitEvent| {
        ev.prevent_default();
        let address = email.get();
        let number = order_number.get();
        if address.trim().is_empty() || number.trim().is_empty() {
            set_message.set(Some("Enter the email and order number used at checkout.".to_string()));
            return;
        }
        set_sending.set(true);
        spawn_local(async move {
            match api::request_magic_link(&address, &number).await {
                Ok(reply) => {
                    let mut params = Map::new();
                    params.insert("content_name".into(), Value::String("order_magic_link".into()));
                    let user = UserData {
                        email: Some(address),
                        ..UserData::default()
                    };
                    tracking::lead(params, &user);
                    set_message.set(Some(reply));
                }
                Err(e) => set_message.set(Some(e)),
            }
            set_sending.set(false);
        });
    };

    view! {
        <details class="magic-link">
            <summary>"Lost your PIN? Get a tracking link by email"</summary>
            <form on:submit=request>
                <input
                    type="email"
                    placeholder="Email"
                    prop:value=move || email.get()
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                />
                <input
                    type="text"
                    placeholder="Order number"
                    prop:value=move || order_number.get()
                    on:input=move |ev| set_order_number.set(event_target_value(&ev))
                />
                <button type="submit" class="btn" disabled=move || sending.get()>"Send link"</button>
            </form>
            {move || message.get().map(|m| view! { <p class="notice">{m}</p> })}
        </details>
    }
}

#[component]
fn OrderStatusView(order: TrackedOrder) -> impl IntoView {
    let (invoice, set_invoice) = signal::<Option<String>>(None);
    let progress = order.status.progress();
    let cancelled = order.status == OrderStatus::Cancelled;
    let order_id = order.id.clone();
    let access_token = order.access_token.clone();
    let has_invoice = access_token.is_some();

    let load_invoice = move |_| {
        let Some(token) = access_token.clone() else {
            return;
        };
        let id = order_id.clone();
        spawn_local(async move {
            match api::invoice_html(&id, &token).await {
                Ok(html) => set_invoice.set(Some(html)),
                Err(e) => browser::alert(&format!("Could not load invoice: {}", e)),
            }
        });
    };

    view! {
        <div class="order-status">
            <h2>"Order " {order.order_number.clone()}</h2>
            {if cancelled {
                view! { <p class="error">"This order was cancelled."</p> }.into_any()
            } else {
                view! {
                    <ol class="status-timeline">
                        {OrderStatus::PIPELINE.iter().enumerate().map(|(i, status)| {
                            let reached = progress.is_some_and(|p| i <= p);
                            let current = progress == Some(i);
                            view! {
                                <li class:reached=reached class:current=current>{status.label()}</li>
                            }
                        }).collect_view()}
                    </ol>
                }.into_any()
            }}
            {order.tracking_number.clone().map(|number| view! {
                <p>
                    {order.courier.clone().unwrap_or_else(|| "Courier".to_string())}
                    " tracking: " <strong>{number}</strong>
                </p>
            })}
            <ul class="order-items">
                {order.items.iter().map(|item| view! {
                    <li>
                        {item.name.clone()}
                        {item.size.clone().map(|s| format!(" ({})", s))}
                        " × " {item.quantity}
                        <span class="price">{format_price(item.price * item.quantity as f64)}</span>
                    </li>
                }).collect_view()}
            </ul>
            <p class="total">"Total: " {format_price(order.totals.total)}</p>
            {(!order.status_history.is_empty()).then(|| view! {
                <ul class="status-history">
                    {order.status_history.iter().map(|update| view! {
                        <li>
                            <time>{update.at.clone()}</time>
                            " " {update.status.label()}
                            {update.note.clone().map(|n| format!(": {}", n))}
                        </li>
                    }).collect_view()}
                </ul>
            })}
            {has_invoice.then(|| view! {
                <button class="btn" on:click=load_invoice>"View invoice"</button>
            })}
            {move || invoice.get().map(|html| view! {
                <iframe class="invoice-frame" title="Invoice" srcdoc=html></iframe>
            })}
        </div>
    }
}

/// Shown after the three-step checkout places an order
#[component]
pub fn OrderPlacedPage(order_number: String, pin: Option<String>) -> impl IntoView {
    view! {
        <section class="order-placed">
            <h1>"Thank you!"</h1>
            <p>"Order " <strong>{order_number}</strong> " has been placed."</p>
            {pin.map(|pin| view! {
                <p>"Your tracking PIN is " <strong>{pin}</strong> ". Keep it to check your order status."</p>
            })}
            <NavLink to=View::TrackOrder class="btn">"Track order"</NavLink>
            <NavLink to=View::home() class="btn btn-primary">"Keep shopping"</NavLink>
        </section>
    }
}
