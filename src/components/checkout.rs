//! Checkout Page Component
//!
//! Three-step flow: Shipping -> Payment -> Review.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos::ev::MouseEvent;
use storefront_core::{CheckoutSnapshot, CheckoutStep, OrderTotals, PaymentMethod, ShippingInfo};

use crate::browser::{self, BrowserStorage};
use crate::components::{place_order, OrderDraft, OrderSummary, ShippingForm, StepIndicator};
use crate::config;
use crate::context::{use_app_context, View};
use crate::store::{use_app_store, AppStateStoreFields};
use crate::tracking;

const PAYMENT_METHODS: [PaymentMethod; 2] = [PaymentMethod::CashOnDelivery, PaymentMethod::Online];

#[component]
pub fn CheckoutPage() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let cfg = config::get();

    let snapshot = CheckoutSnapshot::load(&BrowserStorage::Session).unwrap_or_default();
    let step = RwSignal::new(snapshot.step);
    let shipping = RwSignal::new(snapshot.shipping);
    let payment = RwSignal::new(snapshot.payment_method);
    let (placing, set_placing) = signal(false);

    let totals = Memo::new(move |_| {
        OrderTotals::compute(&store.cart().read(), None, cfg.flat_shipping_rate, cfg.free_shipping_threshold)
    });

    {
        let items = store.cart().get_untracked();
        tracking::begin_checkout(&items, totals.get_untracked().total);
    }

    // Survive a reload or sign-in redirect
    Effect::new(move |_| {
        let snapshot = CheckoutSnapshot {
            step: step.get(),
            shipping: shipping.get(),
            payment_method: payment.get(),
            ..CheckoutSnapshot::load(&BrowserStorage::Session).unwrap_or_default()
        };
        if let Err(e) = snapshot.save(&BrowserStorage::Session) {
            log::debug!("checkout: snapshot not saved: {}", e);
        }
    });

    let continue_to_payment = move |_: MouseEvent| match shipping.with(|s| s.validate()) {
        Ok(()) => step.set(CheckoutStep::Payment),
        Err(message) => browser::alert(&message),
    };

    let submit = move |_: MouseEvent| {
        if placing.get() {
            return;
        }
        let draft = OrderDraft {
            items: store.cart().get(),
            shipping: shipping.get(),
            payment_method: payment.get(),
            coupon: None,
            shipping_rate: cfg.flat_shipping_rate,
        };
        set_placing.set(true);
        spawn_local(async move {
            match place_order(draft).await {
                Ok(order) => ctx.navigate(View::OrderPlaced {
                    order_number: order.order_number,
                    pin: order.tracking_pin,
                }),
                Err(message) => {
                    log::warn!("checkout: {}", message);
                    browser::alert(&message);
                    set_placing.set(false);
                }
            }
        });
    };

    let step_labels: Vec<&'static str> = CheckoutStep::ALL.iter().map(|s| s.label()).collect();
    let step_index = Signal::derive(move || step.get().index());

    view! {
        <section class="checkout">
            <h1>"Checkout"</h1>
            <StepIndicator labels=step_labels current=step_index />
            <Show
                when=move || !store.cart().read().is_empty()
                fallback=move || view! {
                    <p class="empty">"Your cart is empty."</p>
                    <button class="btn" on:click=move |_| ctx.navigate(View::home())>"Back to shop"</button>
                }
            >
                <div class="checkout-body">
                    <div class="checkout-step">
                        {move || match step.get() {
                            CheckoutStep::Shipping => view! {
                                <h2>"Shipping address"</h2>
                                <ShippingForm shipping=shipping />
                                <div class="step-actions">
                                    <button class="btn" on:click=move |_| ctx.navigate(View::Cart)>"Back to cart"</button>
                                    <button class="btn btn-primary" on:click=continue_to_payment>"Continue to payment"</button>
                                </div>
                            }.into_any(),
                            CheckoutStep::Payment => view! {
                                <h2>"Payment method"</h2>
                                <PaymentOptions payment=payment />
                                <div class="step-actions">
                                    <button class="btn" on:click=move |_| step.update(|s| *s = s.prev())>"Back"</button>
                                    <button class="btn btn-primary" on:click=move |_| step.update(|s| *s = s.next())>"Review order"</button>
                                </div>
                            }.into_any(),
                            CheckoutStep::Review => view! {
                                <h2>"Review"</h2>
                                <ReviewDetails shipping=shipping payment=payment />
                                <div class="step-actions">
                                    <button class="btn" on:click=move |_| step.update(|s| *s = s.prev())>"Back"</button>
                                    <button class="btn btn-primary" disabled=move || placing.get() on:click=submit>
                                        {move || if placing.get() { "Placing order..." } else { "Place order" }}
                                    </button>
                                </div>
                            }.into_any(),
                        }}
                    </div>
                    <aside>
                        <OrderSummary totals=totals />
                    </aside>
                </div>
            </Show>
        </section>
    }
}

/// Cash on delivery / online radio group
#[component]
pub fn PaymentOptions(payment: RwSignal<PaymentMethod>) -> impl IntoView {
    view! {
        <div class="payment-options">
            {PAYMENT_METHODS.iter().map(|&method| view! {
                <label class="radio">
                    <input
                        type="radio"
                        name="payment"
                        value=method.as_str()
                        prop:checked=move || payment.get() == method
                        on:change=move |_| payment.set(method)
                    />
                    {method.label()}
                </label>
            }).collect_view()}
            {config::get().test_mode.then(|| view! {
                <p class="notice">"Test mode: online payments are simulated."</p>
            })}
        </div>
    }
}

/// Read-only recap of address, payment and cart
#[component]
pub fn ReviewDetails(shipping: RwSignal<ShippingInfo>, payment: RwSignal<PaymentMethod>) -> impl IntoView {
    let store = use_app_store();
    let shipping = shipping.get_untracked();
    let address = [
        shipping.address_line1.clone(),
        shipping.address_line2.clone(),
        format!("{}, {} {}", shipping.city, shipping.state, shipping.postal_code),
    ]
    .into_iter()
    .filter(|line| !line.trim().is_empty())
    .collect::<Vec<_>>()
    .join(", ");

    view! {
        <div class="review">
            <p><strong>{shipping.full_name.clone()}</strong> " · " {shipping.email.clone()} " · " {shipping.phone.clone()}</p>
            <p>{address}</p>
            <p>"Payment: " {move || payment.get().label()}</p>
            <ul class="review-items">
                <For
                    each=move || store.cart().get()
                    key=|item| item.id.clone()
                    children=|item| view! {
                        <li>{item.name.clone()} " × " {item.quantity}</li>
                    }
                />
            </ul>
        </div>
    }
}
