//! Admin Products Page Component
//!
//! Product table plus a create/edit form.

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::browser;
use crate::components::{AdminTokenBar, DeleteConfirmButton};
use crate::models::{format_price, Product, ProductInput};
use crate::store::{store_remove_product, store_upsert_product, use_app_store, AppStateStoreFields};

/// Comma-separated form field to list
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Raw form fields; numbers stay text until submit
#[derive(Clone, Debug, Default, PartialEq)]
struct ProductForm {
    name: String,
    description: String,
    price: String,
    compare_at_price: String,
    images: String,
    category: String,
    sizes: String,
    colors: String,
    stock: String,
    customizable: bool,
    featured: bool,
}

impl From<&Product> for ProductForm {
    fn from(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone(),
            price: p.price.to_string(),
            compare_at_price: p.compare_at_price.map(|v| v.to_string()).unwrap_or_default(),
            images: p.images.join(", "),
            category: p.category.clone().unwrap_or_default(),
            sizes: p.sizes.join(", "),
            colors: p.colors.join(", "),
            stock: p.stock.map(|v| v.to_string()).unwrap_or_default(),
            customizable: p.customizable,
            featured: p.featured,
        }
    }
}

impl ProductForm {
    fn to_input(&self) -> Result<ProductInput, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Product name is required.".to_string());
        }
        let price: f64 = self
            .price
            .trim()
            .parse()
            .map_err(|_| "Price must be a number.".to_string())?;
        if price <= 0.0 {
            return Err("Price must be greater than zero.".to_string());
        }
        let optional_number = |raw: &str, label: &str| -> Result<Option<f64>, String> {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse().map(Some).map_err(|_| format!("{} must be a number.", label))
        };
        let compare_at_price = optional_number(&self.compare_at_price, "Compare-at price")?;
        let stock = optional_number(&self.stock, "Stock")?.map(|v| v.max(0.0) as u32);

        Ok(ProductInput {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            price,
            compare_at_price,
            images: split_list(&self.images),
            category: Some(self.category.clone()).filter(|c| !c.is_empty()),
            sizes: split_list(&self.sizes),
            colors: split_list(&self.colors),
            stock,
            customizable: self.customizable,
            featured: self.featured,
        })
    }
}

#[component]
pub fn AdminProductsPage() -> impl IntoView {
    let store = use_app_store();
    let form = RwSignal::new(ProductForm::default());
    let editing = RwSignal::new(None::<String>);
    let (saving, set_saving) = signal(false);

    spawn_local(async move {
        match api::list_products(None).await {
            Ok(products) => *store.products().write() = products,
            Err(e) => browser::alert(&e),
        }
        match api::list_categories().await {
            Ok(categories) => *store.categories().write() = categories,
            Err(e) => log::warn!("admin: categories failed: {}", e),
        }
    });

    let reset = move || {
        form.set(ProductForm::default());
        editing.set(None);
    };

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let input = match form.with(ProductForm::to_input) {
            Ok(input) => input,
            Err(message) => {
                browser::alert(&message);
                return;
            }
        };
        let target = editing.get();
        set_saving.set(true);
        spawn_local(async move {
            let result = match &target {
                Some(id) => api::update_product(id, &input).await,
                None => api::create_product(&input).await,
            };
            match result {
                Ok(saved) => {
                    log::info!("admin: product {} saved", saved.id);
                    store_upsert_product(&store, saved);
                    reset();
                }
                Err(e) => browser::alert(&e),
            }
            set_saving.set(false);
        });
    };

    let text_field = move |label: &'static str,
                           get: fn(&ProductForm) -> String,
                           set: fn(&mut ProductForm, String)| {
        view! {
            <label class="field">
                <span>{label}</span>
                <input
                    type="text"
                    prop:value=move || form.with(get)
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        form.update(|f| set(f, value));
                    }
                />
            </label>
        }
    };

    view! {
        <section class="admin">
            <h1>"Products"</h1>
            <AdminTokenBar />
            <form class="admin-form" on:submit=submit>
                <h2>{move || if editing.with(Option::is_some) { "Edit product" } else { "New product" }}</h2>
                {text_field("Name", |f| f.name.clone(), |f, v| f.name = v)}
                <label class="field">
                    <span>"Description"</span>
                    <textarea
                        prop:value=move || form.with(|f| f.description.clone())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            form.update(|f| f.description = value);
                        }
                    ></textarea>
                </label>
                {text_field("Price", |f| f.price.clone(), |f, v| f.price = v)}
                {text_field("Compare-at price", |f| f.compare_at_price.clone(), |f, v| f.compare_at_price = v)}
                {text_field("Image URLs (comma separated)", |f| f.images.clone(), |f, v| f.images = v)}
                {text_field("Sizes (comma separated)", |f| f.sizes.clone(), |f, v| f.sizes = v)}
                {text_field("Colours (comma separated)", |f| f.colors.clone(), |f, v| f.colors = v)}
                {text_field("Stock", |f| f.stock.clone(), |f, v| f.stock = v)}
                <label class="field">
                    <span>"Category"</span>
                    <select on:change=move |ev| {
                        let value = event_target_value(&ev);
                        form.update(|f| f.category = value);
                    }>
                        <option value="" selected=move || form.with(|f| f.category.is_empty())>"None"</option>
                        <For
                            each=move || store.categories().get()
                            key=|c| c.id.clone()
                            children=move |c| {
                                let id = c.id.clone();
                                view! {
                                    <option value=c.id.clone() selected=move || form.with(|f| f.category == id)>
                                        {c.name}
                                    </option>
                                }
                            }
                        />
                    </select>
                </label>
                <label class="checkbox">
                    <input
                        type="checkbox"
                        prop:checked=move || form.with(|f| f.customizable)
                        on:change=move |ev| {
                            let checked = event_target_checked(&ev);
                            form.update(|f| f.customizable = checked);
                        }
                    />
                    "Customizable"
                </label>
                <label class="checkbox">
                    <input
                        type="checkbox"
                        prop:checked=move || form.with(|f| f.featured)
                        on:change=move |ev| {
                            let checked = event_target_checked(&ev);
                            form.update(|f| f.featured = checked);
                        }
                    />
                    "Featured"
                </label>
                <div class="step-actions">
                    <Show when=move || editing.with(Option::is_some)>
                        <button type="button" class="btn" on:click=move |_| reset()>"Cancel"</button>
                    </Show>
                    <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                        {move || if saving.get() { "Saving..." } else { "Save product" }}
                    </button>
                </div>
            </form>

            <table class="admin-table">
                <thead>
                    <tr><th></th><th>"Name"</th><th>"Price"</th><th>"Stock"</th><th></th></tr>
                </thead>
                <tbody>
                    <For
                        each=move || store.products().get()
                        key=|p| (p.id.clone(), p.name.clone(), p.price.to_bits(), p.stock)
                        children=move |p| {
                            let edit_source = p.clone();
                            let delete_id = p.id.clone();
                            let delete = Callback::new(move |_: ()| {
                                let id = delete_id.clone();
                                spawn_local(async move {
                                    match api::delete_product(&id).await {
                                        Ok(()) => store_remove_product(&store, &id),
                                        Err(e) => browser::alert(&e),
                                    }
                                });
                            });
                            view! {
                                <tr>
                                    <td>{p.image().map(|src| view! { <img class="thumb" src=src alt="" /> })}</td>
                                    <td>{p.name.clone()}</td>
                                    <td>{format_price(p.price)}</td>
                                    <td>{p.stock.map(|s| s.to_string()).unwrap_or_else(|| "∞".to_string())}</td>
                                    <td class="row-actions">
                                        <button
                                            class="btn btn-small"
                                            on:click=move |_| {
                                                form.set(ProductForm::from(&edit_source));
                                                editing.set(Some(edit_source.id.clone()));
                                            }
                                        >
                                            "Edit"
                                        </button>
                                        <DeleteConfirmButton on_confirm=delete />
                                    </td>
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("S, M ,L,,"), vec!["S", "M", "L"]);
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn test_form_to_input() {
        let form = ProductForm {
            name: " Akatsuki Cloud Tee ".into(),
            price: "599".into(),
            sizes: "M, L".into(),
            stock: "12".into(),
            ..ProductForm::default()
        };
        let input = form.to_input().unwrap();
        assert_eq!(input.name, "Akatsuki Cloud Tee");
        assert_eq!(input.price, 599.0);
        assert_eq!(input.sizes, vec!["M", "L"]);
        assert_eq!(input.stock, Some(12));
        assert_eq!(input.category, None);
    }

    #[test]
    fn test_form_rejects_bad_price() {
        let form = ProductForm {
            name: "Tee".into(),
            price: "free".into(),
            ..ProductForm::default()
        };
        assert_eq!(form.to_input().unwrap_err(), "Price must be a number.");
        let zero = ProductForm {
            price: "0".into(),
            ..form
        };
        assert!(zero.to_input().is_err());
    }
}
