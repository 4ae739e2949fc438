//! Admin Categories Page Component
//!
//! Category list with inline create/rename/delete.

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::browser;
use crate::components::{AdminTokenBar, DeleteConfirmButton};
use crate::models::{Category, CategoryInput};
use crate::store::{store_remove_category, store_upsert_category, use_app_store, AppStateStoreFields};

/// URL slug from a display name: "Jujutsu Kaisen!" -> "jujutsu-kaisen"
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[component]
pub fn AdminCategoriesPage() -> impl IntoView {
    let store = use_app_store();
    let (name, set_name) = signal(String::new());
    let (description, set_description) = signal(String::new());

    spawn_local(async move {
        match api::list_categories().await {
            Ok(categories) => *store.categories().write() = categories,
            Err(e) => browser::alert(&e),
        }
    });

    let create = move |ev: SubmitEvent| {
        ev.prevent_default();
        let title = name.get();
        if title.trim().is_empty() {
            return;
        }
        let input = CategoryInput {
            slug: slugify(&title),
            name: title.trim().to_string(),
            description: Some(description.get()).filter(|d| !d.trim().is_empty()),
        };
        spawn_local(async move {
            match api::create_category(&input).await {
                Ok(created) => {
                    log::info!("admin: category {} created", created.id);
                    store_upsert_category(&store, created);
                    set_name.set(String::new());
                    set_description.set(String::new());
                }
                Err(e) => browser::alert(&e),
            }
        });
    };

    view! {
        <section class="admin">
            <h1>"Categories"</h1>
            <AdminTokenBar />
            <form class="admin-form inline" on:submit=create>
                <input
                    type="text"
                    placeholder="Name"
                    prop:value=move || name.get()
                    on:input=move |ev| set_name.set(event_target_value(&ev))
                />
                <input
                    type="text"
                    placeholder="Description"
                    prop:value=move || description.get()
                    on:input=move |ev| set_description.set(event_target_value(&ev))
                />
                <button type="submit" class="btn btn-primary">"Add category"</button>
            </form>
            <table class="admin-table">
                <thead>
                    <tr><th>"Name"</th><th>"Slug"</th><th>"Description"</th><th></th></tr>
                </thead>
                <tbody>
                    <For
                        each=move || store.categories().get()
                        key=|c| (c.id.clone(), c.name.clone())
                        children=|c| view! { <CategoryRow category=c /> }
                    />
                </tbody>
            </table>
        </section>
    }
}

#[component]
fn CategoryRow(category: Category) -> impl IntoView {
    let store = use_app_store();
    let (editing, set_editing) = signal(false);
    let (name, set_name) = signal(category.name.clone());
    let id = category.id.clone();
    let delete_id = category.id.clone();
    let slug = category.slug.clone();
    let description = category.description.clone();

    let save = move |_| {
        let input = CategoryInput {
            name: name.get().trim().to_string(),
            slug: slugify(&name.get()),
            description: description.clone(),
        };
        let id = id.clone();
        spawn_local(async move {
            match api::update_category(&id, &input).await {
                Ok(updated) => {
                    store_upsert_category(&store, updated);
                    set_editing.set(false);
                }
                Err(e) => browser::alert(&e),
            }
        });
    };

    let delete = Callback::new(move |_: ()| {
        let id = delete_id.clone();
        spawn_local(async move {
            match api::delete_category(&id).await {
                Ok(()) => store_remove_category(&store, &id),
                Err(e) => browser::alert(&e),
            }
        });
    });

    view! {
        <tr>
            <td>
                <Show when=move || editing.get() fallback=move || view! { <span>{move || name.get()}</span> }>
                    <input
                        type="text"
                        prop:value=move || name.get()
                        on:input=move |ev| set_name.set(event_target_value(&ev))
                    />
                </Show>
            </td>
            <td>{slug}</td>
            <td>{category.description.clone().unwrap_or_default()}</td>
            <td class="row-actions">
                <Show
                    when=move || editing.get()
                    fallback=move || view! { <button class="btn btn-small" on:click=move |_| set_editing.set(true)>"Edit"</button> }
                >
                    <button class="btn btn-small btn-primary" on:click=save.clone()>"Save"</button>
                    <button class="btn btn-small" on:click=move |_| set_editing.set(false)>"Cancel"</button>
                </Show>
                <DeleteConfirmButton on_confirm=delete />
            </td>
        </tr>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Jujutsu Kaisen!"), "jujutsu-kaisen");
        assert_eq!(slugify("  One   Piece "), "one-piece");
        assert_eq!(slugify("Naruto: Shippuden"), "naruto-shippuden");
    }
}
