//! Keyed store driving a todo list

use heropy::Store;
use serde::Serialize;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct AppState {
    todos: Vec<String>,
    filter: String,
    message: String,
}

fn main() -> Result<(), heropy::StoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Store Example: Todo App ===\n");

    let store = Store::<Value>::from_state(&AppState {
        todos: Vec::new(),
        filter: "all".to_string(),
        message: "Nothing to do yet".to_string(),
    })?;

    // A view that only displays state gets a reader.
    let reader = store.reader();
    println!("1. Subscribing views");
    reader.subscribe("todos", |todos: &Value| {
        let count = todos.as_array().map_or(0, Vec::len);
        println!("   [todos] {count} item(s): {todos}");
    });
    reader.subscribe("message", |message: &Value| {
        println!("   [message] {message}");
    });

    // Keep the message in sync with the list.
    let writer = store.clone();
    store.subscribe("todos", move |todos: &Value| {
        let count = todos.as_array().map_or(0, Vec::len);
        if let Err(err) = writer.set("message", json!(format!("{count} thing(s) to do"))) {
            tracing::warn!(error = %err, "failed to update message");
        }
    });

    println!("\n2. Adding todos");
    for title in ["Learn Rust", "Build a router", "Write documentation"] {
        store.update("todos", |todos| {
            if let Some(list) = todos.as_array_mut() {
                list.push(json!(title));
            }
        })?;
    }

    println!("\n3. Changing filter (no subscribers)");
    store.set("filter", json!("active"))?;

    println!("\n4. Writing an undeclared key");
    if let Err(err) = store.set("owner", json!("me")) {
        println!("   rejected: {err}");
    }

    println!("\n5. Final state:");
    println!("   {}", store.to_json()?);

    println!("\n✓ Example complete!");
    Ok(())
}
