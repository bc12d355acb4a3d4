// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic schema-search usage example.
//!
//! Demonstrates:
//! 1. Declaring a schema with searchable fields
//! 2. Registering it and inspecting the collected paths
//! 3. Searching with a callback, with a filter, and by chaining
//! 4. Rendering the combined constraint for other stores
//!
//! # Run
//!
//! ```bash
//! RUST_LOG=debug cargo run --example basic_usage
//! ```

use std::sync::Arc;

use schema_search::storage::DocumentStore;
use schema_search::{Document, FieldDef, InMemoryStore, ModelRegistry, Query, Schema, SearchConfig};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║           schema-search: Basic Usage Example                  ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Declare and register
    // ─────────────────────────────────────────────────────────────────────────
    let country = Schema::new().field(FieldDef::string("name").searchable());
    let city = Schema::new()
        .field(FieldDef::string("name").searchable())
        .field(FieldDef::nested("country", country));
    let sister = Arc::new(Schema::new().field(FieldDef::string("name").searchable()));

    let schema = Schema::new()
        .field(FieldDef::string("name").searchable())
        .field(FieldDef::string("address").searchable())
        .field(FieldDef::number("age"))
        .field(FieldDef::nested("residence", Schema::new().field(FieldDef::nested("city", city))))
        .field(FieldDef::nested_array("sisters", sister));

    let registry = ModelRegistry::new();
    let people = registry.register("person", schema, SearchConfig::default());
    println!("📦 Searchable fields: {:?}", people.searchable_fields());

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Load some documents
    // ─────────────────────────────────────────────────────────────────────────
    let store = InMemoryStore::new();
    store
        .insert_many(vec![
            Document::new(
                "p1",
                json!({
                    "name": "John",
                    "address": "123 Main Street",
                    "age": 30,
                    "residence": {"city": {"name": "Nairobi", "country": {"name": "Kenya"}}},
                    "sisters": [{"name": "Amy"}, {"name": "Zoe"}]
                }),
            ),
            Document::new(
                "p2",
                json!({
                    "name": "Jane",
                    "address": "9 Elm Road",
                    "age": 41,
                    "residence": {"city": {"name": "Lyon", "country": {"name": "France"}}},
                    "sisters": []
                }),
            ),
        ])
        .await?;
    println!("📝 Loaded {} documents\n", store.len());

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Search
    // ─────────────────────────────────────────────────────────────────────────
    for term in ["main", "ken", "amy", "999"] {
        people
            .search_with(term, None, &store, |result| match result {
                Ok(found) => {
                    let ids: Vec<&str> = found.iter().map(|d| d.id.as_str()).collect();
                    println!("🔍 {:>5} → {:?}", term, ids);
                }
                Err(e) => println!("❌ {:>5} → {}", term, e),
            })
            .await;
    }

    let adults = Query::numeric_range("age", Some(35.0), None);
    let found = people.search_exec("e", Some(&adults), &store).await?;
    println!("\n🔍 'e' AND age >= 35 → {} result(s)", found.len());

    let chained = people
        .search("j", None)?
        .and(Query::field_eq("residence.city.country.name", "Kenya"))?
        .limit(10);
    println!("🔍 'j' AND country = Kenya → {} result(s)", chained.exec(&store).await?.len());

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Render for other stores
    // ─────────────────────────────────────────────────────────────────────────
    let search = people.search("amy", Some(&adults))?;
    println!("\n📄 Filter document:\n{}", serde_json::to_string_pretty(&search.to_filter_document())?);

    let sql = search.to_sql("data");
    println!("\n🗄️  SQL: WHERE {}", sql.clause);
    println!("    params: {:?}", sql.params);

    // Cast failures surface before anything runs
    match people.search("main", Some(&Query::field_eq("age", "thirty"))) {
        Ok(_) => println!("\n⚠️  Expected a cast error"),
        Err(e) => println!("\n✅ Rejected filter: {}", e),
    }

    println!("\n✅ Done\n");
    Ok(())
}
