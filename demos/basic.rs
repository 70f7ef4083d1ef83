//! Basic example demonstrating the Smartlogic API client.
//!
//! Run with:
//! ```
//! SMARTLOGIC_API_KEY=your-key SMARTLOGIC_CLIENT_ID=your-client SMARTLOGIC_MODEL=YourModel \
//!     cargo run --example basic -- YourTask
//! ```

use smartlogic::{
    metadata_field_uri, Concept, SmartlogicClient, CONCEPT_SCHEMA_ORGANISATION, TYPE_ORGANISATION,
};

#[tokio::main]
async fn main() -> smartlogic::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    let task = std::env::args().nth(1).unwrap_or_else(|| "Default".to_string());

    println!("Creating Smartlogic client...");
    let client = SmartlogicClient::from_env().await?;
    println!("Connected to: {}", client.base_api_url());
    println!("Model: {}, task: {}", client.model(), task);

    println!("\n--- Creating Concept ---");
    let concept = Concept::new("Example Holdings Ltd", TYPE_ORGANISATION)
        .with_schema(CONCEPT_SCHEMA_ORGANISATION)
        .with_alt_label("Example Holdings")
        .with_description("Created by the smartlogic basic example")
        .with_factset_identifier("EXMPL1-E");
    println!("{}", serde_json::to_string_pretty(&concept)?);
    client.create_concept(&concept, &task).await?;

    println!("\n--- Looking Up By FactSet Identifier ---");
    let field = metadata_field_uri("factsetIdentifier");
    let nodes = client
        .get_concepts_with_custom_metadata(&task, &field, "EXMPL1-E")
        .await?;
    println!("Found {} concepts", nodes.len());

    for node in &nodes {
        let id = node["@id"].as_str().unwrap_or("unknown");
        let name = node["meta:displayName"].as_str().unwrap_or("unnamed");
        println!("  - {} ({})", name, id);
    }

    // Annotate the first match with a TME identifier
    if let Some(id) = nodes
        .first()
        .and_then(|n| n["@id"].as_str())
        .and_then(|uri| uri.rsplit('/').next())
    {
        println!("\n--- Adding Metadata ---");
        client
            .add_concept_metadata_field(id, "TMEIdentifier", "RXhhbXBsZQ==-T04=", &task)
            .await?;
        println!("Added TMEIdentifier to {}", id);
    }

    println!("\nDone!");
    Ok(())
}
