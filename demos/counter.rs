//! Counter Example - build a page live, click it, export it
//!
//! This example demonstrates the full round trip:
//! - A state cell with a listener
//! - A button whose click behavior runs natively and exports as script
//! - A derived label that follows the state signal
//! - Writing the frozen page to disk
//!
//! Run with: RUST_LOG=debug cargo run --example counter -- [output dir]

use serde_json::Value;
use spark_page::{AppConfig, Application, DirectorySink, NodeConfig, Platform, style_bag};
use spark_signals::derived;
use tracing_subscriber::EnvFilter;

fn main() -> spark_page::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== spark-page Counter Example ===\n");

    let mut app = Application::new(AppConfig::default().with_title("Counter").with_lang("en"));
    app.create_variable("accent", "#3b82f6");
    app.set_to_root(&style_bag! {
        "alignItems" => "center",
        "justifyContent" => "center",
        "gap" => "1rem",
    })?;

    app.add_style(".btn", style_bag! {
        "backgroundColor" => "var(--accent)",
        "color" => "white",
        "hover" => [("opacity", "0.8")],
    });
    app.publish_style(".btn");

    // State
    let count = app.add_state("count", 0)?;
    let label = derived({
        let signal = count.signal();
        move || format!("Count: {}", signal.get())
    });

    // Behaviors
    let increment = app.behavior_with("(event) => { count.set(count.get() + 1); }", {
        let count = count.clone();
        move |_| {
            count.set(count.get().as_i64().unwrap_or(0) + 1);
            Ok(())
        }
    });
    let show = app.behavior("(val) => { display.textContent = val; }");
    count.add_listener(&show);

    // Tree
    let display = app.create("span", NodeConfig::new(), "0", Some("display"))?;
    let button = app.create("button", NodeConfig::new().style(".btn").on("click", &increment), "+1", Some("plus"))?;
    app.append_child(display);
    app.append_child(button);

    // Simulated clicks
    for _ in 0..3 {
        let report = app.dispatch(button, "click", &Value::Null);
        println!("click delivered to {} behavior(s)", report.delivered);
    }
    println!("{}", label.get());

    if let Some(handle) = app.node_handle(display) {
        let text = count.get().to_string();
        app.platform_mut().set_text_content(handle, &text);
    }

    let dir = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let mut sink = DirectorySink::new(&dir);
    let name = app.export_to(&mut sink, None)?;
    println!("\nwrote {}", sink.path_for(&name).display());

    Ok(())
}
