//! Form reveal example - scroll to the first error and focus its input
//!
//! Needs a Chrome started with --remote-debugging-port=9222.

use formnav_browser::session::{BrowserSession, SessionConfig};
use formnav_page::RevealOptions;

/// A checkout form tall enough that the error sits below the fold.
const CHECKOUT_PAGE: &str = "data:text/html,\
<h1>Checkout</h1>\
<form id=\"checkout\">\
<p><label>Name <input name=\"name\"></label></p>\
<div style=\"height:900px\">lots of other fields</div>\
<div class=\"error\">Card number is invalid \
<input name=\"card\" aria-invalid=\"true\"></div>\
<p><label>Notes <textarea name=\"notes\"></textarea></label></p>\
</form>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = SessionConfig {
        id: "reveal-example".to_string(),
        cdp_url: "ws://localhost:9222".to_string(),
    };

    println!("Creating browser session: {}", config.id);
    let session = BrowserSession::new(config);

    // Subscribe to events before connecting
    let mut event_rx = session.event_bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            println!("📢 Event: {:?}", event);
        }
    });

    session.connect().await?;
    println!("✅ Connected");

    let tab = session.new_tab(Some(CHECKOUT_PAGE.to_string())).await?;
    println!("📄 Opened checkout tab: {}", tab);

    // Let the page settle before querying it
    tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;

    let revealed = session
        .reveal_form_errors(Some("checkout"), &RevealOptions::default())
        .await?;
    println!("🔍 Error revealed: {}", revealed);

    // The focus fires 300ms after the scroll request; wait it out
    tokio::time::sleep(tokio::time::Duration::from_millis(600)).await;

    if let Some(current) = session.current_session().await {
        let active = current
            .evaluate("document.activeElement && document.activeElement.name")
            .await?;
        println!("⌨️  Focused field: {}", active);
    }

    session.close().await?;
    println!("🛑 Session closed");

    Ok(())
}
