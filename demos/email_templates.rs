//! Template registry example for lazy-registry.
//!
//! Demonstrates:
//! - Building each template once and sharing it read-only
//! - Composing a fresh, owned email per send and customizing only that copy
//! - Reporting an unknown template type without caching the failure
//!
//! Run with: `cargo run --example email_templates`

use lazy_registry::KeyedLazyRegistry;
use std::sync::Arc;

/// Shared, never mutated after construction.
#[derive(Debug)]
struct EmailTemplate {
    header: &'static str,
    subject: &'static str,
    content: &'static str,
    footer: &'static str,
}

impl EmailTemplate {
    fn for_type(kind: &str) -> Result<Self, String> {
        match kind {
            "welcome" => Ok(EmailTemplate {
                header: "Welcome to TUF++",
                subject: "Welcome!",
                content: "Welcome to our service!",
                footer: "Best Regards, TUF++ Team",
            }),
            other => Err(format!("Unknown template type: {other}")),
        }
    }

    fn compose(&self) -> Email {
        Email {
            header: self.header.to_string(),
            subject: self.subject.to_string(),
            content: self.content.to_string(),
            footer: self.footer.to_string(),
        }
    }
}

/// One send's copy of a template.
struct Email {
    header: String,
    subject: String,
    content: String,
    footer: String,
}

impl Email {
    fn send(&self, to: &str) {
        println!("   Sending to {to}");
        println!("     {} | {} | {} | {}", self.header, self.subject, self.content, self.footer);
    }
}

fn template(
    registry: &KeyedLazyRegistry<&'static str, EmailTemplate>,
    kind: &'static str,
) -> Result<Arc<EmailTemplate>, String> {
    registry.get_or_try_insert_with(kind, |kind| {
        println!("   building template '{kind}'");
        EmailTemplate::for_type(kind)
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazy_registry=debug".into()),
        )
        .init();

    println!("=== lazy-registry: Email Templates ===\n");

    let registry = KeyedLazyRegistry::new();

    println!("1. Sending the default welcome email:");
    match template(&registry, "welcome") {
        Ok(welcome) => welcome.compose().send("ada@example.com"),
        Err(err) => eprintln!("   {err}"),
    }

    println!("\n2. Customizing a copy without touching the template:");
    match template(&registry, "welcome") {
        Ok(welcome) => {
            let mut email = welcome.compose();
            email.content = "Your account is ready.".to_string();
            email.send("bob@example.com");
            println!("   template content is still: {}", welcome.content);
        }
        Err(err) => eprintln!("   {err}"),
    }

    println!("\n3. Asking for a template that does not exist:");
    if let Err(err) = template(&registry, "newsletter") {
        println!("   {err}");
    }

    let stats = registry.stats();
    println!(
        "\n4. templates={} built={} failures={}",
        registry.len(),
        stats.constructions,
        stats.failures
    );

    println!("\n=== Example completed successfully! ===");
}
