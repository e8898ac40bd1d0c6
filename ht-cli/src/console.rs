//! Status lines printed by the probes. These are the probes' output, so they go
//! to stdout rather than through `tracing`.

use std::fmt::Display;

pub fn banner(title: &str) {
    println!("🚀 {}", title);
    println!("{}", ht_core::report::rule());
}

pub fn heading(icon: &str, title: &str) {
    println!("\n{} {}...", icon, title);
}

pub fn pass(message: impl Display) {
    println!("✅ {}", message);
}

pub fn fail(message: impl Display) {
    println!("❌ {}", message);
}

pub fn detail(message: impl Display) {
    println!("   - {}", message);
}

pub fn note(message: impl Display) {
    println!("   {}", message);
}

pub fn blank() {
    println!();
}
