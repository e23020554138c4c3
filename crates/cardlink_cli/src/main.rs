//! CLI smoke entry point.
//!
//! Prints core linkage info and the builtin platform table.

use cardlink_core::PlatformRegistry;

fn main() {
    println!("cardlink_core ping={}", cardlink_core::ping());
    println!("cardlink_core version={}", cardlink_core::core_version());

    let registry = PlatformRegistry::builtin();
    for spec in registry.iter() {
        println!(
            "platform name={} auto_sync={} template={}",
            spec.name, spec.auto_sync, spec.url_template
        );
    }
}
