//! Dynamic error classes end to end.
//!
//! Registers a library's own error class and codes, raises one of them
//! through `check`, and prints the allocation journal.
//!
//! Run with: `cargo run --example dynamic_classes`

use errclass::{
    Attribute, ErrorCode, ErrorRegistry, InProcessRuntime, RaisedError, SharedRegistry, check,
};

struct StorageErrors {
    class: ErrorCode,
    corrupt: ErrorCode,
    full: ErrorCode,
}

fn register(shared: &SharedRegistry) -> errclass::Result<Option<StorageErrors>> {
    let mut registry = shared.write();

    let class = match registry.allocate_class() {
        Ok(class) => class,
        Err(e) if e.is_unsupported() => return Ok(None),
        Err(e) => return Err(e),
    };
    registry.set_string(class, "storage subsystem error")?;

    let corrupt = registry.allocate_code(class)?;
    registry.set_string(corrupt, "checkpoint file is corrupt")?;

    let full = registry.allocate_code(class)?;
    registry.set_string(full, "checkpoint volume is full")?;

    Ok(Some(StorageErrors { class, corrupt, full }))
}

fn write_checkpoint(shared: &SharedRegistry, status: ErrorCode) -> Result<(), RaisedError> {
    check(&shared.read(), status)
}

fn main() {
    let shared = SharedRegistry::new(ErrorRegistry::new(InProcessRuntime::new()));
    let world = shared.world();

    println!("=== Registration ===");
    let storage = match register(&shared) {
        Ok(Some(storage)) => storage,
        Ok(None) => {
            println!("runtime has no dynamic error classes; nothing to do");
            return;
        }
        Err(e) => {
            eprintln!("registration failed: {}", e);
            return;
        }
    };
    println!("class   {} -> {:?}", storage.class, shared.get_string(storage.class));
    println!("corrupt {} -> {:?}", storage.corrupt, shared.get_string(storage.corrupt));
    println!("full    {} -> {:?}", storage.full, shared.get_string(storage.full));
    println!(
        "{} = {}, {} = {}",
        Attribute::LastUsedCode,
        world.get_attr(Attribute::LastUsedCode),
        Attribute::Frontier,
        world.get_attr(Attribute::Frontier)
    );

    println!("\n=== Raising ===");
    for status in [ErrorCode::new(0), storage.full, ErrorCode::new(13)] {
        match write_checkpoint(&shared, status) {
            Ok(()) => println!("status {}: ok", status),
            Err(e) => println!(
                "status {}: {} (class {}, public {})",
                status,
                e,
                e.class(),
                e.to_public()
            ),
        }
    }

    println!("\n=== Journal (newest first) ===");
    let registry = shared.read();
    for entry in registry.journal().get_all() {
        println!(
            "#{} {} code={} class={} description={:?}",
            entry.sequence,
            entry.kind,
            entry.code,
            entry.class,
            entry.description.as_deref().unwrap_or("")
        );
    }
}
