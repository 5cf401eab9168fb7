//! Request-scoped processing with shared storage and logging.
//!
//! Run with `RUST_LOG=sijill_container=trace` to watch resolution.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use sijill::prelude::*;
use tracing_subscriber::EnvFilter;

// === Capabilities ===

trait Storage: Send + Sync {
    fn save(&self, data: &str);
    fn dump(&self) -> Vec<String>;
}

trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

static STORAGE: Lazy<Token<dyn Storage>> = Lazy::new(|| Token::new("Storage"));
static LOGGER: Lazy<Token<dyn Logger>> = Lazy::new(|| Token::new("Logger"));
static PROCESSOR: Lazy<Token<Processor>> = Lazy::new(|| Token::new("Processor"));

// === Implementations ===

static STORAGE_INSTANCES: AtomicUsize = AtomicUsize::new(0);

struct MemoryStorage {
    instance: usize,
    rows: Mutex<Vec<String>>,
}

impl Storage for MemoryStorage {
    fn save(&self, data: &str) {
        self.rows.lock().push(format!("#{} {data}", self.instance));
    }

    fn dump(&self) -> Vec<String> {
        self.rows.lock().clone()
    }
}

struct TracingLogger {
    prefix: String,
}

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::info!("{}{message}", self.prefix);
    }
}

struct Processor {
    logger: Arc<dyn Logger>,
    storage: Arc<dyn Storage>,
}

impl Processor {
    fn process(&self, request: &str) {
        self.logger.log(&format!("processing {request}"));
        self.storage.save(request);
    }
}

// === Wiring ===

struct InfrastructureProvider;

impl Provider for InfrastructureProvider {
    fn register(&self, builder: ContainerBuilder) -> ContainerBuilder {
        builder
            .register_factory(&STORAGE, Lifetime::Singleton, || {
                let instance = STORAGE_INSTANCES.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(MemoryStorage { instance, rows: Mutex::new(Vec::new()) }) as Arc<dyn Storage>)
            })
            .register(&LOGGER, Lifetime::Singleton, (), ("[demo] ".to_string(),), |(), (prefix,)| {
                Ok(Arc::new(TracingLogger { prefix }) as Arc<dyn Logger>)
            })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let container = Container::builder()
        .validate_on_build(true)
        .add_provider(&InfrastructureProvider)
        .scoped(&PROCESSOR, (*LOGGER, *STORAGE), |(logger, storage)| {
            Ok(Arc::new(Processor { logger, storage }))
        })
        .build()?;

    println!("{container:?}");

    for request in ["GET /users", "POST /orders"] {
        let scope = container.create_scope();
        let processor = scope.resolve(&PROCESSOR)?;
        processor.process(request);

        // Same scope, same processor.
        assert!(Arc::ptr_eq(&processor, &scope.resolve(&PROCESSOR)?));
    }

    if let Err(err) = container.resolve(&PROCESSOR) {
        println!("outside a scope: {err}");
    }

    let storage = container.resolve(&STORAGE)?;
    println!("storage built {} time(s)", STORAGE_INSTANCES.load(Ordering::SeqCst));
    for row in storage.dump() {
        println!("  {row}");
    }

    Ok(())
}
