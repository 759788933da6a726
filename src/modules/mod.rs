pub mod books;

use std::sync::Arc;

use leeslog_kernel::ModuleRegistry;

use books::{BookService, BooksModule};

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, books: Arc<BookService>) -> anyhow::Result<()> {
    registry.register(Arc::new(BooksModule::new(books)))?;
    Ok(())
}
