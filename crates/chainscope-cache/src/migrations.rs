// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations (refinery).

use chainscope_core::ChainscopeError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Applies pending migrations. Refinery records them in `refinery_schema_history`.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), ChainscopeError> {
    embedded::migrations::runner()
        .run(conn)
        .map_err(|e| ChainscopeError::Cache {
            source: Box::new(e),
        })?;
    Ok(())
}
