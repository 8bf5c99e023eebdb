//! Retort Storage Layer
//!
//! Implements the `EntityStore` trait on SQLite.
//!
//! # Architecture
//!
//! - One table per entity kind (papers, compounds, synthesis_routes)
//! - List-valued fields and reference lists stored as JSON arrays
//! - `synthesis_routes.compound_id` is a foreign key, so a route can never
//!   point at a compound that does not exist
//!
//! # Examples
//!
//! ```no_run
//! use retort_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for entity operations
//! ```

#![warn(missing_docs)]

mod records;

use records::{
    compound_from_row, ids_to_json, paper_from_row, route_from_row, steps_to_json,
    strings_to_json, COMPOUND_COLUMNS, PAPER_COLUMNS, ROUTE_COLUMNS,
};
use retort_domain::traits::{EntityStore, PaperQuery};
use retort_domain::{Compound, CompoundId, Paper, PaperId, SynthesisRoute, SynthesisRouteId};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// JSON column could not be encoded or decoded
    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),
}

/// SQLite-based implementation of EntityStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store between tasks
/// behind a `Mutex`, or give each thread its own SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use retort_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("retort.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    fn require_non_empty(field: &str, value: &str) -> Result<(), StoreError> {
        if value.trim().is_empty() {
            return Err(StoreError::InvalidData(format!("{} is required", field)));
        }
        Ok(())
    }

    fn compound_exists(&self, id: CompoundId) -> Result<bool, StoreError> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM compounds WHERE id = ?1",
                params![&id.to_bytes()[..]],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }

    /// Build the WHERE clause shared by `list_papers` and `count_papers`
    fn paper_filter(query: &PaperQuery) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut sql = String::from(" WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(contributor) = &query.contributor {
            sql.push_str(" AND contributor = ?");
            params.push(Box::new(contributor.clone()));
        }

        (sql, params)
    }
}

impl EntityStore for SqliteStore {
    type Error = StoreError;

    fn create_paper(&mut self, paper: Paper) -> Result<PaperId, Self::Error> {
        Self::require_non_empty("paper title", &paper.title)?;

        self.conn.execute(
            "INSERT INTO papers (id, title, authors, abstract, journal, year, pdf_url,
                                 related_compounds, contributor, tags, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                &paper.id.to_bytes()[..],
                &paper.title,
                strings_to_json(&paper.authors)?,
                &paper.abstract_text,
                &paper.journal,
                paper.year,
                &paper.pdf_url,
                ids_to_json(&paper.related_compounds)?,
                &paper.contributor,
                strings_to_json(&paper.tags)?,
                paper.created_at as i64,
            ],
        )?;

        debug!("Inserted paper {}", paper.id);
        Ok(paper.id)
    }

    fn get_paper(&self, id: PaperId) -> Result<Option<Paper>, Self::Error> {
        let sql = format!("SELECT {} FROM papers WHERE id = ?1", PAPER_COLUMNS);
        let paper = self
            .conn
            .query_row(&sql, params![&id.to_bytes()[..]], paper_from_row)
            .optional()?;
        Ok(paper)
    }

    fn set_paper_compounds(
        &mut self,
        id: PaperId,
        compounds: &[CompoundId],
    ) -> Result<(), Self::Error> {
        let updated = self.conn.execute(
            "UPDATE papers SET related_compounds = ?1 WHERE id = ?2",
            params![ids_to_json(compounds)?, &id.to_bytes()[..]],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(format!("paper {}", id)));
        }
        Ok(())
    }

    fn list_papers(&self, query: &PaperQuery) -> Result<Vec<Paper>, Self::Error> {
        let (filter, mut params) = Self::paper_filter(query);
        let mut sql = format!(
            "SELECT {} FROM papers{} ORDER BY created_at DESC, id DESC",
            PAPER_COLUMNS, filter
        );

        // SQLite needs a LIMIT before it accepts an OFFSET
        sql.push_str(" LIMIT ? OFFSET ?");
        params.push(Box::new(query.limit.map(|l| l as i64).unwrap_or(-1)));
        params.push(Box::new(query.offset as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let papers = stmt
            .query_map(&param_refs[..], paper_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(papers)
    }

    fn count_papers(&self, query: &PaperQuery) -> Result<usize, Self::Error> {
        let (filter, params) = Self::paper_filter(query);
        let sql = format!("SELECT COUNT(*) FROM papers{}", filter);
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let count: i64 = self.conn.query_row(&sql, &param_refs[..], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn create_compound(&mut self, compound: Compound) -> Result<CompoundId, Self::Error> {
        Self::require_non_empty("compound name", &compound.name)?;

        self.conn.execute(
            "INSERT INTO compounds (id, name, smiles, category, description, bioactivity,
                                    tags, related_papers, synthesis_route_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                &compound.id.to_bytes()[..],
                &compound.name,
                &compound.smiles,
                &compound.category,
                &compound.description,
                strings_to_json(&compound.bioactivity)?,
                strings_to_json(&compound.tags)?,
                ids_to_json(&compound.related_papers)?,
                compound.synthesis_route.map(|r| r.to_bytes().to_vec()),
                compound.created_at as i64,
            ],
        )?;

        debug!("Inserted compound {} ({})", compound.id, compound.name);
        Ok(compound.id)
    }

    fn get_compound(&self, id: CompoundId) -> Result<Option<Compound>, Self::Error> {
        let sql = format!("SELECT {} FROM compounds WHERE id = ?1", COMPOUND_COLUMNS);
        let compound = self
            .conn
            .query_row(&sql, params![&id.to_bytes()[..]], compound_from_row)
            .optional()?;
        Ok(compound)
    }

    fn set_compound_route(
        &mut self,
        id: CompoundId,
        route: SynthesisRouteId,
    ) -> Result<(), Self::Error> {
        let updated = self.conn.execute(
            "UPDATE compounds SET synthesis_route_id = ?1 WHERE id = ?2",
            params![&route.to_bytes()[..], &id.to_bytes()[..]],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(format!("compound {}", id)));
        }
        Ok(())
    }

    fn create_synthesis_route(
        &mut self,
        route: SynthesisRoute,
    ) -> Result<SynthesisRouteId, Self::Error> {
        Self::require_non_empty("synthesis route name", &route.name)?;

        if !self.compound_exists(route.compound_id)? {
            return Err(StoreError::NotFound(format!("compound {}", route.compound_id)));
        }

        self.conn.execute(
            "INSERT INTO synthesis_routes (id, name, compound_id, created_by, status, steps,
                                           notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &route.id.to_bytes()[..],
                &route.name,
                &route.compound_id.to_bytes()[..],
                &route.created_by,
                route.status.as_str(),
                steps_to_json(&route.steps)?,
                &route.notes,
                route.created_at as i64,
            ],
        )?;

        debug!("Inserted synthesis route {} for compound {}", route.id, route.compound_id);
        Ok(route.id)
    }

    fn get_synthesis_route(
        &self,
        id: SynthesisRouteId,
    ) -> Result<Option<SynthesisRoute>, Self::Error> {
        let sql = format!("SELECT {} FROM synthesis_routes WHERE id = ?1", ROUTE_COLUMNS);
        let route = self
            .conn
            .query_row(&sql, params![&id.to_bytes()[..]], route_from_row)
            .optional()?;
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_initializes_twice() {
        let mut store = SqliteStore::in_memory().unwrap();
        assert!(store.initialize_schema().is_ok());
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut store = SqliteStore::in_memory().unwrap();
        let result = store.create_paper(Paper::new("   ", 2024));
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }

    #[test]
    fn test_route_requires_existing_compound() {
        let mut store = SqliteStore::in_memory().unwrap();
        let route = SynthesisRoute::new("Orphan", CompoundId::new());
        assert!(matches!(
            store.create_synthesis_route(route),
            Err(StoreError::NotFound(_))
        ));
    }
}
