//! Row <-> entity conversion

use crate::StoreError;
use retort_domain::{
    Compound, CompoundId, IdParseError, Paper, PaperId, RouteStatus, SynthesisRoute,
    SynthesisRouteId, SynthesisStep,
};
use rusqlite::types::Type;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub(crate) const PAPER_COLUMNS: &str = "id, title, authors, abstract, journal, year, pdf_url, \
     related_compounds, contributor, tags, created_at";

pub(crate) const COMPOUND_COLUMNS: &str = "id, name, smiles, category, description, bioactivity, \
     tags, related_papers, synthesis_route_id, created_at";

pub(crate) const ROUTE_COLUMNS: &str =
    "id, name, compound_id, created_by, status, steps, notes, created_at";

/// Stored form of a synthesis step inside the `steps` JSON column
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepRecord {
    step_number: u32,
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
    #[serde(default)]
    reagent: String,
    #[serde(default)]
    conditions: String,
    #[serde(default)]
    description: String,
}

impl From<&SynthesisStep> for StepRecord {
    fn from(step: &SynthesisStep) -> Self {
        Self {
            step_number: step.step_number,
            from: step.from.clone(),
            to: step.to.clone(),
            reagent: step.reagent.clone(),
            conditions: step.conditions.clone(),
            description: step.description.clone(),
        }
    }
}

impl From<StepRecord> for SynthesisStep {
    fn from(record: StepRecord) -> Self {
        Self {
            step_number: record.step_number,
            from: record.from,
            to: record.to,
            reagent: record.reagent,
            conditions: record.conditions,
            description: record.description,
        }
    }
}

pub(crate) fn strings_to_json(values: &[String]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(values)?)
}

pub(crate) fn ids_to_json<T: ToString>(ids: &[T]) -> Result<String, StoreError> {
    let strings: Vec<String> = ids.iter().map(ToString::to_string).collect();
    Ok(serde_json::to_string(&strings)?)
}

pub(crate) fn steps_to_json(steps: &[SynthesisStep]) -> Result<String, StoreError> {
    let records: Vec<StepRecord> = steps.iter().map(StepRecord::from).collect();
    Ok(serde_json::to_string(&records)?)
}

fn conversion_error<E>(idx: usize, ty: Type, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(e))
}

fn json_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, Type::Text, e))
}

fn id_list_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<T>>
where
    T: FromStr<Err = IdParseError>,
{
    let strings: Vec<String> = json_column(row, idx)?;
    strings
        .iter()
        .map(|s| s.parse::<T>().map_err(|e| conversion_error(idx, Type::Text, e)))
        .collect()
}

fn id_column<T>(
    row: &Row<'_>,
    idx: usize,
    from_bytes: fn(&[u8]) -> Result<T, IdParseError>,
) -> rusqlite::Result<T> {
    let bytes: Vec<u8> = row.get(idx)?;
    from_bytes(&bytes).map_err(|e| conversion_error(idx, Type::Blob, e))
}

pub(crate) fn paper_from_row(row: &Row<'_>) -> rusqlite::Result<Paper> {
    Ok(Paper {
        id: id_column(row, 0, PaperId::from_bytes)?,
        title: row.get(1)?,
        authors: json_column(row, 2)?,
        abstract_text: row.get(3)?,
        journal: row.get(4)?,
        year: row.get(5)?,
        pdf_url: row.get(6)?,
        related_compounds: id_list_column(row, 7)?,
        contributor: row.get(8)?,
        tags: json_column(row, 9)?,
        created_at: row.get::<_, i64>(10)? as u64,
    })
}

pub(crate) fn compound_from_row(row: &Row<'_>) -> rusqlite::Result<Compound> {
    let route_bytes: Option<Vec<u8>> = row.get(8)?;
    let synthesis_route = route_bytes
        .map(|bytes| SynthesisRouteId::from_bytes(&bytes))
        .transpose()
        .map_err(|e| conversion_error(8, Type::Blob, e))?;

    Ok(Compound {
        id: id_column(row, 0, CompoundId::from_bytes)?,
        name: row.get(1)?,
        smiles: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        bioactivity: json_column(row, 5)?,
        tags: json_column(row, 6)?,
        related_papers: id_list_column(row, 7)?,
        synthesis_route,
        created_at: row.get::<_, i64>(9)? as u64,
    })
}

pub(crate) fn route_from_row(row: &Row<'_>) -> rusqlite::Result<SynthesisRoute> {
    let status_str: String = row.get(4)?;
    let status = status_str
        .parse::<RouteStatus>()
        .map_err(|e| conversion_error(4, Type::Text, StoreError::InvalidData(e)))?;
    let steps: Vec<StepRecord> = json_column(row, 5)?;

    Ok(SynthesisRoute {
        id: id_column(row, 0, SynthesisRouteId::from_bytes)?,
        name: row.get(1)?,
        compound_id: id_column(row, 2, CompoundId::from_bytes)?,
        created_by: row.get(3)?,
        status,
        steps: steps.into_iter().map(SynthesisStep::from).collect(),
        notes: row.get(6)?,
        created_at: row.get::<_, i64>(7)? as u64,
    })
}
