use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::DocumentType;
use crate::models::Analysis;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub fn insert_analysis(conn: &Connection, analysis: &Analysis) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO analyses (id, user_id, original_text, simplified_text, document_type,
         language, model, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            analysis.id.to_string(),
            analysis.user_id,
            analysis.original_text,
            analysis.simplified_text,
            analysis.document_type.as_str(),
            analysis.language,
            analysis.model,
            analysis.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// Fetch one analysis by id, regardless of owner. Ownership is the caller's check.
pub fn get_analysis(conn: &Connection, id: &Uuid) -> Result<Option<Analysis>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, original_text, simplified_text, document_type, language, model, created_at
         FROM analyses WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], read_row);

    match result {
        Ok(row) => Ok(Some(analysis_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All analyses owned by `user_id`, newest first.
pub fn list_analyses_for_user(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<Analysis>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, original_text, simplified_text, document_type, language, model, created_at
         FROM analyses WHERE user_id = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt.query_map(params![user_id], read_row)?;

    let mut analyses = Vec::new();
    for row in rows {
        analyses.push(analysis_from_row(row?)?);
    }
    Ok(analyses)
}

struct AnalysisRow {
    id: String,
    user_id: String,
    original_text: String,
    simplified_text: String,
    document_type: String,
    language: String,
    model: String,
    created_at: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AnalysisRow> {
    Ok(AnalysisRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        original_text: row.get(2)?,
        simplified_text: row.get(3)?,
        document_type: row.get(4)?,
        language: row.get(5)?,
        model: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn analysis_from_row(row: AnalysisRow) -> Result<Analysis, DatabaseError> {
    let id = Uuid::parse_str(&row.id).map_err(|e| DatabaseError::CorruptRow {
        table: "analyses",
        reason: format!("id {}: {e}", row.id),
    })?;
    let created_at = NaiveDateTime::parse_from_str(&row.created_at, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S"))
        .map_err(|e| DatabaseError::CorruptRow {
            table: "analyses",
            reason: format!("created_at {}: {e}", row.created_at),
        })?;

    Ok(Analysis {
        id,
        user_id: row.user_id,
        original_text: row.original_text,
        simplified_text: row.simplified_text,
        document_type: DocumentType::from_str(&row.document_type)?,
        language: row.language,
        model: row.model,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use chrono::NaiveDate;

    fn make_analysis(user_id: &str, minute: u32) -> Analysis {
        Analysis {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            original_text: "Tab. Metformin 500mg OD".into(),
            simplified_text: "Take one metformin tablet once a day.".into(),
            document_type: DocumentType::Prescription,
            language: "en-IN".into(),
            model: "gemini-2.5-flash".into(),
            created_at: NaiveDate::from_ymd_opt(2025, 3, 14)
                .unwrap()
                .and_hms_micro_opt(9, minute, 0, 250_000)
                .unwrap(),
        }
    }

    #[test]
    fn insert_and_get() {
        let conn = open_memory_database().unwrap();
        let analysis = make_analysis("user-1", 0);
        insert_analysis(&conn, &analysis).unwrap();

        let fetched = get_analysis(&conn, &analysis.id).unwrap().unwrap();
        assert_eq!(fetched, analysis);
    }

    #[test]
    fn get_missing_returns_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_analysis(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn list_is_per_user_newest_first() {
        let conn = open_memory_database().unwrap();
        let older = make_analysis("user-1", 1);
        let newer = make_analysis("user-1", 30);
        let other = make_analysis("user-2", 45);
        insert_analysis(&conn, &older).unwrap();
        insert_analysis(&conn, &newer).unwrap();
        insert_analysis(&conn, &other).unwrap();

        let listed = list_analyses_for_user(&conn, "user-1").unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[test]
    fn list_for_unknown_user_is_empty() {
        let conn = open_memory_database().unwrap();
        insert_analysis(&conn, &make_analysis("user-1", 0)).unwrap();
        assert!(list_analyses_for_user(&conn, "nobody").unwrap().is_empty());
    }

    #[test]
    fn same_second_inserts_keep_insertion_order() {
        let conn = open_memory_database().unwrap();
        let first = make_analysis("user-1", 5);
        let mut second = make_analysis("user-1", 5);
        second.created_at = first.created_at;
        insert_analysis(&conn, &first).unwrap();
        insert_analysis(&conn, &second).unwrap();

        let listed = list_analyses_for_user(&conn, "user-1").unwrap();
        assert_eq!(listed[0].id, second.id);
    }

    #[test]
    fn duplicate_id_rejected() {
        let conn = open_memory_database().unwrap();
        let analysis = make_analysis("user-1", 0);
        insert_analysis(&conn, &analysis).unwrap();
        assert!(insert_analysis(&conn, &analysis).is_err());
    }

    #[test]
    fn corrupt_document_type_surfaces_error() {
        let conn = open_memory_database().unwrap();
        conn.execute_batch("PRAGMA ignore_check_constraints=ON;").unwrap();
        let analysis = make_analysis("user-1", 0);
        insert_analysis(&conn, &analysis).unwrap();
        conn.execute(
            "UPDATE analyses SET document_type = 'x-ray' WHERE id = ?1",
            params![analysis.id.to_string()],
        )
        .unwrap();

        let err = get_analysis(&conn, &analysis.id).unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }
}
