//! Deterministic text fingerprints and cosine ranking.
//!
//! A fingerprint is a fixed-size L2-normalized vector built from hashed word
//! and bigram buckets plus fixed slots for structural keywords. The same text
//! always produces the same vector, in any process, on any machine — token
//! buckets come from SHA-256, never from the randomly keyed std hasher.
//! Ranking is a full scan over the `fingerprints` table with cosine
//! similarity; there is no approximate index.

use chrono::Utc;
use rusqlite::{params, Connection};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Number of dimensions in every stored fingerprint.
pub const FINGERPRINT_DIM: usize = 128;

/// Similarity results at or below this value are discarded.
pub const SIMILARITY_FLOOR: f64 = 0.1;

/// Keywords counted into the fixed trailing slots of the vector, in slot order.
const STRUCTURAL_KEYWORDS: [&str; 10] = [
    "function", "class", "import", "export", "const", "let", "var", "if", "for", "while",
];

// ── Vector construction ──────────────────────────────────────────────────────

/// Build the fingerprint for `text` at the standard dimension.
pub fn fingerprint(text: &str) -> Vec<f32> {
    fingerprint_sized(text, FINGERPRINT_DIM)
}

/// Build a fingerprint of `size` dimensions.
///
/// Word tokens are lowercased runs of alphanumerics/underscores. The first
/// `size / 2` words each add 1.0 to their hash bucket; every adjacent word
/// pair adds 0.5 to the bucket of `"w1_w2"`. Structural keyword occurrence
/// counts land in fixed slots from the tail (`size - 1 - i`), capped to the
/// last quarter of the vector. The result is L2-normalized; a zero vector
/// stays zero.
pub fn fingerprint_sized(text: &str, size: usize) -> Vec<f32> {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
        .collect();

    let mut vector = vec![0.0f32; size];

    for word in tokens.iter().take(size / 2) {
        vector[stable_bucket(word, size)] += 1.0;
    }

    for pair in tokens.windows(2) {
        let bigram = format!("{}_{}", pair[0], pair[1]);
        vector[stable_bucket(&bigram, size)] += 0.5;
    }

    for (i, keyword) in STRUCTURAL_KEYWORDS.iter().enumerate() {
        if i >= size / 4 {
            break;
        }
        let count = lower.matches(keyword).count();
        if count > 0 {
            vector[size - 1 - i] = count as f32;
        }
    }

    let magnitude = vector.iter().map(|v| (*v as f64).powi(2)).sum::<f64>().sqrt();
    if magnitude > 0.0 {
        for v in &mut vector {
            *v = (*v as f64 / magnitude) as f32;
        }
    }

    vector
}

/// Map a token to a bucket index. SHA-256 truncated to u64 so the mapping
/// survives process restarts and Rust upgrades.
fn stable_bucket(token: &str, size: usize) -> usize {
    let digest = Sha256::digest(token.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % size as u64) as usize
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when the lengths differ or either side has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += *x as f64 * *y as f64;
        norm_a += (*x as f64).powi(2);
        norm_b += (*y as f64).powi(2);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

// ── BLOB codec ───────────────────────────────────────────────────────────────

/// Serialize a vector to little-endian f32 bytes for the `vector` column.
pub fn fingerprint_to_bytes(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Deserialize a `vector` BLOB back into f32s.
pub fn bytes_to_fingerprint(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

// ── Storage ──────────────────────────────────────────────────────────────────

/// Compute and store the fingerprint for a record, replacing any previous one.
pub fn upsert(conn: &Connection, record_id: &str, text: &str) -> Result<()> {
    let vector = fingerprint(text);
    conn.execute(
        "INSERT OR REPLACE INTO fingerprints (record_id, vector, updated_at)
         VALUES (?1, ?2, ?3)",
        params![
            record_id,
            fingerprint_to_bytes(&vector),
            Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Drop the stored fingerprint for a record, if any.
pub fn remove_record(conn: &Connection, record_id: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM fingerprints WHERE record_id = ?1",
        params![record_id],
    )?;
    Ok(())
}

/// Load the stored fingerprint for a record.
pub fn load(conn: &Connection, record_id: &str) -> Result<Option<Vec<f32>>> {
    let row = conn
        .query_row(
            "SELECT vector FROM fingerprints WHERE record_id = ?1",
            params![record_id],
            |row| row.get::<_, Vec<u8>>(0),
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;
    Ok(row.map(|bytes| bytes_to_fingerprint(&bytes)))
}

// ── Ranking ──────────────────────────────────────────────────────────────────

/// One similarity hit from a full scan.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarRecord {
    pub record_id: String,
    pub similarity: f64,
}

/// Records most similar to the given one, best first.
///
/// Scans every stored fingerprint, skips the record itself, keeps scores
/// above [`SIMILARITY_FLOOR`], and truncates to `limit`. An unknown
/// `record_id` yields an empty list.
pub fn find_similar(conn: &Connection, record_id: &str, limit: usize) -> Result<Vec<SimilarRecord>> {
    let Some(target) = load(conn, record_id)? else {
        return Ok(Vec::new());
    };

    let hits = rank_against(conn, &target, Some(record_id))?;
    Ok(hits.into_iter().take(limit).collect())
}

/// Rank every stored fingerprint against `target`, best first, excluding
/// `exclude_id` when given. No limit is applied here.
pub fn rank_against(
    conn: &Connection,
    target: &[f32],
    exclude_id: Option<&str>,
) -> Result<Vec<SimilarRecord>> {
    let mut stmt = conn.prepare("SELECT record_id, vector FROM fingerprints ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
    })?;

    let mut hits = Vec::new();
    for row in rows {
        let (id, bytes) = row?;
        if exclude_id == Some(id.as_str()) {
            continue;
        }
        let similarity = cosine_similarity(target, &bytes_to_fingerprint(&bytes));
        if similarity > SIMILARITY_FLOOR {
            hits.push(SimilarRecord {
                record_id: id,
                similarity,
            });
        }
    }

    // Stable sort keeps scan order for equal scores
    hits.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(hits)
}

/// Recompute every fingerprint from the memory and knowledge tables.
/// Returns the number of records fingerprinted.
pub fn rebuild(conn: &mut Connection) -> Result<u64> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM fingerprints", [])?;

    let mut count = 0u64;
    {
        let mut stmt = tx.prepare(
            "SELECT id, content FROM memories
             UNION ALL
             SELECT id, content FROM knowledge",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (id, content) = row?;
            upsert(&tx, &id, &content)?;
            count += 1;
        }
    }

    tx.commit()?;
    tracing::info!(records = count, "fingerprints rebuilt");
    Ok(count)
}
