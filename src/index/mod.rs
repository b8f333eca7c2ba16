//! Derived lexical index over record text.
//!
//! Each indexed record owns a set of scored terms in `lexical_terms`:
//! vocabulary terms matched as substrings, plus high-frequency identifiers
//! from the text itself. Queries are whitespace-tokenized and matched back
//! against stored terms by substring, accumulating relevance per record.
//! The index is rebuilt for a record on every write and can be dropped and
//! rebuilt wholesale with [`rebuild`].

use chrono::Utc;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::Result;

/// Fixed vocabulary of programming terms, matched case-insensitively as
/// substrings of record content.
const VOCABULARY: [&str; 38] = [
    "function",
    "class",
    "interface",
    "type",
    "const",
    "let",
    "var",
    "import",
    "export",
    "default",
    "async",
    "await",
    "promise",
    "react",
    "component",
    "hook",
    "state",
    "props",
    "jsx",
    "tsx",
    "typescript",
    "javascript",
    "node",
    "express",
    "api",
    "database",
    "test",
    "jest",
    "playwright",
    "cypress",
    "mock",
    "spec",
    "struct",
    "trait",
    "impl",
    "rust",
    "python",
    "sql",
];

/// Identifiers shorter than this are never indexed.
const MIN_IDENTIFIER_LEN: usize = 3;

/// Identifiers occurring fewer times than this are never indexed.
const MIN_IDENTIFIER_COUNT: usize = 3;

// ── Public types ──────────────────────────────────────────────────────────────

/// One search hit: a record with its accumulated relevance.
#[derive(Debug, Clone, Serialize)]
pub struct IndexHit {
    pub record_id: String,
    pub score: f64,
    pub matched_terms: Vec<String>,
    pub contexts: Vec<String>,
}

// ── Indexing ──────────────────────────────────────────────────────────────────

/// Rebuild the index rows for one record: delete everything it owns, then
/// insert scored terms extracted from `content`.
pub fn reindex(conn: &Connection, record_id: &str, content: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM lexical_terms WHERE record_id = ?1",
        params![record_id],
    )?;

    let now = Utc::now().to_rfc3339();
    let mut stmt = conn.prepare(
        "INSERT INTO lexical_terms (term, record_id, relevance, context, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (term, relevance) in extract_terms(content) {
        let context = keyword_context(content, &term);
        stmt.execute(params![term, record_id, relevance, context, now])?;
    }

    Ok(())
}

/// Extract scored terms from content.
///
/// Vocabulary terms score `min(count / 10, 1.0)` on their substring
/// occurrence count. Identifiers (alphabetic-or-underscore-led tokens of
/// length ≥ 3 outside the vocabulary) must occur at least 3 times and score
/// `min(count / 20, 0.8)`. Order is vocabulary order, then identifiers by
/// first occurrence.
pub fn extract_terms(content: &str) -> Vec<(String, f64)> {
    let lower = content.to_lowercase();
    let mut terms = Vec::new();

    for keyword in VOCABULARY {
        let count = lower.matches(keyword).count();
        if count > 0 {
            terms.push((keyword.to_string(), (count as f64 / 10.0).min(1.0)));
        }
    }

    // Identifier frequency, preserving first-occurrence order for determinism
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for token in lower.split(|c: char| !c.is_alphanumeric() && c != '_') {
        if token.len() < MIN_IDENTIFIER_LEN
            || !token
                .chars()
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_')
            || VOCABULARY.contains(&token)
        {
            continue;
        }
        let entry = counts.entry(token).or_insert(0);
        if *entry == 0 {
            order.push(token);
        }
        *entry += 1;
    }

    for token in order {
        let count = counts[token];
        if count >= MIN_IDENTIFIER_COUNT {
            terms.push((token.to_string(), (count as f64 / 20.0).min(0.8)));
        }
    }

    terms
}

/// Up to 3 trimmed lines of `content` containing `term`, joined with `" | "`.
fn keyword_context(content: &str, term: &str) -> String {
    let needle = term.to_lowercase();
    let mut lines = Vec::new();
    for line in content.lines() {
        if line.to_lowercase().contains(&needle) {
            lines.push(line.trim());
            if lines.len() >= 3 {
                break;
            }
        }
    }
    lines.join(" | ")
}

// ── Search ────────────────────────────────────────────────────────────────────

/// Search the index with a whitespace-tokenized query.
///
/// Every stored term containing a query token contributes its relevance to
/// the owning record's score. Records rank by accumulated score descending;
/// ties keep first-seen order.
pub fn search(conn: &Connection, query: &str, limit: usize) -> Result<Vec<IndexHit>> {
    let query = query.to_lowercase();

    let mut hits: Vec<IndexHit> = Vec::new();
    let mut by_record: HashMap<String, usize> = HashMap::new();

    let mut stmt = conn.prepare(
        "SELECT term, record_id, relevance, context FROM lexical_terms
         WHERE term LIKE ?1 ESCAPE '\\'
         ORDER BY relevance DESC, id ASC",
    )?;

    for token in query.split_whitespace() {
        let pattern = format!("%{}%", escape_like(token));
        let rows = stmt.query_map(params![pattern], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        for row in rows {
            let (term, record_id, relevance, context) = row?;
            let idx = match by_record.get(&record_id) {
                Some(&i) => i,
                None => {
                    hits.push(IndexHit {
                        record_id: record_id.clone(),
                        score: 0.0,
                        matched_terms: Vec::new(),
                        contexts: Vec::new(),
                    });
                    by_record.insert(record_id, hits.len() - 1);
                    hits.len() - 1
                }
            };
            let hit = &mut hits[idx];
            hit.score += relevance;
            if !hit.matched_terms.contains(&term) {
                hit.matched_terms.push(term);
            }
            if !context.is_empty() && !hit.contexts.contains(&context) {
                hit.contexts.push(context);
            }
        }
    }

    // Stable sort keeps first-seen order for equal scores
    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(limit);
    Ok(hits)
}

/// Escape LIKE metacharacters so query tokens match literally.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// ── Maintenance ───────────────────────────────────────────────────────────────

/// Drop all index rows owned by a record.
pub fn remove_record(conn: &Connection, record_id: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM lexical_terms WHERE record_id = ?1",
        params![record_id],
    )?;
    Ok(())
}

/// Reindex every memory and knowledge record from scratch.
/// Returns the number of records indexed.
pub fn rebuild(conn: &mut Connection) -> Result<u64> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM lexical_terms", [])?;

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
            reindex(&tx, &id, &content)?;
            count += 1;
        }
    }

    tx.commit()?;
    tracing::info!(records = count, "lexical index rebuilt");
    Ok(count)
}
