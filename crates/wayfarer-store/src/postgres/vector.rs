//! pgvector text format helpers
//!
//! Vectors travel as their text form (`[0.1,0.2]`) and are cast with
//! `::vector` in SQL, which avoids a dedicated pgvector client type.

/// Render a vector in pgvector's text input format
pub fn format_pgvector(vector: &[f32]) -> String {
    format!("[{}]", vector.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(","))
}
