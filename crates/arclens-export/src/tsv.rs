//! Tab-separated projections of pages, clusters, and the entity indexes.

use arclens_core::{ArchivalPage, AuthorityRecord, Cluster, ReconciliationRecord};

/// Quote a free-text field: wrap in double quotes, double interior
/// quotes, and flatten newlines so one record stays one line.
fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\"").replace('\n', " "))
}

fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.join("\t"));
    for row in rows {
        lines.push(row.join("\t"));
    }
    lines.join("\n")
}

/// One row per page: identity, analysis metadata, transcription text.
pub fn pages_tsv(pages: &[ArchivalPage]) -> String {
    let headers = [
        "Index Name",
        "Original File",
        "Language",
        "Production Mode",
        "Hebrew Handwriting?",
        "Transcription",
        "Translation",
    ];
    let rows = pages
        .iter()
        .map(|p| {
            vec![
                p.index_name.clone(),
                p.file_name.clone(),
                p.language.clone().unwrap_or_default(),
                p.production_mode.clone().unwrap_or_default(),
                if p.has_hebrew_handwriting == Some(true) {
                    "YES".to_string()
                } else {
                    "NO".to_string()
                },
                quote(p.transcription_text()),
                quote(p.generated_translation.as_deref().unwrap_or("")),
            ]
        })
        .collect();
    table(&headers, rows)
}

/// One row per cluster: catalog fields plus mentioned entity names.
pub fn clusters_tsv(clusters: &[Cluster]) -> String {
    let headers = [
        "Cluster ID",
        "Title",
        "Page Range",
        "Summary",
        "Original Date",
        "Date (YYYY-MM-DD)",
        "Doc Types",
        "Subjects",
        "Sender",
        "Recipient",
        "Prison Name",
        "Languages",
        "People Mentioned",
        "Organizations Mentioned",
    ];
    let rows = clusters
        .iter()
        .map(|c| {
            let names = |refs: &[arclens_core::EntityRef]| {
                refs.iter()
                    .map(|e| e.name.clone())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let entities = c.entities.clone().unwrap_or_default();
            vec![
                c.id.to_string(),
                c.title.clone(),
                c.page_range.clone(),
                quote(&c.summary),
                c.original_date.clone().unwrap_or_default(),
                c.standardized_date.clone().unwrap_or_default(),
                c.doc_types.join(", "),
                c.subjects.join(", "),
                c.senders
                    .iter()
                    .map(|s| s.name.clone())
                    .collect::<Vec<_>>()
                    .join(", "),
                c.recipients
                    .iter()
                    .map(|r| r.name.clone())
                    .collect::<Vec<_>>()
                    .join(", "),
                c.prison_name.clone().unwrap_or_default(),
                c.languages.join(", "),
                quote(&names(&entities.people)),
                quote(&names(&entities.organizations)),
            ]
        })
        .collect();
    table(&headers, rows)
}

/// One row per reconciliation record: the project entity index.
pub fn entity_index_tsv(records: &[ReconciliationRecord]) -> String {
    let headers = [
        "Extracted Name",
        "Type",
        "Status",
        "Matched ID",
        "Matched Name",
        "Appearances",
        "Locations",
    ];
    let rows = records
        .iter()
        .map(|r| {
            let locations = r
                .source_appearances
                .iter()
                .map(|a| a.location_id.clone())
                .collect::<Vec<_>>()
                .join("; ");
            vec![
                r.extracted_name.clone(),
                r.entity_type.to_string(),
                r.status.to_string(),
                r.matched_id.map(|id| id.to_string()).unwrap_or_default(),
                r.matched_name.clone().unwrap_or_default(),
                r.source_appearances.len().to_string(),
                quote(&locations),
            ]
        })
        .collect();
    table(&headers, rows)
}

/// One row per authority record: the master vocabulary, biographical
/// fields verbatim.
pub fn authority_tsv(entries: &[AuthorityRecord]) -> String {
    let headers = [
        "ID",
        "Name",
        "Type",
        "Life Span",
        "Affiliation",
        "Religion",
        "Nationality",
        "Gender",
        "Alias Names",
        "External Links",
        "Notes",
    ];
    let rows = entries
        .iter()
        .map(|a| {
            vec![
                a.id.to_string(),
                a.name.clone(),
                a.entity_type.to_string(),
                a.life_span.clone().unwrap_or_default(),
                a.affiliation.clone().unwrap_or_default(),
                a.religion.clone().unwrap_or_default(),
                a.nationality.clone().unwrap_or_default(),
                a.gender.clone().unwrap_or_default(),
                a.alias_names.join(", "),
                a.external_links.clone().unwrap_or_default(),
                quote(a.notes.as_deref().unwrap_or("")),
            ]
        })
        .collect();
    table(&headers, rows)
}
