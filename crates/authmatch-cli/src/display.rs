//! Terminal rendering of comparisons and translation tables.

use std::io::{self, Write};

use authmatch_ai::Comparison;
use authmatch_core::{CanonicalField, SchemaRegistry};

/// Print a comparison as a card: verdict first, then matching and
/// mismatched fields with the document each value came from.
pub fn write_comparison(out: &mut impl Write, comparison: &Comparison) -> io::Result<()> {
    let result = &comparison.result;
    writeln!(out, "=== {} ===", result.summary())?;
    writeln!(out, "request {}", comparison.request_id)?;
    writeln!(out)?;

    writeln!(out, "Documents")?;
    for (i, doc) in comparison.per_document_extractions.iter().enumerate() {
        writeln!(
            out,
            "  {}. {:<24} {} fields",
            i + 1,
            doc.document_type,
            doc.fields.len()
        )?;
    }

    if !result.matching_fields.is_empty() {
        writeln!(out)?;
        writeln!(out, "Matching")?;
        for (field, value) in &result.matching_fields {
            writeln!(out, "  {:<36} {}", field.as_str(), value)?;
        }
    }

    if !result.mismatched_fields.is_empty() {
        writeln!(out)?;
        writeln!(out, "Mismatched")?;
        for field in result.mismatched_fields.keys() {
            writeln!(out, "  {}", field.as_str())?;
            write_sources(out, comparison, *field)?;
        }
    }
    Ok(())
}

fn write_sources(
    out: &mut impl Write,
    comparison: &Comparison,
    field: CanonicalField,
) -> io::Result<()> {
    for (i, doc) in comparison.per_document_extractions.iter().enumerate() {
        if let Some(value) = doc.fields.get(&field) {
            let source = format!("{}. {}", i + 1, doc.document_type);
            writeln!(out, "    {source:<34} {value}")?;
        }
    }
    Ok(())
}

pub fn print_comparison(comparison: &Comparison) -> io::Result<()> {
    write_comparison(&mut io::stdout().lock(), comparison)
}

pub fn write_tables(out: &mut impl Write, registry: &SchemaRegistry) -> io::Result<()> {
    writeln!(out, "Translation tables v{}", registry.version)?;

    for (document_type, template) in &registry.templates {
        writeln!(out)?;
        if template.description.is_empty() {
            writeln!(out, "{document_type}")?;
        } else {
            writeln!(out, "{document_type}  ({})", template.description)?;
        }
        for mapping in &template.fields {
            writeln!(out, "  {:<52} -> {}", mapping.label, mapping.field)?;
        }
        for (field, value) in &template.defaults {
            writeln!(out, "  {:<52} =  {value}", format!("(default {field})"))?;
        }
    }
    Ok(())
}

pub fn print_tables(registry: &SchemaRegistry) -> io::Result<()> {
    write_tables(&mut io::stdout().lock(), registry)
}
