use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use envelope::{Container, Header, Value};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
pub struct HeaderOutput<'a> {
    pub target_id: &'a str,
    pub target_sub_id: &'a str,
    pub source_id: &'a str,
    pub source_sub_id: &'a str,
    pub message_type: &'a str,
    pub version: &'a str,
}

impl<'a> From<&'a Header> for HeaderOutput<'a> {
    fn from(header: &'a Header) -> Self {
        Self {
            target_id: &header.target_id,
            target_sub_id: &header.target_sub_id,
            source_id: &header.source_id,
            source_sub_id: &header.source_sub_id,
            message_type: &header.message_type,
            version: &header.version,
        }
    }
}

/// One value, flattened with a `/`-separated path through nested containers.
#[derive(Serialize)]
pub struct ValueRow {
    pub path: String,
    #[serde(rename = "type")]
    pub type_id: u8,
    pub type_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<&'static str>,
    pub data: String,
}

pub fn value_rows(container: &Container) -> Vec<ValueRow> {
    let mut rows = Vec::with_capacity(container.len());
    collect_rows(container, "", &mut rows);
    rows
}

fn collect_rows(container: &Container, prefix: &str, rows: &mut Vec<ValueRow>) {
    for value in container {
        let path = if prefix.is_empty() {
            value.name().to_string()
        } else {
            format!("{prefix}/{}", value.name())
        };
        rows.push(ValueRow {
            path: path.clone(),
            type_id: value.tag().id(),
            type_name: value.tag().name(),
            provenance: value.provenance().map(|tag| tag.name()),
            data: data_preview(value),
        });
        if let Some(child) = value.as_container() {
            collect_rows(child, &path, rows);
        }
    }
}

fn data_preview(value: &Value) -> String {
    match value.as_container() {
        Some(child) => format!(
            "<container {} ({} values)>",
            child.header.message_type,
            child.len()
        ),
        None => value.to_text().unwrap_or_default(),
    }
}

pub fn print_json<T: Serialize>(out: &T) {
    println!(
        "{}",
        serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_header_table(header: &Header) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["FIELD", "VALUE"]);
    for (field, value) in [
        ("target", format!("{}/{}", header.target_id, header.target_sub_id)),
        ("source", format!("{}/{}", header.source_id, header.source_sub_id)),
        ("message_type", header.message_type.clone()),
        ("version", header.version.clone()),
    ] {
        table.add_row(vec![field.to_string(), value]);
    }
    println!("{table}");
}

pub fn print_value_table(rows: &[ValueRow]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["NAME", "TYPE", "WIRE TYPE", "DATA"]);
    for row in rows {
        let wire_type = match row.provenance {
            Some(original) => format!("{original} (widened)"),
            None => row.type_name.to_string(),
        };
        table.add_row(vec![
            row.path.clone(),
            format!("{} ({})", row.type_name, row.type_id),
            wire_type,
            row.data.clone(),
        ]);
    }
    println!("{table}");
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}
