use tabled::{settings::Style, Table, Tabled};

use crate::storage::PetitionSummary;
use crate::Signature;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
struct PetitionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Signatures")]
    signatures: usize,
}

#[derive(Tabled)]
struct SignatureRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

pub fn petition_table(summaries: &[PetitionSummary]) -> String {
    let rows: Vec<PetitionRow> = summaries
        .iter()
        .map(|s| PetitionRow {
            id: s.id.to_string(),
            title: s.title.clone(),
            signatures: s.signatures,
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn signature_table(signatures: &[Signature]) -> String {
    let rows: Vec<SignatureRow> = signatures
        .iter()
        .map(|s| SignatureRow {
            id: s.id().map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            name: s.name().to_string(),
            email: s.email().to_string(),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}
