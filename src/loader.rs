use crate::error::IngestError;
use crate::types::RawRow;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Header names that must be present in the source file.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "Data da Coleta",
    "Produto",
    "Valor de Venda",
    "Estado - Sigla",
    "Municipio",
    "Revenda",
    "CNPJ da Revenda",
    "Nome da Rua",
    "Numero Rua",
    "Bairro",
    "Cep",
    "Bandeira",
];

/// Read the whole `;`-separated source file into raw rows.
///
/// Fails if the file cannot be opened, a record cannot be decoded, or any
/// [`REQUIRED_COLUMNS`] entry is missing from the header. There is no partial
/// result: one bad record aborts the load.
pub fn load_raw(path: &Path) -> Result<Vec<RawRow>, IngestError> {
    info!("Loading data from {}", path.display());
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = read_rows(file)?;
    info!("Loaded {} rows", rows.len());
    Ok(rows)
}

/// Same as [`load_raw`] over any reader.
pub fn read_rows<R: std::io::Read>(input: R) -> Result<Vec<RawRow>, IngestError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(input);

    let headers = normalized_headers(rdr.headers()?);
    check_columns(&headers)?;
    let extra_columns: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !REQUIRED_COLUMNS.contains(h))
        .map(|(i, _)| i)
        .collect();

    let mut rows = Vec::new();
    let mut short_rows = 0usize;
    for result in rdr.records() {
        let mut record = result?;
        // ragged lines read as empty trailing fields; the cleaner judges them
        if record.len() < headers.len() {
            short_rows += 1;
            while record.len() < headers.len() {
                record.push_field("");
            }
        }
        let mut row: RawRow = record.deserialize(Some(&headers))?;
        row.extra = extra_columns
            .iter()
            .map(|&i| record.get(i).unwrap_or_default().to_string())
            .collect();
        rows.push(row);
    }
    if short_rows > 0 {
        debug!("{} rows had fewer fields than the header", short_rows);
    }
    Ok(rows)
}

fn normalized_headers(headers: &StringRecord) -> StringRecord {
    headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim())
        .collect()
}

fn check_columns(headers: &StringRecord) -> Result<(), IngestError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::MissingColumns(missing))
    }
}
