//! Shared fixtures for the integration tests.
//!
//! `write_survey()` writes a small price survey in the agency's layout to a
//! temporary file. Keep the returned `NamedTempFile` alive for the duration of
//! the test.

use std::io::Write;
use tempfile::NamedTempFile;

pub const HEADER: &str = "Regiao - Sigla;Estado - Sigla;Municipio;Revenda;CNPJ da Revenda;Nome da Rua;Numero Rua;Complemento;Bairro;Cep;Produto;Data da Coleta;Valor de Venda;Valor de Compra;Unidade de Medida;Bandeira";

/// One survey line. Only the fields the tests vary are parameters.
pub fn line(region: &str, city: &str, seller: &str, product: &str, date: &str, price: &str) -> String {
    format!(
        "SE;{region};{city};{seller};00.000.000/0001-00;RUA UM;10;;CENTRO;01000-000;{product};{date};{price};;R$ / 13 kg;BRANCA"
    )
}

pub fn write_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn write_survey(lines: &[String]) -> NamedTempFile {
    let mut contents = String::from(HEADER);
    contents.push('\n');
    for l in lines {
        contents.push_str(l);
        contents.push('\n');
    }
    write_file(&contents)
}

/// Two weeks of data plus noise: week of 02/06 averages 100 over two
/// cities, week of 09/06 averages 110 over three.
pub fn two_week_survey() -> NamedTempFile {
    write_survey(&[
        line("SP", "SÃO PAULO", "REVENDA A", "GLP", "02/06/2025", "90,00"),
        line("SP", "CAMPINAS", "REVENDA B", "GLP", "03/06/2025", "110,00"),
        line("SP", "SÃO PAULO", "REVENDA C", "GLP", "09/06/2025", "100,00"),
        line("SP", "CAMPINAS", "REVENDA D", "GLP", "10/06/2025", "110,00"),
        line("RJ", "NITERÓI", "REVENDA E", "GLP", "13/06/2025", "120,00"),
        // noise
        line("SP", "SÃO PAULO", "REVENDA C", "GLP", "09/06/2025", "100,00"),
        line("SP", "SANTOS", "REVENDA F", "GASOLINA", "12/06/2025", "6,19"),
        line("SP", "SANTOS", "REVENDA F", "GLP", "32/06/2025", "99,00"),
        line("SP", "SANTOS", "REVENDA F", "GLP", "12/06/2025", "sem preço"),
        line("SP", "", "REVENDA G", "GLP", "12/06/2025", "99,00"),
        // outside a 30-day window
        line("MG", "BELO HORIZONTE", "REVENDA H", "GLP", "01/04/2025", "95,00"),
    ])
}
