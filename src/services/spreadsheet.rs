//! Spreadsheet decoding: format sniffing and delimited-text parsing.
//!
//! Field teams export from Excel, so uploads arrive as whatever "Save As"
//! produced. Binary workbook formats are refused up front by magic bytes;
//! what remains must be UTF-8 delimited text, read by a small RFC 4180
//! parser that handles quoted fields, doubled quotes and embedded newlines.

use crate::error::{AppError, AppResult};

/// xlsx files are zip archives.
const XLSX_MAGIC: &[u8] = b"PK\x03\x04";
/// Legacy .xls files are OLE compound documents.
const XLS_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// Cell separator, inferred from the header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
        }
    }
}

/// A decoded upload: one header row plus zero or more data rows.
///
/// Rows whose cells are all blank are dropped during parsing, so data row
/// indices here are the row numbers reported back to the uploader.
#[derive(Debug)]
pub struct Sheet {
    pub delimiter: Delimiter,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Decode an uploaded file into a [`Sheet`].
///
/// Rejects binary workbooks and non-UTF-8 content with
/// `AppError::UnsupportedFormat`; a file with no header row at all is
/// `AppError::InvalidInput`.
pub fn parse(bytes: &[u8]) -> AppResult<Sheet> {
    if bytes.starts_with(XLSX_MAGIC) {
        return Err(AppError::UnsupportedFormat(
            "xlsx workbooks are not supported; re-export the sheet as CSV".to_string(),
        ));
    }
    if bytes.starts_with(XLS_MAGIC) {
        return Err(AppError::UnsupportedFormat(
            "legacy xls workbooks are not supported; re-export the sheet as CSV".to_string(),
        ));
    }

    let text = std::str::from_utf8(bytes).map_err(|_| {
        AppError::UnsupportedFormat(
            "file is not UTF-8 text; re-export the sheet as CSV".to_string(),
        )
    })?;
    // Excel prepends a BOM to UTF-8 exports.
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let delimiter = sniff_delimiter(text);

    let mut records = parse_records(text, delimiter.as_char());
    records.retain(|record| record.iter().any(|cell| !cell.trim().is_empty()));

    if records.is_empty() {
        return Err(AppError::InvalidInput(
            "File contains no rows".to_string(),
        ));
    }

    let header = records.remove(0);

    Ok(Sheet {
        delimiter,
        header,
        rows: records,
    })
}

/// Pick the delimiter by counting candidates in the first physical line.
///
/// Tab wins only when it outnumbers commas, so comma-bearing values inside
/// a TSV header cannot flip the choice the other way.
fn sniff_delimiter(text: &str) -> Delimiter {
    let header_line = text.lines().next().unwrap_or("");
    let tabs = header_line.matches('\t').count();
    let commas = header_line.matches(',').count();

    if tabs > commas {
        Delimiter::Tab
    } else {
        Delimiter::Comma
    }
}

/// Split text into records per RFC 4180.
///
/// A quote opens quoted mode only at the start of a field; inside quotes,
/// a doubled quote is a literal quote and newlines belong to the field.
/// Stray quotes mid-field are kept literally, which is what most readers
/// do with malformed exports. Accepts CRLF, LF and lone CR row endings.
fn parse_records(text: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            c if c == delimiter => record.push(std::mem::take(&mut field)),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    // Final record when the file does not end with a newline.
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_xlsx_magic() {
        let bytes = b"PK\x03\x04rest-of-zip";
        let err = parse(bytes).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
        assert!(err.to_string().contains("CSV"));
    }

    #[test]
    fn test_rejects_legacy_xls_magic() {
        let bytes = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        let err = parse(&bytes).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_rejects_non_utf8() {
        let bytes = [0x52, 0x65, 0x67, 0xFF, 0xFE, 0x01];
        let err = parse(&bytes).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_rejects_empty_file() {
        let err = parse(b"").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_parses_simple_csv() {
        let sheet = parse(b"Reg No,Customer\nMH12AB1234,Patil\nKA01CD5678,Rao\n").unwrap();
        assert_eq!(sheet.delimiter, Delimiter::Comma);
        assert_eq!(sheet.header, vec!["Reg No", "Customer"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0], vec!["MH12AB1234", "Patil"]);
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let sheet = parse(b"Reg No,Customer\n").unwrap();
        assert!(sheet.rows.is_empty());
    }

    #[test]
    fn test_sniffs_tab_delimiter() {
        let sheet = parse(b"Reg No\tCustomer\tBank\nMH12AB1234\tPatil\tHDFC\n").unwrap();
        assert_eq!(sheet.delimiter, Delimiter::Tab);
        assert_eq!(sheet.header.len(), 3);
        assert_eq!(sheet.rows[0][2], "HDFC");
    }

    #[test]
    fn test_comma_inside_tsv_header_does_not_flip_delimiter() {
        let sheet = parse(b"Reg No\tAmount, EMI\tBank\na\tb\tc\n").unwrap();
        assert_eq!(sheet.delimiter, Delimiter::Tab);
    }

    #[test]
    fn test_quoted_field_with_embedded_delimiter() {
        let sheet = parse(b"Reg No,Address\nMH12AB1234,\"12, MG Road, Pune\"\n").unwrap();
        assert_eq!(sheet.rows[0][1], "12, MG Road, Pune");
    }

    #[test]
    fn test_doubled_quotes_become_literal_quote() {
        let sheet = parse(b"Reg No,Customer\nMH12AB1234,\"Shri \"\"Bala\"\" Traders\"\n").unwrap();
        assert_eq!(sheet.rows[0][1], "Shri \"Bala\" Traders");
    }

    #[test]
    fn test_embedded_newline_inside_quotes() {
        let sheet = parse(b"Reg No,Address\nMH12AB1234,\"Line one\nLine two\"\n").unwrap();
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0][1], "Line one\nLine two");
    }

    #[test]
    fn test_crlf_line_endings() {
        let sheet = parse(b"Reg No,Customer\r\nMH12AB1234,Patil\r\n").unwrap();
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0][0], "MH12AB1234");
    }

    #[test]
    fn test_skips_blank_and_all_empty_rows() {
        let sheet = parse(b"Reg No,Customer\n\nMH12AB1234,Patil\n,,\n").unwrap();
        assert_eq!(sheet.rows.len(), 1);
    }

    #[test]
    fn test_trailing_empty_cell_preserved() {
        let sheet = parse(b"Reg No,Customer,Bank\nMH12AB1234,Patil,\n").unwrap();
        assert_eq!(sheet.rows[0], vec!["MH12AB1234", "Patil", ""]);
    }

    #[test]
    fn test_strips_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Reg No,Customer\nMH12AB1234,Patil\n");
        let sheet = parse(&bytes).unwrap();
        assert_eq!(sheet.header[0], "Reg No");
    }

    #[test]
    fn test_no_trailing_newline() {
        let sheet = parse(b"Reg No,Customer\nMH12AB1234,Patil").unwrap();
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0][1], "Patil");
    }
}
