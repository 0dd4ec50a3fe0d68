use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::{errors::Error, Result};

use super::table::ExportTable;

/// Encoded export ready for delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Encode `table` as quote-all CSV, naming the file after `reference`'s local date.
pub fn encode(table: &ExportTable, reference: DateTime<Utc>) -> Result<ExportFile> {
    encode_in(table, reference, &Local)
}

/// Same as [`encode`] with an explicit calendar zone for the file name.
///
/// Every cell is quoted, `\n` separates rows, and there is no trailing newline.
pub fn encode_in<Tz>(table: &ExportTable, reference: DateTime<Utc>, tz: &Tz) -> Result<ExportFile>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let width = table.header().len();
    for (idx, row) in table.rows().iter().enumerate() {
        if row.len() != width {
            return Err(Error::ContractViolation(format!(
                "row {idx} has {} cells but the header has {width}",
                row.len()
            )));
        }
    }

    let text = std::iter::once(table.header())
        .chain(table.rows().iter().map(Vec::as_slice))
        .map(encode_row)
        .collect::<Vec<_>>()
        .join("\n");

    Ok(ExportFile {
        file_name: file_name_for(&reference.with_timezone(tz)),
        content: text.into_bytes(),
    })
}

/// `members_YYYYMMDD.csv` for the calendar date of `reference`.
pub fn file_name_for<Tz>(reference: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("members_{}.csv", reference.format("%Y%m%d"))
}

/// Wrap a cell in double quotes, doubling any quote inside it.
pub fn quote_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn encode_row(row: &[String]) -> String {
    row.iter()
        .map(|cell| quote_field(cell))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    fn table(header: &[&str], rows: &[&[&str]]) -> ExportTable {
        ExportTable::new(
            header.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(
            quote_field("He said \"hi\", once"),
            "\"He said \"\"hi\"\", once\""
        );
        assert_eq!(quote_field(""), "\"\"");
    }

    #[test]
    fn commas_and_newlines_kept_literally() {
        let t = table(&["a"], &[&["x,y\nz"]]);
        let out = encode_in(&t, at(2024, 1, 1, 0), &Utc).unwrap();
        assert_eq!(String::from_utf8(out.content).unwrap(), "\"a\"\n\"x,y\nz\"");
    }

    #[test]
    fn rows_joined_without_trailing_newline() {
        let t = table(&["h1", "h2"], &[&["1", ""], &["", "2"]]);
        let out = encode_in(&t, at(2024, 1, 1, 0), &Utc).unwrap();
        let text = String::from_utf8(out.content).unwrap();
        assert_eq!(text, "\"h1\",\"h2\"\n\"1\",\"\"\n\"\",\"2\"");
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn header_only_table() {
        let t = table(&["only"], &[]);
        let out = encode_in(&t, at(2024, 1, 1, 0), &Utc).unwrap();
        assert_eq!(out.content, b"\"only\"".to_vec());
    }

    #[test]
    fn utf8_without_bom() {
        let t = table(&["ニックネーム"], &[&["表示名"]]);
        let out = encode_in(&t, at(2024, 1, 1, 0), &Utc).unwrap();
        assert!(!out.content.starts_with(&[0xEF, 0xBB, 0xBF]));
        assert_eq!(
            String::from_utf8(out.content).unwrap(),
            "\"ニックネーム\"\n\"表示名\""
        );
    }

    #[test]
    fn mismatched_row_is_contract_violation() {
        let t = table(&["a", "b"], &[&["1", "2"], &["only-one"]]);
        let err = encode_in(&t, at(2024, 1, 1, 0), &Utc).unwrap_err();
        assert!(matches!(err, Error::ContractViolation(m) if m.contains("row 1")));

        let t = table(&["a"], &[&["1", "2"]]);
        assert!(matches!(
            encode(&t, at(2024, 1, 1, 0)),
            Err(Error::ContractViolation(_))
        ));
    }

    #[test]
    fn file_name_zero_padded() {
        let out = encode_in(&table(&["a"], &[]), at(2024, 3, 5, 12), &Utc).unwrap();
        assert_eq!(out.file_name, "members_20240305.csv");
    }

    #[test]
    fn file_name_follows_zone_calendar() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let out = encode_in(&table(&["a"], &[]), at(2024, 12, 31, 20), &tokyo).unwrap();
        assert_eq!(out.file_name, "members_20250101.csv");
    }

    #[test]
    fn file_name_local_calendar() {
        let noon = Local.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        assert_eq!(file_name_for(&noon), "members_20240305.csv");

        let out = encode(&table(&["a"], &[]), noon.with_timezone(&Utc)).unwrap();
        assert_eq!(out.file_name, "members_20240305.csv");
    }

    #[test]
    fn encoded_rows_parse_back_with_csv_reader() {
        let rows: &[&[&str]] = &[
            &["He said \"hi\", once", "", "x,y\nz"],
            &["\"", "plain", "末尾\"\""],
        ];
        let t = table(&["a", "b", "c"], rows);
        let out = encode_in(&t, at(2024, 1, 1, 0), &Utc).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(out.content.as_slice());
        let parsed = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect::<Vec<_>>())
            .collect::<Vec<_>>();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0], ["a", "b", "c"]);
        assert_eq!(parsed[1].as_slice(), t.rows()[0].as_slice());
        assert_eq!(parsed[2].as_slice(), t.rows()[1].as_slice());
    }
}
