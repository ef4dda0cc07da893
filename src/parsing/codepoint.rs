use std::{fmt, io::BufRead};

use crate::PostcodeRecord;

/// Positional quality of rows with no coordinates.
const NO_COORDINATES_QUALITY: u8 = 90;
/// Positional quality of rows placed at the mean of their sector.
const SECTOR_MEAN_QUALITY: u8 = 60;

#[derive(Debug)]
pub struct CsvError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for CsvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for CsvError {}

/// Parse one Code-Point Open CSV file into postcode records.
///
/// Columns are postcode, positional quality, easting and northing, followed
/// by administrative codes that are ignored. Rows without coordinates are
/// skipped.
pub fn parse_codepoint_csv<R: BufRead>(reader: R) -> Result<Vec<PostcodeRecord>, CsvError> {
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|err| CsvError {
            line: line_number,
            message: err.to_string(),
        })?;
        if line.trim().is_empty() {
            continue;
        }

        if let Some(record) = parse_line(&line).map_err(|message| CsvError {
            line: line_number,
            message,
        })? {
            records.push(record);
        }
    }

    Ok(records)
}

fn parse_line(line: &str) -> Result<Option<PostcodeRecord>, String> {
    let mut fields = line.split(',').map(unquote);

    let postcode = fields.next().ok_or("missing postcode")?;
    let quality: u8 = parse_field(fields.next(), "positional quality")?;
    let e: u32 = parse_field(fields.next(), "easting")?;
    let n: u32 = parse_field(fields.next(), "northing")?;

    if quality == NO_COORDINATES_QUALITY {
        return Ok(None);
    }

    Ok(Some(PostcodeRecord {
        postcode: postcode.to_string(),
        e,
        n,
        sector_mean: quality == SECTOR_MEAN_QUALITY,
    }))
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>, name: &str) -> Result<T, String> {
    let field = field.ok_or_else(|| format!("missing {name}"))?;
    field
        .parse()
        .map_err(|_| format!("invalid {name} {field:?}"))
}

fn unquote(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|field| field.strip_suffix('"'))
        .unwrap_or(field)
}

#[cfg(test)]
mod tests {
    use super::parse_codepoint_csv;
    use crate::PostcodeRecord;

    const SAMPLE: &str = "\
\"AB101AB\",10,394235,806529,\"S92000003\",\"\",\"S08000020\",\"\",\"S12000033\",\"S13002842\"
\"BN999AA\",60,517706,104201,\"E92000001\",\"E19000002\",\"E18000008\",\"E10000032\",\"E07000227\",\"E05007600\"
\"E1  0AA\",10,535267,181084,\"E92000001\",\"E19000003\",\"E18000007\",\"\",\"E09000030\",\"E05009323\"
\"AB1 0AA\",90,0,0,\"S92000003\",\"\",\"S08000020\",\"\",\"S12000033\",\"S13002843\"
";

    #[test]
    fn parses_codepoint_rows() {
        let records = parse_codepoint_csv(SAMPLE.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            PostcodeRecord {
                postcode: "AB101AB".to_string(),
                e: 394235,
                n: 806529,
                sector_mean: false,
            }
        );
        assert!(records[1].sector_mean);
        assert_eq!(records[2].postcode, "E1  0AA");
    }

    #[test]
    fn skips_blank_lines() {
        let csv = "\n\"W1A 1AA\",10,531073,182317\n\n";
        let records = parse_codepoint_csv(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!((records[0].e, records[0].n), (531073, 182317));
    }

    #[test]
    fn reports_line_of_bad_rows() {
        let csv = "\"E1  0AA\",10,535267,181084\n\"E1  6AN\",10,east,182000\n";
        let err = parse_codepoint_csv(csv.as_bytes()).unwrap_err();

        assert_eq!(err.line, 2);
        assert!(err.to_string().contains("easting"), "{err}");
    }

    #[test]
    fn reports_missing_columns() {
        let err = parse_codepoint_csv("\"E1  0AA\",10\n".as_bytes()).unwrap_err();

        assert_eq!(err.line, 1);
        assert_eq!(err.message, "missing easting");
    }
}
