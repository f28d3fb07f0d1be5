//! USGS RDB (tab-delimited) parser.
//!
//! An IV response in RDB form looks like:
//!
//! ```text
//! # comment lines ...
//! agency_cd  site_no   datetime          tz_cd  150811_00060  150811_00060_cd
//! 5s         15s       20d               6s     14n           10s
//! USGS       09504500  2024-05-01 00:00  MST    28.4          P
//! ```
//!
//! The header names vary with the time-series id, so columns are named by
//! position. The second row describes column widths/types and is dropped by
//! position, without looking at it.

use crate::model::{COLUMN_NAMES, HydroError, Observation, ObservationTable};
use chrono::{NaiveDate, NaiveDateTime};

/// Timestamp layouts accepted in the `datetime` column, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parses an RDB body into an observation table.
///
/// Input with no header row (only comments, or nothing) yields an empty
/// table; deciding whether that is an error is left to the caller.
pub fn parse_rdb(text: &str) -> Result<ObservationTable, HydroError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.starts_with('#') && !line.trim().is_empty());

    let Some((header_line, header)) = lines.next() else {
        return Ok(ObservationTable::default());
    };

    let width = header.split('\t').count();
    if width != COLUMN_NAMES.len() {
        return Err(HydroError::Parse(format!(
            "expected {} columns (agency, site, datetime, timezone, flow, flag) in header on line {}, found {}: '{}'",
            COLUMN_NAMES.len(),
            header_line,
            width,
            header
        )));
    }

    // Type-annotation row ("5s 15s 20d ...").
    let _ = lines.next();

    let rows = lines
        .map(|(line_no, line)| parse_row(line_no, line))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ObservationTable::new(rows))
}

fn parse_row(line_no: usize, line: &str) -> Result<Observation, HydroError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != COLUMN_NAMES.len() {
        return Err(HydroError::Parse(format!(
            "line {}: expected {} columns, found {}",
            line_no,
            COLUMN_NAMES.len(),
            fields.len()
        )));
    }

    let datetime = parse_datetime(fields[2].trim()).ok_or_else(|| {
        HydroError::Parse(format!("line {}: unparseable datetime '{}'", line_no, fields[2]))
    })?;

    Ok(Observation {
        agency: fields[0].to_string(),
        site: fields[1].to_string(),
        datetime,
        timezone: fields[3].to_string(),
        flow_cfs: coerce_flow(fields[4]),
        quality_flag: fields[5].to_string(),
    })
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Numeric coercion for the flow column: anything that is not a finite
/// number (gauge codes like `Ice`, `Eqp`, `***`, or an empty cell) is null.
pub fn coerce_flow(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = include_str!("../../tests/fixtures/usgs_iv_09504500.rdb");

    const HEADER: &str = "agency_cd\tsite_no\tdatetime\ttz_cd\t150811_00060\t150811_00060_cd\n\
                          5s\t15s\t20d\t6s\t14n\t10s\n";

    fn body(rows: &[&str]) -> String {
        let mut text = String::from("# comment\n");
        text.push_str(HEADER);
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_fixture_parses_all_rows_after_type_row() {
        let table = parse_rdb(FIXTURE).expect("fixture should parse");
        assert_eq!(table.len(), 8);
        assert_eq!(table.columns().len(), 6);

        let first = &table.rows()[0];
        assert_eq!(first.agency, "USGS");
        assert_eq!(first.site, "09504500");
        assert_eq!(first.timezone, "MST");
        assert_eq!(first.quality_flag, "P");
        assert_eq!(first.flow_cfs, Some(28.4));
        assert_eq!(first.datetime.to_string(), "2024-05-01 00:00:00");
    }

    #[test]
    fn test_n_data_rows_yield_n_minus_one_observations() {
        for n in 2..6 {
            let rows: Vec<String> = (0..n - 1)
                .map(|i| format!("USGS\t09504500\t2024-05-01 0{}:00\tMST\t{}.0\tP", i, i))
                .collect();
            let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
            // `body` already contributes the type row, so n data rows in total.
            let table = parse_rdb(&body(&refs)).expect("valid input");
            assert_eq!(table.len(), n - 1, "with {} data rows", n);
        }
    }

    #[test]
    fn test_type_row_is_dropped_by_position_not_content() {
        // The second row here looks like data; it is still discarded.
        let text = "agency_cd\tsite_no\tdatetime\ttz_cd\tflow\tcd\n\
                    USGS\t09504500\t2024-05-01 00:00\tMST\t1.0\tP\n\
                    USGS\t09504500\t2024-05-01 00:15\tMST\t2.0\tP\n";
        let table = parse_rdb(text).expect("valid input");
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].flow_cfs, Some(2.0));
    }

    #[test]
    fn test_non_numeric_flow_becomes_null_and_row_is_kept() {
        let table = parse_rdb(FIXTURE).expect("fixture should parse");
        let flows: Vec<_> = table.flows().collect();
        assert_eq!(flows[3], None, "'Ice' should coerce to null");
        assert_eq!(flows[5], None, "empty cell should coerce to null");
        assert_eq!(flows.iter().filter(|f| f.is_some()).count(), 6);
    }

    #[test]
    fn test_coerce_flow() {
        assert_eq!(coerce_flow("12.5"), Some(12.5));
        assert_eq!(coerce_flow(" 7 "), Some(7.0));
        assert_eq!(coerce_flow("-999999"), Some(-999999.0));
        assert_eq!(coerce_flow("Eqp"), None);
        assert_eq!(coerce_flow("***"), None);
        assert_eq!(coerce_flow(""), None);
        assert_eq!(coerce_flow("NaN"), None);
        assert_eq!(coerce_flow("inf"), None);
    }

    #[test]
    fn test_rows_keep_source_order() {
        let text = body(&[
            "USGS\t09504500\t2024-05-01 02:00\tMST\t3.0\tP",
            "USGS\t09504500\t2024-05-01 01:00\tMST\t2.0\tP",
        ]);
        let table = parse_rdb(&text).expect("valid input");
        let flows: Vec<_> = table.flows().collect();
        assert_eq!(flows, vec![Some(3.0), Some(2.0)], "rows must not be re-sorted");
    }

    #[test]
    fn test_alternate_datetime_layouts() {
        let text = body(&[
            "USGS\t09504500\t2024-05-01 00:00:30\tMST\t1.0\tP",
            "USGS\t09504500\t2024-05-01T00:15\tMST\t1.0\tP",
            "USGS\t09504500\t2024-05-02\tMST\t1.0\tA",
        ]);
        let table = parse_rdb(&text).expect("all layouts accepted");
        let times: Vec<String> = table.rows().iter().map(|r| r.datetime.to_string()).collect();
        assert_eq!(
            times,
            vec!["2024-05-01 00:00:30", "2024-05-01 00:15:00", "2024-05-02 00:00:00"]
        );
    }

    #[test]
    fn test_unparseable_datetime_is_parse_error_with_line_number() {
        let text = body(&["USGS\t09504500\tyesterday\tMST\t1.0\tP"]);
        match parse_rdb(&text) {
            Err(HydroError::Parse(msg)) => {
                assert!(msg.contains("line 4"), "message should name the line: {}", msg);
                assert!(msg.contains("yesterday"));
            }
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_header_column_drift_is_parse_error() {
        let text = "agency_cd\tsite_no\tdatetime\ttz_cd\tflow\tflow_cd\tgage\tgage_cd\n\
                    5s\t15s\t20d\t6s\t14n\t10s\t14n\t10s\n\
                    USGS\t09504500\t2024-05-01 00:00\tMST\t1.0\tP\t2.0\tP\n";
        match parse_rdb(text) {
            Err(HydroError::Parse(msg)) => assert!(msg.contains("found 8"), "{}", msg),
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_short_data_row_is_parse_error() {
        let text = body(&["USGS\t09504500\t2024-05-01 00:00\tMST"]);
        assert!(matches!(parse_rdb(&text), Err(HydroError::Parse(_))));
    }

    #[test]
    fn test_comments_only_yields_empty_table() {
        let table = parse_rdb("# nothing\n# here\n").expect("comments only is not a parse error");
        assert!(table.is_empty());
        assert!(parse_rdb("").expect("empty body").is_empty());
    }

    #[test]
    fn test_header_and_type_row_only_yields_empty_table() {
        let table = parse_rdb(&body(&[])).expect("valid input");
        assert!(table.is_empty());
    }

    #[test]
    fn test_crlf_and_blank_lines_are_tolerated() {
        let text = body(&["USGS\t09504500\t2024-05-01 00:00\tMST\t4.5\tP"])
            .replace('\n', "\r\n")
            + "\r\n\r\n";
        let table = parse_rdb(&text).expect("CRLF input");
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].quality_flag, "P");
    }
}
