// src/feed/parse.rs
use metrics::histogram;

/// One hotspot row, reduced to its coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub lat: f64,
    pub lon: f64,
}

/// Inclusive lat/lon box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Rough box around Turkey.
    pub const TURKEY: BoundingBox = BoundingBox {
        min_lat: 36.0,
        max_lat: 42.0,
        min_lon: 26.0,
        max_lon: 45.0,
    };

    pub fn contains(&self, d: &Detection) -> bool {
        (self.min_lat..=self.max_lat).contains(&d.lat)
            && (self.min_lon..=self.max_lon).contains(&d.lon)
    }
}

/// Parse the first two columns of every data row. The first line is always
/// treated as the header. Blank, short and non-numeric rows are dropped.
pub fn parse_detections(text: &str) -> Vec<Detection> {
    let t0 = std::time::Instant::now();

    let out: Vec<Detection> = text
        .split('\n')
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_row)
        .collect();

    histogram!("fire_feed_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    out
}

fn parse_row(line: &str) -> Option<Detection> {
    let mut cols = line.split(',');
    let lat = parse_coord(cols.next()?)?;
    let lon = parse_coord(cols.next()?)?;
    Some(Detection { lat, lon })
}

/// Lenient numeric read: the longest leading float wins and trailing junk is
/// ignored, so `"38.5abc"` is 38.5. `None` when no digits lead the field.
fn parse_coord(field: &str) -> Option<f64> {
    let s = field.trim_start();
    let end = float_prefix_len(s.as_bytes());
    if end == 0 {
        return None;
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Byte length of `[+-]? digits [. digits] [(e|E) [+-]? digits]` at the start
/// of `b`, or 0 when no mantissa digit is present.
fn float_prefix_len(b: &[u8]) -> usize {
    let digits = |from: usize| b[from..].iter().take_while(|c| c.is_ascii_digit()).count();

    let mut i = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_digits = digits(i);
    i += int_digits;

    let mut frac_digits = 0;
    if b.get(i) == Some(&b'.') {
        frac_digits = digits(i + 1);
        if int_digits > 0 || frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return 0;
    }

    // exponent only counts when at least one digit follows it
    if matches!(b.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(b.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_digits = digits(j);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }
    i
}

/// Detections inside `bbox`, in feed order.
pub fn in_region(text: &str, bbox: &BoundingBox) -> Vec<Detection> {
    parse_detections(text)
        .into_iter()
        .filter(|d| bbox.contains(d))
        .collect()
}

pub fn count_in_region(text: &str, bbox: &BoundingBox) -> usize {
    in_region(text, bbox).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "latitude,longitude,brightness,scan,track,acq_date";

    fn feed(rows: &[&str]) -> String {
        let mut s = String::from(HEADER);
        for r in rows {
            s.push('\n');
            s.push_str(r);
        }
        s
    }

    #[test]
    fn boundaries_are_inclusive() {
        let b = BoundingBox::TURKEY;
        assert!(b.contains(&Detection { lat: 36.0, lon: 26.0 }));
        assert!(b.contains(&Detection { lat: 42.0, lon: 45.0 }));
        assert!(!b.contains(&Detection { lat: 35.999, lon: 30.0 }));
        assert!(!b.contains(&Detection { lat: 39.0, lon: 45.001 }));
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let text = feed(&[
            "38.5,30.1,310.2",
            "abc,30.0,300",
            "",
            "41.0",
            "  ",
            "38.5abc,30.1",
        ]);
        assert_eq!(count_in_region(&text, &BoundingBox::TURKEY), 2);
    }

    #[test]
    fn trailing_junk_after_a_number_is_ignored() {
        let text = "latitude,longitude\n38.5abc,30.1\n";
        assert_eq!(count_in_region(text, &BoundingBox::TURKEY), 1);
    }

    #[test]
    fn coord_reads_leading_float_prefix() {
        assert_eq!(parse_coord("38.5abc"), Some(38.5));
        assert_eq!(parse_coord("  -12.25"), Some(-12.25));
        assert_eq!(parse_coord("+7"), Some(7.0));
        assert_eq!(parse_coord(".5x"), Some(0.5));
        assert_eq!(parse_coord("5."), Some(5.0));
        assert_eq!(parse_coord("1e2"), Some(100.0));
        assert_eq!(parse_coord("1e"), Some(1.0));
        assert_eq!(parse_coord("2.5E-1km"), Some(0.25));
        assert_eq!(parse_coord("40.1\r"), Some(40.1));
    }

    #[test]
    fn coord_without_leading_digits_is_rejected() {
        for f in ["", "abc", ".", "-", "+.", "e5", "NaN", " x1"] {
            assert_eq!(parse_coord(f), None, "field {f:?}");
        }
    }

    #[test]
    fn header_only_or_empty_is_zero() {
        assert_eq!(count_in_region("", &BoundingBox::TURKEY), 0);
        assert_eq!(count_in_region(HEADER, &BoundingBox::TURKEY), 0);
    }

    #[test]
    fn header_line_is_never_counted() {
        // first line dropped even when it looks like data
        let text = "38.0,30.0\n39.0,31.0\n";
        assert_eq!(count_in_region(text, &BoundingBox::TURKEY), 1);
    }

    #[test]
    fn crlf_and_padding_are_tolerated() {
        let text = format!("{HEADER}\r\n 37.2 , 27.9 ,x\r\n40.1,44.0\r\n");
        assert_eq!(count_in_region(&text, &BoundingBox::TURKEY), 2);
    }

    #[test]
    fn out_of_region_rows_are_parsed_but_filtered() {
        let text = feed(&["-12.3,130.5,300", "38.0,30.0,300", "48.8,2.3,300"]);
        assert_eq!(parse_detections(&text).len(), 3);
        assert_eq!(
            in_region(&text, &BoundingBox::TURKEY),
            vec![Detection { lat: 38.0, lon: 30.0 }]
        );
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let text = feed(&["NaN,30.0", "inf,30.0", "38.0,30.0"]);
        assert_eq!(parse_detections(&text).len(), 1);
    }

    #[test]
    fn count_never_exceeds_non_blank_data_lines() {
        let samples = [
            feed(&["38,30", "38,30", "x,y", "1"]),
            feed(&["", "", "39,40"]),
            "only-header".to_string(),
            feed(&["36,26", "42,45", "35,25"]),
        ];
        for s in samples {
            let data_lines = s.split('\n').skip(1).filter(|l| !l.trim().is_empty()).count();
            assert!(count_in_region(&s, &BoundingBox::TURKEY) <= data_lines);
        }
    }

    #[test]
    fn reparsing_is_stable() {
        let text = feed(&["38.0,30.0", "39.5,41.2", "12,12"]);
        assert_eq!(
            count_in_region(&text, &BoundingBox::TURKEY),
            count_in_region(&text, &BoundingBox::TURKEY)
        );
    }
}
