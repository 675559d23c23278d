use crate::domain::model::{Record, RecordSet, TransformReport, TransformResult};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

pub const EMAIL_FIELD: &str = "email";
pub const PHONE_FIELD: &str = "phone";
pub const JOB_TITLE_FIELD: &str = "job_title";
pub const BIRTH_DATE_FIELD: &str = "date_of_birth";
pub const AGE_FIELD: &str = "age";

const ADULT_AGE: i64 = 18;
const DAYS_PER_YEAR: i64 = 365;

// ISO first, then the secondary formats seen in source datasets.
const BIRTH_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Applies the cleaning rules to a record set, evaluated against `today`.
///
/// The rules run in a fixed order; later rules rely on the row survival and
/// field formats produced by earlier ones. In particular, duplicates are
/// removed after email/phone normalization so rows differing only by
/// formatting collapse, and before job-title normalization so rows differing
/// only by title casing do not.
pub fn transform_at(input: RecordSet, today: NaiveDate) -> TransformResult {
    let mut report = TransformReport {
        input_records: input.len(),
        ..Default::default()
    };

    let complete = drop_incomplete(input);
    report.dropped_incomplete = report.input_records - complete.len();

    let normalized = normalize_phones(normalize_emails(complete));

    let distinct = drop_duplicates(normalized);
    report.dropped_duplicates =
        report.input_records - report.dropped_incomplete - distinct.len();

    let titled = normalize_job_titles(distinct);

    let survivors_before_age = titled.len();
    let adults = derive_ages(titled, today);
    report.dropped_minors = survivors_before_age - adults.len();
    report.output_records = adults.len();

    TransformResult {
        records: adults,
        report,
    }
}

/// Rule 1: drop any record with a null or absent value in a schema column.
pub fn drop_incomplete(set: RecordSet) -> RecordSet {
    let columns = set.columns().to_vec();
    set.filter_records(|record| {
        columns
            .iter()
            .all(|column| record.get(column).is_some_and(|value| !value.is_null()))
    })
}

/// Rule 2: lower-case email addresses.
pub fn normalize_emails(set: RecordSet) -> RecordSet {
    if !set.has_column(EMAIL_FIELD) {
        return set;
    }
    set.map_records(|mut record| {
        if let Some(serde_json::Value::String(email)) = record.data.get_mut(EMAIL_FIELD) {
            *email = email.to_lowercase();
        }
        record
    })
}

/// Rule 3: strip phone numbers to digits, reformatting exact 10-digit
/// numbers as `(AAA) BBB-CCCC`. Any other length stays a bare digit string.
pub fn normalize_phones(set: RecordSet) -> RecordSet {
    if !set.has_column(PHONE_FIELD) {
        return set;
    }
    set.map_records(|mut record| {
        let formatted = record.get(PHONE_FIELD).and_then(phone_text).map(|text| format_phone(&text));
        if let Some(phone) = formatted {
            record
                .data
                .insert(PHONE_FIELD.to_string(), serde_json::Value::String(phone));
        }
        record
    })
}

// Numeric phone values (a digits-only CSV column parses as integers) are
// rendered to text before stripping.
fn phone_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
    } else {
        digits
    }
}

/// Rule 4: remove records identical across all fields to an earlier record,
/// keeping the first occurrence.
pub fn drop_duplicates(set: RecordSet) -> RecordSet {
    let mut seen = HashSet::new();
    set.filter_records(|record| seen.insert(identity_key(record)))
}

// Canonical form with fields in sorted name order, so identity does not
// depend on map iteration order.
fn identity_key(record: &Record) -> String {
    let ordered: BTreeMap<&String, &serde_json::Value> = record.data.iter().collect();
    serde_json::to_string(&ordered).unwrap_or_default()
}

/// Rule 5: title-case job titles.
pub fn normalize_job_titles(set: RecordSet) -> RecordSet {
    if !set.has_column(JOB_TITLE_FIELD) {
        return set;
    }
    set.map_records(|mut record| {
        if let Some(serde_json::Value::String(title)) = record.data.get_mut(JOB_TITLE_FIELD) {
            *title = title_case(title);
        }
        record
    })
}

// Any non-alphabetic character starts a new word, matching the behavior of
// string title-casing in common dataframe libraries: "mary-jane O'BRIEN"
// becomes "Mary-Jane O'Brien".
fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut at_word_start = true;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Rule 6: derive `age` in whole years from `date_of_birth` and drop
/// records under 18. An unparseable birth date makes the age indeterminate
/// and drops the record. When the schema has no `date_of_birth`, no `age`
/// field is ever added.
pub fn derive_ages(set: RecordSet, today: NaiveDate) -> RecordSet {
    if !set.has_column(BIRTH_DATE_FIELD) {
        return set;
    }

    let mut columns = set.columns().to_vec();
    if !columns.iter().any(|column| column == AGE_FIELD) {
        columns.push(AGE_FIELD.to_string());
    }

    let records = set
        .into_records()
        .into_iter()
        .filter_map(|mut record| {
            let age = record
                .get(BIRTH_DATE_FIELD)
                .and_then(|value| value.as_str())
                .and_then(parse_birth_date)
                .map(|birth_date| age_in_years(birth_date, today))?;
            if age < ADULT_AGE {
                return None;
            }
            record
                .data
                .insert(AGE_FIELD.to_string(), serde_json::Value::from(age));
            Some(record)
        })
        .collect();

    RecordSet::from_parts(columns, records)
}

fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for format in BIRTH_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    // Timestamps keep their date part, e.g. "1994-05-12 08:30:00".
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

// floor(days / 365), flooring toward negative so future birth dates come out
// negative and fall to the minor filter.
fn age_in_years(birth_date: NaiveDate, today: NaiveDate) -> i64 {
    (today - birth_date).num_days().div_euclid(DAYS_PER_YEAR)
}
