use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One posting row of a seed export, with its 1-based line number.
#[derive(Debug)]
pub(crate) struct SeedRow {
    pub(crate) line: u64,
    pub(crate) job: JobRow,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<SeedRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<JobRow>() {
        let job = record?;
        let line = rows.len() as u64 + 2;
        rows.push(SeedRow { line, job });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobRow {
    #[serde(rename = "Id", default, deserialize_with = "empty_string_as_none")]
    pub(crate) id: Option<String>,
    #[serde(rename = "Title")]
    pub(crate) title: String,
    #[serde(rename = "Description")]
    pub(crate) description: String,
    #[serde(rename = "Company")]
    pub(crate) company: String,
    #[serde(rename = "Job Type")]
    pub(crate) job_type: String,
    #[serde(rename = "Urgency", default, deserialize_with = "empty_string_as_none")]
    pub(crate) urgency: Option<String>,
    #[serde(rename = "Suburb", default)]
    pub(crate) suburb: String,
    #[serde(rename = "City")]
    pub(crate) city: String,
    #[serde(rename = "State")]
    pub(crate) state: String,
    #[serde(rename = "Latitude", default)]
    pub(crate) latitude: Option<f64>,
    #[serde(rename = "Longitude", default)]
    pub(crate) longitude: Option<f64>,
    #[serde(rename = "Pay Type")]
    pub(crate) pay_type: String,
    #[serde(rename = "Pay Amount", default)]
    pub(crate) pay_amount: Option<f64>,
    #[serde(rename = "Currency", default, deserialize_with = "empty_string_as_none")]
    pub(crate) currency: Option<String>,
    #[serde(rename = "Start Date", default, deserialize_with = "empty_string_as_none")]
    pub(crate) start_date: Option<String>,
    #[serde(rename = "End Date", default, deserialize_with = "empty_string_as_none")]
    pub(crate) end_date: Option<String>,
    #[serde(rename = "Skills", default)]
    pub(crate) skills: String,
    #[serde(rename = "Certifications", default)]
    pub(crate) certifications: String,
    #[serde(rename = "Max Applicants", default)]
    pub(crate) max_applicants: Option<u32>,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    pub(crate) status: Option<String>,
    #[serde(rename = "Poster")]
    pub(crate) poster: String,
    #[serde(rename = "Created At", default, deserialize_with = "empty_string_as_none")]
    pub(crate) created_at: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Identifier lists are `;`-separated inside a single cell.
pub(crate) fn split_identifiers(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    parse_date(trimmed)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn timestamps_accept_rfc3339_and_plain_dates() {
        let rfc = parse_timestamp("2025-05-02T09:30:00+10:00").expect("rfc3339");
        assert_eq!(rfc.to_rfc3339(), "2025-05-01T23:30:00+00:00");

        let date = parse_timestamp("2025-05-02").expect("date");
        assert_eq!(date.to_rfc3339(), "2025-05-02T00:00:00+00:00");

        assert!(parse_timestamp("soon").is_none());
    }

    #[test]
    fn blank_optional_cells_become_none() {
        let rows = parse_rows(Cursor::new(
            "Title,Description,Company,Job Type,City,State,Pay Type,Poster,Currency,Latitude\n\
Dogman,Sling loads,Lift Co,RIGGING,Perth,WA,HOURLY,emp-1,,\n",
        ))
        .expect("parse");
        let row = &rows[0];
        assert_eq!(row.line, 2);
        assert!(row.job.currency.is_none());
        assert!(row.job.latitude.is_none());
        assert!(row.job.skills.is_empty());
    }

    #[test]
    fn identifier_cells_split_on_semicolons() {
        assert_eq!(
            split_identifiers("tower-crane; dogging;;"),
            vec!["tower-crane", "dogging"]
        );
    }
}
