

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use super::{DirectoryError, ExpertRecord};

const DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    RegisteredOn,
    FirstName,
    LastName,
    Email,
    MembershipCategory,
    JobTitle,
    Affiliation,
    Skills,
    YearsAiExperience,
    YearsHealthExperience,
    CommunityInvolvement,
    Suggestions,
    Consent,
    ProfilePhoto,
    LinkedIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Date,
    Number,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub field: Field,
    pub header: &'static str,
    pub index: usize,
    pub kind: ValueKind,
}

const fn column(field: Field, header: &'static str, index: usize, kind: ValueKind) -> ColumnSpec {
    ColumnSpec {
        field,
        header,
        index,
        kind,
    }
}

/// Column layout of the registration form export, in file order.
pub const COLUMNS: [ColumnSpec; 15] = [
    column(Field::RegisteredOn, "Date d'inscription", 0, ValueKind::Date),
    column(Field::FirstName, "Prénom", 1, ValueKind::Text),
    column(Field::LastName, "Nom", 2, ValueKind::Text),
    column(Field::Email, "Adresse courriel", 3, ValueKind::Text),
    column(Field::MembershipCategory, "Catégorie de membres", 4, ValueKind::Text),
    column(Field::JobTitle, "Titre d'emploi", 5, ValueKind::Text),
    column(Field::Affiliation, "Organisation d'affiliation", 6, ValueKind::Text),
    column(Field::Skills, "Compétences ou Expertise", 7, ValueKind::Text),
    column(Field::YearsAiExperience, "Nombre d'années d'expérience en IA", 8, ValueKind::Number),
    column(Field::YearsHealthExperience, "Nombre d'années d'expérience en santé", 9, ValueKind::Number),
    column(Field::CommunityInvolvement, "Impliquation dans la communauté", 10, ValueKind::Text),
    column(Field::Suggestions, "Suggestions", 11, ValueKind::Text),
    column(Field::Consent, "Consentement", 12, ValueKind::Text),
    column(Field::ProfilePhoto, "Photo de profil", 13, ValueKind::Text),
    column(Field::LinkedIn, "LinkedIn", 14, ValueKind::Text),
];


fn validate_headers(headers: &StringRecord) -> Result<(), DirectoryError> {
    for spec in &COLUMNS {
        let found = headers
            .get(spec.index)
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .unwrap_or_default();
        if found != spec.header {
            return Err(DirectoryError::SchemaMismatch {
                index: spec.index,
                expected: spec.header.to_string(),
                found: found.to_string(),
            });
        }
    }
    Ok(())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match NaiveDateTime::parse_from_str(raw, DATE_FORMAT) {
        Ok(dt) => Some(dt.date()),
        Err(e) => {
            debug!("Unparseable registration date '{}': {}", raw, e);
            None
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.replace(',', ".").parse::<f64>() {
        Ok(n) => Some(n),
        Err(e) => {
            debug!("Unparseable number '{}': {}", raw, e);
            None
        }
    }
}

fn apply(record: &mut ExpertRecord, spec: &ColumnSpec, raw: &str) {
    match spec.kind {
        ValueKind::Date => {
            if spec.field == Field::RegisteredOn {
                record.registered_on = parse_date(raw);
            }
        }
        ValueKind::Number => {
            let value = parse_number(raw);
            match spec.field {
                Field::YearsAiExperience => record.years_ai_experience = value,
                Field::YearsHealthExperience => record.years_health_experience = value,
                _ => {}
            }
        }
        ValueKind::Text => {
            let value = raw.to_string();
            match spec.field {
                Field::FirstName => record.first_name = value,
                Field::LastName => record.last_name = value,
                Field::Email => record.email = value.trim().to_string(),
                Field::MembershipCategory => record.membership_category = value,
                Field::JobTitle => record.job_title = value,
                Field::Affiliation => record.affiliation = value,
                Field::Skills => record.skills = value,
                Field::CommunityInvolvement => record.community_involvement = value,
                Field::Suggestions => record.suggestions = value,
                Field::Consent => record.consent = value,
                Field::ProfilePhoto => record.profile_photo = value,
                Field::LinkedIn => record.linkedin = value,
                _ => {}
            }
        }
    }
}


/// Reads directory rows. The header row is checked against [`COLUMNS`]
/// before any data row is looked at.
pub fn read_experts<R: Read>(reader: R) -> Result<Vec<ExpertRecord>, DirectoryError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    validate_headers(reader.headers()?)?;

    let mut experts = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        let line = i + 2;

        if row.len() < COLUMNS.len() {
            warn!("Skipping line {}: {} of {} columns", line, row.len(), COLUMNS.len());
            continue;
        }

        let mut record = ExpertRecord::default();
        for spec in &COLUMNS {
            apply(&mut record, spec, row.get(spec.index).unwrap_or_default());
        }

        if record.email.is_empty() {
            warn!("Skipping line {}: no e-mail address", line);
            continue;
        }
        experts.push(record);
    }

    Ok(experts)
}

pub fn load_experts_csv(path: impl AsRef<Path>) -> Result<Vec<ExpertRecord>, DirectoryError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let experts = read_experts(file)?;
    info!("Loaded {} expert(s) from {}", experts.len(), path.display());
    Ok(experts)
}
