//! File names for generated resumes:
//! `<fullName>_<companyName>_<jobTitle>_<dayOfMonth>.pdf`.

use chrono::{Datelike, Utc};

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_component(input: &str) -> String {
    input
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Builds the resume file name for a given day of month.
pub fn resume_file_name(full_name: &str, company_name: &str, job_title: &str, day: u32) -> String {
    format!(
        "{}_{}_{}_{}.pdf",
        sanitize_component(full_name),
        sanitize_component(company_name),
        sanitize_component(job_title),
        day
    )
}

/// `resume_file_name` stamped with today's day of month (UTC).
pub fn resume_file_name_today(full_name: &str, company_name: &str, job_title: &str) -> String {
    resume_file_name(full_name, company_name, job_title, Utc::now().day())
}
