//! Prompt composition. Deterministic and infallible: the same inputs always
//! produce the same prompt.

use crate::generation::prompts::RESUME_WRITER_PREAMBLE;
use crate::models::profile::{non_empty, Profile};

/// Builds the completion prompt for one job posting.
///
/// Each present optional profile field contributes one labeled clause; absent
/// or blank fields contribute nothing. The candidate's own title is always the
/// profile's `current_role`, never the posting's job title.
pub fn compose_prompt(job_title: &str, job_description: &str, profile: &Profile) -> String {
    let mut prompt = String::with_capacity(RESUME_WRITER_PREAMBLE.len() + job_description.len() + 512);
    prompt.push_str(RESUME_WRITER_PREAMBLE);
    prompt.push_str("\n\n");

    prompt.push_str(&format!(
        "I want to make a resume to apply for the job titled \"{job_title}\".\n"
    ));
    prompt.push_str(&format!(
        "My job title must be \"{}\".\n",
        profile.current_role()
    ));
    prompt.push_str(&format!(
        "The job description is as follows: {job_description}\n"
    ));

    let full_name = profile.full_name.trim();
    if !full_name.is_empty() {
        push_clause(&mut prompt, "name is", full_name);
    }
    let email = profile.email.trim();
    if !email.is_empty() {
        push_clause(&mut prompt, "email is", email);
    }

    let optional = [
        ("phone is", &profile.phone_number),
        ("address is", &profile.address),
        ("education is", &profile.education),
        ("work experience is", &profile.company_history),
        ("here is some more info about resume :", &profile.extra_note),
    ];
    for (label, value) in optional {
        if let Some(value) = non_empty(value) {
            push_clause(&mut prompt, label, value);
        }
    }

    let skills: Vec<&str> = profile
        .skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if !skills.is_empty() {
        push_clause(&mut prompt, "my skills includes also", &skills.join(", "));
    }

    prompt
}

fn push_clause(prompt: &mut String, label: &str, value: &str) {
    prompt.push_str(label);
    prompt.push(' ');
    prompt.push_str(value);
    prompt.push_str(".\n");
}
