//! Prompt construction.

use crate::dto::{EnhanceCvRequest, GenerateCvRequest, OptimizeCvRequest};
use cvgen_core::CvgenResult;

/// System prompt for generating a resume from profile data.
pub const GENERATION_SYSTEM_PROMPT: &str = r#"You are a professional resume writer and career coach who writes clear, ATS-friendly resumes for every industry.

Write a well-structured resume from the information provided:
- use a clean layout with clearly separated sections
- open bullet points with strong action verbs and quantify achievements where possible
- keep the tone professional and the wording concise
- tailor the content to the target role and industry when they are given

Return the resume as a single JSON object of this shape:
{
  "personalInfo": {"fullName": "string", "email": "string", "phone": "string", "location": "string", "summary": "string"},
  "experience": [{"company": "string", "position": "string", "startDate": "string", "endDate": "string", "description": "string", "achievements": ["string"]}],
  "education": [{"institution": "string", "degree": "string", "field": "string", "startDate": "string", "endDate": "string", "description": "string"}],
  "skills": ["string"],
  "projects": [{"name": "string", "description": "string", "technologies": ["string"], "link": "string"}],
  "certifications": [{"name": "string", "issuer": "string", "date": "string"}],
  "languages": [{"name": "string", "proficiency": "string"}]
}"#;

/// System prompt for improving an existing resume.
pub const ENHANCEMENT_SYSTEM_PROMPT: &str = r#"You are an expert resume editor. Improve the resume you are given so it reads stronger to recruiters and passes applicant tracking systems:
- rewrite bullet points around action verbs and measurable results
- tighten wording and keep tone and formatting consistent
- bring key achievements and skills forward
- tailor the content to the target role, industry and focus areas when they are given

Keep the original structure. Return the improved resume in the same JSON format as the input."#;

/// System prompt for tailoring a resume to a job description.
pub const OPTIMIZATION_SYSTEM_PROMPT: &str = r#"You are a resume tailoring specialist. Adapt the resume you are given to the job description:
- identify the key skills and requirements of the role
- emphasize the matching experience and skills, reordering sections when it helps
- work the relevant keywords in naturally
- adjust achievements so they speak to what the role needs

Return the tailored resume in the same JSON format as the input."#;

/// Renders the profile part of a generation request as prompt text.
///
/// Absent fields and empty sections are left out.
pub fn build_user_context(request: &GenerateCvRequest) -> String {
    let mut context = String::from("Personal Information:\n");
    context.push_str(&format!("Name: {}\n", request.full_name));
    push_optional(&mut context, "Email", request.email.as_deref());
    push_optional(&mut context, "Phone", request.phone.as_deref());
    push_optional(&mut context, "Location", request.location.as_deref());
    push_optional(&mut context, "Professional Summary", request.summary.as_deref());
    context.push('\n');

    if !request.experience.is_empty() {
        context.push_str("Work Experience:\n");
        for (idx, exp) in request.experience.iter().enumerate() {
            context.push_str(&format!(
                "{}. {} at {}\n   Period: {} - {}\n   Description: {}\n",
                idx + 1,
                exp.position,
                exp.company,
                exp.start_date,
                exp.end_date,
                exp.description
            ));
            if !exp.achievements.is_empty() {
                context.push_str(&format!(
                    "   Achievements:\n   - {}\n",
                    exp.achievements.join("\n   - ")
                ));
            }
        }
        context.push('\n');
    }

    if !request.education.is_empty() {
        context.push_str("Education:\n");
        for (idx, edu) in request.education.iter().enumerate() {
            context.push_str(&format!(
                "{}. {} in {}\n   Institution: {}\n   Period: {} - {}\n",
                idx + 1,
                edu.degree,
                edu.field,
                edu.institution,
                edu.start_date,
                edu.end_date
            ));
            if let Some(description) = &edu.description {
                context.push_str(&format!("   Description: {description}\n"));
            }
        }
        context.push('\n');
    }

    if !request.skills.is_empty() {
        context.push_str(&format!("Skills:\n{}\n\n", request.skills.join(", ")));
    }

    if !request.projects.is_empty() {
        context.push_str("Projects:\n");
        for (idx, project) in request.projects.iter().enumerate() {
            context.push_str(&format!(
                "{}. {}\n   Description: {}\n   Technologies: {}\n",
                idx + 1,
                project.name,
                project.description,
                project.technologies.join(", ")
            ));
            if let Some(link) = &project.link {
                context.push_str(&format!("   Link: {link}\n"));
            }
        }
        context.push('\n');
    }

    if !request.certifications.is_empty() {
        context.push_str("Certifications:\n");
        for (idx, cert) in request.certifications.iter().enumerate() {
            context.push_str(&format!(
                "{}. {} - {} ({})\n",
                idx + 1,
                cert.name,
                cert.issuer,
                cert.date
            ));
        }
        context.push('\n');
    }

    if !request.languages.is_empty() {
        context.push_str("Languages:\n");
        for (idx, lang) in request.languages.iter().enumerate() {
            context.push_str(&format!("{}. {} - {}\n", idx + 1, lang.name, lang.proficiency));
        }
        context.push('\n');
    }

    context
}

/// User message for a generation request.
pub fn generate_user_message(request: &GenerateCvRequest) -> String {
    let mut message = format!(
        "Generate a professional resume based on the following information:\n\n{}",
        build_user_context(request)
    );
    push_optional(&mut message, "Target Role", request.target_role.as_deref());
    push_optional(&mut message, "Target Industry", request.target_industry.as_deref());
    message.push_str(
        "\nCreate a compelling, ATS-optimized resume that highlights the candidate's strengths \
         and fits their career goals. Return the result as a JSON object.",
    );
    message
}

/// User message for an enhancement request.
pub fn enhance_user_message(request: &EnhanceCvRequest) -> CvgenResult<String> {
    let mut message = format!(
        "Enhance the following resume:\n\nCurrent Resume:\n{}\n\n",
        serde_json::to_string_pretty(&request.cv_data)?
    );
    push_optional(&mut message, "Target Role", request.target_role.as_deref());
    push_optional(&mut message, "Target Industry", request.target_industry.as_deref());
    if !request.focus_areas.is_empty() {
        message.push_str(&format!("Focus Areas: {}\n", request.focus_areas.join(", ")));
    }
    message.push_str(
        "\nMake this resume more impactful and professional. \
         Return the enhanced resume as a JSON object.",
    );
    Ok(message)
}

/// User message for an optimization request.
pub fn optimize_user_message(request: &OptimizeCvRequest) -> CvgenResult<String> {
    Ok(format!(
        "Optimize the following resume for this job description:\n\n\
         Job Description:\n{}\n\n\
         Current Resume:\n{}\n\n\
         Tailor this resume to the job description, highlighting relevant skills and experience. \
         Return the optimized resume as a JSON object.",
        request.job_description,
        serde_json::to_string_pretty(&request.cv_data)?
    ))
}

fn push_optional(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        out.push_str(&format!("{label}: {value}\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{CertificationEntry, ExperienceEntry, LanguageEntry};
    use serde_json::json;

    fn full_request() -> GenerateCvRequest {
        let mut request = GenerateCvRequest::new("Ada Lovelace");
        request.email = Some("ada@example.com".to_string());
        request.experience = vec![ExperienceEntry {
            company: "Engines Ltd".to_string(),
            position: "Programmer".to_string(),
            start_date: "1842-01".to_string(),
            end_date: "1843-12".to_string(),
            description: "Wrote the first program".to_string(),
            achievements: vec!["Bernoulli numbers".to_string(), "Note G".to_string()],
        }];
        request.skills = vec!["mathematics".to_string(), "analysis".to_string()];
        request.certifications = vec![CertificationEntry {
            name: "Royal Society".to_string(),
            issuer: "London".to_string(),
            date: "1843".to_string(),
        }];
        request.languages = vec![LanguageEntry {
            name: "French".to_string(),
            proficiency: "Fluent".to_string(),
        }];
        request
    }

    #[test]
    fn test_context_sections() {
        let context = build_user_context(&full_request());

        assert!(context.starts_with(
            "Personal Information:\nName: Ada Lovelace\nEmail: ada@example.com\n"
        ));
        assert!(!context.contains("Phone:"));
        assert!(context.contains("1. Programmer at Engines Ltd\n   Period: 1842-01 - 1843-12\n"));
        assert!(context.contains("   Achievements:\n   - Bernoulli numbers\n   - Note G\n"));
        assert!(context.contains("Skills:\nmathematics, analysis\n"));
        assert!(context.contains("1. Royal Society - London (1843)\n"));
        assert!(context.contains("Languages:\n1. French - Fluent\n"));
        assert!(!context.contains("Education:"));
        assert!(!context.contains("Projects:"));
    }

    #[test]
    fn test_generate_message_targets() {
        let mut request = GenerateCvRequest::new("Ada");
        assert!(!generate_user_message(&request).contains("Target Role"));

        request.target_role = Some("Engineer".to_string());
        request.target_industry = Some("Computing".to_string());
        let message = generate_user_message(&request);
        assert!(message.contains("Target Role: Engineer\n"));
        assert!(message.contains("Target Industry: Computing\n"));
    }

    #[test]
    fn test_enhance_message_focus_areas() {
        let request = EnhanceCvRequest {
            cv_data: json!({"skills": ["rust"]}),
            target_role: None,
            target_industry: None,
            focus_areas: vec!["leadership".to_string(), "impact".to_string()],
        };
        let message = enhance_user_message(&request).unwrap();
        assert!(message.contains("\"skills\""));
        assert!(message.contains("Focus Areas: leadership, impact\n"));
    }

    #[test]
    fn test_optimize_message_includes_job_description() {
        let request = OptimizeCvRequest {
            cv_data: json!({"skills": ["rust"]}),
            job_description: "Senior Rust engineer".to_string(),
        };
        let message = optimize_user_message(&request).unwrap();
        assert!(message.contains("Job Description:\nSenior Rust engineer\n"));
        assert!(message.contains("Current Resume:\n{"));
    }
}
