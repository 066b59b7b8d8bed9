//! Resume request DTOs.

use cvgen_core::rules::{json_object, not_blank};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Request to generate a resume from raw profile data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCvRequest {
    #[validate(custom(function = "not_blank", message = "Full name is required"))]
    pub full_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub education: Vec<EducationEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub experience: Vec<ExperienceEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<ProjectEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<CertificationEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<LanguageEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_industry: Option<String>,
}

impl GenerateCvRequest {
    /// Creates a request carrying only a name.
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: None,
            phone: None,
            location: None,
            summary: None,
            education: Vec::new(),
            experience: Vec::new(),
            skills: Vec::new(),
            projects: Vec::new(),
            certifications: Vec::new(),
            languages: Vec::new(),
            target_role: None,
            target_industry: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationEntry {
    pub name: String,
    pub issuer: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageEntry {
    pub name: String,
    pub proficiency: String,
}

/// Request to improve an existing resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceCvRequest {
    #[validate(custom(function = "json_object", message = "cvData must be an object"))]
    pub cv_data: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_industry: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focus_areas: Vec<String>,
}

/// Request to tailor an existing resume to a job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeCvRequest {
    #[validate(custom(function = "json_object", message = "cvData must be an object"))]
    pub cv_data: Value,

    #[validate(custom(function = "not_blank", message = "Job description is required"))]
    pub job_description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvgen_core::{CvgenError, ValidateExt};
    use serde_json::json;

    #[test]
    fn test_generate_request_from_camel_case() {
        let request: GenerateCvRequest = serde_json::from_value(json!({
            "fullName": "Ada Lovelace",
            "targetRole": "Engineer",
            "experience": [{
                "company": "Engines Ltd",
                "position": "Programmer",
                "startDate": "1842-01",
                "endDate": "1843-12",
                "description": "Notes on the engine"
            }]
        }))
        .unwrap();

        assert_eq!(request.full_name, "Ada Lovelace");
        assert_eq!(request.target_role.as_deref(), Some("Engineer"));
        assert_eq!(request.experience[0].start_date, "1842-01");
        assert!(request.experience[0].achievements.is_empty());
        assert!(request.validate_request().is_ok());
    }

    #[test]
    fn test_absent_and_empty_lists_serialize_alike() {
        let absent: GenerateCvRequest = serde_json::from_value(json!({"fullName": "Ada"})).unwrap();
        let empty: GenerateCvRequest =
            serde_json::from_value(json!({"fullName": "Ada", "skills": []})).unwrap();
        assert_eq!(
            serde_json::to_value(&absent).unwrap(),
            serde_json::to_value(&empty).unwrap()
        );
    }

    #[test]
    fn test_enhance_absent_and_empty_focus_areas_serialize_alike() {
        let absent: EnhanceCvRequest = serde_json::from_value(json!({"cvData": {}})).unwrap();
        let empty: EnhanceCvRequest =
            serde_json::from_value(json!({"cvData": {}, "focusAreas": []})).unwrap();
        assert_eq!(absent, empty);
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({"cvData": {}}));
    }

    #[test]
    fn test_blank_full_name_rejected() {
        let err = GenerateCvRequest::new("  ").validate_request().unwrap_err();
        match err {
            CvgenError::Validation(message) => assert!(message.contains("Full name is required")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_enhance_requires_object() {
        let request = EnhanceCvRequest {
            cv_data: json!(["not", "an", "object"]),
            target_role: None,
            target_industry: None,
            focus_areas: Vec::new(),
        };
        assert!(request.validate_request().is_err());
    }

    #[test]
    fn test_optimize_requires_job_description() {
        let request = OptimizeCvRequest {
            cv_data: json!({"skills": ["rust"]}),
            job_description: String::new(),
        };
        assert!(request.validate_request().is_err());

        let request = OptimizeCvRequest {
            job_description: "Senior Rust engineer".to_string(),
            ..request
        };
        assert!(request.validate_request().is_ok());
    }
}
