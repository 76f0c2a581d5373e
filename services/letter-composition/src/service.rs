//! Letter Service
//! 
//! Gradebook import and letter rendering behind the HTTP handlers.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use reportcard_models::{AttendanceRecord, LetterSettings, StudentGrade};
use reportcard_utils::{
    validate_model, GradebookFormat, GradebookParser, LettersConfig, ParsedGradebook, ReportError,
    ReportResult,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::template_engine::{LetterBatch, LetterComposer};

/// Render letters request
#[derive(Debug, Deserialize)]
pub struct RenderLettersRequest {
    /// Falls back to the configured default template
    pub template_id: Option<String>,
    pub settings: LetterSettings,
    pub students: Vec<StudentGrade>,
    /// Parsed attendance keyed by normalized student name
    #[serde(default)]
    pub attendance: BTreeMap<String, AttendanceRecord>,
}

#[derive(Debug, Serialize)]
pub struct TemplateInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub variables: Vec<String>,
}

/// Letter service
#[derive(Clone)]
pub struct LetterService {
    composer: Arc<LetterComposer>,
    gradebook_parser: Arc<GradebookParser>,
    config: LettersConfig,
}

impl LetterService {
    pub fn new(config: LettersConfig) -> Result<Self> {
        Ok(Self {
            composer: Arc::new(LetterComposer::new()?),
            gradebook_parser: Arc::new(GradebookParser::new()),
            config,
        })
    }

    /// Parse an uploaded gradebook export
    pub fn parse_gradebook(
        &self,
        filename: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> ReportResult<ParsedGradebook> {
        let format = GradebookFormat::from_extension(Path::new(filename))
            .or_else(|| content_type.and_then(GradebookFormat::from_content_type));

        let gradebook = self.gradebook_parser.parse_bytes(filename, data, format)?;
        info!(
            %filename,
            students = gradebook.students.len(),
            warnings = gradebook.warnings.len(),
            "Parsed gradebook"
        );

        Ok(gradebook)
    }

    /// Render one letter per student
    pub fn render_letters(&self, request: &RenderLettersRequest) -> ReportResult<LetterBatch> {
        validate_model(&request.settings)?;

        let template_id = request
            .template_id
            .as_deref()
            .unwrap_or(self.config.default_template.as_str());
        if self.composer.get_template(template_id).is_none() {
            return Err(ReportError::not_found(format!("letter template {}", template_id)));
        }

        let batch = self
            .composer
            .compose(
                template_id,
                &request.settings,
                &request.students,
                &request.attendance,
                self.config.apply_grade_cutoff,
            )
            .map_err(|e| ReportError::template(format!("{:#}", e)))?;

        info!(
            template = template_id,
            letters = batch.letters.len(),
            filtered_out = batch.filtered_out,
            "Rendered letters"
        );

        Ok(batch)
    }

    /// List available templates
    pub fn list_templates(&self) -> Vec<TemplateInfo> {
        self.composer
            .list_templates()
            .iter()
            .map(|t| TemplateInfo {
                id: t.id.clone(),
                name: t.name.clone(),
                description: t.description.clone(),
                variables: t.variables.iter().map(|v| v.name.clone()).collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reportcard_utils::AppConfig;

    fn service() -> LetterService {
        LetterService::new(AppConfig::default().letters).unwrap()
    }

    fn request(json: serde_json::Value) -> RenderLettersRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_gradebook_to_letters() {
        let service = service();
        let gradebook = service
            .parse_gradebook(
                "period3.csv",
                Some("text/csv"),
                b"Student,Grade,Quiz 1\n\"Smith, John\",D 64%,0\n\"Perez, Ana\",A 94%,10\n",
            )
            .unwrap();

        let request = RenderLettersRequest {
            template_id: None,
            settings: LetterSettings {
                teacher_name: "Ms. Rivera".to_string(),
                teacher_email: "rivera@example.org".to_string(),
                class_name: "Algebra I".to_string(),
                custom_message: String::new(),
                grade_cutoff: Some(70.0),
            },
            students: gradebook.students,
            attendance: BTreeMap::new(),
        };

        let batch = service.render_letters(&request).unwrap();
        assert_eq!(batch.template_id, "progress_letter");
        assert_eq!(batch.letters.len(), 1);
        assert_eq!(batch.filtered_out, 1);
        assert!(batch.letters[0].body.contains("\tQuiz 1\n"));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let request = request(serde_json::json!({
            "settings": {
                "teacher_name": "Ms. Rivera",
                "teacher_email": "not-an-email",
                "class_name": "Algebra I"
            },
            "students": []
        }));

        let err = service().render_letters(&request).unwrap_err();
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_unknown_template_not_found() {
        let request = request(serde_json::json!({
            "template_id": "welcome",
            "settings": {
                "teacher_name": "Ms. Rivera",
                "teacher_email": "rivera@example.org",
                "class_name": "Algebra I"
            },
            "students": []
        }));

        let err = service().render_letters(&request).unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_unknown_gradebook_format() {
        let err = service()
            .parse_gradebook("grades.pdf", Some("application/pdf"), b"%PDF")
            .unwrap_err();
        assert_eq!(err.error_code(), "GRADEBOOK_ERROR");
    }

    #[test]
    fn test_list_templates() {
        let templates = service().list_templates();
        assert_eq!(templates.len(), 2);
        assert!(templates.iter().any(|t| t.id == "progress_letter"));
    }
}
