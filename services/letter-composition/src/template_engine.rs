//! Letter Template Engine
//! 
//! Handlebars-based rendering of plain-text parent letters.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use reportcard_models::{AttendanceRecord, LetterSettings, StudentGrade};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Letter template definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub body_template: String,
    pub variables: Vec<TemplateVariable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateVariable {
    pub name: String,
    pub description: String,
}

/// One rendered letter
#[derive(Debug, Clone, Serialize)]
pub struct RenderedLetter {
    /// Normalized student key
    pub student: String,
    pub display_name: String,
    pub has_attendance: bool,
    pub body: String,
}

/// Result of composing letters for a class
#[derive(Debug, Clone, Serialize)]
pub struct LetterBatch {
    pub template_id: String,
    pub letters: Vec<RenderedLetter>,
    /// Students left out by the grade cutoff
    pub filtered_out: usize,
}

#[derive(Serialize)]
struct AttendanceCounts {
    tardies: u32,
    absences: u32,
}

#[derive(Serialize)]
struct LetterContext<'a> {
    student: &'a str,
    first_name: &'a str,
    grade: &'a str,
    percent: &'a str,
    class_name: &'a str,
    missing_count: usize,
    missing_assignments: &'a [String],
    attendance: Option<AttendanceCounts>,
    custom_message: &'a str,
    teacher_name: &'a str,
    teacher_email: &'a str,
}

const PROGRESS_LETTER: &str = concat!(
    "To the Parent/Guardian of {{student}},\n",
    "\tThis letter is to let you know that {{first_name}} currently has a grade of ",
    "{{percent}} ({{grade}}) in their {{class_name}} class and has {{missing_count}} ",
    "missing assignments{{#if attendance}}, {{attendance.tardies}} tardies, and ",
    "{{attendance.absences}} absences{{/if}}. ",
    "{{#if custom_message}}{{custom_message}} {{/if}}",
    "If you have any questions or concerns, please do not hesitate to contact me at ",
    "{{teacher_email}}\n\n",
    "{{#if missing_assignments}}Missing Assignments:\n",
    "{{#each missing_assignments}}\t{{this}}\n{{/each}}\n{{/if}}",
    "Student Name: _______________________________\n\n",
    "Parent Name: _______________________________\n\n",
    "Parent Signature: ______________________________\n\n",
    "Date: _______________________________\n\n",
    "{{teacher_name}}\n",
    "{{class_name}} Teacher\n",
    "{{teacher_email}}",
);

const MISSING_WORK_NOTICE: &str = concat!(
    "To the Parent/Guardian of {{student}},\n",
    "\t{{first_name}} has {{missing_count}} missing assignments in {{class_name}}",
    "{{#if attendance}} and has been absent {{attendance.absences}} times{{/if}}. ",
    "{{#if custom_message}}{{custom_message}} {{/if}}",
    "Please contact me at {{teacher_email}} with any questions.\n\n",
    "{{#each missing_assignments}}\t{{this}}\n{{/each}}\n",
    "{{teacher_name}}\n",
    "{{teacher_email}}",
);

/// Letter composer
pub struct LetterComposer {
    handlebars: Handlebars<'static>,
    templates: HashMap<String, LetterTemplate>,
}

impl LetterComposer {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        // Letters are plain text
        handlebars.register_escape_fn(handlebars::no_escape);

        let mut composer = Self {
            handlebars,
            templates: HashMap::new(),
        };
        composer.register_builtin_templates()?;

        Ok(composer)
    }

    fn register_builtin_templates(&mut self) -> Result<()> {
        let common = || {
            vec![
                variable("student", "Student name as printed"),
                variable("first_name", "Student first name"),
                variable("class_name", "Class name"),
                variable("missing_count", "Number of missing assignments"),
                variable("missing_assignments", "Missing assignment titles"),
                variable("attendance", "Tardy and absence counts, when attendance data exists"),
                variable("custom_message", "Teacher message"),
                variable("teacher_name", "Teacher name"),
                variable("teacher_email", "Teacher email"),
            ]
        };

        let mut progress_variables = common();
        progress_variables.push(variable("grade", "Letter grade"));
        progress_variables.push(variable("percent", "Grade percentage"));

        self.register_template(LetterTemplate {
            id: "progress_letter".to_string(),
            name: "Progress Letter".to_string(),
            description: "Grade, missing work and attendance summary with a parent signature form"
                .to_string(),
            body_template: PROGRESS_LETTER.to_string(),
            variables: progress_variables,
        })?;

        self.register_template(LetterTemplate {
            id: "missing_work_notice".to_string(),
            name: "Missing Work Notice".to_string(),
            description: "Short notice listing missing assignments".to_string(),
            body_template: MISSING_WORK_NOTICE.to_string(),
            variables: common(),
        })?;

        Ok(())
    }

    /// Compile and register a template, replacing any with the same id
    pub fn register_template(&mut self, template: LetterTemplate) -> Result<()> {
        self.handlebars
            .register_template_string(&template.id, &template.body_template)
            .with_context(|| format!("Invalid letter template {}", template.id))?;
        self.templates.insert(template.id.clone(), template);
        Ok(())
    }

    pub fn get_template(&self, template_id: &str) -> Option<&LetterTemplate> {
        self.templates.get(template_id)
    }

    /// List all templates, sorted by id
    pub fn list_templates(&self) -> Vec<&LetterTemplate> {
        let mut templates: Vec<&LetterTemplate> = self.templates.values().collect();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        templates
    }

    /// Render one student's letter
    pub fn render(
        &self,
        template_id: &str,
        settings: &LetterSettings,
        student: &StudentGrade,
        attendance: Option<&AttendanceRecord>,
    ) -> Result<String> {
        self.templates
            .get(template_id)
            .with_context(|| format!("Template not found: {}", template_id))?;

        let context = LetterContext {
            student: &student.display_name,
            first_name: &student.first_name,
            grade: &student.grade,
            percent: &student.percent,
            class_name: &settings.class_name,
            missing_count: student.missing_count(),
            missing_assignments: &student.missing_assignments,
            attendance: attendance.map(|record| AttendanceCounts {
                tardies: record.tardies(),
                absences: record.absences(),
            }),
            custom_message: settings.custom_message.trim(),
            teacher_name: &settings.teacher_name,
            teacher_email: &settings.teacher_email,
        };

        self.handlebars
            .render(template_id, &context)
            .with_context(|| format!("Failed to render letter for {}", student.display_name))
    }

    /// Render letters for a class.
    ///
    /// Attendance is looked up by the student's normalized name. With
    /// `apply_cutoff`, only students below `settings.grade_cutoff` get a letter.
    pub fn compose(
        &self,
        template_id: &str,
        settings: &LetterSettings,
        students: &[StudentGrade],
        attendance: &BTreeMap<String, AttendanceRecord>,
        apply_cutoff: bool,
    ) -> Result<LetterBatch> {
        let cutoff = settings.grade_cutoff.filter(|_| apply_cutoff);

        let mut letters = Vec::new();
        let mut filtered_out = 0;
        for student in students {
            if let Some(cutoff) = cutoff {
                if !student.is_below(cutoff) {
                    filtered_out += 1;
                    continue;
                }
            }

            let record = attendance.get(&student.name);
            let body = self.render(template_id, settings, student, record)?;
            debug!(student = %student.name, has_attendance = record.is_some(), "Rendered letter");

            letters.push(RenderedLetter {
                student: student.name.clone(),
                display_name: student.display_name.clone(),
                has_attendance: record.is_some(),
                body,
            });
        }

        Ok(LetterBatch {
            template_id: template_id.to_string(),
            letters,
            filtered_out,
        })
    }
}

fn variable(name: &str, description: &str) -> TemplateVariable {
    TemplateVariable {
        name: name.to_string(),
        description: description.to_string(),
    }
}
