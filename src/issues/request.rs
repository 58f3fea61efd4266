use serde::Serialize;

use super::urls;
use crate::error::{Error, Result};
use crate::github::{FieldUpdateRequest, NewIssue};
use crate::project::default_fields;
use crate::validators;

/// Catalog metadata for a course. Supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseContent {
  pub course_id: String,
  pub uuid: Option<String>,
  pub title: Option<String>,
}

impl CourseContent {
  pub fn new(course_id: impl Into<String>) -> Self {
    Self {
      course_id: course_id.into(),
      ..Self::default()
    }
  }

  /// Title used for the PlanB slug; the course id when no title is known.
  fn display_title(&self) -> &str {
    self.title.as_deref().unwrap_or(&self.course_id)
  }
}

/// Catalog metadata for a tutorial. Supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TutorialContent {
  pub category: String,
  pub name: String,
  pub id: Option<String>,
  pub title: Option<String>,
}

impl TutorialContent {
  pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      category: category.into(),
      name: name.into(),
      ..Self::default()
    }
  }

  fn display_title(&self) -> &str {
    self.title.as_deref().unwrap_or(&self.name)
  }
}

/// What is being proofread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
  Course(CourseContent),
  VideoCourse(CourseContent),
  ImageCourse(CourseContent),
  Tutorial(TutorialContent),
  TutorialSection { section: String },
  Weblate,
}

impl IssueKind {
  /// Value of the board's "Content Type" field.
  pub fn content_type(&self) -> &'static str {
    match self {
      Self::Course(_) => "Course",
      Self::VideoCourse(_) => "Video Course",
      Self::ImageCourse(_) => "Image Course",
      Self::Tutorial(_) | Self::TutorialSection { .. } => "Tutorial",
      Self::Weblate => "Weblate",
    }
  }

  /// Weblate issues point at the translation platform, not a branch.
  pub fn uses_branch(&self) -> bool {
    !matches!(self, Self::Weblate)
  }
}

/// A proofreading issue request: the target plus the assignment details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
  pub kind: IssueKind,
  pub language: String,
  pub branch: String,
  pub iteration: String,
  pub urgency: String,
}

/// Everything needed to create and link an issue. Building one has no side
/// effects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueDraft {
  pub title: String,
  pub body: String,
  pub labels: Vec<String>,
  #[serde(serialize_with = "serialize_fields")]
  pub project_fields: Vec<FieldUpdateRequest>,
}

fn serialize_fields<S>(fields: &[FieldUpdateRequest], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
  S: serde::Serializer,
{
  use serde::ser::SerializeMap;
  let mut map = serializer.serialize_map(Some(fields.len()))?;
  for field in fields {
    map.serialize_entry(&field.field_name, &field.value)?;
  }
  map.end()
}

impl IssueDraft {
  pub fn to_new_issue(&self) -> NewIssue {
    NewIssue {
      title: self.title.clone(),
      body: self.body.clone(),
      labels: self.labels.clone(),
    }
  }

  #[cfg(test)]
  pub(crate) fn field_value(&self, name: &str) -> Option<&serde_json::Value> {
    self
      .project_fields
      .iter()
      .find(|f| f.field_name == name)
      .map(|f| &f.value)
  }
}

impl IssueRequest {
  pub fn new(kind: IssueKind, language: impl Into<String>) -> Self {
    Self {
      kind,
      language: language.into(),
      branch: "dev".to_string(),
      iteration: "1st".to_string(),
      urgency: "not urgent".to_string(),
    }
  }

  pub fn branch(mut self, branch: impl Into<String>) -> Self {
    self.branch = branch.into();
    self
  }

  pub fn iteration(mut self, iteration: impl Into<String>) -> Self {
    self.iteration = iteration.into();
    self
  }

  pub fn urgency(mut self, urgency: impl Into<String>) -> Self {
    self.urgency = urgency.into();
    self
  }

  pub fn validate(&self) -> Result<()> {
    validators::validate_language_code(&self.language)?;
    validators::validate_iteration(&self.iteration)?;
    validators::validate_urgency(&self.urgency)?;
    if self.kind.uses_branch() {
      validators::validate_branch_name(&self.branch)?;
    }
    match &self.kind {
      IssueKind::Course(c) | IssueKind::VideoCourse(c) | IssueKind::ImageCourse(c) => {
        validators::validate_course_id(&c.course_id)
      }
      IssueKind::Tutorial(t) if t.category.is_empty() || t.name.is_empty() => Err(Error::invalid(
        "tutorial",
        "tutorial needs both a category and a name",
      )),
      IssueKind::TutorialSection { section } if section.is_empty() => {
        Err(Error::invalid("section", "section cannot be empty"))
      }
      IssueKind::Tutorial(_) | IssueKind::TutorialSection { .. } | IssueKind::Weblate => Ok(()),
    }
  }

  pub fn title(&self) -> String {
    let lang = &self.language;
    match &self.kind {
      IssueKind::Course(c) => format!("[PROOFREADING] {} - {}", c.course_id, lang),
      IssueKind::VideoCourse(c) => format!("[VIDEO-PROOFREADING] {} - {}", c.course_id, lang),
      IssueKind::ImageCourse(c) => format!("[IMAGE-PROOFREADING] {} - {}", c.course_id, lang),
      IssueKind::Tutorial(t) => format!("[PROOFREADING] {}/{} - {}", t.category, t.name, lang),
      IssueKind::TutorialSection { section } => {
        format!("[PROOFREADING] {}_section - {}", section, lang)
      }
      IssueKind::Weblate => format!("[PROOFREADING] weblate - {}", lang),
    }
  }

  pub fn labels(&self) -> Vec<String> {
    let lang = &self.language;
    match &self.kind {
      IssueKind::Course(_) => vec![
        "content - course".into(),
        "content proofreading".into(),
        format!("language - {}", lang),
      ],
      IssueKind::VideoCourse(_) => vec![
        "content - course".into(),
        "content proofreading".into(),
        format!("language - {}", lang),
        "video transcript".into(),
      ],
      // The image board labels its languages in brackets
      IssueKind::ImageCourse(_) => vec![
        "content - course".into(),
        "content - images".into(),
        format!("language - [{}]", lang),
      ],
      IssueKind::Tutorial(_) | IssueKind::TutorialSection { .. } => vec![
        "content - tutorial".into(),
        "content proofreading".into(),
        format!("language - {}", lang),
      ],
      IssueKind::Weblate => vec!["website translation".into(), format!("language - {}", lang)],
    }
  }

  pub fn body(&self) -> String {
    let lang = self.language.as_str();
    let branch = self.branch.as_str();
    let lines: Vec<String> = match &self.kind {
      IssueKind::Course(c) => {
        let mut lines = vec![format!(
          "en PBN version: {}",
          urls::planb_course_url(c.display_title(), c.uuid.as_deref(), lang)
        )];
        lines.extend(
          urls::github_course_urls(&c.course_id, lang, branch)
            .into_iter()
            .map(|(l, url)| format!("{} github version: {}", l, url)),
        );
        lines
      }
      IssueKind::Tutorial(t) => {
        let mut lines = vec![format!(
          "en PBN version: {}",
          urls::planb_tutorial_url(
            &t.category,
            &t.name,
            t.display_title(),
            t.id.as_deref(),
            lang
          )
        )];
        lines.extend(
          urls::github_tutorial_urls(&t.category, &t.name, lang, branch)
            .into_iter()
            .map(|(l, url)| format!("{} github version: {}", l, url)),
        );
        lines
      }
      IssueKind::VideoCourse(c) => {
        let dir = urls::github_course_dir_url(&c.course_id, branch);
        vec![
          format!(
            "English PBN Version: {}",
            urls::planb_course_url(c.display_title(), c.uuid.as_deref(), "en")
          ),
          format!("EN GitHub Version: {}/en.md", dir),
          format!("{} GitHub Version: {}/{}.md", lang, dir, lang),
          "Workspace link shared privately".into(),
        ]
      }
      IssueKind::ImageCourse(c) => vec![
        format!(
          "English PBN Version: {}",
          urls::planb_course_url(c.display_title(), c.uuid.as_deref(), lang)
        ),
        format!(
          "EN GitHub Version: {}/en/",
          urls::github_course_assets_url(&c.course_id, branch)
        ),
        "Workspace link shared privately".into(),
      ],
      IssueKind::TutorialSection { section } => vec![
        format!(
          "English PBN Version: {}",
          urls::planb_tutorial_section_url(section, "en")
        ),
        format!(
          "Folder GitHub Version: {}",
          urls::github_tutorial_section_url(section, branch)
        ),
      ],
      IssueKind::Weblate => vec![format!("Weblate Url: {}", urls::weblate_url(lang))],
    };
    lines.join("\n")
  }

  pub fn project_fields(&self) -> Vec<FieldUpdateRequest> {
    default_fields(
      self.kind.content_type(),
      &self.language,
      &self.iteration,
      &self.urgency,
    )
  }

  pub fn draft(&self) -> IssueDraft {
    IssueDraft {
      title: self.title(),
      body: self.body(),
      labels: self.labels(),
      project_fields: self.project_fields(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::Value;

  fn course() -> CourseContent {
    CourseContent {
      course_id: "btc101".into(),
      uuid: Some("1a2b".into()),
      title: Some("Bitcoin 101".into()),
    }
  }

  #[test]
  fn test_course_draft() {
    let draft = IssueRequest::new(IssueKind::Course(course()), "fr")
      .branch("fr-proofreading")
      .iteration("2nd")
      .urgency("urgent")
      .draft();

    assert_eq!(draft.title, "[PROOFREADING] btc101 - fr");
    assert_eq!(
      draft.labels,
      vec!["content - course", "content proofreading", "language - fr"]
    );
    assert_eq!(
      draft.body,
      "en PBN version: https://planb.network/fr/courses/bitcoin-101-1a2b\n\
       en github version: https://github.com/PlanB-Network/bitcoin-educational-content/blob/fr-proofreading/courses/btc101/en.md\n\
       fr github version: https://github.com/PlanB-Network/bitcoin-educational-content/blob/fr-proofreading/courses/btc101/fr.md"
    );
    assert_eq!(draft.field_value("Content Type"), Some(&Value::from("Course")));
    assert_eq!(draft.field_value("Iteration"), Some(&Value::from("2nd")));
    assert_eq!(draft.field_value("Status"), Some(&Value::from("Todo")));
  }

  #[test]
  fn test_video_course_variant() {
    let request = IssueRequest::new(IssueKind::VideoCourse(course()), "es");
    assert_eq!(request.title(), "[VIDEO-PROOFREADING] btc101 - es");
    assert_eq!(request.labels().last().map(String::as_str), Some("video transcript"));
    assert!(request.body().starts_with("English PBN Version: https://planb.network/en/courses/"));
    assert!(request.body().ends_with("Workspace link shared privately"));
    assert_eq!(
      request.draft().field_value("Content Type"),
      Some(&Value::from("Video Course"))
    );
  }

  #[test]
  fn test_image_course_labels_bracket_language() {
    let request = IssueRequest::new(IssueKind::ImageCourse(course()), "de");
    assert_eq!(request.title(), "[IMAGE-PROOFREADING] btc101 - de");
    assert_eq!(
      request.labels(),
      vec!["content - course", "content - images", "language - [de]"]
    );
    assert!(request.body().contains("/blob/dev/courses/btc101/assets/en/"));
  }

  #[test]
  fn test_tutorial_and_section_titles() {
    let tutorial = IssueRequest::new(
      IssueKind::Tutorial(TutorialContent::new("wallet", "sparrow")),
      "it",
    );
    assert_eq!(tutorial.title(), "[PROOFREADING] wallet/sparrow - it");
    // Falls back to the name for the slug
    assert!(tutorial.body().starts_with(
      "en PBN version: https://planb.network/it/tutorials/wallet/sparrow/sparrow\n"
    ));

    let section = IssueRequest::new(
      IssueKind::TutorialSection {
        section: "wallet".into(),
      },
      "it",
    );
    assert_eq!(section.title(), "[PROOFREADING] wallet_section - it");
    assert_eq!(
      section.body(),
      "English PBN Version: https://planb.network/en/tutorials/wallet\n\
       Folder GitHub Version: https://github.com/PlanB-Network/bitcoin-educational-content/blob/dev/tutorials/wallet"
    );
    assert_eq!(section.draft().field_value("Content Type"), Some(&Value::from("Tutorial")));
  }

  #[test]
  fn test_weblate_draft() {
    let draft = IssueRequest::new(IssueKind::Weblate, "pt").draft();
    assert_eq!(draft.title, "[PROOFREADING] weblate - pt");
    assert_eq!(draft.labels, vec!["website translation", "language - pt"]);
    assert_eq!(
      draft.body,
      "Weblate Url: https://weblate.planb.network/projects/planb-network-website/website-elements/pt/"
    );
  }

  #[test]
  fn test_validate() {
    let ok = IssueRequest::new(IssueKind::Course(course()), "fr");
    assert!(ok.validate().is_ok());

    let bad_lang = IssueRequest::new(IssueKind::Course(course()), "French");
    assert!(matches!(bad_lang.validate(), Err(Error::Invalid { field: "language", .. })));

    let bad_course = IssueRequest::new(IssueKind::Course(CourseContent::new("a b")), "fr");
    assert!(matches!(bad_course.validate(), Err(Error::Invalid { field: "course", .. })));

    // Weblate ignores the branch
    let weblate = IssueRequest::new(IssueKind::Weblate, "fr").branch("");
    assert!(weblate.validate().is_ok());
    let course_no_branch = IssueRequest::new(IssueKind::Course(course()), "fr").branch("");
    assert!(course_no_branch.validate().is_err());
  }

  #[test]
  fn test_draft_serializes_fields_as_map() {
    let draft = IssueRequest::new(IssueKind::Weblate, "pt").draft();
    let json = serde_json::to_value(&draft).unwrap();
    assert_eq!(json["project_fields"]["Content Type"], "Weblate");
    assert_eq!(json["labels"][0], "website translation");
  }
}
