//! User-facing actions. Each one reloads the list through the repository,
//! optionally persists, and hands the result to the renderer.

use anyhow::{Context, Result};
use crate::render::{HtmlRenderer, Renderer};
use crate::service::problem_service::{ProblemService, ProblemStatistics, SearchField};
use crate::storage::{KeyValueStore, Problem, ProblemFields};
use std::path::Path;

/// Whether the submit action adds a new problem or updates an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Idle,
    Editing(String),
}

impl EditMode {
    pub fn submit_label(&self) -> &'static str {
        match self {
            EditMode::Idle => "Add Problem",
            EditMode::Editing(_) => "Update Problem",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Warning(String),
    Success(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Accepted,
    Declined,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Raw form input as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemForm {
    pub title: String,
    pub topic: String,
    pub difficulty: String,
    pub code: String,
}

impl ProblemForm {
    /// Every field must be non-empty after trimming. Title, topic and
    /// difficulty are stored trimmed; code is kept verbatim.
    pub fn validate(&self) -> Result<ProblemFields, ValidationError> {
        let title = self.title.trim();
        let topic = self.topic.trim();
        let difficulty = self.difficulty.trim();

        if title.is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if topic.is_empty() {
            return Err(ValidationError::MissingField("topic"));
        }
        if difficulty.is_empty() {
            return Err(ValidationError::MissingField("difficulty"));
        }
        if self.code.trim().is_empty() {
            return Err(ValidationError::MissingField("code"));
        }

        Ok(ProblemFields {
            title: title.to_string(),
            topic: topic.to_string(),
            difficulty: difficulty.to_string(),
            code: self.code.clone(),
        })
    }

    pub fn fill_from(&mut self, problem: &Problem) {
        self.title = problem.title.clone();
        self.topic = problem.topic.clone();
        self.difficulty = problem.difficulty.clone();
        self.code = problem.code.clone();
    }

    pub fn clear(&mut self) {
        *self = ProblemForm::default();
    }
}

pub struct Commands<S, R> {
    service: ProblemService<S>,
    renderer: R,
}

impl<S: KeyValueStore, R: Renderer> Commands<S, R> {
    pub fn new(service: ProblemService<S>, renderer: R) -> Self {
        Commands { service, renderer }
    }

    pub fn service(&self) -> &ProblemService<S> {
        &self.service
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Add or update depending on `mode`. Returns the mode to continue with.
    pub fn submit(&mut self, mode: EditMode, form: &mut ProblemForm) -> Result<(EditMode, Notice)> {
        let fields = match form.validate() {
            Ok(fields) => fields,
            Err(e) => {
                log::warn!("submit rejected: {}", e);
                return Ok((mode, Notice::Warning("Please fill all fields!".to_string())));
            }
        };

        let notice = match mode {
            EditMode::Editing(id) => {
                // An unknown id is absorbed without telling the user.
                self.service.update(&id, fields)?;
                Notice::Success("Problem updated!".to_string())
            }
            EditMode::Idle => {
                self.service.add(fields)?;
                Notice::Success("Problem added successfully!".to_string())
            }
        };

        form.clear();
        let problems = self.service.all()?;
        self.renderer.render(&problems);
        Ok((EditMode::Idle, notice))
    }

    pub fn delete(&mut self, id: &str, confirmation: Confirmation) -> Result<Option<Notice>> {
        if confirmation == Confirmation::Declined {
            return Ok(None);
        }

        let remaining = self.service.remove(id)?;
        self.renderer.render(&remaining);
        Ok(Some(Notice::Success("Problem deleted.".to_string())))
    }

    /// Load a problem into the form. Unknown ids leave `mode` and the form as they were.
    pub fn start_edit(&self, mode: EditMode, id: &str, form: &mut ProblemForm) -> Result<EditMode> {
        let Some(problem) = self.service.find_by_id(id)? else {
            return Ok(mode);
        };
        form.fill_from(&problem);
        Ok(EditMode::Editing(problem.id))
    }

    pub fn search_by_topic(&mut self, keyword: &str) -> Result<Option<Notice>> {
        self.search(SearchField::Topic, keyword, "Enter a topic")
    }

    pub fn search_by_difficulty(&mut self, keyword: &str) -> Result<Option<Notice>> {
        self.search(SearchField::Difficulty, keyword, "Enter a difficulty")
    }

    fn search(&mut self, field: SearchField, keyword: &str, prompt: &str) -> Result<Option<Notice>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Some(Notice::Warning(prompt.to_string())));
        }

        let matches = self.service.search(field, keyword)?;
        log::debug!("search {:?} '{}' matched {}", field, keyword, matches.len());
        self.renderer.render(&matches);
        Ok(None)
    }

    pub fn view_all(&mut self) -> Result<()> {
        let problems = self.service.all()?;
        self.renderer.render(&problems);
        Ok(())
    }

    pub fn sort_by_date(&mut self) -> Result<()> {
        let sorted = self.service.sort_by_date()?;
        self.renderer.render(&sorted);
        Ok(())
    }

    pub fn sort_by_difficulty(&mut self) -> Result<()> {
        let sorted = self.service.sort_by_difficulty()?;
        self.renderer.render(&sorted);
        Ok(())
    }

    /// Write the full list as an HTML page
    pub fn export_html(&self, path: &Path) -> Result<usize> {
        let problems = self.service.all()?;
        let mut html = HtmlRenderer::new();
        html.render(&problems);

        std::fs::write(path, html.into_document())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("exported {} problems to {}", problems.len(), path.display());
        Ok(problems.len())
    }

    pub fn statistics(&self) -> Result<ProblemStatistics> {
        self.service.statistics()
    }
}
