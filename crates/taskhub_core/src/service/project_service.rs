//! Project use-case service.

use crate::model::project::{NewProject, Project, ProjectId, ProjectStatus};
use crate::model::user::User;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoResult;
use log::info;

/// Use-case service wrapper for project records.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_project(&self, draft: &NewProject) -> RepoResult<Project> {
        let project = self.repo.create_project(draft)?;
        info!(
            "event=project_create module=project status=ok project_id={} max_members={}",
            project.id, project.max_members
        );
        Ok(project)
    }

    pub fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        self.repo.get_project(id)
    }

    pub fn list_projects(&self) -> RepoResult<Vec<Project>> {
        self.repo.list_projects()
    }

    pub fn list_members(&self, id: ProjectId) -> RepoResult<Vec<User>> {
        self.repo.list_members(id)
    }

    pub fn set_status(&self, id: ProjectId, status: ProjectStatus) -> RepoResult<()> {
        self.repo.update_status(id, status)
    }
}
