//! Project business logic.

use crate::{
    entities::{Project, ProjectColumn, ProjectModel, ProjectStatus, project},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub location: String,
    pub sector: String,
    pub description: String,
    pub status: ProjectStatus,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub sector: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
}

fn validate_project_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("name", "Project name cannot be empty"));
    }
    Ok(name.to_string())
}

#[instrument(skip(db, new), fields(name = %new.name))]
pub async fn create_project(db: &DatabaseConnection, new: NewProject) -> Result<ProjectModel> {
    let project = project::ActiveModel {
        name: Set(validate_project_name(&new.name)?),
        location: Set(new.location.trim().to_string()),
        sector: Set(new.sector.trim().to_string()),
        description: Set(new.description),
        status: Set(new.status),
        ..Default::default()
    };
    let project = project.insert(db).await?;
    info!("Created project {} ({})", project.id, project.name);
    Ok(project)
}

#[instrument(skip(db, patch))]
pub async fn update_project(
    db: &DatabaseConnection,
    id: i64,
    patch: ProjectPatch,
) -> Result<ProjectModel> {
    let name = patch.name.as_deref().map(validate_project_name).transpose()?;
    let mut project: project::ActiveModel = Project::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "project",
            id,
        })?
        .into();
    if let Some(name) = name {
        project.name = Set(name);
    }
    if let Some(location) = patch.location {
        project.location = Set(location.trim().to_string());
    }
    if let Some(sector) = patch.sector {
        project.sector = Set(sector.trim().to_string());
    }
    if let Some(description) = patch.description {
        project.description = Set(description);
    }
    if let Some(status) = patch.status {
        project.status = Set(status);
    }
    project.update(db).await.map_err(Into::into)
}

#[instrument(skip(db))]
pub async fn delete_project(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = Project::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "project",
            id,
        });
    }
    info!("Deleted project {}", id);
    Ok(())
}

/// Every project, alphabetical by name.
pub async fn get_all_projects(db: &DatabaseConnection) -> Result<Vec<ProjectModel>> {
    Project::find()
        .order_by_asc(ProjectColumn::Name)
        .order_by_asc(ProjectColumn::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
