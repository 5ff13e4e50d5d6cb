//! SeaORM implementation of ProfileRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use super::db_err;
use crate::domain::profile::{Profile, ProfileRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::profile;

pub struct SeaOrmProfileRepository {
    db: DatabaseConnection,
}

impl SeaOrmProfileRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(super) fn model_to_domain(m: profile::Model) -> Profile {
    Profile {
        id: m.id,
        email: m.email,
        full_name: m.full_name,
        phone: m.phone,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl ProfileRepository for SeaOrmProfileRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Profile>> {
        let model = profile::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn update(&self, p: Profile) -> DomainResult<()> {
        debug!("Updating profile: {}", p.id);

        let existing = profile::Entity::find_by_id(p.id.clone())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Profile", "id", p.id.clone()))?;

        let mut model: profile::ActiveModel = existing.into();
        model.full_name = Set(p.full_name);
        model.phone = Set(p.phone);
        model.updated_at = Set(p.updated_at);
        model.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}
