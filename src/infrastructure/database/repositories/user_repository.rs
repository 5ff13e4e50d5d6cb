//! SeaORM implementation of UserRepository
//!
//! Sign-up writes the auth identity and its profile in one transaction.

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use super::db_err;
use super::profile_repository::model_to_domain as profile_to_domain;
use crate::domain::profile::Profile;
use crate::domain::user::{model::normalize_email, AuthUser, CreateUserDto, UserRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{auth_user, profile};

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn user_to_domain(m: auth_user::Model) -> AuthUser {
    AuthUser {
        id: m.id,
        email: m.email,
        password_hash: m.password_hash,
        created_at: m.created_at,
        last_login_at: m.last_login_at,
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<(AuthUser, Profile)> {
        let now = Utc::now();
        let id = uuid::Uuid::new_v4().to_string();
        let email = normalize_email(&dto.email);
        debug!("Creating user {} <{}>", id, email);

        let txn = self.db.begin().await.map_err(db_err)?;

        let user = auth_user::ActiveModel {
            id: Set(id.clone()),
            email: Set(email.clone()),
            password_hash: Set(dto.password_hash),
            created_at: Set(now),
            last_login_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(|e| match db_err(e) {
            DomainError::Conflict(_) => DomainError::Conflict("Email already registered".into()),
            other => other,
        })?;

        let full_name = dto.full_name.trim().to_string();
        let profile = profile::ActiveModel {
            id: Set(id),
            email: Set(email),
            full_name: Set((!full_name.is_empty()).then_some(full_name)),
            phone: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        Ok((user_to_domain(user), profile_to_domain(profile)))
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<AuthUser>> {
        let model = auth_user::Entity::find()
            .filter(auth_user::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(user_to_domain))
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<AuthUser>> {
        let model = auth_user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(user_to_domain))
    }

    async fn touch_last_login(&self, id: &str) -> DomainResult<()> {
        let existing = auth_user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("User", "id", id))?;

        let mut model: auth_user::ActiveModel = existing.into();
        model.last_login_at = Set(Some(Utc::now()));
        model.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}
