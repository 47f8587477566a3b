use std::{sync::Arc, time::Duration};

use chrono::Utc;
use validator::Validate;

use crate::{
    auth::{require_owner, AuthenticatedUser},
    errors::{AppError, AppResult},
    models::{
        domain::{Material, MaterialType},
        dto::request::{parse_id, CreateMaterialRequest, UpdateMaterialRequest},
    },
    repositories::{CollectionRepository, MaterialRepository, MembershipRepository},
    services::deadline::bounded,
};

pub struct MaterialService {
    materials: Arc<dyn MaterialRepository>,
    collections: Arc<dyn CollectionRepository>,
    memberships: Arc<dyn MembershipRepository>,
    deadline: Duration,
}

impl MaterialService {
    pub fn new(
        materials: Arc<dyn MaterialRepository>,
        collections: Arc<dyn CollectionRepository>,
        memberships: Arc<dyn MembershipRepository>,
        deadline: Duration,
    ) -> Self {
        Self {
            materials,
            collections,
            memberships,
            deadline,
        }
    }

    pub async fn find(&self, material_id: &str) -> AppResult<Material> {
        bounded(
            self.deadline,
            "materials.find_by_id",
            material_id,
            self.materials.find_by_id(material_id),
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Material with id '{}' not found", material_id)))
    }

    /// Creates a material, optionally linking it straight into a collection.
    ///
    /// The target collection's ownership is checked before anything is
    /// written. If linking fails afterwards the new material is removed again.
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateMaterialRequest,
    ) -> AppResult<Material> {
        request.validate()?;

        let collection_id = match request.collection_id.as_deref() {
            Some(raw) if !raw.trim().is_empty() => {
                let collection_id = parse_id(raw, "collection")?;
                let collection = bounded(
                    self.deadline,
                    "collections.find_by_id",
                    &collection_id,
                    self.collections.find_by_id(&collection_id),
                )
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Collection with id '{}' not found", collection_id))
                })?;
                require_owner(user, &collection.user_id, "collection")?;
                Some(collection_id)
            }
            _ => None,
        };

        let material = Material::new(
            &user.user_id,
            request.name.trim(),
            &request.description,
            &request.type_id,
            request.xp,
            &request.link,
        );
        let material_id = material.id.clone();

        let material = bounded(
            self.deadline,
            "materials.create",
            &material_id,
            self.materials.create(material),
        )
        .await?;

        if let Some(collection_id) = collection_id {
            let attached = bounded(
                self.deadline,
                "memberships.attach",
                &collection_id,
                self.memberships.attach(&collection_id, &material_id),
            )
            .await;

            if let Err(err) = attached {
                self.rollback_create(&material_id).await;
                return Err(err);
            }
        }

        log::info!("User {} created material {}", user.user_id, material_id);
        Ok(material)
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        material_id: &str,
        request: UpdateMaterialRequest,
    ) -> AppResult<Material> {
        request.validate()?;

        let mut material = self.find(material_id).await?;
        require_owner(user, &material.user_id, "material")?;

        material.name = request.name.trim().to_string();
        material.description = request.description;
        material.type_id = request.type_id;
        material.xp = request.xp;
        material.link = request.link;
        material.updated_at = Utc::now();

        let material = bounded(
            self.deadline,
            "materials.update",
            material_id,
            self.materials.update(material),
        )
        .await?;

        log::info!("User {} updated material {}", user.user_id, material_id);
        Ok(material)
    }

    /// Removing the material document is the committing step. Its links and
    /// completion records may outlive it; reads ignore them once it is gone.
    pub async fn delete(&self, user: &AuthenticatedUser, material_id: &str) -> AppResult<()> {
        let material = self.find(material_id).await?;
        require_owner(user, &material.user_id, "material")?;

        bounded(
            self.deadline,
            "materials.delete",
            material_id,
            self.materials.delete(material_id),
        )
        .await?;

        log::info!("User {} deleted material {}", user.user_id, material_id);

        // Totals and listings skip links whose material is gone
        let cleanup = bounded(
            self.deadline,
            "memberships.remove_material",
            material_id,
            self.memberships.remove_material(material_id),
        )
        .await;
        if let Err(err) = cleanup {
            log::warn!("Links of deleted material {} left behind: {}", material_id, err);
        }

        Ok(())
    }

    pub async fn list_types(&self) -> AppResult<Vec<MaterialType>> {
        bounded(
            self.deadline,
            "materials.list_types",
            "*",
            self.materials.list_types(),
        )
        .await
    }

    async fn rollback_create(&self, material_id: &str) {
        let result = bounded(
            self.deadline,
            "materials.delete",
            material_id,
            self.materials.delete(material_id),
        )
        .await;

        match result {
            Ok(()) => log::warn!("Rolled back creation of material {}", material_id),
            Err(err) => log::error!("Rollback of material {} failed: {}", material_id, err),
        }
    }
}
