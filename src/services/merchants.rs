/*
 * Responsibility
 * - merchant profile の作成 / 取得 / 部分更新
 * - 認可順序: role -> path username -> (DB) 重複 or ownership 解決
 */
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::repos::{MerchantRepo, MerchantRow};
use crate::services::auth::{Principal, Role};
use crate::services::authz;
use crate::services::patch::{PatchError, UpdateBuilder, UpdateCommand};

#[derive(Debug, Clone)]
pub struct NewMerchant {
    pub name: String,
    pub address: String,
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct MerchantPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl MerchantPatch {
    pub fn into_command(self, merchant_id: Uuid, user_id: Uuid) -> Result<UpdateCommand, PatchError> {
        UpdateBuilder::new("merchants")
            .set("name", self.name)
            .set("address", self.address)
            .set("category", self.category)
            .set("description", self.description)
            .filter("merchant_id", merchant_id)
            .owned_by("user_id", user_id)
    }
}

#[derive(Clone)]
pub struct MerchantService {
    merchants: Arc<dyn MerchantRepo>,
}

impl MerchantService {
    pub fn new(merchants: Arc<dyn MerchantRepo>) -> Self {
        Self { merchants }
    }

    pub async fn create(
        &self,
        principal: &Principal,
        path_username: &str,
        input: NewMerchant,
    ) -> Result<MerchantRow, AppError> {
        authz::require_role(principal, Role::Merchant)?;
        authz::require_same_user(principal, path_username)?;

        let exists = self
            .merchants
            .exists_for(principal.user_id(), principal.username())
            .await?;
        authz::ensure_absent(exists, "merchant")?;

        let row = MerchantRow {
            merchant_id: Uuid::new_v4(),
            name: input.name,
            rating: 0.0,
            address: input.address,
            category: input.category,
            description: input.description,
            user_id: principal.user_id(),
            owner: principal.username().to_string(),
        };
        self.merchants
            .create(&row)
            .await
            .map_err(|e| AppError::from_repo(e, "merchant"))?;

        info!(merchant_id = %row.merchant_id, owner = %row.owner, "merchant created");
        Ok(row)
    }

    pub async fn get(&self, owner: &str) -> Result<MerchantRow, AppError> {
        self.merchants
            .find_by_owner(owner)
            .await?
            .ok_or(AppError::not_found("merchant"))
    }

    pub async fn update(
        &self,
        principal: &Principal,
        path_username: &str,
        patch: MerchantPatch,
    ) -> Result<MerchantRow, AppError> {
        authz::require_role(principal, Role::Merchant)?;
        authz::require_same_user(principal, path_username)?;

        let linked = self.merchants.find_id_by_user(principal.user_id()).await?;
        let merchant_id = authz::require_owned(linked, principal, "merchant")?;

        let cmd = patch.into_command(merchant_id, principal.user_id())?;
        self.merchants
            .update(&cmd)
            .await
            .map_err(|e| AppError::from_repo(e, "merchant"))?
            .ok_or(AppError::not_found("merchant"))
    }
}

impl std::fmt::Debug for MerchantService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerchantService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::memory::MemoryMerchantRepo;
    use crate::services::patch::PatchValue;

    fn principal(name: &str, role: Role) -> Principal {
        Principal::new(Uuid::new_v4(), name, role).unwrap()
    }

    fn input() -> NewMerchant {
        NewMerchant {
            name: "Alice Noodles".into(),
            address: "1 Main St".into(),
            category: "noodle".into(),
            description: "hand-pulled".into(),
        }
    }

    fn service() -> (MerchantService, Arc<MemoryMerchantRepo>) {
        let repo = Arc::new(MemoryMerchantRepo::default());
        (MerchantService::new(repo.clone()), repo)
    }

    #[test]
    fn name_only_patch_touches_only_name_and_is_owner_scoped() {
        let merchant_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let patch = MerchantPatch {
            name: Some("Foo".into()),
            ..Default::default()
        };

        let cmd = patch.into_command(merchant_id, user_id).unwrap();
        assert_eq!(cmd.columns(), vec!["name"]);
        assert_eq!(cmd.owner(), ("user_id", &PatchValue::Uuid(user_id)));
        assert_eq!(
            cmd.to_sql(),
            "UPDATE merchants SET name = $1 WHERE merchant_id = $2 AND user_id = $3"
        );
    }

    #[test]
    fn empty_patch_is_rejected() {
        let err = MerchantPatch::default()
            .into_command(Uuid::new_v4(), Uuid::new_v4())
            .unwrap_err();
        assert_eq!(err, PatchError::Empty);
    }

    #[tokio::test]
    async fn wrong_role_never_reaches_persistence() {
        let (svc, repo) = service();
        let p = principal("alice", Role::User);

        let err = svc.create(&p, "alice", input()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn path_username_mismatch_is_forbidden_without_persistence() {
        let (svc, repo) = service();
        let p = principal("alice", Role::Merchant);

        let err = svc.create(&p, "mallory", input()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn second_merchant_for_same_user_is_unique_constraint() {
        let (svc, _) = service();
        let p = principal("alice", Role::Merchant);

        let created = svc.create(&p, "alice", input()).await.unwrap();
        assert_eq!(created.user_id, p.user_id());
        assert_eq!(created.owner, "alice");
        assert_eq!(created.rating, 0.0);

        let err = svc.create(&p, "alice", input()).await.unwrap_err();
        assert!(matches!(err, AppError::UniqueConstraint { resource: "merchant" }));
    }

    #[tokio::test]
    async fn update_without_linked_merchant_is_forbidden() {
        let (svc, _) = service();
        let p = principal("alice", Role::Merchant);
        let patch = MerchantPatch {
            name: Some("Foo".into()),
            ..Default::default()
        };

        let err = svc.update(&p, "alice", patch).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let (svc, _) = service();
        let p = principal("alice", Role::Merchant);
        svc.create(&p, "alice", input()).await.unwrap();

        let patch = MerchantPatch {
            description: Some(String::new()),
            ..Default::default()
        };
        let updated = svc.update(&p, "alice", patch).await.unwrap();
        assert_eq!(updated.description, "");
        assert_eq!(updated.name, "Alice Noodles");
        assert_eq!(updated.address, "1 Main St");
    }

    #[tokio::test]
    async fn empty_update_is_bad_request() {
        let (svc, _) = service();
        let p = principal("alice", Role::Merchant);
        svc.create(&p, "alice", input()).await.unwrap();

        let err = svc
            .update(&p, "alice", MerchantPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { code: "EMPTY_PATCH", .. }));
    }
}
