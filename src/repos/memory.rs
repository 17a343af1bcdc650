/*
 * Responsibility
 * - DB なしで動く repository 実装 (テスト / DATABASE_URL なしの development 起動)
 * - 呼び出し回数を数え、「永続層に触れていない」ことを検証できるようにする
 * - UpdateCommand は Postgres と同じ意味 (全 predicate 一致の行だけ更新) で適用する
 */
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use uuid::Uuid;

use crate::repos::{
    DriverRepo, DriverRow, MenuRepo, MenuRow, MerchantRepo, MerchantRow, Repositories, UserRepo,
    UserRow, error::RepoError,
};
use crate::services::patch::{PatchValue, UpdateCommand};

/// Row types whose columns can be addressed by name.
trait Columns {
    fn column(&self, name: &str) -> Option<PatchValue>;
    fn assign(&mut self, name: &str, value: &PatchValue) -> bool;
}

fn apply<R: Columns + Clone>(rows: &mut HashMap<Uuid, R>, cmd: &UpdateCommand) -> Option<R> {
    let (owner_column, owner_value) = cmd.owner();
    let row = rows.values_mut().find(|row| {
        row.column(owner_column).as_ref() == Some(owner_value)
            && cmd
                .filters()
                .iter()
                .all(|(col, val)| row.column(col).as_ref() == Some(val))
    })?;

    for (col, val) in cmd.assignments() {
        if !row.assign(col, val) {
            tracing::warn!(column = *col, table = cmd.table(), "unknown column in update");
        }
    }
    Some(row.clone())
}

#[derive(Debug)]
struct Table<R> {
    rows: Mutex<HashMap<Uuid, R>>,
    calls: AtomicUsize,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl<R> Table<R> {
    fn touch(&self) -> MutexGuard<'_, HashMap<Uuid, R>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // A poisoned lock only means another test thread panicked mid-write.
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

// ---- users ----

#[derive(Debug, Default)]
pub struct MemoryUserRepo {
    table: Table<UserRow>,
}

impl MemoryUserRepo {
    pub fn calls(&self) -> usize {
        self.table.calls()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn exists(&self, username: &str, email: &str) -> Result<bool, RepoError> {
        let rows = self.table.touch();
        Ok(rows
            .values()
            .any(|u| u.username == username || u.email == email))
    }

    async fn create(&self, user: &UserRow) -> Result<(), RepoError> {
        let mut rows = self.table.touch();
        if rows
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(RepoError::Conflict);
        }
        rows.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRow>, RepoError> {
        let rows = self.table.touch();
        Ok(rows.values().find(|u| u.username == username).cloned())
    }
}

// ---- merchants ----

impl Columns for MerchantRow {
    fn column(&self, name: &str) -> Option<PatchValue> {
        Some(match name {
            "merchant_id" => self.merchant_id.into(),
            "name" => self.name.as_str().into(),
            "address" => self.address.as_str().into(),
            "category" => self.category.as_str().into(),
            "description" => self.description.as_str().into(),
            "user_id" => self.user_id.into(),
            "owner" => self.owner.as_str().into(),
            _ => return None,
        })
    }

    fn assign(&mut self, name: &str, value: &PatchValue) -> bool {
        let slot = match name {
            "name" => &mut self.name,
            "address" => &mut self.address,
            "category" => &mut self.category,
            "description" => &mut self.description,
            _ => return false,
        };
        match value.as_text() {
            Some(v) => {
                *slot = v.to_string();
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryMerchantRepo {
    table: Table<MerchantRow>,
}

impl MemoryMerchantRepo {
    pub fn calls(&self) -> usize {
        self.table.calls()
    }
}

#[async_trait]
impl MerchantRepo for MemoryMerchantRepo {
    async fn exists_for(&self, user_id: Uuid, owner: &str) -> Result<bool, RepoError> {
        let rows = self.table.touch();
        Ok(rows
            .values()
            .any(|m| m.user_id == user_id || m.owner == owner))
    }

    async fn create(&self, merchant: &MerchantRow) -> Result<(), RepoError> {
        let mut rows = self.table.touch();
        if rows
            .values()
            .any(|m| m.user_id == merchant.user_id || m.owner == merchant.owner)
        {
            return Err(RepoError::Conflict);
        }
        rows.insert(merchant.merchant_id, merchant.clone());
        Ok(())
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Option<MerchantRow>, RepoError> {
        let rows = self.table.touch();
        Ok(rows.values().find(|m| m.owner == owner).cloned())
    }

    async fn find_id_by_user(&self, user_id: Uuid) -> Result<Option<Uuid>, RepoError> {
        let rows = self.table.touch();
        Ok(rows
            .values()
            .find(|m| m.user_id == user_id)
            .map(|m| m.merchant_id))
    }

    async fn update(&self, cmd: &UpdateCommand) -> Result<Option<MerchantRow>, RepoError> {
        let mut rows = self.table.touch();
        Ok(apply(&mut rows, cmd))
    }
}

// ---- drivers ----

impl Columns for DriverRow {
    fn column(&self, name: &str) -> Option<PatchValue> {
        Some(match name {
            "driver_id" => self.driver_id.into(),
            "name" => self.name.as_str().into(),
            "license" => self.license.as_str().into(),
            "area" => self.area.as_str().into(),
            "income" => self.income.into(),
            "user_id" => self.user_id.into(),
            "username" => self.username.as_str().into(),
            _ => return None,
        })
    }

    fn assign(&mut self, name: &str, value: &PatchValue) -> bool {
        match (name, value) {
            ("name", PatchValue::Text(v)) => self.name = v.clone(),
            ("license", PatchValue::Text(v)) => self.license = v.clone(),
            ("area", PatchValue::Text(v)) => self.area = v.clone(),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Default)]
pub struct MemoryDriverRepo {
    table: Table<DriverRow>,
}

impl MemoryDriverRepo {
    pub fn calls(&self) -> usize {
        self.table.calls()
    }
}

#[async_trait]
impl DriverRepo for MemoryDriverRepo {
    async fn exists_for(&self, user_id: Uuid, username: &str) -> Result<bool, RepoError> {
        let rows = self.table.touch();
        Ok(rows
            .values()
            .any(|d| d.user_id == user_id || d.username == username))
    }

    async fn create(&self, driver: &DriverRow) -> Result<(), RepoError> {
        let mut rows = self.table.touch();
        if rows
            .values()
            .any(|d| d.user_id == driver.user_id || d.username == driver.username)
        {
            return Err(RepoError::Conflict);
        }
        rows.insert(driver.driver_id, driver.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<DriverRow>, RepoError> {
        let rows = self.table.touch();
        Ok(rows.values().find(|d| d.username == username).cloned())
    }

    async fn find_id_by_user(&self, user_id: Uuid) -> Result<Option<Uuid>, RepoError> {
        let rows = self.table.touch();
        Ok(rows
            .values()
            .find(|d| d.user_id == user_id)
            .map(|d| d.driver_id))
    }

    async fn update(&self, cmd: &UpdateCommand) -> Result<Option<DriverRow>, RepoError> {
        let mut rows = self.table.touch();
        Ok(apply(&mut rows, cmd))
    }
}

// ---- menus ----

impl Columns for MenuRow {
    fn column(&self, name: &str) -> Option<PatchValue> {
        Some(match name {
            "menu_id" => self.menu_id.into(),
            "name" => self.name.as_str().into(),
            "price" => self.price.into(),
            "description" => self.description.as_str().into(),
            "category" => self.category.as_str().into(),
            "stock" => self.stock.into(),
            "merchant_id" => self.merchant_id.into(),
            _ => return None,
        })
    }

    fn assign(&mut self, name: &str, value: &PatchValue) -> bool {
        match (name, value) {
            ("name", PatchValue::Text(v)) => self.name = v.clone(),
            ("price", PatchValue::BigInt(v)) => self.price = *v,
            ("description", PatchValue::Text(v)) => self.description = v.clone(),
            ("category", PatchValue::Text(v)) => self.category = v.clone(),
            ("stock", PatchValue::Int(v)) => self.stock = *v,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Default)]
pub struct MemoryMenuRepo {
    table: Table<MenuRow>,
}

impl MemoryMenuRepo {
    pub fn calls(&self) -> usize {
        self.table.calls()
    }
}

#[async_trait]
impl MenuRepo for MemoryMenuRepo {
    async fn create(&self, menu: &MenuRow) -> Result<(), RepoError> {
        let mut rows = self.table.touch();
        if rows.contains_key(&menu.menu_id) {
            return Err(RepoError::Conflict);
        }
        rows.insert(menu.menu_id, menu.clone());
        Ok(())
    }

    async fn find(&self, menu_id: Uuid) -> Result<Option<MenuRow>, RepoError> {
        let rows = self.table.touch();
        Ok(rows.get(&menu_id).cloned())
    }

    async fn update(&self, cmd: &UpdateCommand) -> Result<Option<MenuRow>, RepoError> {
        let mut rows = self.table.touch();
        Ok(apply(&mut rows, cmd))
    }

    async fn delete(&self, menu_id: Uuid, merchant_id: Uuid) -> Result<bool, RepoError> {
        let mut rows = self.table.touch();
        let owned = rows
            .get(&menu_id)
            .is_some_and(|m| m.merchant_id == merchant_id);
        if owned {
            rows.remove(&menu_id);
        }
        Ok(owned)
    }
}

/// Typed handles to every in-memory table, kept so tests can read call counts.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepos {
    pub users: Arc<MemoryUserRepo>,
    pub merchants: Arc<MemoryMerchantRepo>,
    pub drivers: Arc<MemoryDriverRepo>,
    pub menus: Arc<MemoryMenuRepo>,
}

impl MemoryRepos {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: self.users.clone(),
            merchants: self.merchants.clone(),
            drivers: self.drivers.clone(),
            menus: self.menus.clone(),
        }
    }

    /// Total persistence calls across all tables.
    pub fn calls(&self) -> usize {
        self.users.calls() + self.merchants.calls() + self.drivers.calls() + self.menus.calls()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::patch::UpdateBuilder;

    fn menu(merchant_id: Uuid) -> MenuRow {
        MenuRow {
            menu_id: Uuid::new_v4(),
            name: "ramen".into(),
            price: 900,
            description: "shoyu".into(),
            category: "noodle".into(),
            rating: 0.0,
            stock: 5,
            merchant_id,
        }
    }

    #[tokio::test]
    async fn update_requires_every_predicate_to_match() {
        let repo = MemoryMenuRepo::default();
        let owner = Uuid::new_v4();
        let row = menu(owner);
        repo.create(&row).await.unwrap();

        let foreign = UpdateBuilder::new("menus")
            .set("stock", Some(0_i32))
            .filter("menu_id", row.menu_id)
            .owned_by("merchant_id", Uuid::new_v4())
            .unwrap();
        assert!(repo.update(&foreign).await.unwrap().is_none());

        let own = UpdateBuilder::new("menus")
            .set("stock", Some(0_i32))
            .filter("menu_id", row.menu_id)
            .owned_by("merchant_id", owner)
            .unwrap();
        let updated = repo.update(&own).await.unwrap().unwrap();
        assert_eq!(updated.stock, 0);
        assert_eq!(updated.price, 900);
        assert_eq!(updated.name, "ramen");
    }

    #[tokio::test]
    async fn delete_only_removes_owned_rows() {
        let repo = MemoryMenuRepo::default();
        let owner = Uuid::new_v4();
        let row = menu(owner);
        repo.create(&row).await.unwrap();

        assert!(!repo.delete(row.menu_id, Uuid::new_v4()).await.unwrap());
        assert!(repo.find(row.menu_id).await.unwrap().is_some());
        assert!(repo.delete(row.menu_id, owner).await.unwrap());
        assert!(repo.find(row.menu_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn calls_are_counted_per_table() {
        let repos = MemoryRepos::new();
        assert_eq!(repos.calls(), 0);
        repos.users.find_by_username("nobody").await.unwrap();
        repos.menus.find(Uuid::new_v4()).await.unwrap();
        assert_eq!(repos.users.calls(), 1);
        assert_eq!(repos.calls(), 2);
    }
}
