use sea_orm::{ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, EngineError, Household, HouseholdNewCmd, ResultEngine, SharedPool, categories,
    households, pool,
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Creates a household together with its (empty) shared pool row.
    pub async fn create_household(&self, cmd: HouseholdNewCmd) -> ResultEngine<Household> {
        let name = normalize_required_name(&cmd.name, "household")?;
        with_tx!(self, |db_tx| {
            let household = Household::new(name, cmd.owner, cmd.accounting_mode);
            households::ActiveModel::from(&household)
                .insert(&db_tx)
                .await?;
            pool::ActiveModel::from(&SharedPool::new(household.id.clone()))
                .insert(&db_tx)
                .await?;
            Ok(household)
        })
    }

    pub async fn household(&self, household_id: &str) -> ResultEngine<Household> {
        let model = households::Entity::find_by_id(household_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("household".to_string()))?;
        Household::try_from(model)
    }

    pub async fn create_category(&self, household_id: &str, name: &str) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            self.require_household(&db_tx, household_id).await?;
            let category = Category::new(household_id.to_string(), name);
            categories::ActiveModel::from(&category)
                .insert(&db_tx)
                .await?;
            Ok(category)
        })
    }

    pub async fn categories(&self, household_id: &str) -> ResultEngine<Vec<Category>> {
        categories::Entity::find()
            .filter(categories::Column::HouseholdId.eq(household_id.to_string()))
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    pub(super) async fn require_household<C: ConnectionTrait>(
        &self,
        db: &C,
        household_id: &str,
    ) -> ResultEngine<Household> {
        let model = households::Entity::find_by_id(household_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("household".to_string()))?;
        Household::try_from(model)
    }

    pub(super) async fn require_category<C: ConnectionTrait>(
        &self,
        db: &C,
        household_id: &str,
        category_id: Uuid,
    ) -> ResultEngine<()> {
        categories::Entity::find_by_id(category_id.to_string())
            .filter(categories::Column::HouseholdId.eq(household_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("category".to_string()))?;
        Ok(())
    }
}
