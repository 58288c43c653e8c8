use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, HouseholdMember, MemberNewCmd, MemberUpdateCmd, ResultEngine, members,
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    pub async fn add_member(&self, cmd: MemberNewCmd) -> ResultEngine<HouseholdMember> {
        let name = normalize_required_name(&cmd.name, "member")?;
        if let Some(config) = &cmd.allowance {
            config.validate()?;
        }
        with_tx!(self, |db_tx| {
            self.require_household(&db_tx, &cmd.household_id).await?;
            let mut member =
                HouseholdMember::new(cmd.household_id.clone(), name, cmd.split_ratio)?;
            if let Some(config) = cmd.allowance {
                member.allowance = config;
            }
            members::ActiveModel::from(&member).insert(&db_tx).await?;
            Ok(member)
        })
    }

    /// Partial update of ratio, allowance config or active flag.
    ///
    /// Allowance config changes apply to future income only; existing
    /// allowance rows are never recomputed.
    pub async fn update_member(
        &self,
        household_id: &str,
        member_id: Uuid,
        cmd: MemberUpdateCmd,
    ) -> ResultEngine<HouseholdMember> {
        if let Some(ratio) = cmd.split_ratio
            && !(0.0..=1.0).contains(&ratio)
        {
            return Err(EngineError::Validation(format!(
                "split ratio out of range: {ratio}"
            )));
        }
        if let Some(config) = &cmd.allowance {
            config.validate()?;
        }
        with_tx!(self, |db_tx| {
            let model = members::Entity::find_by_id(member_id.to_string())
                .filter(members::Column::HouseholdId.eq(household_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("member".to_string()))?;
            let mut member = HouseholdMember::try_from(model)?;

            if let Some(ratio) = cmd.split_ratio {
                member.split_ratio = ratio;
            }
            if let Some(config) = cmd.allowance {
                member.allowance = config;
            }
            if let Some(is_active) = cmd.is_active {
                member.is_active = is_active;
            }

            members::ActiveModel::from(&member).update(&db_tx).await?;
            Ok(member)
        })
    }

    /// Soft-deletes a member; historical expenses and splits keep resolving.
    pub async fn deactivate_member(
        &self,
        household_id: &str,
        member_id: Uuid,
    ) -> ResultEngine<HouseholdMember> {
        self.update_member(
            household_id,
            member_id,
            MemberUpdateCmd {
                is_active: Some(false),
                ..MemberUpdateCmd::default()
            },
        )
        .await
    }

    pub async fn members(
        &self,
        household_id: &str,
        include_inactive: bool,
    ) -> ResultEngine<Vec<HouseholdMember>> {
        let mut query = members::Entity::find()
            .filter(members::Column::HouseholdId.eq(household_id.to_string()));
        if !include_inactive {
            query = query.filter(members::Column::IsActive.eq(true));
        }
        query
            .order_by_asc(members::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(HouseholdMember::try_from)
            .collect()
    }

    pub(super) async fn require_active_member<C: ConnectionTrait>(
        &self,
        db: &C,
        household_id: &str,
        member_id: Uuid,
    ) -> ResultEngine<HouseholdMember> {
        let model = members::Entity::find_by_id(member_id.to_string())
            .filter(members::Column::HouseholdId.eq(household_id.to_string()))
            .filter(members::Column::IsActive.eq(true))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("member".to_string()))?;
        HouseholdMember::try_from(model)
    }

    pub(super) async fn require_member<C: ConnectionTrait>(
        &self,
        db: &C,
        household_id: &str,
        member_id: Uuid,
    ) -> ResultEngine<HouseholdMember> {
        let model = members::Entity::find_by_id(member_id.to_string())
            .filter(members::Column::HouseholdId.eq(household_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("member".to_string()))?;
        HouseholdMember::try_from(model)
    }

    /// Active members ordered by insertion id, the participant order used by
    /// the split calculator.
    pub(super) async fn active_members<C: ConnectionTrait>(
        &self,
        db: &C,
        household_id: &str,
    ) -> ResultEngine<Vec<HouseholdMember>> {
        members::Entity::find()
            .filter(members::Column::HouseholdId.eq(household_id.to_string()))
            .filter(members::Column::IsActive.eq(true))
            .order_by_asc(members::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(HouseholdMember::try_from)
            .collect()
    }
}
