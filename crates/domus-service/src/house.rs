//! House operations.

use domus_core::authz::{ActionClass, RelationSet, authorize};
use domus_core::error::{DomusError, DomusResult};
use domus_core::models::house::{CreateHouse, House, HouseFilter, UpdateHouse};
use domus_core::models::user::{Principal, Role};
use domus_core::repository::{HouseRepository, Pagination, UserRepository};
use tracing::info;
use uuid::Uuid;

use crate::membership;

/// Update input for the house info operation. Reading-window days are
/// validated against 1..=31 before they reach the store.
#[derive(Debug, Default)]
pub struct HouseInfoUpdate {
    pub info: Option<String>,
    pub start_readings_day: Option<u8>,
    pub end_readings_day: Option<u8>,
}

pub struct HouseService<H: HouseRepository, U: UserRepository> {
    houses: H,
    users: U,
}

impl<H: HouseRepository, U: UserRepository> HouseService<H, U> {
    pub fn new(houses: H, users: U) -> Self {
        Self { houses, users }
    }

    /// Any authenticated user may look up a house.
    pub async fn get_house(&self, _principal: &Principal, house_id: Uuid) -> DomusResult<House> {
        self.houses.get_by_id(house_id).await
    }

    /// Any authenticated user may list houses, optionally filtered by
    /// exact address or managing user.
    pub async fn list_houses(
        &self,
        _principal: &Principal,
        filter: HouseFilter,
        pagination: Pagination,
    ) -> DomusResult<Vec<House>> {
        self.houses.list(filter, pagination).await
    }

    /// Admin only. Conflict when the address is already registered.
    pub async fn add_house(&self, principal: &Principal, input: CreateHouse) -> DomusResult<House> {
        authorize(&relations_for_role(principal), ActionClass::HouseAdmin)?;

        match self.houses.get_by_address(&input.address).await {
            Ok(_) => {
                return Err(DomusError::conflict(format!(
                    "house already registered at {}",
                    input.address
                )));
            }
            Err(DomusError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let house = self.houses.create(input).await?;
        info!(house_id = %house.id, "house created");
        Ok(house)
    }

    /// Admin only. Existence is checked before permission.
    pub async fn remove_house(&self, principal: &Principal, house_id: Uuid) -> DomusResult<()> {
        let (_, relations) = membership::house_relations(&self.houses, principal, house_id).await?;
        authorize(&relations, ActionClass::HouseAdmin)?;
        self.houses.delete(house_id).await?;
        info!(house_id = %house_id, "house removed");
        Ok(())
    }

    /// Admin only. The user must exist and must not already manage the
    /// house.
    pub async fn add_manager(
        &self,
        principal: &Principal,
        house_id: Uuid,
        user_id: Uuid,
    ) -> DomusResult<House> {
        let (house, relations) =
            membership::house_relations(&self.houses, principal, house_id).await?;
        authorize(&relations, ActionClass::HouseAdmin)?;

        self.users.get_by_id(user_id).await?;
        if house.managers.contains(&user_id) {
            return Err(DomusError::conflict("user already manages this house"));
        }

        let mut managers = house.managers;
        managers.push(user_id);
        self.houses
            .update(
                house_id,
                UpdateHouse {
                    managers: Some(managers),
                    ..Default::default()
                },
            )
            .await
    }

    /// Admin only. Conflict when the user is not a manager.
    pub async fn remove_manager(
        &self,
        principal: &Principal,
        house_id: Uuid,
        user_id: Uuid,
    ) -> DomusResult<House> {
        let (house, relations) =
            membership::house_relations(&self.houses, principal, house_id).await?;
        authorize(&relations, ActionClass::HouseAdmin)?;

        if !house.managers.contains(&user_id) {
            return Err(DomusError::conflict("user does not manage this house"));
        }

        let managers: Vec<Uuid> = house
            .managers
            .into_iter()
            .filter(|m| *m != user_id)
            .collect();
        self.houses
            .update(
                house_id,
                UpdateHouse {
                    managers: Some(managers),
                    ..Default::default()
                },
            )
            .await
    }

    /// Manager-scoped. Reading-window days outside 1..=31 are invalid.
    pub async fn update_info(
        &self,
        principal: &Principal,
        house_id: Uuid,
        update: HouseInfoUpdate,
    ) -> DomusResult<House> {
        let (_, relations) = membership::house_relations(&self.houses, principal, house_id).await?;
        authorize(&relations, ActionClass::HouseScoped)?;

        for day in [update.start_readings_day, update.end_readings_day]
            .into_iter()
            .flatten()
        {
            if !(1..=31).contains(&day) {
                return Err(DomusError::invalid_input(format!(
                    "reading window day out of range: {day}"
                )));
            }
        }

        self.houses
            .update(
                house_id,
                UpdateHouse {
                    info: update.info,
                    start_readings_day: update.start_readings_day,
                    end_readings_day: update.end_readings_day,
                    managers: None,
                },
            )
            .await
    }
}

/// Relation set for operations with no target chain yet (house
/// creation): only the account role can admit.
fn relations_for_role(principal: &Principal) -> RelationSet {
    RelationSet {
        is_admin: principal.role == Role::Admin,
        ..Default::default()
    }
}
