//! Apartment and resident operations.

use domus_core::authz::{ActionClass, authorize};
use domus_core::error::{DomusError, DomusResult};
use domus_core::models::apartment::{Apartment, CreateApartment, UpdateApartment};
use domus_core::models::user::{Principal, User};
use domus_core::repository::{ApartmentRepository, HouseRepository, UserRepository};
use tracing::info;
use uuid::Uuid;

use crate::membership;

/// Input for adding an apartment to a house. The owner is identified
/// by email and becomes the first resident.
#[derive(Debug)]
pub struct AddApartmentInput {
    pub house_id: Uuid,
    pub owner_email: String,
    pub entrance: String,
    pub floor: String,
    pub number: String,
}

pub struct ApartmentService<H: HouseRepository, A: ApartmentRepository, U: UserRepository> {
    houses: H,
    apartments: A,
    users: U,
}

impl<H: HouseRepository, A: ApartmentRepository, U: UserRepository> ApartmentService<H, A, U> {
    pub fn new(houses: H, apartments: A, users: U) -> Self {
        Self {
            houses,
            apartments,
            users,
        }
    }

    /// Manager-scoped listing of a house's apartments, ordered by
    /// apartment number.
    pub async fn list_apartments(
        &self,
        principal: &Principal,
        house_id: Uuid,
    ) -> DomusResult<Vec<Apartment>> {
        let (_, relations) = membership::house_relations(&self.houses, principal, house_id).await?;
        authorize(&relations, ActionClass::HouseScoped)?;
        self.apartments.list_by_house(house_id).await
    }

    /// Apartments the caller lives in. No authorization beyond
    /// authentication.
    pub async fn my_apartments(&self, principal: &Principal) -> DomusResult<Vec<Apartment>> {
        self.apartments.list_by_resident(principal.user_id).await
    }

    /// Manager-scoped. The owner email must resolve to a user and the
    /// apartment number must be free within the house.
    pub async fn add_apartment(
        &self,
        principal: &Principal,
        input: AddApartmentInput,
    ) -> DomusResult<Apartment> {
        let (_, relations) =
            membership::house_relations(&self.houses, principal, input.house_id).await?;
        authorize(&relations, ActionClass::HouseScoped)?;

        let owner = self.users.get_by_email(&input.owner_email).await?;

        match self
            .apartments
            .get_by_number(input.house_id, &input.number)
            .await
        {
            Ok(_) => {
                return Err(DomusError::conflict(format!(
                    "apartment {} already exists in this house",
                    input.number
                )));
            }
            Err(DomusError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let apartment = self
            .apartments
            .create(CreateApartment {
                house_id: input.house_id,
                owner_id: owner.id,
                entrance: input.entrance,
                floor: input.floor,
                number: input.number,
            })
            .await?;
        info!(apartment_id = %apartment.id, house_id = %input.house_id, "apartment created");
        Ok(apartment)
    }

    /// Manager-scoped removal.
    pub async fn remove_apartment(
        &self,
        principal: &Principal,
        apartment_id: Uuid,
    ) -> DomusResult<()> {
        let (_, _, relations) =
            membership::apartment_relations(&self.houses, &self.apartments, principal, apartment_id)
                .await?;
        authorize(&relations, ActionClass::HouseScoped)?;
        self.apartments.delete(apartment_id).await?;
        info!(apartment_id = %apartment_id, "apartment removed");
        Ok(())
    }

    /// Owner-scoped: resolve the resident ids to user accounts.
    pub async fn list_residents(
        &self,
        principal: &Principal,
        apartment_id: Uuid,
    ) -> DomusResult<Vec<User>> {
        let (apartment, _, relations) =
            membership::apartment_relations(&self.houses, &self.apartments, principal, apartment_id)
                .await?;
        authorize(&relations, ActionClass::OwnerScoped)?;

        let mut residents = Vec::with_capacity(apartment.residents.len());
        for user_id in &apartment.residents {
            residents.push(self.users.get_by_id(*user_id).await?);
        }
        Ok(residents)
    }

    /// Owner-scoped. Conflict when the user already lives here.
    pub async fn add_resident(
        &self,
        principal: &Principal,
        apartment_id: Uuid,
        email: &str,
    ) -> DomusResult<Apartment> {
        let (apartment, _, relations) =
            membership::apartment_relations(&self.houses, &self.apartments, principal, apartment_id)
                .await?;
        authorize(&relations, ActionClass::OwnerScoped)?;

        let user = self.users.get_by_email(email).await?;
        if apartment.residents.contains(&user.id) {
            return Err(DomusError::conflict("user is already a resident"));
        }

        let mut residents = apartment.residents;
        residents.push(user.id);
        self.apartments
            .update(
                apartment_id,
                UpdateApartment {
                    owner_id: None,
                    residents: Some(residents),
                },
            )
            .await
    }

    /// Owner-scoped. The current owner cannot be removed — ownership
    /// implies residency.
    pub async fn remove_resident(
        &self,
        principal: &Principal,
        apartment_id: Uuid,
        user_id: Uuid,
    ) -> DomusResult<Apartment> {
        let (apartment, _, relations) =
            membership::apartment_relations(&self.houses, &self.apartments, principal, apartment_id)
                .await?;
        authorize(&relations, ActionClass::OwnerScoped)?;

        if !apartment.residents.contains(&user_id) {
            return Err(DomusError::conflict("user is not a resident"));
        }
        if apartment.owner_id == user_id {
            return Err(DomusError::conflict(
                "the owner cannot be removed from the residents",
            ));
        }

        let residents: Vec<Uuid> = apartment
            .residents
            .into_iter()
            .filter(|r| *r != user_id)
            .collect();
        self.apartments
            .update(
                apartment_id,
                UpdateApartment {
                    owner_id: None,
                    residents: Some(residents),
                },
            )
            .await
    }

    /// Owner-scoped. The new owner joins the residents when absent, so
    /// the "owner lives here" invariant survives the transfer.
    pub async fn change_owner(
        &self,
        principal: &Principal,
        apartment_id: Uuid,
        email: &str,
    ) -> DomusResult<Apartment> {
        let (apartment, _, relations) =
            membership::apartment_relations(&self.houses, &self.apartments, principal, apartment_id)
                .await?;
        authorize(&relations, ActionClass::OwnerScoped)?;

        let new_owner = self.users.get_by_email(email).await?;

        let mut residents = apartment.residents;
        if !residents.contains(&new_owner.id) {
            residents.push(new_owner.id);
        }

        let updated = self
            .apartments
            .update(
                apartment_id,
                UpdateApartment {
                    owner_id: Some(new_owner.id),
                    residents: Some(residents),
                },
            )
            .await?;
        info!(apartment_id = %apartment_id, new_owner = %new_owner.id, "ownership transferred");
        Ok(updated)
    }
}
