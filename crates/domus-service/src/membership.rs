//! Membership resolver.
//!
//! Derives the relations a principal holds against a target chain by
//! walking id references upward: Counter → Apartment → House. Any
//! missing link is `NotFound` naming that entity, and resolution
//! always runs before authorization so a caller can distinguish "does
//! not exist" from "not yours".

use domus_core::authz::RelationSet;
use domus_core::error::DomusResult;
use domus_core::models::apartment::Apartment;
use domus_core::models::counter::Counter;
use domus_core::models::house::House;
use domus_core::models::user::Principal;
use domus_core::repository::{ApartmentRepository, CounterRepository, HouseRepository};
use uuid::Uuid;

/// Resolve a house and the principal's relations against it.
pub async fn house_relations<H: HouseRepository>(
    houses: &H,
    principal: &Principal,
    house_id: Uuid,
) -> DomusResult<(House, RelationSet)> {
    let house = houses.get_by_id(house_id).await?;
    let relations = RelationSet::for_house(principal, &house.managers);
    Ok((house, relations))
}

/// Resolve an apartment, its house, and the principal's relations
/// against the chain.
pub async fn apartment_relations<H: HouseRepository, A: ApartmentRepository>(
    houses: &H,
    apartments: &A,
    principal: &Principal,
    apartment_id: Uuid,
) -> DomusResult<(Apartment, House, RelationSet)> {
    let apartment = apartments.get_by_id(apartment_id).await?;
    let house = houses.get_by_id(apartment.house_id).await?;
    let relations = RelationSet::for_apartment(
        principal,
        &house.managers,
        apartment.owner_id,
        &apartment.residents,
    );
    Ok((apartment, house, relations))
}

/// Resolve a counter, its apartment and house, and the principal's
/// relations against the chain.
pub async fn counter_relations<
    H: HouseRepository,
    A: ApartmentRepository,
    C: CounterRepository,
>(
    houses: &H,
    apartments: &A,
    counters: &C,
    principal: &Principal,
    counter_id: Uuid,
) -> DomusResult<(Counter, Apartment, House, RelationSet)> {
    let counter = counters.get_by_id(counter_id).await?;
    let (apartment, house, relations) =
        apartment_relations(houses, apartments, principal, counter.apartment_id).await?;
    Ok((counter, apartment, house, relations))
}
