//! Authorization engine.
//!
//! A pure decision function over a [`RelationSet`] — the four relations
//! a principal can hold against a house/apartment chain — and an
//! [`ActionClass`] naming the predicate an operation requires. The
//! relation set is computed fresh for every call by the membership
//! resolver; nothing here is cached or mutated.

use serde::{Deserialize, Serialize};

use crate::error::{DomusError, DomusResult};
use crate::models::user::{Principal, Role};

/// A single relation a principal can hold against a target chain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Relation {
    Admin,
    Manager,
    Owner,
    Resident,
}

impl Relation {
    fn describe(&self) -> &'static str {
        match self {
            Relation::Admin => "an admin",
            Relation::Manager => "a manager of this house",
            Relation::Owner => "the apartment owner",
            Relation::Resident => "a resident of this apartment",
        }
    }
}

/// The relations a principal holds against a specific target chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationSet {
    pub is_admin: bool,
    pub is_manager: bool,
    pub is_owner: bool,
    pub is_resident: bool,
}

impl RelationSet {
    /// Relation set for a principal against a house (no apartment in
    /// scope — owner/resident cannot hold).
    pub fn for_house(principal: &Principal, managers: &[uuid::Uuid]) -> Self {
        RelationSet {
            is_admin: principal.role == Role::Admin,
            is_manager: managers.contains(&principal.user_id),
            is_owner: false,
            is_resident: false,
        }
    }

    /// Relation set for a principal against an apartment within its
    /// house.
    pub fn for_apartment(
        principal: &Principal,
        managers: &[uuid::Uuid],
        owner_id: uuid::Uuid,
        residents: &[uuid::Uuid],
    ) -> Self {
        RelationSet {
            is_admin: principal.role == Role::Admin,
            is_manager: managers.contains(&principal.user_id),
            is_owner: principal.user_id == owner_id,
            is_resident: residents.contains(&principal.user_id),
        }
    }

    fn holds(&self, relation: Relation) -> bool {
        match relation {
            Relation::Admin => self.is_admin,
            Relation::Manager => self.is_manager,
            Relation::Owner => self.is_owner,
            Relation::Resident => self.is_resident,
        }
    }
}

/// The classes of operations, each admitting a fixed disjunction of
/// relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionClass {
    /// Create/delete house, add/remove managers.
    HouseAdmin,
    /// Apartment list/add/remove, house info update, reconciliation
    /// tables, event broadcast.
    HouseScoped,
    /// Change owner, resident membership, counter add/remove.
    OwnerScoped,
    /// Readings add/list/remove, counter listing.
    ResidentScoped,
    /// Resolve a pending counter change request.
    RequestResolution,
}

impl ActionClass {
    /// The relations admitted for this action class, in the order they
    /// are reported on denial.
    pub fn admitted(&self) -> &'static [Relation] {
        match self {
            ActionClass::HouseAdmin => &[Relation::Admin],
            ActionClass::HouseScoped | ActionClass::RequestResolution => {
                &[Relation::Admin, Relation::Manager]
            }
            ActionClass::OwnerScoped => {
                &[Relation::Admin, Relation::Manager, Relation::Owner]
            }
            ActionClass::ResidentScoped => {
                &[Relation::Admin, Relation::Manager, Relation::Resident]
            }
        }
    }
}

/// Decide whether the relation set satisfies the action's predicate.
///
/// Denial is distinct from `NotFound`: callers resolve the target
/// chain first, so a failure here always means the entities exist and
/// the principal may not act on them.
pub fn authorize(relations: &RelationSet, action: ActionClass) -> DomusResult<()> {
    let admitted = action.admitted();
    if admitted.iter().any(|r| relations.holds(*r)) {
        return Ok(());
    }
    let expected = admitted
        .iter()
        .map(|r| r.describe())
        .collect::<Vec<_>>()
        .join(" or ");
    Err(DomusError::PermissionDenied {
        reason: format!("you are not {expected}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn principal(role: Role) -> Principal {
        Principal::new(Uuid::new_v4(), role)
    }

    #[test]
    fn admin_passes_every_class() {
        let rs = RelationSet {
            is_admin: true,
            ..Default::default()
        };
        for class in [
            ActionClass::HouseAdmin,
            ActionClass::HouseScoped,
            ActionClass::OwnerScoped,
            ActionClass::ResidentScoped,
            ActionClass::RequestResolution,
        ] {
            assert!(authorize(&rs, class).is_ok());
        }
    }

    #[test]
    fn manager_cannot_do_house_admin_ops() {
        let rs = RelationSet {
            is_manager: true,
            ..Default::default()
        };
        assert!(matches!(
            authorize(&rs, ActionClass::HouseAdmin),
            Err(DomusError::PermissionDenied { .. })
        ));
        assert!(authorize(&rs, ActionClass::HouseScoped).is_ok());
        assert!(authorize(&rs, ActionClass::RequestResolution).is_ok());
    }

    #[test]
    fn owner_is_not_enough_for_resident_scoped_ops() {
        // Owner-only (not in residents) may manage the apartment but
        // not submit readings.
        let rs = RelationSet {
            is_owner: true,
            ..Default::default()
        };
        assert!(authorize(&rs, ActionClass::OwnerScoped).is_ok());
        assert!(authorize(&rs, ActionClass::ResidentScoped).is_err());
    }

    #[test]
    fn resident_cannot_manage_apartment() {
        let rs = RelationSet {
            is_resident: true,
            ..Default::default()
        };
        assert!(authorize(&rs, ActionClass::ResidentScoped).is_ok());
        assert!(authorize(&rs, ActionClass::OwnerScoped).is_err());
        assert!(authorize(&rs, ActionClass::HouseScoped).is_err());
    }

    #[test]
    fn relation_set_for_house_derives_membership() {
        let admin = principal(Role::Admin);
        let manager = principal(Role::User);
        let stranger = principal(Role::User);
        let managers = vec![manager.user_id];

        assert!(RelationSet::for_house(&admin, &managers).is_admin);
        assert!(RelationSet::for_house(&manager, &managers).is_manager);
        let rs = RelationSet::for_house(&stranger, &managers);
        assert_eq!(rs, RelationSet::default());
    }

    #[test]
    fn relation_set_for_apartment_derives_owner_and_resident() {
        let owner = principal(Role::User);
        let resident = principal(Role::User);
        let residents = vec![owner.user_id, resident.user_id];

        let rs = RelationSet::for_apartment(&owner, &[], owner.user_id, &residents);
        assert!(rs.is_owner && rs.is_resident);

        let rs = RelationSet::for_apartment(&resident, &[], owner.user_id, &residents);
        assert!(!rs.is_owner && rs.is_resident);
    }
}
