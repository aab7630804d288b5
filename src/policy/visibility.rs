use crate::errors::internal::PolicyError;
use crate::types::internal::account::{Account, Role};

/// Everything one caller may see and do, resolved against a candidate set
#[derive(Debug, Clone, PartialEq)]
pub struct Scope<'a> {
    /// The caller's own stored account
    pub actor: &'a Account,
    pub visible: Vec<&'a Account>,
    pub assignable: &'static [Role],
}

impl Scope<'_> {
    pub fn can_view(&self, target_id: i32) -> bool {
        self.visible.iter().any(|account| account.id == target_id)
    }
}

/// Roles a caller may set on a created or edited account, lowest rank first
pub fn assignable_roles(role: Role) -> &'static [Role] {
    match role {
        Role::SuperAdmin => &[Role::Moderator, Role::Admin],
        Role::Admin => &[Role::User, Role::Moderator],
        Role::Moderator => &[Role::User],
        Role::User => &[],
    }
}

pub fn can_assign(caller_role: Role, role: Role) -> bool {
    assignable_roles(caller_role).contains(&role)
}

/// Admins and moderators only ever act inside their own religion/cast
pub fn is_group_scoped(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Moderator)
}

/// Exact match on both religion and cast. A caller without both matches nothing.
fn same_group(caller: &Account, religion: Option<&str>, cast: Option<&str>) -> bool {
    match (caller.religion(), caller.cast()) {
        (Some(own_religion), Some(own_cast)) => {
            religion == Some(own_religion) && cast == Some(own_cast)
        }
        _ => false,
    }
}

/// Whether `caller` may list or see `target`. Never true for the caller's own record.
pub fn can_view(caller: &Account, target: &Account) -> bool {
    if caller.id == target.id {
        return false;
    }

    match caller.role() {
        Role::SuperAdmin => target.role() == Role::Admin,
        Role::Admin => {
            matches!(target.role(), Role::Moderator | Role::User)
                && same_group(caller, target.religion(), target.cast())
        }
        Role::Moderator => {
            target.role() == Role::User && same_group(caller, target.religion(), target.cast())
        }
        Role::User => false,
    }
}

/// The subset of `all` visible to `caller`, in input order
pub fn visible_accounts<'a>(caller: &Account, all: &'a [Account]) -> Vec<&'a Account> {
    all.iter().filter(|target| can_view(caller, target)).collect()
}

/// Locate the caller in `all` and compute its scope
///
/// # Errors
/// * `PolicyError::ActorNotFound` - the caller's record is not in `all`; no data is returned
pub fn resolve_scope(caller_id: i32, all: &[Account]) -> Result<Scope<'_>, PolicyError> {
    let actor = all
        .iter()
        .find(|account| account.id == caller_id)
        .ok_or(PolicyError::ActorNotFound { actor_id: caller_id })?;

    Ok(Scope {
        actor,
        visible: visible_accounts(actor, all),
        assignable: assignable_roles(actor.role()),
    })
}

/// Reject a role the caller may not hand out
///
/// # Errors
/// * `PolicyError::NotStaff` - caller has no assignable roles at all
/// * `PolicyError::RoleNotAssignable` - requested role outside the caller's set
pub fn check_assignment(caller: &Account, requested: Role) -> Result<(), PolicyError> {
    let caller_role = caller.role();
    if assignable_roles(caller_role).is_empty() {
        return Err(PolicyError::NotStaff { role: caller_role });
    }
    if !can_assign(caller_role, requested) {
        return Err(PolicyError::RoleNotAssignable {
            caller: caller_role,
            requested,
        });
    }
    Ok(())
}

/// Reject a record that would land outside a scoped caller's religion/cast
pub fn check_group_scope(
    caller: &Account,
    religion: Option<&str>,
    cast: Option<&str>,
) -> Result<(), PolicyError> {
    if is_group_scoped(caller.role()) && !same_group(caller, religion, cast) {
        return Err(PolicyError::OutOfScope);
    }
    Ok(())
}
