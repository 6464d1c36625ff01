//! # Authorization Gate
//!
//! Pure decision functions over a user's memberships and the organization
//! hierarchy. Nothing here performs I/O or holds state, so the same inputs
//! always produce the same answer and every view can call the gate directly.

use govern_org::{EffectiveRole, MembershipSet, OrgHierarchy};
use uuid::Uuid;

use crate::actions::Action;

/// The data an authorization decision is made against.
///
/// Implemented by the active-organization context snapshot; [`AccessView`]
/// wraps borrowed parts for callers that hold them separately.
pub trait AccessScope {
    /// The current user's direct memberships.
    fn memberships(&self) -> &MembershipSet;

    /// The organization hierarchy the memberships refer to.
    fn hierarchy(&self) -> &OrgHierarchy;
}

/// Borrowed memberships and hierarchy.
#[derive(Debug, Clone, Copy)]
pub struct AccessView<'a> {
    /// Direct memberships
    pub memberships: &'a MembershipSet,
    /// Organization hierarchy
    pub hierarchy: &'a OrgHierarchy,
}

impl<'a> AccessView<'a> {
    /// Pair memberships with a hierarchy.
    pub fn new(memberships: &'a MembershipSet, hierarchy: &'a OrgHierarchy) -> Self {
        Self {
            memberships,
            hierarchy,
        }
    }
}

impl AccessScope for AccessView<'_> {
    fn memberships(&self) -> &MembershipSet {
        self.memberships
    }

    fn hierarchy(&self) -> &OrgHierarchy {
        self.hierarchy
    }
}

/// Nearest strict ancestor of `target` the user administers.
fn administering_ancestor(target: Uuid, scope: &(impl AccessScope + ?Sized)) -> Option<Uuid> {
    let memberships = scope.memberships();
    scope
        .hierarchy()
        .ancestors_of(target)
        .into_iter()
        .skip(1)
        .find(|ancestor| memberships.role_in(*ancestor).is_some_and(|r| r.is_admin()))
}

/// Effective role of the user in `target`.
///
/// Direct membership takes precedence. Without one, admin rights on the
/// nearest administered ancestor are inherited. Manager rights are never
/// inherited.
///
/// # Example
///
/// ```
/// use govern_org::{Membership, MembershipRole, MembershipSet, OrgHierarchy, Organization, RoleSource};
/// use govern_rbac::gate::{effective_role, AccessView};
/// use uuid::Uuid;
///
/// let parent = Organization::new("Group");
/// let child = Organization::new("Unit").with_parent(parent.id);
/// let (parent_id, child_id) = (parent.id, child.id);
/// let hierarchy = OrgHierarchy::build([parent, child]).unwrap();
/// let memberships = MembershipSet::from_memberships([
///     Membership::new(parent_id, Uuid::now_v7(), MembershipRole::Admin),
/// ]);
///
/// let role = effective_role(child_id, &AccessView::new(&memberships, &hierarchy)).unwrap();
/// assert_eq!(role.source, RoleSource::Inherited { via: parent_id });
/// ```
pub fn effective_role(target: Uuid, scope: &(impl AccessScope + ?Sized)) -> Option<EffectiveRole> {
    if let Some(role) = scope.memberships().role_in(target) {
        return Some(EffectiveRole::direct(role));
    }
    administering_ancestor(target, scope).map(EffectiveRole::inherited)
}

/// Whether the user may open `target` as their active organization.
///
/// True for direct memberships and for descendants of administered
/// organizations.
pub fn is_accessible(target: Uuid, scope: &(impl AccessScope + ?Sized)) -> bool {
    effective_role(target, scope).is_some()
}

/// Decide whether the user may perform `action` in `target`.
///
/// A direct membership must meet the action's minimum role. Inherited admin
/// rights count only for actions that inherit (read-scoped actions), so an
/// admin of a parent can view a child organization but cannot manage its
/// members.
///
/// # Example
///
/// ```
/// use govern_org::{Membership, MembershipRole, MembershipSet, OrgHierarchy, Organization};
/// use govern_rbac::{can_perform, Action, AccessView};
/// use uuid::Uuid;
///
/// let parent = Organization::new("Group");
/// let child = Organization::new("Unit").with_parent(parent.id);
/// let (parent_id, child_id) = (parent.id, child.id);
/// let hierarchy = OrgHierarchy::build([parent, child]).unwrap();
/// let memberships = MembershipSet::from_memberships([
///     Membership::new(parent_id, Uuid::now_v7(), MembershipRole::Admin),
/// ]);
/// let view = AccessView::new(&memberships, &hierarchy);
///
/// assert!(can_perform(Action::ManageMembers, parent_id, &view));
/// assert!(can_perform(Action::View, child_id, &view));
/// assert!(!can_perform(Action::ManageMembers, child_id, &view));
/// ```
pub fn can_perform(action: Action, target: Uuid, scope: &(impl AccessScope + ?Sized)) -> bool {
    let required = action.required_role();

    if let Some(role) = scope.memberships().role_in(target) {
        if role.satisfies(required) {
            return true;
        }
    }

    action.inherits() && administering_ancestor(target, scope).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use govern_org::{Membership, MembershipRole, Organization, RoleSource};

    struct Fixture {
        hierarchy: OrgHierarchy,
        group: Uuid,
        subsidiary: Uuid,
        unit: Uuid,
        sibling: Uuid,
    }

    /// group -> subsidiary -> unit, plus an unrelated root `sibling`
    fn fixture() -> Fixture {
        let group = Organization::new("Group");
        let subsidiary = Organization::new("Subsidiary").with_parent(group.id);
        let unit = Organization::new("Unit").with_parent(subsidiary.id);
        let sibling = Organization::new("Sibling");
        let ids = (group.id, subsidiary.id, unit.id, sibling.id);

        Fixture {
            hierarchy: OrgHierarchy::build([group, subsidiary, unit, sibling]).unwrap(),
            group: ids.0,
            subsidiary: ids.1,
            unit: ids.2,
            sibling: ids.3,
        }
    }

    fn memberships(entries: &[(Uuid, MembershipRole)]) -> MembershipSet {
        let user = Uuid::now_v7();
        MembershipSet::from_memberships(
            entries
                .iter()
                .map(|(org, role)| Membership::new(*org, user, *role)),
        )
    }

    #[test]
    fn test_direct_admin_can_do_everything() {
        let f = fixture();
        let m = memberships(&[(f.group, MembershipRole::Admin)]);
        let view = AccessView::new(&m, &f.hierarchy);

        for action in Action::all() {
            assert!(can_perform(action, f.group, &view), "{action}");
        }
    }

    #[test]
    fn test_direct_manager_limits() {
        let f = fixture();
        let m = memberships(&[(f.subsidiary, MembershipRole::Manager)]);
        let view = AccessView::new(&m, &f.hierarchy);

        assert!(can_perform(Action::View, f.subsidiary, &view));
        assert!(can_perform(Action::EditPolicy, f.subsidiary, &view));
        assert!(can_perform(Action::ManageFrameworkMappings, f.subsidiary, &view));
        assert!(can_perform(Action::TrackRegulatoryEvents, f.subsidiary, &view));
        assert!(!can_perform(Action::ManageMembers, f.subsidiary, &view));
        assert!(!can_perform(Action::ManageOrganization, f.subsidiary, &view));
    }

    #[test]
    fn test_admin_inheritance_is_view_only() {
        let f = fixture();
        let m = memberships(&[(f.group, MembershipRole::Admin)]);
        let view = AccessView::new(&m, &f.hierarchy);

        for target in [f.subsidiary, f.unit] {
            assert!(can_perform(Action::View, target, &view));
            assert!(!can_perform(Action::ManageMembers, target, &view));
            assert!(!can_perform(Action::EditPolicy, target, &view));
            assert!(!can_perform(Action::ManageOrganization, target, &view));
        }
        assert!(!can_perform(Action::View, f.sibling, &view));
    }

    #[test]
    fn test_manager_role_does_not_inherit() {
        let f = fixture();
        let m = memberships(&[(f.group, MembershipRole::Manager)]);
        let view = AccessView::new(&m, &f.hierarchy);

        assert!(can_perform(Action::View, f.group, &view));
        assert!(!can_perform(Action::View, f.subsidiary, &view));
        assert!(effective_role(f.subsidiary, &view).is_none());
        assert!(!is_accessible(f.unit, &view));
    }

    #[test]
    fn test_direct_membership_beats_inheritance() {
        let f = fixture();
        let m = memberships(&[
            (f.group, MembershipRole::Admin),
            (f.unit, MembershipRole::Manager),
        ]);
        let view = AccessView::new(&m, &f.hierarchy);

        assert_eq!(
            effective_role(f.unit, &view),
            Some(EffectiveRole::direct(MembershipRole::Manager))
        );
        assert!(can_perform(Action::EditPolicy, f.unit, &view));
        assert!(!can_perform(Action::ManageMembers, f.unit, &view));
    }

    #[test]
    fn test_inherited_role_names_nearest_admin_ancestor() {
        let f = fixture();
        let m = memberships(&[
            (f.group, MembershipRole::Admin),
            (f.subsidiary, MembershipRole::Admin),
        ]);
        let view = AccessView::new(&m, &f.hierarchy);

        let role = effective_role(f.unit, &view).unwrap();
        assert_eq!(role.role, MembershipRole::Admin);
        assert_eq!(role.source, RoleSource::Inherited { via: f.subsidiary });
    }

    #[test]
    fn test_unknown_target_is_denied() {
        let f = fixture();
        let m = memberships(&[(f.group, MembershipRole::Admin)]);
        let view = AccessView::new(&m, &f.hierarchy);
        let stranger = Uuid::now_v7();

        assert!(!is_accessible(stranger, &view));
        for action in Action::all() {
            assert!(!can_perform(action, stranger, &view));
        }
    }

    #[test]
    fn test_no_memberships_denies_everything() {
        let f = fixture();
        let m = MembershipSet::new();
        let view = AccessView::new(&m, &f.hierarchy);

        assert!(!can_perform(Action::View, f.group, &view));
        assert!(effective_role(f.group, &view).is_none());
    }
}
