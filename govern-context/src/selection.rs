//! Default organization selection

use std::cmp::Reverse;

use govern_rbac::AccessScope;
use uuid::Uuid;

/// The organization activated when nothing else is requested.
///
/// Candidates are the direct memberships, ordered by role (admin first),
/// then by depth in the hierarchy (shallower first), then by
/// case-insensitive name, then by ID. The first candidate wins, so the
/// choice depends only on the memberships and the hierarchy.
pub fn default_organization(scope: &(impl AccessScope + ?Sized)) -> Option<Uuid> {
    let hierarchy = scope.hierarchy();

    scope
        .memberships()
        .iter()
        .min_by_key(|membership| {
            let org_id = membership.org_id;
            let name = hierarchy
                .get(org_id)
                .map(|org| org.name.to_lowercase())
                .unwrap_or_default();
            (
                Reverse(membership.role),
                hierarchy.depth_of(org_id).unwrap_or(usize::MAX),
                name,
                org_id,
            )
        })
        .map(|membership| membership.org_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use govern_org::{Membership, MembershipRole, MembershipSet, OrgHierarchy, Organization};
    use govern_rbac::AccessView;

    fn pick(organizations: Vec<Organization>, entries: &[(Uuid, MembershipRole)]) -> Option<Uuid> {
        let user = Uuid::now_v7();
        let hierarchy = OrgHierarchy::build(organizations).unwrap();
        let memberships = MembershipSet::from_memberships(
            entries
                .iter()
                .map(|(org, role)| Membership::new(*org, user, *role)),
        );
        default_organization(&AccessView::new(&memberships, &hierarchy))
    }

    #[test]
    fn test_empty_memberships_select_nothing() {
        assert_eq!(pick(vec![Organization::new("Acme")], &[]), None);
    }

    #[test]
    fn test_admin_before_manager() {
        let managed = Organization::new("Alpha");
        let administered = Organization::new("Zulu");
        let entries = [
            (managed.id, MembershipRole::Manager),
            (administered.id, MembershipRole::Admin),
        ];

        assert_eq!(pick(vec![managed, administered.clone()], &entries), Some(administered.id));
    }

    #[test]
    fn test_shallower_before_deeper() {
        let group = Organization::new("Zeta Group");
        let unit = Organization::new("Alpha Unit").with_parent(group.id);
        let entries = [
            (unit.id, MembershipRole::Manager),
            (group.id, MembershipRole::Manager),
        ];

        assert_eq!(pick(vec![group.clone(), unit], &entries), Some(group.id));
    }

    #[test]
    fn test_name_ignores_case() {
        let upper = Organization::new("BETA");
        let lower = Organization::new("alpha");
        let entries = [
            (upper.id, MembershipRole::Admin),
            (lower.id, MembershipRole::Admin),
        ];

        assert_eq!(pick(vec![upper, lower.clone()], &entries), Some(lower.id));
    }

    #[test]
    fn test_identical_names_fall_back_to_id() {
        let first = Organization::new("Acme");
        let second = Organization::new("Acme");
        let expected = first.id.min(second.id);
        let entries = [
            (first.id, MembershipRole::Manager),
            (second.id, MembershipRole::Manager),
        ];

        assert_eq!(pick(vec![second, first], &entries), Some(expected));
    }
}
