// src/services/permission_resolver.rs

//! Cálculo das permissões efetivas de um usuário.
//!
//! Duas fontes por módulo: a permissão do cargo e o override individual.
//! O override substitui os quatro booleanos do cargo por inteiro; não há
//! merge campo a campo.

use std::collections::{BTreeMap, HashSet};

use crate::models::rbac::{
    Action, EffectivePermission, PermissionEntry, PermissionSource, RolePermission, UserPermission,
};

/// Permissões efetivas indexadas pelo ID do módulo (ordem crescente).
pub type EffectivePermissions = BTreeMap<i32, EffectivePermission>;

/// Junta as permissões do cargo com os overrides do usuário.
///
/// Função pura e total: entradas vazias geram um mapa vazio. Se o mesmo
/// módulo aparecer duas vezes na mesma lista, vale o último.
pub fn resolve_effective_permissions(
    role_permissions: &[RolePermission],
    user_permissions: &[UserPermission],
) -> EffectivePermissions {
    let mut resolved = EffectivePermissions::new();

    for entry in role_permissions {
        let previous = resolved.insert(
            entry.admin_module_id,
            EffectivePermission {
                admin_module_id: entry.admin_module_id,
                permissions: entry.permissions,
                source: PermissionSource::Role,
                effective_permissions: entry.permissions,
            },
        );
        if previous.is_some() {
            tracing::warn!(module_id = entry.admin_module_id, "Módulo repetido nas permissões do cargo");
        }
    }

    for entry in user_permissions {
        let previous = resolved.insert(
            entry.admin_module_id,
            EffectivePermission {
                admin_module_id: entry.admin_module_id,
                permissions: entry.permissions,
                source: PermissionSource::User,
                effective_permissions: entry.permissions,
            },
        );
        if matches!(previous, Some(ref p) if p.source == PermissionSource::User) {
            tracing::warn!(module_id = entry.admin_module_id, "Módulo repetido nos overrides do usuário");
        }
    }

    resolved
}

/// Módulo ausente = sem acesso.
pub fn is_allowed(resolved: &EffectivePermissions, module_id: i32, action: Action) -> bool {
    resolved
        .get(&module_id)
        .is_some_and(|p| p.effective_permissions.allows(action))
}

/// Primeiro módulo repetido numa matriz enviada para gravação.
pub fn find_duplicate_module(entries: &[PermissionEntry]) -> Option<i32> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .map(|e| e.admin_module_id)
        .find(|id| !seen.insert(*id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rbac::Permission;

    const fn perm(view: bool, create: bool, edit: bool, delete: bool) -> Permission {
        Permission { view, create, edit, delete }
    }

    fn role(module: i32, permissions: Permission) -> RolePermission {
        RolePermission { user_type_id: 1, admin_module_id: module, permissions }
    }

    fn user(module: i32, permissions: Permission) -> UserPermission {
        UserPermission { user_id: 7, admin_module_id: module, permissions }
    }

    #[test]
    fn test_empty_inputs() {
        assert!(resolve_effective_permissions(&[], &[]).is_empty());
    }

    #[test]
    fn test_role_only_passes_through() {
        let roles = vec![role(1, perm(true, false, false, false)), role(2, Permission::all())];

        let resolved = resolve_effective_permissions(&roles, &[]);

        assert_eq!(resolved.len(), 2);
        for r in &roles {
            let entry = &resolved[&r.admin_module_id];
            assert_eq!(entry.source, PermissionSource::Role);
            assert_eq!(entry.permissions, r.permissions);
            assert_eq!(entry.effective_permissions, r.permissions);
        }
    }

    #[test]
    fn test_disjoint_sources_are_unioned() {
        let roles = vec![role(1, perm(true, true, false, false)), role(3, perm(true, false, false, false))];
        let users = vec![user(2, perm(true, false, true, false))];

        let resolved = resolve_effective_permissions(&roles, &users);

        assert_eq!(resolved.len(), roles.len() + users.len());
        assert_eq!(resolved[&1].source, PermissionSource::Role);
        assert_eq!(resolved[&3].source, PermissionSource::Role);
        assert_eq!(resolved[&2].source, PermissionSource::User);
        assert_eq!(resolved[&2].effective_permissions, perm(true, false, true, false));
    }

    #[test]
    fn test_user_override_replaces_role_entirely() {
        // O cargo dá view+create; o override dá só edit. Nada do cargo sobrevive.
        let roles = vec![role(5, perm(true, true, false, false))];
        let users = vec![user(5, perm(false, false, true, false))];

        let resolved = resolve_effective_permissions(&roles, &users);

        assert_eq!(resolved.len(), 1);
        let entry = &resolved[&5];
        assert_eq!(entry.source, PermissionSource::User);
        assert_eq!(entry.effective_permissions, perm(false, false, true, false));
        assert_eq!(entry.permissions, entry.effective_permissions);
    }

    #[test]
    fn test_override_can_revoke_everything() {
        let roles = vec![role(1, Permission::all())];
        let users = vec![user(1, Permission::none())];

        let resolved = resolve_effective_permissions(&roles, &users);

        for action in [Action::View, Action::Create, Action::Edit, Action::Delete] {
            assert!(!is_allowed(&resolved, 1, action));
        }
    }

    #[test]
    fn test_mixed_scenario() {
        let roles = vec![role(1, perm(true, true, false, false))];
        let users = vec![user(1, perm(true, false, true, false)), user(2, perm(true, false, false, false))];

        let resolved = resolve_effective_permissions(&roles, &users);

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[&1].source, PermissionSource::User);
        assert_eq!(resolved[&1].effective_permissions, perm(true, false, true, false));
        assert_eq!(resolved[&2].source, PermissionSource::User);
        assert_eq!(resolved[&2].effective_permissions, perm(true, false, false, false));
    }

    #[test]
    fn test_duplicates_last_one_wins() {
        let roles = vec![role(1, Permission::all()), role(1, perm(true, false, false, false))];
        let users = vec![user(2, Permission::none()), user(2, perm(false, true, false, false))];

        let resolved = resolve_effective_permissions(&roles, &users);

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[&1].effective_permissions, perm(true, false, false, false));
        assert_eq!(resolved[&2].effective_permissions, perm(false, true, false, false));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let roles = vec![role(3, Permission::all()), role(1, perm(true, false, false, false))];
        let users = vec![user(2, perm(true, true, false, false)), user(3, Permission::none())];

        let first = resolve_effective_permissions(&roles, &users);
        let second = resolve_effective_permissions(&roles, &users);

        assert_eq!(first, second);
        let order: Vec<i32> = first.keys().copied().collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_is_allowed_on_absent_module() {
        let resolved = resolve_effective_permissions(&[role(1, Permission::all())], &[]);
        assert!(is_allowed(&resolved, 1, Action::Delete));
        assert!(!is_allowed(&resolved, 99, Action::View));
    }

    #[test]
    fn test_find_duplicate_module() {
        let entry = |id| PermissionEntry { admin_module_id: id, permissions: Permission::none() };

        assert_eq!(find_duplicate_module(&[]), None);
        assert_eq!(find_duplicate_module(&[entry(1), entry(2), entry(3)]), None);
        assert_eq!(find_duplicate_module(&[entry(1), entry(2), entry(1), entry(2)]), Some(1));
    }
}
