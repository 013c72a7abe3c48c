//! Route-area role policies.
//!
//! The table is plain text so it reads like the deployment's access matrix;
//! every name is checked against the role registry when the app starts.

use axum::Router;

use crafterp_auth::{AccessPolicy, ConfigurationError};

use super::routes;

/// One guarded route area.
#[derive(Clone, Copy)]
pub struct AreaSpec {
    pub path: &'static str,
    pub roles: &'static [&'static str],
    pub routes: fn() -> Router,
}

pub const AREAS: &[AreaSpec] = &[
    AreaSpec { path: "/admin", roles: &["admin"], routes: routes::admin::router },
    AreaSpec { path: "/sales", roles: &["crm", "sales"], routes: routes::areas::router },
    AreaSpec { path: "/accounts", roles: &["accounts", "admin"], routes: routes::areas::router },
    AreaSpec { path: "/hr", roles: &["hr"], routes: routes::areas::router },
    AreaSpec { path: "/printing", roles: &["printing"], routes: routes::areas::router },
    AreaSpec { path: "/projects", roles: &["project"], routes: routes::areas::router },
    AreaSpec { path: "/project-management", roles: &["project_manager"], routes: routes::areas::router },
];

#[derive(Debug, Clone)]
pub struct RoutePolicies {
    /// `GET /auth/me`: any authenticated account.
    pub me: AccessPolicy,
    pub areas: Vec<(AreaSpec, AccessPolicy)>,
}

impl core::fmt::Debug for AreaSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AreaSpec")
            .field("path", &self.path)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

impl RoutePolicies {
    pub fn standard() -> Result<Self, ConfigurationError> {
        Self::from_areas(AREAS)
    }

    pub fn from_areas(areas: &[AreaSpec]) -> Result<Self, ConfigurationError> {
        let areas = areas
            .iter()
            .map(|spec| -> Result<(AreaSpec, AccessPolicy), ConfigurationError> {
                let policy = spec
                    .roles
                    .iter()
                    .fold(AccessPolicy::builder(spec.path.trim_start_matches('/')), |b, role| {
                        b.allow_named(*role)
                    })
                    .build()?;
                Ok((*spec, policy))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            me: AccessPolicy::any_role("me"),
            areas,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccessPolicy> {
        std::iter::once(&self.me).chain(self.areas.iter().map(|(_, p)| p))
    }

    pub fn area(&self, path: &str) -> Option<&AccessPolicy> {
        self.areas
            .iter()
            .find(|(spec, _)| spec.path == path)
            .map(|(_, policy)| policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crafterp_auth::Role;

    #[test]
    fn standard_table_is_valid() {
        let policies = RoutePolicies::standard().unwrap();
        assert!(policies.area("/sales").unwrap().permits(Role::Crm));
        assert!(policies.area("/accounts").unwrap().permits(Role::Admin));
        assert!(!policies.area("/admin").unwrap().permits(Role::Sales));
        assert!(!policies.area("/hr").unwrap().permits(Role::Admin));
    }

    #[test]
    fn unknown_role_in_the_table_is_fatal() {
        let bad = [AreaSpec {
            path: "/reports",
            roles: &["accounts", "auditor"],
            routes: routes::areas::router,
        }];
        let err = RoutePolicies::from_areas(&bad).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownRole { role, .. } if role == "auditor"));
    }
}
