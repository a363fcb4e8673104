use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum Role {
    #[serde(rename = "empleado")]
    #[strum(serialize = "empleado")]
    Staff,
    #[serde(rename = "gestor_rrhh")]
    #[strum(serialize = "gestor_rrhh")]
    HrManager,
    #[serde(rename = "administrador")]
    #[strum(serialize = "administrador")]
    Administrator,
}

/// What an authenticated actor is allowed to do.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Capability {
    /// Read one's own employee record.
    ViewSelf,
    ViewRoster,
    ManageEmployees,
    /// Change role, salary, deductions, bonuses or the elevated flag.
    ManageCompensation,
    RunPayroll,
}

const STAFF: &[Capability] = &[Capability::ViewSelf];

const HR_MANAGER: &[Capability] = &[
    Capability::ViewSelf,
    Capability::ViewRoster,
    Capability::ManageEmployees,
    Capability::ManageCompensation,
    Capability::RunPayroll,
];

const EVERYTHING: &[Capability] = HR_MANAGER;

impl Role {
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Role::Staff => STAFF,
            Role::HrManager => HR_MANAGER,
            Role::Administrator => EVERYTHING,
        }
    }
}

/// Capability set for an actor. The elevated flag grants everything.
pub fn capabilities_for(role: Role, superadmin: bool) -> &'static [Capability] {
    if superadmin {
        EVERYTHING
    } else {
        role.capabilities()
    }
}
