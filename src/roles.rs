//! Role Derivation
//!
//! Classifies a wallet against the registry's authorization model:
//! one configured admin wallet, land inspectors identified by a non-zero
//! location assignment, revenue employees by a non-zero department
//! assignment, everyone else a plain citizen.
//!
//! The derivation is a pure function over already-fetched values so the
//! classification rules are testable without a node. The admin comparison
//! is case-insensitive on the hex form; the on-chain checks treat
//! "greater than zero" as "assigned". The reads that feed it fail soft to
//! zero at the call site: an unreachable node must never classify anyone
//! as staff.

use ethers::types::Address;
use serde::Serialize;

/// Primary role of a wallet, by precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Inspector,
    Employee,
    Citizen,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Admin => "admin",
            Self::Inspector => "inspector",
            Self::Employee => "employee",
            Self::Citizen => "citizen",
        };
        write!(f, "{s}")
    }
}

/// Full authorization view of a wallet
#[derive(Debug, Clone, Serialize)]
pub struct RoleFlags {
    pub admin: bool,
    pub inspector: bool,
    pub employee: bool,
    /// Location the inspector covers; zero when not an inspector
    pub inspector_location: u64,
    /// Department the employee belongs to; zero when not an employee
    pub employee_department: u64,
}

impl RoleFlags {
    /// The single role a dashboard routes on, by precedence
    pub fn primary(&self) -> Role {
        if self.admin {
            Role::Admin
        } else if self.inspector {
            Role::Inspector
        } else if self.employee {
            Role::Employee
        } else {
            Role::Citizen
        }
    }
}

/// Derive role flags from the configured admin wallet and the two
/// on-chain assignment reads.
pub fn derive_roles(
    account: Address,
    admin: Address,
    inspector_location: u64,
    employee_department: u64,
) -> RoleFlags {
    // Address equality on parsed values is inherently case-insensitive:
    // both sides come from hex strings of the same 20 bytes.
    RoleFlags {
        admin: account == admin,
        inspector: inspector_location > 0,
        employee: employee_department > 0,
        inspector_location,
        employee_department,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::parse_address;

    const ADMIN: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    #[test]
    fn admin_match_is_case_insensitive() {
        let admin = parse_address(ADMIN).unwrap();
        let same_lowercase = parse_address(&ADMIN.to_lowercase()).unwrap();

        // Admin wins regardless of any on-chain assignments
        let flags = derive_roles(same_lowercase, admin, 4, 9);
        assert!(flags.admin);
        assert_eq!(flags.primary(), Role::Admin);
    }

    #[test]
    fn nonzero_location_makes_inspector() {
        let admin = parse_address(ADMIN).unwrap();
        let account = parse_address("0x8617E340B3D01FA5F11F306F4090FD50E238070D").unwrap();

        let flags = derive_roles(account, admin, 3, 0);
        assert!(flags.inspector);
        assert!(!flags.employee);
        assert_eq!(flags.primary(), Role::Inspector);
    }

    #[test]
    fn nonzero_department_makes_employee() {
        let admin = parse_address(ADMIN).unwrap();
        let account = parse_address("0x8617E340B3D01FA5F11F306F4090FD50E238070D").unwrap();

        let flags = derive_roles(account, admin, 0, 12);
        assert_eq!(flags.primary(), Role::Employee);
    }

    #[test]
    fn inspector_outranks_employee() {
        let admin = parse_address(ADMIN).unwrap();
        let account = parse_address("0x8617E340B3D01FA5F11F306F4090FD50E238070D").unwrap();

        let flags = derive_roles(account, admin, 1, 1);
        assert_eq!(flags.primary(), Role::Inspector);
    }

    #[test]
    fn zero_reads_classify_citizen() {
        let admin = parse_address(ADMIN).unwrap();
        let account = parse_address("0x8617E340B3D01FA5F11F306F4090FD50E238070D").unwrap();

        let flags = derive_roles(account, admin, 0, 0);
        assert!(!flags.admin && !flags.inspector && !flags.employee);
        assert_eq!(flags.primary(), Role::Citizen);
    }
}
