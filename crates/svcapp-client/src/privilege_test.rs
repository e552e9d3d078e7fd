use svcapp_core::Error;

use crate::fakes::FakeSystemctl;
use crate::{GroupIdGate, PrivilegeGate};

fn gate(gid: Option<&str>) -> GroupIdGate {
    GroupIdGate::new(FakeSystemctl::with_gid(gid))
}

#[test]
fn test_superuser_group_is_authorized() {
    assert!(gate(Some("0")).check_privileges().is_ok());
}

#[test]
fn test_other_group_is_rejected() {
    assert!(matches!(
        gate(Some("1000")).check_privileges(),
        Err(Error::InsufficientPrivileges)
    ));
}

#[test]
fn test_unparseable_group_is_invalid_response() {
    assert!(matches!(
        gate(Some("wheel")).check_privileges(),
        Err(Error::InvalidSystemResponse)
    ));
    assert!(matches!(
        gate(Some("")).check_privileges(),
        Err(Error::InvalidSystemResponse)
    ));
}

#[test]
fn test_missing_identity_query_is_unsupported() {
    assert!(matches!(
        gate(None).check_privileges(),
        Err(Error::UnsupportedSystem)
    ));
}
