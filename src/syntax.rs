//! Abstract-syntax descriptors (SPEC_FULL.md §3): an immutable
//! `{uuid, major, minor}` naming the RPC interface a [`crate::client::Context`]
//! binds to. Any concrete interface beyond a placeholder is out of scope
//! (SPEC_FULL.md Non-goals) — [`SRVSVC`] exists to exercise bind/call
//! against a real, well-known UUID, not to implement the interface.

use crate::pdu::SyntaxId;

/// `{uuid, version, version_minor}` for an RPC interface, as opposed to a
/// transfer syntax (see [`SyntaxId::NDR32`]/[`SyntaxId::NDR64`]).
pub type AbstractSyntax = SyntaxId;

/// The well-known SRVSVC interface UUID, used as a placeholder abstract
/// syntax in tests and examples. No SRVSVC operation is implemented.
pub const SRVSVC: AbstractSyntax = AbstractSyntax {
    uuid: crate::ndr::Uuid::new(0x4b324fc8, 0x1670, 0x01d3, 0x12785a47bf6ee188),
    version: 3,
    version_minor: 0,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srvsvc_uuid_matches_well_known_constant() {
        assert_eq!(SRVSVC.uuid.v1, 0x4b324fc8);
        assert_eq!(SRVSVC.version, 3);
    }
}
