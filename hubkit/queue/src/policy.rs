//! Per-kind response expectation and correlation policies.
//!
//! With no request ids on the wire, correlation is structural: each request
//! kind declares whether it expects a response at all, and which decoded
//! shapes count as its response. No predicate matches more than one logical
//! response class.

use hubkit_wire::{
    AlertOperation, CombinedFormatCommand, IoAttachmentEvent, NetworkRequest, NetworkUpdate,
    OutputCommandFlags, PropertyOperation, RequestBody, ResponseBody, VirtualPortRequest,
};

/// Whether a request kind expects a correlated response.
pub fn expects_response(request: &RequestBody) -> bool {
    match request {
        // Only an explicit update request is answered.
        RequestBody::Properties { operation, .. } => {
            *operation == PropertyOperation::RequestUpdate
        }
        // Actions are fire-and-forget.
        RequestBody::Action(_) => false,
        RequestBody::Alert { operation, .. } => matches!(
            operation,
            AlertOperation::EnableUpdates | AlertOperation::RequestUpdate
        ),
        // Only the three get queries are answered.
        RequestBody::Network(request) => matches!(
            request,
            NetworkRequest::GetFamily
                | NetworkRequest::GetSubfamily
                | NetworkRequest::GetExtendedFamily
        ),
        RequestBody::LockMemory => false,
        // Only the unlock sub-ops produce a format echo.
        RequestBody::InputFormatCombined { command, .. } => matches!(
            command,
            CombinedFormatCommand::UnlockEnabled | CombinedFormatCommand::UnlockDisabled
        ),
        // Feedback arrives only when explicitly requested.
        RequestBody::OutputCommand { flags, .. } => {
            flags.contains(OutputCommandFlags::REQUEST_FEEDBACK)
        }
        _ => true,
    }
}

/// Whether `response` resolves `request`.
pub fn matches_response(request: &RequestBody, response: &ResponseBody) -> bool {
    match request {
        RequestBody::Properties {
            property: requested,
            ..
        } => matches!(
            response,
            ResponseBody::Properties { property, .. } if property == requested
        ),

        RequestBody::Alert {
            alert: requested, ..
        } => matches!(
            response,
            ResponseBody::Alert { alert, .. } if alert == requested
        ),

        RequestBody::Network(network) => match (network, response) {
            (NetworkRequest::GetFamily, ResponseBody::Network(NetworkUpdate::Family(_))) => true,
            (
                NetworkRequest::GetSubfamily,
                ResponseBody::Network(NetworkUpdate::Subfamily(_)),
            ) => true,
            (
                NetworkRequest::GetExtendedFamily,
                ResponseBody::Network(NetworkUpdate::ExtendedFamily(_)),
            ) => true,
            _ => false,
        },

        // Boot mode has no dedicated response; a generic acknowledgement
        // keyed by its raw type code resolves it.
        RequestBody::BootMode => {
            matches!(response, ResponseBody::Feedback { command, .. } if *command == 0x10)
        }

        RequestBody::LockStatusRequest => matches!(response, ResponseBody::LockStatus { .. }),

        RequestBody::PortInformationRequest {
            port: requested_port,
            kind,
        } => matches!(
            response,
            ResponseBody::PortInformation { port, info }
                if port == requested_port && info.kind() == *kind
        ),

        RequestBody::PortModeInformationRequest {
            port: requested_port,
            mode: requested_mode,
            kind,
        } => matches!(
            response,
            ResponseBody::PortModeInformation { port, mode, info }
                if port == requested_port && mode == requested_mode && info.kind() == *kind
        ),

        RequestBody::InputFormatSingle {
            port: requested_port,
            mode: requested_mode,
            ..
        } => matches!(
            response,
            ResponseBody::InputFormatSingle { port, mode, .. }
                if port == requested_port && mode == requested_mode
        ),

        RequestBody::InputFormatCombined {
            port: requested_port,
            ..
        } => matches!(
            response,
            ResponseBody::InputFormatCombined { port, .. } if port == requested_port
        ),

        // Virtual port setup resolves on a generic acknowledgement keyed by
        // its raw type code, or structurally on the resulting attach/detach.
        RequestBody::VirtualPortSetup(setup) => match response {
            ResponseBody::Feedback { command, .. } => *command == 0x61,
            ResponseBody::AttachedIo(event) => match (setup, event) {
                (
                    VirtualPortRequest::Connect { first, second },
                    IoAttachmentEvent::AttachedVirtual {
                        first: a,
                        second: b,
                        ..
                    },
                ) => (a == first && b == second) || (a == second && b == first),
                (
                    VirtualPortRequest::Disconnect { port },
                    IoAttachmentEvent::Detached { port: detached },
                ) => detached == port,
                _ => false,
            },
            _ => false,
        },

        RequestBody::OutputCommand {
            port: requested_port,
            ..
        } => matches!(
            response,
            ResponseBody::OutputFeedback { feedback }
                if feedback.iter().any(|(port, _)| port == requested_port)
        ),

        // Fire-and-forget kinds never match anything.
        RequestBody::Action(_) | RequestBody::LockMemory => false,
    }
}
