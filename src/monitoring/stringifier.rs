//! Pluggable message stringifier (§6.4, §4.9 `message_stringifier.h`): a
//! debug aid, not part of the wire contract. Describing a message can
//! never fail or panic -- an unrecognised payload just falls back to its
//! type name and destination.

use crate::message::{
    DiscoveryRequest, Envelope, InitRequest, LinkRequest, RegisterName, ShutdownRequest, UnlinkNotify,
};

pub trait Stringifier {
    fn describe(&self, envelope: &Envelope) -> String;
}

/// Knows every message type this crate itself defines (§6.4: "the default
/// implementation knows every library-internal message type"); anything
/// else renders generically.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStringifier;

impl Stringifier for DefaultStringifier {
    fn describe(&self, envelope: &Envelope) -> String {
        if let Some(req) = envelope.downcast::<InitRequest>() {
            return format!("init_request(reply_to={})", req.reply_to.id());
        }
        if let Some(req) = envelope.downcast::<ShutdownRequest>() {
            return match &req.reason {
                Some(reason) => format!("shutdown_request(reason={reason})"),
                None => "shutdown_request(reason=none)".to_string(),
            };
        }
        if let Some(req) = envelope.downcast::<LinkRequest>() {
            return format!("link_request(client={})", req.client.id());
        }
        if let Some(notify) = envelope.downcast::<UnlinkNotify>() {
            return match &notify.reason {
                Some(reason) => format!("unlink_notify(server={}, reason={reason})", notify.server.id()),
                None => format!("unlink_notify(server={})", notify.server.id()),
            };
        }
        if let Some(req) = envelope.downcast::<RegisterName>() {
            return format!("register_name(name={:?}, address={})", req.name, req.address.id());
        }
        if let Some(req) = envelope.downcast::<DiscoveryRequest>() {
            return format!("discovery_request(name={:?})", req.name);
        }

        match envelope.request_id() {
            Some(id) => format!("{}#{} -> {} [{id}]", envelope.type_name(), envelope.id(), envelope.destination().id()),
            None => format!("{}#{} -> {}", envelope.type_name(), envelope.id(), envelope.destination().id()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::address::{Address, LocalityToken, SupervisorHandle};
    use crate::message::Payload;
    use crate::util::ActorId;
    use std::sync::mpsc::channel;

    #[derive(Debug)]
    struct Custom;
    impl Payload for Custom {
        const TYPE_NAME: &'static str = "custom";
    }

    fn test_address() -> Address {
        Address::new(ActorId::new(), LocalityToken::new_leader(), SupervisorHandle::new(channel().0))
    }

    #[test]
    fn describes_known_internal_messages_with_detail() {
        let envelope = Envelope::new(test_address(), InitRequest { reply_to: test_address() });
        let description = DefaultStringifier.describe(&envelope);
        assert!(description.starts_with("init_request"));
    }

    #[test]
    fn falls_back_to_type_name_for_unknown_payloads() {
        let envelope = Envelope::new(test_address(), Custom);
        let description = DefaultStringifier.describe(&envelope);
        assert!(description.starts_with("custom#"));
    }
}
