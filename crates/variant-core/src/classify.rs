//! Client device classification.

use crate::context::RequestContext;
use crate::variant::Variant;

/// Decides which variant suits the requesting client.
///
/// Implementors answer the two device questions; `classify` fixes the
/// precedence: tablet is tested before mobile, and a client matching
/// neither gets the default variant.
pub trait ClientClassifier: Send + Sync {
    /// Whether the client is a tablet-class device.
    fn is_tablet(&self, request: &RequestContext) -> bool;

    /// Whether the client is a phone-class device.
    fn is_mobile(&self, request: &RequestContext) -> bool;

    /// Pick a variant for the client.
    fn classify(&self, request: &RequestContext) -> Variant {
        if self.is_tablet(request) {
            Variant::Tablet
        } else if self.is_mobile(request) {
            Variant::Mobile
        } else {
            Variant::Desktop
        }
    }
}

impl<C: ClientClassifier + ?Sized> ClientClassifier for &C {
    fn is_tablet(&self, request: &RequestContext) -> bool {
        (**self).is_tablet(request)
    }

    fn is_mobile(&self, request: &RequestContext) -> bool {
        (**self).is_mobile(request)
    }

    fn classify(&self, request: &RequestContext) -> Variant {
        (**self).classify(request)
    }
}

impl<C: ClientClassifier + ?Sized> ClientClassifier for std::sync::Arc<C> {
    fn is_tablet(&self, request: &RequestContext) -> bool {
        (**self).is_tablet(request)
    }

    fn is_mobile(&self, request: &RequestContext) -> bool {
        (**self).is_mobile(request)
    }

    fn classify(&self, request: &RequestContext) -> Variant {
        (**self).classify(request)
    }
}

/// Coarse User-Agent substring heuristic.
///
/// Good enough as a default; hosts with a real device-detection library
/// should supply their own `ClientClassifier`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserAgentClassifier;

impl UserAgentClassifier {
    fn user_agent(request: &RequestContext) -> String {
        request.user_agent().unwrap_or_default().to_lowercase()
    }
}

impl ClientClassifier for UserAgentClassifier {
    fn is_tablet(&self, request: &RequestContext) -> bool {
        let ua = Self::user_agent(request);

        ua.contains("ipad")
            || ua.contains("tablet")
            || ua.contains("kindle")
            || ua.contains("silk/")
            // Android devices without "mobile" are tablets
            || (ua.contains("android") && !ua.contains("mobile"))
    }

    fn is_mobile(&self, request: &RequestContext) -> bool {
        let ua = Self::user_agent(request);

        ua.contains("mobile")
            || ua.contains("iphone")
            || ua.contains("ipod")
            || ua.contains("android")
            || ua.contains("windows phone")
            || ua.contains("opera mini")
    }
}
