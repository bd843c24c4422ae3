/// Export/signing lifecycle of a drawn pass. Only the first two edges are
/// driven from here; fulfillment happens elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportLifecycle {
    Drafting,
    Exported,
    SigningRequested,
    Fulfilled,
    Rejected,
}

impl ExportLifecycle {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportLifecycle::Drafting => "drafting",
            ExportLifecycle::Exported => "exported",
            ExportLifecycle::SigningRequested => "signing_requested",
            ExportLifecycle::Fulfilled => "fulfilled",
            ExportLifecycle::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Rejected)
    }
}

pub fn can_transition(from: ExportLifecycle, to: ExportLifecycle) -> bool {
    matches!(
        (from, to),
        (ExportLifecycle::Drafting, ExportLifecycle::Exported)
            | (ExportLifecycle::Exported, ExportLifecycle::SigningRequested)
            | (ExportLifecycle::SigningRequested, ExportLifecycle::Fulfilled)
            | (ExportLifecycle::SigningRequested, ExportLifecycle::Rejected)
    ) || (from == to && !from.is_terminal())
}
